pub mod preferences;
pub mod sqlite;

use crate::app::Result;

pub use preferences::PreferenceStore;
pub use sqlite::SqliteStore;

/// Durable string-to-string storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}
