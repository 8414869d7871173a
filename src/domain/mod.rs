pub mod headline;
pub mod preference;
pub mod source;

pub use headline::{Headline, HeadlinePage};
pub use preference::{effective_enabled, TriState};
pub use source::{Catalog, OrderedSource, SourceDescriptor};
