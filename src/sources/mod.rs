pub mod humanize;
pub mod list;
pub mod order;
pub mod refresh;
pub mod url;

pub use list::{fetch_catalog, SourceList};
pub use order::{order_sources, order_with_store};
pub use refresh::{
    fetch_page, AppState, FetchRequest, Phase, RefreshPolicy, SourceRefresh, SourceRefreshState,
};
