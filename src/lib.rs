//! # Goa Diary
//!
//! A terminal reader for the Goa Diary news catalog.
//!
//! ## Architecture
//!
//! ```text
//! Catalog → SourceOrderer → SourceRefresh (per source) → UI
//!                ↑                  ↑
//!         PreferenceStore ←──── toggle
//! ```
//!
//! The catalog lists every publication with a default visibility. The user's
//! enable/disable choices are kept in [`store::PreferenceStore`], sources are
//! ordered enabled-first, and each source pages through its headlines with a
//! [`sources::SourceRefresh`] controller.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show sources, enabled first
//! goa-diary sources
//!
//! # Second page of one source
//! goa-diary headlines "Herald" --page 1
//!
//! # Launch TUI
//! goa-diary
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the preference
/// store, fetcher and configuration.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/goa-diary/config.toml`, supporting:
/// - Catalog and link URLs, request timeout, worker count
/// - Page size, page step and staleness threshold
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Command-line interface using clap.
///
/// - `sources` - List the catalog in display order
/// - `headlines <name> [--page N]` - One page of a source
/// - `digest` - First page of every enabled source
/// - `enable <name>` / `disable <name>` / `clear` - Manage choices
/// - `links` - Contact and subscribe links
/// - `tui` - Launch the TUI (the default)
pub mod cli;

/// Core domain models.
///
/// - [`SourceDescriptor`](domain::SourceDescriptor): catalog entry
/// - [`Headline`](domain::Headline): one story row
/// - [`TriState`](domain::TriState): Unset / Enabled / Disabled choice
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching a URL
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based, never cached
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Source ordering, per-source refresh controllers and the catalog list.
pub mod sources;

/// Persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): durable string storage
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`PreferenceStore`](store::PreferenceStore): enable/disable choices
pub mod store;

/// Terminal user interface.
///
/// Sources pane on the left, headlines of the selected source on the right.
/// Keybindings: j/k navigate, Tab switches panes, Enter toggles a source,
/// n/p page, r refreshes, o opens in browser, q quits.
pub mod tui;

#[cfg(test)]
pub mod test_utils;
