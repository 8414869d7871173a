//! Per-source headline refresh lifecycle.
//!
//! [`SourceRefresh`] is a state machine with no I/O of its own. Triggers
//! (`mount`, foreground transitions, pagination, toggling) hand back a
//! [`FetchRequest`] when a fetch should happen. The caller runs it and reports
//! back through [`SourceRefresh::complete`]. Every request carries a sequence
//! number and only the most recently issued one may change state, so a slow
//! response can never overwrite a newer page.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::app::Result;
use crate::domain::{Headline, HeadlinePage, OrderedSource};
use crate::fetcher::Fetcher;
use crate::sources::humanize;
use crate::sources::url::{with_limit, with_offset};
use crate::store::PreferenceStore;

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_PAGE_STEP: u32 = 10;
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 5;

/// Paging and staleness knobs shared by every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Forced into `limit=` on every request
    pub page_size: u32,
    /// Offset delta for next/previous
    pub page_step: u32,
    /// Foreground transitions refetch when the last fetch is older than this
    pub stale_after: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_step: DEFAULT_PAGE_STEP,
            stale_after: Duration::minutes(DEFAULT_STALE_AFTER_MINUTES),
        }
    }
}

/// Whether the application is in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

impl AppState {
    pub fn is_active(self) -> bool {
        self == AppState::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRefreshState {
    pub offset: u32,
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub headlines: Option<Vec<Headline>>,
    pub loading: bool,
    pub error: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: String,
    pub seq: u64,
    pub url: String,
}

pub struct SourceRefresh {
    source: OrderedSource,
    policy: RefreshPolicy,
    state: SourceRefreshState,
    page_url: String,
    app_state: AppState,
    issued: u64,
}

impl SourceRefresh {
    pub fn new(source: OrderedSource, policy: RefreshPolicy, app_state: AppState) -> Self {
        let page_url = source.href().to_string();
        let state = SourceRefreshState {
            offset: 0,
            last_fetch_time: None,
            headlines: None,
            loading: false,
            error: None,
            enabled: source.enabled,
        };
        Self {
            source,
            policy,
            state,
            page_url,
            app_state,
            issued: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn state(&self) -> &SourceRefreshState {
        &self.state
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    /// URL of the page currently shown, before the `limit` override.
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn phase(&self) -> Phase {
        if self.state.loading {
            Phase::Loading
        } else if self.state.error.is_some() {
            Phase::Failed
        } else if self.state.headlines.is_some() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    /// First fetch, for sources that start out enabled.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        if self.state.enabled {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Track foreground/background transitions. Coming back to the
    /// foreground refetches if this source was never fetched or is stale.
    pub fn on_app_state_change(
        &mut self,
        next: AppState,
        now: DateTime<Utc>,
    ) -> Option<FetchRequest> {
        let previous = std::mem::replace(&mut self.app_state, next);

        if !self.state.enabled || previous.is_active() || !next.is_active() {
            return None;
        }
        if self.is_stale(now) {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.state.last_fetch_time {
            None => true,
            Some(at) => now.signed_duration_since(at) > self.policy.stale_after,
        }
    }

    pub fn next(&mut self) -> Option<FetchRequest> {
        if !self.state.enabled {
            return None;
        }
        let offset = self.state.offset.saturating_add(self.policy.page_step);
        Some(self.load_page(offset))
    }

    /// Only available past the first page.
    pub fn previous(&mut self) -> Option<FetchRequest> {
        if !self.can_go_previous() {
            return None;
        }
        let offset = self.state.offset.saturating_sub(self.policy.page_step);
        Some(self.load_page(offset))
    }

    /// Back to the first page.
    pub fn refresh(&mut self) -> Option<FetchRequest> {
        if !self.state.enabled {
            return None;
        }
        Some(self.load_page(0))
    }

    /// Flip the source on or off and write the choice through to `prefs`.
    /// Turning a source on also fetches it. A failed write leaves the
    /// source as it was.
    pub async fn toggle(&mut self, prefs: &PreferenceStore) -> Result<Option<FetchRequest>> {
        let enable = !self.state.enabled;
        if enable {
            prefs.set_enabled(self.name()).await?;
        } else {
            prefs.set_disabled(self.name()).await?;
        }
        self.state.enabled = enable;

        Ok(enable.then(|| self.begin_fetch()))
    }

    /// Apply the outcome of request `seq`. Returns false, changing nothing,
    /// when a newer request has been issued since.
    pub fn complete(
        &mut self,
        seq: u64,
        outcome: Result<HeadlinePage>,
        now: DateTime<Utc>,
    ) -> bool {
        if seq != self.issued {
            tracing::debug!(
                "Discarding stale response #{} for {} (latest #{})",
                seq,
                self.name(),
                self.issued
            );
            return false;
        }

        self.state.loading = false;
        match outcome {
            Ok(page) => {
                self.state.headlines = Some(page.result);
                self.state.last_fetch_time = Some(now);
                self.state.error = None;
            }
            Err(e) => {
                tracing::warn!("Fetching {} failed: {}", self.name(), e);
                self.state.error = Some(e.to_string());
            }
        }
        true
    }

    /// Run `request` (if any) to completion against `fetcher`.
    pub async fn resolve(
        &mut self,
        fetcher: &(dyn Fetcher + Send + Sync),
        request: Option<FetchRequest>,
    ) -> bool {
        let Some(request) = request else {
            return false;
        };
        let outcome = fetch_page(fetcher, &request).await;
        self.complete(request.seq, outcome, Utc::now())
    }

    pub fn can_go_previous(&self) -> bool {
        self.state.enabled && self.state.offset > 0
    }

    /// Headlines to show: enabled and at least one row.
    pub fn visible_headlines(&self) -> Option<&[Headline]> {
        match &self.state.headlines {
            Some(rows) if self.state.enabled && !rows.is_empty() => Some(rows),
            _ => None,
        }
    }

    /// Previous/next controls are only offered alongside headlines.
    pub fn navigation_visible(&self) -> bool {
        self.visible_headlines().is_some()
    }

    /// A fetch succeeded but returned nothing.
    pub fn shows_no_data(&self) -> bool {
        self.state.enabled && matches!(&self.state.headlines, Some(rows) if rows.is_empty())
    }

    pub fn no_data_message(&self) -> String {
        format!("No data available for {}", self.name())
    }

    pub fn error_banner(&self) -> Option<String> {
        self.state
            .error
            .as_ref()
            .map(|error| format!("{}:{}", self.name(), error))
    }

    /// `"Updated 3 minutes ago!"` once an enabled source has been fetched.
    pub fn header_hint(&self, now: DateTime<Utc>) -> Option<String> {
        if !self.state.enabled {
            return None;
        }
        humanize::time_since_last_fetch(self.state.last_fetch_time, now)
            .map(|distance| format!("Updated {distance} ago!"))
    }

    pub fn date_label(headline: &Headline, today: NaiveDate) -> String {
        humanize::date_distance_from_today(&headline.date, today)
    }

    fn load_page(&mut self, offset: u32) -> FetchRequest {
        self.state.offset = offset;
        self.page_url = with_offset(self.source.href(), offset);
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> FetchRequest {
        self.issued += 1;
        self.state.loading = true;
        self.state.error = None;
        FetchRequest {
            source: self.name().to_string(),
            seq: self.issued,
            url: with_limit(&self.page_url, self.policy.page_size),
        }
    }
}

pub async fn fetch_page(
    fetcher: &(dyn Fetcher + Send + Sync),
    request: &FetchRequest,
) -> Result<HeadlinePage> {
    let body = fetcher.fetch(&request.url).await?;
    HeadlinePage::from_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;

    use crate::app::DiaryError;
    use crate::domain::{SourceDescriptor, TriState};
    use crate::store::SqliteStore;
    use crate::test_utils::StubFetcher;

    const HREF: &str = "http://www.omgoa.com/scripts/herald.py?limit=10&offset=0";

    fn controller(enabled: bool) -> SourceRefresh {
        let source = OrderedSource {
            descriptor: SourceDescriptor::new("Herald", HREF, true),
            enabled,
        };
        SourceRefresh::new(source, RefreshPolicy::default(), AppState::Active)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
    }

    fn page(ids: &[&str]) -> HeadlinePage {
        HeadlinePage {
            result: ids
                .iter()
                .map(|id| {
                    Headline::new(
                        "20240102",
                        format!("Story {id}"),
                        format!("http://x.example/{id}"),
                        *id,
                    )
                })
                .collect(),
        }
    }

    fn loaded_at(at: DateTime<Utc>) -> SourceRefresh {
        let mut ctl = controller(true);
        let req = ctl.mount().unwrap();
        assert!(ctl.complete(req.seq, Ok(page(&["1"])), at));
        ctl
    }

    #[test]
    fn test_enabled_source_fetches_on_mount() {
        let mut ctl = controller(true);
        assert_eq!(ctl.phase(), Phase::Idle);
        let req = ctl.mount().unwrap();
        assert_eq!(req.source, "Herald");
        assert_eq!(
            req.url,
            "http://www.omgoa.com/scripts/herald.py?limit=5&offset=0"
        );
        assert_eq!(ctl.phase(), Phase::Loading);
        assert!(ctl.state().loading);
    }

    #[test]
    fn test_disabled_source_does_not_fetch() {
        let mut ctl = controller(false);
        assert!(ctl.mount().is_none());
        assert!(ctl.next().is_none());
        assert!(ctl.previous().is_none());
        assert!(ctl.refresh().is_none());
        assert!(ctl
            .on_app_state_change(AppState::Background, noon())
            .is_none());
        assert!(ctl.on_app_state_change(AppState::Active, noon()).is_none());
        assert_eq!(ctl.phase(), Phase::Idle);
    }

    #[test]
    fn test_successful_fetch_stores_headlines_and_time() {
        let ctl = loaded_at(noon());
        assert_eq!(ctl.phase(), Phase::Loaded);
        assert_eq!(ctl.state().last_fetch_time, Some(noon()));
        assert_eq!(ctl.visible_headlines().unwrap().len(), 1);
        assert!(!ctl.state().loading);
    }

    #[test]
    fn test_failure_keeps_previous_headlines() {
        let mut ctl = loaded_at(noon());
        let req = ctl.refresh().unwrap();
        assert!(ctl.complete(
            req.seq,
            Err(DiaryError::Other("connection reset".into())),
            noon() + Duration::minutes(1)
        ));
        assert_eq!(ctl.phase(), Phase::Failed);
        assert!(!ctl.state().loading);
        assert_eq!(ctl.state().error.as_deref(), Some("connection reset"));
        assert_eq!(ctl.state().headlines.as_ref().unwrap().len(), 1);
        assert_eq!(ctl.state().last_fetch_time, Some(noon()));
        assert_eq!(
            ctl.error_banner().as_deref(),
            Some("Herald:connection reset")
        );
    }

    #[test]
    fn test_new_fetch_clears_error() {
        let mut ctl = controller(true);
        let req = ctl.mount().unwrap();
        ctl.complete(req.seq, Err(DiaryError::Other("boom".into())), noon());
        assert_eq!(ctl.phase(), Phase::Failed);
        ctl.refresh().unwrap();
        assert!(ctl.state().error.is_none());
        assert_eq!(ctl.phase(), Phase::Loading);
    }

    #[test]
    fn test_empty_result_is_no_data_not_error() {
        let mut ctl = controller(true);
        let req = ctl.mount().unwrap();
        ctl.complete(req.seq, Ok(page(&[])), noon());
        assert_eq!(ctl.phase(), Phase::Loaded);
        assert!(ctl.shows_no_data());
        assert!(ctl.error_banner().is_none());
        assert!(!ctl.navigation_visible());
        assert_eq!(ctl.no_data_message(), "No data available for Herald");
    }

    #[test]
    fn test_next_advances_offset() {
        let mut ctl = loaded_at(noon());
        let req = ctl.next().unwrap();
        assert_eq!(ctl.state().offset, 10);
        assert_eq!(
            req.url,
            "http://www.omgoa.com/scripts/herald.py?limit=5&offset=10"
        );
        assert!(ctl.can_go_previous());
    }

    #[test]
    fn test_previous_unavailable_on_first_page() {
        let mut ctl = loaded_at(noon());
        assert!(!ctl.can_go_previous());
        assert!(ctl.previous().is_none());
        assert_eq!(ctl.state().offset, 0);
        // nothing was started
        assert!(!ctl.state().loading);
    }

    #[test]
    fn test_previous_steps_back() {
        let mut ctl = loaded_at(noon());
        ctl.next();
        ctl.next();
        let req = ctl.previous().unwrap();
        assert_eq!(ctl.state().offset, 10);
        assert!(req.url.ends_with("limit=5&offset=10"));
    }

    #[test]
    fn test_refresh_resets_offset() {
        let mut ctl = loaded_at(noon());
        ctl.next();
        ctl.next();
        let req = ctl.refresh().unwrap();
        assert_eq!(ctl.state().offset, 0);
        assert!(req.url.ends_with("limit=5&offset=0"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut ctl = loaded_at(noon());
        let first = ctl.next().unwrap();
        let second = ctl.next().unwrap();
        assert!(second.seq > first.seq);

        // second resolves first, then the older one arrives
        assert!(ctl.complete(second.seq, Ok(page(&["21"])), noon()));
        assert!(!ctl.complete(first.seq, Ok(page(&["11"])), noon()));

        assert_eq!(ctl.visible_headlines().unwrap()[0].id, "21");
        assert_eq!(ctl.state().offset, 20);
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut ctl = loaded_at(noon());
        let first = ctl.next().unwrap();
        let _second = ctl.next().unwrap();
        assert!(!ctl.complete(first.seq, Ok(page(&["11"])), noon()));
        assert!(ctl.state().loading);
    }

    #[test]
    fn test_foreground_never_fetched_refreshes() {
        let mut ctl = controller(true);
        assert!(ctl.on_app_state_change(AppState::Background, noon()).is_none());
        assert!(ctl.on_app_state_change(AppState::Active, noon()).is_some());
    }

    #[test]
    fn test_foreground_recent_fetch_does_not_refresh() {
        let mut ctl = loaded_at(noon());
        ctl.on_app_state_change(AppState::Background, noon());
        let later = noon() + Duration::minutes(3);
        assert!(ctl.on_app_state_change(AppState::Active, later).is_none());
        assert_eq!(ctl.app_state(), AppState::Active);
    }

    #[test]
    fn test_foreground_stale_fetch_refreshes() {
        let mut ctl = loaded_at(noon());
        ctl.on_app_state_change(AppState::Inactive, noon());
        let later = noon() + Duration::minutes(7);
        let req = ctl.on_app_state_change(AppState::Active, later).unwrap();
        assert!(req.url.contains("limit=5"));
    }

    #[test]
    fn test_foreground_keeps_current_page() {
        let mut ctl = loaded_at(noon());
        let req = ctl.next().unwrap();
        ctl.complete(req.seq, Ok(page(&["11"])), noon());
        ctl.on_app_state_change(AppState::Background, noon());
        let req = ctl
            .on_app_state_change(AppState::Active, noon() + Duration::minutes(10))
            .unwrap();
        assert!(req.url.ends_with("offset=10"));
        assert_eq!(ctl.state().offset, 10);
    }

    #[test]
    fn test_active_to_active_is_not_a_foreground_transition() {
        let mut ctl = controller(true);
        assert!(ctl.on_app_state_change(AppState::Active, noon()).is_none());
    }

    #[test]
    fn test_header_hint() {
        let ctl = loaded_at(noon());
        assert_eq!(
            ctl.header_hint(noon() + Duration::minutes(3)).as_deref(),
            Some("Updated 3 minutes ago!")
        );
        assert!(controller(true).header_hint(noon()).is_none());
    }

    #[test]
    fn test_date_label() {
        let headline = Headline::new("20240101", "t", "u", "1");
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            SourceRefresh::date_label(&headline, today),
            "1st Jan (Yesterday)"
        );
    }

    #[tokio::test]
    async fn test_toggle_writes_through_and_fetches_on_enable() {
        let prefs = PreferenceStore::new(Arc::new(SqliteStore::in_memory().unwrap()));
        let mut ctl = controller(false);

        let req = ctl.toggle(&prefs).await.unwrap();
        assert!(req.is_some());
        assert!(ctl.state().enabled);
        assert_eq!(prefs.get("Herald").await.unwrap(), TriState::Enabled);

        let req = ctl.toggle(&prefs).await.unwrap();
        assert!(req.is_none());
        assert!(!ctl.state().enabled);
        assert_eq!(prefs.get("Herald").await.unwrap(), TriState::Disabled);
    }

    #[tokio::test]
    async fn test_disabling_keeps_retained_data() {
        let prefs = PreferenceStore::new(Arc::new(SqliteStore::in_memory().unwrap()));
        let mut ctl = loaded_at(noon());
        ctl.toggle(&prefs).await.unwrap();
        assert!(ctl.state().headlines.is_some());
        assert!(ctl.visible_headlines().is_none());
        assert!(ctl.header_hint(noon()).is_none());
    }

    #[tokio::test]
    async fn test_resolve_runs_request() {
        let fetcher = StubFetcher::new().with_body(
            "herald.py",
            r#"{"result": [["20240102", "Monsoon", "http://x.example/m", "9"]]}"#,
        );
        let mut ctl = controller(true);
        let req = ctl.mount();
        assert!(ctl.resolve(&fetcher, req).await);
        assert_eq!(ctl.visible_headlines().unwrap()[0].title, "Monsoon");
        assert_eq!(
            fetcher.requested(),
            vec!["http://www.omgoa.com/scripts/herald.py?limit=5&offset=0"]
        );
    }

    #[tokio::test]
    async fn test_resolve_records_fetch_error() {
        let fetcher = StubFetcher::new().with_failure("herald.py", "timed out");
        let mut ctl = controller(true);
        let req = ctl.mount();
        ctl.resolve(&fetcher, req).await;
        assert_eq!(ctl.state().error.as_deref(), Some("timed out"));
        assert!(!ctl.state().loading);
    }
}
