use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::app::Result;
use crate::domain::{Headline, HeadlinePage};
use crate::sources::{AppState, FetchRequest, RefreshPolicy, SourceList, SourceRefresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Sources,
    Headlines,
}

impl ActivePane {
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Sources => ActivePane::Headlines,
            ActivePane::Headlines => ActivePane::Sources,
        }
    }
}

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub list: SourceList,
    /// One per catalog entry, in display order. Rebuilt on every catalog load.
    pub controllers: Vec<SourceRefresh>,
    pub source_index: usize,
    pub headline_index: usize,
    pub app_state: AppState,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub source_list_state: ListState,
    pub headline_list_state: ListState,
    // Waiting for y/n before clearing every preference
    pub pending_clear: bool,
}

impl TuiApp {
    pub fn new(catalog_url: impl Into<String>) -> Self {
        let mut source_list_state = ListState::default();
        source_list_state.select(Some(0));
        let mut headline_list_state = ListState::default();
        headline_list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Sources,
            list: SourceList::new(catalog_url),
            controllers: Vec::new(),
            source_index: 0,
            headline_index: 0,
            app_state: AppState::Active,
            should_quit: false,
            status_message: None,
            source_list_state,
            headline_list_state,
            pending_clear: false,
        }
    }

    /// Discard every controller. Pair with a new catalog load so responses
    /// still in flight for them are rejected by [`TuiApp::apply_page`].
    pub fn unmount_sources(&mut self) {
        self.controllers.clear();
        self.source_index = 0;
        self.headline_index = 0;
        self.source_list_state.select(Some(0));
        self.headline_list_state.select(Some(0));
    }

    /// Build controllers for the loaded catalog and return their first fetches.
    pub fn mount_sources(&mut self, policy: RefreshPolicy) -> Vec<FetchRequest> {
        self.unmount_sources();
        self.controllers = self
            .list
            .sources()
            .iter()
            .cloned()
            .map(|source| SourceRefresh::new(source, policy, self.app_state))
            .collect();
        self.controllers
            .iter_mut()
            .filter_map(|controller| controller.mount())
            .collect()
    }

    pub fn controller_mut(&mut self, name: &str) -> Option<&mut SourceRefresh> {
        self.controllers.iter_mut().find(|c| c.name() == name)
    }

    pub fn selected_controller(&self) -> Option<&SourceRefresh> {
        self.controllers.get(self.source_index)
    }

    pub fn selected_controller_mut(&mut self) -> Option<&mut SourceRefresh> {
        self.controllers.get_mut(self.source_index)
    }

    pub fn selected_headline(&self) -> Option<&Headline> {
        self.selected_controller()
            .and_then(|c| c.visible_headlines())
            .and_then(|rows| rows.get(self.headline_index))
    }

    /// Route a finished page fetch to its controller, if it is still mounted.
    ///
    /// `generation` is the catalog load the request was issued under. Sequence
    /// numbers restart with every mount, so a response from before a reload is
    /// dropped even when a source of the same name exists again.
    pub fn apply_page(
        &mut self,
        generation: u64,
        request: &FetchRequest,
        result: Result<HeadlinePage>,
        now: DateTime<Utc>,
    ) -> bool {
        if generation != self.list.generation() {
            tracing::debug!(
                "Dropping response for {} from catalog load #{}",
                request.source,
                generation
            );
            return false;
        }
        let applied = match self.controller_mut(&request.source) {
            Some(controller) => controller.complete(request.seq, result, now),
            None => {
                tracing::debug!("Dropping response for unmounted source {}", request.source);
                false
            }
        };
        if applied {
            self.clamp_headline_index();
        }
        applied
    }

    pub fn on_app_state_change(
        &mut self,
        next: AppState,
        now: DateTime<Utc>,
    ) -> Vec<FetchRequest> {
        self.app_state = next;
        self.controllers
            .iter_mut()
            .filter_map(|controller| controller.on_app_state_change(next, now))
            .collect()
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Sources => {
                if self.source_index > 0 {
                    self.select_source(self.source_index - 1);
                }
            }
            ActivePane::Headlines => {
                if self.headline_index > 0 {
                    self.headline_index -= 1;
                    self.headline_list_state.select(Some(self.headline_index));
                }
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Sources => {
                if self.source_index + 1 < self.controllers.len() {
                    self.select_source(self.source_index + 1);
                }
            }
            ActivePane::Headlines => {
                if self.headline_index + 1 < self.visible_headline_count() {
                    self.headline_index += 1;
                    self.headline_list_state.select(Some(self.headline_index));
                }
            }
        }
    }

    /// Back to the top of the headline list, after a page change.
    pub fn reset_headline_selection(&mut self) {
        self.headline_index = 0;
        self.headline_list_state.select(Some(0));
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    fn select_source(&mut self, index: usize) {
        self.source_index = index;
        self.source_list_state.select(Some(index));
        self.reset_headline_selection();
    }

    fn visible_headline_count(&self) -> usize {
        self.selected_controller()
            .and_then(|c| c.visible_headlines())
            .map_or(0, |rows| rows.len())
    }

    fn clamp_headline_index(&mut self) {
        let count = self.visible_headline_count();
        if self.headline_index >= count {
            self.headline_index = count.saturating_sub(1);
            self.headline_list_state.select(Some(self.headline_index));
        }
    }
}
