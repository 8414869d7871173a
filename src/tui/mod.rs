pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app::{AppContext, DiaryError, Result};
use crate::config::Config;
use crate::domain::{HeadlinePage, OrderedSource};
use crate::sources::{fetch_catalog, fetch_page, FetchRequest};

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Results of fetches running outside the event loop.
enum Completion {
    Catalog {
        generation: u64,
        result: Result<Vec<OrderedSource>>,
    },
    Page {
        /// Catalog load the request was issued under
        generation: u64,
        request: FetchRequest,
        result: Result<HeadlinePage>,
    },
}

type CompletionSender = UnboundedSender<Completion>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut tui_app = TuiApp::new(ctx.network.catalog_url.clone());
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let (tx, mut rx) = mpsc::unbounded_channel();

    start_catalog_load(&mut tui_app, &ctx, &tx);

    loop {
        while let Ok(completion) = rx.try_recv() {
            apply_completion(&mut tui_app, &ctx, &tx, completion);
        }

        terminal.draw(|frame| {
            layout::render(frame, &mut tui_app, &config.colors, &config.keybindings)
        })?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if tui_app.pending_clear {
                    tui_app.pending_clear = false;
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => {
                            clear_selections(&mut tui_app, &ctx, &tx).await;
                        }
                        _ => {
                            tui_app.set_status("Clear cancelled".to_string());
                        }
                    }
                    continue;
                }

                let action = config.keybindings.get_action(&key);
                handle_action(&mut tui_app, &ctx, &tx, action).await;
            }
            AppEvent::Focus(next) => {
                tracing::debug!("App state changed to {:?}", next);
                let requests = tui_app.on_app_state_change(next, Utc::now());
                spawn_pages(&tui_app, &ctx, &tx, requests);
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_action(
    tui_app: &mut TuiApp,
    ctx: &Arc<AppContext>,
    tx: &CompletionSender,
    action: Action,
) {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::MoveUp => {
            tui_app.move_up();
        }
        Action::MoveDown => {
            tui_app.move_down();
        }
        Action::NextPane | Action::PrevPane => {
            tui_app.active_pane = tui_app.active_pane.toggle();
        }
        Action::ToggleSource => {
            let Some(controller) = tui_app.selected_controller_mut() else {
                return;
            };
            let name = controller.name().to_string();
            match controller.toggle(&ctx.prefs).await {
                Ok(request) => {
                    let now_enabled = request.is_some();
                    spawn_pages(tui_app, ctx, tx, request);
                    tui_app.reset_headline_selection();
                    let verb = if now_enabled { "Enabled" } else { "Disabled" };
                    tui_app.set_status(format!("{} {}", verb, name));
                }
                Err(e) => {
                    tracing::error!("Saving preference for {} failed: {}", name, e);
                    tui_app.set_status(format!("Could not save preference: {}", e));
                }
            }
        }
        Action::NextPage | Action::PrevPage | Action::RefreshSource => {
            let Some(controller) = tui_app.selected_controller_mut() else {
                return;
            };
            let request = match action {
                Action::NextPage => controller.next(),
                Action::PrevPage => controller.previous(),
                _ => controller.refresh(),
            };
            if request.is_some() {
                tui_app.reset_headline_selection();
            }
            spawn_pages(tui_app, ctx, tx, request);
        }
        Action::ReloadCatalog => {
            start_catalog_load(tui_app, ctx, tx);
        }
        Action::ClearSelections => {
            tui_app.pending_clear = true;
        }
        Action::OpenHeadline => {
            if let Some(url) = tui_app.selected_headline().map(|h| h.url.clone()) {
                open_link(tui_app, &url);
            }
        }
        Action::ShareHeadline => {
            let message = tui_app.selected_controller().and_then(|controller| {
                tui_app
                    .selected_headline()
                    .map(|h| h.share_message(controller.name()))
            });
            if let Some(message) = message {
                tui_app.set_status(format!("Share: {}", message));
            }
        }
        Action::OpenContact => {
            let url = ctx.network.contact_url.clone();
            open_link(tui_app, &url);
        }
        Action::OpenSubscribe => {
            let url = ctx.network.subscribe_url.clone();
            open_link(tui_app, &url);
        }
        Action::None => {}
    }
}

fn apply_completion(
    tui_app: &mut TuiApp,
    ctx: &Arc<AppContext>,
    tx: &CompletionSender,
    completion: Completion,
) {
    match completion {
        Completion::Catalog { generation, result } => {
            if tui_app.list.finish(generation, result) && tui_app.list.is_loaded() {
                let requests = tui_app.mount_sources(ctx.policy);
                spawn_pages(tui_app, ctx, tx, requests);
            }
        }
        Completion::Page {
            generation,
            request,
            result,
        } => {
            tui_app.apply_page(generation, &request, result, Utc::now());
        }
    }
}

async fn clear_selections(tui_app: &mut TuiApp, ctx: &Arc<AppContext>, tx: &CompletionSender) {
    match ctx.prefs.clear_all().await {
        Ok(()) => {
            start_catalog_load(tui_app, ctx, tx);
            tui_app.set_status("Cleared source selections".to_string());
        }
        Err(e) => {
            tracing::error!("Clearing preferences failed: {}", e);
            tui_app.set_status(format!("Could not clear selections: {}", e));
        }
    }
}

fn start_catalog_load(tui_app: &mut TuiApp, ctx: &Arc<AppContext>, tx: &CompletionSender) {
    tui_app.unmount_sources();
    let generation = tui_app.list.begin();
    let catalog_url = tui_app.list.catalog_url().to_string();
    let fetcher = ctx.fetcher.clone();
    let prefs = ctx.prefs.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let result = fetch_catalog(fetcher.as_ref(), &catalog_url, &prefs).await;
        // The receiver is gone once the UI has quit
        let _ = tx.send(Completion::Catalog { generation, result });
    });
}

fn spawn_pages(
    tui_app: &TuiApp,
    ctx: &Arc<AppContext>,
    tx: &CompletionSender,
    requests: impl IntoIterator<Item = FetchRequest>,
) {
    let generation = tui_app.list.generation();
    for request in requests {
        let fetcher = ctx.fetcher.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = fetch_page(fetcher.as_ref(), &request).await;
            let _ = tx.send(Completion::Page {
                generation,
                request,
                result,
            });
        });
    }
}

fn open_link(tui_app: &mut TuiApp, url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!("Opening {} failed: {}", url, e);
        tui_app.set_status(DiaryError::LinkOpen(url.to_string()).to_string());
    }
}
