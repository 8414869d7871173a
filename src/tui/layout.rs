use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::{ColorConfig, KeybindingConfig};
use crate::sources::{Phase, SourceRefresh};
use crate::tui::app::{ActivePane, TuiApp};

pub fn render(
    frame: &mut Frame,
    app: &mut TuiApp,
    colors: &ColorConfig,
    keybindings: &KeybindingConfig,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);

    render_sources_pane(frame, app, panes[0], colors, keybindings);
    render_headlines_pane(frame, app, panes[1], colors);
    render_status_bar(frame, app, rows[1], colors);
}

fn pane_block(title: String, active: bool, colors: &ColorConfig) -> Block<'static> {
    let border_style = if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn highlight_style(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default()
            .bg(colors.selection_bg_active)
            .fg(colors.selection_fg_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(colors.selection_bg_inactive)
            .fg(colors.selection_fg_inactive)
    }
}

fn render_sources_pane(
    frame: &mut Frame,
    app: &mut TuiApp,
    area: Rect,
    colors: &ColorConfig,
    keybindings: &KeybindingConfig,
) {
    let is_active = app.active_pane == ActivePane::Sources;

    if app.list.loading() {
        let block = pane_block(" Sources ".to_string(), is_active, colors);
        frame.render_widget(Paragraph::new("Loading sources...").block(block), area);
        return;
    }

    if let Some(error) = app.list.error() {
        let block = pane_block(" Sources ".to_string(), is_active, colors);
        let lines = vec![
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(colors.error),
            )),
            Line::from(""),
            Line::from(Span::styled(
                retry_hint(&keybindings.reload_catalog),
                Style::default().fg(colors.hint),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = app
        .controllers
        .iter()
        .map(|controller| source_row(controller, now, colors))
        .collect();

    let enabled = app.controllers.iter().filter(|c| c.state().enabled).count();
    let title = format!(" Sources ({}/{}) ", enabled, app.controllers.len());

    let list = List::new(items)
        .block(pane_block(title, is_active, colors))
        .highlight_style(highlight_style(is_active, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.source_list_state);
}

fn source_row(
    controller: &SourceRefresh,
    now: chrono::DateTime<Utc>,
    colors: &ColorConfig,
) -> ListItem<'static> {
    let enabled = controller.state().enabled;
    let (marker, style) = if enabled {
        ("[x]", Style::default().fg(colors.enabled_source))
    } else {
        ("[ ]", Style::default().fg(colors.disabled_source))
    };

    let mut spans = vec![Span::styled(
        format!("{} {}", marker, controller.name()),
        style,
    )];
    if controller.phase() == Phase::Loading {
        spans.push(Span::styled(" …", Style::default().fg(colors.hint)));
    }
    let mut lines = vec![Line::from(spans)];
    if let Some(hint) = controller.header_hint(now) {
        lines.push(Line::from(Span::styled(
            format!("    {}", hint),
            Style::default().fg(colors.hint),
        )));
    }

    ListItem::new(lines)
}

fn render_headlines_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Headlines;

    let Some(controller) = app.controllers.get(app.source_index) else {
        let block = pane_block(" Headlines ".to_string(), is_active, colors);
        frame.render_widget(Paragraph::new("No source selected").block(block), area);
        return;
    };

    let title = format!(" {} ", controller.name());
    let block = pane_block(title, is_active, colors);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Error banner
            Constraint::Min(1),    // Headlines
            Constraint::Length(1), // Page hints
        ])
        .split(inner);

    if let Some(banner) = controller.error_banner() {
        frame.render_widget(
            Paragraph::new(banner).style(Style::default().fg(colors.error)),
            sections[0],
        );
    }

    let hints = page_hints(controller);

    if let Some(rows) = controller.visible_headlines() {
        let today = Local::now().date_naive();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|headline| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        SourceRefresh::date_label(headline, today),
                        Style::default().fg(colors.headline_date),
                    )),
                    Line::from(headline.title.clone()),
                ])
            })
            .collect();

        let list = List::new(items)
            .highlight_style(highlight_style(is_active, colors))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, sections[1], &mut app.headline_list_state);
    } else {
        let message = if !controller.state().enabled {
            "Source disabled. Press Enter in the source list to enable it.".to_string()
        } else if controller.shows_no_data() {
            controller.no_data_message()
        } else if controller.phase() == Phase::Loading {
            "Loading...".to_string()
        } else {
            String::new()
        };
        frame.render_widget(
            Paragraph::new(message).wrap(Wrap { trim: false }),
            sections[1],
        );
    }

    if let Some(hints) = hints {
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(colors.hint)),
            sections[2],
        );
    }
}

/// Names whichever keys are bound to reloading the catalog.
fn retry_hint(reload_keys: &[String]) -> String {
    if reload_keys.is_empty() {
        "Reload the catalog to retry".to_string()
    } else {
        format!("Press {} to retry", reload_keys.join(" or "))
    }
}

fn page_hints(controller: &SourceRefresh) -> Option<String> {
    if !controller.navigation_visible() {
        return None;
    }
    let page = controller.state().offset;
    if controller.can_go_previous() {
        Some(format!("p:Previous  n:Next  (offset {})", page))
    } else {
        Some("n:Next".to_string())
    }
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if app.pending_clear {
        "Clear all source selections? (y/n)".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        concat!(
            "j/k:Nav  Tab:Pane  Enter:Toggle  n/p:Page  r:Refresh  o:Open  s:Share  ",
            "X:Clear  c:Contact  S:Subscribe  q:Quit"
        )
        .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
