use dbnav_core::connection_manager::DatabaseBackend;
use dbnav_core::layout::{Area, ScreenLayout, DATABASE_ROW_PITCH, TABLE_ROW_PITCH};
use dbnav_core::navigator::ScreenNavigator;
use dbnav_core::session::{LoginField, Screen, SessionState, StatusKind};
use dbnav_core::table_data::TRUNCATION_MARKER;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const PASSWORD_MASK: char = '*';

pub(crate) fn draw<B: DatabaseBackend>(frame: &mut Frame<'_>, navigator: &ScreenNavigator<B>) {
    let layout = navigator.layout();
    let state = navigator.state();

    match state.screen {
        Screen::Login => draw_login(frame, layout, state),
        Screen::DatabaseList => {
            draw_title(frame, layout, &database_header(navigator));
            draw_entries(
                frame,
                layout,
                state.databases.iter(),
                DATABASE_ROW_PITCH,
                state.scroll.offset(),
            );
        }
        Screen::TableList => {
            let database = state.selected_database.as_deref().unwrap_or("-");
            draw_title(frame, layout, &format!("Tables in database: {database}"));
            draw_entries(
                frame,
                layout,
                state.tables.iter(),
                TABLE_ROW_PITCH,
                state.scroll.offset(),
            );
            draw_button(frame, layout, layout.back_button(), "Back");
        }
        Screen::TableData => {
            let database = state.selected_database.as_deref().unwrap_or("-");
            let table = state.selected_table.as_deref().unwrap_or("-");
            draw_title(frame, layout, &format!("Data from {database}.{table}"));
            draw_table_data(frame, layout, state);
            draw_button(frame, layout, layout.back_button(), "Back");
        }
    }

    draw_status(frame, layout, state);
}

fn draw_login(frame: &mut Frame<'_>, layout: ScreenLayout, state: &SessionState) {
    draw_title(frame, layout, "MariaDB Login");

    for field in LoginField::ALL {
        let label = Paragraph::new(field.label());
        frame.render_widget(label, clip(layout, layout.field_label(field)));

        let editing = state.form.is_editing(field);
        let value = state.form.value(field);
        let shown = if field == LoginField::Password {
            PASSWORD_MASK.to_string().repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let border = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let area = clip(layout, layout.field(field));
        let text_box = Paragraph::new(shown.as_str())
            .block(Block::default().borders(Borders::ALL).border_style(border));
        frame.render_widget(text_box, area);

        if editing {
            let typed = u16::try_from(shown.chars().count()).unwrap_or(u16::MAX);
            let cursor_x = area.x.saturating_add(1).saturating_add(typed);
            if area.height > 2 && cursor_x < area.right().saturating_sub(1) {
                frame.set_cursor_position(Position::new(cursor_x, area.y + 1));
            }
        }
    }

    draw_button(frame, layout, layout.connect_button(), "Connect");
}

fn draw_title(frame: &mut Frame<'_>, layout: ScreenLayout, text: &str) {
    let title = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, clip(layout, layout.title()));
}

fn draw_entries<'a>(
    frame: &mut Frame<'_>,
    layout: ScreenLayout,
    names: impl Iterator<Item = &'a String>,
    pitch: u16,
    offset: i32,
) {
    for (index, name) in names.enumerate() {
        let Some(area) = layout.list_entry(index, pitch, offset) else {
            continue;
        };
        let entry = Paragraph::new(format!(" {name}"))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(entry, clip(layout, area));
    }
}

fn database_header<B: DatabaseBackend>(navigator: &ScreenNavigator<B>) -> String {
    let status = navigator.connection_status();
    let target = match (status.user, status.endpoint) {
        (Some(user), Some(endpoint)) if !user.is_empty() => format!("{user}@{endpoint}"),
        _ => navigator.host().to_string(),
    };
    match status.last_latency {
        Some(latency) => format!("Databases on {target} ({} ms)", latency.as_millis()),
        None => format!("Databases on {target}"),
    }
}

/// The truncation marker takes the last visible row so it stays on screen
/// however many rows the dump holds.
fn draw_table_data(frame: &mut Frame<'_>, layout: ScreenLayout, state: &SessionState) {
    let mut area = clip(layout, layout.list_viewport());
    if state.table_data.is_truncated() && area.height > 0 {
        let marker_row = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        area.height -= 1;
        let marker = Paragraph::new(Span::styled(
            TRUNCATION_MARKER,
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(marker, marker_row);
    }

    let lines: Vec<Line<'_>> = if state.table_data.is_empty() {
        vec![Line::from(Span::styled(
            "(no rows)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state.table_data.as_str().lines().map(Line::from).collect()
    };
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_button(frame: &mut Frame<'_>, layout: ScreenLayout, area: Area, label: &str) {
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(button, clip(layout, area));
}

fn draw_status(frame: &mut Frame<'_>, layout: ScreenLayout, state: &SessionState) {
    let line = match &state.status {
        Some(status) => {
            let style = match status.kind {
                StatusKind::Info => Style::default().fg(Color::Green),
                StatusKind::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(status.text.clone(), style))
        }
        None => Line::from(Span::styled(
            hint(state.screen),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), clip(layout, layout.status_line()));
}

fn hint(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => "Click a field or press Tab to edit, Enter to connect, Esc to quit",
        Screen::DatabaseList => "Click a database, scroll with the wheel, Esc to quit",
        Screen::TableList => "Click a table, Back to return, Esc to quit",
        Screen::TableData => "Back to return to the table list, Esc to quit",
    }
}

/// Converts a layout area to a frame rect that never leaves the viewport.
fn clip(layout: ScreenLayout, area: Area) -> Rect {
    let viewport = layout.viewport();
    let bounds = Rect::new(viewport.x, viewport.y, viewport.width, viewport.height);
    Rect::new(area.x, area.y, area.width, area.height).intersection(bounds)
}
