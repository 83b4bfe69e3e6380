//! Layout rendering (top bar, sync indicator)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, SyncPhase, SyncSnapshot, UiState};
use super::utils::border_style;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, sync: &SyncSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(26), // Sync indicator
        ])
        .split(area);

    let is_focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Press / to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(search, chunks[0]);

    let (text, color) = sync_indicator(sync);
    let indicator = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" Daemon "));
    frame.render_widget(indicator, chunks[1]);
}

fn sync_indicator(sync: &SyncSnapshot) -> (String, Color) {
    match sync.phase {
        SyncPhase::Faulted => ("✖ Offline".to_string(), Color::Red),
        SyncPhase::Refreshing => ("↻ Syncing...".to_string(), Color::Yellow),
        SyncPhase::Idle => match sync.state.synced_at_wall {
            Some(at) => (format!("● Synced {}", at.format("%H:%M:%S")), Color::Cyan),
            None => ("○ Not synced".to_string(), Color::DarkGray),
        },
    }
}
