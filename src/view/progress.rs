//! Progress bar rendering

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackState, PlayerState};
use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, state: &PlayerState) {
    let status = &state.status;
    let icon = match status.state {
        PlaybackState::Playing => "▶",
        PlaybackState::Paused => "⏸",
        PlaybackState::Stopped => "■",
    };

    let title = match state.now_playing() {
        Some(entry) => format!(
            " {} {} | {} ({}) ",
            icon, entry.song.title, entry.song.artist, entry.song.album
        ),
        None if status.state == PlaybackState::Stopped => " ■ Stopped ".to_string(),
        None => format!(" {} Song #{} ", icon, status.current_song_id),
    };

    let elapsed = state.estimated_elapsed(Instant::now());
    let progress_ratio = if status.duration > 0 {
        (elapsed as f64 / status.duration as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let time_str = format!("{} / {}", format_duration(elapsed), format_duration(status.duration));
    let footer = format!(" {} | Queue: {} ", status.state.label(), state.playlist.len());

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(footer).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
