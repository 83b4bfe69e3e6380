//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = &self.model;

        // Error banner swallows keys until dismissed
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    model.cycle_section_forward().await;
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    self.perform_search(ui_state.search_query.clone());
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    model.set_active_section(ActiveSection::Playlist).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                    } else {
                        model.append_to_search(c).await;
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        if ui_state.active_section == ActiveSection::Results {
            match key.code {
                KeyCode::Enter => {
                    self.queue_selected_result().await;
                    return Ok(());
                }
                KeyCode::Esc => {
                    self.search.dismiss();
                    model.set_active_section(ActiveSection::Playlist).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                model.cycle_section_forward().await;
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                let len = match ui_state.active_section {
                    ActiveSection::Playlist => self.engine.state().playlist.len(),
                    ActiveSection::Results => self
                        .search
                        .snapshot()
                        .results
                        .map_or(0, |results| results.songs.len()),
                    ActiveSection::Search => 0,
                };
                model.move_selection_down(len).await;
            }
            // Transport
            KeyCode::Char(' ') => self.run_command("pause", None),
            KeyCode::Char('P') => self.run_command("play", None),
            KeyCode::Char('s') | KeyCode::Char('S') => self.run_command("stop", None),
            KeyCode::Char('n') | KeyCode::Char('N') => self.run_command("next", None),
            KeyCode::Char('p') => self.run_command("previous", None),
            KeyCode::Left => self.seek_relative(false),
            KeyCode::Right => self.seek_relative(true),
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_now(),
            // Search & library
            KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Char('b') | KeyCode::Char('B') => self.browse(1),
            KeyCode::Char(']') => self.browse_relative(true),
            KeyCode::Char('[') => self.browse_relative(false),
            KeyCode::Esc => self.search.dismiss(),
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.toggle_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
