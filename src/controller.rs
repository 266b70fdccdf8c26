use std::time::Duration;
use tracing::trace;

use crate::domain::{CMConfig, CMError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &CMConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, CMError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
                && key.kind == event::KeyEventKind::Press {
                    return Ok(self.handle_key(model, key));
                }
        Ok(None)
    }

    // Key bindings depend on which part of the ui owns the keyboard. Each
    // key press maps to at most one message, so a single press can never
    // trigger two state mutations.
    fn handle_key(&self, model: &Model, key: event::KeyEvent) -> Option<Message> {
        let message = if model.popup_active() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Message::Exit),
                _ => None,
            }
        } else if model.panel_active() {
            match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
                KeyCode::Char(' ') => Some(Message::ToggleVisibility),
                KeyCode::Char('g') => Some(Message::ToggleGrab),
                KeyCode::Enter => Some(Message::Done),
                KeyCode::Esc => Some(Message::Exit),
                KeyCode::Char('y') => Some(Message::CopyLayout),
                KeyCode::Char('?') => Some(Message::Help),
                _ => None,
            }
        } else {
            match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('m') => {
                    Some(Message::TogglePanel)
                }
                KeyCode::Char('y') => Some(Message::CopyLayout),
                KeyCode::Char('?') => Some(Message::Help),
                _ => None,
            }
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnId;

    fn controller_and_model() -> (Controller, Model) {
        let cfg = CMConfig::default().event_poll_time(1).animation_ms(0);
        let controller = Controller::new(&cfg);
        let model = Model::init(&cfg, &[ColumnId::Category]).unwrap();
        (controller, model)
    }

    #[test]
    fn button_mode_keys() {
        let (controller, model) = controller_and_model();
        let msg = controller.handle_key(&model, KeyCode::Enter.into());
        assert_eq!(msg, Some(Message::TogglePanel));
        let msg = controller.handle_key(&model, KeyCode::Char('q').into());
        assert_eq!(msg, Some(Message::Quit));
        let msg = controller.handle_key(&model, KeyCode::Char('x').into());
        assert_eq!(msg, None);
    }

    #[test]
    fn panel_mode_keys() {
        let (controller, mut model) = controller_and_model();
        model.update(Message::TogglePanel).unwrap();

        let msg = controller.handle_key(&model, KeyCode::Char(' ').into());
        assert_eq!(msg, Some(Message::ToggleVisibility));
        let msg = controller.handle_key(&model, KeyCode::Char('g').into());
        assert_eq!(msg, Some(Message::ToggleGrab));
        let msg = controller.handle_key(&model, KeyCode::Down.into());
        assert_eq!(msg, Some(Message::MoveDown));
        let msg = controller.handle_key(&model, KeyCode::Enter.into());
        assert_eq!(msg, Some(Message::Done));
        let msg = controller.handle_key(&model, KeyCode::Esc.into());
        assert_eq!(msg, Some(Message::Exit));
    }

    #[test]
    fn popup_mode_swallows_other_keys() {
        let (controller, mut model) = controller_and_model();
        model.update(Message::Help).unwrap();

        let msg = controller.handle_key(&model, KeyCode::Esc.into());
        assert_eq!(msg, Some(Message::Exit));
        let msg = controller.handle_key(&model, KeyCode::Char(' ').into());
        assert_eq!(msg, None);
    }
}
