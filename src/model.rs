use arboard::Clipboard;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::columns::ColumnId;
use crate::domain::{CMConfig, CMError, HELP_TEXT, Message};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

// Which part of the ui owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    BUTTON,
    PANEL,
    POPUP,
}

// Lifecycle of the floating panel. The Instant marks when the current
// transition started; the render height/fade is derived from it.
#[derive(Debug, Clone, Copy)]
enum PanelPhase {
    CLOSED,
    OPENING(Instant),
    OPEN,
    CLOSING(Instant),
}

#[derive(Clone, Debug)]
pub struct RowView {
    pub label: String,
    pub checked: bool,
    pub grabbed: bool,
}

// Snapshot of everything the ui needs for one frame. Rebuilt by the model
// after every mutation, never by the renderer.
#[derive(Clone)]
pub struct UIData {
    pub rows: Vec<RowView>,
    pub selected_row: usize,
    pub button_focused: bool,
    pub panel_visible: bool,
    pub panel_progress: f64,
    pub grab_active: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            rows: Vec::new(),
            selected_row: 0,
            button_focused: true,
            panel_visible: false,
            panel_progress: 0.0,
            grab_active: false,
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: CMConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    order: Vec<ColumnId>,
    visible: HashMap<ColumnId, bool>,
    curser_row: usize,
    grabbed: bool,
    grab_origin: Vec<ColumnId>,
    panel: PanelPhase,
    clipboard: Option<Clipboard>,
    uidata: UIData,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &CMConfig, hidden: &[ColumnId]) -> Result<Self, CMError> {
        let order: Vec<ColumnId> = ColumnId::ALL.to_vec();
        let visible: HashMap<ColumnId, bool> = ColumnId::ALL
            .iter()
            .map(|c| (*c, !hidden.contains(c)))
            .collect();
        debug!("Initial order {:?}, hidden {:?}", order, hidden);

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::BUTTON,
            previous_modus: Modus::BUTTON,
            order,
            visible,
            curser_row: 0,
            grabbed: false,
            grab_origin: Vec::new(),
            panel: PanelPhase::CLOSED,
            clipboard: Clipboard::new().ok(),
            uidata: UIData::empty(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.update_panel_data();
        model.set_status_message("Started colman!".to_string());
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn panel_active(&self) -> bool {
        self.modus == Modus::PANEL
    }

    pub fn popup_active(&self) -> bool {
        self.modus == Modus::POPUP
    }

    pub fn column_order(&self) -> &[ColumnId] {
        &self.order
    }

    pub fn visibility(&self) -> &HashMap<ColumnId, bool> {
        &self.visible
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) -> Result<(), CMError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::BUTTON => match message {
                Message::Quit => self.quit(),
                Message::TogglePanel => self.open_panel(),
                Message::Help => self.show_help(),
                Message::CopyLayout => self.copy_layout(),
                _ => (),
            },
            Modus::PANEL => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::ToggleVisibility => self.toggle_column(),
                Message::ToggleGrab => self.toggle_grab(),
                // A second trigger press while the panel is open behaves
                // like Done, so toggling twice is a no-op overall.
                Message::Done | Message::TogglePanel => self.done(),
                Message::Exit => self.exit(),
                Message::Help => self.show_help(),
                Message::CopyLayout => self.copy_layout(),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help | Message::Done => self.exit(),
                _ => (),
            },
        }
        Ok(())
    }

    // Advance the open/close animation. Called once per event loop pass,
    // independent of key input.
    pub fn tick(&mut self) {
        let animation = Duration::from_millis(self.config.animation_ms);
        match self.panel {
            PanelPhase::OPENING(start) => {
                if start.elapsed() >= animation {
                    self.panel = PanelPhase::OPEN;
                }
                self.update_panel_data();
            }
            PanelPhase::CLOSING(start) => {
                if start.elapsed() >= animation {
                    self.panel = PanelPhase::CLOSED;
                }
                self.update_panel_data();
            }
            _ => {}
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn open_panel(&mut self) {
        trace!("Opening column panel ...");
        self.modus = Modus::PANEL;
        self.curser_row = 0;
        self.panel = PanelPhase::OPENING(Instant::now());
        self.update_panel_data();
    }

    fn close_panel(&mut self) {
        trace!("Closing column panel ...");
        self.modus = Modus::BUTTON;
        self.panel = PanelPhase::CLOSING(Instant::now());
        self.update_panel_data();
    }

    fn done(&mut self) {
        if self.grabbed {
            self.release_grab();
        } else {
            self.close_panel();
        }
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::PANEL => {
                if self.grabbed {
                    self.cancel_grab();
                } else {
                    self.close_panel();
                }
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
                self.update_panel_data();
            }
            Modus::BUTTON => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_panel_data();
    }

    fn move_selection_up(&mut self) {
        if self.grabbed {
            if self.curser_row > 0 {
                self.order.swap(self.curser_row, self.curser_row - 1);
                self.curser_row -= 1;
            }
        } else {
            self.curser_row = self.curser_row.saturating_sub(1);
        }
        self.update_panel_data();
    }

    fn move_selection_down(&mut self) {
        if self.grabbed {
            if self.curser_row < self.order.len() - 1 {
                self.order.swap(self.curser_row, self.curser_row + 1);
                self.curser_row += 1;
            }
        } else {
            self.curser_row = std::cmp::min(self.curser_row + 1, self.order.len() - 1);
        }
        self.update_panel_data();
    }

    // Flip the visibility flag of the selected row. This is the only code
    // path that toggles a flag, so a single key press can never toggle twice.
    fn toggle_column(&mut self) {
        let id = self.order[self.curser_row];
        if let Some(flag) = self.visible.get_mut(&id) {
            *flag = !*flag;
            let state = if *flag { "Showing" } else { "Hiding" };
            self.set_status_message(format!("{} {}", state, id.label()));
        }
        self.update_panel_data();
    }

    fn toggle_grab(&mut self) {
        if self.grabbed {
            self.release_grab();
        } else {
            self.grab_origin = self.order.clone();
            self.grabbed = true;
            self.set_status_message(format!(
                "Grabbed {}",
                self.order[self.curser_row].label()
            ));
            self.update_panel_data();
        }
    }

    fn release_grab(&mut self) {
        self.grabbed = false;
        info!("Reordered columns: {:?}", self.order);
        self.set_status_message("Reordered columns".to_string());
        self.update_panel_data();
    }

    fn cancel_grab(&mut self) {
        let id = self.order[self.curser_row];
        self.order = self.grab_origin.clone();
        self.curser_row = self.order.iter().position(|c| *c == id).unwrap_or(0);
        self.grabbed = false;
        self.set_status_message("Reorder canceled".to_string());
        self.update_panel_data();
    }

    // Comma separated tags of the visible columns, in display order.
    pub(crate) fn layout_string(&self) -> String {
        self.order
            .iter()
            .filter(|id| *self.visible.get(*id).unwrap_or(&false))
            .map(|id| id.tag())
            .collect::<Vec<&str>>()
            .join(",")
    }

    fn copy_layout(&mut self) {
        let content = self.layout_string();
        trace!("Layout content: {}", content);

        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => {
                    self.set_status_message("Copied column layout to clipboard.".to_string())
                }
                Err(e) => {
                    trace!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Copying to clipboard failed!".to_string());
                }
            },
            None => self.set_status_message("Clipboard unavailable!".to_string()),
        }
    }

    // ----------------------- UIData bookkeeping --------------------------- //

    fn panel_progress(&self) -> f64 {
        let animation = self.config.animation_ms;
        let fraction = |start: Instant| {
            if animation == 0 {
                1.0
            } else {
                (start.elapsed().as_millis() as f64 / animation as f64).clamp(0.0, 1.0)
            }
        };
        match self.panel {
            PanelPhase::CLOSED => 0.0,
            PanelPhase::OPEN => 1.0,
            PanelPhase::OPENING(start) => fraction(start),
            PanelPhase::CLOSING(start) => 1.0 - fraction(start),
        }
    }

    fn update_panel_data(&mut self) {
        let rows = self
            .order
            .iter()
            .enumerate()
            .map(|(idx, id)| RowView {
                label: id.label().to_string(),
                checked: *self.visible.get(id).unwrap_or(&true),
                grabbed: self.grabbed && idx == self.curser_row,
            })
            .collect();

        self.uidata = UIData {
            rows,
            selected_row: self.curser_row,
            button_focused: self.modus == Modus::BUTTON,
            panel_visible: !matches!(self.panel, PanelPhase::CLOSED),
            panel_progress: self.panel_progress(),
            grab_active: self.grabbed,
            show_popup: self.modus == Modus::POPUP,
            popup_message: if self.modus == Modus::POPUP {
                HELP_TEXT.to_string()
            } else {
                String::new()
            },
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            last_update: Instant::now(),
        };
    }

    fn set_status_message(&mut self, message: String) {
        self.status_message = message;
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model() -> Model {
        // Zero length animation so open/close complete on the next tick.
        let cfg = CMConfig::default().event_poll_time(1).animation_ms(0);
        Model::init(&cfg, &[ColumnId::Category]).unwrap()
    }

    fn open_panel(model: &mut Model) {
        model.update(Message::TogglePanel).unwrap();
        model.tick();
    }

    #[test]
    fn default_visibility_hides_category_only() {
        let model = test_model();
        for c in ColumnId::ALL {
            let expected = c != ColumnId::Category;
            assert_eq!(model.visibility()[&c], expected, "column {:?}", c);
        }
    }

    #[test]
    fn panel_opens_and_done_closes() {
        let mut model = test_model();
        assert!(!model.panel_active());

        open_panel(&mut model);
        assert!(model.panel_active());
        assert!(model.get_uidata().panel_visible);

        model.update(Message::Done).unwrap();
        model.tick();
        assert!(!model.panel_active());
        assert!(!model.get_uidata().panel_visible);
    }

    #[test]
    fn trigger_twice_returns_to_closed() {
        let mut model = test_model();
        model.update(Message::TogglePanel).unwrap();
        model.update(Message::TogglePanel).unwrap();
        model.tick();
        assert!(!model.panel_active());
        assert!(!model.get_uidata().panel_visible);
    }

    #[test]
    fn toggle_flips_only_the_selected_flag() {
        let mut model = test_model();
        open_panel(&mut model);

        // Move to "category" (index 2) and toggle it twice.
        model.update(Message::MoveDown).unwrap();
        model.update(Message::MoveDown).unwrap();
        let before: HashMap<ColumnId, bool> = model.visibility().clone();

        model.update(Message::ToggleVisibility).unwrap();
        assert!(model.visibility()[&ColumnId::Category]);
        for c in ColumnId::ALL {
            if c != ColumnId::Category {
                assert_eq!(model.visibility()[&c], before[&c]);
            }
        }

        model.update(Message::ToggleVisibility).unwrap();
        assert!(!model.visibility()[&ColumnId::Category]);
        for c in ColumnId::ALL {
            if c != ColumnId::Category {
                assert_eq!(model.visibility()[&c], before[&c]);
            }
        }
    }

    #[test]
    fn visibility_map_keeps_all_entries() {
        let mut model = test_model();
        open_panel(&mut model);

        for _ in 0..20 {
            model.update(Message::ToggleVisibility).unwrap();
            model.update(Message::MoveDown).unwrap();
            model.update(Message::ToggleVisibility).unwrap();
        }
        assert_eq!(model.visibility().len(), ColumnId::ALL.len());
        for c in ColumnId::ALL {
            assert!(model.visibility().contains_key(&c));
        }
    }

    #[test]
    fn reorder_status_to_the_top() {
        let mut model = test_model();
        open_panel(&mut model);
        let flags_before = model.visibility().clone();

        // "status" sits at index 4; grab it and move it to index 0.
        for _ in 0..4 {
            model.update(Message::MoveDown).unwrap();
        }
        model.update(Message::ToggleGrab).unwrap();
        for _ in 0..4 {
            model.update(Message::MoveUp).unwrap();
        }
        model.update(Message::ToggleGrab).unwrap();

        assert_eq!(
            model.column_order(),
            &[
                ColumnId::Status,
                ColumnId::Location,
                ColumnId::NumbersOfFlat,
                ColumnId::Category,
                ColumnId::Type,
                ColumnId::PublishDate,
                ColumnId::ActiveInactive,
            ]
        );
        assert_eq!(model.visibility(), &flags_before);
    }

    #[test]
    fn order_stays_a_permutation() {
        let mut model = test_model();
        open_panel(&mut model);

        for step in 0..15 {
            model.update(Message::ToggleGrab).unwrap();
            let movement = if step % 2 == 0 {
                Message::MoveDown
            } else {
                Message::MoveUp
            };
            for _ in 0..step {
                model.update(movement).unwrap();
            }
            model.update(Message::ToggleGrab).unwrap();
        }

        let mut seen: Vec<ColumnId> = model.column_order().to_vec();
        seen.sort_by_key(|c| c.tag());
        let mut expected: Vec<ColumnId> = ColumnId::ALL.to_vec();
        expected.sort_by_key(|c| c.tag());
        assert_eq!(seen, expected);
    }

    #[test]
    fn cancel_grab_restores_the_order() {
        let mut model = test_model();
        open_panel(&mut model);
        let before = model.column_order().to_vec();

        model.update(Message::ToggleGrab).unwrap();
        model.update(Message::MoveDown).unwrap();
        model.update(Message::MoveDown).unwrap();
        model.update(Message::Exit).unwrap();

        assert_eq!(model.column_order(), &before[..]);
        assert!(model.panel_active());
    }

    #[test]
    fn grabbed_release_commits_interim_order() {
        let mut model = test_model();
        open_panel(&mut model);

        model.update(Message::ToggleGrab).unwrap();
        model.update(Message::MoveDown).unwrap();
        // Enter releases the grab instead of closing the panel.
        model.update(Message::Done).unwrap();
        assert!(model.panel_active());
        assert_eq!(model.column_order()[1], ColumnId::Location);
        assert_eq!(model.column_order()[0], ColumnId::NumbersOfFlat);
    }

    #[test]
    fn cursor_does_not_wrap() {
        let mut model = test_model();
        open_panel(&mut model);

        model.update(Message::MoveUp).unwrap();
        assert_eq!(model.get_uidata().selected_row, 0);
        for _ in 0..10 {
            model.update(Message::MoveDown).unwrap();
        }
        assert_eq!(model.get_uidata().selected_row, ColumnId::ALL.len() - 1);
    }

    #[test]
    fn layout_string_lists_visible_columns_in_order() {
        let mut model = test_model();
        assert_eq!(
            model.layout_string(),
            "location,numbersOfFlat,type,status,publishDate,activeInactive"
        );

        open_panel(&mut model);
        model.update(Message::ToggleVisibility).unwrap(); // hide location
        assert_eq!(
            model.layout_string(),
            "numbersOfFlat,type,status,publishDate,activeInactive"
        );
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = test_model();
        model.update(Message::Help).unwrap();
        assert!(model.popup_active());
        assert!(model.get_uidata().show_popup);

        model.update(Message::Exit).unwrap();
        assert!(!model.popup_active());
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn quit_from_any_modus() {
        let mut model = test_model();
        model.update(Message::Quit).unwrap();
        assert_eq!(model.status, Status::QUITTING);

        let mut model = test_model();
        open_panel(&mut model);
        model.update(Message::Quit).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }
}
