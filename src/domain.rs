use derive_setters::Setters;
use std::io::Error;

// Crate wide error type. All ambient failures (terminal io, logging setup)
// are funneled into this enum; the column operations themselves are total.
#[derive(Debug)]
pub enum CMError {
    IoError(Error),
    LoggingFailed(String),
}

impl From<Error> for CMError {
    fn from(err: Error) -> Self {
        CMError::IoError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct CMConfig {
    /// How long the controller blocks waiting for a key event, in ms.
    /// This also sets the frame rate of the open/close animation.
    pub event_poll_time: u64,
    /// Duration of the panel open/close animation, in ms.
    pub animation_ms: u64,
}

impl Default for CMConfig {
    fn default() -> Self {
        CMConfig {
            event_poll_time: 33,
            animation_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    TogglePanel,
    Done,
    Exit,
    MoveUp,
    MoveDown,
    ToggleVisibility,
    ToggleGrab,
    CopyLayout,
    Help,
}

pub const HELP_TEXT: &str = "\
 Enter/Space/m  open the column panel
 Up/Down, k/j   select a column row
 Space          show/hide the column
 g              grab / release a row
 Up/Down        move a grabbed row
 Esc            cancel grab, close panel
 Enter          done (close the panel)
 y              copy visible layout
 ?              this help
 q              quit";
