use crossterm::event::KeyEvent;

use crate::model::plugin::PageResult;
use crate::registry::RegistryError;

/// Direction for card selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Resize(u16, u16),

    // -- Navigation
    MoveSelection(Direction),
    NextPage,
    PrevPage,

    // -- Search
    SetSearchTerm(String),

    // -- Registry
    Reload,
    ToggleDataSource,
    /// Completion of the fetch issued as `generation`.
    PageLoaded {
        generation: u64,
        result: Result<PageResult, RegistryError>,
    },

    // -- Card actions
    CopyInstallCommand(usize),
    OpenRepository(usize),

    // -- System
    Tick,
    Quit,
}
