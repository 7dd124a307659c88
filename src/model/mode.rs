/// Application interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Browse mode: card navigation, paging, and copy actions.
    #[default]
    Browse,
    /// Search input, keystrokes edit the search term.
    Search,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Browse => "BROWSE",
            Mode::Search => "SEARCH",
        }
    }
}
