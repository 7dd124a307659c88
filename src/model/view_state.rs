use crate::model::plugin::{PageResult, PluginSummary};

/// Shown in place of the grid when a fetch fails. The technical cause goes to the log.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch plugin metadata, check your network.";

/// Exactly one of these drives what the body renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Loading,
    Error(String),
    Ready {
        items: Vec<PluginSummary>,
        total_count: u64,
        has_next_page: bool,
    },
}

impl ViewState {
    pub fn ready(page: PageResult) -> Self {
        Self::Ready {
            items: page.items,
            total_count: page.total_count,
            has_next_page: page.has_next_page,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Loading => "LOADING",
            ViewState::Error(_) => "ERROR",
            ViewState::Ready { .. } => "READY",
        }
    }

    pub fn items(&self) -> &[PluginSummary] {
        match self {
            ViewState::Ready { items, .. } => items,
            _ => &[],
        }
    }

    pub fn has_next_page(&self) -> bool {
        matches!(
            self,
            ViewState::Ready {
                has_next_page: true,
                ..
            }
        )
    }
}

/// Monotonic request generation. Only the newest issued request may apply its result.
#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    closed: bool,
}

impl RequestTracker {
    /// Issue a new generation, superseding every earlier one.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn is_current(&self, generation: u64) -> bool {
        !self.closed && generation == self.issued
    }

    /// Reject every outstanding and future result. Used on teardown.
    pub fn close(&mut self) {
        self.closed = true;
    }
}
