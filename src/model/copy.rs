use std::time::{Duration, Instant};

/// Name of the ecosystem's command-line tool.
pub const CLI_NAME: &str = "yoapi";

/// How long a card keeps its "copied" label.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(3000);

pub const COPY_LABEL: &str = "[ copy install command ]";
pub const COPIED_LABEL: &str = "[ copied! ]";

pub fn install_command(full_name: &str) -> String {
    format!("{CLI_NAME} install {full_name}")
}

/// At most one card is "recently copied" at a time.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    active: Option<(usize, Instant)>,
}

impl CopyFeedback {
    /// Mark `index` as copied until `now + COPY_FEEDBACK`, replacing any earlier mark.
    pub fn mark(&mut self, index: usize, now: Instant) {
        self.active = Some((index, now + COPY_FEEDBACK));
    }

    /// Drop the mark once its own deadline has passed. Returns true if it cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.active.is_some_and(|(_, deadline)| now >= deadline) {
            self.active = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.map(|(index, _)| index)
    }

    pub fn is_copied(&self, index: usize) -> bool {
        self.active_index() == Some(index)
    }

    pub fn label(&self, index: usize) -> &'static str {
        if self.is_copied(index) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_format_is_exact() {
        assert_eq!(
            install_command("WaveYo/yoapi_plugin_demoapi"),
            "yoapi install WaveYo/yoapi_plugin_demoapi"
        );
    }

    #[test]
    fn feedback_expires_after_three_seconds() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::default();
        feedback.mark(2, start);
        assert_eq!(feedback.label(2), COPIED_LABEL);

        assert!(!feedback.expire(start + Duration::from_millis(2999)));
        assert!(feedback.is_copied(2));

        assert!(feedback.expire(start + Duration::from_millis(3000)));
        assert_eq!(feedback.label(2), COPY_LABEL);
    }

    #[test]
    fn newer_copy_supersedes_and_keeps_its_own_deadline() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::default();
        feedback.mark(0, start);
        feedback.mark(5, start + Duration::from_millis(2000));

        assert!(!feedback.is_copied(0));
        assert!(feedback.is_copied(5));

        // The first copy's window would have closed here.
        assert!(!feedback.expire(start + Duration::from_millis(3500)));
        assert!(feedback.is_copied(5));

        assert!(feedback.expire(start + Duration::from_millis(5000)));
        assert_eq!(feedback.active_index(), None);
    }
}
