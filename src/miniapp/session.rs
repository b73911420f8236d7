use log::{debug, info, warn};
use serde::Deserialize;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong while copying posts.";

/// Messages the host pushes back while it works on a submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    Progress { current: u64, total: u64 },
    Success { count: u64 },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Parses one inbound payload. Anything that is not a recognized notification is `None`;
/// the channel can carry unrelated traffic.
pub fn parse_notification(raw: &str) -> Option<Notification> {
    match serde_json::from_str::<Notification>(raw.trim()) {
        Ok(notification) => Some(notification),
        Err(e) => {
            debug!("Ignoring host message {:?}: {}", raw, e);
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(current: u64, total: u64) -> Self {
        Self {
            current: current.min(total),
            total,
        }
    }

    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        (self.current.saturating_mul(100) / self.total) as u16
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.current, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Processing(Progress),
    Success(u64),
    Error(String),
}

/// What pressing the main button does in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueAction {
    Submit,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainButton {
    pub text: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Working,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub glyph: &'static str,
    pub text: String,
}

#[derive(Debug)]
pub struct SessionCoordinator {
    state: SessionState,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, SessionState::Processing(_))
    }

    pub fn on_continue(&self) -> Option<ContinueAction> {
        match self.state {
            SessionState::Idle | SessionState::Error(_) => Some(ContinueAction::Submit),
            SessionState::Processing(_) => None,
            SessionState::Success(_) => Some(ContinueAction::Reset),
        }
    }

    pub fn main_button(&self) -> MainButton {
        match self.state {
            SessionState::Idle => MainButton {
                text: "Start copying",
                visible: true,
            },
            SessionState::Processing(_) => MainButton {
                text: "Start copying",
                visible: false,
            },
            SessionState::Success(_) => MainButton {
                text: "Copy more",
                visible: true,
            },
            SessionState::Error(_) => MainButton {
                text: "Retry",
                visible: true,
            },
        }
    }

    /// Enters Processing for a freshly validated submission.
    /// Returns false if a submission is already running.
    pub fn begin(&mut self) -> bool {
        if self.on_continue() != Some(ContinueAction::Submit) {
            return false;
        }
        self.state = SessionState::Processing(Progress::default());
        true
    }

    pub fn reset(&mut self) {
        if !self.is_processing() {
            self.state = SessionState::Idle;
        }
    }

    /// Ends the running submission locally, e.g. when the request never reached the host.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.is_processing() {
            self.state = SessionState::Error(message.into());
        }
    }

    /// Applies a notification. Returns whether anything visible changed.
    pub fn apply(&mut self, notification: Notification) -> bool {
        let SessionState::Processing(shown) = self.state else {
            warn!("Ignoring {:?} outside of a running submission", notification);
            return false;
        };

        match notification {
            Notification::Progress { current, total } => {
                let next = Progress::new(current, total);
                if next.total == shown.total && next.current < shown.current {
                    debug!("Ignoring stale progress {} after {}", next.label(), shown.label());
                    return false;
                }
                self.state = SessionState::Processing(next);
            }
            Notification::Success { count } => {
                info!("Host reported success: {} posts", count);
                self.state = SessionState::Success(count);
            }
            Notification::Error { message } => {
                let message = message
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
                warn!("Host reported error: {}", message);
                self.state = SessionState::Error(message);
            }
        }
        true
    }

    pub fn handle_message(&mut self, raw: &str) -> bool {
        match parse_notification(raw) {
            Some(notification) => self.apply(notification),
            None => false,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        match self.state {
            SessionState::Processing(progress) => Some(progress),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusLine> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Processing(progress) => Some(StatusLine {
                kind: StatusKind::Working,
                glyph: "⏳",
                text: if progress.total == 0 {
                    "Copying posts...".to_string()
                } else {
                    format!("Copying posts... {}", progress.label())
                },
            }),
            SessionState::Success(count) => Some(StatusLine {
                kind: StatusKind::Done,
                glyph: "✅",
                text: format!("Copied {} posts", count),
            }),
            SessionState::Error(message) => Some(StatusLine {
                kind: StatusKind::Failed,
                glyph: "❌",
                text: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SessionCoordinator::default().state(), &SessionState::Idle);
    }

    fn processing() -> SessionCoordinator {
        let mut session = SessionCoordinator::new();
        assert!(session.begin());
        session
    }

    #[test]
    fn test_parse_recognized_shapes() {
        assert_eq!(
            parse_notification(r#"{"type":"progress","current":3,"total":10}"#),
            Some(Notification::Progress { current: 3, total: 10 })
        );
        assert_eq!(
            parse_notification(r#"{"type":"success","count":7}"#),
            Some(Notification::Success { count: 7 })
        );
        assert_eq!(
            parse_notification(r#"{"type":"error"}"#),
            Some(Notification::Error { message: None })
        );
        assert_eq!(
            parse_notification(r#"{"type":"error","message":"Group is private"}"#),
            Some(Notification::Error {
                message: Some("Group is private".to_string())
            })
        );
    }

    #[test]
    fn test_parse_ignores_unrelated_traffic() {
        for raw in [
            "hello",
            "",
            "42",
            r#"{"type":"unknown"}"#,
            r#"{"current":1,"total":2}"#,
            r#"{"type":"progress","current":"a","total":2}"#,
            r#"{"type":"success"}"#,
        ] {
            assert_eq!(parse_notification(raw), None, "raw {raw:?}");
        }
    }

    #[test]
    fn test_initial_state() {
        let session = SessionCoordinator::new();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.on_continue(), Some(ContinueAction::Submit));
        assert_eq!(
            session.main_button(),
            MainButton {
                text: "Start copying",
                visible: true
            }
        );
        assert!(session.status().is_none());
    }

    #[test]
    fn test_begin_hides_button() {
        let session = processing();
        assert_eq!(session.state(), &SessionState::Processing(Progress::new(0, 0)));
        assert!(!session.main_button().visible);
        assert_eq!(session.on_continue(), None);
        assert_eq!(session.progress().unwrap().percent(), 0);
    }

    #[test]
    fn test_begin_twice_is_refused() {
        let mut session = processing();
        assert!(!session.begin());
    }

    #[test]
    fn test_progress_then_success() {
        let mut session = processing();

        assert!(session.handle_message(r#"{"type":"progress","current":3,"total":10}"#));
        let first = session.progress().unwrap();
        assert_eq!(first.percent(), 30);

        assert!(session.handle_message(r#"{"type":"progress","current":7,"total":10}"#));
        let second = session.progress().unwrap();
        assert_eq!(second.label(), "7/10");
        assert!(second.percent() >= first.percent());

        assert!(session.handle_message(r#"{"type":"success","count":7}"#));
        assert_eq!(session.state(), &SessionState::Success(7));
        assert_eq!(
            session.main_button(),
            MainButton {
                text: "Copy more",
                visible: true
            }
        );
        assert_eq!(session.on_continue(), Some(ContinueAction::Reset));
        assert_eq!(session.status().unwrap().text, "Copied 7 posts");
    }

    #[test]
    fn test_stale_progress_does_not_regress() {
        let mut session = processing();
        session.apply(Notification::Progress { current: 7, total: 10 });
        assert!(!session.apply(Notification::Progress { current: 3, total: 10 }));
        assert_eq!(session.progress().unwrap().label(), "7/10");
    }

    #[test]
    fn test_progress_clamps_current() {
        let mut session = processing();
        session.apply(Notification::Progress { current: 12, total: 10 });
        assert_eq!(session.progress().unwrap(), Progress::new(10, 10));
        assert_eq!(session.progress().unwrap().percent(), 100);
    }

    #[test]
    fn test_zero_total_is_zero_percent() {
        assert_eq!(Progress::new(0, 0).percent(), 0);
        assert_eq!(Progress::new(5, 0).label(), "0/0");
    }

    #[test]
    fn test_error_with_and_without_message() {
        let mut session = processing();
        session.handle_message(r#"{"type":"error","message":"Group not found"}"#);
        assert_eq!(session.state(), &SessionState::Error("Group not found".to_string()));
        assert_eq!(session.main_button().text, "Retry");
        assert_eq!(session.on_continue(), Some(ContinueAction::Submit));

        let mut session = processing();
        session.handle_message(r#"{"type":"error","message":"  "}"#);
        assert_eq!(session.state(), &SessionState::Error(GENERIC_ERROR_MESSAGE.to_string()));
    }

    #[test]
    fn test_malformed_message_keeps_state() {
        let mut session = processing();
        session.apply(Notification::Progress { current: 2, total: 4 });
        let before = session.state().clone();

        assert!(!session.handle_message("not json"));
        assert!(!session.handle_message(r#"{"type":"unknown"}"#));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_notifications_ignored_when_idle() {
        let mut session = SessionCoordinator::new();
        assert!(!session.apply(Notification::Success { count: 3 }));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_retry_after_error_goes_straight_to_processing() {
        let mut session = processing();
        session.apply(Notification::Error { message: None });
        assert!(session.begin());
        assert!(session.is_processing());
    }

    #[test]
    fn test_reset_after_success() {
        let mut session = processing();
        session.apply(Notification::Success { count: 1 });
        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_reset_does_not_abandon_running_submission() {
        let mut session = processing();
        session.reset();
        assert!(session.is_processing());
    }

    #[test]
    fn test_local_failure() {
        let mut session = processing();
        session.fail("Broken pipe");
        assert_eq!(session.state(), &SessionState::Error("Broken pipe".to_string()));
    }
}
