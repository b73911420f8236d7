use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_normal_mode_key(key_event: KeyEvent) -> NormalModeAction {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        match key_event.code {
            KeyCode::Char('c') if ctrl => NormalModeAction::Quit,
            KeyCode::Char('s') if ctrl => NormalModeAction::PressMainButton,
            KeyCode::Char('q') => NormalModeAction::Quit,
            KeyCode::Up => NormalModeAction::Up,
            KeyCode::Down => NormalModeAction::Down,
            KeyCode::Tab => NormalModeAction::FocusNext,
            KeyCode::BackTab => NormalModeAction::FocusPrev,
            KeyCode::Left => NormalModeAction::Decrease,
            KeyCode::Right => NormalModeAction::Increase,
            KeyCode::PageDown => NormalModeAction::DecreaseMore,
            KeyCode::PageUp => NormalModeAction::IncreaseMore,
            KeyCode::Enter => NormalModeAction::Activate,
            KeyCode::Char('t') => NormalModeAction::Today,
            KeyCode::Char('d') | KeyCode::Delete => NormalModeAction::DeleteShortcut,
            KeyCode::Char('?') => NormalModeAction::ToggleHelpMode,
            _ => NormalModeAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                HelpModeAction::ExitHelpMode
            }
            _ => HelpModeAction::None,
        }
    }

    pub fn handle_edit_mode_key(key_event: KeyEvent) -> EditModeAction {
        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            return match key_event.code {
                KeyCode::Char('w') | KeyCode::Backspace => EditModeAction::DeleteWordBackward,
                KeyCode::Char('a') => EditModeAction::MoveCursorHome,
                KeyCode::Char('e') => EditModeAction::MoveCursorEnd,
                _ => EditModeAction::None,
            };
        }
        match key_event.code {
            KeyCode::Esc => EditModeAction::CancelEdit,
            KeyCode::Enter | KeyCode::Tab => EditModeAction::ConfirmEdit,
            KeyCode::Backspace => EditModeAction::Backspace,
            KeyCode::Delete => EditModeAction::Delete,
            KeyCode::Left => EditModeAction::MoveCursorLeft,
            KeyCode::Right => EditModeAction::MoveCursorRight,
            KeyCode::Home => EditModeAction::MoveCursorHome,
            KeyCode::End => EditModeAction::MoveCursorEnd,
            KeyCode::Char(c) => EditModeAction::InsertChar(c),
            _ => EditModeAction::None,
        }
    }

    pub fn handle_modal_key(key_event: KeyEvent) -> ModalAction {
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ModalAction::Accept,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalAction::Decline,
            _ => ModalAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalModeAction {
    None,
    Quit,
    Up,
    Down,
    FocusNext,
    FocusPrev,
    Decrease,
    Increase,
    DecreaseMore,
    IncreaseMore,
    Activate,
    Today,
    DeleteShortcut,
    PressMainButton,
    ToggleHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum EditModeAction {
    None,
    CancelEdit,
    ConfirmEdit,
    Backspace,
    Delete,
    DeleteWordBackward,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    InsertChar(char),
}

#[derive(Debug, PartialEq)]
pub enum ModalAction {
    None,
    Accept,
    Decline,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(code: KeyCode) -> KeyEvent {
        let mut key_event = KeyEvent::from(code);
        key_event.modifiers = KeyModifiers::CONTROL;
        key_event
    }

    #[test]
    fn test_normal_mode_basic_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Quit);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Activate);

        let key_event = KeyEvent::from(KeyCode::Char('t'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Today);

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::None);
    }

    #[test]
    fn test_normal_mode_navigation_keys() {
        let key_event = KeyEvent::from(KeyCode::Tab);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::FocusNext);

        let key_event = KeyEvent::from(KeyCode::BackTab);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::FocusPrev);

        let key_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Up);

        let key_event = KeyEvent::from(KeyCode::PageUp);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::IncreaseMore);
    }

    #[test]
    fn test_normal_mode_ctrl_keys() {
        assert_eq!(
            KeyHandler::handle_normal_mode_key(ctrl(KeyCode::Char('c'))),
            NormalModeAction::Quit
        );
        assert_eq!(
            KeyHandler::handle_normal_mode_key(ctrl(KeyCode::Char('s'))),
            NormalModeAction::PressMainButton
        );
    }

    #[test]
    fn test_normal_mode_delete_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('d'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::DeleteShortcut);

        let key_event = KeyEvent::from(KeyCode::Delete);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::DeleteShortcut);
    }

    #[test]
    fn test_help_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::ExitHelpMode);

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::None);
    }

    #[test]
    fn test_edit_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_edit_mode_key(key_event), EditModeAction::CancelEdit);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_edit_mode_key(key_event), EditModeAction::ConfirmEdit);

        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(KeyHandler::handle_edit_mode_key(key_event), EditModeAction::InsertChar('q'));

        assert_eq!(
            KeyHandler::handle_edit_mode_key(ctrl(KeyCode::Char('w'))),
            EditModeAction::DeleteWordBackward
        );
        assert_eq!(
            KeyHandler::handle_edit_mode_key(ctrl(KeyCode::Char('x'))),
            EditModeAction::None
        );
    }

    #[test]
    fn test_modal_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('y'));
        assert_eq!(KeyHandler::handle_modal_key(key_event), ModalAction::Accept);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_modal_key(key_event), ModalAction::Accept);

        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_modal_key(key_event), ModalAction::Decline);

        let key_event = KeyEvent::from(KeyCode::Char('z'));
        assert_eq!(KeyHandler::handle_modal_key(key_event), ModalAction::None);
    }
}
