use crate::host::HostChannel;
use crate::miniapp::form::FormController;
use crate::miniapp::session::{ContinueAction, SessionCoordinator, SessionState};
use crate::miniapp::shortcuts::{ConfirmOutcome, PendingDelete, ShortcutError, ShortcutStore};
use crate::tui::edit::EditState;
use crate::tui::focus::{Field, FocusState};
use crate::tui::handlers::{
    EditModeAction, HelpModeAction, KeyHandler, ModalAction, NormalModeAction,
};
use crate::tui::theme::Theme;
use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyEvent;
use log::{debug, info, warn};

const HOST_STOPPED_MESSAGE: &str = "The copy service stopped before finishing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Light,
    Success,
    Warning,
}

/// An operation suspended until the user answers a yes/no prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    DeleteShortcut(PendingDelete),
}

impl PendingConfirm {
    pub fn prompt(&self) -> String {
        match self {
            PendingConfirm::DeleteShortcut(pending) => pending.prompt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Alert(String),
    Confirm(PendingConfirm),
}

pub struct App {
    pub form: FormController,
    pub shortcuts: ShortcutStore,
    pub session: SessionCoordinator,
    channel: Box<dyn HostChannel>,
    pub focus: FocusState,
    pub edit: Option<EditState>,
    pub shortcut_name: String,
    pub shortcut_id: String,
    pub modal: Option<Modal>,
    pub haptic: Option<Haptic>,
    pub theme: Theme,
    pub help_mode: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        form: FormController,
        shortcuts: ShortcutStore,
        channel: Box<dyn HostChannel>,
        theme: Theme,
    ) -> Self {
        Self {
            form,
            shortcuts,
            session: SessionCoordinator::new(),
            channel,
            focus: FocusState::new(),
            edit: None,
            shortcut_name: String::new(),
            shortcut_id: String::new(),
            modal: None,
            haptic: None,
            theme,
            help_mode: false,
            should_quit: false,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        self.haptic = None;
        if self.modal.is_some() {
            self.handle_modal_key(key_event)
        } else if self.help_mode {
            self.handle_help_mode_key(key_event)
        } else if self.edit.is_some() {
            self.handle_edit_mode_key(key_event)
        } else {
            self.handle_normal_mode_key(key_event)
        }
    }

    fn handle_normal_mode_key(&mut self, key_event: KeyEvent) -> Result<()> {
        match KeyHandler::handle_normal_mode_key(key_event) {
            NormalModeAction::None => {}
            NormalModeAction::Quit => self.should_quit = true,
            NormalModeAction::Up => {
                if self.focus.field == Field::ShortcutList && self.focus.shortcut_index > 0 {
                    self.focus.move_shortcut_up();
                } else {
                    self.focus_prev();
                }
            }
            NormalModeAction::Down => {
                if self.focus.field == Field::ShortcutList
                    && self.focus.shortcut_index + 1 < self.shortcuts.len()
                {
                    self.focus.move_shortcut_down(self.shortcuts.len());
                } else {
                    self.focus_next();
                }
            }
            NormalModeAction::FocusNext => self.focus_next(),
            NormalModeAction::FocusPrev => self.focus_prev(),
            NormalModeAction::Decrease => self.adjust(-1, false),
            NormalModeAction::Increase => self.adjust(1, false),
            NormalModeAction::DecreaseMore => self.adjust(-1, true),
            NormalModeAction::IncreaseMore => self.adjust(1, true),
            NormalModeAction::Activate => self.activate(),
            NormalModeAction::Today => {
                if let Some(date_field) = self.focus.field.date() {
                    self.form.set_date(date_field, Local::now().date_naive());
                }
            }
            NormalModeAction::DeleteShortcut => {
                if self.focus.field == Field::ShortcutList {
                    self.request_delete_shortcut(self.focus.shortcut_index);
                }
            }
            NormalModeAction::PressMainButton => self.press_main_button(),
            NormalModeAction::ToggleHelpMode => self.help_mode = true,
        }
        Ok(())
    }

    fn handle_help_mode_key(&mut self, key_event: KeyEvent) -> Result<()> {
        match KeyHandler::handle_help_mode_key(key_event) {
            HelpModeAction::ExitHelpMode => self.help_mode = false,
            HelpModeAction::None => {}
        }
        Ok(())
    }

    fn handle_edit_mode_key(&mut self, key_event: KeyEvent) -> Result<()> {
        let action = KeyHandler::handle_edit_mode_key(key_event);
        let Some(edit) = self.edit.as_mut() else {
            return Ok(());
        };

        match action {
            EditModeAction::None => return Ok(()),
            EditModeAction::CancelEdit => {
                self.cancel_edit();
                return Ok(());
            }
            EditModeAction::ConfirmEdit => {
                self.confirm_edit();
                return Ok(());
            }
            EditModeAction::Backspace => edit.backspace(),
            EditModeAction::Delete => edit.delete(),
            EditModeAction::DeleteWordBackward => edit.delete_word_backward(),
            EditModeAction::MoveCursorLeft => edit.move_cursor_left(),
            EditModeAction::MoveCursorRight => edit.move_cursor_right(),
            EditModeAction::MoveCursorHome => edit.move_cursor_home(),
            EditModeAction::MoveCursorEnd => edit.move_cursor_end(),
            EditModeAction::InsertChar(c) => edit.insert_char(c),
        }

        // The slider follows the count while it is being typed.
        if edit.field == Field::Count {
            let text = edit.buffer.clone();
            self.form.set_count_text(text);
        }
        Ok(())
    }

    fn handle_modal_key(&mut self, key_event: KeyEvent) -> Result<()> {
        let outcome = match KeyHandler::handle_modal_key(key_event) {
            ModalAction::None => return Ok(()),
            ModalAction::Accept => ConfirmOutcome::Confirmed,
            ModalAction::Decline => ConfirmOutcome::Declined,
        };

        match self.modal.take() {
            Some(Modal::Confirm(pending)) => self.complete_confirm(pending, outcome),
            Some(Modal::Alert(_)) | None => {}
        }
        Ok(())
    }

    pub fn is_available(&self, field: Field) -> bool {
        field_available(field, self.shortcuts.is_empty(), self.session.main_button().visible)
    }

    fn focus_next(&mut self) {
        let shortcuts_empty = self.shortcuts.is_empty();
        let button_visible = self.session.main_button().visible;
        self.focus
            .next(|f| field_available(f, shortcuts_empty, button_visible));
    }

    fn focus_prev(&mut self) {
        let shortcuts_empty = self.shortcuts.is_empty();
        let button_visible = self.session.main_button().visible;
        self.focus
            .prev(|f| field_available(f, shortcuts_empty, button_visible));
    }

    fn adjust(&mut self, direction: i64, more: bool) {
        let field = self.focus.field;
        if let Some(date_field) = field.date() {
            if more {
                self.form.shift_months(date_field, direction as i32);
            } else {
                self.form.shift_days(date_field, direction);
            }
        } else if field == Field::CountSlider {
            self.form.step_count_range(if more { direction * 10 } else { direction });
        }
    }

    fn activate(&mut self) {
        let field = self.focus.field;
        match field {
            f if f.is_text() => self.begin_edit(f),
            Field::SaveShortcut => self.save_shortcut(),
            Field::ShortcutList => self.select_shortcut(self.focus.shortcut_index),
            Field::MainButton => self.press_main_button(),
            _ => {}
        }
    }

    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::GroupId => self.form.group_id.clone(),
            Field::Count => self.form.count_text().to_string(),
            Field::TargetChat => self.form.target_chat.clone(),
            Field::ShortcutName => self.shortcut_name.clone(),
            Field::ShortcutId => self.shortcut_id.clone(),
            _ => String::new(),
        }
    }

    fn set_field_text(&mut self, field: Field, text: String) {
        match field {
            Field::GroupId => self.form.group_id = text,
            Field::Count => self.form.set_count_text(text),
            Field::TargetChat => self.form.target_chat = text,
            Field::ShortcutName => self.shortcut_name = text,
            Field::ShortcutId => self.shortcut_id = text,
            _ => {}
        }
    }

    fn begin_edit(&mut self, field: Field) {
        self.edit = Some(EditState::new(field, self.field_text(field)));
    }

    fn confirm_edit(&mut self) {
        if let Some(edit) = self.edit.take() {
            self.set_field_text(edit.field, edit.buffer);
        }
    }

    fn cancel_edit(&mut self) {
        if let Some(edit) = self.edit.take() {
            self.set_field_text(edit.field, edit.original);
        }
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.modal = Some(Modal::Alert(message.into()));
    }

    pub fn save_shortcut(&mut self) {
        match self.shortcuts.add(&self.shortcut_name, &self.shortcut_id) {
            Ok(()) => {
                self.shortcut_name.clear();
                self.shortcut_id.clear();
                self.haptic = Some(Haptic::Success);
            }
            Err(ShortcutError::Validation(e)) => {
                self.haptic = Some(Haptic::Warning);
                self.alert(e.to_string());
            }
            Err(e) => {
                warn!("{}", e);
                self.haptic = Some(Haptic::Warning);
                self.alert(e.to_string());
            }
        }
    }

    pub fn select_shortcut(&mut self, index: usize) {
        if let Some(id) = self.shortcuts.select(index) {
            self.form.group_id = id.to_string();
            self.haptic = Some(Haptic::Light);
            debug!("Filled community from shortcut {}", index);
        }
    }

    pub fn request_delete_shortcut(&mut self, index: usize) {
        if let Some(pending) = self.shortcuts.request_delete(index) {
            self.haptic = Some(Haptic::Light);
            self.modal = Some(Modal::Confirm(PendingConfirm::DeleteShortcut(pending)));
        }
    }

    /// Completion handler for a yes/no prompt.
    pub fn complete_confirm(&mut self, pending: PendingConfirm, outcome: ConfirmOutcome) {
        match pending {
            PendingConfirm::DeleteShortcut(pending) => {
                match self.shortcuts.complete_delete(pending, outcome) {
                    Ok(true) => {
                        self.haptic = Some(Haptic::Success);
                        self.focus.clamp_shortcut(self.shortcuts.len());
                        if self.shortcuts.is_empty() && self.focus.field == Field::ShortcutList {
                            self.focus.field = Field::SaveShortcut;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("{}", e);
                        self.alert(e.to_string());
                    }
                }
            }
        }
    }

    pub fn press_main_button(&mut self) {
        match self.session.on_continue() {
            Some(ContinueAction::Submit) => self.submit(),
            Some(ContinueAction::Reset) => {
                self.session.reset();
                self.haptic = Some(Haptic::Light);
            }
            None => debug!("Main button pressed while hidden"),
        }
    }

    fn submit(&mut self) {
        let validated = match self.form.validate() {
            Ok(validated) => validated,
            Err(e) => {
                self.haptic = Some(Haptic::Warning);
                self.alert(e.to_string());
                return;
            }
        };

        let request = self.form.build_request(validated);
        let payload = match request.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not encode request: {}", e);
                self.alert(format!("Could not prepare the request: {}", e));
                return;
            }
        };

        if !self.session.begin() {
            return;
        }
        if self.focus.field == Field::MainButton {
            self.focus.field = Field::GroupId;
        }
        info!(
            "Submitting copy of {} posts from {} ({} to {})",
            request.count, request.group_id, request.start_date, request.end_date
        );

        if let Err(e) = self.channel.send(&payload) {
            warn!("Could not reach host: {:#}", e);
            self.session.fail(format!("Could not reach the copy service: {:#}", e));
            self.haptic = Some(Haptic::Warning);
        }
    }

    /// Applies every notification the host has pushed since the last call.
    /// A host that went away while a submission runs ends it with an error.
    pub fn drain_host_messages(&mut self) -> bool {
        let mut changed = false;
        loop {
            let message = match self.channel.try_recv() {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    if self.session.is_processing() {
                        warn!("Host stopped during a submission: {:#}", e);
                        self.session.fail(HOST_STOPPED_MESSAGE);
                        self.haptic = Some(Haptic::Warning);
                        changed = true;
                    }
                    break;
                }
            };
            if self.session.handle_message(&message) {
                changed = true;
                match self.session.state() {
                    SessionState::Success(_) => self.haptic = Some(Haptic::Success),
                    SessionState::Error(_) => self.haptic = Some(Haptic::Warning),
                    SessionState::Idle | SessionState::Processing(_) => {}
                }
            }
        }
        changed
    }
}

fn field_available(field: Field, shortcuts_empty: bool, button_visible: bool) -> bool {
    match field {
        Field::ShortcutList => !shortcuts_empty,
        Field::MainButton => button_visible,
        _ => true,
    }
}
