use crate::miniapp::form::DateField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    GroupId,
    StartDate,
    EndDate,
    Count,
    CountSlider,
    TargetChat,
    ShortcutName,
    ShortcutId,
    SaveShortcut,
    ShortcutList,
    MainButton,
}

impl Field {
    pub const ORDER: [Field; 11] = [
        Field::GroupId,
        Field::StartDate,
        Field::EndDate,
        Field::Count,
        Field::CountSlider,
        Field::TargetChat,
        Field::ShortcutName,
        Field::ShortcutId,
        Field::SaveShortcut,
        Field::ShortcutList,
        Field::MainButton,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::GroupId => "Community",
            Field::StartDate => "From",
            Field::EndDate => "To",
            Field::Count => "Posts",
            Field::CountSlider => "",
            Field::TargetChat => "Target chat",
            Field::ShortcutName => "Name",
            Field::ShortcutId => "Community ID",
            Field::SaveShortcut => "",
            Field::ShortcutList => "Saved",
            Field::MainButton => "",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::GroupId | Field::Count | Field::TargetChat | Field::ShortcutName | Field::ShortcutId
        )
    }

    pub fn date(self) -> Option<DateField> {
        match self {
            Field::StartDate => Some(DateField::Start),
            Field::EndDate => Some(DateField::End),
            _ => None,
        }
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Which field has focus, and the highlighted row of the shortcut list.
#[derive(Debug, Clone)]
pub struct FocusState {
    pub field: Field,
    pub shortcut_index: usize,
}

impl Default for FocusState {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusState {
    pub fn new() -> Self {
        Self {
            field: Field::GroupId,
            shortcut_index: 0,
        }
    }

    /// Moves forward, skipping targets that are not shown right now.
    pub fn next(&mut self, is_available: impl Fn(Field) -> bool) {
        self.step(1, is_available);
    }

    pub fn prev(&mut self, is_available: impl Fn(Field) -> bool) {
        self.step(Field::ORDER.len() - 1, is_available);
    }

    fn step(&mut self, offset: usize, is_available: impl Fn(Field) -> bool) {
        let len = Field::ORDER.len();
        let mut position = self.field.position();
        for _ in 0..len {
            position = (position + offset) % len;
            let candidate = Field::ORDER[position];
            if is_available(candidate) {
                self.field = candidate;
                return;
            }
        }
    }

    pub fn move_shortcut_up(&mut self) {
        self.shortcut_index = self.shortcut_index.saturating_sub(1);
    }

    pub fn move_shortcut_down(&mut self, len: usize) {
        if self.shortcut_index + 1 < len {
            self.shortcut_index += 1;
        }
    }

    /// Keeps the highlighted row inside a list that may have shrunk.
    pub fn clamp_shortcut(&mut self, len: usize) {
        self.shortcut_index = self.shortcut_index.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_focuses_group() {
        let focus = FocusState::default();
        assert_eq!(focus.field, Field::GroupId);
        assert_eq!(focus.shortcut_index, 0);
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let mut focus = FocusState::new();
        focus.prev(|_| true);
        assert_eq!(focus.field, Field::MainButton);
        focus.next(|_| true);
        assert_eq!(focus.field, Field::GroupId);
        focus.next(|_| true);
        assert_eq!(focus.field, Field::StartDate);
    }

    #[test]
    fn test_skips_unavailable_fields() {
        let mut focus = FocusState::new();
        focus.field = Field::SaveShortcut;
        focus.next(|f| f != Field::ShortcutList && f != Field::MainButton);
        assert_eq!(focus.field, Field::GroupId);
    }

    #[test]
    fn test_shortcut_row_movement() {
        let mut focus = FocusState::new();
        focus.move_shortcut_up();
        assert_eq!(focus.shortcut_index, 0);
        focus.move_shortcut_down(3);
        focus.move_shortcut_down(3);
        focus.move_shortcut_down(3);
        assert_eq!(focus.shortcut_index, 2);
        focus.clamp_shortcut(1);
        assert_eq!(focus.shortcut_index, 0);
    }

    #[test]
    fn test_field_kinds() {
        assert!(Field::Count.is_text());
        assert!(!Field::CountSlider.is_text());
        assert_eq!(Field::EndDate.date(), Some(DateField::End));
        assert_eq!(Field::GroupId.date(), None);
    }
}
