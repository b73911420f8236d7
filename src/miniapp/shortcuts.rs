use super::models::{Shortcut, ValidationError};
use super::storage::LocalStorage;
use log::{info, warn};
use thiserror::Error;

pub const SHORTCUTS_KEY: &str = "shortcuts";

pub const EMPTY_HINT: &str = "No saved communities yet. Add one below to fill the form in one click.";

#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to save shortcuts: {0:#}")]
    Storage(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Declined,
}

/// A deletion waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub index: usize,
    pub shortcut: Shortcut,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!("Delete shortcut \"{}\"?", self.shortcut.name)
    }
}

/// What the list panel shows. Exactly one of the list and the hint is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutListView {
    pub rows: Vec<Shortcut>,
}

impl ShortcutListView {
    pub fn list_visible(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn empty_hint_visible(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ShortcutStore {
    storage: Box<dyn LocalStorage>,
    items: Vec<Shortcut>,
}

impl ShortcutStore {
    /// Reads the persisted list. Missing or unreadable data yields an empty list.
    pub fn load(storage: Box<dyn LocalStorage>) -> Self {
        let items = match storage.get_item(SHORTCUTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Shortcut>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Ignoring malformed shortcut list: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read shortcut list: {:#}", e);
                Vec::new()
            }
        };
        Self { storage, items }
    }

    pub fn items(&self) -> &[Shortcut] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, name: &str, id: &str) -> Result<(), ShortcutError> {
        let name = name.trim();
        let id = id.trim();
        if name.is_empty() || id.is_empty() {
            return Err(ValidationError::IncompleteShortcut.into());
        }

        self.items.push(Shortcut::new(name, id));
        if let Err(e) = self.save() {
            self.items.pop();
            return Err(ShortcutError::Storage(e));
        }
        info!("Saved shortcut {:?} -> {:?}", name, id);
        Ok(())
    }

    pub fn select(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|shortcut| shortcut.id.as_str())
    }

    pub fn request_delete(&self, index: usize) -> Option<PendingDelete> {
        self.items.get(index).map(|shortcut| PendingDelete {
            index,
            shortcut: shortcut.clone(),
        })
    }

    /// Applies a deletion once the user has answered. Returns whether an entry was removed.
    pub fn complete_delete(
        &mut self,
        pending: PendingDelete,
        outcome: ConfirmOutcome,
    ) -> Result<bool, ShortcutError> {
        if outcome == ConfirmOutcome::Declined {
            return Ok(false);
        }
        if self.items.get(pending.index) != Some(&pending.shortcut) {
            warn!("Shortcut at {} changed before deletion was confirmed", pending.index);
            return Ok(false);
        }

        let removed = self.items.remove(pending.index);
        if let Err(e) = self.save() {
            self.items.insert(pending.index, removed);
            return Err(ShortcutError::Storage(e));
        }
        info!("Deleted shortcut {:?}", removed.name);
        Ok(true)
    }

    pub fn view(&self) -> ShortcutListView {
        ShortcutListView {
            rows: self.items.clone(),
        }
    }

    pub fn render_html(&self) -> String {
        let view = self.view();
        if view.empty_hint_visible() {
            return format!("<p class=\"empty-hint\">{}</p>\n", escape_html(EMPTY_HINT));
        }

        let mut html = String::from("<ul class=\"shortcuts\">\n");
        for (index, shortcut) in view.rows.iter().enumerate() {
            html.push_str(&format!(
                "  <li data-index=\"{}\"><span class=\"name\">{}</span> <span class=\"id\">{}</span></li>\n",
                index,
                escape_html(&shortcut.name),
                escape_html(&shortcut.id)
            ));
        }
        html.push_str("</ul>\n");
        html
    }

    fn save(&mut self) -> anyhow::Result<()> {
        let data = serde_json::to_string(&self.items)?;
        self.storage.set_item(SHORTCUTS_KEY, &data)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Drops control characters so stored values cannot drive the terminal.
pub fn display_safe(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miniapp::storage::{FileStorage, MemoryStorage};
    use tempfile::TempDir;

    fn store_with(items: &[(&str, &str)]) -> ShortcutStore {
        let mut store = ShortcutStore::load(Box::new(MemoryStorage::new()));
        for (name, id) in items {
            store.add(name, id).unwrap();
        }
        store
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = ShortcutStore::load(Box::new(MemoryStorage::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        for raw in ["not json", "{\"name\":\"a\"}", "[{\"name\":1}]"] {
            let storage = MemoryStorage::new().with_item(SHORTCUTS_KEY, raw);
            let store = ShortcutStore::load(Box::new(storage));
            assert!(store.is_empty(), "raw {raw:?}");
        }
    }

    #[test]
    fn test_add_rejects_incomplete() {
        let dir = TempDir::new().unwrap();
        let mut store = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        store.add("Durov", "durov").unwrap();

        for (name, id) in [("", "x"), ("x", ""), ("  ", "x"), ("x", "\t")] {
            let err = store.add(name, id).unwrap_err();
            assert!(matches!(err, ShortcutError::Validation(ValidationError::IncompleteShortcut)));
        }
        assert_eq!(store.len(), 1);

        let reloaded = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reloaded.items(), &[Shortcut::new("Durov", "durov")]);
    }

    #[test]
    fn test_add_persists_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        store.add("First", "111").unwrap();
        store.add("  Second ", " second ").unwrap();

        let reloaded = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        assert_eq!(
            reloaded.items(),
            &[Shortcut::new("First", "111"), Shortcut::new("Second", "second")]
        );
    }

    #[test]
    fn test_add_rolls_back_when_storage_fails() {
        let mut store = ShortcutStore::load(Box::new(MemoryStorage::failing()));
        let err = store.add("Durov", "durov").unwrap_err();
        assert!(matches!(err, ShortcutError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_select() {
        let store = store_with(&[("A", "a"), ("B", "b")]);
        assert_eq!(store.select(1), Some("b"));
        assert_eq!(store.select(2), None);
    }

    #[test]
    fn test_delete_declined_keeps_list() {
        let dir = TempDir::new().unwrap();
        let mut store = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        store.add("A", "a").unwrap();
        store.add("B", "b").unwrap();

        let pending = store.request_delete(0).unwrap();
        assert!(!store.complete_delete(pending, ConfirmOutcome::Declined).unwrap());
        assert_eq!(store.len(), 2);

        let reloaded = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reloaded.items(), &[Shortcut::new("A", "a"), Shortcut::new("B", "b")]);
    }

    #[test]
    fn test_delete_confirmed_removes_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        for (name, id) in [("A", "a"), ("B", "b"), ("C", "c")] {
            store.add(name, id).unwrap();
        }

        let pending = store.request_delete(1).unwrap();
        assert_eq!(pending.prompt(), "Delete shortcut \"B\"?");
        assert!(store.complete_delete(pending, ConfirmOutcome::Confirmed).unwrap());

        let reloaded = ShortcutStore::load(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reloaded.items(), &[Shortcut::new("A", "a"), Shortcut::new("C", "c")]);
    }

    #[test]
    fn test_delete_out_of_bounds() {
        let store = store_with(&[("A", "a")]);
        assert!(store.request_delete(5).is_none());
    }

    #[test]
    fn test_stale_pending_delete_is_ignored() {
        let mut store = store_with(&[("A", "a"), ("B", "b")]);
        let pending = store.request_delete(1).unwrap();
        let first = store.request_delete(0).unwrap();
        store.complete_delete(first, ConfirmOutcome::Confirmed).unwrap();

        assert!(!store.complete_delete(pending, ConfirmOutcome::Confirmed).unwrap());
        assert_eq!(store.items(), &[Shortcut::new("B", "b")]);
    }

    #[test]
    fn test_view_visibility_is_exclusive() {
        let mut store = store_with(&[]);
        let view = store.view();
        assert!(view.empty_hint_visible() && !view.list_visible());

        store.add("A", "a").unwrap();
        let view = store.view();
        assert!(view.list_visible() && !view.empty_hint_visible());
    }

    #[test]
    fn test_render_html_escapes_user_values() {
        let store = store_with(&[("<script>alert('x')</script>", "a&b\"c")]);
        let html = store.render_html();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a&amp;b&quot;c"));
        assert!(html.starts_with("<ul class=\"shortcuts\">"));
    }

    #[test]
    fn test_render_html_empty_hint() {
        let store = store_with(&[]);
        let html = store.render_html();
        assert!(html.starts_with("<p class=\"empty-hint\">"));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn test_display_safe_strips_escapes() {
        assert_eq!(display_safe("news\u{1b}[2Jfeed\n"), "news[2Jfeed");
    }
}
