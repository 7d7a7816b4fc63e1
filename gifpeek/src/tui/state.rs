// ABOUTME: Browser list state: items, selection, scroll offset and the status line
// ABOUTME: Navigation methods report whether the selection actually changed

use crate::image_protocols::iterm2::extract_filename_from_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserItem {
    /// URL or path, also the cache key
    pub source: String,
    pub label: String,
}

impl BrowserItem {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let label = extract_filename_from_url(&source);
        Self { source, label }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    items: Vec<BrowserItem>,
    selected: usize,
    scroll: usize,
    status: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: sources.into_iter().map(BrowserItem::new).collect(),
            dirty: true,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[BrowserItem] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&BrowserItem> {
        self.items.get(self.selected)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
        self.dirty = true;
    }

    pub fn clear_status(&mut self) {
        if self.status.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn select_next(&mut self) -> bool {
        self.select(self.selected.saturating_add(1))
    }

    pub fn select_previous(&mut self) -> bool {
        self.select(self.selected.saturating_sub(1))
    }

    pub fn select_first(&mut self) -> bool {
        self.select(0)
    }

    pub fn select_last(&mut self) -> bool {
        self.select(self.items.len().saturating_sub(1))
    }

    fn select(&mut self, index: usize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let index = index.min(self.items.len() - 1);
        if index == self.selected {
            return false;
        }
        self.selected = index;
        self.status = None;
        self.dirty = true;
        true
    }

    /// Adjust the scroll offset so the selection fits in `height` rows
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
        let max_scroll = self.items.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(count: usize) -> AppState {
        AppState::new((0..count).map(|i| format!("https://example.test/{i}.gif")))
    }

    #[test]
    fn test_labels_are_filenames() {
        let state = AppState::new(["https://example.test/media/cat.gif?x=1", "./local/dog.gif"]);
        assert_eq!(state.items()[0].label, "cat.gif");
        assert_eq!(state.items()[1].label, "dog.gif");
        assert_eq!(state.items()[1].source, "./local/dog.gif");
    }

    #[test]
    fn test_navigation_reports_changes() {
        let mut state = state(3);
        assert_eq!(state.selected_index(), Some(0));
        assert!(!state.select_previous());
        assert!(state.select_next());
        assert!(state.select_last());
        assert!(!state.select_next());
        assert_eq!(state.selected_index(), Some(2));
        assert!(state.select_first());
        assert_eq!(state.selected().unwrap().label, "0.gif");
    }

    #[test]
    fn test_empty_list() {
        let mut state = state(0);
        assert_eq!(state.selected_index(), None);
        assert!(state.selected().is_none());
        assert!(!state.select_next());
        assert!(!state.select_last());
    }

    #[test]
    fn test_selection_clears_status() {
        let mut state = state(2);
        state.set_status("fetch failed");
        state.mark_clean();
        state.select_next();
        assert_eq!(state.status(), None);
        assert!(state.is_dirty());
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut state = state(10);
        state.select_last();
        state.ensure_visible(4);
        assert_eq!(state.scroll(), 6);

        state.select_first();
        state.ensure_visible(4);
        assert_eq!(state.scroll(), 0);

        state.ensure_visible(20);
        assert_eq!(state.scroll(), 0);
    }
}
