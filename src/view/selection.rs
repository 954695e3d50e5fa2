//! Selection, row activation, menus and layout.

use std::collections::HashSet;

use super::{DirectoryView, RowOutcome, ViewMode};
use crate::listing::{EntryKind, ListingEntry};

impl DirectoryView {
    /// Ids currently selected.
    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    /// Check whether an entry is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Add or remove a single entry from the selection.
    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
    }

    /// Resolve a row activation into the action the host should take.
    ///
    /// A modifier click toggles selection regardless of entry kind. A plain
    /// click enters directories and downloads files; upload placeholders are
    /// not activatable and never reach this.
    pub fn handle_row_click(&mut self, kind: EntryKind, id: &str, multi_select: bool) -> RowOutcome {
        if multi_select {
            self.toggle_selected(id);
            return RowOutcome::SelectionToggled;
        }
        match kind {
            EntryKind::Directory => RowOutcome::EnterDirectory(id.to_string()),
            EntryKind::File => RowOutcome::Download(self.api.file_download_url(id)),
        }
    }

    /// Select every server-side entry, or clear the selection if everything
    /// is already selected. The upload placeholder is never part of the
    /// selection; it has no server id to act on.
    pub fn toggle_select_all(&mut self) {
        let total = self.directories.len() + self.files.len();
        if self.selection.len() == total {
            self.selection.clear();
            return;
        }
        self.selection = self
            .directories
            .iter()
            .map(|d| d.id.clone())
            .chain(self.files.iter().map(|f| f.id.clone()))
            .collect();
    }

    /// Entry id whose context menu is open, if any.
    pub fn context_menu(&self) -> Option<&str> {
        self.context_menu.as_deref()
    }

    /// Open the context menu for an entry, or close it when it is already
    /// open for the same entry.
    pub fn toggle_context_menu(&mut self, id: &str) {
        if self.context_menu.as_deref() == Some(id) {
            self.context_menu = None;
        } else {
            self.context_menu = Some(id.to_string());
        }
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Entry shown in the details popup, if any.
    pub fn details(&self) -> Option<&ListingEntry> {
        self.details.as_ref()
    }

    /// Open the details popup for an entry. Closes the context menu it was
    /// invoked from.
    pub fn open_details(&mut self, entry: ListingEntry) {
        self.context_menu = None;
        self.details = Some(entry);
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    /// Current listing layout.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }
}
