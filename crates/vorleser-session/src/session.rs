// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document session — the page sequence being edited, the active page, and the
// live edit buffer.
//
// Every operation is total: navigation past either end and deleting from an
// empty document are no-ops, never errors. Any operation that leaves the
// active page first commits the edit buffer into it.

use tracing::debug;
use vorleser_document::normalize;

/// Editable, paginated text of one source document.
///
/// Invariant: `active_index < pages.len()` when pages exist, otherwise 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSession {
    pages: Vec<String>,
    active_index: usize,
    edit_buffer: String,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session loaded with `segments`, see [`load`](Self::load).
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = Self::new();
        session.load(segments);
        session
    }

    /// Replace the document with normalised `segments` and open the first
    /// page. Previous pages and any uncommitted edit are discarded.
    pub fn load<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pages = segments
            .into_iter()
            .map(|segment| normalize(segment.as_ref()))
            .collect();
        self.active_index = 0;
        self.refresh_buffer();
        debug!(pages = self.pages.len(), "Session loaded");
    }

    /// Empty the session.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.active_index = 0;
        self.edit_buffer.clear();
    }

    // -- Accessors -----------------------------------------------------------

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Live text of the active page, possibly not yet committed.
    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn can_go_previous(&self) -> bool {
        self.active_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.active_index + 1 < self.pages.len()
    }

    /// Replace the edit buffer (the editor's text changed).
    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        self.edit_buffer = text.into();
    }

    // -- Editing -------------------------------------------------------------

    /// Write the edit buffer into the active page. No-op on an empty document.
    pub fn commit_edit(&mut self) {
        if let Some(page) = self.pages.get_mut(self.active_index) {
            page.clone_from(&self.edit_buffer);
        }
    }

    /// Commit, then move to the previous page if there is one.
    pub fn go_previous(&mut self) {
        self.commit_edit();
        if self.can_go_previous() {
            self.active_index -= 1;
            self.refresh_buffer();
        }
    }

    /// Commit, then move to the next page if there is one.
    pub fn go_next(&mut self) {
        self.commit_edit();
        if self.can_go_next() {
            self.active_index += 1;
            self.refresh_buffer();
        }
    }

    /// Remove the active page. The page that slides into its slot becomes
    /// active; deleting the last page activates the new last page.
    pub fn delete_active(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        self.pages.remove(self.active_index);
        self.active_index = self.active_index.min(self.pages.len().saturating_sub(1));
        self.refresh_buffer();
        debug!(pages = self.pages.len(), active = self.active_index, "Page deleted");
    }

    /// Commit, then insert a page holding `text` after the active page and
    /// make it active. On an empty document the page becomes page 0.
    pub fn insert_after_active(&mut self, text: impl Into<String>) {
        self.commit_edit();
        let index = if self.pages.is_empty() {
            0
        } else {
            self.active_index + 1
        };
        self.pages.insert(index, text.into());
        self.active_index = index;
        self.refresh_buffer();
        debug!(pages = self.pages.len(), active = self.active_index, "Page inserted");
    }

    /// Commit, then join all pages with `\n`.
    pub fn assemble(&mut self) -> String {
        self.commit_edit();
        self.pages.join("\n")
    }

    fn refresh_buffer(&mut self) {
        self.edit_buffer = self
            .pages
            .get(self.active_index)
            .cloned()
            .unwrap_or_default();
    }
}
