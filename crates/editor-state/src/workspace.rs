/// The set of open documents plus everything they share: the clipboard,
/// the last search needle, the untitled-name counter, and the cached
/// terminal geometry.
///
/// Documents sit in a vector treated as a ring: next/prev rotate with
/// wraparound, a new document is spliced in right after the current one,
/// and closing focuses the predecessor. `current` is the single source of
/// truth for focus; operations that change it go through here.
#[derive(Debug)]
pub struct Workspace {
    docs: Vec<crate::document::Document>,
    current: Option<usize>,

    pub clipboard: Vec<u8>,
    /// Most recently queried search needle, shared across documents.
    pub search: Option<String>,
    pub view: crate::document::ViewSize,

    untitled: usize,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            docs: Vec::new(),
            current: None,
            clipboard: Vec::new(),
            search: None,
            view: crate::document::ViewSize { cols: 80, rows: 24 },
            untitled: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn docs(&self) -> &[crate::document::Document] {
        &self.docs
    }

    #[must_use]
    pub fn current(&self) -> Option<&crate::document::Document> {
        self.current.map(|i| &self.docs[i])
    }

    pub fn current_mut(&mut self) -> Option<&mut crate::document::Document> {
        self.current.map(|i| &mut self.docs[i])
    }
}

/*

==================================
======= RING MANAGEMENT ==========
==================================

*/

impl Workspace {
    /// Splices `doc` in after the current document and focuses it.
    pub fn add(&mut self, doc: crate::document::Document) {
        let at = match self.current {
            Some(i) => i + 1,
            None => 0,
        };
        self.docs.insert(at, doc);
        self.current = Some(at);
        self.docs[at].refresh = true;
    }

    /// Fresh untitled document, named by a running counter.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the buffer allocation fails.
    pub fn new_untitled(&mut self) -> editor_core::errors::BufferResult<()> {
        self.untitled += 1;
        let doc = crate::document::Document::untitled(format!("Untitled-{}", self.untitled))?;
        self.add(doc);
        Ok(())
    }

    /// Unlinks the current document; focus moves to its predecessor in the
    /// ring, or goes empty when it was the last one.
    pub fn close_current(&mut self) {
        let Some(idx) = self.current else {
            return;
        };
        let doc = self.docs.remove(idx);
        tracing::debug!(file = %doc.name(), "closed document");

        if self.docs.is_empty() {
            self.current = None;
        } else {
            let len = self.docs.len();
            let prev = (idx + len - 1) % len;
            self.current = Some(prev);
            self.docs[prev].refresh = true;
        }
    }

    pub fn next_file(&mut self) {
        if let Some(idx) = self.current {
            self.focus((idx + 1) % self.docs.len());
        }
    }

    pub fn prev_file(&mut self) {
        if let Some(idx) = self.current {
            let len = self.docs.len();
            self.focus((idx + len - 1) % len);
        }
    }

    fn focus(&mut self, idx: usize) {
        self.current = Some(idx);
        self.docs[idx].refresh = true;
    }

    /// Index of the already-open document for `name`, matching by canonical
    /// path when the name resolves and by the literal string otherwise.
    #[must_use]
    pub fn find_by_path(&self, name: &std::path::Path) -> Option<usize> {
        let resolved = name
            .canonicalize()
            .unwrap_or_else(|_| name.to_path_buf());
        self.docs.iter().position(|doc| doc.filename == resolved)
    }

    /// Focuses the document for `path` if it is already open, otherwise
    /// loads it and splices it into the ring.
    ///
    /// # Errors
    ///
    /// Returns the load error; the ring is unchanged in that case.
    pub fn open(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(idx) = self.find_by_path(path) {
            self.focus(idx);
            return Ok(());
        }

        let doc = crate::document::Document::load(path)?;
        tracing::info!(file = %doc.name(), bytes = doc.buf.len(), "opened document");
        self.add(doc);
        Ok(())
    }

    /// `open`, except a missing file becomes a new unsaved document bound
    /// to that path. Used for files named on the command line.
    ///
    /// # Errors
    ///
    /// Returns the error for any failure other than the file not existing.
    pub fn open_or_create(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        match self.open(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = crate::document::Document::create(path)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::OutOfMemory, e))?;
                tracing::info!(file = %doc.name(), "created new document");
                self.add(doc);
                Ok(())
            }
            other => other,
        }
    }
}

/*

==================================
========== CLIPBOARD =============
==================================

*/

impl Workspace {
    /// Copies the current selection into the shared clipboard. Without a
    /// selection the clipboard keeps its previous contents.
    pub fn copy_selection(&mut self) {
        let text = self.current().and_then(crate::document::Document::selected_text);
        if let Some(text) = text {
            self.clipboard = text;
        }
    }

    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if erasing the selection fails.
    pub fn cut_selection(&mut self) -> editor_core::errors::BufferResult<()> {
        self.copy_selection();
        let view = self.view;
        if let Some(doc) = self.current_mut() {
            doc.erase_selection(view)?;
        }
        Ok(())
    }

    /// Replaces the selection (if any) with the clipboard contents and
    /// leaves the cursor after the pasted text.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the insertion fails.
    pub fn paste(&mut self) -> editor_core::errors::BufferResult<()> {
        let view = self.view;
        let clip = self.clipboard.clone();
        let Some(doc) = self.current_mut() else {
            return Ok(());
        };

        doc.erase_selection(view)?;
        let pos = doc.pos();
        doc.insert(pos, &clip)?;
        doc.moveto(pos + clip.len(), false, view);
        doc.refresh = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, ViewSize};
    use std::io::Write;

    fn ws_with(names: &[&str]) -> Workspace {
        let mut ws = Workspace::new();
        for name in names {
            ws.add(Document::from_bytes(*name, b"").unwrap());
        }
        ws
    }

    fn current_name(ws: &Workspace) -> String {
        ws.current().unwrap().name().into_owned()
    }

    #[test]
    fn test_documents_open_in_ring_order() {
        // Opening A, B, C in that order leaves C current; next wraps to A,
        // then B; prev goes back to A.
        let mut ws = ws_with(&["a", "b", "c"]);
        assert_eq!(current_name(&ws), "c");

        ws.next_file();
        assert_eq!(current_name(&ws), "a");
        ws.next_file();
        assert_eq!(current_name(&ws), "b");
        ws.prev_file();
        assert_eq!(current_name(&ws), "a");
    }

    #[test]
    fn test_close_focuses_the_predecessor() {
        let mut ws = ws_with(&["a", "b", "c"]);
        ws.close_current();
        assert_eq!(current_name(&ws), "b");
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn test_close_at_ring_head_wraps_to_tail() {
        let mut ws = ws_with(&["a", "b", "c"]);
        ws.next_file(); // focus "a"
        ws.close_current();
        assert_eq!(current_name(&ws), "c");
    }

    #[test]
    fn test_closing_the_last_document_empties_the_ring() {
        let mut ws = ws_with(&["only"]);
        ws.close_current();
        assert!(ws.is_empty());
        assert!(ws.current().is_none());
    }

    #[test]
    fn test_untitled_names_count_up() {
        let mut ws = Workspace::new();
        ws.new_untitled().unwrap();
        ws.new_untitled().unwrap();
        assert_eq!(current_name(&ws), "Untitled-2");
        ws.prev_file();
        assert_eq!(current_name(&ws), "Untitled-1");
    }

    #[test]
    fn test_find_by_path_falls_back_to_the_literal_name() {
        let ws = ws_with(&["Untitled-1"]);
        let idx = ws.find_by_path(std::path::Path::new("Untitled-1"));
        assert_eq!(idx, Some(0));
        assert_eq!(
            ws.find_by_path(std::path::Path::new("no-such-doc")),
            None
        );
    }

    #[test]
    fn test_open_twice_focuses_instead_of_aliasing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"content").unwrap();
        file.as_file().sync_all().unwrap();

        let mut ws = Workspace::new();
        ws.open(file.path()).unwrap();
        ws.new_untitled().unwrap();
        ws.open(file.path()).unwrap();

        assert_eq!(ws.len(), 2);
        assert_eq!(
            ws.current().unwrap().filename,
            file.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_open_or_create_binds_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");

        let mut ws = Workspace::new();
        ws.open_or_create(&path).unwrap();

        let doc = ws.current().unwrap();
        assert!(doc.new_file);
        assert_eq!(doc.filename, path);
        assert!(!doc.dirty);
    }

    #[test]
    fn test_copy_cut_paste_round_trip() {
        let view = ViewSize { cols: 80, rows: 24 };
        let mut ws = Workspace::new();
        ws.add(Document::from_bytes("buf", b"hello world").unwrap());
        ws.view = view;

        // Select "hello " and cut it.
        {
            let doc = ws.current_mut().unwrap();
            doc.update_selection(true);
            doc.moveto(6, false, view);
        }
        ws.cut_selection().unwrap();
        assert_eq!(ws.clipboard, b"hello ");

        // Paste it back at the end.
        {
            let doc = ws.current_mut().unwrap();
            let end = doc.buf.len();
            doc.moveto(end, false, view);
        }
        ws.paste().unwrap();

        let doc = ws.current().unwrap();
        assert_eq!(doc.buf.extract(0, doc.buf.len()), b"worldhello ");
        assert_eq!(doc.pos(), 11);
    }

    #[test]
    fn test_copy_without_selection_keeps_clipboard() {
        let mut ws = Workspace::new();
        ws.add(Document::from_bytes("buf", b"text").unwrap());
        ws.clipboard = b"kept".to_vec();

        ws.copy_selection();
        assert_eq!(ws.clipboard, b"kept");
    }
}
