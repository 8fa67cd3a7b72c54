/// Tab stops fall on multiples of this visual width.
pub const TAB_SIZE: usize = 8;

/// Horizontal scrolling moves in steps of this many visual columns.
const MARGIN_STEP: usize = 4;

/// Terminal geometry as seen by the engine: `rows` is the text area only,
/// the status line already subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSize {
    pub cols: usize,
    pub rows: usize,
}

/// One open document: the gap buffer, its undo log, and all cursor, scroll
/// and selection bookkeeping.
///
/// Position invariants maintained by every operation:
/// - `line_pos` is a line start: `line_pos == 0` or the byte before it is `\n`;
/// - `col <= line_length(line_pos)`;
/// - the selection is the span between `anchor` and the live cursor.
#[derive(Debug)]
pub struct Document {
    pub buf: editor_core::gap_buffer::GapBuffer,
    history: editor_core::history::History,

    /// Canonical absolute path, or a synthetic name such as "Untitled-1".
    pub filename: std::path::PathBuf,

    /// Absolute offset of the current line's first byte.
    pub line_pos: usize,
    /// Zero-based number of the current line.
    pub line: usize,
    /// Byte offset of the cursor within the current line (a tab counts as 1).
    pub col: usize,
    /// Goal column remembered across vertical motion.
    last_col: usize,

    /// Offset and number of the first visible line.
    pub top_pos: usize,
    pub top_line: usize,
    /// Leftmost visible visual column.
    pub margin: usize,

    /// The fixed end of the selection; the moving end is the cursor.
    pub anchor: Option<usize>,

    pub dirty: bool,
    /// True until the document has been saved for the first time.
    pub new_file: bool,

    /// Redraw requests for the renderer.
    pub refresh: bool,
    pub lineupdate: bool,
}

/*

==================================
========== LIFECYCLE =============
==================================

*/

impl Document {
    fn with_buffer(buf: editor_core::gap_buffer::GapBuffer, filename: std::path::PathBuf) -> Self {
        Self {
            buf,
            history: editor_core::history::History::new(),
            filename,
            line_pos: 0,
            line: 0,
            col: 0,
            last_col: 0,
            top_pos: 0,
            top_line: 0,
            margin: 0,
            anchor: None,
            dirty: false,
            new_file: false,
            refresh: false,
            lineupdate: false,
        }
    }

    /// Fresh empty document under a synthetic name.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the initial allocation fails.
    pub fn untitled(name: String) -> editor_core::errors::BufferResult<Self> {
        let mut doc = Self::with_buffer(
            editor_core::gap_buffer::GapBuffer::new()?,
            std::path::PathBuf::from(name),
        );
        doc.new_file = true;
        Ok(doc)
    }

    /// Empty document bound to a path that does not exist yet; saving will
    /// create it.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the initial allocation fails.
    pub fn create(path: &std::path::Path) -> editor_core::errors::BufferResult<Self> {
        let mut doc = Self::with_buffer(
            editor_core::gap_buffer::GapBuffer::new()?,
            path.to_path_buf(),
        );
        doc.new_file = true;
        Ok(doc)
    }

    /// Loads a file from disk under its canonical path.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the path cannot be resolved, the
    /// file cannot be opened or mapped, or the buffer allocation fails.
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let canonical = path.canonicalize()?;

        // Zero-length files cannot be memory-mapped, so short-circuit them.
        let buf = if std::fs::metadata(&canonical)?.len() == 0 {
            editor_core::gap_buffer::GapBuffer::new()
        } else {
            let map = io::mmap::MmapFile::open(&canonical)?;
            editor_core::gap_buffer::GapBuffer::with_bytes(map.as_slice())
        }
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::OutOfMemory, e))?;

        Ok(Self::with_buffer(buf, canonical))
    }

    /// Document over in-memory bytes, used for stdin ingestion.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the buffer allocation fails.
    pub fn from_bytes(
        name: impl Into<std::path::PathBuf>,
        bytes: &[u8],
    ) -> editor_core::errors::BufferResult<Self> {
        Ok(Self::with_buffer(
            editor_core::gap_buffer::GapBuffer::with_bytes(bytes)?,
            name.into(),
        ))
    }

    /// Writes the buffer back to `filename`, then clears the dirty flag and
    /// the undo log (edits never coalesce across a save).
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the atomic rename fails; the
    /// in-memory state is unchanged in that case.
    pub fn save(&mut self) -> std::io::Result<()> {
        let (prefix, suffix) = self.buf.slices();
        io::file::save_atomic(&self.filename, prefix, suffix)?;
        self.dirty = false;
        self.history.clear();
        Ok(())
    }

    /// Display name for the status bar.
    #[must_use]
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        self.filename.to_string_lossy()
    }
}

/*

==================================
====== POSITIONAL HELPERS ========
==================================

*/

fn is_word_byte(ch: u8) -> bool {
    ch.is_ascii_alphanumeric()
}

impl Document {
    /// Absolute position of the cursor.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.line_pos + self.col
    }

    /// Runs a slice search over the logical text from `from` onward and
    /// maps the hit back to an absolute position.
    fn scan_forward<F>(&self, from: usize, find: F) -> Option<usize>
    where
        F: Fn(&[u8]) -> Option<usize>,
    {
        let (before, after) = self.buf.slices();
        if from < before.len() {
            if let Some(i) = find(&before[from..]) {
                return Some(from + i);
            }
            find(after).map(|i| before.len() + i)
        } else {
            let off = from - before.len();
            if off > after.len() {
                return None;
            }
            find(&after[off..]).map(|i| from + i)
        }
    }

    /// Position of the last `\n` strictly before `before_pos`, if any.
    fn rscan_newline(&self, before_pos: usize) -> Option<usize> {
        let (before, after) = self.buf.slices();
        if before_pos <= before.len() {
            memchr::memrchr(b'\n', &before[..before_pos])
        } else {
            let off = (before_pos - before.len()).min(after.len());
            memchr::memrchr(b'\n', &after[..off])
                .map(|i| before.len() + i)
                .or_else(|| memchr::memrchr(b'\n', before))
        }
    }

    /// Bytes from `line_pos` up to but excluding the line terminator.
    #[must_use]
    pub fn line_length(&self, line_pos: usize) -> usize {
        self.scan_forward(line_pos, |h| memchr::memchr2(b'\n', b'\r', h))
            .unwrap_or(self.buf.len())
            - line_pos
    }

    /// Start of the line containing `pos`.
    #[must_use]
    pub fn line_start(&self, pos: usize) -> usize {
        self.rscan_newline(pos).map_or(0, |nl| nl + 1)
    }

    /// Position just past the next `\n` at or after `pos`, or `None` when
    /// no further newline exists.
    #[must_use]
    pub fn next_line(&self, pos: usize) -> Option<usize> {
        self.scan_forward(pos, |h| memchr::memchr(b'\n', h))
            .map(|i| i + 1)
    }

    /// First byte of the line preceding the one containing `pos`, or `None`
    /// at the very start of the document.
    #[must_use]
    pub fn prev_line(&self, pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        match self.rscan_newline(pos) {
            None => Some(0),
            Some(nl) => Some(self.line_start(nl)),
        }
    }

    /// Visual column of byte offset `col` within the line at `line_pos`,
    /// with tabs expanded to the next multiple of `TAB_SIZE`.
    #[must_use]
    pub fn visual_col(&self, line_pos: usize, col: usize) -> usize {
        let mut c = 0;
        for pos in line_pos..line_pos + col {
            match self.buf.get(pos) {
                None => break,
                Some(b'\t') => c += TAB_SIZE - c % TAB_SIZE,
                Some(_) => c += 1,
            }
        }
        c
    }
}

/*

==================================
===== CURSOR RECONCILIATION ======
==================================

*/

impl Document {
    /// Moves the cursor to absolute position `pos`, stepping over line
    /// boundaries and scrolling the viewport along. With `center` set, any
    /// scroll recenters the target line in the middle of the view.
    pub fn moveto(&mut self, pos: usize, center: bool, view: ViewSize) {
        let mut scrolled = false;
        loop {
            let cur = self.line_pos + self.col;
            if pos < cur {
                if pos >= self.line_pos {
                    self.col = pos - self.line_pos;
                } else {
                    self.col = 0;
                    self.line_pos = self.prev_line(self.line_pos).unwrap_or(0);
                    self.line -= 1;

                    if self.top_line > self.line {
                        self.top_pos = self.line_pos;
                        self.top_line -= 1;
                        self.refresh = true;
                        scrolled = true;
                    }
                }
            } else if pos > cur {
                match self.next_line(self.line_pos) {
                    None => {
                        self.col = self.buf.len() - self.line_pos;
                        break;
                    }
                    Some(next) if pos < next => {
                        self.col = pos - self.line_pos;
                    }
                    Some(next) => {
                        self.col = 0;
                        self.line_pos = next;
                        self.line += 1;

                        if self.line >= self.top_line + view.rows {
                            self.top_pos =
                                self.next_line(self.top_pos).unwrap_or(self.top_pos);
                            self.top_line += 1;
                            self.refresh = true;
                            scrolled = true;
                        }
                    }
                }
            } else {
                break;
            }
        }

        if scrolled && center {
            let target = self.line.saturating_sub(view.rows / 2);
            while self.top_line > target {
                match self.prev_line(self.top_pos) {
                    Some(p) => {
                        self.top_pos = p;
                        self.top_line -= 1;
                    }
                    None => break,
                }
            }
            while self.top_line < target {
                match self.next_line(self.top_pos) {
                    Some(p) => {
                        self.top_pos = p;
                        self.top_line += 1;
                    }
                    None => break,
                }
            }
        }
    }

    /// Clamps `col` to the current line using the remembered goal column
    /// and scrolls horizontally in `MARGIN_STEP` increments whenever the
    /// visual cursor column leaves the visible window.
    fn adjust(&mut self, view: ViewSize) {
        let line_len = self.line_length(self.line_pos);
        self.col = self.last_col.min(line_len);

        let col = self.visual_col(self.line_pos, self.col);
        while col < self.margin {
            self.margin = self.margin.saturating_sub(MARGIN_STEP);
            self.refresh = true;
        }
        while view.cols > 0 && col - self.margin >= view.cols {
            self.margin += MARGIN_STEP;
            self.refresh = true;
        }
    }
}

/*

==================================
========== SELECTION =============
==================================

*/

impl Document {
    /// Starts a selection at the cursor when `select` is set and none is
    /// active; drops the selection otherwise. Every motion calls this
    /// before moving, so shift-motion grows the span and plain motion
    /// collapses it.
    pub fn update_selection(&mut self, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.pos());
            }
            self.refresh = true;
        } else {
            if self.anchor.is_some() {
                self.refresh = true;
            }
            self.anchor = None;
        }
    }

    /// Ordered selection span, or `None` when nothing is selected.
    #[must_use]
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        let pos = self.pos();
        if pos == anchor {
            return None;
        }
        Some(if pos < anchor {
            (pos, anchor)
        } else {
            (anchor, pos)
        })
    }

    /// A copy of the selected bytes, if any.
    #[must_use]
    pub fn selected_text(&self) -> Option<Vec<u8>> {
        self.selection()
            .map(|(start, end)| self.buf.extract(start, end - start))
    }

    /// Erases the selection and leaves the cursor at its start. Returns
    /// whether anything was erased.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn erase_selection(
        &mut self,
        view: ViewSize,
    ) -> editor_core::errors::BufferResult<bool> {
        let Some((start, end)) = self.selection() else {
            return Ok(false);
        };
        self.moveto(start, false, view);
        self.splice(start, end - start, &[])?;
        self.anchor = None;
        self.refresh = true;
        Ok(true)
    }

    pub fn select_all(&mut self, view: ViewSize) {
        self.anchor = Some(0);
        self.refresh = true;
        self.moveto(self.buf.len(), false, view);
    }
}

/*

==================================
=========== MOTION ===============
==================================

*/

impl Document {
    pub fn up(&mut self, select: bool, view: ViewSize) {
        let Some(newpos) = self.prev_line(self.line_pos) else {
            return;
        };
        self.update_selection(select);

        self.line_pos = newpos;
        self.line -= 1;
        if self.line < self.top_line {
            self.top_pos = self.line_pos;
            self.top_line = self.line;
            self.refresh = true;
        }

        self.adjust(view);
    }

    pub fn down(&mut self, select: bool, view: ViewSize) {
        let Some(newpos) = self.next_line(self.line_pos) else {
            return;
        };
        self.update_selection(select);

        self.line_pos = newpos;
        self.line += 1;
        if self.line >= self.top_line + view.rows {
            self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
            self.top_line += 1;
            self.refresh = true;
        }

        self.adjust(view);
    }

    pub fn left(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        if self.col > 0 {
            self.col -= 1;
        } else {
            let Some(newpos) = self.prev_line(self.line_pos) else {
                return;
            };

            self.col = self.line_length(newpos);
            self.line_pos = newpos;
            self.line -= 1;
            if self.line < self.top_line {
                self.top_pos = self.line_pos;
                self.top_line = self.line;
                self.refresh = true;
            }
        }

        self.last_col = self.col;
        self.adjust(view);
    }

    pub fn right(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        if self.col < self.line_length(self.line_pos) {
            self.col += 1;
        } else {
            let Some(newpos) = self.next_line(self.line_pos) else {
                return;
            };

            self.col = 0;
            self.line_pos = newpos;
            self.line += 1;

            if self.line >= self.top_line + view.rows {
                self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
                self.top_line += 1;
                self.refresh = true;
            }
        }

        self.last_col = self.col;
        self.adjust(view);
    }

    /// Steps to the start of the word left of the cursor: first skip any
    /// non-word bytes, then the word itself.
    pub fn word_left(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        let mut pos = self.pos();
        let mut in_word = false;
        while pos > 0 {
            let ch = self.buf.get(pos - 1).unwrap_or(0);
            if in_word {
                if !is_word_byte(ch) {
                    break;
                }
            } else if is_word_byte(ch) {
                in_word = true;
            }

            pos -= 1;
            if pos < self.line_pos {
                self.line_pos = self.prev_line(self.line_pos).unwrap_or(0);
                self.line -= 1;
                self.refresh = true;
            }
        }
        self.col = pos - self.line_pos;
        if self.line < self.top_line {
            self.top_pos = self.line_pos;
            self.top_line = self.line;
        }

        self.last_col = self.col;
        self.adjust(view);
    }

    /// Mirror of [`Document::word_left`], walking forward.
    pub fn word_right(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        let mut pos = self.pos();
        let end = self.buf.len();
        let mut next = self.next_line(self.line_pos);
        let mut in_word = false;
        while pos < end {
            let ch = self.buf.get(pos).unwrap_or(0);
            if in_word {
                if !is_word_byte(ch) {
                    break;
                }
            } else if is_word_byte(ch) {
                in_word = true;
            }

            pos += 1;
            if Some(pos) == next {
                self.line_pos = pos;
                next = self.next_line(self.line_pos);
                self.line += 1;
                self.refresh = true;
            }
        }
        self.col = pos - self.line_pos;
        if self.line >= self.top_line + view.rows {
            self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
            self.top_line += 1;
        }

        self.last_col = self.col;
        self.adjust(view);
    }

    pub fn home(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        self.col = 0;
        self.last_col = 0;
        self.adjust(view);
    }

    pub fn end(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        self.col = self.line_length(self.line_pos);
        self.last_col = self.col;
        self.adjust(view);
    }

    pub fn top(&mut self, select: bool) {
        self.update_selection(select);
        self.top_pos = 0;
        self.top_line = 0;
        self.margin = 0;
        self.line_pos = 0;
        self.line = 0;
        self.col = 0;
        self.last_col = 0;
        self.refresh = true;
    }

    pub fn bottom(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        while let Some(newpos) = self.next_line(self.line_pos) {
            self.line_pos = newpos;
            self.line += 1;

            if self.line >= self.top_line + view.rows {
                self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
                self.top_line += 1;
                self.refresh = true;
            }
        }
        self.col = self.line_length(self.line_pos);
        self.last_col = self.col;
        self.adjust(view);
    }

    pub fn page_up(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        if self.line < view.rows {
            self.line_pos = 0;
            self.top_pos = 0;
            self.line = 0;
            self.top_line = 0;
        } else {
            for _ in 0..view.rows {
                let Some(newpos) = self.prev_line(self.line_pos) else {
                    break;
                };

                self.line_pos = newpos;
                self.line -= 1;

                if self.top_line > 0 {
                    self.top_pos = self.prev_line(self.top_pos).unwrap_or(0);
                    self.top_line -= 1;
                }
            }
        }

        self.refresh = true;
        self.adjust(view);
    }

    pub fn page_down(&mut self, select: bool, view: ViewSize) {
        self.update_selection(select);
        for _ in 0..view.rows {
            let Some(newpos) = self.next_line(self.line_pos) else {
                break;
            };

            self.line_pos = newpos;
            self.line += 1;

            self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
            self.top_line += 1;
        }

        self.refresh = true;
        self.adjust(view);
    }
}

/*

==================================
=========== EDITING ==============
==================================

*/

impl Document {
    /// The one mutation gate: applies the replacement, then records it so
    /// adjacent single-byte edits coalesce in the log.
    fn splice(
        &mut self,
        pos: usize,
        erase_n: usize,
        insert: &[u8],
    ) -> editor_core::errors::BufferResult<()> {
        let erased = self.buf.extract(pos, erase_n);
        self.buf.replace(pos, erase_n, insert)?;
        self.history.record(pos, &erased, insert);
        self.dirty = true;
        Ok(())
    }

    /// Inserts bytes at an absolute position with undo recording; used by
    /// paste and the shell-pipe command. The caller repositions the cursor.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn insert(&mut self, pos: usize, bytes: &[u8]) -> editor_core::errors::BufferResult<()> {
        self.splice(pos, 0, bytes)
    }

    /// Types one byte at the cursor, replacing any selection.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn insert_char(
        &mut self,
        ch: u8,
        view: ViewSize,
    ) -> editor_core::errors::BufferResult<()> {
        self.erase_selection(view)?;
        let pos = self.pos();
        self.splice(pos, 0, &[ch])?;
        self.col += 1;
        self.last_col = self.col;
        self.adjust(view);
        if !self.refresh {
            self.lineupdate = true;
        }
        Ok(())
    }

    /// Breaks the line at the cursor and moves to column 0 of the new line.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn newline(&mut self, view: ViewSize) -> editor_core::errors::BufferResult<()> {
        self.erase_selection(view)?;
        let pos = self.pos();
        self.splice(pos, 0, b"\n")?;
        self.col = 0;
        self.last_col = 0;
        self.line += 1;
        self.line_pos = self.next_line(self.line_pos).unwrap_or(self.line_pos);
        self.refresh = true;

        if self.line >= self.top_line + view.rows {
            self.top_pos = self.next_line(self.top_pos).unwrap_or(self.top_pos);
            self.top_line += 1;
        }

        self.adjust(view);
        Ok(())
    }

    /// Erases the byte left of the cursor; at a line start the preceding
    /// newline goes (with its `\r`, so a CRLF pair dies in one keystroke)
    /// and the lines merge.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn backspace(&mut self, view: ViewSize) -> editor_core::errors::BufferResult<()> {
        if self.erase_selection(view)? {
            return Ok(());
        }
        if self.pos() == 0 {
            return Ok(());
        }

        if self.col == 0 {
            let mut pos = self.line_pos - 1;
            self.splice(pos, 1, &[])?;
            if pos > 0 && self.buf.get(pos - 1) == Some(b'\r') {
                pos -= 1;
                self.splice(pos, 1, &[])?;
            }

            self.line -= 1;
            self.line_pos = self.line_start(pos);
            self.col = pos - self.line_pos;
            self.refresh = true;

            if self.line < self.top_line {
                self.top_pos = self.line_pos;
                self.top_line = self.line;
            }
        } else {
            self.col -= 1;
            let pos = self.line_pos + self.col;
            self.splice(pos, 1, &[])?;
            self.lineupdate = true;
        }

        self.last_col = self.col;
        self.adjust(view);
        Ok(())
    }

    /// Erases the byte under the cursor; a `\r` followed by `\n` is erased
    /// as one unit.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the mutation fails.
    pub fn del(&mut self, view: ViewSize) -> editor_core::errors::BufferResult<()> {
        if self.erase_selection(view)? {
            return Ok(());
        }
        let pos = self.pos();
        let Some(mut ch) = self.buf.get(pos) else {
            return Ok(());
        };

        self.splice(pos, 1, &[])?;
        if ch == b'\r' {
            if let Some(next) = self.buf.get(pos) {
                ch = next;
                if next == b'\n' {
                    self.splice(pos, 1, &[])?;
                }
            }
        }

        if ch == b'\n' {
            self.refresh = true;
        } else {
            self.lineupdate = true;
        }
        Ok(())
    }
}

/*

==================================
========= UNDO & REDO ============
==================================

*/

impl Document {
    /// Backs out the newest applied edit. The replay goes straight to the
    /// buffer so it is not re-recorded; the dirty flag clears when the log
    /// is back at its baseline (the last saved state).
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the replay mutation fails.
    pub fn undo(&mut self, view: ViewSize) -> editor_core::errors::BufferResult<()> {
        let Some(record) = self.history.undo() else {
            return Ok(());
        };
        self.moveto(record.pos, false, view);
        self.buf
            .replace(record.pos, record.inserted.len(), &record.erased)?;
        self.dirty = !self.history.at_baseline();
        self.refresh = true;
        Ok(())
    }

    /// Re-applies the next undone edit.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::OutOfMemory` if the replay mutation fails.
    pub fn redo(&mut self, view: ViewSize) -> editor_core::errors::BufferResult<()> {
        let Some(record) = self.history.redo() else {
            return Ok(());
        };
        self.buf
            .replace(record.pos, record.erased.len(), &record.inserted)?;
        self.moveto(record.pos, false, view);
        self.dirty = true;
        self.refresh = true;
        Ok(())
    }
}

/*

==================================
====== SEARCH & NAVIGATION =======
==================================

*/

impl Document {
    /// Byte-exact forward search from the cursor. On a hit the match
    /// becomes the selection and the viewport centers on it; on a miss the
    /// cursor and anchor stay put and `false` is returned so the driver
    /// can ring the bell.
    pub fn find_next(&mut self, needle: &[u8], view: ViewSize) -> bool {
        if needle.is_empty() {
            return true;
        }

        let from = self.pos();
        let found = {
            let text = self.buf.close_gap();
            memchr::memmem::find(&text[from..], needle).map(|i| from + i)
        };

        match found {
            Some(hit) => {
                self.anchor = Some(hit);
                self.moveto(hit + needle.len(), true, view);
                self.refresh = true;
                true
            }
            None => {
                self.refresh = true;
                false
            }
        }
    }

    /// Moves to the start of 1-based line `lineno`. Returns `false` when
    /// the line number is zero or past the end of the document.
    pub fn goto_line(&mut self, lineno: usize, view: ViewSize) -> bool {
        self.anchor = None;
        if lineno == 0 {
            return false;
        }

        let mut pos = 0;
        for _ in 0..lineno - 1 {
            match self.next_line(pos) {
                Some(next) => pos = next,
                None => return false,
            }
        }

        self.moveto(pos, true, view);
        self.refresh = true;
        true
    }

    /// Filename (plus optional line number) for jump-to-file: the selection
    /// if one exists, otherwise the run of bytes at the cursor up to the
    /// first delimiter, with a trailing `:123` parsed as a line number.
    #[must_use]
    pub fn jump_target(&self) -> Option<(String, usize)> {
        if let Some(text) = self.selected_text() {
            let name = String::from_utf8_lossy(&text).into_owned();
            if name.is_empty() {
                return None;
            }
            return Some((name, 0));
        }

        const DELIMITERS: &[u8] = b"!@\"'#%&()[]{}*?+:;\r\n\t ";
        let mut pos = self.pos();
        let mut name = Vec::new();
        while let Some(ch) = self.buf.get(pos) {
            if DELIMITERS.contains(&ch) {
                break;
            }
            name.push(ch);
            pos += 1;
        }

        let mut lineno = 0usize;
        if self.buf.get(pos) == Some(b':') {
            pos += 1;
            while let Some(ch) = self.buf.get(pos) {
                if !ch.is_ascii_digit() {
                    break;
                }
                lineno = lineno * 10 + usize::from(ch - b'0');
                pos += 1;
            }
        }

        if name.is_empty() {
            return None;
        }
        Some((String::from_utf8_lossy(&name).into_owned(), lineno))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn view() -> ViewSize {
        ViewSize { cols: 80, rows: 24 }
    }

    fn doc(text: &[u8]) -> Document {
        Document::from_bytes("test", text).unwrap()
    }

    fn contents(d: &Document) -> Vec<u8> {
        d.buf.extract(0, d.buf.len())
    }

    fn assert_invariants(d: &Document) {
        assert!(
            d.line_pos == 0 || d.buf.get(d.line_pos - 1) == Some(b'\n'),
            "line_pos {} is not a line start",
            d.line_pos
        );
        assert!(
            d.col <= d.line_length(d.line_pos),
            "col {} exceeds line length {}",
            d.col,
            d.line_length(d.line_pos)
        );
    }

    #[test]
    fn test_typing_advances_cursor_and_marks_dirty() {
        let mut d = doc(b"");
        d.insert_char(b'h', view()).unwrap();
        d.insert_char(b'i', view()).unwrap();

        assert_eq!(contents(&d), b"hi");
        assert_eq!((d.line, d.col), (0, 2));
        assert!(d.dirty);
        assert_invariants(&d);
    }

    #[test]
    fn test_typing_then_backspacing_coalesces_log_shape() {
        // Type "abc", backspace twice: content "a", col 1, and the log
        // holds one insertion record plus one erase record in document
        // order.
        let mut d = doc(b"");
        for ch in *b"abc" {
            d.insert_char(ch, view()).unwrap();
        }
        d.backspace(view()).unwrap();
        d.backspace(view()).unwrap();

        assert_eq!(contents(&d), b"a");
        assert_eq!(d.col, 1);

        let erase = d.history.undo().unwrap();
        assert_eq!((erase.pos, erase.erased.as_slice()), (1, b"bc".as_slice()));
        assert!(erase.inserted.is_empty());
        let insert = d.history.undo().unwrap();
        assert_eq!(
            (insert.pos, insert.inserted.as_slice()),
            (0, b"abc".as_slice())
        );
        assert!(insert.erased.is_empty());
    }

    #[test]
    fn test_backspace_at_document_start_is_a_noop() {
        let mut d = doc(b"text");
        d.backspace(view()).unwrap();
        assert_eq!(contents(&d), b"text");
        assert!(!d.dirty);
    }

    #[test]
    fn test_backspace_at_line_start_merges_lines() {
        let mut d = doc(b"foo\nbar\n");
        d.moveto(4, false, view());
        assert_eq!((d.line, d.col), (1, 0));

        d.backspace(view()).unwrap();
        assert_eq!(contents(&d), b"foobar\n");
        assert_eq!((d.line, d.col), (0, 3));
        assert_invariants(&d);
    }

    #[test]
    fn test_delete_at_end_of_document_is_a_noop() {
        let mut d = doc(b"text");
        d.moveto(4, false, view());
        d.del(view()).unwrap();
        assert_eq!(contents(&d), b"text");
        assert!(!d.dirty);
    }

    #[test]
    fn test_delete_erases_crlf_atomically() {
        let mut d = doc(b"x\r\ny\n");
        d.moveto(1, false, view());
        d.del(view()).unwrap();

        assert_eq!(contents(&d), b"xy\n");
        assert!(d.refresh);

        // One undo brings the pair back.
        d.undo(view()).unwrap();
        assert_eq!(contents(&d), b"x\r\ny\n");
    }

    #[test]
    fn test_backspace_after_crlf_erases_both_bytes() {
        let mut d = doc(b"x\r\ny\n");
        d.moveto(3, false, view());
        assert_eq!((d.line, d.col), (1, 0));

        d.backspace(view()).unwrap();
        assert_eq!(contents(&d), b"xy\n");
        assert_eq!((d.line, d.col), (0, 1));
    }

    #[test]
    fn test_vertical_motion_stops_at_document_edges() {
        let mut d = doc(b"one\ntwo");
        d.up(false, view());
        assert_eq!((d.line, d.col), (0, 0));

        d.down(false, view());
        d.down(false, view());
        assert_eq!(d.line, 1);
        assert_invariants(&d);
    }

    #[test]
    fn test_vertical_motion_remembers_goal_column() {
        let mut d = doc(b"longline\nab\nlongline");
        d.end(false, view());
        assert_eq!(d.col, 8);

        d.down(false, view());
        assert_eq!(d.col, 2);

        d.down(false, view());
        assert_eq!(d.col, 8);
        assert_invariants(&d);
    }

    #[test]
    fn test_left_and_right_wrap_across_lines() {
        let mut d = doc(b"ab\ncd");
        d.moveto(3, false, view());

        d.left(false, view());
        assert_eq!((d.line, d.col), (0, 2));

        d.right(false, view());
        assert_eq!((d.line, d.col), (1, 0));
    }

    #[test]
    fn test_word_motion_skips_separators_then_word() {
        let mut d = doc(b"foo  bar baz");
        d.word_right(false, view());
        assert_eq!(d.pos(), 3);
        d.word_right(false, view());
        assert_eq!(d.pos(), 8);

        d.moveto(12, false, view());
        d.word_left(false, view());
        assert_eq!(d.pos(), 9);
        d.word_left(false, view());
        assert_eq!(d.pos(), 5);
    }

    #[test]
    fn test_newline_splits_the_line() {
        let mut d = doc(b"split");
        d.moveto(2, false, view());
        d.newline(view()).unwrap();

        assert_eq!(contents(&d), b"sp\nlit");
        assert_eq!((d.line, d.col), (1, 0));
        assert_invariants(&d);
    }

    #[test]
    fn test_selection_grows_with_shift_motion_and_clears_without() {
        let mut d = doc(b"abcdef");
        d.right(true, view());
        d.right(true, view());
        assert_eq!(d.selection(), Some((0, 2)));

        d.right(false, view());
        assert_eq!(d.selection(), None);
    }

    #[test]
    fn test_insert_char_replaces_selection() {
        let mut d = doc(b"hello world");
        d.moveto(5, false, view());
        d.update_selection(true);
        d.moveto(11, false, view());

        d.insert_char(b'!', view()).unwrap();
        assert_eq!(contents(&d), b"hello!");
        assert_eq!(d.col, 6);
    }

    #[test]
    fn test_select_all_spans_the_document() {
        let mut d = doc(b"a\nb\nc");
        d.select_all(view());
        assert_eq!(d.selection(), Some((0, 5)));
        assert_eq!(d.pos(), 5);
    }

    #[test]
    fn test_erase_selection_moves_cursor_to_start() {
        let mut d = doc(b"one two three");
        d.moveto(4, false, view());
        d.update_selection(true);
        d.moveto(8, false, view());

        assert!(d.erase_selection(view()).unwrap());
        assert_eq!(contents(&d), b"one three");
        assert_eq!(d.pos(), 4);
        assert_eq!(d.anchor, None);
    }

    #[test]
    fn test_undo_restores_pre_edit_content_and_dirty() {
        let mut d = doc(b"base");
        d.moveto(4, false, view());
        d.insert_char(b'!', view()).unwrap();
        assert!(d.dirty);

        d.undo(view()).unwrap();
        assert_eq!(contents(&d), b"base");
        assert!(!d.dirty);
    }

    #[test]
    fn test_undo_then_redo_round_trips() {
        let mut d = doc(b"");
        for ch in *b"one" {
            d.insert_char(ch, view()).unwrap();
        }
        d.newline(view()).unwrap();
        for ch in *b"two" {
            d.insert_char(ch, view()).unwrap();
        }
        let after = contents(&d);

        for _ in 0..4 {
            d.undo(view()).unwrap();
        }
        assert_eq!(contents(&d), b"");
        assert!(!d.dirty);

        for _ in 0..4 {
            d.redo(view()).unwrap();
        }
        assert_eq!(contents(&d), after);
        assert!(d.dirty);
        assert_invariants(&d);
    }

    #[test]
    fn test_redo_is_cancelled_by_a_new_edit() {
        let mut d = doc(b"");
        d.insert_char(b'a', view()).unwrap();
        d.undo(view()).unwrap();
        d.insert_char(b'b', view()).unwrap();

        d.redo(view()).unwrap();
        assert_eq!(contents(&d), b"b");
    }

    #[test]
    fn test_search_selects_match_and_repeats() {
        let mut d = doc(b"hello hello\n");

        assert!(d.find_next(b"hello", view()));
        assert_eq!(d.anchor, Some(0));
        assert_eq!(d.pos(), 5);

        assert!(d.find_next(b"hello", view()));
        assert_eq!(d.anchor, Some(6));
        assert_eq!(d.pos(), 11);

        // No third occurrence: cursor and anchor stay put.
        assert!(!d.find_next(b"hello", view()));
        assert_eq!(d.anchor, Some(6));
        assert_eq!(d.pos(), 11);
    }

    #[test]
    fn test_search_from_end_of_document_misses() {
        let mut d = doc(b"needle");
        d.moveto(6, false, view());
        assert!(!d.find_next(b"needle", view()));
        assert_eq!(d.pos(), 6);
    }

    #[test]
    fn test_visual_column_expands_tabs() {
        let d = doc(b"\tX");
        assert_eq!(d.visual_col(0, 0), 0);
        assert_eq!(d.visual_col(0, 1), 8);
        assert_eq!(d.visual_col(0, 2), 9);
    }

    #[test]
    fn test_goto_line_and_out_of_range() {
        let mut d = doc(b"a\nb\nc\n");
        assert!(d.goto_line(3, view()));
        assert_eq!(d.line, 2);

        assert!(!d.goto_line(0, view()));
        assert!(!d.goto_line(99, view()));
        assert_eq!(d.line, 2);
    }

    #[test]
    fn test_jump_target_with_line_suffix() {
        let mut d = doc(b"see src/main.rs:42 for details");
        d.moveto(4, false, view());
        assert_eq!(d.jump_target(), Some(("src/main.rs".to_string(), 42)));
    }

    #[test]
    fn test_jump_target_prefers_selection() {
        let mut d = doc(b"notes.txt and more");
        d.update_selection(true);
        d.moveto(9, false, view());
        assert_eq!(d.jump_target(), Some(("notes.txt".to_string(), 0)));
    }

    #[test]
    fn test_jump_target_on_delimiter_is_none() {
        let mut d = doc(b"(parens)");
        d.moveto(0, false, view());
        assert_eq!(d.jump_target(), None);
    }

    #[test]
    fn test_scrolling_follows_the_cursor() {
        let small = ViewSize { cols: 40, rows: 4 };
        let text: Vec<u8> = (0..10).flat_map(|i| format!("line{i}\n").into_bytes()).collect();
        let mut d = doc(&text);

        for _ in 0..6 {
            d.down(false, small);
        }
        assert_eq!(d.line, 6);
        assert_eq!(d.top_line, 3);
        assert!(d.refresh);

        d.page_up(false, small);
        assert_eq!(d.line, 2);
        assert_invariants(&d);
    }

    #[test]
    fn test_horizontal_margin_steps_in_fours() {
        let narrow = ViewSize { cols: 10, rows: 24 };
        let mut d = doc(b"abcdefghijklmnopqrstuvwxyz");
        d.end(false, narrow);
        assert_eq!(d.col, 26);
        assert_eq!(d.margin, 20);

        d.home(false, narrow);
        assert_eq!(d.margin, 0);
    }

    #[test]
    fn test_load_edit_undo_save_is_bit_identical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"alpha\nbeta\ngamma\n").unwrap();
        file.as_file().sync_all().unwrap();

        let mut d = Document::load(file.path()).unwrap();
        d.moveto(5, false, view());
        d.insert_char(b'X', view()).unwrap();
        d.newline(view()).unwrap();
        d.backspace(view()).unwrap();
        d.backspace(view()).unwrap();
        while !d.history.at_baseline() {
            d.undo(view()).unwrap();
        }
        d.save().unwrap();

        assert_eq!(std::fs::read(file.path()).unwrap(), b"alpha\nbeta\ngamma\n");
        assert!(!d.dirty);
    }

    #[test]
    fn test_save_clears_the_undo_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Document::create(&dir.path().join("new.txt")).unwrap();
        d.insert_char(b'a', view()).unwrap();
        d.save().unwrap();

        d.undo(view()).unwrap();
        assert_eq!(contents(&d), b"a");
    }

    #[test]
    fn test_load_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Document::load(&dir.path().join("absent"));
        assert!(matches!(result, Err(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
