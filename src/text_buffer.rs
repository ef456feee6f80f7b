use crate::error::{Error, Result};
use crate::row::Row;
use std::cmp;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::slice;

// Contain both actual path sequence and display string
pub struct FilePath {
    pub path: PathBuf,
    pub display: String,
}

impl FilePath {
    fn from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        FilePath {
            path: PathBuf::from(path),
            display: path.to_string_lossy().to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CursorDir {
    Left,
    Right,
    Up,
    Down,
}

pub struct Lines<'a>(slice::Iter<'a, Row>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.buffer())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.as_slice().len();
        (len, Some(len))
    }
}

pub struct TextBuffer {
    // (x, y) coordinate in internal text buffer of rows
    cx: usize,
    cy: usize,
    // File editor is opening
    file: Option<FilePath>,
    // Lines of text buffer
    row: Vec<Row>,
    // Number of changes since the buffer was loaded or saved
    dirty: usize,
}

impl TextBuffer {
    pub fn empty() -> Self {
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row: vec![],
            dirty: 0,
        }
    }

    pub fn with_lines<I, B>(lines: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        let mut buf = Self::empty();
        buf.row = lines.into_iter().map(Row::new).collect();
        buf
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source: io::Error| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        };

        let f = File::open(path).map_err(open_error)?;
        let mut buf = Self::empty();
        for line in io::BufReader::new(f).split(b'\n') {
            let mut line = line.map_err(open_error)?;
            while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
                line.pop();
            }
            buf.insert_row(buf.row.len(), line);
        }
        buf.file = Some(FilePath::from(path));
        buf.dirty = 0;

        tracing::debug!(file = %path.display(), lines = buf.row.len(), "file opened");
        Ok(buf)
    }

    pub fn insert_row<B: Into<Vec<u8>>>(&mut self, at: usize, line: B) {
        if at > self.row.len() {
            return;
        }
        self.row.insert(at, Row::new(line));
        self.dirty += 1;
    }

    pub fn delete_row(&mut self, at: usize) {
        if at >= self.row.len() {
            return;
        }
        self.row.remove(at);
        self.dirty += 1;
    }

    // Inserting at the line next to the last line appends a new line
    pub fn row_insert_char(&mut self, y: usize, x: usize, c: u8) {
        if y == self.row.len() {
            self.insert_row(y, vec![]);
        }
        if let Some(row) = self.row.get_mut(y) {
            row.insert_char(x, c);
            self.dirty += 1;
        }
    }

    pub fn row_delete_char(&mut self, y: usize, x: usize) {
        if let Some(row) = self.row.get_mut(y) {
            if row.delete_char(x) {
                self.dirty += 1;
            }
        }
    }

    pub fn row_append<B: AsRef<[u8]>>(&mut self, y: usize, s: B) {
        if let Some(row) = self.row.get_mut(y) {
            row.append(s);
            self.dirty += 1;
        }
    }

    pub fn insert_char(&mut self, c: u8) {
        self.row_insert_char(self.cy, self.cx, c);
        self.cx += 1;
    }

    fn squash_to_previous_line(&mut self) {
        // At top of line, backspace concats current line to previous line
        let removed = std::mem::take(&mut self.row[self.cy]);
        self.cx = self.row[self.cy - 1].len(); // Move cursor column to end of previous line
        self.row_append(self.cy - 1, removed.buffer());
        self.delete_row(self.cy);
        self.cy -= 1;
    }

    pub fn delete_char(&mut self) {
        if self.cy == self.row.len() || self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.row_delete_char(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            self.squash_to_previous_line();
        }
    }

    pub fn delete_right_char(&mut self) {
        self.move_cursor_one(CursorDir::Right);
        self.delete_char();
    }

    pub fn move_cursor_one(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Up => self.cy = self.cy.saturating_sub(1),
            CursorDir::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // When moving to left at top of line, move cursor to end of previous line
                    self.cy -= 1;
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Down => {
                // Allow to move cursor until next line to the last line of file to enable to add a
                // new line at the end.
                if self.cy < self.row.len() {
                    self.cy += 1;
                }
            }
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    if self.cx < self.row[self.cy].len() {
                        // Allow to move cursor until next col to the last col of line to enable to
                        // add a new character at the end of line.
                        self.cx += 1;
                    } else {
                        // When moving to right at the end of line, move cursor to top of next line.
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
        };

        // Snap cursor to end of line when moving up/down from longer line
        let len = self.row.get(self.cy).map(Row::len).unwrap_or(0);
        if self.cx > len {
            self.cx = len;
        }
    }

    pub fn move_cursor_page(&mut self, dir: CursorDir, rowoff: usize, num_rows: usize) {
        self.cy = match dir {
            CursorDir::Up => rowoff, // Top of screen
            CursorDir::Down => {
                cmp::min((rowoff + num_rows).saturating_sub(1), self.row.len()) // Bottom of screen
            }
            _ => unreachable!(),
        };
        for _ in 0..num_rows {
            self.move_cursor_one(dir);
        }
    }

    pub fn move_cursor_to_line_edge(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Left => self.cx = 0,
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    self.cx = self.row[self.cy].len();
                }
            }
            _ => unreachable!(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.row
    }

    pub fn filename(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.display.as_str())
    }

    pub fn set_file<P: AsRef<Path>>(&mut self, path: P) {
        self.file = Some(FilePath::from(path));
    }

    pub fn dirty(&self) -> usize {
        self.dirty
    }

    pub fn modified(&self) -> bool {
        self.dirty > 0
    }

    pub fn cx(&self) -> usize {
        self.cx
    }

    pub fn cy(&self) -> usize {
        self.cy
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines(self.row.iter())
    }

    pub fn rows_to_bytes(&self) -> Vec<u8> {
        let len = self.row.iter().map(|r| r.len() + 1).sum();
        let mut bytes = Vec::with_capacity(len);
        for row in self.row.iter() {
            bytes.extend_from_slice(row.buffer());
            bytes.push(b'\n');
        }
        bytes
    }

    fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        f.set_len(bytes.len() as u64)?;
        f.write_all(bytes)?;
        f.flush()
    }

    // Returns a message to show in message bar. Error is not fatal so it is also a message
    pub fn save(&mut self) -> std::result::Result<String, String> {
        let file = if let Some(file) = &self.file {
            file
        } else {
            return Ok("".to_string()); // Nothing to do
        };

        let bytes = self.rows_to_bytes();
        if let Err(err) = Self::write_file(&file.path, &bytes) {
            tracing::warn!(file = %file.display, %err, "could not save");
            return Err(format!("Can't save! I/O error: {}", err));
        }

        tracing::info!(file = %file.display, bytes = bytes.len(), "saved");
        self.dirty = 0;
        Ok(format!("{} bytes written to disk", bytes.len()))
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cx = x;
        self.cy = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn lines(buf: &TextBuffer) -> Vec<&[u8]> {
        buf.lines().collect()
    }

    #[test]
    fn insert_char_at_virtual_end_row_appends_line() {
        let mut buf = TextBuffer::empty();
        buf.insert_char(b'a');
        buf.insert_char(b'b');
        assert_eq!(lines(&buf), vec![&b"ab"[..]]);
        assert_eq!(buf.cursor(), (2, 0));
        // One for new row and one for each character
        assert_eq!(buf.dirty(), 3);
    }

    #[test]
    fn insert_then_delete_bumps_dirty_twice() {
        let mut buf = TextBuffer::with_lines(vec!["abc"]);
        buf.set_cursor(1, 0);
        buf.insert_char(b'x');
        assert_eq!(lines(&buf), vec![&b"axbc"[..]]);
        buf.delete_char();
        assert_eq!(lines(&buf), vec![&b"abc"[..]]);
        assert_eq!(buf.cursor(), (1, 0));
        assert_eq!(buf.dirty(), 2);
    }

    #[test]
    fn delete_at_start_of_document_is_noop() {
        let mut buf = TextBuffer::with_lines(vec!["abc", "def"]);
        buf.delete_char();
        assert_eq!(lines(&buf), vec![&b"abc"[..], &b"def"[..]]);
        assert_eq!(buf.cursor(), (0, 0));
        assert_eq!(buf.dirty(), 0);
    }

    #[test]
    fn backspace_at_line_head_joins_lines() {
        let mut buf = TextBuffer::with_lines(vec!["ab", "cd", "ef"]);
        buf.set_cursor(0, 2);
        buf.delete_char();
        assert_eq!(lines(&buf), vec![&b"ab"[..], &b"cdef"[..]]);
        assert_eq!(buf.cursor(), (2, 1));
        assert_eq!(buf.rows()[1].render(), b"cdef");
    }

    #[test]
    fn backspace_within_line_never_joins() {
        let mut buf = TextBuffer::with_lines(vec!["ab", "cd", "ef"]);
        buf.set_cursor(2, 2);
        buf.delete_char();
        buf.delete_char();
        assert_eq!(lines(&buf), vec![&b"ab"[..], &b"cd"[..], &b""[..]]);
        assert_eq!(buf.cursor(), (0, 2));
        assert_eq!(buf.rows().len(), 3);
    }

    #[test]
    fn delete_right_char() {
        let mut buf = TextBuffer::with_lines(vec!["ab", "cd"]);
        buf.delete_right_char();
        assert_eq!(lines(&buf), vec![&b"b"[..], &b"cd"[..]]);

        // At end of line, delete key joins next line
        buf.set_cursor(1, 0);
        buf.delete_right_char();
        assert_eq!(lines(&buf), vec![&b"bcd"[..]]);
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn out_of_range_row_operations_are_noop() {
        let mut buf = TextBuffer::with_lines(vec!["ab"]);
        buf.delete_row(1);
        buf.insert_row(3, "x");
        buf.row_delete_char(0, 2);
        buf.row_delete_char(5, 0);
        buf.row_append(1, "x");
        buf.row_insert_char(2, 0, b'x');
        assert_eq!(lines(&buf), vec![&b"ab"[..]]);
        assert_eq!(buf.dirty(), 0);
    }

    #[test]
    fn move_cursor_wraps_and_snaps() {
        let mut buf = TextBuffer::with_lines(vec!["abcd", "x"]);
        buf.move_cursor_to_line_edge(CursorDir::Right);
        assert_eq!(buf.cursor(), (4, 0));
        buf.move_cursor_one(CursorDir::Down);
        assert_eq!(buf.cursor(), (1, 1));
        buf.move_cursor_one(CursorDir::Right);
        assert_eq!(buf.cursor(), (0, 2));
        buf.move_cursor_one(CursorDir::Right);
        assert_eq!(buf.cursor(), (0, 2));
        buf.move_cursor_one(CursorDir::Down);
        assert_eq!(buf.cursor(), (0, 2));
        buf.move_cursor_one(CursorDir::Left);
        assert_eq!(buf.cursor(), (1, 1));
        buf.move_cursor_one(CursorDir::Up);
        assert_eq!(buf.cursor(), (1, 0));
        buf.move_cursor_one(CursorDir::Left);
        buf.move_cursor_one(CursorDir::Left);
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn move_cursor_page() {
        let mut buf = TextBuffer::with_lines((0..100).map(|i| i.to_string()));
        buf.move_cursor_page(CursorDir::Down, 0, 20);
        assert_eq!(buf.cy(), 39);
        buf.move_cursor_page(CursorDir::Up, 20, 20);
        assert_eq!(buf.cy(), 0);
        buf.move_cursor_page(CursorDir::Down, 90, 20);
        assert_eq!(buf.cy(), 100);
    }

    #[test]
    fn open_strips_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, b"ab\r\n\tc\r\n\r\nd").unwrap();

        let buf = TextBuffer::open(&path).unwrap();
        assert_eq!(lines(&buf), vec![&b"ab"[..], &b"\tc"[..], &b""[..], &b"d"[..]]);
        assert_eq!(buf.dirty(), 0);
        assert_eq!(buf.filename(), path.to_str());
    }

    #[test]
    fn open_empty_file_has_no_rows() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let buf = TextBuffer::open(f.path()).unwrap();
        assert!(buf.rows().is_empty());
    }

    #[test]
    fn open_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        match TextBuffer::open(dir.path().join("missing")) {
            Err(Error::OpenFile { path, .. }) => assert!(path.ends_with("missing")),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("opening missing file must fail"),
        }
    }

    #[test]
    fn save_round_trip_adds_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        for (content, expected) in &[
            (&b"ab\ncd\n"[..], &b"ab\ncd\n"[..]),
            (&b"ab\ncd"[..], &b"ab\ncd\n"[..]),
            (&b""[..], &b""[..]),
            (&b"\xff\xfe\t\n"[..], &b"\xff\xfe\t\n"[..]),
        ] {
            let path = dir.path().join("round_trip.txt");
            fs::write(&path, content).unwrap();
            let mut buf = TextBuffer::open(&path).unwrap();
            let msg = buf.save().unwrap();
            assert_eq!(msg, format!("{} bytes written to disk", expected.len()));
            assert_eq!(&fs::read(&path).unwrap()[..], *expected);
        }
    }

    #[test]
    fn save_truncates_longer_file_and_resets_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shrink.txt");
        fs::write(&path, b"a long line\nanother line\n").unwrap();

        let mut buf = TextBuffer::open(&path).unwrap();
        buf.delete_row(1);
        assert!(buf.modified());
        buf.save().unwrap();
        assert_eq!(buf.dirty(), 0);
        assert_eq!(fs::read(&path).unwrap(), b"a long line\n");
    }

    #[test]
    fn save_failure_keeps_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut buf = TextBuffer::with_lines(vec!["abc"]);
        buf.insert_char(b'x');
        buf.set_file(dir.path()); // Directory cannot be opened for writing

        let err = buf.save().unwrap_err();
        assert!(err.starts_with("Can't save! I/O error:"), "{}", err);
        assert_eq!(buf.dirty(), 1);
    }

    #[test]
    fn save_without_file_is_noop() {
        let mut buf = TextBuffer::with_lines(vec!["abc"]);
        buf.insert_char(b'x');
        assert_eq!(buf.save(), Ok("".to_string()));
        assert_eq!(buf.dirty(), 1);
    }
}
