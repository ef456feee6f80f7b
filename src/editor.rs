use crate::error::Result;
use crate::input::{ctrl_key, KeySeq};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::{CursorDir, Lines, TextBuffer};
use std::io::Write;
use std::path::Path;

// Number of extra Ctrl-Q presses required to quit with unsaved changes
pub const QUIT_TIMES: usize = 3;

pub struct Editor<I: Iterator<Item = Result<KeySeq>>, W: Write> {
    input: I,          // Key sequences stream represented as Iterator
    quit_times: usize, // Remaining Ctrl-Q presses to quit dirty buffer
    screen: Screen<W>,
    buf: TextBuffer,
    status_bar: StatusBar,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = Result<KeySeq>>,
    W: Write,
{
    fn with_buf(
        buf: TextBuffer,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>> {
        let screen = Screen::new(window_size, output)?;
        let status_bar = StatusBar::from_buffer(&buf);
        Ok(Editor {
            input,
            quit_times: QUIT_TIMES,
            screen,
            buf,
            status_bar,
        })
    }

    pub fn new(input: I, output: W, window_size: (usize, usize)) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::empty(), input, output, window_size)
    }

    pub fn with_lines<L, B>(
        lines: L,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>>
    where
        L: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::with_buf(TextBuffer::with_lines(lines), input, output, window_size)
    }

    pub fn open<P: AsRef<Path>>(
        input: I,
        output: W,
        window_size: (usize, usize),
        path: Option<P>,
    ) -> Result<Editor<I, W>> {
        let buf = match path {
            Some(path) => TextBuffer::open(path)?,
            None => TextBuffer::empty(),
        };
        Self::with_buf(buf, input, output, window_size)
    }

    pub fn buf(&self) -> &TextBuffer {
        &self.buf
    }

    fn render_screen(&mut self) -> Result<()> {
        self.status_bar.update_from_buf(&self.buf);
        self.screen.render(&self.buf, &self.status_bar)
    }

    fn save(&mut self) {
        match self.buf.save() {
            Ok(msg) if msg.is_empty() => {}
            Ok(msg) | Err(msg) => self.screen.set_message(msg),
        }
    }

    // Returns true when editor should quit
    fn handle_quit(&mut self) -> bool {
        if self.buf.modified() && self.quit_times > 0 {
            self.screen.set_message(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_times
            ));
            self.quit_times -= 1;
            false
        } else {
            true
        }
    }

    fn process_keypress(&mut self, key: KeySeq) -> bool {
        use KeySeq::*;

        let rowoff = self.screen.rowoff;
        let rows = self.screen.rows();

        match key {
            Unidentified => return false,
            Key(b) if b == ctrl_key(b'q') => return self.handle_quit(),
            Key(b) if b == ctrl_key(b's') => self.save(),
            Key(b'\r') => { /* Splitting line is not supported */ }
            // Our editor refreshes screen after any key
            Key(0x1b) => {}
            Key(b) if b == ctrl_key(b'l') => {}
            Key(0x7f) => self.buf.delete_char(), // Delete key is mapped to \x1b[3~
            Key(b) if b == ctrl_key(b'h') => self.buf.delete_char(),
            DeleteKey => self.buf.delete_right_char(),
            Key(b) => self.buf.insert_char(b),
            UpKey => self.buf.move_cursor_one(CursorDir::Up),
            LeftKey => self.buf.move_cursor_one(CursorDir::Left),
            DownKey => self.buf.move_cursor_one(CursorDir::Down),
            RightKey => self.buf.move_cursor_one(CursorDir::Right),
            PageUpKey => self.buf.move_cursor_page(CursorDir::Up, rowoff, rows),
            PageDownKey => self.buf.move_cursor_page(CursorDir::Down, rowoff, rows),
            HomeKey => self.buf.move_cursor_to_line_edge(CursorDir::Left),
            EndKey => self.buf.move_cursor_to_line_edge(CursorDir::Right),
        }

        self.quit_times = QUIT_TIMES;
        false
    }

    pub fn edit(&mut self) -> Result<()> {
        self.render_screen()?; // First paint

        while let Some(seq) = self.input.next() {
            let resized = self.screen.maybe_resize()?;
            let key = seq?;
            if key == KeySeq::Unidentified && !resized {
                continue; // Nothing happened within read timeout
            }
            tracing::trace!(%key, "key");

            if self.process_keypress(key) {
                tracing::info!(modified = self.buf.modified(), "quit");
                break;
            }

            self.render_screen()?;
        }

        self.screen.clear() // Finally clear screen on exit
    }

    pub fn lines(&self) -> Lines<'_> {
        self.buf.lines()
    }

    pub fn screen(&self) -> &'_ Screen<W> {
        &self.screen
    }
}
