use crate::ansi;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::status_bar::StatusBar;
use crate::text_buffer::TextBuffer;
use std::cmp;
use signal_hook::consts::SIGWINCH;
use signal_hook::SigId;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
// Status bar and message bar
const RESERVED_ROWS: usize = 2;
const MESSAGE_LIFETIME: Duration = Duration::from_secs(5);

// Set from the signal handler and taken by the main loop before each key
struct ResizeFlag {
    pending: Arc<AtomicBool>,
    id: SigId,
}

impl ResizeFlag {
    fn register() -> Result<Self> {
        let pending = Arc::new(AtomicBool::new(false));
        let id = signal_hook::flag::register(SIGWINCH, Arc::clone(&pending))?;
        Ok(Self { pending, id })
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Relaxed)
    }
}

impl Drop for ResizeFlag {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.id);
    }
}

pub struct StatusMessage {
    text: String,
    timestamp: SystemTime,
}

impl StatusMessage {
    fn new<S: Into<String>>(message: S) -> StatusMessage {
        StatusMessage {
            text: message.into(),
            timestamp: SystemTime::now(),
        }
    }

    fn visible_at(&self, now: SystemTime) -> bool {
        match now.duration_since(self.timestamp) {
            Ok(d) => d < MESSAGE_LIFETIME,
            Err(_) => true, // Clock went backwards
        }
    }
}

pub struct Screen<W: Write> {
    output: W,
    // X coordinate in `render` text of rows
    rx: usize,
    // Screen size
    num_cols: usize,
    num_rows: usize,
    message: StatusMessage,
    resized: ResizeFlag,
    // Scroll position (row/col offset)
    pub rowoff: usize,
    pub coloff: usize,
}

impl<W: Write> Screen<W> {
    // `window_size` is (width, height) of terminal window
    pub fn new(window_size: (usize, usize), output: W) -> Result<Self> {
        let mut screen = Self {
            output,
            rx: 0,
            num_cols: 0,
            num_rows: 0,
            message: StatusMessage::new("HELP: Ctrl-S = save | Ctrl-Q = quit"),
            resized: ResizeFlag::register()?,
            rowoff: 0,
            coloff: 0,
        };
        screen.set_window_size(window_size)?;
        Ok(screen)
    }

    fn set_window_size(&mut self, (w, h): (usize, usize)) -> Result<()> {
        if w < 1 || h < RESERVED_ROWS + 1 {
            return Err(Error::TooSmallWindow(w, h));
        }
        self.num_cols = w;
        // Screen height is 2 lines less than window height due to status bar and message bar
        self.num_rows = h - RESERVED_ROWS;
        Ok(())
    }

    // Row at the vertical center of the terminal window
    fn welcome_row(&self) -> usize {
        cmp::min((self.num_rows + RESERVED_ROWS) / 2, self.num_rows - 1)
    }

    fn draw_welcome_message<B: Write>(&self, mut buf: B) -> Result<()> {
        let msg_buf = format!("Kilo editor -- version {}", VERSION);
        let welcome = &msg_buf.as_bytes()[..cmp::min(msg_buf.len(), self.num_cols)];
        let mut padding = (self.num_cols - welcome.len()) / 2;
        if padding > 0 {
            buf.write_all(b"~")?;
            padding -= 1;
        }
        for _ in 0..padding {
            buf.write_all(b" ")?;
        }
        buf.write_all(welcome)?;
        Ok(())
    }

    fn draw_rows<B: Write>(&self, mut buf: B, rows: &[Row]) -> Result<()> {
        for y in 0..self.num_rows {
            let file_row = y + self.rowoff;

            if file_row >= rows.len() {
                if rows.is_empty() && y == self.welcome_row() {
                    self.draw_welcome_message(&mut buf)?;
                } else {
                    buf.write_all(b"~")?;
                }
            } else {
                let render = rows[file_row].render();
                if render.len() > self.coloff {
                    let end = cmp::min(render.len(), self.coloff + self.num_cols);
                    buf.write_all(&render[self.coloff..end])?;
                }
            }

            buf.write_all(ansi::CLEAR_LINE_RIGHT)?;
            buf.write_all(b"\r\n")?;
        }
        Ok(())
    }

    fn draw_status_bar<B: Write>(&self, mut buf: B, status_bar: &StatusBar) -> Result<()> {
        buf.write_all(ansi::INVERT)?;
        buf.write_all(status_bar.compose(self.num_cols).as_bytes())?;
        buf.write_all(ansi::RESET)?;
        buf.write_all(b"\r\n")?;
        Ok(())
    }

    fn draw_message_bar<B: Write>(&self, mut buf: B) -> Result<()> {
        buf.write_all(ansi::CLEAR_LINE_RIGHT)?;
        if self.message.visible_at(SystemTime::now()) {
            let msg: String = self.message.text.chars().take(self.num_cols).collect();
            buf.write_all(msg.as_bytes())?;
        }
        Ok(())
    }

    fn redraw_screen(&mut self, rows: &[Row], status_bar: &StatusBar, cy: usize) -> Result<()> {
        let mut buf = Vec::with_capacity((self.num_rows + RESERVED_ROWS) * self.num_cols);

        // Hide cursor while updating screen to avoid flicker
        buf.write_all(ansi::HIDE_CURSOR)?;
        buf.write_all(ansi::CURSOR_HOME)?;

        self.draw_rows(&mut buf, rows)?;
        self.draw_status_bar(&mut buf, status_bar)?;
        self.draw_message_bar(&mut buf)?;

        // Move cursor
        let cursor_row = cy - self.rowoff + 1;
        let cursor_col = self.rx - self.coloff + 1;
        ansi::cursor_position(&mut buf, cursor_row, cursor_col)?;

        // Reveal cursor again
        buf.write_all(ansi::SHOW_CURSOR)?;

        self.output.write_all(&buf)?;
        self.output.flush()?;
        Ok(())
    }

    pub fn scroll(&mut self, rows: &[Row], cx: usize, cy: usize) {
        // Calculate X coordinate to render considering tab stop
        self.rx = match rows.get(cy) {
            Some(row) => row.rx_from_cx(cx),
            None => cx,
        };

        // Adjust scroll position when cursor is outside screen
        if cy < self.rowoff {
            // Scroll up when cursor is above the top of window
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.num_rows {
            // Scroll down when cursor is below the bottom of screen
            self.rowoff = cy - self.num_rows + 1;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        if self.rx >= self.coloff + self.num_cols {
            self.coloff = self.rx - self.num_cols + 1;
        }
    }

    pub fn render(&mut self, buf: &TextBuffer, status_bar: &StatusBar) -> Result<()> {
        self.scroll(buf.rows(), buf.cx(), buf.cy());
        self.redraw_screen(buf.rows(), status_bar, buf.cy())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.output.write_all(ansi::CLEAR_SCREEN)?;
        // Set cursor position to left-top corner
        self.output.write_all(ansi::CURSOR_HOME)?;
        self.output.flush()?;
        Ok(())
    }

    // Returns true when window size was changed
    pub fn maybe_resize(&mut self) -> Result<bool> {
        if !self.resized.take() {
            return Ok(false);
        }

        match term_size::dimensions_stdout() {
            Some(size) => {
                tracing::debug!(width = size.0, height = size.1, "window resized");
                self.set_window_size(size)?;
                Ok(true)
            }
            None => {
                tracing::warn!("could not get window size after resize");
                Ok(false)
            }
        }
    }

    pub fn set_message<S: Into<String>>(&mut self, message: S) {
        self.message = StatusMessage::new(message);
    }

    pub fn message_text(&self) -> &'_ str {
        if self.message.visible_at(SystemTime::now()) {
            self.message.text.as_str()
        } else {
            ""
        }
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    pub fn cols(&self) -> usize {
        self.num_cols
    }

    pub fn rx(&self) -> usize {
        self.rx
    }
}
