use crate::text_buffer::TextBuffer;

#[derive(Default)]
pub struct StatusBar {
    pub modified: bool,
    pub filename: Option<String>,
    pub num_lines: usize,
    pub line_pos: usize,
}

impl StatusBar {
    pub fn from_buffer(buf: &TextBuffer) -> Self {
        let mut bar = Self::default();
        bar.update_from_buf(buf);
        bar
    }

    pub fn left(&self) -> String {
        format!(
            "{:.20} - {} lines {}",
            self.filename.as_deref().unwrap_or("[New File]"),
            self.num_lines,
            if self.modified { "(modified)" } else { "" }
        )
    }

    pub fn right(&self) -> String {
        format!("{}/{}", self.line_pos, self.num_lines)
    }

    // Status bar text which fills exactly `width` columns
    pub fn compose(&self, width: usize) -> String {
        let mut bar: String = self.left().chars().take(width).collect();
        let mut len = bar.chars().count();
        let right = self.right();
        while len < width {
            if width - len == right.len() {
                bar.push_str(&right);
                break;
            }
            bar.push(' ');
            len += 1;
        }
        bar
    }

    pub fn update_from_buf(&mut self, buf: &TextBuffer) {
        self.modified = buf.modified();
        self.filename = buf.filename().map(str::to_string);
        self.num_lines = buf.rows().len();
        self.line_pos = buf.cy() + 1;
    }
}
