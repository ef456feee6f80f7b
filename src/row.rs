pub const TAB_STOP: usize = 8;

// One line of text. `render` is `chars` with tabs expanded and must be regenerated after every
// mutation of `chars`.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    pub fn new<B: Into<Vec<u8>>>(line: B) -> Row {
        let mut row = Row {
            chars: line.into(),
            render: vec![],
        };
        row.update_render();
        row
    }

    pub fn buffer(&self) -> &[u8] {
        &self.chars
    }

    pub fn render(&self) -> &[u8] {
        &self.render
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    fn update_render(&mut self) {
        let tabs = self.chars.iter().filter(|&&b| b == b'\t').count();
        let mut render = Vec::with_capacity(self.chars.len() + tabs * (TAB_STOP - 1));
        for &b in self.chars.iter() {
            if b == b'\t' {
                render.push(b' ');
                while render.len() % TAB_STOP != 0 {
                    render.push(b' ');
                }
            } else {
                render.push(b);
            }
        }
        self.render = render;
    }

    pub fn rx_from_cx(&self, cx: usize) -> usize {
        self.chars.iter().take(cx).fold(0, |rx, &b| {
            if b == b'\t' {
                // Proceed TAB_STOP spaces then subtract spaces by mod TAB_STOP
                rx + (TAB_STOP - 1) - (rx % TAB_STOP) + 1
            } else {
                rx + 1
            }
        })
    }

    // Note: 'at' is an index of buffer, not render text. It is clamped to the end of line
    pub fn insert_char(&mut self, at: usize, c: u8) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, c);
        self.update_render();
    }

    // Returns false when nothing was deleted
    pub fn delete_char(&mut self, at: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update_render();
        true
    }

    pub fn append<B: AsRef<[u8]>>(&mut self, s: B) {
        self.chars.extend_from_slice(s.as_ref());
        self.update_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tabs_to_tab_stop() {
        let row = Row::new("\tab\tc");
        assert_eq!(row.render(), b"        ab      c");
        assert_eq!(row.len(), 5);
        assert_eq!(row.render_len(), 17);

        let row = Row::new("1234567\tx");
        assert_eq!(row.render(), b"1234567 x");
    }

    #[test]
    fn render_is_idempotent_and_never_shorter() {
        for line in &["", "abc", "\t", "a\tb\t\tc", "\t\t\t"] {
            let mut row = Row::new(*line);
            let before = row.render().to_vec();
            row.update_render();
            assert_eq!(row.render(), &before[..], "{:?}", line);
            assert!(row.render_len() >= row.len(), "{:?}", line);
        }
    }

    #[test]
    fn rx_from_cx() {
        let row = Row::new("hello");
        for cx in 0..=row.len() {
            assert_eq!(row.rx_from_cx(cx), cx);
        }

        let row = Row::new("a\tbc\t\td");
        let rxs: Vec<_> = (0..=row.len()).map(|cx| row.rx_from_cx(cx)).collect();
        assert_eq!(rxs, vec![0, 1, 8, 9, 10, 16, 24, 25]);
        assert!(rxs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*rxs.last().unwrap(), row.render_len());
    }

    #[test]
    fn insert_clamps_position() {
        let mut row = Row::new("ab");
        row.insert_char(100, b'c');
        assert_eq!(row.buffer(), b"abc");
        row.insert_char(0, b'\t');
        assert_eq!(row.buffer(), b"\tabc");
        assert_eq!(row.render(), b"        abc");
    }

    #[test]
    fn insert_then_delete_restores_row() {
        let mut row = Row::new("a\tb");
        let orig = row.clone();
        row.insert_char(1, b'x');
        assert!(row.delete_char(1));
        assert_eq!(row, orig);
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let mut row = Row::new("ab");
        assert!(!row.delete_char(2));
        assert!(!row.delete_char(42));
        assert_eq!(row.buffer(), b"ab");
    }

    #[test]
    fn append_regenerates_render() {
        let mut row = Row::new("ab");
        row.append(b"\tc");
        assert_eq!(row.buffer(), b"ab\tc");
        assert_eq!(row.render(), b"ab      c");
    }
}
