// VT100 sequences used by the screen. Refs: https://vt100.net/docs/vt100-ug/chapter3.html
use std::io::{self, Write};

// 2: Argument of 'J' command to reset entire screen http://vt100.net/docs/vt100-ug/chapter3.html#ED
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
// H: Command to move cursor. Here \x1b[H is the same as \x1b[1;1H
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
// Erases the part of the line to the right of the cursor. http://vt100.net/docs/vt100-ug/chapter3.html#EL
pub const CLEAR_LINE_RIGHT: &[u8] = b"\x1b[K";
// 'l' is command to set mode http://vt100.net/docs/vt100-ug/chapter3.html#SM
pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
// 'h' is command to reset mode https://vt100.net/docs/vt100-ug/chapter3.html#RM
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
// 'm' sets attributes to text printed after: https://vt100.net/docs/vt100-ug/chapter3.html#SGR
pub const INVERT: &[u8] = b"\x1b[7m";
// Default argument of 'm' command is 0 so it resets attributes
pub const RESET: &[u8] = b"\x1b[m";
// 'C' and 'B' stop at the edge of screen so large counts move cursor to the bottom-right corner
pub const MOVE_TO_BOTTOM_RIGHT: &[u8] = b"\x1b[999C\x1b[999B";
// https://vt100.net/docs/vt100-ug/chapter3.html#DSR
pub const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";

// row and col are 1-based
pub fn cursor_position<W: Write>(mut w: W, row: usize, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", row, col)
}
