// Refs:
//   Build Your Own Text Editor: https://viewsourcecode.org/snaptoken/kilo/index.html
//   VT100 User Guide: https://vt100.net/docs/vt100-ug/chapter3.html

mod ansi;
mod editor;
mod error;
mod input;
mod row;
mod screen;
mod status_bar;
mod text_buffer;


pub use editor::{Editor, QUIT_TIMES};
pub use error::{Error, Result};
pub use input::{ctrl_key, InputSequences, KeySeq, StdinRawMode};
pub use row::{Row, TAB_STOP};
pub use screen::{Screen, VERSION};
pub use status_bar::StatusBar;
pub use text_buffer::{CursorDir, Lines, TextBuffer};
