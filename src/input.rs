use crate::ansi;
use crate::error::{Error, Result};
use std::fmt;
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::str;

pub struct StdinRawMode {
    stdin: io::Stdin,
    orig: termios::Termios,
}

impl StdinRawMode {
    pub fn new() -> Result<StdinRawMode> {
        use termios::*;

        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut termios = Termios::from_fd(fd)?;
        let orig = termios;

        // Set terminal raw mode. Disable echo back, canonical mode, signals (SIGINT, SIGTSTP) and Ctrl+V.
        termios.c_lflag &= !(ECHO | ICANON | ISIG | IEXTEN);
        // Disable control flow mode (Ctrl+Q/Ctrl+S) and CR-to-NL translation
        termios.c_iflag &= !(IXON | ICRNL | BRKINT | INPCK | ISTRIP);
        // Disable output processing such as \n to \r\n translation
        termios.c_oflag &= !OPOST;
        // Ensure character size is 8bits
        termios.c_cflag |= CS8;
        // Do not wait for next byte with blocking since reading 0 byte is permitted
        termios.c_cc[VMIN] = 0;
        // Set read timeout to 1/10 second it enables 100ms timeout on read()
        termios.c_cc[VTIME] = 1;
        // Apply terminal configurations
        tcsetattr(fd, TCSAFLUSH, &termios)?;

        tracing::debug!("terminal switched to raw mode");
        Ok(StdinRawMode { stdin, orig })
    }

    pub fn input_keys(self) -> InputSequences<StdinRawMode> {
        InputSequences::new(self)
    }
}

impl Drop for StdinRawMode {
    fn drop(&mut self) {
        // Restore original terminal mode
        if let Err(err) = termios::tcsetattr(self.stdin.as_raw_fd(), termios::TCSAFLUSH, &self.orig)
        {
            tracing::error!(%err, "could not restore terminal mode");
        }
    }
}

impl Read for StdinRawMode {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdin.read(buf)
    }
}

pub const fn ctrl_key(b: u8) -> u8 {
    b & 0x1f
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum KeySeq {
    Unidentified, // Pseudo key: nothing arrived within read timeout
    Key(u8),
    LeftKey,
    RightKey,
    UpKey,
    DownKey,
    PageUpKey,
    PageDownKey,
    HomeKey,
    EndKey,
    DeleteKey,
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeySeq::*;
        match self {
            Unidentified => write!(f, "UNKNOWN"),
            Key(0x1b) => write!(f, "ESC"),
            Key(b' ') => write!(f, "SPACE"),
            Key(b) if *b < 0x20 => write!(f, "C-{}", (*b | 0b0110_0000) as char),
            Key(b) if b.is_ascii() && !b.is_ascii_control() => write!(f, "{}", *b as char),
            Key(b) => write!(f, "\\x{:x}", b),
            LeftKey => write!(f, "LEFT"),
            RightKey => write!(f, "RIGHT"),
            UpKey => write!(f, "UP"),
            DownKey => write!(f, "DOWN"),
            PageUpKey => write!(f, "PAGEUP"),
            PageDownKey => write!(f, "PAGEDOWN"),
            HomeKey => write!(f, "HOME"),
            EndKey => write!(f, "END"),
            DeleteKey => write!(f, "DELETE"),
        }
    }
}

pub struct InputSequences<R: Read> {
    reader: R,
}

impl<R: Read> InputSequences<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    // Ok(None) means read timed out. It is not an error in raw mode with VMIN=0
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut one_byte: [u8; 1] = [0];
        loop {
            match self.reader.read(&mut one_byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(one_byte[0])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn decode_escape_sequence(&mut self) -> Result<KeySeq> {
        use KeySeq::*;
        const ESC: KeySeq = Key(0x1b);

        // When next two bytes don't arrive within timeout, it is a single ESC key press
        let first = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(ESC),
        };
        let second = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(ESC),
        };

        let key = match (first, second) {
            (b'[', d) if d.is_ascii_digit() => {
                // e.g. \x1b[5~
                if self.read_byte()? != Some(b'~') {
                    return Ok(ESC);
                }
                match d {
                    b'1' | b'7' => HomeKey,
                    b'3' => DeleteKey,
                    b'4' | b'8' => EndKey,
                    b'5' => PageUpKey,
                    b'6' => PageDownKey,
                    _ => ESC,
                }
            }
            (b'[', b'A') => UpKey,
            (b'[', b'B') => DownKey,
            (b'[', b'C') => RightKey,
            (b'[', b'D') => LeftKey,
            (b'[', b'H') | (b'O', b'H') => HomeKey,
            (b'[', b'F') | (b'O', b'F') => EndKey,
            _ => ESC,
        };
        Ok(key)
    }

    fn decode(&mut self, b: u8) -> Result<KeySeq> {
        match b {
            // (Maybe) Escape sequence
            0x1b => self.decode_escape_sequence(),
            // Control characters are passed through as-is. Dispatcher gives them meanings
            _ => Ok(KeySeq::Key(b)),
        }
    }

    fn read_seq(&mut self) -> Result<KeySeq> {
        if let Some(b) = self.read_byte()? {
            self.decode(b)
        } else {
            Ok(KeySeq::Unidentified)
        }
    }

    // Block until one key arrives. Timeouts of the underlying read are retried
    pub fn read_key(&mut self) -> Result<KeySeq> {
        loop {
            match self.read_seq()? {
                KeySeq::Unidentified => continue,
                key => return Ok(key),
            }
        }
    }

    fn read_cursor_report(&mut self) -> Result<Option<(usize, usize)>> {
        let mut buf = Vec::with_capacity(32);
        while buf.len() < 32 {
            match self.read_byte()? {
                Some(b'R') => break,
                Some(b) => buf.push(b),
                None => break,
            }
        }
        Ok(parse_cursor_report(&buf))
    }

    // Returns (width, height) of the terminal window
    pub fn query_window_size<W: Write>(&mut self, output: W) -> Result<(usize, usize)> {
        if let Some(size) = term_size::dimensions_stdout() {
            return Ok(size);
        }
        self.query_window_size_by_cursor_report(output)
    }

    fn query_window_size_by_cursor_report<W: Write>(
        &mut self,
        mut output: W,
    ) -> Result<(usize, usize)> {
        // By moving cursor at the bottom-right corner by 'B' and 'C' commands, get the size of
        // current screen. \x1b[9999;9999H is not available since it does not guarantee cursor
        // stops on the corner. Finaly command 'n' queries cursor position.
        tracing::debug!("falling back to cursor position report to get window size");
        output.write_all(ansi::MOVE_TO_BOTTOM_RIGHT)?;
        output.write_all(ansi::REQUEST_CURSOR_POSITION)?;
        output.flush()?;

        match self.read_cursor_report()? {
            Some((rows, cols)) => Ok((cols, rows)),
            None => Err(Error::UnknownWindowSize),
        }
    }
}

// https://vt100.net/docs/vt100-ug/chapter3.html#CPR e.g. \x1b[24;80R ('R' already consumed)
fn parse_cursor_report(buf: &[u8]) -> Option<(usize, usize)> {
    fn parse_bytes_as_usize(b: &[u8]) -> Option<usize> {
        str::from_utf8(b).ok().and_then(|s| s.parse().ok())
    }

    let args = buf.strip_prefix(b"\x1b[")?;
    let mut args = args.split(|b| *b == b';').map(parse_bytes_as_usize);
    match (args.next(), args.next(), args.next()) {
        (Some(Some(r)), Some(Some(c)), None) => Some((r, c)),
        _ => None,
    }
}

impl<R: Read> Iterator for InputSequences<R> {
    type Item = Result<KeySeq>;

    // Read next byte from stdin with timeout 100ms. If nothing was read, it returns KeySeq::Unidentified.
    // This method never returns None so for loop never ends
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_seq())
    }
}
