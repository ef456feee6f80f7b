#![no_main]
use libfuzzer_sys::fuzz_target;

use kilo_editor::{ctrl_key, Editor, InputSequences, KeySeq, Result, QUIT_TIMES};
use std::io::{self, Write};

const TEXT: &[&str] = &["fn main() {", "\tprintln!(\"hello\");", "", "}"];

// Decodes raw terminal bytes then forces quitting at the end
struct FuzzInput<'a> {
    seqs: InputSequences<&'a [u8]>,
    quit: usize,
}

impl<'a> Iterator for FuzzInput<'a> {
    type Item = Result<KeySeq>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.seqs.next()? {
            Ok(KeySeq::Unidentified) if self.quit > 0 => {
                self.quit -= 1;
                Some(Ok(KeySeq::Key(ctrl_key(b'q'))))
            }
            Ok(KeySeq::Unidentified) => None,
            seq => Some(seq),
        }
    }
}

struct Discard;

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let input = FuzzInput {
        seqs: InputSequences::new(data),
        quit: QUIT_TIMES + 1,
    };
    let mut editor = Editor::with_lines(TEXT.iter().copied(), input, Discard, (80, 24)).unwrap();
    editor.edit().unwrap(); // Editor must quit successfully
});
