/// Line editor for the kernel console.
///
/// Supports:
/// - Printable ASCII and TAB input, up to `MAX_LINE - 1` bytes
/// - Backspace / DEL (0x08 / 0x7F): delete character before cursor
/// - Enter (CR or LF): submit line
/// - Ctrl-C (0x03): cancel current line
/// - Ctrl-D (0x04): end of input, on an empty line only
/// - Ctrl-U (0x15): clear line
/// - Ctrl-L (0x0C): redraw line
use crate::param::MAX_LINE;
use crate::sys::{Console, Keyboard};

const BEL: u8 = 0x07;
const BS: u8 = 0x08;
const DEL: u8 = 0x7F;
const ESC: u8 = 0x1B;
pub(crate) const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const CTRL_L: u8 = 0x0C;
const CTRL_U: u8 = 0x15;

/// What one call to [`LineEditor::read_line`] produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Line(&'a str),
    /// Ctrl-C; the partial line was thrown away.
    Cancelled,
    /// The keyboard is gone or Ctrl-D was pressed on an empty line.
    Closed,
}

pub struct LineEditor {
    buf: [u8; MAX_LINE],
    len: usize,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_LINE],
            len: 0,
        }
    }

    /// Read one line, echoing to `console`. The previous line is discarded.
    pub fn read_line(&mut self, keyboard: &mut dyn Keyboard, console: &mut dyn Console) -> Input<'_> {
        self.len = 0;

        loop {
            let Some(byte) = keyboard.read_byte() else {
                return Input::Closed;
            };

            match byte {
                b'\r' | b'\n' => {
                    console.put_byte(b'\r');
                    console.put_byte(b'\n');
                    return Input::Line(self.as_str());
                }

                CTRL_C => {
                    let _ = console.write_str("^C\r\n");
                    self.len = 0;
                    return Input::Cancelled;
                }

                CTRL_D => {
                    if self.len == 0 {
                        console.put_byte(b'\r');
                        console.put_byte(b'\n');
                        return Input::Closed;
                    }
                }

                CTRL_U => {
                    self.erase_line(console);
                    self.len = 0;
                }

                CTRL_L => {
                    self.erase_line(console);
                    self.redraw(console);
                }

                BS | DEL => {
                    // Nothing to erase: the cursor stays at the origin.
                    if self.len > 0 {
                        self.len -= 1;
                        console.put_byte(BS);
                        console.put_byte(b' ');
                        console.put_byte(BS);
                    }
                }

                // Escape sequences (arrow keys etc.) are consumed and dropped
                ESC => {
                    if let Some(b'[') = keyboard.try_read_byte() {
                        // CSI: read until a letter or ~, at most 8 bytes
                        for _ in 0..8 {
                            match keyboard.try_read_byte() {
                                Some(c) if c.is_ascii_alphabetic() || c == b'~' => break,
                                Some(_) => {}
                                None => break,
                            }
                        }
                    }
                }

                b'\t' | 0x20..=0x7E => {
                    if self.len < MAX_LINE - 1 {
                        self.buf[self.len] = byte;
                        self.len += 1;
                        console.put_byte(byte);
                    } else {
                        console.put_byte(BEL);
                    }
                }

                // Ignore everything else (control chars, high bytes)
                _ => {}
            }
        }
    }

    /// The current contents of the buffer.
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Erase the current line on the terminal.
    fn erase_line(&self, console: &mut dyn Console) {
        for _ in 0..self.len {
            console.put_byte(BS);
        }
        for _ in 0..self.len {
            console.put_byte(b' ');
        }
        for _ in 0..self.len {
            console.put_byte(BS);
        }
    }

    fn redraw(&self, console: &mut dyn Console) {
        for &b in &self.buf[..self.len] {
            console.put_byte(b);
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::mock::{CaptureConsole, ScriptedKeyboard};
    use alloc::string::String;
    use alloc::vec::Vec;

    fn read_all(script: &[u8]) -> (Vec<String>, CaptureConsole) {
        let mut kb = ScriptedKeyboard::from_bytes(script);
        let mut console = CaptureConsole::new();
        let mut editor = LineEditor::new();
        let mut lines = Vec::new();
        while let Input::Line(line) = editor.read_line(&mut kb, &mut console) {
            lines.push(String::from(line));
        }
        (lines, console)
    }

    #[test]
    fn plain_line() {
        let (lines, console) = read_all(b"echo hi\r");
        assert_eq!(lines, ["echo hi"]);
        assert_eq!(console.output(), "echo hi\r\n");
    }

    #[test]
    fn backspace_erases_pairs() {
        let (lines, _) = read_all(b"lisx\x08t\rab\x7f\x7fc\r");
        assert_eq!(lines, ["list", "c"]);
    }

    #[test]
    fn backspace_on_empty_is_a_no_op() {
        let (lines, console) = read_all(b"\x08\x08\x7fok\r");
        assert_eq!(lines, ["ok"]);
        // Nothing echoed for the three backspaces.
        assert_eq!(console.output(), "ok\r\n");
    }

    #[test]
    fn backspace_echo() {
        let (_, console) = read_all(b"a\x08\r");
        assert_eq!(console.output(), "a\x08 \x08\r\n");
    }

    #[test]
    fn shorter_line_does_not_see_previous_one() {
        let (lines, _) = read_all(b"stress\rrun\r\r");
        assert_eq!(lines, ["stress", "run", ""]);
    }

    #[test]
    fn overflow_is_rejected_with_bell() {
        let mut script = alloc::vec![b'x'; MAX_LINE + 5];
        script.push(b'\r');
        let (lines, console) = read_all(&script);
        assert_eq!(lines[0].len(), MAX_LINE - 1);
        assert_eq!(console.output().matches('\x07').count(), 6);
    }

    #[test]
    fn backspace_after_overflow_frees_a_slot() {
        let mut script = alloc::vec![b'x'; MAX_LINE];
        script.extend_from_slice(b"\x08yz\r");
        let (lines, _) = read_all(&script);
        assert_eq!(lines[0].len(), MAX_LINE - 1);
        assert!(lines[0].ends_with('y'));
    }

    #[test]
    fn control_bytes_are_ignored() {
        let (lines, _) = read_all(b"a\x01\x02\xffb\r");
        assert_eq!(lines, ["ab"]);
    }

    #[test]
    fn ctrl_c_cancels() {
        let mut kb = ScriptedKeyboard::from_bytes(b"partial\x03next\r");
        let mut console = CaptureConsole::new();
        let mut editor = LineEditor::new();
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Cancelled);
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Line("next"));
        assert!(console.contains("^C"));
    }

    #[test]
    fn ctrl_u_clears() {
        let (lines, _) = read_all(b"garbage\x15help\r");
        assert_eq!(lines, ["help"]);
    }

    #[test]
    fn ctrl_d_only_closes_empty_line() {
        let mut kb = ScriptedKeyboard::from_bytes(b"ab\x04c\r\x04");
        let mut console = CaptureConsole::new();
        let mut editor = LineEditor::new();
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Line("abc"));
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Closed);
    }

    #[test]
    fn escape_sequences_are_dropped() {
        // Up arrow: the ESC is typed, its tail is already in the FIFO.
        let mut kb = ScriptedKeyboard::from_bytes(b"ls\x1b\r");
        kb.press(b'[');
        kb.press(b'A');
        let mut console = CaptureConsole::new();
        let mut editor = LineEditor::new();
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Line("ls"));
        assert_eq!(console.output(), "ls\r\n");
        assert_eq!(kb.remaining(), 0);

        // Delete key ends with '~'; typing resumes after it.
        let mut kb = ScriptedKeyboard::from_bytes(b"ab\x1bc\r");
        for &b in b"[3~" {
            kb.press(b);
        }
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Line("abc"));
    }

    #[test]
    fn end_of_input_closes() {
        let mut kb = ScriptedKeyboard::new("unterminated");
        let mut console = CaptureConsole::new();
        let mut editor = LineEditor::new();
        assert_eq!(editor.read_line(&mut kb, &mut console), Input::Closed);
    }
}
