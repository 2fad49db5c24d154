//! Single-line edit buffer behind `LabelEdit`.
//!
//! The caret is a byte offset that always sits on a grapheme boundary.
//! Numeric text types are cleaned after every edit, so the buffer never holds
//! characters the type can't accept; it may still hold an incomplete number
//! like `-` or `1.`, which [`TextEdit::confirm`] rejects.

use folio_core::{Clipboard, KeyCode, KeyEvent};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextType {
    #[default]
    Text,
    SInt,
    SIntSpaced,
    UInt,
    UIntSpaced,
    SFloat,
    SFloatSpaced,
    UFloat,
    UFloatSpaced,
}

struct Rules {
    signed: bool,
    float: bool,
    spaced: bool,
}

impl TextType {
    fn rules(self) -> Option<Rules> {
        let (signed, float, spaced) = match self {
            TextType::Text => return None,
            TextType::SInt => (true, false, false),
            TextType::SIntSpaced => (true, false, true),
            TextType::UInt => (false, false, false),
            TextType::UIntSpaced => (false, false, true),
            TextType::SFloat => (true, true, false),
            TextType::SFloatSpaced => (true, true, true),
            TextType::UFloat => (false, true, false),
            TextType::UFloatSpaced => (false, true, true),
        };
        Some(Rules {
            signed,
            float,
            spaced,
        })
    }
}

/// Drops every character `ty` doesn't allow at its position.
///
/// Signed types accept a `-` only as the first character of a number, float
/// types one `.` per number. Spaced types keep spaces between numbers.
pub fn clean(text: &str, ty: TextType) -> String {
    let Some(rules) = ty.rules() else {
        return text.to_owned();
    };
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    let mut dot = false;
    for c in text.chars() {
        if c == ' ' && rules.spaced {
            out.push(c);
            word_start = true;
            dot = false;
            continue;
        }
        let first = std::mem::replace(&mut word_start, false);
        if c.is_ascii_digit() || (rules.signed && c == '-' && first) {
            out.push(c);
        } else if rules.float && c == '.' && !dot {
            dot = true;
            out.push(c);
        }
    }
    out
}

/// Whether already cleaned `text` holds a complete value of `ty`.
pub fn is_valid(text: &str, ty: TextType) -> bool {
    let Some(rules) = ty.rules() else {
        return true;
    };
    let mut words = text.split(' ').filter(|w| !w.is_empty()).peekable();
    if words.peek().is_none() {
        return false;
    }
    words.all(|w| {
        if rules.float {
            w.parse::<f64>().is_ok()
        } else {
            w.parse::<i64>().is_ok()
        }
    })
}

fn prev_boundary(text: &str, byte: usize) -> usize {
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|&i| i < byte)
        .last()
        .unwrap_or(0)
}

fn next_boundary(text: &str, byte: usize) -> usize {
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .find(|&i| i > byte)
        .unwrap_or(text.len())
}

/// Start of the word before `byte`, skipping the spaces in between.
pub fn word_start(text: &str, byte: usize) -> usize {
    let head = &text[..byte];
    let trimmed = head.trim_end_matches(' ');
    trimmed.rfind(' ').map_or(0, |i| i + 1)
}

/// End of the word after `byte`, skipping the spaces in between.
pub fn word_end(text: &str, byte: usize) -> usize {
    let tail = &text[byte..];
    let skipped = tail.len() - tail.trim_start_matches(' ').len();
    let rest = &tail[skipped..];
    byte + skipped + rest.find(' ').unwrap_or(rest.len())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Key had no effect on the buffer.
    Ignored,
    Moved,
    Edited,
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, Default)]
pub struct TextEdit {
    text: String,
    caret: usize,
    old: String,
    ty: TextType,
}

impl TextEdit {
    pub fn new(text: &str, ty: TextType) -> Self {
        let text = clean(text, ty);
        Self {
            caret: text.len(),
            old: text.clone(),
            text,
            ty,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn old_text(&self) -> &str {
        &self.old
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn text_type(&self) -> TextType {
        self.ty
    }

    /// Replaces the text programmatically; the previous text becomes the one
    /// a cancel or undo returns to.
    pub fn set_text(&mut self, text: &str) {
        self.old = std::mem::replace(&mut self.text, clean(text, self.ty));
        self.caret = self.text.len();
    }

    /// Remembers the current text as the value to revert to and puts the
    /// caret at the end.
    pub fn begin(&mut self) {
        self.old = self.text.clone();
        self.caret = self.text.len();
    }

    pub fn set_caret(&mut self, byte: usize) {
        let byte = byte.min(self.text.len());
        self.caret = if self.text.is_char_boundary(byte) {
            byte
        } else {
            prev_boundary(&self.text, byte)
        };
    }

    pub fn insert(&mut self, s: &str) {
        let before = self.text.len();
        self.text.insert_str(self.caret, s);
        self.text = clean(&self.text, self.ty);
        let grown = self.text.len().saturating_sub(before);
        self.set_caret(self.caret + grown);
    }

    fn remove(&mut self, from: usize, to: usize) -> EditOutcome {
        if from >= to {
            return EditOutcome::Ignored;
        }
        self.text.replace_range(from..to, "");
        self.text = clean(&self.text, self.ty);
        self.set_caret(from);
        EditOutcome::Edited
    }

    /// Keeps the text if it is a complete value, otherwise restores the text
    /// from before the edit. Returns whether the edit was kept.
    pub fn confirm(&mut self) -> bool {
        let valid = is_valid(&self.text, self.ty);
        if valid {
            self.old = self.text.clone();
        } else {
            self.text = self.old.clone();
        }
        self.caret = self.text.len();
        valid
    }

    pub fn cancel(&mut self) {
        self.text = self.old.clone();
        self.caret = self.text.len();
    }

    pub fn on_key(&mut self, ev: &KeyEvent, clipboard: &mut dyn Clipboard) -> EditOutcome {
        let m = ev.modifiers;
        let moved = |ed: &mut Self, to: usize| {
            if to == ed.caret {
                EditOutcome::Ignored
            } else {
                ed.caret = to;
                EditOutcome::Moved
            }
        };
        match ev.key {
            KeyCode::Left => {
                let to = if m.alt_only() {
                    word_start(&self.text, self.caret)
                } else if m.ctrl_only() {
                    0
                } else {
                    prev_boundary(&self.text, self.caret)
                };
                moved(self, to)
            }
            KeyCode::Right => {
                let to = if m.alt_only() {
                    word_end(&self.text, self.caret)
                } else if m.ctrl_only() {
                    self.text.len()
                } else {
                    next_boundary(&self.text, self.caret)
                };
                moved(self, to)
            }
            KeyCode::Home => moved(self, 0),
            KeyCode::End => moved(self, self.text.len()),
            KeyCode::Backspace => {
                let from = if m.alt_only() {
                    word_start(&self.text, self.caret)
                } else if m.ctrl_only() {
                    0
                } else {
                    prev_boundary(&self.text, self.caret)
                };
                self.remove(from, self.caret)
            }
            KeyCode::Delete => {
                let to = if m.alt_only() {
                    word_end(&self.text, self.caret)
                } else if m.ctrl_only() {
                    self.text.len()
                } else {
                    next_boundary(&self.text, self.caret)
                };
                self.remove(self.caret, to)
            }
            KeyCode::V if m.ctrl_only() => match clipboard.get_text() {
                Some(s) if !s.is_empty() => {
                    self.insert(&s);
                    EditOutcome::Edited
                }
                _ => EditOutcome::Ignored,
            },
            KeyCode::C if m.ctrl_only() => {
                clipboard.set_text(&self.text);
                EditOutcome::Ignored
            }
            KeyCode::X if m.ctrl_only() => {
                clipboard.set_text(&self.text);
                self.remove(0, self.text.len())
            }
            KeyCode::Z | KeyCode::Y if m.ctrl_only() => {
                let restored = self.old.clone();
                self.set_text(&restored);
                EditOutcome::Edited
            }
            KeyCode::Return | KeyCode::KpEnter => EditOutcome::Confirm,
            KeyCode::Escape => EditOutcome::Cancel,
            _ => EditOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{MemoryClipboard, Modifiers};

    fn key(k: KeyCode) -> KeyEvent {
        KeyEvent::new(k)
    }

    fn ctrl(k: KeyCode) -> KeyEvent {
        KeyEvent::new(k).with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        })
    }

    fn alt(k: KeyCode) -> KeyEvent {
        KeyEvent::new(k).with_modifiers(Modifiers {
            alt: true,
            ..Modifiers::NONE
        })
    }

    #[test]
    fn test_clean_numeric_types() {
        assert_eq!(clean("a1b2-3", TextType::UInt), "123");
        assert_eq!(clean("-12-3", TextType::SInt), "-123");
        assert_eq!(clean("x-5", TextType::SInt), "5");
        assert_eq!(clean("1.2.3", TextType::UFloat), "1.23");
        assert_eq!(clean("-1.5e", TextType::SFloat), "-1.5");
        assert_eq!(clean("1.5 2.5.5 x", TextType::UFloatSpaced), "1.5 2.55 ");
        assert_eq!(clean("-1 -2a 3-", TextType::SIntSpaced), "-1 -2 3");
        assert_eq!(clean("12 34", TextType::UInt), "1234");
        assert_eq!(clean("any text", TextType::Text), "any text");
    }

    #[test]
    fn test_validity() {
        assert!(is_valid("-12", TextType::SInt));
        assert!(!is_valid("-", TextType::SInt));
        assert!(!is_valid("", TextType::UInt));
        assert!(is_valid("1600 800.5", TextType::UFloatSpaced));
        assert!(is_valid("", TextType::Text));
    }

    #[test]
    fn test_word_jumps() {
        let s = "one  two three";
        assert_eq!(word_start(s, s.len()), 9);
        assert_eq!(word_start(s, 9), 5);
        assert_eq!(word_start(s, 5), 0);
        assert_eq!(word_end(s, 0), 3);
        assert_eq!(word_end(s, 3), 8);
        assert_eq!(word_end(s, 9), s.len());
    }

    #[test]
    fn test_editing_keys() {
        let mut clip = MemoryClipboard::default();
        let mut ed = TextEdit::new("hello world", TextType::Text);
        assert_eq!(ed.on_key(&alt(KeyCode::Backspace), &mut clip), EditOutcome::Edited);
        assert_eq!(ed.text(), "hello ");
        ed.on_key(&ctrl(KeyCode::Left), &mut clip);
        assert_eq!(ed.caret(), 0);
        ed.on_key(&key(KeyCode::Delete), &mut clip);
        assert_eq!(ed.text(), "ello ");
        ed.on_key(&key(KeyCode::End), &mut clip);
        ed.insert("wörld");
        assert_eq!(ed.text(), "ello wörld");
        ed.on_key(&key(KeyCode::Left), &mut clip);
        ed.on_key(&key(KeyCode::Left), &mut clip);
        ed.on_key(&key(KeyCode::Left), &mut clip);
        assert_eq!(&ed.text()[ed.caret()..], "rld");
        ed.on_key(&key(KeyCode::Backspace), &mut clip);
        assert_eq!(ed.text(), "ello wrld");
    }

    #[test]
    fn test_clipboard_and_undo() {
        let mut clip = MemoryClipboard::default();
        let mut ed = TextEdit::new("abc", TextType::Text);
        ed.on_key(&ctrl(KeyCode::X), &mut clip);
        assert_eq!(ed.text(), "");
        ed.on_key(&ctrl(KeyCode::V), &mut clip);
        ed.on_key(&ctrl(KeyCode::V), &mut clip);
        assert_eq!(ed.text(), "abcabc");
        ed.on_key(&ctrl(KeyCode::Z), &mut clip);
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn test_paste_is_cleaned() {
        let mut clip = MemoryClipboard(Some("4x2".into()));
        let mut ed = TextEdit::new("1", TextType::UInt);
        ed.on_key(&ctrl(KeyCode::V), &mut clip);
        assert_eq!(ed.text(), "142");
        assert_eq!(ed.caret(), 3);
    }

    #[test]
    fn test_confirm_and_cancel() {
        let mut ed = TextEdit::new("10", TextType::SInt);
        ed.begin();
        ed.on_key(&ctrl(KeyCode::Backspace), &mut MemoryClipboard::default());
        ed.insert("-");
        assert!(!ed.confirm());
        assert_eq!(ed.text(), "10");

        ed.insert("5");
        assert!(ed.confirm());
        assert_eq!(ed.text(), "105");

        ed.insert("7");
        ed.cancel();
        assert_eq!(ed.text(), "105");
        assert_eq!(
            ed.on_key(&key(KeyCode::Return), &mut MemoryClipboard::default()),
            EditOutcome::Confirm
        );
    }
}
