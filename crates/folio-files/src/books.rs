//! `books.dat`: the last page read in each book.
//!
//! One line per book: `"book" "directory" "file"`, every word quoted so names
//! may contain spaces. Inside quotes `"` and `\` are backslash escaped.

/// Wraps `s` in quotes, escaping `"` and `\`.
pub fn enclose(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Splits a line into words, honoring quotes and escapes. Unquoted words end
/// at whitespace.
pub fn unenclose(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(first) = chars.next() else {
            break;
        };
        let mut word = String::new();
        if first == '"' {
            while let Some(c) = chars.next() {
                match c {
                    '\\' => word.extend(chars.next()),
                    '"' => break,
                    c => word.push(c),
                }
            }
        } else {
            word.push(first);
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                word.push(c);
            }
        }
        words.push(word);
    }
    words
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastPage {
    pub dir: String,
    pub file: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bookmarks {
    lines: Vec<String>,
}

impl Bookmarks {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: crate::ini::lines(text).map(str::to_owned).collect(),
        }
    }

    fn find(&self, book: &str) -> Option<(usize, Vec<String>)> {
        self.lines.iter().enumerate().find_map(|(i, l)| {
            let words = unenclose(l);
            (words.len() >= 2 && words[0] == book).then_some((i, words))
        })
    }

    pub fn get(&self, book: &str) -> Option<LastPage> {
        self.find(book).map(|(_, mut words)| LastPage {
            file: if words.len() >= 3 { words.swap_remove(2) } else { String::new() },
            dir: words.swap_remove(1),
        })
    }

    /// Replaces the book's line or appends a new one.
    pub fn set(&mut self, book: &str, dir: &str, file: &str) {
        let line = format!("{} {} {}", enclose(book), enclose(dir), enclose(file));
        match self.find(book) {
            Some((i, _)) => self.lines[i] = line,
            None => self.lines.push(line),
        }
    }

    pub fn remove(&mut self, book: &str) -> bool {
        match self.find(book) {
            Some((i, _)) => {
                self.lines.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for l in &self.lines {
            out.push_str(l);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclose_unenclose() {
        let words = ["My Book", r#"say "hi""#, r"C:\comics", ""];
        let line: Vec<String> = words.iter().map(|w| enclose(w)).collect();
        assert_eq!(unenclose(&line.join(" ")), words);
        assert_eq!(unenclose("  plain  words "), ["plain", "words"]);
    }

    #[test]
    fn test_set_get_replace() {
        let mut b = Bookmarks::default();
        b.set("Saga", "Saga/vol 1", "001.png");
        b.set("Other", "Other", "");
        b.set("Saga", "Saga/vol 2", "010.png");
        assert_eq!(
            b.get("Saga"),
            Some(LastPage {
                dir: "Saga/vol 2".into(),
                file: "010.png".into()
            })
        );
        assert_eq!(b.get("Other").map(|p| p.file), Some(String::new()));
        assert_eq!(b.get("Missing"), None);

        let reloaded = Bookmarks::parse(&b.to_text());
        assert_eq!(reloaded, b);
        assert_eq!(b.to_text().lines().count(), 2);
        assert!(b.clone().remove("Other"));
    }
}
