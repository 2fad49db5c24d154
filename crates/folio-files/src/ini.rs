//! Line codec shared by `settings.ini`, `bindings.ini` and `themes.ini`.
//!
//! A line is one of `prp=val`, `prp[key]=val` or `[Title]`. The first `=`
//! splits the property from the value, a `[key]` only counts when its `]`
//! comes before that `=`, property and key are trimmed, and the value is kept
//! verbatim.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IniLine {
    Empty,
    Prop { prp: String, val: String },
    Keyed { prp: String, key: String, val: String },
    Title(String),
}

impl IniLine {
    pub fn parse(line: &str) -> IniLine {
        let Some(eq) = line.find('=') else {
            let t = line.trim();
            return match t.strip_prefix('[').and_then(|s| s.find(']').map(|e| &s[..e])) {
                Some(title) => IniLine::Title(title.trim().to_owned()),
                None => IniLine::Empty,
            };
        };

        let head = &line[..eq];
        let val = line[eq + 1..].to_owned();
        if let Some(open) = head.find('[')
            && let Some(close) = head[open..].find(']')
        {
            return IniLine::Keyed {
                prp: head[..open].trim().to_owned(),
                key: head[open + 1..open + close].trim().to_owned(),
                val,
            };
        }
        IniLine::Prop {
            prp: head.trim().to_owned(),
            val,
        }
    }

    pub fn prop(prp: impl Into<String>, val: impl Into<String>) -> Self {
        IniLine::Prop {
            prp: prp.into(),
            val: val.into(),
        }
    }

    pub fn keyed(prp: impl Into<String>, key: impl Into<String>, val: impl Into<String>) -> Self {
        IniLine::Keyed {
            prp: prp.into(),
            key: key.into(),
            val: val.into(),
        }
    }

    /// Appends the line and its terminating `\n` to `out`.
    pub fn write_to(&self, out: &mut String) {
        use fmt::Write;
        if !matches!(self, IniLine::Empty) {
            let _ = writeln!(out, "{self}");
        }
    }
}

impl fmt::Display for IniLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IniLine::Empty => Ok(()),
            IniLine::Prop { prp, val } => write!(f, "{prp}={val}"),
            IniLine::Keyed { prp, key, val } => write!(f, "{prp}[{key}]={val}"),
            IniLine::Title(t) => write!(f, "[{t}]"),
        }
    }
}

/// Non-empty lines of a file split on `\n` and `\r`.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', '\r']).filter(|l| !l.is_empty())
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        v if v.eq_ignore_ascii_case("true") || v == "1" => Some(true),
        v if v.eq_ignore_ascii_case("false") || v == "0" => Some(false),
        _ => None,
    }
}

/// Parses whitespace separated numbers, requiring exactly `N` of them.
pub fn parse_vec<T: std::str::FromStr + Copy + Default, const N: usize>(s: &str) -> Option<[T; N]> {
    let mut out = [T::default(); N];
    let mut words = s.split_whitespace();
    for slot in &mut out {
        *slot = words.next()?.parse().ok()?;
    }
    words.next().is_none().then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(IniLine::parse("zoom=1.5"), IniLine::prop("zoom", "1.5"));
        assert_eq!(
            IniLine::parse(" scrollUp [ key ] = K_W "),
            IniLine::keyed("scrollUp", "key", " K_W ")
        );
        assert_eq!(IniLine::parse("  [Dark Blue]  "), IniLine::Title("Dark Blue".into()));
        assert_eq!(IniLine::parse("just words"), IniLine::Empty);
        assert_eq!(IniLine::parse(""), IniLine::Empty);
    }

    #[test]
    fn test_first_equals_splits() {
        assert_eq!(IniLine::parse("a=b=c"), IniLine::prop("a", "b=c"));
        // brackets after the first '=' belong to the value
        assert_eq!(IniLine::parse("a=[x]=y"), IniLine::prop("a", "[x]=y"));
        assert_eq!(IniLine::parse("nextDir=K_="), IniLine::prop("nextDir", "K_="));
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            IniLine::prop("library", "/home/me/My Books"),
            IniLine::keyed("zoomIn", "joy", "B_3"),
            IniLine::prop("odd", "x=[1]"),
            IniLine::keyed("p", "k", "v=]["),
            IniLine::Title("default".into()),
        ];
        for line in cases {
            let mut out = String::new();
            line.write_to(&mut out);
            assert!(out.ends_with('\n'));
            assert_eq!(IniLine::parse(out.trim_end_matches('\n')), line);
        }
    }

    #[test]
    fn test_lines_skips_empty() {
        let v: Vec<&str> = lines("a=1\r\n\r\nb=2\n\n[t]").collect();
        assert_eq!(v, ["a=1", "b=2", "[t]"]);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("no"), None);
        assert_eq!(parse_vec::<i32, 2>("800 600"), Some([800, 600]));
        assert_eq!(parse_vec::<i32, 2>("800"), None);
        assert_eq!(parse_vec::<f32, 2>("1 2 3"), None);
    }
}
