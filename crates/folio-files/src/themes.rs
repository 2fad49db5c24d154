use folio_core::{Color, Palette, ThemeColor};

use crate::ini::{self, IniLine};
use crate::settings::DEFAULT_THEME;

/// Copied into a fresh settings directory on first run.
pub const BUNDLED_THEMES: &str = "\
[default]
background=#0A0A0A
normal=#5A5A5A
dark=#3C3C3C
light=#787878
select=#696969
text=#D2D2D2
texture=#FAFAFA
[light]
background=#D8D8D8
normal=#B0B0B0
dark=#989898
light=#F0F0F0
select=#C4C4C4
text=#101010
texture=#202020
[blue]
background=10 14 24
normal=46 64 104
dark=30 40 68
light=74 102 160
select=60 84 132
text=220 228 240
texture=250 250 255
";

/// Section titles in file order, or `["default"]` when there are none.
pub fn available(text: &str) -> Vec<String> {
    let themes: Vec<String> = ini::lines(text)
        .filter_map(|l| match IniLine::parse(l) {
            IniLine::Title(t) => Some(t),
            _ => None,
        })
        .collect();
    if themes.is_empty() {
        vec![DEFAULT_THEME.to_owned()]
    } else {
        themes
    }
}

/// Palette of the section titled `theme`; colors it doesn't set keep their
/// defaults, and an unknown theme yields the default palette.
pub fn palette(text: &str, theme: &str) -> Palette {
    let mut pal = Palette::default();
    let mut lines = ini::lines(text).map(IniLine::parse);
    if !lines.any(|l| matches!(&l, IniLine::Title(t) if t == theme)) {
        return pal;
    }
    for line in lines {
        match line {
            IniLine::Title(_) => break,
            IniLine::Prop { prp, val } => match (ThemeColor::from_name(&prp), parse_color(&val)) {
                (Some(slot), Some(c)) => pal.set(slot, c),
                _ => log::warn!("themes: ignoring '{prp}={val}' in [{theme}]"),
            },
            _ => {}
        }
    }
    pal
}

/// `#rrggbb[aa]` or up to four decimal channels (`r g b a`, alpha defaults
/// to opaque).
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') {
        return Color::from_hex(s);
    }
    let mut ch = [0u8, 0, 0, 255];
    let mut n = 0;
    for (slot, word) in ch.iter_mut().zip(s.split_whitespace()) {
        *slot = word.parse().ok()?;
        n += 1;
    }
    (n > 0 && s.split_whitespace().count() <= 4).then(|| Color(ch[0], ch[1], ch[2], ch[3]))
}
