use std::fmt;
use std::path::{Path, PathBuf};

use folio_core::IVec2;

use crate::ini::{self, IniLine};

pub const DEFAULT_FONT: &str = "sans-serif";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_RENDERER: &str = "software";
pub const MAX_DEADZONE: i32 = 32767;
pub const DEFAULT_DEADZONE: i32 = 256;

/// Order in which pages follow each other in the reader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadDirection {
    LeftToRight,
    RightToLeft,
    #[default]
    TopToBottom,
}

impl ReadDirection {
    pub const ALL: [ReadDirection; 3] = [
        ReadDirection::LeftToRight,
        ReadDirection::RightToLeft,
        ReadDirection::TopToBottom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReadDirection::LeftToRight => "right",
            ReadDirection::RightToLeft => "left",
            ReadDirection::TopToBottom => "down",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_vertical(self) -> bool {
        self == ReadDirection::TopToBottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LimitKind {
    None,
    #[default]
    Count,
    Size,
}

impl LimitKind {
    pub const ALL: [LimitKind; 3] = [LimitKind::None, LimitKind::Count, LimitKind::Size];

    pub fn name(self) -> &'static str {
        match self {
            LimitKind::None => "none",
            LimitKind::Count => "count",
            LimitKind::Size => "size",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// How many pictures the reader loads at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PictureLimit {
    pub kind: LimitKind,
    pub count: usize,
    /// Bytes of picture files.
    pub size: u64,
}

impl Default for PictureLimit {
    fn default() -> Self {
        Self {
            kind: LimitKind::Count,
            count: 128,
            size: 512 * MB,
        }
    }
}

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Formats a byte count with the largest unit that divides it exactly.
pub fn memory_string(bytes: u64) -> String {
    match bytes {
        0 => "0B".to_owned(),
        b if b % GB == 0 => format!("{}GB", b / GB),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => format!("{b}B"),
    }
}

/// Parses `123`, `123B`, `64KB`, `512MB` or `2GB` (case-insensitive).
pub fn parse_memory(s: &str) -> Option<u64> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let n: u64 = num.parse().ok()?;
    let mul = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => KB,
        "MB" | "M" => MB,
        "GB" | "G" => GB,
        _ => return None,
    };
    n.checked_mul(mul)
}

impl PictureLimit {
    /// Parses `type count size`; missing trailing fields keep their defaults.
    pub fn parse(s: &str) -> Option<Self> {
        let mut out = PictureLimit::default();
        let mut words = s.split_whitespace();
        out.kind = LimitKind::from_name(words.next()?)?;
        if let Some(w) = words.next() {
            out.count = w.parse().ok()?;
        }
        if let Some(w) = words.next() {
            out.size = parse_memory(w)?;
        }
        Some(out)
    }
}

impl fmt::Display for PictureLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind.name(), self.count, memory_string(self.size))
    }
}

/// Scalar settings persisted in `settings.ini`.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub maximized: bool,
    pub fullscreen: bool,
    pub resolution: IVec2,
    pub direction: ReadDirection,
    pub zoom: f32,
    pub spacing: i32,
    pub picture_limit: PictureLimit,
    pub font: String,
    pub theme: String,
    pub show_hidden: bool,
    pub library: PathBuf,
    pub renderer: String,
    /// Pixels per second for held scroll keys, per axis.
    pub scroll_speed: [f32; 2],
    deadzone: i32,
}

mod keys {
    pub const MAXIMIZED: &str = "maximized";
    pub const FULLSCREEN: &str = "fullscreen";
    pub const RESOLUTION: &str = "resolution";
    pub const DIRECTION: &str = "direction";
    pub const ZOOM: &str = "zoom";
    pub const SPACING: &str = "spacing";
    pub const PICTURE_LIMIT: &str = "picture_limit";
    pub const FONT: &str = "font";
    pub const THEME: &str = "theme";
    pub const SHOW_HIDDEN: &str = "show_hidden";
    pub const LIBRARY: &str = "library";
    pub const RENDERER: &str = "renderer";
    pub const SCROLL_SPEED: &str = "scroll_speed";
    pub const DEADZONE: &str = "deadzone";
}

impl Settings {
    /// Defaults for a settings directory; the library lives inside it.
    pub fn new(settings_dir: &Path) -> Self {
        Self {
            maximized: false,
            fullscreen: false,
            resolution: IVec2::new(800, 600),
            direction: ReadDirection::TopToBottom,
            zoom: 1.0,
            spacing: 10,
            picture_limit: PictureLimit::default(),
            font: DEFAULT_FONT.to_owned(),
            theme: DEFAULT_THEME.to_owned(),
            show_hidden: false,
            library: default_library(settings_dir),
            renderer: DEFAULT_RENDERER.to_owned(),
            scroll_speed: [1600.0, 1600.0],
            deadzone: DEFAULT_DEADZONE,
        }
    }

    pub fn deadzone(&self) -> i32 {
        self.deadzone
    }

    pub fn set_deadzone(&mut self, v: i32) {
        self.deadzone = v.clamp(0, MAX_DEADZONE);
    }

    /// Picks `name` if it is one of `available`, otherwise the first theme.
    pub fn set_theme(&mut self, name: &str, available: &[String]) {
        self.theme = available
            .iter()
            .find(|t| t.as_str() == name)
            .or_else(|| available.first())
            .cloned()
            .unwrap_or_else(|| DEFAULT_THEME.to_owned());
    }

    /// Sets the library directory, returning `false` (and keeping the old
    /// value) when `dir` isn't an existing directory.
    pub fn set_library(&mut self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        if dir.is_dir() {
            self.library = dir;
            true
        } else {
            false
        }
    }

    /// Applies every known `prp=val` line over the defaults.
    ///
    /// Unknown properties are skipped and bad values keep the default, so an
    /// older or hand-edited file always loads.
    pub fn parse(text: &str, settings_dir: &Path, themes: &[String]) -> Self {
        let mut sets = Settings::new(settings_dir);
        sets.set_theme(DEFAULT_THEME, themes);
        for line in ini::lines(text) {
            let IniLine::Prop { prp, val } = IniLine::parse(line) else {
                continue;
            };
            if !sets.apply(&prp, &val, themes) {
                log::warn!("settings: ignoring '{prp}={val}'");
            }
        }
        sets
    }

    fn apply(&mut self, prp: &str, val: &str, themes: &[String]) -> bool {
        fn set<T>(slot: &mut T, v: Option<T>) -> bool {
            v.map(|v| *slot = v).is_some()
        }

        match prp {
            keys::MAXIMIZED => set(&mut self.maximized, ini::parse_bool(val)),
            keys::FULLSCREEN => set(&mut self.fullscreen, ini::parse_bool(val)),
            keys::RESOLUTION => set(
                &mut self.resolution,
                ini::parse_vec::<i32, 2>(val)
                    .filter(|[w, h]| *w > 0 && *h > 0)
                    .map(|[w, h]| IVec2::new(w, h)),
            ),
            keys::DIRECTION => set(&mut self.direction, ReadDirection::from_name(val)),
            keys::ZOOM => set(
                &mut self.zoom,
                val.trim().parse::<f32>().ok().filter(|z| z.is_finite() && *z > 0.0),
            ),
            keys::SPACING => set(&mut self.spacing, val.trim().parse::<i32>().ok().filter(|s| *s >= 0)),
            keys::PICTURE_LIMIT => set(&mut self.picture_limit, PictureLimit::parse(val)),
            keys::FONT => {
                let font = val.trim();
                set(&mut self.font, (!font.is_empty()).then(|| font.to_owned()))
            }
            keys::THEME => {
                self.set_theme(val.trim(), themes);
                true
            }
            keys::SHOW_HIDDEN => set(&mut self.show_hidden, ini::parse_bool(val)),
            keys::LIBRARY => self.set_library(val),
            keys::RENDERER => set(&mut self.renderer, Some(val.trim().to_owned())),
            keys::SCROLL_SPEED => set(&mut self.scroll_speed, ini::parse_vec::<f32, 2>(val)),
            keys::DEADZONE => match val.trim().parse::<i32>() {
                Ok(v) => {
                    self.set_deadzone(v);
                    true
                }
                Err(_) => false,
            },
            // forward compatible: a newer key is not an error
            _ => true,
        }
    }

    /// Serializes every key in a fixed order.
    pub fn to_ini(&self) -> String {
        let bool_str = |b: bool| if b { "true" } else { "false" };
        let mut out = String::new();
        for line in [
            IniLine::prop(keys::MAXIMIZED, bool_str(self.maximized)),
            IniLine::prop(keys::FULLSCREEN, bool_str(self.fullscreen)),
            IniLine::prop(
                keys::RESOLUTION,
                format!("{} {}", self.resolution.x, self.resolution.y),
            ),
            IniLine::prop(keys::ZOOM, self.zoom.to_string()),
            IniLine::prop(keys::PICTURE_LIMIT, self.picture_limit.to_string()),
            IniLine::prop(keys::SPACING, self.spacing.to_string()),
            IniLine::prop(keys::DIRECTION, self.direction.name()),
            IniLine::prop(keys::FONT, self.font.as_str()),
            IniLine::prop(keys::THEME, self.theme.as_str()),
            IniLine::prop(keys::SHOW_HIDDEN, bool_str(self.show_hidden)),
            IniLine::prop(keys::LIBRARY, self.library.to_string_lossy()),
            IniLine::prop(keys::RENDERER, self.renderer.as_str()),
            IniLine::prop(
                keys::SCROLL_SPEED,
                format!("{} {}", self.scroll_speed[0], self.scroll_speed[1]),
            ),
            IniLine::prop(keys::DEADZONE, self.deadzone.to_string()),
        ] {
            line.write_to(&mut out);
        }
        out
    }
}

pub fn default_library(settings_dir: &Path) -> PathBuf {
    settings_dir.join("library")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> Vec<String> {
        vec!["default".into(), "light".into()]
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let dir = Path::new("/nonexistent/folio");
        let sets = Settings::parse("zoom=2\nunknown_future_key=42\n", dir, &themes());
        let mut expected = Settings::new(dir);
        expected.zoom = 2.0;
        assert_eq!(sets, expected);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let dir = Path::new("/nonexistent/folio");
        let text = "zoom=-1\nresolution=12\ndirection=sideways\ndeadzone=99999\nlibrary=/nope/nope\n";
        let sets = Settings::parse(text, dir, &themes());
        assert_eq!(sets.zoom, 1.0);
        assert_eq!(sets.resolution, IVec2::new(800, 600));
        assert_eq!(sets.direction, ReadDirection::TopToBottom);
        assert_eq!(sets.deadzone(), MAX_DEADZONE);
        assert_eq!(sets.library, default_library(dir));
    }

    #[test]
    fn test_theme_falls_back_to_first_available() {
        let dir = Path::new("/x");
        let sets = Settings::parse("theme=light", dir, &themes());
        assert_eq!(sets.theme, "light");
        let sets = Settings::parse("theme=neon", dir, &themes());
        assert_eq!(sets.theme, "default");
        let sets = Settings::parse("", dir, &["solar".to_owned()]);
        assert_eq!(sets.theme, "solar");
    }

    #[test]
    fn test_save_is_byte_stable() {
        let dir = Path::new("/x");
        let text = "fullscreen=1\nresolution=1280 720\nzoom=1.2\npicture_limit=size 10 1536KB\n\
                    direction=left\nscroll_speed=800.5 1200\ntheme=light\n";
        let first = Settings::parse(text, dir, &themes()).to_ini();
        let second = Settings::parse(&first, dir, &themes()).to_ini();
        assert_eq!(first, second);
        insta::assert_snapshot!(first, @r"
        maximized=false
        fullscreen=true
        resolution=1280 720
        zoom=1.2
        picture_limit=size 10 1536KB
        spacing=10
        direction=left
        font=sans-serif
        theme=light
        show_hidden=false
        library=/x/library
        renderer=software
        scroll_speed=800.5 1200
        deadzone=256
        ");
    }

    #[test]
    fn test_memory_strings() {
        assert_eq!(memory_string(512 * MB), "512MB");
        assert_eq!(memory_string(1536 * KB), "1536KB");
        assert_eq!(memory_string(3 * GB), "3GB");
        assert_eq!(memory_string(1000), "1000B");
        assert_eq!(parse_memory("2gb"), Some(2 * GB));
        assert_eq!(parse_memory("77"), Some(77));
        assert_eq!(parse_memory("1 TB"), None);
        assert_eq!(
            PictureLimit::parse("none"),
            Some(PictureLimit {
                kind: LimitKind::None,
                ..PictureLimit::default()
            })
        );
    }
}
