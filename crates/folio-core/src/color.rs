#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const TRANSPARENT: Color = Color(0, 0, 0, 0);
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(r, g, b, 255)
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(r, g, b, a)
    }

    /// Parses `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        match s.len() {
            6 => Some(Color(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Color(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }

    /// Packs into softbuffer's `0RGB` layout.
    pub fn to_xrgb(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    /// Blends `self` over `dst` (an `0RGB` pixel) with an extra coverage factor.
    pub fn blend_over(self, dst: u32, coverage: u8) -> u32 {
        let a = self.3 as u32 * coverage as u32 / 255;
        if a == 0 {
            return dst;
        }
        let mix = |s: u8, d: u32| (s as u32 * a + d * (255 - a)) / 255;
        let r = mix(self.0, (dst >> 16) & 0xFF);
        let g = mix(self.1, (dst >> 8) & 0xFF);
        let b = mix(self.2, dst & 0xFF);
        (r << 16) | (g << 8) | b
    }
}

/// Named slots of a theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeColor {
    Background,
    Normal,
    Dark,
    Light,
    Select,
    Text,
    Texture,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 7] = [
        ThemeColor::Background,
        ThemeColor::Normal,
        ThemeColor::Dark,
        ThemeColor::Light,
        ThemeColor::Select,
        ThemeColor::Text,
        ThemeColor::Texture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ThemeColor::Background => "background",
            ThemeColor::Normal => "normal",
            ThemeColor::Dark => "dark",
            ThemeColor::Light => "light",
            ThemeColor::Select => "select",
            ThemeColor::Text => "text",
            ThemeColor::Texture => "texture",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette(pub [Color; 7]);

impl Default for Palette {
    fn default() -> Self {
        Palette([
            Color::from_rgb(10, 10, 10),
            Color::from_rgb(90, 90, 90),
            Color::from_rgb(60, 60, 60),
            Color::from_rgb(120, 120, 120),
            Color::from_rgb(105, 105, 105),
            Color::from_rgb(210, 210, 210),
            Color::from_rgb(250, 250, 250),
        ])
    }
}

impl Palette {
    pub fn get(&self, c: ThemeColor) -> Color {
        self.0[c as usize]
    }

    pub fn set(&mut self, c: ThemeColor, v: Color) {
        self.0[c as usize] = v;
    }
}

/// Dimming layer drawn between the main layout and a popup.
pub const POPUP_DIM: Color = Color(0, 0, 0, 127);
