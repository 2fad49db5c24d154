use std::collections::HashMap;
use std::path::Path;

use crate::{Color, Error, IVec2, Rect, ThemeColor};

/// Opaque handle to a backend-owned texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Texture(pub u32);

/// Services the UI needs from a rendering backend.
///
/// Missing resources are reported as `None`/`Err` and never abort anything:
/// a widget without a texture just draws its background.
pub trait DrawSys {
    fn measure_text(&self, text: &str, height: i32) -> i32;
    fn render_text(&mut self, text: &str, height: i32) -> Option<Texture>;
    fn texture_size(&self, tex: Texture) -> Option<IVec2>;
    fn load_texture(&mut self, path: &Path) -> Result<Texture, Error>;
    fn free_texture(&mut self, tex: Texture);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    Theme(ThemeColor),
    Raw(Color),
}

impl From<ThemeColor> for Fill {
    fn from(c: ThemeColor) -> Self {
        Fill::Theme(c)
    }
}

impl From<Color> for Fill {
    fn from(c: Color) -> Self {
        Fill::Raw(c)
    }
}

/// One draw call. `frame` is the clip rect the backend must crop to.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        frame: Rect,
        fill: Fill,
    },
    Texture {
        tex: Texture,
        rect: Rect,
        frame: Rect,
        /// Alpha-mask textures (rendered text) are colored with this.
        tint: Option<ThemeColor>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn rect(&mut self, rect: Rect, frame: Rect, fill: impl Into<Fill>) {
        if rect.overlaps(&frame) {
            self.cmds.push(DrawCmd::Rect {
                rect,
                frame,
                fill: fill.into(),
            });
        }
    }

    pub fn texture(&mut self, tex: Option<Texture>, rect: Rect, frame: Rect, tint: Option<ThemeColor>) {
        if let Some(tex) = tex
            && rect.overlaps(&frame)
        {
            self.cmds.push(DrawCmd::Texture {
                tex,
                rect,
                frame,
                tint,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

pub trait Clipboard {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// Process-local clipboard for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard(pub Option<String>);

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.0.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.0 = Some(text.to_owned());
    }
}

/// A [`DrawSys`] without pixels.
///
/// Text is measured as half the line height per character and any existing
/// file "loads" as a texture of `picture_size`.
#[derive(Debug)]
pub struct Headless {
    pub picture_size: IVec2,
    textures: HashMap<Texture, IVec2>,
    next: u32,
}

impl Default for Headless {
    fn default() -> Self {
        Self {
            picture_size: IVec2::new(600, 900),
            textures: HashMap::new(),
            next: 1,
        }
    }
}

impl Headless {
    pub fn insert(&mut self, size: IVec2) -> Texture {
        let tex = Texture(self.next);
        self.next += 1;
        self.textures.insert(tex, size);
        tex
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }
}

impl DrawSys for Headless {
    fn measure_text(&self, text: &str, height: i32) -> i32 {
        text.chars().count() as i32 * height / 2
    }

    fn render_text(&mut self, text: &str, height: i32) -> Option<Texture> {
        if text.is_empty() || height <= 0 {
            return None;
        }
        let w = self.measure_text(text, height);
        Some(self.insert(IVec2::new(w, height)))
    }

    fn texture_size(&self, tex: Texture) -> Option<IVec2> {
        self.textures.get(&tex).copied()
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture, Error> {
        if !path.is_file() {
            return Err(Error::Texture {
                path: path.to_owned(),
                reason: "not a file".into(),
            });
        }
        Ok(self.insert(self.picture_size))
    }

    fn free_texture(&mut self, tex: Texture) {
        self.textures.remove(&tex);
    }
}
