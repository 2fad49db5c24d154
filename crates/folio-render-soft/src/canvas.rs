//! CPU pixel buffer the draw list is rasterized into.

use std::collections::HashMap;
use std::path::Path;

use folio_core::{Color, DrawCmd, DrawList, DrawSys, Error, Fill, IVec2, Palette, Rect, Texture, ThemeColor};
use image::RgbaImage;

use crate::text::{FontFace, Mask};

enum Image {
    Rgba(RgbaImage),
    /// Tinted when drawn.
    Mask(Mask),
}

impl Image {
    fn size(&self) -> IVec2 {
        match self {
            Image::Rgba(img) => IVec2::new(img.width() as i32, img.height() as i32),
            Image::Mask(m) => m.size,
        }
    }
}

/// Window-sized `0RGB` buffer plus the textures drawn into it.
pub struct Canvas {
    size: IVec2,
    pixels: Vec<u32>,
    textures: HashMap<Texture, Image>,
    next: u32,
    font: Option<FontFace>,
    pub palette: Palette,
}

impl Canvas {
    pub fn new(size: IVec2, font: Option<FontFace>, palette: Palette) -> Self {
        let mut c = Self {
            size: IVec2::ZERO,
            pixels: Vec::new(),
            textures: HashMap::new(),
            next: 1,
            font,
            palette,
        };
        c.resize(size);
        c
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn resize(&mut self, size: IVec2) {
        let size = IVec2::new(size.x.max(0), size.y.max(0));
        self.size = size;
        self.pixels.resize((size.x * size.y) as usize, 0);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Swaps the text font. Existing text textures keep the old glyphs until
    /// their widgets render again.
    pub fn set_font(&mut self, font: Option<FontFace>) {
        self.font = font;
    }

    pub fn add_image(&mut self, img: RgbaImage) -> Texture {
        self.insert(Image::Rgba(img))
    }

    fn insert(&mut self, img: Image) -> Texture {
        let tex = Texture(self.next);
        self.next += 1;
        self.textures.insert(tex, img);
        tex
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Clears to the theme background and executes `list` in order.
    pub fn render(&mut self, list: &DrawList) {
        let bg = self.palette.get(ThemeColor::Background).to_xrgb();
        self.pixels.fill(bg);
        for cmd in &list.cmds {
            match cmd {
                DrawCmd::Rect { rect, frame, fill } => {
                    let color = match *fill {
                        Fill::Theme(c) => self.palette.get(c),
                        Fill::Raw(c) => c,
                    };
                    self.fill(*rect, *frame, color);
                }
                DrawCmd::Texture {
                    tex,
                    rect,
                    frame,
                    tint,
                } => {
                    let tint = tint.map(|t| self.palette.get(t));
                    self.blit(*tex, *rect, *frame, tint);
                }
            }
        }
    }

    fn clip(&self, rect: Rect, frame: Rect) -> Rect {
        rect.intersect(&frame)
            .intersect(&Rect::from_parts(IVec2::ZERO, self.size))
    }

    fn fill(&mut self, rect: Rect, frame: Rect, color: Color) {
        let r = self.clip(rect, frame);
        if r.is_empty() || color.3 == 0 {
            return;
        }
        let stride = self.size.x as usize;
        for y in r.y..r.end().y {
            let row = y as usize * stride;
            let span = &mut self.pixels[row + r.x as usize..row + r.end().x as usize];
            if color.3 == 255 {
                span.fill(color.to_xrgb());
            } else {
                for px in span {
                    *px = color.blend_over(*px, 255);
                }
            }
        }
    }

    /// Scales `tex` onto `rect`, drawing only the part inside `frame`. Source
    /// texels are mapped through the full rect so a cropped picture keeps its
    /// proportions.
    fn blit(&mut self, tex: Texture, rect: Rect, frame: Rect, tint: Option<Color>) {
        let Some(img) = self.textures.get(&tex) else {
            return;
        };
        let r = self.clip(rect, frame);
        let src = img.size();
        if r.is_empty() || rect.w <= 0 || rect.h <= 0 || src.has_zero() {
            return;
        }
        let stride = self.size.x as usize;
        let sample = |d: i32, start: i32, len: i32, src_len: i32| {
            ((d - start) as i64 * src_len as i64 / len as i64).clamp(0, src_len as i64 - 1) as u32
        };
        for y in r.y..r.end().y {
            let sy = sample(y, rect.y, rect.h, src.y);
            let row = y as usize * stride;
            for x in r.x..r.end().x {
                let sx = sample(x, rect.x, rect.w, src.x);
                let dst = &mut self.pixels[row + x as usize];
                *dst = match img {
                    Image::Rgba(img) => {
                        let p = img.get_pixel(sx, sy).0;
                        Color(p[0], p[1], p[2], p[3]).blend_over(*dst, 255)
                    }
                    Image::Mask(m) => {
                        let a = m.alpha[(sy * m.size.x as u32 + sx) as usize];
                        tint.unwrap_or(Color::WHITE).blend_over(*dst, a)
                    }
                };
            }
        }
    }
}

impl DrawSys for Canvas {
    fn measure_text(&self, text: &str, height: i32) -> i32 {
        match &self.font {
            Some(f) => f.measure(text, height),
            None => text.chars().count() as i32 * height / 2,
        }
    }

    fn render_text(&mut self, text: &str, height: i32) -> Option<Texture> {
        let mask = self.font.as_ref()?.rasterize(text, height)?;
        Some(self.insert(Image::Mask(mask)))
    }

    fn texture_size(&self, tex: Texture) -> Option<IVec2> {
        self.textures.get(&tex).map(Image::size)
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture, Error> {
        let img = image::open(path).map_err(|e| Error::Texture {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(self.add_image(img.to_rgba8()))
    }

    fn free_texture(&mut self, tex: Texture) {
        self.textures.remove(&tex);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn canvas(w: i32, h: i32) -> Canvas {
        Canvas::new(IVec2::new(w, h), None, Palette::default())
    }

    fn px(c: &Canvas, x: i32, y: i32) -> u32 {
        c.pixels()[(y * c.size().x + x) as usize]
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut c = canvas(8, 8);
        let mut list = DrawList::new();
        list.rect(Rect::new(-4, -4, 8, 8), Rect::new(0, 0, 3, 8), Color::WHITE);
        c.render(&list);
        let bg = Palette::default().get(ThemeColor::Background).to_xrgb();
        assert_eq!(px(&c, 2, 3), 0xFFFFFF);
        assert_eq!(px(&c, 3, 3), bg);
        assert_eq!(px(&c, 2, 4), bg);
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut c = canvas(2, 2);
        c.palette.set(ThemeColor::Background, Color::WHITE);
        let mut list = DrawList::new();
        list.rect(Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2), Color(0, 0, 0, 127));
        c.render(&list);
        assert_eq!(px(&c, 0, 0), 0x808080);
    }

    #[test]
    fn test_cropped_blit_keeps_mapping() {
        let mut c = canvas(4, 4);
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 255, 255]));
        let tex = c.add_image(img);
        let mut list = DrawList::new();
        // 2x2 picture scaled to 4x4 with its left half cut off
        list.texture(Some(tex), Rect::new(0, 0, 4, 4), Rect::new(2, 0, 2, 4), None);
        c.render(&list);
        assert_eq!(px(&c, 2, 0), 0xFF0000);
        assert_eq!(px(&c, 3, 3), 0x0000FF);
        assert_ne!(px(&c, 1, 3), 0x0000FF);
    }

    #[test]
    fn test_freed_texture_draws_nothing() {
        let mut c = canvas(2, 2);
        let tex = c.add_image(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));
        c.free_texture(tex);
        assert_eq!(c.texture_size(tex), None);
        let mut list = DrawList::new();
        list.texture(Some(tex), Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2), None);
        c.render(&list);
        assert_ne!(px(&c, 0, 0), 0xFFFFFF);
        assert_eq!(c.texture_count(), 0);
    }

    #[test]
    fn test_load_missing_picture_fails() {
        let mut c = canvas(2, 2);
        let err = c.load_texture(Path::new("/nonexistent/folio/page.png"));
        assert!(matches!(err, Err(Error::Texture { .. })));
    }

    #[test]
    fn test_text_without_font() {
        let mut c = canvas(2, 2);
        assert_eq!(c.measure_text("abcd", 10), 20);
        assert_eq!(c.render_text("abcd", 10), None);
    }
}
