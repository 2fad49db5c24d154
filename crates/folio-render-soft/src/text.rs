//! Font lookup and single-line text rasterization.

use ab_glyph::{Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont, point};
use fontdb::Database;
use folio_core::{Error, IVec2};

/// Share of the line height the glyphs' ascent-to-descent span takes.
const FONT_SCALE: f32 = 0.8;

/// An 8-bit coverage mask, one byte per pixel, row-major.
pub struct Mask {
    pub size: IVec2,
    pub alpha: Vec<u8>,
}

pub struct FontFace {
    font: FontArc,
}

impl FontFace {
    /// Finds `family` among the system fonts, or any sans-serif face when
    /// it is empty or missing.
    pub fn load(family: &str) -> Result<Self, Error> {
        let mut db = Database::new();
        db.load_system_fonts();

        let families = [fontdb::Family::Name(family), fontdb::Family::SansSerif];
        let families = if family.is_empty() {
            &families[1..]
        } else {
            &families[..]
        };
        let query = fontdb::Query {
            families,
            ..Default::default()
        };
        let id = db
            .query(&query)
            .ok_or_else(|| Error::Font(format!("no system font matches \"{family}\"")))?;
        let (source, index) = db
            .face_source(id)
            .ok_or_else(|| Error::Font("font face not found".into()))?;

        let bytes = match source {
            fontdb::Source::Binary(data) => {
                let bytes: &[u8] = data.as_ref().as_ref();
                bytes.to_vec()
            }
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                std::fs::read(&path).map_err(|e| Error::io(&path, e))?
            }
        };
        let font = FontVec::try_from_vec_and_index(bytes, index)
            .map_err(|e| Error::Font(e.to_string()))?;
        log::info!("using font face {:?}", db.face(id).map(|f| f.post_script_name.as_str()));
        Ok(Self {
            font: FontArc::new(font),
        })
    }

    fn scale(height: i32) -> PxScale {
        PxScale::from(height as f32 * FONT_SCALE)
    }

    /// Pixel width of `text` drawn on a line `height` pixels high.
    pub fn measure(&self, text: &str, height: i32) -> i32 {
        let scaled = self.font.as_scaled(Self::scale(height));
        let mut prev: Option<GlyphId> = None;
        let mut x = 0.0;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                x += scaled.kern(p, id);
            }
            x += scaled.h_advance(id);
            prev = Some(id);
        }
        x.ceil() as i32
    }

    /// Renders `text` vertically centered on a line `height` pixels high.
    pub fn rasterize(&self, text: &str, height: i32) -> Option<Mask> {
        let width = self.measure(text, height);
        if width <= 0 || height <= 0 {
            return None;
        }
        let scale = Self::scale(height);
        let scaled = self.font.as_scaled(scale);
        let baseline = (height as f32 - scaled.height()) / 2.0 + scaled.ascent();

        let size = IVec2::new(width, height);
        let mut alpha = vec![0u8; (width * height) as usize];
        let mut prev: Option<GlyphId> = None;
        let mut x = 0.0;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                x += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(x, baseline));
            if let Some(outline) = scaled.outline_glyph(glyph) {
                let bb = outline.px_bounds();
                let (ox, oy) = (bb.min.x as i32, bb.min.y as i32);
                outline.draw(|gx, gy, cov| {
                    let (px, py) = (ox + gx as i32, oy + gy as i32);
                    if px >= 0 && py >= 0 && px < width && py < height {
                        let a = &mut alpha[(py * width + px) as usize];
                        *a = (*a).max((cov * 255.0) as u8);
                    }
                });
            }
            x += scaled.h_advance(id);
            prev = Some(id);
        }
        Some(Mask { size, alpha })
    }
}
