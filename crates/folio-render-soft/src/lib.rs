//! Software rendering backend.
//!
//! [`Canvas`] implements [`folio_core::DrawSys`] over a CPU pixel buffer:
//! pictures are decoded with `image`, text is rasterized with `ab_glyph`
//! from a face found through `fontdb`. [`WindowSurface`] hands the finished
//! buffer to the window via `softbuffer`.

mod canvas;
mod surface;
mod text;

pub use canvas::Canvas;
pub use surface::WindowSurface;
pub use text::{FontFace, Mask};
