//! # Folio core
//!
//! Shared vocabulary for the reader's crates:
//!
//! - [`geometry`]: integer [`IVec2`] and [`Rect`] with crop/intersect.
//! - [`color`]: [`Color`], the named [`ThemeColor`] slots and a [`Palette`].
//! - [`input`]: keys, mouse buttons, joystick hats and gamepad controls, all
//!   carrying the names used by `bindings.ini`.
//! - [`render_api`]: the [`DrawSys`] services the UI consumes and the
//!   [`DrawList`] it produces for a backend to present.
//! - [`task`]: a background [`Worker`] that talks to the UI thread only through
//!   messages and a cancel flag.
//!
//! ```rust
//! use folio_core::*;
//!
//! let view = Rect::new(0, 0, 100, 100);
//! let page = Rect::new(80, -20, 40, 40);
//! let (clipped, crop) = page.crop(&view);
//! assert_eq!(clipped, Rect::new(80, 0, 20, 20));
//! assert_eq!((crop.top, crop.right), (20, 20));
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render_api;
pub mod task;

pub use color::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
pub use render_api::*;
pub use task::*;
