//! What the program needs from the window it runs in, as traits so the
//! program can run headless.

use folio_core::{Clipboard, DrawSys, IVec2, KeyCode, Palette};
use folio_files::Bindings;
use folio_platform::{Env, WindowState};
use folio_render_soft::{Canvas, FontFace};
use folio_ui::Cx;

/// A [`DrawSys`] whose look can change at run time.
pub trait Backend: DrawSys {
    fn use_palette(&mut self, palette: Palette);
    /// Returns `false` when no usable face was found.
    fn use_font(&mut self, family: &str) -> bool;
}

/// Window operations.
pub trait Shell {
    fn is_held(&self, key: KeyCode) -> bool;
    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, on: bool);
    fn is_maximized(&self) -> bool;
    fn minimize(&mut self);
    /// Moves the mouse pointer by `d` pixels.
    fn move_cursor(&mut self, d: IVec2);
    fn exit(&mut self);
}

pub struct Host<'a> {
    pub ds: &'a mut dyn Backend,
    pub clipboard: &'a mut dyn Clipboard,
    pub shell: &'a mut dyn Shell,
}

impl<'a> Host<'a> {
    pub fn from_env<M: 'static>(env: &'a mut Env<M>) -> Self {
        Self {
            ds: &mut env.canvas,
            clipboard: &mut env.clipboard,
            shell: &mut env.window,
        }
    }
}

/// Scene services borrowed from `host`.
pub fn cx<'a>(bindings: &'a mut Bindings, host: &'a mut Host<'_>) -> Cx<'a> {
    Cx {
        ds: &mut *host.ds,
        bindings,
        clipboard: &mut *host.clipboard,
    }
}

impl Backend for Canvas {
    fn use_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    fn use_font(&mut self, family: &str) -> bool {
        match FontFace::load(family) {
            Ok(face) => {
                self.set_font(Some(face));
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}

impl Shell for WindowState {
    fn is_held(&self, key: KeyCode) -> bool {
        WindowState::is_held(self, key)
    }

    fn is_fullscreen(&self) -> bool {
        WindowState::is_fullscreen(self)
    }

    fn set_fullscreen(&mut self, on: bool) {
        WindowState::set_fullscreen(self, on);
    }

    fn is_maximized(&self) -> bool {
        WindowState::is_maximized(self)
    }

    fn minimize(&mut self) {
        WindowState::minimize(self);
    }

    fn move_cursor(&mut self, d: IVec2) {
        WindowState::move_cursor(self, d);
    }

    fn exit(&mut self) {
        WindowState::exit(self);
    }
}
