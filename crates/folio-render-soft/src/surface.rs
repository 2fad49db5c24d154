use std::num::NonZeroU32;
use std::sync::Arc;

use folio_core::Error;
use winit::window::Window;

use crate::Canvas;

/// Presents a [`Canvas`] in a window through softbuffer.
pub struct WindowSurface {
    window: Arc<Window>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
}

fn surface_err(e: softbuffer::SoftBufferError) -> Error {
    Error::Surface(e.to_string())
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let context = softbuffer::Context::new(window.clone()).map_err(surface_err)?;
        let surface = softbuffer::Surface::new(&context, window.clone()).map_err(surface_err)?;
        Ok(Self { window, surface })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Copies the canvas to the window. Nothing happens while the canvas has
    /// no area, e.g. when minimized.
    pub fn present(&mut self, canvas: &Canvas) -> Result<(), Error> {
        let size = canvas.size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.x as u32), NonZeroU32::new(size.y as u32)) else {
            return Ok(());
        };
        self.surface.resize(w, h).map_err(surface_err)?;
        let mut buffer = self.surface.buffer_mut().map_err(surface_err)?;
        if buffer.len() != canvas.pixels().len() {
            log::warn!("surface buffer size mismatch; skipping frame");
            return Ok(());
        }
        buffer.copy_from_slice(canvas.pixels());
        self.window.pre_present_notify();
        buffer.present().map_err(surface_err)
    }
}
