use std::collections::HashSet;
use std::sync::Arc;

use folio_core::{Clipboard, IVec2, KeyCode, Modifiers, Sink};
use folio_files::Bindings;
use folio_render_soft::{Canvas, WindowSurface};
use folio_ui::Cx;
use winit::dpi::PhysicalPosition;
use winit::event_loop::EventLoopProxy;
use winit::window::{Fullscreen, Window};

/// Posts messages into the event loop from any thread.
pub struct Proxy<M: 'static>(EventLoopProxy<M>);

impl<M: 'static> Clone for Proxy<M> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<M: 'static> Proxy<M> {
    pub(crate) fn new(proxy: EventLoopProxy<M>) -> Self {
        Self(proxy)
    }
}

impl<M: Send + 'static> Sink<M> for Proxy<M> {
    fn post(&self, msg: M) -> bool {
        self.0.send_event(msg).is_ok()
    }
}

/// System clipboard, or a private one when the system's can't be opened.
pub struct SystemClipboard {
    system: Option<arboard::Clipboard>,
    local: Option<String>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let system = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                log::warn!("system clipboard unavailable: {e}");
                None
            }
        };
        Self { system, local: None }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match &mut self.system {
            Some(cb) => cb.get_text().ok(),
            None => self.local.clone(),
        }
    }

    fn set_text(&mut self, text: &str) {
        match &mut self.system {
            Some(cb) => {
                if let Err(e) = cb.set_text(text) {
                    log::warn!("failed to set clipboard text: {e}");
                }
            }
            None => self.local = Some(text.to_owned()),
        }
    }
}

/// The window and the input state the runner tracks for it.
pub struct WindowState {
    window: Arc<Window>,
    pub(crate) held: HashSet<KeyCode>,
    pub(crate) modifiers: Modifiers,
    pub(crate) cursor: IVec2,
    pub(crate) exit: bool,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            held: HashSet::new(),
            modifiers: Modifiers::NONE,
            cursor: IVec2::ZERO,
            exit: false,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn size(&self) -> IVec2 {
        let s = self.window.inner_size();
        IVec2::new(s.width as i32, s.height as i32)
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn cursor(&self) -> IVec2 {
        self.cursor
    }

    pub fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    pub fn set_fullscreen(&self, on: bool) {
        log::debug!("fullscreen {on}");
        self.window
            .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
    }

    pub fn is_maximized(&self) -> bool {
        self.window.is_maximized()
    }

    pub fn minimize(&self) {
        self.window.set_minimized(true);
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Warps the mouse cursor by `d` pixels, keeping it inside the window.
    pub fn move_cursor(&mut self, d: IVec2) {
        if d == IVec2::ZERO {
            return;
        }
        let size = self.size();
        let pos = self.cursor + d;
        let pos = IVec2::new(pos.x.clamp(0, (size.x - 1).max(0)), pos.y.clamp(0, (size.y - 1).max(0)));
        match self
            .window
            .set_cursor_position(PhysicalPosition::new(pos.x, pos.y))
        {
            Ok(()) => self.cursor = pos,
            Err(e) => log::warn!("can't move the cursor: {e}"),
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Ends the event loop once the current event is handled.
    pub fn exit(&mut self) {
        self.exit = true;
    }
}

/// What the program can reach of the platform while handling an event. The
/// fields are public so their borrows can be split.
pub struct Env<M: 'static> {
    pub canvas: Canvas,
    pub clipboard: SystemClipboard,
    pub window: WindowState,
    surface: WindowSurface,
    proxy: Proxy<M>,
}

impl<M: 'static> Env<M> {
    pub(crate) fn new(canvas: Canvas, surface: WindowSurface, proxy: Proxy<M>) -> Self {
        Self {
            canvas,
            clipboard: SystemClipboard::new(),
            window: WindowState::new(surface.window().clone()),
            surface,
            proxy,
        }
    }

    /// Scene services over this window's canvas and clipboard.
    pub fn cx<'a>(&'a mut self, bindings: &'a mut Bindings) -> Cx<'a> {
        Cx {
            ds: &mut self.canvas,
            bindings,
            clipboard: &mut self.clipboard,
        }
    }

    pub fn size(&self) -> IVec2 {
        self.canvas.size()
    }

    pub fn proxy(&self) -> Proxy<M> {
        self.proxy.clone()
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub(crate) fn present(&mut self) {
        if let Err(e) = self.surface.present(&self.canvas) {
            log::warn!("{e}");
        }
    }
}
