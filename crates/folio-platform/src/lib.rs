//! Desktop runner: a winit event loop feeding translated input to an
//! [`App`] and presenting what it draws through the software canvas.
//!
//! The runner owns nothing of the program's state. It counts clicks, tracks
//! held keys for continuous actions, measures frame time and hands worker
//! messages posted through a [`Proxy`] back to the app on the UI thread.

mod clicks;
mod env;
mod keys;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use folio_core::{DrawList, Error, IVec2, KeyEvent, MouseButton, Palette};
use folio_render_soft::{Canvas, WindowSurface};
use web_time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Ime, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

pub use clicks::{ClickCounter, DOUBLE_CLICK_TIME, WheelAccum};
pub use env::{Env, Proxy, SystemClipboard, WindowState};
pub use keys::{key_code, modifiers, mouse_button, typed_text};

/// Time between frames while nothing else wakes the loop.
pub const FRAME_TIME: Duration = Duration::from_millis(16);

/// Input after translation, in window pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    MouseDown { button: MouseButton, pos: IVec2 },
    /// `clicks` counts this press and the quick ones before it.
    MouseUp { button: MouseButton, pos: IVec2, clicks: u32 },
    MouseMove { pos: IVec2, delta: IVec2 },
    /// Whole notches, positive `y` away from the user.
    Wheel(IVec2),
    Key(KeyEvent),
    Text(String),
    Dropped(PathBuf),
    Resized(IVec2),
}

/// The program driven by [`run`].
pub trait App {
    type Msg: Send + 'static;

    /// Called once the window and its canvas exist.
    fn start(&mut self, env: &mut Env<Self::Msg>);
    fn input(&mut self, input: Input, env: &mut Env<Self::Msg>);
    /// A message posted through [`Env::proxy`].
    fn message(&mut self, msg: Self::Msg, env: &mut Env<Self::Msg>);
    /// Once per frame; `dt` is in seconds.
    fn tick(&mut self, dt: f32, env: &mut Env<Self::Msg>);
    fn draw(&mut self, env: &mut Env<Self::Msg>, out: &mut DrawList);
    /// The window is about to close.
    fn close(&mut self, env: &mut Env<Self::Msg>);
}

#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub size: IVec2,
    pub maximized: bool,
    pub fullscreen: bool,
}

struct Runner<A: App> {
    app: A,
    config: WindowConfig,
    proxy: Proxy<A::Msg>,
    env: Option<Env<A::Msg>>,
    clicks: ClickCounter,
    wheel: WheelAccum,
    list: DrawList,
    last_tick: Instant,
    closed: bool,
    error: Option<anyhow::Error>,
}

impl<A: App> Runner<A> {
    fn create_env(&self, el: &ActiveEventLoop) -> anyhow::Result<Env<A::Msg>> {
        let size = self.config.size;
        let mut attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(size.x.max(1) as u32, size.y.max(1) as u32))
            .with_maximized(self.config.maximized);
        if self.config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window: Arc<Window> = el
            .create_window(attrs)
            .map(Arc::new)
            .map_err(|e| Error::Window(e.to_string()))?;
        let inner = window.inner_size();
        log::info!("window created at {}x{}", inner.width, inner.height);
        let surface = WindowSurface::new(window).context("while preparing the window for drawing")?;
        let canvas = Canvas::new(
            IVec2::new(inner.width as i32, inner.height as i32),
            None,
            Palette::default(),
        );
        Ok(Env::new(canvas, surface, self.proxy.clone()))
    }

    fn finish(&mut self, el: &ActiveEventLoop) {
        if !self.closed {
            self.closed = true;
            if let Some(env) = &mut self.env {
                self.app.close(env);
            }
        }
        el.exit();
    }

    fn check_exit(&mut self, el: &ActiveEventLoop) {
        if self.env.as_ref().is_some_and(|e| e.window.exit) {
            self.finish(el);
        }
    }
}

impl<A: App> ApplicationHandler<A::Msg> for Runner<A> {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        if self.env.is_some() {
            return;
        }
        match self.create_env(el) {
            Ok(mut env) => {
                self.app.start(&mut env);
                env.request_redraw();
                self.env = Some(env);
                self.last_tick = Instant::now();
            }
            Err(e) => {
                log::error!("{e:#}");
                self.error = Some(e);
                el.exit();
            }
        }
    }

    fn window_event(&mut self, el: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(env) = self.env.as_mut() else {
            return;
        };
        let input = match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.finish(el);
                return;
            }
            WindowEvent::Resized(size) => {
                let size = IVec2::new(size.width as i32, size.height as i32);
                env.canvas.resize(size);
                env.request_redraw();
                Some(Input::Resized(size))
            }
            WindowEvent::Focused(false) => {
                env.window.held.clear();
                None
            }
            WindowEvent::ModifiersChanged(m) => {
                env.window.modifiers = keys::modifiers(m.state());
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = IVec2::new(position.x as i32, position.y as i32);
                let delta = pos - env.window.cursor;
                env.window.cursor = pos;
                (delta != IVec2::ZERO).then_some(Input::MouseMove { pos, delta })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                keys::mouse_button(button).map(|button| {
                    let pos = env.window.cursor;
                    match state {
                        ElementState::Pressed => {
                            self.clicks.press(button, pos, Instant::now());
                            Input::MouseDown { button, pos }
                        }
                        ElementState::Released => Input::MouseUp {
                            button,
                            pos,
                            clicks: self.clicks.count(button),
                        },
                    }
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(x, y) => self.wheel.lines(x, y),
                    MouseScrollDelta::PixelDelta(p) => self.wheel.pixels(p.x, p.y),
                };
                (notches != IVec2::ZERO).then_some(Input::Wheel(notches))
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = match event.physical_key {
                    PhysicalKey::Code(code) => keys::key_code(code),
                    PhysicalKey::Unidentified(_) => None,
                };
                if event.state == ElementState::Released {
                    if let Some(k) = key {
                        env.window.held.remove(&k);
                    }
                    return;
                }
                if let Some(k) = key {
                    env.window.held.insert(k);
                    let ev = KeyEvent {
                        key: k,
                        modifiers: env.window.modifiers,
                        is_repeat: event.repeat,
                    };
                    self.app.input(Input::Key(ev), env);
                }
                let m = env.window.modifiers;
                let text = event
                    .text
                    .as_deref()
                    .filter(|_| !m.ctrl && !m.alt && !m.meta)
                    .map(keys::typed_text)
                    .filter(|t| !t.is_empty());
                text.map(Input::Text)
            }
            WindowEvent::Ime(Ime::Commit(text)) => {
                let text = keys::typed_text(&text);
                (!text.is_empty()).then_some(Input::Text(text))
            }
            WindowEvent::DroppedFile(path) => {
                log::debug!("file dropped: {}", path.display());
                Some(Input::Dropped(path))
            }
            WindowEvent::RedrawRequested => {
                self.app.draw(env, &mut self.list);
                env.canvas.render(&self.list);
                env.present();
                None
            }
            _ => None,
        };
        if let Some(input) = input {
            self.app.input(input, env);
            env.request_redraw();
        }
        self.check_exit(el);
    }

    fn user_event(&mut self, el: &ActiveEventLoop, msg: A::Msg) {
        match self.env.as_mut() {
            Some(env) => {
                self.app.message(msg, env);
                env.request_redraw();
            }
            None => log::debug!("message dropped before the window exists"),
        }
        self.check_exit(el);
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        let now = Instant::now();
        if let Some(env) = self.env.as_mut() {
            let dt = now.saturating_duration_since(self.last_tick);
            if dt >= FRAME_TIME {
                self.last_tick = now;
                self.app.tick(dt.as_secs_f32(), env);
                env.request_redraw();
            }
        }
        self.check_exit(el);
        el.set_control_flow(ControlFlow::WaitUntil(self.last_tick + FRAME_TIME));
    }

    fn exiting(&mut self, _el: &ActiveEventLoop) {
        log::info!("event loop exiting");
    }
}

/// Opens the window and runs `app` until it closes. Errors that keep the
/// window from coming up are returned after the loop stops.
pub fn run<A: App>(config: WindowConfig, app: A) -> anyhow::Result<()> {
    let event_loop = EventLoop::<A::Msg>::with_user_event()
        .build()
        .context("failed to start the event loop")?;
    let mut runner = Runner {
        app,
        config,
        proxy: Proxy::new(event_loop.create_proxy()),
        env: None,
        clicks: ClickCounter::default(),
        wheel: WheelAccum::default(),
        list: DrawList::new(),
        last_tick: Instant::now(),
        closed: false,
        error: None,
    };
    event_loop.run_app(&mut runner)?;
    match runner.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
