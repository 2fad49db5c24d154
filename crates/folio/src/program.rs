//! The reader program: which screen is up and what its widgets' messages do.
//!
//! Widgets only post [`Msg`] values. After every input, worker message and
//! frame the program drains the scene's [`UiEvent`]s and reacts, usually by
//! rebuilding the main layout for another screen.

mod options;
mod screens;

use std::ops::Range;
use std::path::{Path, PathBuf};

use folio_core::{CancelFlag, DrawList, IVec2, Progress, Sink, Worker};
use folio_files::{Action, Bindings, FileSys, Settings, file_name, is_picture, move_content};
use folio_platform::{App, Env, Input, Proxy};
use folio_ui::{Scene, UiEvent, WidgetId, WidgetKind};

use crate::browser::{self, Browser};
use crate::host::{Host, cx};
use crate::pages;

/// Mouse pointer speed under the cursor actions, in pixels per second.
const CURSOR_SPEED: f32 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Books,
    Browser,
    Reader,
    Settings,
}

/// Settings picked from a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Direction,
    Limit,
    Theme,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    Exit,
    ShowBooks,
    ShowSettings,
    /// Page browser rooted at a book of the library.
    OpenBook(String),
    BookMenu(String),
    ContinueBook(String),
    ForgetBook(String),
    BrowseHome,
    LeaveBrowser,
    GoUp,
    GoIn(String),
    GoTo,
    OpenPicture(String),
    /// A reader control on the player bar.
    Act(Action),
    OpenCombo(Field),
    PickCombo(Field, usize),
    SetZoom,
    SetSpacing,
    SetLimitValue,
    SetFullscreen,
    SetShowHidden,
    SetFont,
    SetLibrary,
    SetScrollSpeed,
    SlideDeadzone,
    TypeDeadzone,
    BindingSet,
    ResetSettings,
    ClosePopup,
    MoveBooks,
    CancelMove,
    Moved(Progress),
}

impl From<Progress> for Msg {
    fn from(p: Progress) -> Self {
        Msg::Moved(p)
    }
}

struct Reading {
    id: WidgetId,
    /// Every picture of the directory.
    files: Vec<PathBuf>,
    /// The part of `files` in the reader.
    range: Range<usize>,
    /// Index into `files` of each page.
    pages: Vec<usize>,
}

struct Mover {
    worker: Worker,
    popup: WidgetId,
    bar: WidgetId,
}

pub struct Program<S> {
    fs: FileSys,
    sets: Settings,
    bindings: Bindings,
    themes: Vec<String>,
    scene: Scene<Msg>,
    screen: Screen,
    browser: Browser,
    /// Where leaving the page browser goes.
    back: Screen,
    reading: Option<Reading>,
    /// Combo box whose list is open.
    combo: Option<WidgetId>,
    /// Previous library while the move offer is up.
    old_library: Option<PathBuf>,
    mover: Option<Mover>,
    sink: Option<S>,
    /// Path to open instead of the book list at start.
    open: Option<PathBuf>,
    window: IVec2,
    cursor_rem: [f32; 2],
}

impl<S: Sink<Msg> + Clone> Program<S> {
    pub fn new(fs: FileSys, open: Option<PathBuf>) -> Self {
        let sets = fs.load_settings();
        let bindings = fs.load_bindings();
        let themes = fs.available_themes();
        let library = sets.library.clone();
        Self {
            scene: Scene::new(sets.resolution),
            window: sets.resolution,
            browser: Browser::new(library.clone(), library),
            fs,
            sets,
            bindings,
            themes,
            screen: Screen::Books,
            back: Screen::Books,
            reading: None,
            combo: None,
            old_library: None,
            mover: None,
            sink: None,
            open,
            cursor_rem: [0.0; 2],
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.sets
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn scene(&self) -> &Scene<Msg> {
        &self.scene
    }

    /// Where workers post their messages.
    pub fn set_sink(&mut self, sink: S) {
        self.sink = Some(sink);
    }

    pub fn begin(&mut self, size: IVec2, host: &mut Host) {
        self.window = size;
        self.scene.resize(size);
        self.scene.scroll_speed = self.sets.scroll_speed;
        self.scene.deadzone = self.sets.deadzone();
        self.apply_look(host);
        match self.open.take() {
            Some(path) => self.open_path(&path, host),
            None => self.show_books(host),
        }
    }

    pub fn handle_input(&mut self, input: Input, host: &mut Host) {
        match input {
            Input::MouseDown { button, pos } => {
                self.scene
                    .on_mouse_down(button, pos, &mut cx(&mut self.bindings, host));
            }
            Input::MouseUp { button, pos, clicks } => {
                self.scene
                    .on_mouse_up(button, pos, clicks, &mut cx(&mut self.bindings, host));
            }
            Input::MouseMove { pos, delta } => self.scene.on_mouse_move(pos, delta),
            Input::Wheel(notches) => self.scene.on_wheel(notches),
            Input::Key(ev) => self.scene.on_key_down(&ev, &mut cx(&mut self.bindings, host)),
            Input::Text(text) => self.scene.on_text(&text, &mut cx(&mut self.bindings, host)),
            Input::Dropped(path) => self.open_path(&path, host),
            Input::Resized(size) => {
                self.window = size;
                self.scene.resize(size);
                if self.screen == Screen::Reader {
                    self.show_player(host);
                }
            }
        }
        self.pump(host);
    }

    pub fn handle_message(&mut self, msg: Msg, host: &mut Host) {
        self.on_msg(msg, None, host);
        self.pump(host);
    }

    /// Advances one frame: timers, held scroll actions and the pointer.
    pub fn step(&mut self, dt: f32, host: &mut Host) {
        let mut d = [0; 2];
        {
            let bindings = &self.bindings;
            let shell = &*host.shell;
            let sticks: Vec<Action> = Action::ALL
                .iter()
                .copied()
                .filter(|&a| self.scene.axis_held(&bindings[a]))
                .collect();
            let held =
                |a: Action| bindings[a].key().is_some_and(|k| shell.is_held(k)) || sticks.contains(&a);
            self.scene.tick(dt, &held);

            let axis = |neg: Action, pos: Action| (held(pos) as i32 - held(neg) as i32) as f32;
            let v = [
                axis(Action::CursorLeft, Action::CursorRight),
                axis(Action::CursorUp, Action::CursorDown),
            ];
            for i in 0..2 {
                if v[i] == 0.0 {
                    self.cursor_rem[i] = 0.0;
                    continue;
                }
                let want = v[i] * CURSOR_SPEED * dt + self.cursor_rem[i];
                d[i] = want.trunc() as i32;
                self.cursor_rem[i] = want - d[i] as f32;
            }
        }
        host.shell.move_cursor(IVec2::new(d[0], d[1]));
        self.pump(host);
    }

    pub fn render(&mut self, host: &mut Host, out: &mut DrawList) {
        self.scene.draw(&mut *host.ds, out);
    }

    /// Saves everything worth keeping before the window goes away.
    pub fn finish(&mut self, host: &mut Host) {
        if self.screen == Screen::Reader {
            self.save_last_page();
        }
        if let Some(m) = self.mover.take() {
            m.worker.cancel();
            m.worker.join();
        }
        self.sets.fullscreen = host.shell.is_fullscreen();
        self.sets.maximized = host.shell.is_maximized();
        if !self.sets.fullscreen && !self.sets.maximized {
            self.sets.resolution = self.window;
        }
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.fs.save_settings(&self.sets) {
            log::warn!("{e}");
        }
        if let Err(e) = self.fs.save_bindings(&self.bindings) {
            log::warn!("{e}");
        }
    }

    fn apply_look(&mut self, host: &mut Host) {
        host.ds.use_palette(self.fs.load_palette(&self.sets.theme));
        if !host.ds.use_font(&self.sets.font) {
            log::warn!("no font for \"{}\", text won't show", self.sets.font);
        }
    }

    /// Handles what the scene queued, then cancels a move whose popup was
    /// dismissed.
    fn pump(&mut self, host: &mut Host) {
        for ev in self.scene.take_events() {
            match ev {
                UiEvent::Call { msg, from } => self.on_msg(msg, Some(from), host),
                UiEvent::Action(a) => self.on_action(a, host),
                UiEvent::DirLimit { next } => {
                    if self.screen == Screen::Reader {
                        self.turn(next, host);
                    }
                }
            }
        }
        if let Some(m) = &self.mover
            && self.scene.popup() != Some(m.popup)
            && m.worker.is_running()
        {
            m.worker.cancel();
        }
    }

    fn on_msg(&mut self, msg: Msg, from: Option<WidgetId>, host: &mut Host) {
        log::debug!("message {msg:?}");
        match msg {
            Msg::Exit => host.shell.exit(),
            Msg::ShowBooks => {
                self.persist();
                self.show_books(host);
            }
            Msg::ShowSettings => self.show_settings(host),
            Msg::OpenBook(book) => self.open_book(&book, host),
            Msg::BookMenu(book) => {
                if let Some(owner) = from {
                    self.show_book_menu(book, owner, host);
                }
            }
            Msg::ContinueBook(book) => self.continue_book(&book, host),
            Msg::ForgetBook(book) => {
                self.scene.close_context();
                if let Err(e) = self.fs.forget_book(&book) {
                    log::warn!("{e}");
                }
            }
            Msg::BrowseHome => {
                let home = dirs::home_dir().unwrap_or_else(|| self.sets.library.clone());
                self.browser = Browser::new(browser::fs_root(&home), home);
                self.back = Screen::Books;
                self.show_browser(host);
            }
            Msg::LeaveBrowser => self.leave_browser(host),
            Msg::GoUp => self.browser_up(host),
            Msg::GoIn(name) => {
                if self.browser.go_in(&name) {
                    self.show_browser(host);
                }
            }
            Msg::GoTo => {
                if let Some(id) = from {
                    self.browser_go_to(id, host);
                }
            }
            Msg::OpenPicture(name) => {
                let files = self.browser.pictures(self.sets.show_hidden);
                if let Some(i) = files.iter().position(|f| file_name(f) == name) {
                    self.show_reader(files, i, false, host);
                }
            }
            Msg::Act(a) => self.on_action(a, host),
            Msg::OpenCombo(field) => {
                if let Some(id) = from {
                    self.open_combo(field, id, host);
                }
            }
            Msg::PickCombo(field, i) => self.pick_combo(field, i, host),
            Msg::ResetSettings => self.reset_settings(host),
            Msg::ClosePopup => self.scene.close_popup(),
            Msg::MoveBooks => self.start_move(host),
            Msg::CancelMove => {
                if let Some(m) = &self.mover {
                    m.worker.cancel();
                }
            }
            Msg::Moved(p) => self.on_progress(p, host),
            option => {
                if let Some(id) = from {
                    self.on_option(option, id, host);
                }
            }
        }
    }

    fn on_action(&mut self, action: Action, host: &mut Host) {
        match action {
            Action::Escape => self.escape(host),
            Action::Fullscreen => {
                let on = !host.shell.is_fullscreen();
                host.shell.set_fullscreen(on);
                self.sets.fullscreen = on;
                if let Some(id) = self.find(&Msg::SetFullscreen)
                    && let Some(WidgetKind::CheckBox(c)) = self.scene.tree_mut().kind_mut(id)
                {
                    c.on = on;
                }
            }
            Action::Hide => {
                self.sets.show_hidden = !self.sets.show_hidden;
                log::debug!("show hidden {}", self.sets.show_hidden);
                self.refresh(host);
            }
            Action::Boss => host.shell.minimize(),
            Action::Refresh => self.refresh(host),
            a if self.screen == Screen::Reader => self.reader_action(a, host),
            _ => {}
        }
    }

    fn escape(&mut self, host: &mut Host) {
        match self.screen {
            Screen::Books => host.shell.exit(),
            Screen::Browser => self.browser_up(host),
            Screen::Reader => {
                self.save_last_page();
                self.show_browser(host);
            }
            Screen::Settings => {
                self.persist();
                self.show_books(host);
            }
        }
    }

    /// Builds the current screen again from the file system and settings.
    fn refresh(&mut self, host: &mut Host) {
        match self.screen {
            Screen::Books => self.show_books(host),
            Screen::Browser => self.show_browser(host),
            Screen::Settings => self.show_settings(host),
            Screen::Reader => {
                let current = self.current_file();
                let files = self.browser.pictures(self.sets.show_hidden);
                let at = current
                    .and_then(|c| files.iter().position(|f| *f == c))
                    .unwrap_or(0);
                self.show_reader(files, at, false, host);
            }
        }
    }

    /// First widget whose left call is `msg`.
    fn find(&self, msg: &Msg) -> Option<WidgetId> {
        let tree = self.scene.tree();
        tree.ids().find(|&id| {
            tree.kind(id)
                .and_then(WidgetKind::calls)
                .is_some_and(|c| c.left.as_ref() == Some(msg))
        })
    }

    // books and browsing

    fn open_book(&mut self, book: &str, host: &mut Host) {
        self.scene.close_context();
        let root = self.sets.library.join(book);
        self.browser = Browser::new(root.clone(), root);
        self.back = Screen::Books;
        self.show_browser(host);
    }

    /// Opens the reader where the book was left, or its page browser.
    fn continue_book(&mut self, book: &str, host: &mut Host) {
        self.scene.close_context();
        if let Some(mark) = self.fs.last_page(book) {
            let root = self.sets.library.join(book);
            let dir = if mark.dir.is_empty() {
                root.clone()
            } else {
                root.join(&mark.dir)
            };
            self.browser = Browser::new(root, dir);
            self.back = Screen::Books;
            let files = self.browser.pictures(self.sets.show_hidden);
            if let Some(i) = files.iter().position(|f| file_name(f) == mark.file) {
                self.show_reader(files, i, false, host);
                return;
            }
            log::debug!("last page of {book} is gone");
        }
        self.open_book(book, host);
    }

    fn browser_up(&mut self, host: &mut Host) {
        if self.browser.go_up() {
            self.show_browser(host);
        } else {
            self.leave_browser(host);
        }
    }

    fn leave_browser(&mut self, host: &mut Host) {
        match self.back {
            Screen::Settings => self.show_settings(host),
            _ => self.show_books(host),
        }
    }

    fn browser_go_to(&mut self, id: WidgetId, host: &mut Host) {
        let Some(text) = self.edit_text(id) else {
            return;
        };
        if self.browser.go_to(Path::new(text.trim())) {
            self.show_browser(host);
        } else {
            let dir = self.browser.dir().to_string_lossy().into_owned();
            self.set_edit(id, &dir);
        }
    }

    /// Opens a directory or picture given on the command line or dropped
    /// on the window.
    pub fn open_path(&mut self, path: &Path, host: &mut Host) {
        if self.screen == Screen::Reader {
            self.save_last_page();
        }
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_owned());
        let (dir, file) = if path.is_dir() {
            (path.clone(), None)
        } else if path.is_file() && is_picture(&path) {
            match path.parent() {
                Some(parent) => (parent.to_owned(), Some(file_name(&path))),
                None => return,
            }
        } else {
            log::warn!("can't open {}", path.display());
            self.show_message("Can't open that file.", host);
            return;
        };
        let root = match browser::book_of(&self.sets.library, &dir) {
            Some((book, _)) => self.sets.library.join(book),
            None => browser::fs_root(&dir),
        };
        self.browser = Browser::new(root, dir);
        self.back = Screen::Books;
        let files = self.browser.pictures(self.sets.show_hidden);
        let at = match &file {
            Some(name) => files.iter().position(|f| file_name(f) == *name),
            None => (!files.is_empty()).then_some(0),
        };
        match at {
            Some(i) => self.show_reader(files, i, false, host),
            None => self.show_browser(host),
        }
    }

    // reader

    /// Shows the batch of `files` starting at `from`, or with `at_end` the
    /// batch ending before it, scrolled to its end.
    fn show_reader(&mut self, files: Vec<PathBuf>, from: usize, at_end: bool, host: &mut Host) {
        let limit = self.sets.picture_limit;
        let range = pages::batch(files.len(), from, !at_end, limit, |i| pages::file_size(&files[i]));
        let id = self.enter_reader();
        let mut loaded = Vec::with_capacity(range.len());
        for i in range.clone() {
            match host.ds.load_texture(&files[i]) {
                Ok(tex) => {
                    let res = host.ds.texture_size(tex).unwrap_or_default();
                    if self.scene.tree_mut().add_page(id, Some(tex), res).is_some() {
                        loaded.push(i);
                    } else {
                        host.ds.free_texture(tex);
                    }
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        let tree = self.scene.tree_mut();
        tree.set_zoom(id, self.sets.zoom);
        if at_end {
            tree.scroll_to_end(id);
        }
        log::debug!(
            "reading {} pages of {} in {}",
            loaded.len(),
            files.len(),
            self.browser.dir().display()
        );
        self.reading = Some(Reading {
            id,
            files,
            range,
            pages: loaded,
        });
        self.show_player(host);
    }

    fn current_file(&self) -> Option<PathBuf> {
        let r = self.reading.as_ref()?;
        let page = self.scene.tree().current_page(r.id)?;
        let &i = r.pages.get(page)?;
        r.files.get(i).cloned()
    }

    fn save_last_page(&self) {
        let Some(file) = self.current_file() else {
            return;
        };
        let Some((book, dir)) = browser::book_of(&self.sets.library, self.browser.dir()) else {
            log::debug!("{} is outside the library", self.browser.dir().display());
            return;
        };
        if let Err(e) = self.fs.save_last_page(&book, &dir, &file_name(&file)) {
            log::warn!("{e}");
        }
    }

    fn reader_action(&mut self, action: Action, host: &mut Host) {
        let Some(id) = self.reading.as_ref().map(|r| r.id) else {
            return;
        };
        let tree = self.scene.tree_mut();
        match action {
            Action::NextPage => {
                if !tree.next_page(id) {
                    self.turn(true, host);
                }
            }
            Action::PrevPage => {
                if !tree.prev_page(id) {
                    self.turn(false, host);
                }
            }
            Action::Up | Action::Down | Action::Left | Action::Right => {
                match pages::page_step(self.sets.direction, action) {
                    Some(true) => self.reader_action(Action::NextPage, host),
                    Some(false) => self.reader_action(Action::PrevPage, host),
                    None => {}
                }
            }
            Action::ZoomIn => tree.zoom_in(id),
            Action::ZoomOut => tree.zoom_out(id),
            Action::ZoomReset => tree.set_zoom(id, self.sets.zoom),
            Action::CenterView => tree.center_view(id),
            Action::ToStart => {
                tree.scroll_to_start(id);
            }
            Action::ToEnd => {
                tree.scroll_to_end(id);
            }
            Action::NextDir => self.switch_dir(true, false, host),
            Action::PrevDir => self.switch_dir(false, false, host),
            _ => {}
        }
    }

    /// Goes past the end of the batch: to the neighbouring batch of the
    /// directory, else to the neighbouring directory.
    fn turn(&mut self, next: bool, host: &mut Host) {
        let Some(r) = self.reading.take() else {
            return;
        };
        if next && r.range.end < r.files.len() {
            let from = r.range.end;
            self.show_reader(r.files, from, false, host);
        } else if !next && r.range.start > 0 {
            let from = r.range.start;
            self.show_reader(r.files, from, true, host);
        } else {
            self.reading = Some(r);
            self.switch_dir(next, !next, host);
        }
    }

    fn switch_dir(&mut self, next: bool, at_end: bool, host: &mut Host) {
        let show_hidden = self.sets.show_hidden;
        let mut to = self.browser.clone();
        if !to.seek_pictures(next, show_hidden) {
            log::debug!("no {} directory with pictures", if next { "next" } else { "previous" });
            return;
        }
        self.save_last_page();
        self.browser = to;
        let files = self.browser.pictures(show_hidden);
        let from = if at_end { files.len() } else { 0 };
        self.show_reader(files, from, at_end, host);
    }

    // library move

    fn start_move(&mut self, host: &mut Host) {
        self.scene.close_popup();
        let Some(src) = self.old_library.take() else {
            return;
        };
        let Some(sink) = self.sink.clone() else {
            log::warn!("nowhere to report progress, not moving {}", src.display());
            return;
        };
        let dst = self.sets.library.clone();
        log::info!("moving books from {} to {}", src.display(), dst.display());
        let job = move |cancel: CancelFlag| move_content::<_, Msg>(&src, &dst, &cancel, &sink);
        let worker = match Worker::spawn("mover", job) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("failed to start moving books: {e}");
                return;
            }
        };
        match self.show_progress("Moving books...", host) {
            Some((popup, bar)) => self.mover = Some(Mover { worker, popup, bar }),
            None => {
                worker.cancel();
                worker.join();
            }
        }
    }

    fn on_progress(&mut self, p: Progress, host: &mut Host) {
        match p {
            Progress::Step { current, total } => {
                if let Some(m) = &self.mover
                    && let Some(WidgetKind::ProgressBar(bar)) = self.scene.tree_mut().kind_mut(m.bar)
                {
                    bar.set_range(0, total as i32);
                    bar.set_value(current as i32);
                }
            }
            Progress::Finished { cancelled } => {
                let Some(m) = self.mover.take() else {
                    return;
                };
                if self.scene.popup() == Some(m.popup) {
                    self.scene.close_popup();
                }
                m.worker.join();
                if self.screen == Screen::Books {
                    self.show_books(host);
                }
                let text = if cancelled {
                    "Moving cancelled."
                } else {
                    "Books moved."
                };
                self.show_message(text, host);
            }
        }
    }
}

impl App for Program<Proxy<Msg>> {
    type Msg = Msg;

    fn start(&mut self, env: &mut Env<Msg>) {
        self.set_sink(env.proxy());
        let size = env.size();
        self.begin(size, &mut Host::from_env(env));
    }

    fn input(&mut self, input: Input, env: &mut Env<Msg>) {
        self.handle_input(input, &mut Host::from_env(env));
    }

    fn message(&mut self, msg: Msg, env: &mut Env<Msg>) {
        self.handle_message(msg, &mut Host::from_env(env));
    }

    fn tick(&mut self, dt: f32, env: &mut Env<Msg>) {
        self.step(dt, &mut Host::from_env(env));
    }

    fn draw(&mut self, env: &mut Env<Msg>, out: &mut DrawList) {
        self.render(&mut Host::from_env(env), out);
    }

    fn close(&mut self, env: &mut Env<Msg>) {
        self.finish(&mut Host::from_env(env));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use folio_core::{Headless, KeyCode, MemoryClipboard, MouseButton, Palette};
    use folio_files::{LastPage, LimitKind, PictureLimit};

    use super::*;
    use crate::browser::testing::{fill, temp_dir};
    use crate::host::{Backend, Shell};

    impl Backend for Headless {
        fn use_palette(&mut self, _palette: Palette) {}

        fn use_font(&mut self, _family: &str) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct FakeShell {
        fullscreen: bool,
        exited: bool,
    }

    impl Shell for FakeShell {
        fn is_held(&self, _key: KeyCode) -> bool {
            false
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn set_fullscreen(&mut self, on: bool) {
            self.fullscreen = on;
        }

        fn is_maximized(&self) -> bool {
            false
        }

        fn minimize(&mut self) {}

        fn move_cursor(&mut self, _d: IVec2) {}

        fn exit(&mut self) {
            self.exited = true;
        }
    }

    struct Rig {
        program: Program<mpsc::Sender<Msg>>,
        rx: mpsc::Receiver<Msg>,
        ds: Headless,
        clip: MemoryClipboard,
        shell: FakeShell,
        root: PathBuf,
    }

    impl Rig {
        fn new(tag: &str) -> Self {
            let root = temp_dir(tag);
            let fs = FileSys::with_dir(root.join("config")).unwrap();
            let mut program = Program::new(fs, None);
            let (tx, rx) = mpsc::channel();
            program.set_sink(tx);
            Self {
                program,
                rx,
                ds: Headless::default(),
                clip: MemoryClipboard::default(),
                shell: FakeShell::default(),
                root,
            }
        }

        fn library(&self) -> PathBuf {
            self.program.settings().library.clone()
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut Program<mpsc::Sender<Msg>>, &mut Host) -> R) -> R {
            let mut host = Host {
                ds: &mut self.ds,
                clipboard: &mut self.clip,
                shell: &mut self.shell,
            };
            f(&mut self.program, &mut host)
        }

        fn begin(&mut self) {
            self.with(|p, host| p.begin(IVec2::new(800, 600), host));
        }

        fn send(&mut self, msg: Msg) {
            self.with(|p, host| p.handle_message(msg, host));
        }

        fn find(&self, text: &str) -> WidgetId {
            let tree = self.program.scene().tree();
            tree.ids()
                .find(|&id| tree.text(id) == Some(text))
                .unwrap_or_else(|| panic!("no widget shows {text:?}"))
        }

        fn click(&mut self, text: &str) {
            let id = self.find(text);
            let pos = self.program.scene().tree().rect(id).center();
            self.with(|p, host| {
                p.handle_input(Input::MouseDown { button: MouseButton::Left, pos }, host);
                p.handle_input(Input::MouseUp { button: MouseButton::Left, pos, clicks: 1 }, host);
            });
        }

        fn reader(&self) -> WidgetId {
            self.program.reading.as_ref().map(|r| r.id).unwrap()
        }

        fn page_count(&self) -> usize {
            self.program.scene().tree().page_count(self.reader())
        }
    }

    #[test]
    fn test_books_list_library_in_natural_order() {
        let mut rig = Rig::new("books");
        let lib = rig.library();
        fill(&lib, "vol10", &["1.png"]);
        fill(&lib, "vol2", &["1.png"]);
        rig.begin();
        assert_eq!(rig.program.screen(), Screen::Books);
        let tree = rig.program.scene().tree();
        let tiles = tree.child(rig.program.scene().main(), 1).unwrap();
        let names: Vec<_> = tree.children(tiles).iter().filter_map(|&id| tree.text(id)).collect();
        assert_eq!(names, ["vol2", "vol10", "Browse..."]);
    }

    #[test]
    fn test_reading_saves_last_page() {
        let mut rig = Rig::new("read");
        fill(&rig.library(), "Alpha", &["1.png", "2.png", "notes.txt"]);
        rig.begin();
        rig.click("Alpha");
        assert_eq!(rig.program.screen(), Screen::Browser);
        rig.click("1.png");
        assert_eq!(rig.program.screen(), Screen::Reader);
        assert_eq!(rig.page_count(), 2);

        rig.send(Msg::Act(Action::Escape));
        assert_eq!(rig.program.screen(), Screen::Browser);
        let mark = rig.program.fs.last_page("Alpha");
        assert_eq!(
            mark,
            Some(LastPage {
                dir: String::new(),
                file: "1.png".into()
            })
        );

        rig.send(Msg::Act(Action::Escape));
        assert_eq!(rig.program.screen(), Screen::Books);
        rig.send(Msg::ContinueBook("Alpha".into()));
        assert_eq!(rig.program.screen(), Screen::Reader);
    }

    #[test]
    fn test_next_page_at_end_opens_next_chapter() {
        let mut rig = Rig::new("chapters");
        let lib = rig.library();
        fill(&lib, "Saga/ch1", &["1.png"]);
        fill(&lib, "Saga/ch2", &["1.png", "2.png"]);
        fill(&lib, "Saga/ch3", &[]);
        rig.begin();
        rig.click("Saga");
        rig.click("ch1");
        rig.click("1.png");
        assert_eq!(rig.page_count(), 1);

        // the page is taller than the window: first to its end, then on
        rig.send(Msg::Act(Action::NextPage));
        assert_eq!(rig.program.browser.dir(), lib.join("Saga/ch1"));
        rig.send(Msg::Act(Action::NextPage));
        assert_eq!(rig.program.browser.dir(), lib.join("Saga/ch2"));
        assert_eq!(rig.page_count(), 2);
        let mark = rig.program.fs.last_page("Saga").unwrap();
        assert_eq!(mark.dir, "ch1");

        // ch3 has no pictures
        rig.send(Msg::Act(Action::NextDir));
        assert_eq!(rig.program.browser.dir(), lib.join("Saga/ch2"));
    }

    #[test]
    fn test_picture_limit_splits_directory() {
        let mut rig = Rig::new("limit");
        fill(&rig.library(), "Big", &["1.png", "2.png", "3.png", "4.png", "5.png"]);
        rig.program.sets.picture_limit = PictureLimit {
            kind: LimitKind::Count,
            count: 2,
            ..PictureLimit::default()
        };
        rig.begin();
        rig.click("Big");
        rig.click("1.png");
        assert_eq!(rig.program.reading.as_ref().unwrap().range, 0..2);

        for _ in 0..2 {
            rig.send(Msg::Act(Action::NextPage));
        }
        assert_eq!(rig.program.reading.as_ref().unwrap().range, 0..2);
        rig.send(Msg::Act(Action::NextPage));
        assert_eq!(rig.program.reading.as_ref().unwrap().range, 2..4);
        assert_eq!(rig.page_count(), 2);

        rig.send(Msg::Act(Action::PrevPage));
        assert_eq!(rig.program.reading.as_ref().unwrap().range, 0..2);
    }

    #[test]
    fn test_settings_escape_returns_to_books() {
        let mut rig = Rig::new("settings");
        rig.begin();
        rig.click("Settings");
        assert_eq!(rig.program.screen(), Screen::Settings);
        rig.send(Msg::Act(Action::Escape));
        assert_eq!(rig.program.screen(), Screen::Books);
        assert!(rig.program.fs.dir().join("settings.ini").is_file());
        rig.send(Msg::Act(Action::Escape));
        assert!(rig.shell.exited);
    }

    #[test]
    fn test_invalid_library_is_refused() {
        let mut rig = Rig::new("badlib");
        let lib = rig.library();
        rig.begin();
        rig.click("Settings");
        let edit = rig.find(&lib.to_string_lossy());
        let bogus = rig.root.join("missing");
        rig.with(|p, host| {
            p.set_edit(edit, &bogus.to_string_lossy());
            p.on_msg(Msg::SetLibrary, Some(edit), host);
        });
        assert_eq!(rig.program.settings().library, lib);
        assert_eq!(rig.program.edit_text(edit).as_deref(), Some(&*lib.to_string_lossy()));
        assert!(rig.program.scene().popup().is_some());
        rig.find("Invalid directory.");
    }

    #[test]
    fn test_library_move_runs_on_worker() {
        let mut rig = Rig::new("move");
        let old = rig.library();
        fill(&old, "Alpha", &["1.png"]);
        let new = fill(&rig.root, "shelf", &[]);
        rig.begin();
        rig.click("Settings");
        let edit = rig.find(&old.to_string_lossy());
        rig.with(|p, host| {
            p.set_edit(edit, &new.to_string_lossy());
            p.on_msg(Msg::SetLibrary, Some(edit), host);
        });
        assert_eq!(rig.program.settings().library, new);
        rig.click("Yes");
        assert!(rig.program.mover.is_some());

        loop {
            let msg = rig.rx.recv_timeout(Duration::from_secs(10)).unwrap();
            let done = matches!(msg, Msg::Moved(Progress::Finished { .. }));
            rig.send(msg);
            if done {
                break;
            }
        }
        assert!(rig.program.mover.is_none());
        assert!(new.join("Alpha/1.png").is_file());
        assert!(!old.join("Alpha").exists());
        rig.find("Books moved.");
    }
}
