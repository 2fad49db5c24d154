use std::io;
use std::path::{Path, PathBuf};

use folio_core::{CancelFlag, Error, Palette, Progress, Result, Sink};

use crate::bindings::Bindings;
use crate::books::{Bookmarks, LastPage};
use crate::natural::natural_cmp;
use crate::settings::Settings;
use crate::themes;

pub const FILE_SETTINGS: &str = "settings.ini";
pub const FILE_BINDINGS: &str = "bindings.ini";
pub const FILE_THEMES: &str = "themes.ini";
pub const FILE_BOOKS: &str = "books.dat";

const APP_DIR: &str = "folio";

/// Owner of the settings directory and the files inside it.
#[derive(Clone, Debug)]
pub struct FileSys {
    dir: PathBuf,
}

impl FileSys {
    /// Opens the platform data directory, creating it on first run.
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            Error::io(
                APP_DIR,
                io::Error::new(io::ErrorKind::NotFound, "no data directory on this platform"),
            )
        })?;
        Self::with_dir(base.join(APP_DIR))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        log::info!("settings directory: {}", dir.display());
        let fs = Self { dir };
        fs.ensure_themes();
        Ok(fs)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, name: &str) -> String {
        let path = self.dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                log::warn!("failed to read {}: {e}", path.display());
                String::new()
            }
        }
    }

    fn write(&self, name: &str, text: &str) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::write(&path, text).map_err(|e| Error::io(path, e))
    }

    fn ensure_themes(&self) {
        let path = self.dir.join(FILE_THEMES);
        if !path.exists()
            && let Err(e) = self.write(FILE_THEMES, themes::BUNDLED_THEMES)
        {
            log::warn!("{e}");
        }
    }

    fn themes_text(&self) -> String {
        let text = self.read(FILE_THEMES);
        if text.trim().is_empty() {
            themes::BUNDLED_THEMES.to_owned()
        } else {
            text
        }
    }

    pub fn available_themes(&self) -> Vec<String> {
        themes::available(&self.themes_text())
    }

    pub fn load_palette(&self, theme: &str) -> Palette {
        themes::palette(&self.themes_text(), theme)
    }

    pub fn load_settings(&self) -> Settings {
        let sets = Settings::parse(&self.read(FILE_SETTINGS), &self.dir, &self.available_themes());
        if !sets.library.is_dir()
            && let Err(e) = std::fs::create_dir_all(&sets.library)
        {
            log::warn!("failed to create library {}: {e}", sets.library.display());
        }
        sets
    }

    pub fn save_settings(&self, sets: &Settings) -> Result<()> {
        self.write(FILE_SETTINGS, &sets.to_ini())
    }

    pub fn load_bindings(&self) -> Bindings {
        Bindings::parse(&self.read(FILE_BINDINGS))
    }

    pub fn save_bindings(&self, bindings: &Bindings) -> Result<()> {
        self.write(FILE_BINDINGS, &bindings.to_ini())
    }

    pub fn last_page(&self, book: &str) -> Option<LastPage> {
        Bookmarks::parse(&self.read(FILE_BOOKS)).get(book)
    }

    pub fn save_last_page(&self, book: &str, dir: &str, file: &str) -> Result<()> {
        let mut marks = Bookmarks::parse(&self.read(FILE_BOOKS));
        marks.set(book, dir, file);
        self.write(FILE_BOOKS, &marks.to_text())
    }

    pub fn forget_book(&self, book: &str) -> Result<()> {
        let mut marks = Bookmarks::parse(&self.read(FILE_BOOKS));
        if marks.remove(book) {
            self.write(FILE_BOOKS, &marks.to_text())?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Files,
    Dirs,
    All,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Entries of `dir` in natural order. Unreadable directories list as empty.
pub fn list_dir(dir: &Path, filter: Filter, show_hidden: bool) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            log::warn!("failed to list {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut out: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| show_hidden || !is_hidden(p))
        .filter(|p| match filter {
            Filter::Files => p.is_file(),
            Filter::Dirs => p.is_dir(),
            Filter::All => true,
        })
        .collect();
    out.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    out
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

const PICTURE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tga", "tif", "tiff", "ico", "pnm", "ppm", "pgm",
];

pub fn is_picture(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PICTURE_EXTENSIONS.iter().any(|p| p.eq_ignore_ascii_case(e)))
}

/// Pictures of `dir` in natural order.
pub fn list_pictures(dir: &Path, show_hidden: bool) -> Vec<PathBuf> {
    list_dir(dir, Filter::Files, show_hidden)
        .into_iter()
        .filter(|p| is_picture(p))
        .collect()
}

fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dst)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        std::fs::copy(src, dst)?;
    }
    Ok(())
}

fn move_entry(src: &Path, dst: &Path) -> io::Result<()> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    // different devices: copy, then remove the source
    copy_recursive(src, dst)?;
    if src.is_dir() {
        std::fs::remove_dir_all(src)
    } else {
        std::fs::remove_file(src)
    }
}

/// Moves every top-level entry of `src` into `dst`.
///
/// Runs on a worker thread: posts a step after each entry, checks `cancel`
/// between entries and always ends with a `Finished` message.
pub fn move_content<S, M>(src: &Path, dst: &Path, cancel: &CancelFlag, sink: &S)
where
    S: Sink<M>,
    M: From<Progress>,
{
    let entries: Vec<PathBuf> = match std::fs::read_dir(src) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            log::warn!("failed to list {}: {e}", src.display());
            Vec::new()
        }
    };
    let total = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("moving library cancelled after {i} of {total} entries");
            sink.post(Progress::Finished { cancelled: true }.into());
            return;
        }
        let target = dst.join(file_name(entry));
        if target.exists() {
            log::warn!("not moving {}: {} exists", entry.display(), target.display());
        } else if let Err(e) = move_entry(entry, &target) {
            log::warn!("failed to move {}: {e}", entry.display());
        }
        if !sink.post(Progress::Step { current: i + 1, total }.into()) {
            return;
        }
    }
    sink.post(Progress::Finished { cancelled: false }.into());
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh, empty directory under the system temp dir.
    pub fn temp_dir(tag: &str) -> PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("folio-{tag}-{}-{n}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::testing::temp_dir;
    use super::*;
    use crate::bindings::Action;
    use folio_core::KeyCode;
    use std::sync::mpsc;

    #[test]
    fn test_list_dir_filters_and_sorts() {
        let dir = temp_dir("list");
        for d in ["vol 10", "vol 2", ".hidden"] {
            std::fs::create_dir(dir.join(d)).unwrap();
        }
        for f in ["b.png", "a.txt", "10.jpg", "9.JPG"] {
            std::fs::write(dir.join(f), b"x").unwrap();
        }

        let names = |v: Vec<PathBuf>| v.iter().map(|p| file_name(p)).collect::<Vec<_>>();
        assert_eq!(names(list_dir(&dir, Filter::Dirs, false)), ["vol 2", "vol 10"]);
        assert_eq!(
            names(list_dir(&dir, Filter::Dirs, true)),
            [".hidden", "vol 2", "vol 10"]
        );
        assert_eq!(names(list_pictures(&dir, false)), ["9.JPG", "10.jpg", "b.png"]);
        assert!(list_dir(&dir.join("missing"), Filter::All, false).is_empty());
    }

    #[test]
    fn test_first_run_creates_files_with_defaults() {
        let dir = temp_dir("firstrun");
        let fs = FileSys::with_dir(dir.join("sets")).unwrap();
        assert!(fs.dir().join(FILE_THEMES).is_file());
        assert_eq!(fs.available_themes(), ["default", "light", "blue"]);

        let sets = fs.load_settings();
        assert_eq!(sets.library, fs.dir().join("library"));
        assert!(sets.library.is_dir());
        assert_eq!(fs.load_bindings(), Bindings::default());
    }

    #[test]
    fn test_bindings_persist_between_sessions() {
        let dir = temp_dir("bind");
        let fs = FileSys::with_dir(&dir).unwrap();
        let mut b = fs.load_bindings();
        b[Action::ScrollUp].set_key(KeyCode::K);
        fs.save_bindings(&b).unwrap();

        let fresh = FileSys::with_dir(&dir).unwrap().load_bindings();
        assert_eq!(fresh[Action::ScrollUp].key(), Some(KeyCode::K));
        for a in Action::ALL.iter().filter(|a| **a != Action::ScrollUp) {
            assert_eq!(fresh[*a], Bindings::default()[*a]);
        }
    }

    #[test]
    fn test_last_page_persistence() {
        let fs = FileSys::with_dir(temp_dir("books")).unwrap();
        assert_eq!(fs.last_page("Saga"), None);
        fs.save_last_page("Saga", "Saga/ch 1", "03.png").unwrap();
        fs.save_last_page("Saga", "Saga/ch 2", "01.png").unwrap();
        assert_eq!(fs.last_page("Saga").unwrap().dir, "Saga/ch 2");
        fs.forget_book("Saga").unwrap();
        assert_eq!(fs.last_page("Saga"), None);
    }

    #[test]
    fn test_move_content_reports_progress() {
        let root = temp_dir("move");
        let (src, dst) = (root.join("old"), root.join("new"));
        std::fs::create_dir_all(src.join("Book A")).unwrap();
        std::fs::write(src.join("Book A/1.png"), b"x").unwrap();
        std::fs::create_dir_all(src.join("Book B")).unwrap();
        std::fs::create_dir_all(&dst).unwrap();

        let (tx, rx) = mpsc::channel::<Progress>();
        move_content(&src, &dst, &CancelFlag::new(), &tx);
        let msgs: Vec<Progress> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1], Progress::Step { current: 2, total: 2 });
        assert_eq!(msgs[2], Progress::Finished { cancelled: false });
        assert!(dst.join("Book A/1.png").is_file());
        assert!(list_dir(&src, Filter::All, true).is_empty());
    }

    #[test]
    fn test_move_content_cancelled_still_finishes() {
        let root = temp_dir("movecancel");
        std::fs::create_dir_all(root.join("old/x")).unwrap();
        std::fs::create_dir_all(root.join("new")).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel::<Progress>();
        move_content(&root.join("old"), &root.join("new"), &cancel, &tx);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [Progress::Finished { cancelled: true }]
        );
        assert!(root.join("old/x").is_dir());
    }
}
