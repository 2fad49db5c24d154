//! Where the page browser and the reader are in the file system.

use std::path::{Component, Path, PathBuf};

use folio_files::{Filter, list_dir, list_pictures};

/// A directory that can move around below `root` but never above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Browser {
    root: PathBuf,
    dir: PathBuf,
}

impl Browser {
    /// `dir` falls back to `root` when it isn't a directory inside it.
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir = dir.into();
        let dir = if dir.starts_with(&root) && dir.is_dir() {
            dir
        } else {
            root.clone()
        };
        Self { root, dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_at_root(&self) -> bool {
        self.dir == self.root
    }

    /// Subdirectories, then pictures, of the current directory.
    pub fn list(&self, show_hidden: bool) -> (Vec<PathBuf>, Vec<PathBuf>) {
        (
            list_dir(&self.dir, Filter::Dirs, show_hidden),
            list_pictures(&self.dir, show_hidden),
        )
    }

    pub fn pictures(&self, show_hidden: bool) -> Vec<PathBuf> {
        list_pictures(&self.dir, show_hidden)
    }

    /// Enters the subdirectory `name`.
    pub fn go_in(&mut self, name: &str) -> bool {
        let mut parts = Path::new(name).components();
        let (Some(Component::Normal(_)), None) = (parts.next(), parts.next()) else {
            return false;
        };
        let next = self.dir.join(name);
        if next.is_dir() {
            self.dir = next;
            true
        } else {
            false
        }
    }

    /// Jumps to `path` if it's a directory inside the root.
    pub fn go_to(&mut self, path: &Path) -> bool {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir));
        if escapes || !path.starts_with(&self.root) || !path.is_dir() {
            return false;
        }
        self.dir = path.to_owned();
        true
    }

    /// Returns `false` at the root.
    pub fn go_up(&mut self) -> bool {
        if self.is_at_root() {
            return false;
        }
        match self.dir.parent() {
            Some(parent) => {
                self.dir = parent.to_owned();
                true
            }
            None => false,
        }
    }

    /// Moves to the next sibling directory.
    pub fn go_next(&mut self, show_hidden: bool) -> bool {
        self.shift(true, show_hidden)
    }

    pub fn go_prev(&mut self, show_hidden: bool) -> bool {
        self.shift(false, show_hidden)
    }

    fn shift(&mut self, forward: bool, show_hidden: bool) -> bool {
        if self.is_at_root() {
            return false;
        }
        let Some(parent) = self.dir.parent() else {
            return false;
        };
        let dirs = list_dir(parent, Filter::Dirs, show_hidden);
        let Some(i) = dirs.iter().position(|d| *d == self.dir) else {
            return false;
        };
        let next = if forward { i.checked_add(1) } else { i.checked_sub(1) };
        match next.and_then(|j| dirs.get(j)) {
            Some(d) => {
                self.dir = d.clone();
                true
            }
            None => false,
        }
    }

    /// Nearest sibling directory in the given direction that holds
    /// pictures. The browser doesn't move when there is none.
    pub fn seek_pictures(&mut self, forward: bool, show_hidden: bool) -> bool {
        let mut cursor = self.clone();
        while cursor.shift(forward, show_hidden) {
            if !cursor.pictures(show_hidden).is_empty() {
                *self = cursor;
                return true;
            }
        }
        false
    }
}

/// Splits a directory inside `library` into the book it belongs to and its
/// path inside that book.
pub fn book_of(library: &Path, dir: &Path) -> Option<(String, String)> {
    let rel = dir.strip_prefix(library).ok()?;
    let mut parts = rel.components();
    let Component::Normal(book) = parts.next()? else {
        return None;
    };
    let book = book.to_string_lossy().into_owned();
    Some((book, parts.as_path().to_string_lossy().into_owned()))
}

/// The top of the file system `path` lives in.
pub fn fs_root(path: &Path) -> PathBuf {
    path.ancestors()
        .last()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}
