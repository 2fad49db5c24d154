//! Persistence and library helpers.
//!
//! Everything the reader keeps between sessions lives as small text files in
//! one settings directory owned by [`FileSys`]: `settings.ini`,
//! `bindings.ini`, `themes.ini` and `books.dat`. Parsing never fails; bad
//! lines are logged and skipped so a hand-edited file can't keep the program
//! from starting.

pub mod bindings;
pub mod books;
pub mod fs;
pub mod ini;
pub mod natural;
pub mod settings;
pub mod themes;

pub use bindings::{Action, Binding, Bindings, JoyControl, PadControl};
pub use books::{Bookmarks, LastPage};
pub use fs::{FileSys, Filter, file_name, is_picture, list_dir, list_pictures, move_content};
pub use ini::IniLine;
pub use natural::natural_cmp;
pub use settings::{LimitKind, PictureLimit, ReadDirection, Settings};
