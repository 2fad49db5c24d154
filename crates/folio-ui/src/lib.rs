//! Widget tree, layout, scrolling and input routing.
//!
//! Widgets live in one arena ([`Tree`]) addressed by [`WidgetId`]s; a
//! [`Scene`] stacks layers on top of it and turns window input into
//! [`UiEvent`]s. Geometry is derived from the root rects on demand, so
//! resizing never has to walk the tree.

mod draw;
pub mod layout;
pub mod reader;
pub mod scene;
pub mod scroll;
pub mod textedit;
pub mod tree;
pub mod widget;

slotmap::new_key_type! {
    /// Handle of a widget in a [`Tree`]. Stale handles resolve to nothing.
    pub struct WidgetId;
}

pub use layout::{Layout, Select};
pub use reader::ReaderBox;
pub use scene::{Anchor, ClickStamp, Cx, Scene, UiEvent};
pub use scroll::{ScrollArea, TileBox};
pub use textedit::{TextEdit, TextType};
pub use tree::Tree;
pub use widget::{
    AcceptType, Align, Button, Calls, CheckBox, ComboBox, KeyGetter, Label, LabelEdit, Picture,
    ProgressBar, Size, Slider, WidgetKind,
};

mod tests;
