//! Widget variants and what each of them can do.

use bitflags::bitflags;
use folio_core::{IVec2, Texture};
use folio_files::{Action, Binding, Bindings};

use crate::layout::Layout;
use crate::reader::ReaderBox;
use crate::scroll::{ScrollArea, TileBox};
use crate::textedit::{TextEdit, TextType};

/// Extent of a widget along its parent's axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Size {
    Pixels(i32),
    /// Share of the parent's space, `1.0` being all of it.
    Percent(f32),
}

impl Default for Size {
    fn default() -> Self {
        Size::Percent(1.0)
    }
}

impl From<i32> for Size {
    fn from(px: i32) -> Self {
        Size::Pixels(px)
    }
}

impl From<f32> for Size {
    fn from(pct: f32) -> Self {
        Size::Percent(pct)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Caps: u8 {
        const DRAWABLE = 1 << 0;
        const CLICKABLE = 1 << 1;
        const DRAGGABLE = 1 << 2;
        const TEXT_EDITABLE = 1 << 3;
        const NAVIGABLE = 1 << 4;
        const CONTAINER = 1 << 5;
    }
}

/// Messages a clickable widget posts for each kind of click.
#[derive(Clone, Debug, PartialEq)]
pub struct Calls<M> {
    pub left: Option<M>,
    pub right: Option<M>,
    pub double: Option<M>,
}

impl<M> Default for Calls<M> {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
            double: None,
        }
    }
}

impl<M> Calls<M> {
    pub fn left(msg: M) -> Self {
        Self {
            left: Some(msg),
            ..Self::default()
        }
    }

    pub fn with_right(mut self, msg: M) -> Self {
        self.right = Some(msg);
        self
    }

    pub fn with_double(mut self, msg: M) -> Self {
        self.double = Some(msg);
        self
    }
}

pub const ICON_MARGIN: i32 = 2;
pub const TEXT_MARGIN: i32 = 5;
pub const CARET_WIDTH: i32 = 4;
pub const SLIDER_WIDTH: i32 = 10;

/// Texture with an optional background. The texture is borrowed unless
/// `owned`, in which case it is freed together with the widget.
#[derive(Clone, Debug)]
pub struct Picture {
    pub tex: Option<Texture>,
    /// Pixel size of the picture; reader pages are laid out from it.
    pub res: IVec2,
    pub show_bg: bool,
    pub margin: i32,
    pub owned: bool,
}

impl Picture {
    pub fn new(tex: Option<Texture>) -> Self {
        Self {
            tex,
            res: IVec2::ZERO,
            show_bg: true,
            margin: ICON_MARGIN,
            owned: false,
        }
    }

    /// Page of a reader box, freed together with the box.
    pub fn page(tex: Option<Texture>, res: IVec2) -> Self {
        Self {
            tex,
            res,
            show_bg: false,
            margin: 0,
            owned: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Button<M> {
    pub calls: Calls<M>,
    pub icon: Picture,
}

impl<M> Button<M> {
    pub fn new(calls: Calls<M>) -> Self {
        Self {
            calls,
            icon: Picture::new(None),
        }
    }

    pub fn with_icon(mut self, tex: Option<Texture>) -> Self {
        self.icon.tex = tex;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CheckBox<M> {
    pub calls: Calls<M>,
    pub on: bool,
}

/// Horizontal value picker.
#[derive(Clone, Debug)]
pub struct Slider<M> {
    pub calls: Calls<M>,
    value: i32,
    min: i32,
    max: i32,
    /// Cursor distance from the handle's left edge while dragging.
    pub(crate) grab: i32,
}

impl<M> Slider<M> {
    pub fn new(value: i32, min: i32, max: i32, calls: Calls<M>) -> Self {
        let max = max.max(min);
        Self {
            calls,
            value: value.clamp(min, max),
            min,
            max,
            grab: 0,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    pub fn set_value(&mut self, v: i32) {
        self.value = v.clamp(self.min, self.max);
    }

    /// Travel of the handle for a widget `w` wide and `h` high.
    pub fn limit(w: i32, h: i32) -> i32 {
        w - h / 2 - SLIDER_WIDTH
    }

    /// Handle's x for a widget at `x`.
    pub fn handle_x(&self, x: i32, w: i32, h: i32) -> i32 {
        let lim = Self::limit(w, h);
        if self.max == 0 || lim <= 0 {
            return x + h / 4;
        }
        x + h / 4 + (self.value as i64 * lim as i64 / self.max as i64) as i32
    }

    /// Moves the handle so its left edge is at `handle_x`.
    pub fn set_from_handle(&mut self, handle_x: i32, x: i32, w: i32, h: i32) {
        let lim = Self::limit(w, h);
        if lim <= 0 {
            return;
        }
        let v = (handle_x - x - h / 4) as i64 * self.max as i64 / lim as i64;
        self.set_value(v.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
    }
}

#[derive(Clone, Debug)]
pub struct ProgressBar {
    value: i32,
    min: i32,
    max: i32,
}

impl ProgressBar {
    pub fn new(value: i32, min: i32, max: i32) -> Self {
        let max = max.max(min);
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn set_value(&mut self, v: i32) {
        self.value = v.clamp(self.min, self.max);
    }

    pub fn set_range(&mut self, min: i32, max: i32) {
        self.min = min;
        self.max = max.max(min);
        self.set_value(self.value);
    }

    /// Filled share in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.max == self.min {
            return 0.0;
        }
        (self.value - self.min) as f32 / (self.max - self.min) as f32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One line of text, clickable like a button.
#[derive(Clone, Debug)]
pub struct Label<M> {
    pub calls: Calls<M>,
    text: String,
    pub align: Align,
    pub icon: Option<Texture>,
    pub(crate) text_tex: Option<Texture>,
    /// Widget height the text was last rendered for.
    pub(crate) tex_height: i32,
    pub(crate) stale: bool,
}

impl<M> Label<M> {
    pub fn new(text: impl Into<String>, calls: Calls<M>) -> Self {
        Self {
            calls,
            text: text.into(),
            align: Align::Left,
            icon: None,
            text_tex: None,
            tex_height: 0,
            stale: true,
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.stale = true;
        }
    }

    pub fn text_texture(&self) -> Option<Texture> {
        self.text_tex
    }
}

/// Label cycling through a fixed list; the program shows the list when the
/// left call arrives.
#[derive(Clone, Debug)]
pub struct ComboBox<M> {
    pub label: Label<M>,
    options: Vec<String>,
    current: usize,
}

impl<M> ComboBox<M> {
    pub fn new(options: Vec<String>, current: &str, calls: Calls<M>) -> Self {
        let idx = options.iter().position(|o| o == current).unwrap_or(0);
        let text = options.get(idx).cloned().unwrap_or_default();
        Self {
            label: Label::new(text, calls),
            options,
            current: idx,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_text(&self) -> &str {
        self.label.text()
    }

    pub fn set_current(&mut self, idx: usize) {
        if let Some(text) = self.options.get(idx) {
            self.current = idx;
            self.label.set_text(text.clone());
        }
    }
}

#[derive(Clone, Debug)]
pub struct LabelEdit<M> {
    pub label: Label<M>,
    pub edit: TextEdit,
    /// Confirm instead of cancel when the capture is taken away.
    pub unfocus_confirm: bool,
    /// Horizontal text scroll keeping the caret in view.
    pub(crate) text_ofs: i32,
    /// Caret x relative to the text start, as last measured.
    pub(crate) caret_px: i32,
}

impl<M> LabelEdit<M> {
    pub fn new(text: &str, ty: TextType, calls: Calls<M>) -> Self {
        let edit = TextEdit::new(text, ty);
        Self {
            label: Label::new(edit.text(), calls),
            edit,
            unfocus_confirm: true,
            text_ofs: 0,
            caret_px: 0,
        }
    }

    pub fn text(&self) -> &str {
        self.edit.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.edit.set_text(text);
        self.sync();
    }

    pub(crate) fn sync(&mut self) {
        let text = self.edit.text().to_owned();
        self.label.set_text(text);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptType {
    Keyboard,
    Joystick,
    Gamepad,
}

/// Shows and edits one slot of an action's binding.
#[derive(Clone, Debug)]
pub struct KeyGetter<M> {
    pub label: Label<M>,
    pub accept: AcceptType,
    pub action: Action,
}

pub const ELLIPSIS: &str = "...";

impl<M> KeyGetter<M> {
    pub fn new(action: Action, accept: AcceptType, bindings: &Bindings, calls: Calls<M>) -> Self {
        Self {
            label: Label::new(binding_text(bindings[action], accept), calls).aligned(Align::Center),
            accept,
            action,
        }
    }

    /// Shows the binding's current control again.
    pub fn refresh(&mut self, bindings: &Bindings) {
        self.label.set_text(binding_text(bindings[self.action], self.accept));
    }

    /// Empties the slot this getter edits.
    pub fn clear(&mut self, bindings: &mut Bindings) {
        let b = &mut bindings[self.action];
        match self.accept {
            AcceptType::Keyboard => b.clear_key(),
            AcceptType::Joystick => b.clear_joy(),
            AcceptType::Gamepad => b.clear_pad(),
        }
        self.refresh(bindings);
    }
}

/// Text a key getter shows for one slot of a binding.
pub fn binding_text(b: Binding, accept: AcceptType) -> String {
    let text = match accept {
        AcceptType::Keyboard => b.key().map(|k| k.name().to_owned()),
        AcceptType::Joystick => b.joy().map(|j| j.to_string()),
        AcceptType::Gamepad => b.pad().map(|p| p.to_string()),
    };
    text.unwrap_or_default()
}

pub enum WidgetKind<M> {
    /// Empty space.
    Spacer,
    Picture(Picture),
    Button(Button<M>),
    CheckBox(CheckBox<M>),
    Slider(Slider<M>),
    ProgressBar(ProgressBar),
    Label(Label<M>),
    ComboBox(ComboBox<M>),
    LabelEdit(LabelEdit<M>),
    KeyGetter(KeyGetter<M>),
    Layout(Layout),
    ScrollArea(ScrollArea),
    TileBox(TileBox),
    ReaderBox(ReaderBox),
}

impl<M> WidgetKind<M> {
    pub fn caps(&self) -> Caps {
        let click = Caps::DRAWABLE | Caps::CLICKABLE | Caps::NAVIGABLE;
        let scroll = Caps::DRAWABLE | Caps::CONTAINER | Caps::DRAGGABLE;
        match self {
            WidgetKind::Spacer => Caps::empty(),
            WidgetKind::Picture(_) | WidgetKind::ProgressBar(_) => Caps::DRAWABLE,
            WidgetKind::Button(_)
            | WidgetKind::CheckBox(_)
            | WidgetKind::Label(_)
            | WidgetKind::ComboBox(_) => click,
            WidgetKind::Slider(_) => click | Caps::DRAGGABLE,
            WidgetKind::LabelEdit(_) => click | Caps::TEXT_EDITABLE,
            // selecting a key getter would steal the key meant for it
            WidgetKind::KeyGetter(_) => Caps::DRAWABLE | Caps::CLICKABLE,
            WidgetKind::Layout(_) => Caps::CONTAINER,
            WidgetKind::ScrollArea(_) | WidgetKind::TileBox(_) | WidgetKind::ReaderBox(_) => scroll,
        }
    }

    pub fn is_container(&self) -> bool {
        self.caps().contains(Caps::CONTAINER)
    }

    pub fn is_navigable(&self) -> bool {
        self.caps().contains(Caps::NAVIGABLE)
    }

    pub fn calls(&self) -> Option<&Calls<M>> {
        match self {
            WidgetKind::Button(b) => Some(&b.calls),
            WidgetKind::CheckBox(c) => Some(&c.calls),
            WidgetKind::Slider(s) => Some(&s.calls),
            WidgetKind::Label(l) => Some(&l.calls),
            WidgetKind::ComboBox(c) => Some(&c.label.calls),
            WidgetKind::LabelEdit(e) => Some(&e.label.calls),
            WidgetKind::KeyGetter(k) => Some(&k.label.calls),
            _ => None,
        }
    }

    pub fn has_double_click(&self) -> bool {
        self.calls().is_some_and(|c| c.double.is_some())
    }

    pub fn label(&self) -> Option<&Label<M>> {
        match self {
            WidgetKind::Label(l) => Some(l),
            WidgetKind::ComboBox(c) => Some(&c.label),
            WidgetKind::LabelEdit(e) => Some(&e.label),
            WidgetKind::KeyGetter(k) => Some(&k.label),
            _ => None,
        }
    }

    pub fn label_mut(&mut self) -> Option<&mut Label<M>> {
        match self {
            WidgetKind::Label(l) => Some(l),
            WidgetKind::ComboBox(c) => Some(&mut c.label),
            WidgetKind::LabelEdit(e) => Some(&mut e.label),
            WidgetKind::KeyGetter(k) => Some(&mut k.label),
            _ => None,
        }
    }

    pub fn layout(&self) -> Option<&Layout> {
        match self {
            WidgetKind::Layout(l) => Some(l),
            WidgetKind::ScrollArea(s) => Some(&s.layout),
            WidgetKind::TileBox(t) => Some(&t.layout),
            WidgetKind::ReaderBox(r) => Some(&r.layout),
            _ => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut Layout> {
        match self {
            WidgetKind::Layout(l) => Some(l),
            WidgetKind::ScrollArea(s) => Some(&mut s.layout),
            WidgetKind::TileBox(t) => Some(&mut t.layout),
            WidgetKind::ReaderBox(r) => Some(&mut r.layout),
            _ => None,
        }
    }

    /// Textures that die with the widget.
    pub(crate) fn owned_textures(&self) -> impl Iterator<Item = Texture> + '_ {
        let text = self.label().and_then(|l| l.text_texture());
        let pic = match self {
            WidgetKind::Picture(p) if p.owned => p.tex,
            _ => None,
        };
        text.into_iter().chain(pic)
    }
}
