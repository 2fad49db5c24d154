//! Widget layouts of the program's screens and popups.
//!
//! Builders return `None` when the tree refused a widget, which only happens
//! when a parent id went stale; the screen is then left half built and a
//! warning logged.

use folio_core::{DrawSys, IVec2, Rect, Sink};
use folio_files::settings::{MAX_DEADZONE, memory_string};
use folio_files::{Action, Filter, LimitKind, PictureLimit, ReadDirection, file_name, list_dir};
use folio_ui::widget::TEXT_MARGIN;
use folio_ui::{
    AcceptType, Align, Anchor, Calls, CheckBox, ComboBox, KeyGetter, Label, LabelEdit, Layout,
    ProgressBar, ReaderBox, ScrollArea, Select, Size, Slider, TextType, TileBox, Tree, WidgetId,
    WidgetKind,
};

use super::{Field, Msg, Program, Screen};
use crate::host::{Host, cx};

pub(super) const LINE_HEIGHT: i32 = 30;
const TOP_HEIGHT: i32 = 40;
const SPACING: i32 = 10;
const POPUP_LINE: i32 = 40;
const PLAYER_LINE: i32 = 40;
const TILE: IVec2 = IVec2::new(200, 30);

/// Width a label needs to show `text` at `height`.
fn text_w(ds: &dyn DrawSys, text: &str, height: i32) -> i32 {
    ds.measure_text(text, height) + 2 * TEXT_MARGIN
}

fn label(tree: &mut Tree<Msg>, parent: WidgetId, size: impl Into<Size>, text: &str, msg: Msg) -> Option<WidgetId> {
    tree.push(parent, size, WidgetKind::Label(Label::new(text, Calls::left(msg))))
}

/// Row of text buttons sized to their text.
fn buttons(tree: &mut Tree<Msg>, ds: &dyn DrawSys, parent: WidgetId, height: i32, items: Vec<(&str, Msg)>) -> Option<()> {
    for (text, msg) in items {
        let w = text_w(ds, text, height);
        let kind = Label::new(text, Calls::left(msg)).aligned(Align::Center);
        tree.push(parent, w, WidgetKind::Label(kind))?;
    }
    Some(())
}

/// Places a `size` rect at `pos`, shifted back inside the window.
fn fit(pos: IVec2, size: IVec2, window: IVec2) -> Rect {
    let x = pos.x.min(window.x - size.x).max(0);
    let y = pos.y.min(window.y - size.y).max(0);
    Rect::new(x, y, size.x, size.y)
}

/// `scrollUp` becomes `Scroll up`.
pub(super) fn action_title(action: Action) -> String {
    let mut out = String::new();
    for (i, c) in action.name().chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub(super) fn limit_text(limit: &PictureLimit) -> String {
    match limit.kind {
        LimitKind::None => String::new(),
        LimitKind::Count => limit.count.to_string(),
        LimitKind::Size => memory_string(limit.size),
    }
}

/// Editor for the value of the current limit kind.
pub(super) fn limit_value(limit: &PictureLimit) -> WidgetKind<Msg> {
    let ty = match limit.kind {
        LimitKind::None => return WidgetKind::Spacer,
        LimitKind::Count => TextType::UInt,
        LimitKind::Size => TextType::Text,
    };
    WidgetKind::LabelEdit(LabelEdit::new(&limit_text(limit), ty, Calls::left(Msg::SetLimitValue)))
}

impl<S: Sink<Msg> + Clone> Program<S> {
    /// Leaves the current screen: layers and reader state go away.
    pub(super) fn enter(&mut self, screen: Screen) {
        log::debug!("screen {screen:?}");
        self.screen = screen;
        self.reading = None;
        self.combo = None;
        self.scene.close_context();
        self.scene.clear_overlay();
    }

    pub(super) fn enter_reader(&mut self) -> WidgetId {
        self.enter(Screen::Reader);
        self.scene
            .set_main(WidgetKind::ReaderBox(ReaderBox::new(self.sets.direction, self.sets.spacing)))
    }

    pub(super) fn show_books(&mut self, host: &mut Host) {
        self.enter(Screen::Books);
        if self.build_books(host).is_none() {
            log::warn!("book list left incomplete");
        }
    }

    fn build_books(&mut self, host: &mut Host) -> Option<()> {
        let books = list_dir(&self.sets.library, Filter::Dirs, self.sets.show_hidden);
        let main = self.scene.set_main(WidgetKind::Layout(Layout::vertical(0)));
        let tree = self.scene.tree_mut();
        let ds = &*host.ds;

        let top = tree.push(main, TOP_HEIGHT, WidgetKind::Layout(Layout::horizontal(SPACING)))?;
        buttons(tree, ds, top, TOP_HEIGHT, vec![("Settings", Msg::ShowSettings)])?;
        tree.push(top, 1.0, WidgetKind::Spacer)?;
        buttons(tree, ds, top, TOP_HEIGHT, vec![("Exit", Msg::Exit)])?;

        let tiles = tree.push(main, 1.0, WidgetKind::TileBox(TileBox::new(TILE, SPACING, Select::One)))?;
        for book in &books {
            let name = file_name(book);
            let calls = Calls::left(Msg::OpenBook(name.clone())).with_right(Msg::BookMenu(name.clone()));
            tree.push(tiles, 1.0, WidgetKind::Label(Label::new(name, calls)))?;
        }
        label(tree, tiles, 1.0, "Browse...", Msg::BrowseHome)?;
        log::debug!("{} books in {}", books.len(), self.sets.library.display());
        Some(())
    }

    pub(super) fn show_book_menu(&mut self, book: String, owner: WidgetId, host: &mut Host) {
        let items = vec![
            ("Continue".to_owned(), Msg::ContinueBook(book.clone())),
            ("Browse".to_owned(), Msg::OpenBook(book.clone())),
            ("Forget".to_owned(), Msg::ForgetBook(book)),
        ];
        let at = self.scene.cursor();
        if self.show_menu(items, at, 0, owner, host).is_none() {
            log::warn!("book menu left incomplete");
        }
    }

    /// Context list of clickable lines at `at`, at least `min_w` wide.
    pub(super) fn show_menu(
        &mut self,
        items: Vec<(String, Msg)>,
        at: IVec2,
        min_w: i32,
        owner: WidgetId,
        host: &mut Host,
    ) -> Option<()> {
        let ds = &*host.ds;
        let w = items
            .iter()
            .map(|(text, _)| text_w(ds, text, LINE_HEIGHT))
            .fold(min_w, i32::max);
        let h = LINE_HEIGHT * items.len() as i32;
        let rect = fit(at, IVec2::new(w, h.min(self.window.y)), self.window);
        let menu = self.scene.set_context(
            WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::One)),
            Anchor::At(rect),
            Some(owner),
            &mut cx(&mut self.bindings, host),
        );
        let tree = self.scene.tree_mut();
        for (text, msg) in items {
            label(tree, menu, LINE_HEIGHT, &text, msg)?;
        }
        Some(())
    }

    pub(super) fn show_browser(&mut self, host: &mut Host) {
        self.enter(Screen::Browser);
        if self.build_browser(host).is_none() {
            log::warn!("page browser left incomplete");
        }
    }

    fn build_browser(&mut self, host: &mut Host) -> Option<()> {
        let (dirs, pictures) = self.browser.list(self.sets.show_hidden);
        let main = self.scene.set_main(WidgetKind::Layout(Layout::vertical(0)));
        let tree = self.scene.tree_mut();
        let ds = &*host.ds;

        let path = self.browser.dir().to_string_lossy();
        let edit = LabelEdit::new(&path, TextType::Text, Calls::left(Msg::GoTo));
        tree.push(main, TOP_HEIGHT, WidgetKind::LabelEdit(edit))?;

        let body = tree.push(main, 1.0, WidgetKind::Layout(Layout::horizontal(SPACING)))?;
        let side_w = ["Exit", "Up"]
            .iter()
            .map(|t| text_w(ds, t, LINE_HEIGHT))
            .fold(0, i32::max);
        let side = tree.push(body, side_w, WidgetKind::Layout(Layout::vertical(0).with_select(Select::One)))?;
        label(tree, side, LINE_HEIGHT, "Exit", Msg::LeaveBrowser)?;
        label(tree, side, LINE_HEIGHT, "Up", Msg::GoUp)?;
        tree.push(side, 1.0, WidgetKind::Spacer)?;

        let list = tree.push(body, 1.0, WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::One)))?;
        for dir in &dirs {
            let name = file_name(dir);
            label(tree, list, LINE_HEIGHT, &name, Msg::GoIn(name.clone()))?;
        }
        for pic in &pictures {
            let name = file_name(pic);
            label(tree, list, LINE_HEIGHT, &name, Msg::OpenPicture(name.clone()))?;
        }
        Some(())
    }

    /// Column of reader controls that shows while the cursor is near the
    /// left edge of the window.
    pub(super) fn show_player(&mut self, host: &mut Host) {
        if self.build_player(host).is_none() {
            log::warn!("player bar left incomplete");
        }
    }

    fn build_player(&mut self, host: &mut Host) -> Option<()> {
        let items = [
            ("Exit", Action::Escape),
            ("Next", Action::NextDir),
            ("Prev", Action::PrevDir),
            ("+", Action::ZoomIn),
            ("-", Action::ZoomOut),
            ("Reset", Action::ZoomReset),
            ("Center", Action::CenterView),
        ];
        let ds = &*host.ds;
        let w = items
            .iter()
            .map(|(t, _)| text_w(ds, t, PLAYER_LINE))
            .fold(PLAYER_LINE, i32::max);
        let n = items.len() as i32;
        let h = (PLAYER_LINE * n + SPACING * (n - 1)).min(self.window.y);
        let bar = Rect::new(0, (self.window.y - h) / 2, w, h);
        let trigger = Rect::new(0, 0, w / 2, self.window.y);
        let root = self.scene.set_overlay(
            WidgetKind::Layout(Layout::vertical(SPACING)),
            Anchor::At(bar),
            Anchor::At(trigger),
        );
        let tree = self.scene.tree_mut();
        for (text, action) in items {
            let kind = Label::new(text, Calls::left(Msg::Act(action))).aligned(Align::Center);
            tree.push(root, PLAYER_LINE, WidgetKind::Label(kind))?;
        }
        Some(())
    }

    pub(super) fn show_settings(&mut self, host: &mut Host) {
        self.enter(Screen::Settings);
        if self.build_settings(host).is_none() {
            log::warn!("settings left incomplete");
        }
    }

    fn build_settings(&mut self, host: &mut Host) -> Option<()> {
        let main = self.scene.set_main(WidgetKind::Layout(Layout::vertical(0)));
        let tree = self.scene.tree_mut();
        let ds = &*host.ds;
        let sets = &self.sets;

        let top = tree.push(main, TOP_HEIGHT, WidgetKind::Layout(Layout::horizontal(SPACING)))?;
        buttons(tree, ds, top, TOP_HEIGHT, vec![("Library", Msg::ShowBooks), ("Reset", Msg::ResetSettings)])?;
        tree.push(top, 1.0, WidgetKind::Spacer)?;
        buttons(tree, ds, top, TOP_HEIGHT, vec![("Exit", Msg::Exit)])?;

        let list = tree.push(main, 1.0, WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::None)))?;
        let titles: Vec<String> = Action::ALL.iter().map(|&a| action_title(a)).collect();
        let title_w = titles
            .iter()
            .map(String::as_str)
            .chain(["Direction", "Picture spacing", "Picture limit", "Scroll speed", "Show hidden"])
            .map(|t| text_w(ds, t, LINE_HEIGHT))
            .fold(0, i32::max);
        let row = |tree: &mut Tree<Msg>, title: &str| -> Option<WidgetId> {
            let r = tree.push(list, LINE_HEIGHT, WidgetKind::Layout(Layout::horizontal(SPACING)))?;
            tree.push(r, title_w, WidgetKind::Label(Label::new(title, Calls::default())))?;
            Some(r)
        };
        let edit = |text: &str, ty: TextType, msg: Msg| WidgetKind::LabelEdit(LabelEdit::new(text, ty, Calls::left(msg)));
        let combo = |options: Vec<String>, current: &str, field: Field| {
            WidgetKind::ComboBox(ComboBox::new(options, current, Calls::left(Msg::OpenCombo(field))))
        };
        let check = |on: bool, msg: Msg| {
            WidgetKind::CheckBox(CheckBox {
                calls: Calls::left(msg),
                on,
            })
        };

        let r = row(tree, "Direction")?;
        let names = ReadDirection::ALL.iter().map(|d| d.name().to_owned()).collect();
        tree.push(r, 1.0, combo(names, sets.direction.name(), Field::Direction))?;

        let r = row(tree, "Zoom")?;
        tree.push(r, 1.0, edit(&sets.zoom.to_string(), TextType::UFloat, Msg::SetZoom))?;

        let r = row(tree, "Picture spacing")?;
        tree.push(r, 1.0, edit(&sets.spacing.to_string(), TextType::UInt, Msg::SetSpacing))?;

        let r = row(tree, "Picture limit")?;
        let kinds = LimitKind::ALL.iter().map(|k| k.name().to_owned()).collect();
        tree.push(r, 0.5, combo(kinds, sets.picture_limit.kind.name(), Field::Limit))?;
        tree.push(r, 0.5, limit_value(&sets.picture_limit))?;

        let r = row(tree, "Fullscreen")?;
        tree.push(r, LINE_HEIGHT, check(host.shell.is_fullscreen(), Msg::SetFullscreen))?;

        let r = row(tree, "Show hidden")?;
        tree.push(r, LINE_HEIGHT, check(sets.show_hidden, Msg::SetShowHidden))?;

        let r = row(tree, "Font")?;
        tree.push(r, 1.0, edit(&sets.font, TextType::Text, Msg::SetFont))?;

        let r = row(tree, "Theme")?;
        tree.push(r, 1.0, combo(self.themes.clone(), &sets.theme, Field::Theme))?;

        let r = row(tree, "Library")?;
        let library = sets.library.to_string_lossy();
        tree.push(r, 1.0, edit(&library, TextType::Text, Msg::SetLibrary))?;

        let r = row(tree, "Scroll speed")?;
        let speed = format!("{} {}", sets.scroll_speed[0], sets.scroll_speed[1]);
        tree.push(r, 1.0, edit(&speed, TextType::UFloatSpaced, Msg::SetScrollSpeed))?;

        let r = row(tree, "Deadzone")?;
        let dz = sets.deadzone();
        let slider = Slider::new(dz, 0, MAX_DEADZONE, Calls::left(Msg::SlideDeadzone));
        tree.push(r, 0.7, WidgetKind::Slider(slider))?;
        tree.push(r, 0.3, edit(&dz.to_string(), TextType::UInt, Msg::TypeDeadzone))?;

        let accepts = [AcceptType::Keyboard, AcceptType::Joystick, AcceptType::Gamepad];
        for (&action, title) in Action::ALL.iter().zip(&titles) {
            let r = row(tree, title)?;
            for accept in accepts {
                let getter = KeyGetter::new(action, accept, &self.bindings, Calls::left(Msg::BindingSet));
                tree.push(r, 1.0 / 3.0, WidgetKind::KeyGetter(getter))?;
            }
        }
        Some(())
    }

    fn popup_size(&self, ds: &dyn DrawSys, texts: &[&str], lines: i32) -> Anchor {
        let w = texts
            .iter()
            .map(|t| text_w(ds, t, POPUP_LINE))
            .fold(0, i32::max)
            + 2 * SPACING;
        let w = w.clamp(POPUP_LINE * 4, self.window.x.max(1));
        let h = POPUP_LINE * lines + SPACING * (lines - 1);
        Anchor::Center(Size::Pixels(w), Size::Pixels(h))
    }

    pub(super) fn show_message(&mut self, text: &str, host: &mut Host) {
        if self.build_message(text, host).is_none() {
            log::warn!("message popup left incomplete");
        }
    }

    fn build_message(&mut self, text: &str, host: &mut Host) -> Option<()> {
        log::info!("{text}");
        let anchor = self.popup_size(&*host.ds, &[text], 2);
        let root = self.scene.set_popup(
            WidgetKind::Layout(Layout::vertical(SPACING).with_select(Select::One)),
            anchor,
            &mut cx(&mut self.bindings, host),
        );
        let tree = self.scene.tree_mut();
        tree.push(root, POPUP_LINE, WidgetKind::Label(Label::new(text, Calls::default()).aligned(Align::Center)))?;
        let ok = Label::new("Okay", Calls::left(Msg::ClosePopup)).aligned(Align::Center);
        tree.push(root, POPUP_LINE, WidgetKind::Label(ok))?;
        Some(())
    }

    /// Yes/no question.
    pub(super) fn show_choice(&mut self, text: &str, yes: Msg, no: Msg, host: &mut Host) -> Option<()> {
        let anchor = self.popup_size(&*host.ds, &[text], 2);
        let root = self.scene.set_popup(
            WidgetKind::Layout(Layout::vertical(SPACING)),
            anchor,
            &mut cx(&mut self.bindings, host),
        );
        let tree = self.scene.tree_mut();
        tree.push(root, POPUP_LINE, WidgetKind::Label(Label::new(text, Calls::default()).aligned(Align::Center)))?;
        let answers = tree.push(
            root,
            POPUP_LINE,
            WidgetKind::Layout(Layout::horizontal(SPACING).with_select(Select::One)),
        )?;
        for (text, msg) in [("Yes", yes), ("No", no)] {
            let kind = Label::new(text, Calls::left(msg)).aligned(Align::Center);
            tree.push(answers, 0.5, WidgetKind::Label(kind))?;
        }
        Some(())
    }

    /// Popup with a progress bar, returning the popup and the bar.
    pub(super) fn show_progress(&mut self, text: &str, host: &mut Host) -> Option<(WidgetId, WidgetId)> {
        let anchor = self.popup_size(&*host.ds, &[text], 3);
        let root = self.scene.set_popup(
            WidgetKind::Layout(Layout::vertical(SPACING)),
            anchor,
            &mut cx(&mut self.bindings, host),
        );
        let tree = self.scene.tree_mut();
        tree.push(root, POPUP_LINE, WidgetKind::Label(Label::new(text, Calls::default()).aligned(Align::Center)))?;
        let bar = tree.push(root, POPUP_LINE, WidgetKind::ProgressBar(ProgressBar::new(0, 0, 1)))?;
        let cancel = Label::new("Cancel", Calls::left(Msg::CancelMove)).aligned(Align::Center);
        tree.push(root, POPUP_LINE, WidgetKind::Label(cancel))?;
        Some((root, bar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_titles() {
        assert_eq!(action_title(Action::ScrollUp), "Scroll up");
        assert_eq!(action_title(Action::Boss), "Boss");
        assert_eq!(action_title(Action::CenterView), "Center view");
    }

    #[test]
    fn test_fit_keeps_menus_inside() {
        let window = IVec2::new(800, 600);
        let r = fit(IVec2::new(750, 580), IVec2::new(100, 90), window);
        assert_eq!(r, Rect::new(700, 510, 100, 90));
        let r = fit(IVec2::new(10, 20), IVec2::new(100, 90), window);
        assert_eq!(r.pos(), IVec2::new(10, 20));
    }

    #[test]
    fn test_limit_text_per_kind() {
        let mut limit = PictureLimit::default();
        assert_eq!(limit_text(&limit), "128");
        limit.kind = LimitKind::Size;
        assert_eq!(limit_text(&limit), "512MB");
        limit.kind = LimitKind::None;
        assert!(matches!(limit_value(&limit), WidgetKind::Spacer));
    }
}
