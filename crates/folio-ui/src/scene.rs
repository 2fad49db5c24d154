//! The scene owns the widget tree and routes window input into it.
//!
//! Four layers share the tree: the main layout, an optional overlay shown
//! while the cursor is near it, an optional popup and an optional context
//! menu. Input goes to the topmost layer that wants it. Widgets never call
//! back into the program; what they report is queued as [`UiEvent`]s for the
//! program to drain after each event.

use std::collections::HashMap;

use folio_core::{
    Clipboard, Direction, DrawList, DrawSys, GamepadAxis, IVec2, KeyCode, KeyEvent, MouseButton,
    POPUP_DIM, Rect,
};
use folio_files::settings::DEFAULT_DEADZONE;
use folio_files::{Action, Binding, Bindings, JoyControl, PadControl};

use crate::WidgetId;
use crate::draw::DrawState;
use crate::layout::Layout;
use crate::scroll::{Scroll, WHEEL_FACTOR};
use crate::textedit::EditOutcome;
use crate::tree::Tree;
use crate::widget::{AcceptType, CARET_WIDTH, ELLIPSIS, SLIDER_WIDTH, Size, TEXT_MARGIN, WidgetKind};

/// How far the cursor may travel between press and release for a click.
pub const CLICK_THRESHOLD: f32 = 8.0;
/// Speed change while the fast or slow scroll action is held.
pub const SCROLL_FACTOR: f32 = 2.0;
/// Scroll speed at which one wheel notch moves [`WHEEL_FACTOR`] pixels.
pub const BASE_SCROLL_SPEED: f32 = 1600.0;

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent<M> {
    /// A widget's call fired.
    Call { msg: M, from: WidgetId },
    /// A bound action nothing in the scene consumed.
    Action(Action),
    /// The reader was pushed past its first (`next == false`) or last page.
    DirLimit { next: bool },
}

/// Services input handlers may need.
pub struct Cx<'a> {
    pub ds: &'a mut dyn DrawSys,
    pub bindings: &'a mut Bindings,
    pub clipboard: &'a mut dyn Clipboard,
}

/// Where a layer sits in the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Fill,
    /// Centered, sized in pixels or as a share of the window.
    Center(Size, Size),
    At(Rect),
}

impl Anchor {
    pub fn resolve(self, window: IVec2) -> Rect {
        let extent = |s: Size, full: i32| match s {
            Size::Pixels(px) => px,
            Size::Percent(p) => (p * full as f32).round() as i32,
        };
        match self {
            Anchor::Fill => Rect::from_parts(IVec2::ZERO, window),
            Anchor::Center(w, h) => {
                let (w, h) = (extent(w, window.x), extent(h, window.y));
                Rect::new((window.x - w) / 2, (window.y - h) / 2, w, h)
            }
            Anchor::At(r) => r,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Layer {
    root: WidgetId,
    anchor: Anchor,
}

struct Popup {
    layer: Layer,
    timeout: Option<f32>,
}

struct Context {
    layer: Layer,
    owner: Option<WidgetId>,
}

struct Overlay {
    layer: Layer,
    /// Region that brings the overlay up; it stays while the cursor is over it.
    trigger: Anchor,
    shown: bool,
}

/// Where a mouse button went down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClickStamp {
    pub widget: Option<WidgetId>,
    /// Scrolling container the press landed in, panned by dragging.
    pub area: Option<WidgetId>,
    pub pos: IVec2,
}

/// A controller axis, keyed for its last reported direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Stick {
    Joy(u8),
    Pad(GamepadAxis),
}

#[derive(Clone, Copy)]
enum Click {
    Left,
    Right,
    Double,
}

pub struct Scene<M> {
    tree: Tree<M>,
    window: IVec2,
    main: WidgetId,
    popup: Option<Popup>,
    context: Option<Context>,
    overlay: Option<Overlay>,
    select: Option<WidgetId>,
    capture: Option<WidgetId>,
    stamps: [ClickStamp; MouseButton::COUNT],
    pressed: [bool; MouseButton::COUNT],
    cursor: IVec2,
    mouse_follow: bool,
    /// Pixels per second for held scroll actions, horizontal then vertical.
    pub scroll_speed: [f32; 2],
    scroll_rem: [f32; 2],
    /// Axis values at or below this magnitude count as centered.
    pub deadzone: i32,
    /// Axes pushed past the dead zone and which way.
    sticks: HashMap<Stick, bool>,
    outbox: Vec<UiEvent<M>>,
}

impl<M: Clone> Scene<M> {
    pub fn new(window: IVec2) -> Self {
        let mut tree = Tree::new();
        let main = tree.add_root(WidgetKind::Layout(Layout::vertical(0)));
        tree.set_root_rect(main, Rect::from_parts(IVec2::ZERO, window));
        Self {
            tree,
            window,
            main,
            popup: None,
            context: None,
            overlay: None,
            select: None,
            capture: None,
            stamps: [ClickStamp::default(); MouseButton::COUNT],
            pressed: [false; MouseButton::COUNT],
            cursor: IVec2::ZERO,
            mouse_follow: true,
            scroll_speed: [BASE_SCROLL_SPEED; 2],
            scroll_rem: [0.0; 2],
            deadzone: DEFAULT_DEADZONE,
            sticks: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree<M> {
        &self.tree
    }

    /// Direct access for building and updating widgets. Ids removed through
    /// it are forgotten by the scene on its next event.
    pub fn tree_mut(&mut self) -> &mut Tree<M> {
        &mut self.tree
    }

    pub fn main(&self) -> WidgetId {
        self.main
    }

    pub fn window(&self) -> IVec2 {
        self.window
    }

    pub fn cursor(&self) -> IVec2 {
        self.cursor
    }

    pub fn select(&self) -> Option<WidgetId> {
        self.select
    }

    pub fn capture(&self) -> Option<WidgetId> {
        self.capture
    }

    pub fn mouse_follow(&self) -> bool {
        self.mouse_follow
    }

    pub fn popup(&self) -> Option<WidgetId> {
        self.popup.as_ref().map(|p| p.layer.root)
    }

    pub fn context(&self) -> Option<WidgetId> {
        self.context.as_ref().map(|c| c.layer.root)
    }

    pub fn overlay(&self) -> Option<WidgetId> {
        self.overlay.as_ref().map(|o| o.layer.root)
    }

    pub fn overlay_shown(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.shown)
    }

    pub fn stamp(&self, button: MouseButton) -> ClickStamp {
        self.stamps[button.index()]
    }

    pub fn take_events(&mut self) -> Vec<UiEvent<M>> {
        std::mem::take(&mut self.outbox)
    }

    /// Replaces the main layout, returning the new root.
    pub fn set_main(&mut self, kind: WidgetKind<M>) -> WidgetId {
        self.tree.remove(self.main);
        self.main = self.tree.add_root(kind);
        self.tree
            .set_root_rect(self.main, Rect::from_parts(IVec2::ZERO, self.window));
        self.prune();
        self.main
    }

    pub fn resize(&mut self, window: IVec2) {
        self.window = window;
        self.tree
            .set_root_rect(self.main, Rect::from_parts(IVec2::ZERO, window));
        let layers = [
            self.popup.as_ref().map(|p| p.layer),
            self.context.as_ref().map(|c| c.layer),
            self.overlay.as_ref().map(|o| o.layer),
        ];
        for l in layers.into_iter().flatten() {
            self.tree.set_root_rect(l.root, l.anchor.resolve(window));
        }
        self.tree.refresh_scrolls();
    }

    fn add_layer(&mut self, kind: WidgetKind<M>, anchor: Anchor) -> Layer {
        let root = self.tree.add_root(kind);
        self.tree.set_root_rect(root, anchor.resolve(self.window));
        Layer { root, anchor }
    }

    /// Shows a popup in place of any previous one. Whoever held the keyboard
    /// lets go of it; [`Scene::set_capture`] can hand it to a widget of the
    /// popup once it is built.
    pub fn set_popup(&mut self, kind: WidgetKind<M>, anchor: Anchor, cx: &mut Cx) -> WidgetId {
        self.close_popup();
        self.release_capture(cx);
        let layer = self.add_layer(kind, anchor);
        self.popup = Some(Popup { layer, timeout: None });
        layer.root
    }

    /// Closes the current popup after `secs` of ticks.
    pub fn set_popup_timeout(&mut self, secs: f32) {
        if let Some(p) = &mut self.popup {
            p.timeout = Some(secs);
        }
    }

    pub fn close_popup(&mut self) {
        if let Some(p) = self.popup.take() {
            self.tree.remove(p.layer.root);
            self.prune();
        }
    }

    /// Shows a context menu in place of any previous one. A click on `owner`
    /// dismisses the menu and still reaches the owner. Like a popup, the menu
    /// takes the keyboard from whoever held it.
    pub fn set_context(
        &mut self,
        kind: WidgetKind<M>,
        anchor: Anchor,
        owner: Option<WidgetId>,
        cx: &mut Cx,
    ) -> WidgetId {
        self.close_context();
        self.release_capture(cx);
        let layer = self.add_layer(kind, anchor);
        self.context = Some(Context { layer, owner });
        layer.root
    }

    pub fn close_context(&mut self) {
        if let Some(c) = self.context.take() {
            self.tree.remove(c.layer.root);
            self.prune();
        }
    }

    pub fn set_overlay(&mut self, kind: WidgetKind<M>, anchor: Anchor, trigger: Anchor) -> WidgetId {
        self.clear_overlay();
        let layer = self.add_layer(kind, anchor);
        self.overlay = Some(Overlay {
            layer,
            trigger,
            shown: false,
        });
        layer.root
    }

    pub fn clear_overlay(&mut self) {
        if let Some(o) = self.overlay.take() {
            self.tree.remove(o.layer.root);
            self.prune();
        }
    }

    /// Removes a widget, or a whole layer when given a layer's root.
    pub fn remove(&mut self, id: WidgetId) {
        if id == self.main {
            self.set_main(WidgetKind::Layout(Layout::vertical(0)));
        } else if self.popup() == Some(id) {
            self.close_popup();
        } else if self.context() == Some(id) {
            self.close_context();
        } else if self.overlay() == Some(id) {
            self.clear_overlay();
        } else {
            self.tree.remove(id);
            self.prune();
        }
    }

    /// Forgets ids that left the tree.
    fn prune(&mut self) {
        let tree = &self.tree;
        let alive = |id: &mut Option<WidgetId>| {
            if id.is_some_and(|w| !tree.contains(w)) {
                *id = None;
            }
        };
        alive(&mut self.select);
        alive(&mut self.capture);
        for s in &mut self.stamps {
            alive(&mut s.widget);
            alive(&mut s.area);
        }
        if let Some(c) = &mut self.context
            && c.owner.is_some_and(|o| !tree.contains(o))
        {
            c.owner = None;
        }
    }

    pub fn set_select(&mut self, id: Option<WidgetId>) {
        self.select = id.filter(|&w| self.tree.contains(w));
        if let Some(w) = self.select {
            self.tree.scroll_into_view(w);
        }
    }

    /// Gives `id` the keyboard, or with `None` takes it away from whoever
    /// holds it, confirming or cancelling their edit.
    pub fn set_capture(&mut self, id: Option<WidgetId>, cx: &mut Cx) {
        match id.filter(|&w| self.takes_keys(w)) {
            Some(w) => self.begin_capture(w, cx),
            None => self.release_capture(cx),
        }
    }

    /// Whether `id` is in the layer the keyboard goes to: the context, else
    /// the popup, else the main layout or its overlay.
    fn takes_keys(&self, id: WidgetId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        match (&self.context, &self.popup) {
            (Some(c), _) => self.tree.is_within(id, c.layer.root),
            (None, Some(p)) => self.tree.is_within(id, p.layer.root),
            (None, None) => true,
        }
    }

    /// Layer that takes keyboard navigation.
    fn active_root(&self) -> WidgetId {
        self.context
            .as_ref()
            .map(|c| c.layer.root)
            .or(self.popup())
            .unwrap_or(self.main)
    }

    fn hit_base(&self, pos: IVec2) -> Option<WidgetId> {
        if let Some(o) = &self.overlay
            && o.shown
            && let Some(w) = self.tree.hit(o.layer.root, pos)
        {
            return Some(w);
        }
        self.tree.hit(self.main, pos)
    }

    /// Widget under `pos` in the topmost layer that takes the mouse.
    pub fn hit(&self, pos: IVec2) -> Option<WidgetId> {
        if let Some(c) = &self.context
            && let Some(w) = self.tree.hit(c.layer.root, pos)
        {
            return Some(w);
        }
        match &self.popup {
            Some(p) => self.tree.hit(p.layer.root, pos),
            None => self.hit_base(pos),
        }
    }

    /// Target of a press. The outer `None` means the press only dismissed a
    /// context or popup.
    fn press_target(&mut self, pos: IVec2) -> Option<Option<WidgetId>> {
        if let Some(c) = &self.context {
            let (root, owner) = (c.layer.root, c.owner);
            if let Some(w) = self.tree.hit(root, pos) {
                return Some(Some(w));
            }
            self.close_context();
            if owner.is_none() || self.hit(pos) != owner {
                return None;
            }
        }
        if let Some(p) = &self.popup {
            let hit = self.tree.hit(p.layer.root, pos);
            if hit.is_none() {
                self.close_popup();
                return None;
            }
            return Some(hit);
        }
        Some(self.hit_base(pos))
    }

    fn scroll_area_of(&self, id: WidgetId) -> Option<WidgetId> {
        if self.tree.is_scrollable(id) {
            Some(id)
        } else {
            self.tree.scroll_ancestor(id)
        }
    }

    fn is_edit_capture(&self, id: WidgetId) -> bool {
        matches!(
            self.tree.kind(id),
            Some(WidgetKind::LabelEdit(_) | WidgetKind::KeyGetter(_))
        )
    }

    fn emit(&mut self, from: WidgetId, click: Click) {
        let msg = self
            .tree
            .kind(from)
            .and_then(WidgetKind::calls)
            .and_then(|c| match click {
                Click::Left => c.left.clone(),
                Click::Right => c.right.clone(),
                Click::Double => c.double.clone(),
            });
        if let Some(msg) = msg {
            self.outbox.push(UiEvent::Call { msg, from });
        }
    }

    // mouse

    pub fn on_mouse_down(&mut self, button: MouseButton, pos: IVec2, cx: &mut Cx) {
        self.prune();
        self.cursor = pos;
        self.pressed[button.index()] = true;
        let Some(hit) = self.press_target(pos) else {
            self.stamps[button.index()] = ClickStamp::default();
            return;
        };
        if let Some(cap) = self.capture
            && hit != Some(cap)
        {
            self.release_capture(cx);
        }
        self.stamps[button.index()] = ClickStamp {
            widget: hit,
            area: hit.and_then(|w| self.scroll_area_of(w)),
            pos,
        };
        if let Some(w) = hit
            && button == MouseButton::Left
        {
            self.on_hold(w, pos, cx);
        }
    }

    fn on_hold(&mut self, w: WidgetId, pos: IVec2, cx: &mut Cx) {
        let rect = self.tree.rect(w);
        if matches!(self.tree.kind(w), Some(WidgetKind::Slider(_))) {
            if self.capture.is_some_and(|c| c != w) {
                self.release_capture(cx);
            }
            if let Some(WidgetKind::Slider(s)) = self.tree.kind_mut(w) {
                let hx = s.handle_x(rect.x, rect.w, rect.h);
                if pos.x >= hx && pos.x < hx + SLIDER_WIDTH {
                    s.grab = pos.x - hx;
                } else {
                    s.grab = SLIDER_WIDTH / 2;
                    s.set_from_handle(pos.x - s.grab, rect.x, rect.w, rect.h);
                }
            }
            self.capture = Some(w);
        } else if self.tree.is_scrollable(w) && self.tree.bar_press(w, pos) {
            if self.capture.is_some_and(|c| c != w) {
                self.release_capture(cx);
            }
            self.capture = Some(w);
        }
    }

    /// `clicks` is the platform's click count for this press. Only the
    /// second click of a run fires the double call.
    pub fn on_mouse_up(&mut self, button: MouseButton, pos: IVec2, clicks: u32, cx: &mut Cx) {
        self.prune();
        self.cursor = pos;
        self.pressed[button.index()] = false;
        let stamp = std::mem::take(&mut self.stamps[button.index()]);
        if let Some(cap) = self.capture {
            self.on_undrag(cap, button);
        }
        let Some(w) = stamp.widget else {
            return;
        };
        let d = pos - stamp.pos;
        if (d.x as f32).hypot(d.y as f32) > CLICK_THRESHOLD || self.hit(pos) != Some(w) {
            return;
        }
        self.on_click(w, button, cx);
        if button == MouseButton::Left
            && clicks == 2
            && self.tree.kind(w).is_some_and(WidgetKind::has_double_click)
        {
            self.emit(w, Click::Double);
        }
    }

    fn on_undrag(&mut self, cap: WidgetId, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        if matches!(self.tree.kind(cap), Some(WidgetKind::Slider(_))) {
            self.capture = None;
            self.emit(cap, Click::Left);
        } else if self.tree.scroll_state(cap).is_some_and(Scroll::is_dragging) {
            self.tree.bar_release(cap);
            self.capture = None;
        }
    }

    fn on_click(&mut self, w: WidgetId, button: MouseButton, cx: &mut Cx) {
        match button {
            MouseButton::Left => match self.tree.kind_mut(w) {
                Some(WidgetKind::CheckBox(c)) => {
                    c.on = !c.on;
                    self.emit(w, Click::Left);
                }
                Some(WidgetKind::Button(_) | WidgetKind::Label(_) | WidgetKind::ComboBox(_)) => {
                    self.tree.select_in_parent(w);
                    self.emit(w, Click::Left);
                }
                Some(WidgetKind::LabelEdit(_) | WidgetKind::KeyGetter(_)) => self.begin_capture(w, cx),
                _ => {}
            },
            MouseButton::Right => {
                if let Some(WidgetKind::KeyGetter(k)) = self.tree.kind_mut(w) {
                    k.clear(cx.bindings);
                    if self.capture == Some(w) {
                        self.capture = None;
                    }
                }
                self.emit(w, Click::Right);
            }
            MouseButton::Middle => {}
        }
    }

    pub fn on_mouse_move(&mut self, pos: IVec2, delta: IVec2) {
        self.prune();
        self.cursor = pos;
        self.mouse_follow = true;
        self.update_overlay(pos);
        if let Some(cap) = self.capture
            && self.drag(cap, pos)
        {
            return;
        }
        let left = MouseButton::Left.index();
        if self.pressed[left] {
            if let Some(area) = self.stamps[left].area {
                self.tree.scroll_by(area, -delta);
            }
            return;
        }
        if let Some(w) = self.hit(pos)
            && self.tree.kind(w).is_some_and(WidgetKind::is_navigable)
        {
            self.select = Some(w);
        }
    }

    fn drag(&mut self, cap: WidgetId, pos: IVec2) -> bool {
        let rect = self.tree.rect(cap);
        if let Some(WidgetKind::Slider(s)) = self.tree.kind_mut(cap) {
            s.set_from_handle(pos.x - s.grab, rect.x, rect.w, rect.h);
            return true;
        }
        if self.tree.scroll_state(cap).is_some_and(Scroll::is_dragging) {
            self.tree.bar_drag(cap, pos);
            return true;
        }
        false
    }

    fn update_overlay(&mut self, pos: IVec2) {
        if let Some(o) = &mut self.overlay {
            let over = self.tree.rect(o.layer.root).contains(pos);
            let trigger = o.trigger.resolve(self.window).contains(pos);
            o.shown = trigger || (o.shown && over);
        }
    }

    /// `notches` counts wheel steps: positive `y` away from the user, positive
    /// `x` to the right.
    pub fn on_wheel(&mut self, notches: IVec2) {
        self.prune();
        let root = self.active_root();
        let Some(area) = self.tree.scroll_area_at(root, self.cursor) else {
            return;
        };
        let step = WHEEL_FACTOR as f32 * self.scroll_speed[1] / BASE_SCROLL_SPEED;
        let mut d = IVec2::new(
            (notches.x as f32 * step).round() as i32,
            (-notches.y as f32 * step).round() as i32,
        );
        if let Some(g) = self.tree.scroll_geom(area)
            && g.horizontal
            && d.x == 0
        {
            d = IVec2::new(if g.mirrored { -d.y } else { d.y }, 0);
        }
        if let Some(next) = self.tree.scroll_by(area, d)
            && self.tree.reader(area).is_some()
        {
            self.outbox.push(UiEvent::DirLimit { next });
        }
    }

    // keyboard and controllers

    pub fn on_key_down(&mut self, ev: &KeyEvent, cx: &mut Cx) {
        self.prune();
        if let Some(cap) = self.capture
            && self.capture_key(cap, ev, cx)
        {
            return;
        }
        if ev.is_repeat {
            return;
        }
        if let Some(action) = cx.bindings.action_for_key(ev.key) {
            self.on_action(action, cx);
        }
    }

    pub fn on_text(&mut self, text: &str, cx: &mut Cx) {
        self.prune();
        let Some(cap) = self.capture else {
            return;
        };
        if let Some(WidgetKind::LabelEdit(e)) = self.tree.kind_mut(cap) {
            e.edit.insert(text);
            e.sync();
            self.update_caret(cap, &*cx.ds);
        }
    }

    pub fn on_joy(&mut self, ctl: JoyControl, cx: &mut Cx) {
        self.prune();
        if let Some(cap) = self.capture
            && let Some(WidgetKind::KeyGetter(k)) = self.tree.kind_mut(cap)
            && k.accept == AcceptType::Joystick
        {
            let b = &mut cx.bindings[k.action];
            match ctl {
                JoyControl::Button(n) => b.set_jbutton(n),
                JoyControl::Hat { id, hat } => b.set_jhat(id, hat),
                JoyControl::Axis { id, positive } => b.set_jaxis(id, positive),
            }
            k.refresh(cx.bindings);
            self.capture = None;
            self.emit(cap, Click::Left);
            return;
        }
        if let Some(action) = cx.bindings.action_for_joy(ctl) {
            self.on_action(action, cx);
        }
    }

    pub fn on_pad(&mut self, ctl: PadControl, cx: &mut Cx) {
        self.prune();
        if let Some(cap) = self.capture
            && let Some(WidgetKind::KeyGetter(k)) = self.tree.kind_mut(cap)
            && k.accept == AcceptType::Gamepad
        {
            let b = &mut cx.bindings[k.action];
            match ctl {
                PadControl::Button(gb) => b.set_gbutton(gb),
                PadControl::Axis { axis, positive } => b.set_gaxis(axis, positive),
            }
            k.refresh(cx.bindings);
            self.capture = None;
            self.emit(cap, Click::Left);
            return;
        }
        if let Some(action) = cx.bindings.action_for_pad(ctl) {
            self.on_action(action, cx);
        }
    }

    /// Raw joystick axis position. Leaving the dead zone or crossing over
    /// presses the axis control once; it stays held until the axis returns.
    pub fn on_joy_axis(&mut self, id: u8, value: i16, cx: &mut Cx) {
        if let Some(positive) = self.push_stick(Stick::Joy(id), value) {
            self.on_joy(JoyControl::Axis { id, positive }, cx);
        }
    }

    /// Raw gamepad axis position, handled like [`Scene::on_joy_axis`].
    pub fn on_pad_axis(&mut self, axis: GamepadAxis, value: i16, cx: &mut Cx) {
        if let Some(positive) = self.push_stick(Stick::Pad(axis), value) {
            self.on_pad(PadControl::Axis { axis, positive }, cx);
        }
    }

    /// Records where `stick` points. Returns its direction when it just left
    /// the dead zone or changed sides.
    fn push_stick(&mut self, stick: Stick, value: i16) -> Option<bool> {
        if i32::from(value).abs() <= self.deadzone {
            self.sticks.remove(&stick);
            return None;
        }
        let positive = value > 0;
        (self.sticks.insert(stick, positive) != Some(positive)).then_some(positive)
    }

    /// Whether an axis control of `b` is pushed its way right now.
    pub fn axis_held(&self, b: &Binding) -> bool {
        let joy = match b.joy() {
            Some(JoyControl::Axis { id, positive }) => self.sticks.get(&Stick::Joy(id)) == Some(&positive),
            _ => false,
        };
        let pad = match b.pad() {
            Some(PadControl::Axis { axis, positive }) => self.sticks.get(&Stick::Pad(axis)) == Some(&positive),
            _ => false,
        };
        joy || pad
    }

    /// Returns whether the captured widget took the key.
    fn capture_key(&mut self, cap: WidgetId, ev: &KeyEvent, cx: &mut Cx) -> bool {
        enum Done {
            Keep,
            Release { changed: bool },
        }
        let done = match self.tree.kind_mut(cap) {
            Some(WidgetKind::LabelEdit(e)) => {
                let out = e.edit.on_key(ev, cx.clipboard);
                let done = match out {
                    EditOutcome::Confirm => {
                        e.edit.confirm();
                        Done::Release { changed: true }
                    }
                    EditOutcome::Cancel => {
                        e.edit.cancel();
                        Done::Release { changed: false }
                    }
                    EditOutcome::Ignored | EditOutcome::Moved | EditOutcome::Edited => Done::Keep,
                };
                e.sync();
                if matches!(done, Done::Release { .. }) {
                    e.text_ofs = 0;
                }
                done
            }
            Some(WidgetKind::KeyGetter(k)) => match ev.key {
                KeyCode::Escape => {
                    k.refresh(cx.bindings);
                    Done::Release { changed: false }
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    k.clear(cx.bindings);
                    Done::Release { changed: true }
                }
                key if k.accept == AcceptType::Keyboard => {
                    cx.bindings[k.action].set_key(key);
                    k.refresh(cx.bindings);
                    Done::Release { changed: true }
                }
                // waiting for a controller
                _ => Done::Keep,
            },
            _ => return false,
        };
        match done {
            Done::Keep => self.update_caret(cap, &*cx.ds),
            Done::Release { changed } => {
                self.capture = None;
                if changed {
                    self.emit(cap, Click::Left);
                }
            }
        }
        true
    }

    fn begin_capture(&mut self, w: WidgetId, cx: &mut Cx) {
        if self.capture == Some(w) {
            return;
        }
        self.release_capture(cx);
        match self.tree.kind_mut(w) {
            Some(WidgetKind::LabelEdit(e)) => e.edit.begin(),
            Some(WidgetKind::KeyGetter(k)) => k.label.set_text(ELLIPSIS),
            _ => {}
        }
        log::debug!("capture taken by {w:?}");
        self.capture = Some(w);
        self.update_caret(w, &*cx.ds);
    }

    /// Takes the capture away: edits confirm or cancel per the widget's
    /// setting, key getters go back to showing their binding.
    fn release_capture(&mut self, cx: &mut Cx) {
        let Some(cap) = self.capture.take() else {
            return;
        };
        let confirmed = match self.tree.kind_mut(cap) {
            Some(WidgetKind::LabelEdit(e)) => {
                let confirm = e.unfocus_confirm;
                if confirm {
                    e.edit.confirm();
                } else {
                    e.edit.cancel();
                }
                e.sync();
                e.text_ofs = 0;
                confirm
            }
            Some(WidgetKind::KeyGetter(k)) => {
                k.refresh(cx.bindings);
                false
            }
            _ => {
                self.tree.bar_release(cap);
                false
            }
        };
        if confirmed {
            self.emit(cap, Click::Left);
        }
    }

    fn cancel_capture(&mut self, cx: &mut Cx) {
        let Some(cap) = self.capture.take() else {
            return;
        };
        match self.tree.kind_mut(cap) {
            Some(WidgetKind::LabelEdit(e)) => {
                e.edit.cancel();
                e.sync();
                e.text_ofs = 0;
            }
            Some(WidgetKind::KeyGetter(k)) => k.refresh(cx.bindings),
            _ => self.tree.bar_release(cap),
        }
    }

    /// Keeps the caret of a captured edit inside the widget.
    fn update_caret(&mut self, w: WidgetId, ds: &dyn DrawSys) {
        let rect = self.tree.rect(w);
        let Some(WidgetKind::LabelEdit(e)) = self.tree.kind_mut(w) else {
            return;
        };
        let before = e.edit.text().get(..e.edit.caret()).unwrap_or("");
        let px = ds.measure_text(before, rect.h);
        let room = rect.w - 2 * TEXT_MARGIN - CARET_WIDTH;
        let x = px + e.text_ofs;
        if x < 0 {
            e.text_ofs = -px;
        } else if x > room {
            e.text_ofs = room - px;
        }
        e.caret_px = px;
    }

    /// Handles a bound action as if its control was pressed.
    pub fn on_action(&mut self, action: Action, cx: &mut Cx) {
        let dir = match action {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            if !self.navigate(dir) {
                self.outbox.push(UiEvent::Action(action));
            }
            return;
        }
        match action {
            Action::Escape => self.escape(cx),
            Action::Enter => {
                let root = self.active_root();
                match self.select.filter(|&s| self.tree.is_within(s, root)) {
                    Some(s) => self.on_click(s, MouseButton::Left, cx),
                    None => self.outbox.push(UiEvent::Action(action)),
                }
            }
            a if a.is_continuous() => self.check_limit(a),
            a => self.outbox.push(UiEvent::Action(a)),
        }
    }

    fn escape(&mut self, cx: &mut Cx) {
        if self.capture.is_some() {
            self.cancel_capture(cx);
        } else if self.context.is_some() {
            self.close_context();
        } else if self.popup.is_some() {
            self.close_popup();
        } else {
            self.outbox.push(UiEvent::Action(Action::Escape));
        }
    }

    /// Moves `select`. Returns false when the active layer has nothing to
    /// select at all.
    fn navigate(&mut self, dir: Direction) -> bool {
        let root = self.active_root();
        let from = self.select.filter(|&s| self.tree.is_within(s, root));
        let next = match from {
            Some(s) => self.tree.navigate(s, dir),
            None => self.tree.first_navigable(root),
        };
        if from.is_none() && next.is_none() {
            return false;
        }
        self.mouse_follow = false;
        if let Some(n) = next {
            self.select = Some(n);
            self.tree.scroll_into_view(n);
        }
        true
    }

    /// A scroll key pressed while the reader sits at an end asks for the
    /// neighbouring directory.
    fn check_limit(&mut self, action: Action) {
        let d = match action {
            Action::ScrollUp => IVec2::new(0, -1),
            Action::ScrollDown => IVec2::new(0, 1),
            Action::ScrollLeft => IVec2::new(-1, 0),
            Action::ScrollRight => IVec2::new(1, 0),
            _ => return,
        };
        let Some(area) = self.focused_area() else {
            return;
        };
        let Some(rb) = self.tree.reader(area) else {
            return;
        };
        let mut along = d.along(rb.is_horizontal());
        if rb.is_mirrored() {
            along = -along;
        }
        if along != 0 && self.tree.at_limit(area, along > 0) {
            self.outbox.push(UiEvent::DirLimit { next: along > 0 });
        }
    }

    /// Scrolling container held scroll actions move: the selection's while
    /// navigating by keys, else the one under the cursor, else the first one
    /// in the active layer.
    pub fn focused_area(&self) -> Option<WidgetId> {
        let root = self.active_root();
        if !self.mouse_follow
            && let Some(area) = self
                .select
                .filter(|&s| self.tree.is_within(s, root))
                .and_then(|s| self.scroll_area_of(s))
        {
            return Some(area);
        }
        self.tree
            .scroll_area_at(root, self.cursor)
            .or_else(|| self.first_scrollable(root))
    }

    fn first_scrollable(&self, id: WidgetId) -> Option<WidgetId> {
        if self.tree.is_scrollable(id) {
            return Some(id);
        }
        self.tree
            .children(id)
            .iter()
            .find_map(|&c| self.first_scrollable(c))
    }

    /// Advances timers and applies held scroll actions; `held` reports the
    /// controls currently down.
    pub fn tick(&mut self, dt: f32, held: impl Fn(Action) -> bool) {
        self.prune();
        let expired = match &mut self.popup {
            Some(Popup {
                timeout: Some(t), ..
            }) => {
                *t -= dt;
                *t <= 0.0
            }
            _ => false,
        };
        if expired {
            log::debug!("popup timed out");
            self.close_popup();
        }

        if self.capture.is_some_and(|c| self.is_edit_capture(c)) {
            return;
        }
        let axis = |neg: Action, pos: Action| (held(pos) as i32 - held(neg) as i32) as f32;
        let v = [
            axis(Action::ScrollLeft, Action::ScrollRight),
            axis(Action::ScrollUp, Action::ScrollDown),
        ];
        if v == [0.0; 2] {
            self.scroll_rem = [0.0; 2];
            return;
        }
        let mut factor = 1.0;
        if held(Action::ScrollFast) {
            factor *= SCROLL_FACTOR;
        } else if held(Action::ScrollSlow) {
            factor /= SCROLL_FACTOR;
        }
        let Some(area) = self.focused_area() else {
            return;
        };
        let mut d = [0; 2];
        for i in 0..2 {
            let want = v[i] * self.scroll_speed[i] * factor * dt + self.scroll_rem[i];
            d[i] = want.trunc() as i32;
            self.scroll_rem[i] = want - d[i] as f32;
        }
        self.tree.scroll_by(area, IVec2::new(d[0], d[1]));
    }

    /// Renders the layers into `out`, bottom to top.
    pub fn draw(&mut self, ds: &mut dyn DrawSys, out: &mut DrawList) {
        self.prune();
        out.clear();
        let overlay = self
            .overlay
            .as_ref()
            .filter(|o| o.shown)
            .map(|o| o.layer.root);
        let layers = [Some(self.main), overlay, self.popup(), self.context()];
        self.tree.free_garbage(ds);
        for root in layers.into_iter().flatten() {
            self.tree.refresh_text(root, ds);
        }

        let st = DrawState {
            select: self.select,
            capture: self.capture,
        };
        let ds = &*ds;
        self.tree.draw_widget(self.main, ds, &st, out);
        if let Some(o) = overlay {
            self.tree.draw_panel(o, ds, &st, out);
        }
        if let Some(p) = self.popup() {
            let full = Rect::from_parts(IVec2::ZERO, self.window);
            out.rect(full, full, POPUP_DIM);
            self.tree.draw_panel(p, ds, &st, out);
        }
        if let Some(c) = self.context() {
            self.tree.draw_panel(c, ds, &st, out);
        }
    }
}
