//! Action bindings and their `bindings.ini` encoding.
//!
//! Every action owns three independent slots: a keyboard key, one joystick
//! control (button, hat or axis direction) and one gamepad control (button or
//! axis direction). Assigning a control replaces whatever occupied the same
//! slot. The same control bound to two actions is not detected; dispatch picks
//! the first action in declaration order.

use std::fmt;
use std::ops::{Index, IndexMut};

use folio_core::{GamepadAxis, GamepadButton, Hat, KeyCode};

use crate::ini::{self, IniLine};

macro_rules! actions {
    ($($variant:ident => $name:literal),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Action {
            $($variant),*
        }

        impl Action {
            pub const ALL: &'static [Action] = &[$(Action::$variant),*];
            pub const COUNT: usize = Self::ALL.len();

            pub fn name(self) -> &'static str {
                match self {
                    $(Action::$variant => $name),*
                }
            }
        }
    };
}

actions! {
    Enter => "enter",
    Escape => "escape",
    Up => "up",
    Down => "down",
    Left => "left",
    Right => "right",
    ScrollUp => "scrollUp",
    ScrollDown => "scrollDown",
    ScrollLeft => "scrollLeft",
    ScrollRight => "scrollRight",
    CursorUp => "cursorUp",
    CursorDown => "cursorDown",
    CursorLeft => "cursorLeft",
    CursorRight => "cursorRight",
    CenterView => "centerView",
    ScrollFast => "scrollFast",
    ScrollSlow => "scrollSlow",
    NextPage => "nextPage",
    PrevPage => "prevPage",
    ZoomIn => "zoomIn",
    ZoomOut => "zoomOut",
    ZoomReset => "zoomReset",
    ToStart => "toStart",
    ToEnd => "toEnd",
    NextDir => "nextDir",
    PrevDir => "prevDir",
    Fullscreen => "fullscreen",
    Hide => "hide",
    Boss => "boss",
    Refresh => "refresh",
}

impl Action {
    pub fn from_name(s: &str) -> Option<Action> {
        Self::ALL.iter().copied().find(|a| a.name().eq_ignore_ascii_case(s))
    }

    /// Held actions polled every frame instead of fired on key down.
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            Action::ScrollUp
                | Action::ScrollDown
                | Action::ScrollLeft
                | Action::ScrollRight
                | Action::CursorUp
                | Action::CursorDown
                | Action::CursorLeft
                | Action::CursorRight
                | Action::ScrollFast
                | Action::ScrollSlow
        )
    }

    /// Modifiers that only scale other continuous actions.
    pub fn is_modifier(self) -> bool {
        matches!(self, Action::ScrollFast | Action::ScrollSlow)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoyControl {
    Button(u8),
    Hat { id: u8, hat: Hat },
    Axis { id: u8, positive: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadControl {
    Button(GamepadButton),
    Axis { axis: GamepadAxis, positive: bool },
}

/// Short text for binding editors, e.g. `B 3`, `H 0 Left-Up`, `A +1`.
impl fmt::Display for JoyControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JoyControl::Button(n) => write!(f, "B {n}"),
            JoyControl::Hat { id, hat } => write!(f, "H {id} {}", hat.name()),
            JoyControl::Axis { id, positive } => write!(f, "A {}{id}", if positive { '+' } else { '-' }),
        }
    }
}

impl fmt::Display for PadControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PadControl::Button(b) => f.write_str(b.name()),
            PadControl::Axis { axis, positive } => {
                write!(f, "{}{}", if positive { '+' } else { '-' }, axis.name())
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    key: Option<KeyCode>,
    joy: Option<JoyControl>,
    pad: Option<PadControl>,
}

impl Binding {
    pub fn key(&self) -> Option<KeyCode> {
        self.key
    }

    pub fn joy(&self) -> Option<JoyControl> {
        self.joy
    }

    pub fn pad(&self) -> Option<PadControl> {
        self.pad
    }

    pub fn set_key(&mut self, key: KeyCode) {
        self.key = Some(key);
    }

    pub fn set_jbutton(&mut self, button: u8) {
        self.joy = Some(JoyControl::Button(button));
    }

    pub fn set_jhat(&mut self, id: u8, hat: Hat) {
        self.joy = Some(JoyControl::Hat { id, hat });
    }

    pub fn set_jaxis(&mut self, id: u8, positive: bool) {
        self.joy = Some(JoyControl::Axis { id, positive });
    }

    pub fn set_gbutton(&mut self, button: GamepadButton) {
        self.pad = Some(PadControl::Button(button));
    }

    pub fn set_gaxis(&mut self, axis: GamepadAxis, positive: bool) {
        self.pad = Some(PadControl::Axis { axis, positive });
    }

    pub fn clear_key(&mut self) {
        self.key = None;
    }

    pub fn clear_joy(&mut self) {
        self.joy = None;
    }

    pub fn clear_pad(&mut self) {
        self.pad = None;
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.joy.is_none() && self.pad.is_none()
    }

    fn defaults(action: Action) -> Binding {
        use GamepadAxis as GA;
        use GamepadButton as GB;
        use KeyCode as K;

        let (key, pad) = match action {
            Action::Enter => (Some(K::Return), Some(PadControl::Button(GB::A))),
            Action::Escape => (Some(K::Escape), Some(PadControl::Button(GB::B))),
            Action::Up => (Some(K::Up), Some(PadControl::Button(GB::DpadUp))),
            Action::Down => (Some(K::Down), Some(PadControl::Button(GB::DpadDown))),
            Action::Left => (Some(K::Left), Some(PadControl::Button(GB::DpadLeft))),
            Action::Right => (Some(K::Right), Some(PadControl::Button(GB::DpadRight))),
            Action::ScrollUp => (Some(K::W), Some(PadControl::Axis { axis: GA::LeftY, positive: false })),
            Action::ScrollDown => (Some(K::S), Some(PadControl::Axis { axis: GA::LeftY, positive: true })),
            Action::ScrollLeft => (Some(K::A), Some(PadControl::Axis { axis: GA::LeftX, positive: false })),
            Action::ScrollRight => (Some(K::D), Some(PadControl::Axis { axis: GA::LeftX, positive: true })),
            Action::CursorUp => (None, Some(PadControl::Axis { axis: GA::RightY, positive: false })),
            Action::CursorDown => (None, Some(PadControl::Axis { axis: GA::RightY, positive: true })),
            Action::CursorLeft => (None, Some(PadControl::Axis { axis: GA::RightX, positive: false })),
            Action::CursorRight => (None, Some(PadControl::Axis { axis: GA::RightX, positive: true })),
            Action::CenterView => (Some(K::C), Some(PadControl::Button(GB::LeftStick))),
            Action::ScrollFast => (Some(K::LShift), Some(PadControl::Axis { axis: GA::TriggerRight, positive: true })),
            Action::ScrollSlow => (Some(K::LAlt), Some(PadControl::Axis { axis: GA::TriggerLeft, positive: true })),
            Action::NextPage => (Some(K::PageDown), Some(PadControl::Button(GB::RightShoulder))),
            Action::PrevPage => (Some(K::PageUp), Some(PadControl::Button(GB::LeftShoulder))),
            Action::ZoomIn => (Some(K::E), Some(PadControl::Button(GB::Y))),
            Action::ZoomOut => (Some(K::Q), Some(PadControl::Button(GB::X))),
            Action::ZoomReset => (Some(K::R), Some(PadControl::Button(GB::RightStick))),
            Action::ToStart => (Some(K::Home), None),
            Action::ToEnd => (Some(K::End), None),
            Action::NextDir => (Some(K::Period), None),
            Action::PrevDir => (Some(K::Comma), None),
            Action::Fullscreen => (Some(K::F11), Some(PadControl::Button(GB::Start))),
            Action::Hide => (Some(K::H), None),
            Action::Boss => (Some(K::B), Some(PadControl::Button(GB::Back))),
            Action::Refresh => (Some(K::F5), None),
        };
        let joy = match action {
            Action::Enter => Some(JoyControl::Button(0)),
            Action::Escape => Some(JoyControl::Button(1)),
            Action::Up => Some(JoyControl::Hat { id: 0, hat: Hat::UP }),
            Action::Down => Some(JoyControl::Hat { id: 0, hat: Hat::DOWN }),
            Action::Left => Some(JoyControl::Hat { id: 0, hat: Hat::LEFT }),
            Action::Right => Some(JoyControl::Hat { id: 0, hat: Hat::RIGHT }),
            Action::ScrollUp => Some(JoyControl::Axis { id: 1, positive: false }),
            Action::ScrollDown => Some(JoyControl::Axis { id: 1, positive: true }),
            Action::ScrollLeft => Some(JoyControl::Axis { id: 0, positive: false }),
            Action::ScrollRight => Some(JoyControl::Axis { id: 0, positive: true }),
            Action::NextPage => Some(JoyControl::Button(5)),
            Action::PrevPage => Some(JoyControl::Button(4)),
            Action::ZoomIn => Some(JoyControl::Button(3)),
            Action::ZoomOut => Some(JoyControl::Button(2)),
            _ => None,
        };
        Binding { key, joy, pad }
    }
}

/// Tags prefixed to each value in `bindings.ini`.
mod tag {
    pub const KEY: &str = "K_";
    pub const JBUTTON: &str = "B_";
    pub const JHAT: &str = "H_";
    pub const JAXIS_POS: &str = "A_+";
    pub const JAXIS_NEG: &str = "A_-";
    pub const GBUTTON: &str = "G_";
    pub const GAXIS_POS: &str = "X_+";
    pub const GAXIS_NEG: &str = "X_-";
    pub const HAT_SEP: char = '_';
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings {
    table: [Binding; Action::COUNT],
}

impl Default for Bindings {
    fn default() -> Self {
        let mut table = [Binding::default(); Action::COUNT];
        for (slot, action) in table.iter_mut().zip(Action::ALL) {
            *slot = Binding::defaults(*action);
        }
        Self { table }
    }
}

impl Index<Action> for Bindings {
    type Output = Binding;
    fn index(&self, a: Action) -> &Binding {
        &self.table[a as usize]
    }
}

impl IndexMut<Action> for Bindings {
    fn index_mut(&mut self, a: Action) -> &mut Binding {
        &mut self.table[a as usize]
    }
}

impl Bindings {
    /// A table where no action has any control assigned.
    pub fn empty() -> Self {
        Self {
            table: [Binding::default(); Action::COUNT],
        }
    }

    pub fn get(&self, a: Action) -> &Binding {
        &self[a]
    }

    pub fn reset(&mut self, a: Action) {
        self[a] = Binding::defaults(a);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, &Binding)> {
        Action::ALL.iter().copied().zip(self.table.iter())
    }

    pub fn action_for_key(&self, key: KeyCode) -> Option<Action> {
        self.iter().find(|(_, b)| b.key == Some(key)).map(|(a, _)| a)
    }

    pub fn action_for_joy(&self, ctl: JoyControl) -> Option<Action> {
        self.iter().find(|(_, b)| b.joy == Some(ctl)).map(|(a, _)| a)
    }

    pub fn action_for_pad(&self, ctl: PadControl) -> Option<Action> {
        self.iter().find(|(_, b)| b.pad == Some(ctl)).map(|(a, _)| a)
    }

    /// Loads over the defaults. Each line assigns one slot of one action.
    pub fn parse(text: &str) -> Self {
        let mut out = Bindings::default();
        for line in ini::lines(text) {
            let IniLine::Prop { prp, val } = IniLine::parse(line) else {
                continue;
            };
            if val.len() < 3 {
                continue;
            }
            let Some(action) = Action::from_name(&prp) else {
                log::warn!("bindings: unknown action '{prp}'");
                continue;
            };
            if !out[action].apply(&val) {
                log::warn!("bindings: invalid value '{val}' for '{prp}'");
            }
        }
        out
    }

    pub fn to_ini(&self) -> String {
        let mut out = String::new();
        for (action, b) in self.iter() {
            let name = action.name();
            if let Some(key) = b.key {
                IniLine::prop(name, format!("{}{}", tag::KEY, key.name())).write_to(&mut out);
            }
            if let Some(joy) = b.joy {
                let val = match joy {
                    JoyControl::Button(n) => format!("{}{n}", tag::JBUTTON),
                    JoyControl::Hat { id, hat } => {
                        format!("{}{id}{}{}", tag::JHAT, tag::HAT_SEP, hat.name())
                    }
                    JoyControl::Axis { id, positive } => {
                        format!("{}{id}", if positive { tag::JAXIS_POS } else { tag::JAXIS_NEG })
                    }
                };
                IniLine::prop(name, val).write_to(&mut out);
            }
            if let Some(pad) = b.pad {
                let val = match pad {
                    PadControl::Button(gb) => format!("{}{}", tag::GBUTTON, gb.name()),
                    PadControl::Axis { axis, positive } => format!(
                        "{}{}",
                        if positive { tag::GAXIS_POS } else { tag::GAXIS_NEG },
                        axis.name()
                    ),
                };
                IniLine::prop(name, val).write_to(&mut out);
            }
        }
        out
    }
}

impl Binding {
    /// Decodes one tagged value into its slot.
    fn apply(&mut self, val: &str) -> bool {
        let bytes = val.as_bytes();
        let Some(&tag) = bytes.first() else {
            return false;
        };
        // tag letter plus '_' are ASCII, so byte slicing below stays on char boundaries
        if bytes.get(1) != Some(&b'_') {
            return false;
        }
        let rest = &val[2..];
        let sign = |s: &str| match s.as_bytes().first() {
            Some(b'+') => Some(true),
            Some(b'-') => Some(false),
            _ => None,
        };
        match tag.to_ascii_uppercase() {
            b'K' => KeyCode::from_name(rest).map(|k| self.set_key(k)).is_some(),
            b'B' => rest.trim().parse().ok().map(|n| self.set_jbutton(n)).is_some(),
            b'H' => {
                let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                let id = rest[..digits].parse::<u8>().ok();
                let hat = rest[digits..]
                    .strip_prefix(tag::HAT_SEP)
                    .and_then(Hat::from_name)
                    .filter(|h| !h.is_empty());
                match (id, hat) {
                    (Some(id), Some(hat)) => {
                        self.set_jhat(id, hat);
                        true
                    }
                    _ => false,
                }
            }
            b'A' => match (sign(rest), rest.get(1..).and_then(|s| s.trim().parse::<u8>().ok())) {
                (Some(positive), Some(id)) => {
                    self.set_jaxis(id, positive);
                    true
                }
                _ => false,
            },
            b'G' => GamepadButton::from_name(rest).map(|b| self.set_gbutton(b)).is_some(),
            b'X' => match (sign(rest), rest.get(1..).and_then(GamepadAxis::from_name)) {
                (Some(positive), Some(axis)) => {
                    self.set_gaxis(axis, positive);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}
