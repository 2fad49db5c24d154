use bitflags::bitflags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool, // Cmd on Mac, Win key on Windows
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn ctrl_only(&self) -> bool {
        self.ctrl && !self.shift && !self.alt
    }

    pub fn alt_only(&self) -> bool {
        self.alt && !self.shift && !self.ctrl
    }
}

/// Four-way direction used by navigation and reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_horizontal(self) -> bool {
        !self.is_vertical()
    }

    /// Whether moving this way decreases the coordinate.
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

macro_rules! key_codes {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Physical key, named the way it is written to `bindings.ini`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum KeyCode {
            $($variant),*
        }

        impl KeyCode {
            pub const ALL: &'static [KeyCode] = &[$(KeyCode::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(KeyCode::$variant => $name),*
                }
            }
        }
    };
}

key_codes! {
    A => "A", B => "B", C => "C", D => "D", E => "E", F => "F", G => "G",
    H => "H", I => "I", J => "J", K => "K", L => "L", M => "M", N => "N",
    O => "O", P => "P", Q => "Q", R => "R", S => "S", T => "T", U => "U",
    V => "V", W => "W", X => "X", Y => "Y", Z => "Z",
    Num0 => "0", Num1 => "1", Num2 => "2", Num3 => "3", Num4 => "4",
    Num5 => "5", Num6 => "6", Num7 => "7", Num8 => "8", Num9 => "9",
    Return => "Return",
    Escape => "Escape",
    Backspace => "Backspace",
    Tab => "Tab",
    Space => "Space",
    Minus => "-",
    Equals => "=",
    LeftBracket => "[",
    RightBracket => "]",
    Backslash => "\\",
    Semicolon => ";",
    Apostrophe => "'",
    Grave => "`",
    Comma => ",",
    Period => ".",
    Slash => "/",
    CapsLock => "CapsLock",
    F1 => "F1", F2 => "F2", F3 => "F3", F4 => "F4", F5 => "F5", F6 => "F6",
    F7 => "F7", F8 => "F8", F9 => "F9", F10 => "F10", F11 => "F11", F12 => "F12",
    PrintScreen => "PrintScreen",
    ScrollLock => "ScrollLock",
    Pause => "Pause",
    Insert => "Insert",
    Home => "Home",
    PageUp => "PageUp",
    Delete => "Delete",
    End => "End",
    PageDown => "PageDown",
    Right => "Right",
    Left => "Left",
    Down => "Down",
    Up => "Up",
    NumLock => "Numlock",
    KpDivide => "Keypad /",
    KpMultiply => "Keypad *",
    KpMinus => "Keypad -",
    KpPlus => "Keypad +",
    KpEnter => "Keypad Enter",
    Kp0 => "Keypad 0", Kp1 => "Keypad 1", Kp2 => "Keypad 2", Kp3 => "Keypad 3",
    Kp4 => "Keypad 4", Kp5 => "Keypad 5", Kp6 => "Keypad 6", Kp7 => "Keypad 7",
    Kp8 => "Keypad 8", Kp9 => "Keypad 9",
    KpPeriod => "Keypad .",
    Menu => "Menu",
    LCtrl => "Left Ctrl",
    LShift => "Left Shift",
    LAlt => "Left Alt",
    LMeta => "Left GUI",
    RCtrl => "Right Ctrl",
    RShift => "Right Shift",
    RAlt => "Right Alt",
    RMeta => "Right GUI",
}

impl KeyCode {
    /// Case-insensitive lookup by [`KeyCode::name`].
    pub fn from_name(name: &str) -> Option<KeyCode> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            is_repeat: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

bitflags! {
    /// Joystick hat position, same bit layout as SDL.
    pub struct Hat: u8 {
        const UP = 0x01;
        const RIGHT = 0x02;
        const DOWN = 0x04;
        const LEFT = 0x08;
        const RIGHT_UP = Self::RIGHT.bits() | Self::UP.bits();
        const RIGHT_DOWN = Self::RIGHT.bits() | Self::DOWN.bits();
        const LEFT_UP = Self::LEFT.bits() | Self::UP.bits();
        const LEFT_DOWN = Self::LEFT.bits() | Self::DOWN.bits();
    }
}

impl Hat {
    const NAMES: [(Hat, &'static str); 9] = [
        (Hat::empty(), "Center"),
        (Hat::UP, "Up"),
        (Hat::RIGHT, "Right"),
        (Hat::DOWN, "Down"),
        (Hat::LEFT, "Left"),
        (Hat::RIGHT_UP, "Right-Up"),
        (Hat::RIGHT_DOWN, "Right-Down"),
        (Hat::LEFT_UP, "Left-Up"),
        (Hat::LEFT_DOWN, "Left-Down"),
    ];

    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(h, _)| *h == self)
            .map(|(_, n)| *n)
            .unwrap_or("Center")
    }

    pub fn from_name(name: &str) -> Option<Hat> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(h, _)| *h)
    }
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $ty:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant),*
        }

        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<$ty> {
                Self::ALL.iter().copied().find(|v| v.name().eq_ignore_ascii_case(name))
            }
        }
    };
}

named_enum!(
    /// Standardized gamepad button.
    GamepadButton {
        A => "a",
        B => "b",
        X => "x",
        Y => "y",
        Back => "back",
        Guide => "guide",
        Start => "start",
        LeftStick => "leftstick",
        RightStick => "rightstick",
        LeftShoulder => "leftshoulder",
        RightShoulder => "rightshoulder",
        DpadUp => "dpup",
        DpadDown => "dpdown",
        DpadLeft => "dpleft",
        DpadRight => "dpright",
    }
);

named_enum!(
    /// Standardized gamepad axis.
    GamepadAxis {
        LeftX => "leftx",
        LeftY => "lefty",
        RightX => "rightx",
        RightY => "righty",
        TriggerLeft => "lefttrigger",
        TriggerRight => "righttrigger",
    }
);
