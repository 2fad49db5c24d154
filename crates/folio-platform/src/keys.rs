//! winit input vocabulary to Folio's.

use folio_core::{KeyCode, Modifiers, MouseButton};
use winit::event::MouseButton as WinitButton;
use winit::keyboard::{KeyCode as Code, ModifiersState};

pub fn key_code(code: Code) -> Option<KeyCode> {
    let key = match code {
        Code::KeyA => KeyCode::A,
        Code::KeyB => KeyCode::B,
        Code::KeyC => KeyCode::C,
        Code::KeyD => KeyCode::D,
        Code::KeyE => KeyCode::E,
        Code::KeyF => KeyCode::F,
        Code::KeyG => KeyCode::G,
        Code::KeyH => KeyCode::H,
        Code::KeyI => KeyCode::I,
        Code::KeyJ => KeyCode::J,
        Code::KeyK => KeyCode::K,
        Code::KeyL => KeyCode::L,
        Code::KeyM => KeyCode::M,
        Code::KeyN => KeyCode::N,
        Code::KeyO => KeyCode::O,
        Code::KeyP => KeyCode::P,
        Code::KeyQ => KeyCode::Q,
        Code::KeyR => KeyCode::R,
        Code::KeyS => KeyCode::S,
        Code::KeyT => KeyCode::T,
        Code::KeyU => KeyCode::U,
        Code::KeyV => KeyCode::V,
        Code::KeyW => KeyCode::W,
        Code::KeyX => KeyCode::X,
        Code::KeyY => KeyCode::Y,
        Code::KeyZ => KeyCode::Z,
        Code::Digit0 => KeyCode::Num0,
        Code::Digit1 => KeyCode::Num1,
        Code::Digit2 => KeyCode::Num2,
        Code::Digit3 => KeyCode::Num3,
        Code::Digit4 => KeyCode::Num4,
        Code::Digit5 => KeyCode::Num5,
        Code::Digit6 => KeyCode::Num6,
        Code::Digit7 => KeyCode::Num7,
        Code::Digit8 => KeyCode::Num8,
        Code::Digit9 => KeyCode::Num9,
        Code::Enter => KeyCode::Return,
        Code::Escape => KeyCode::Escape,
        Code::Backspace => KeyCode::Backspace,
        Code::Tab => KeyCode::Tab,
        Code::Space => KeyCode::Space,
        Code::Minus => KeyCode::Minus,
        Code::Equal => KeyCode::Equals,
        Code::BracketLeft => KeyCode::LeftBracket,
        Code::BracketRight => KeyCode::RightBracket,
        Code::Backslash => KeyCode::Backslash,
        Code::Semicolon => KeyCode::Semicolon,
        Code::Quote => KeyCode::Apostrophe,
        Code::Backquote => KeyCode::Grave,
        Code::Comma => KeyCode::Comma,
        Code::Period => KeyCode::Period,
        Code::Slash => KeyCode::Slash,
        Code::CapsLock => KeyCode::CapsLock,
        Code::F1 => KeyCode::F1,
        Code::F2 => KeyCode::F2,
        Code::F3 => KeyCode::F3,
        Code::F4 => KeyCode::F4,
        Code::F5 => KeyCode::F5,
        Code::F6 => KeyCode::F6,
        Code::F7 => KeyCode::F7,
        Code::F8 => KeyCode::F8,
        Code::F9 => KeyCode::F9,
        Code::F10 => KeyCode::F10,
        Code::F11 => KeyCode::F11,
        Code::F12 => KeyCode::F12,
        Code::PrintScreen => KeyCode::PrintScreen,
        Code::ScrollLock => KeyCode::ScrollLock,
        Code::Pause => KeyCode::Pause,
        Code::Insert => KeyCode::Insert,
        Code::Home => KeyCode::Home,
        Code::PageUp => KeyCode::PageUp,
        Code::Delete => KeyCode::Delete,
        Code::End => KeyCode::End,
        Code::PageDown => KeyCode::PageDown,
        Code::ArrowRight => KeyCode::Right,
        Code::ArrowLeft => KeyCode::Left,
        Code::ArrowDown => KeyCode::Down,
        Code::ArrowUp => KeyCode::Up,
        Code::NumLock => KeyCode::NumLock,
        Code::NumpadDivide => KeyCode::KpDivide,
        Code::NumpadMultiply => KeyCode::KpMultiply,
        Code::NumpadSubtract => KeyCode::KpMinus,
        Code::NumpadAdd => KeyCode::KpPlus,
        Code::NumpadEnter => KeyCode::KpEnter,
        Code::Numpad0 => KeyCode::Kp0,
        Code::Numpad1 => KeyCode::Kp1,
        Code::Numpad2 => KeyCode::Kp2,
        Code::Numpad3 => KeyCode::Kp3,
        Code::Numpad4 => KeyCode::Kp4,
        Code::Numpad5 => KeyCode::Kp5,
        Code::Numpad6 => KeyCode::Kp6,
        Code::Numpad7 => KeyCode::Kp7,
        Code::Numpad8 => KeyCode::Kp8,
        Code::Numpad9 => KeyCode::Kp9,
        Code::NumpadDecimal => KeyCode::KpPeriod,
        Code::ContextMenu => KeyCode::Menu,
        Code::ControlLeft => KeyCode::LCtrl,
        Code::ShiftLeft => KeyCode::LShift,
        Code::AltLeft => KeyCode::LAlt,
        Code::SuperLeft => KeyCode::LMeta,
        Code::ControlRight => KeyCode::RCtrl,
        Code::ShiftRight => KeyCode::RShift,
        Code::AltRight => KeyCode::RAlt,
        Code::SuperRight => KeyCode::RMeta,
        _ => return None,
    };
    Some(key)
}

pub fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

pub fn mouse_button(button: WinitButton) -> Option<MouseButton> {
    match button {
        WinitButton::Left => Some(MouseButton::Left),
        WinitButton::Middle => Some(MouseButton::Middle),
        WinitButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

/// Drops what a single-line edit can't hold.
pub fn typed_text(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_follow_bindings_file() {
        let named = |c| key_code(c).map(KeyCode::name);
        assert_eq!(named(Code::KeyW), Some("W"));
        assert_eq!(named(Code::Digit7), Some("7"));
        assert_eq!(named(Code::Enter), Some("Return"));
        assert_eq!(named(Code::NumpadEnter), Some("Keypad Enter"));
        assert_eq!(named(Code::ShiftLeft), Some("Left Shift"));
        assert_eq!(named(Code::Period), Some("."));
        assert_eq!(named(Code::Fn), None);
    }

    #[test]
    fn test_modifier_state() {
        let m = modifiers(ModifiersState::CONTROL | ModifiersState::ALT);
        assert!(m.ctrl && m.alt);
        assert!(!m.shift && !m.meta);
        assert_eq!(modifiers(ModifiersState::empty()), Modifiers::NONE);
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(mouse_button(WinitButton::Right), Some(MouseButton::Right));
        assert_eq!(mouse_button(WinitButton::Back), None);
    }

    #[test]
    fn test_typed_text_drops_controls() {
        assert_eq!(typed_text("a\rb\u{8}c"), "abc");
        assert_eq!(typed_text("\n"), "");
    }
}
