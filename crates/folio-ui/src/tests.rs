#[cfg(test)]
mod tests {
    use crate::*;
    use folio_core::{
        DrawCmd, DrawList, Fill, GamepadAxis, GamepadButton, Headless, IVec2, KeyCode, KeyEvent,
        MemoryClipboard, MouseButton,
    };
    use folio_files::{Action, Bindings, JoyControl, PadControl, ReadDirection};

    #[derive(Clone, Debug, PartialEq)]
    enum Msg {
        Open(usize),
        Double(usize),
        Slide,
        Edit,
        Key,
    }

    struct Env {
        ds: Headless,
        bindings: Bindings,
        clip: MemoryClipboard,
    }

    impl Env {
        fn new() -> Self {
            Self {
                ds: Headless::default(),
                bindings: Bindings::default(),
                clip: MemoryClipboard::default(),
            }
        }

        fn cx(&mut self) -> Cx<'_> {
            Cx {
                ds: &mut self.ds,
                bindings: &mut self.bindings,
                clipboard: &mut self.clip,
            }
        }
    }

    fn click(scene: &mut Scene<Msg>, env: &mut Env, button: MouseButton, pos: IVec2, clicks: u32) {
        scene.on_mouse_down(button, pos, &mut env.cx());
        scene.on_mouse_up(button, pos, clicks, &mut env.cx());
    }

    fn key(scene: &mut Scene<Msg>, env: &mut Env, k: KeyCode) {
        scene.on_key_down(&KeyEvent::new(k), &mut env.cx());
    }

    /// Ten labels of 20 px in a 200x100 window.
    fn list_scene() -> Scene<Msg> {
        let mut scene = Scene::new(IVec2::new(200, 100));
        let main = scene.set_main(WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::None)));
        for i in 0..10 {
            let calls = Calls::left(Msg::Open(i)).with_double(Msg::Double(i));
            scene
                .tree_mut()
                .push(main, 20, WidgetKind::Label(Label::new(format!("item {i}"), calls)));
        }
        scene
    }

    fn single(scene: &mut Scene<Msg>, kind: WidgetKind<Msg>) -> WidgetId {
        let main = scene.main();
        scene.tree_mut().push(main, 1.0, kind).unwrap()
    }

    /// Empty 100x40 popup in the middle of the window.
    fn popup(scene: &mut Scene<Msg>, env: &mut Env) -> WidgetId {
        scene.set_popup(
            WidgetKind::Layout(Layout::vertical(0)),
            Anchor::Center(Size::Pixels(100), Size::Pixels(40)),
            &mut env.cx(),
        )
    }

    fn text_field(text: &str) -> WidgetKind<Msg> {
        WidgetKind::LabelEdit(LabelEdit::new(text, TextType::Text, Calls::left(Msg::Edit)))
    }

    #[test]
    fn test_popup_timeout() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        popup(&mut scene, &mut env);
        scene.set_popup_timeout(2.0);
        for _ in 0..19 {
            scene.tick(0.1, |_| false);
        }
        assert!(scene.popup().is_some());
        scene.tick(0.2, |_| false);
        assert!(scene.popup().is_none());
    }

    #[test]
    fn test_click_outside_popup_dismisses() {
        let mut env = Env::new();
        let mut scene = list_scene();
        popup(&mut scene, &mut env);
        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(5, 5), 1);
        assert!(scene.popup().is_none());
        // the press only closed the popup
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn test_double_click_follows_single() {
        let mut env = Env::new();
        let mut scene = list_scene();
        let item = scene.tree().child(scene.main(), 1).unwrap();
        let pos = IVec2::new(50, 30);

        click(&mut scene, &mut env, MouseButton::Left, pos, 1);
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Open(1),
                from: item
            }]
        );

        click(&mut scene, &mut env, MouseButton::Left, pos, 2);
        assert_eq!(
            scene.take_events(),
            vec![
                UiEvent::Call {
                    msg: Msg::Open(1),
                    from: item
                },
                UiEvent::Call {
                    msg: Msg::Double(1),
                    from: item
                },
            ]
        );
    }

    #[test]
    fn test_triple_click_opens_once() {
        let mut env = Env::new();
        let mut scene = list_scene();
        let pos = IVec2::new(50, 30);
        for clicks in 1..=3 {
            click(&mut scene, &mut env, MouseButton::Left, pos, clicks);
        }
        let doubles = scene
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, UiEvent::Call { msg: Msg::Double(_), .. }))
            .count();
        assert_eq!(doubles, 1);
    }

    #[test]
    fn test_popup_takes_keyboard_from_edit() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        let hidden = single(&mut scene, text_field("abc"));
        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(50, 50), 1);
        assert_eq!(scene.capture(), Some(hidden));
        scene.on_text("d", &mut env.cx());

        let root = popup(&mut scene, &mut env);
        assert_eq!(scene.capture(), None);
        // edits confirm when they lose the keyboard
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Edit,
                from: hidden
            }]
        );
        scene.on_text("ZZ", &mut env.cx());
        key(&mut scene, &mut env, KeyCode::Backspace);
        assert_eq!(scene.tree().text(hidden), Some("abcd"));

        // the keyboard stays in the popup
        scene.set_capture(Some(hidden), &mut env.cx());
        assert_eq!(scene.capture(), None);
        let field = scene.tree_mut().push(root, 1.0, text_field("")).unwrap();
        scene.set_capture(Some(field), &mut env.cx());
        scene.on_text("ok", &mut env.cx());
        assert_eq!(scene.tree().text(field), Some("ok"));
        assert_eq!(scene.tree().text(hidden), Some("abcd"));
    }

    #[test]
    fn test_context_takes_keyboard_from_popup() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        let root = popup(&mut scene, &mut env);
        let field = scene.tree_mut().push(root, 1.0, text_field("abc")).unwrap();
        scene.set_capture(Some(field), &mut env.cx());
        assert_eq!(scene.capture(), Some(field));

        scene.set_context(
            WidgetKind::Layout(Layout::vertical(0)),
            Anchor::At(folio_core::Rect::new(0, 0, 50, 50)),
            None,
            &mut env.cx(),
        );
        assert_eq!(scene.capture(), None);
        scene.on_text("x", &mut env.cx());
        assert_eq!(scene.tree().text(field), Some("abc"));
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut env = Env::new();
        let mut scene = list_scene();
        scene.on_mouse_down(MouseButton::Left, IVec2::new(50, 90), &mut env.cx());
        scene.on_mouse_move(IVec2::new(50, 50), IVec2::new(0, -40));
        scene.on_mouse_up(MouseButton::Left, IVec2::new(50, 50), 1, &mut env.cx());
        assert!(scene.take_events().is_empty());
        // dragging pans the list under the cursor
        assert_eq!(scene.tree().scroll_offset(scene.main()), 40);
    }

    #[test]
    fn test_escape_precedence() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        popup(&mut scene, &mut env);
        let menu = scene.set_context(
            WidgetKind::Layout(Layout::vertical(0)),
            Anchor::At(folio_core::Rect::new(0, 0, 50, 50)),
            None,
            &mut env.cx(),
        );
        let edit = scene.tree_mut().push(menu, 1.0, text_field("abc")).unwrap();
        scene.set_capture(Some(edit), &mut env.cx());
        scene.on_text("x", &mut env.cx());
        assert_eq!(scene.tree().text(edit), Some("abcx"));

        scene.on_action(Action::Escape, &mut env.cx());
        assert_eq!(scene.capture(), None);
        assert_eq!(scene.tree().text(edit), Some("abc"));
        assert!(scene.context().is_some());

        scene.on_action(Action::Escape, &mut env.cx());
        assert!(scene.context().is_none() && scene.popup().is_some());

        scene.on_action(Action::Escape, &mut env.cx());
        assert!(scene.popup().is_none());
        assert!(scene.take_events().is_empty());

        scene.on_action(Action::Escape, &mut env.cx());
        assert_eq!(scene.take_events(), vec![UiEvent::Action(Action::Escape)]);
    }

    #[test]
    fn test_removed_capture_is_forgotten() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        let edit = single(&mut scene, WidgetKind::LabelEdit(LabelEdit::new("", TextType::Text, Calls::default())));
        scene.set_capture(Some(edit), &mut env.cx());
        scene.set_select(Some(edit));

        scene.tree_mut().remove(edit);
        scene.on_mouse_move(IVec2::new(1, 1), IVec2::ZERO);
        assert_eq!(scene.capture(), None);
        assert_eq!(scene.select(), None);

        let edit = single(&mut scene, WidgetKind::LabelEdit(LabelEdit::new("", TextType::Text, Calls::default())));
        scene.set_capture(Some(edit), &mut env.cx());
        scene.remove(edit);
        assert_eq!(scene.capture(), None);
    }

    #[test]
    fn test_key_navigation() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 90));
        let main = scene.main();
        let buttons: Vec<WidgetId> = (0..3)
            .filter_map(|i| {
                scene
                    .tree_mut()
                    .push(main, 30, WidgetKind::Button(Button::new(Calls::left(Msg::Open(i)))))
            })
            .collect();

        key(&mut scene, &mut env, KeyCode::Down);
        assert_eq!(scene.select(), Some(buttons[0]));
        assert!(!scene.mouse_follow());
        key(&mut scene, &mut env, KeyCode::Down);
        assert_eq!(scene.select(), Some(buttons[1]));
        key(&mut scene, &mut env, KeyCode::Return);
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Open(1),
                from: buttons[1]
            }]
        );

        key(&mut scene, &mut env, KeyCode::Up);
        key(&mut scene, &mut env, KeyCode::Up);
        assert_eq!(scene.select(), Some(buttons[0]));
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn test_nothing_to_navigate_reports_action() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 90));
        single(&mut scene, WidgetKind::Spacer);
        scene.on_action(Action::Left, &mut env.cx());
        assert_eq!(scene.take_events(), vec![UiEvent::Action(Action::Left)]);
    }

    #[test]
    fn test_slider_drag_reports_once() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        let slider = single(&mut scene, WidgetKind::Slider(Slider::new(0, 0, 180, Calls::left(Msg::Slide))));
        let value = |scene: &Scene<Msg>| match scene.tree().kind(slider) {
            Some(WidgetKind::Slider(s)) => s.value(),
            _ => -1,
        };

        // pressing off the handle centers it under the cursor
        scene.on_mouse_down(MouseButton::Left, IVec2::new(100, 10), &mut env.cx());
        assert_eq!(value(&scene), 90);
        assert_eq!(scene.capture(), Some(slider));
        scene.on_mouse_move(IVec2::new(150, 10), IVec2::new(50, 0));
        assert_eq!(value(&scene), 140);
        scene.on_mouse_move(IVec2::new(500, 10), IVec2::new(350, 0));
        assert_eq!(value(&scene), 180);
        assert!(scene.take_events().is_empty());

        scene.on_mouse_up(MouseButton::Left, IVec2::new(500, 10), 1, &mut env.cx());
        assert_eq!(scene.capture(), None);
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Slide,
                from: slider
            }]
        );
    }

    #[test]
    fn test_label_edit_confirms_on_return() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        let edit = single(&mut scene, WidgetKind::LabelEdit(LabelEdit::new("abc", TextType::Text, Calls::left(Msg::Edit))));

        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(50, 10), 1);
        assert_eq!(scene.capture(), Some(edit));
        scene.on_text("d", &mut env.cx());
        // bound keys go to the edit while it holds the capture
        key(&mut scene, &mut env, KeyCode::W);
        assert!(scene.take_events().is_empty());

        key(&mut scene, &mut env, KeyCode::Return);
        assert_eq!(scene.capture(), None);
        assert_eq!(scene.tree().text(edit), Some("abcd"));
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Edit,
                from: edit
            }]
        );
    }

    #[test]
    fn test_key_getter_rebinds() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        let getter = KeyGetter::new(Action::Hide, AcceptType::Keyboard, &env.bindings, Calls::left(Msg::Key));
        let kg = single(&mut scene, WidgetKind::KeyGetter(getter));
        assert_eq!(scene.tree().text(kg), Some("H"));

        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(50, 10), 1);
        assert_eq!(scene.tree().text(kg), Some("..."));
        key(&mut scene, &mut env, KeyCode::J);
        assert_eq!(env.bindings[Action::Hide].key(), Some(KeyCode::J));
        assert_eq!(scene.tree().text(kg), Some("J"));
        assert_eq!(scene.capture(), None);
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Key,
                from: kg
            }]
        );

        click(&mut scene, &mut env, MouseButton::Right, IVec2::new(50, 10), 1);
        assert_eq!(env.bindings[Action::Hide].key(), None);
        assert_eq!(scene.tree().text(kg), Some(""));
    }

    #[test]
    fn test_gamepad_getter_rebinds() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        let getter = KeyGetter::new(Action::ZoomIn, AcceptType::Gamepad, &env.bindings, Calls::left(Msg::Key));
        let kg = single(&mut scene, WidgetKind::KeyGetter(getter));
        assert_eq!(scene.tree().text(kg), Some("y"));

        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(50, 10), 1);
        // keys don't bind a gamepad slot
        key(&mut scene, &mut env, KeyCode::J);
        assert_eq!(scene.capture(), Some(kg));
        assert_eq!(scene.tree().text(kg), Some("..."));

        scene.on_pad(PadControl::Axis { axis: GamepadAxis::RightX, positive: false }, &mut env.cx());
        let b = env.bindings[Action::ZoomIn];
        // the axis took the slot the button had
        assert_eq!(b.pad(), Some(PadControl::Axis { axis: GamepadAxis::RightX, positive: false }));
        assert_eq!(b.key(), Some(KeyCode::E));
        assert_eq!(scene.tree().text(kg), Some("-rightx"));
        assert_eq!(scene.capture(), None);
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Call {
                msg: Msg::Key,
                from: kg
            }]
        );
        scene.on_pad(PadControl::Button(GamepadButton::Y), &mut env.cx());
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn test_joystick_getter_ignores_dead_zone() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        scene.deadzone = 8000;
        let getter = KeyGetter::new(Action::Hide, AcceptType::Joystick, &env.bindings, Calls::left(Msg::Key));
        let kg = single(&mut scene, WidgetKind::KeyGetter(getter));
        click(&mut scene, &mut env, MouseButton::Left, IVec2::new(50, 10), 1);

        scene.on_joy_axis(2, -3000, &mut env.cx());
        assert_eq!(scene.capture(), Some(kg));
        assert_eq!(env.bindings[Action::Hide].joy(), None);
        scene.on_joy_axis(2, -20000, &mut env.cx());
        assert_eq!(env.bindings[Action::Hide].joy(), Some(JoyControl::Axis { id: 2, positive: false }));
        assert_eq!(scene.tree().text(kg), Some("A -2"));
        assert_eq!(scene.capture(), None);
    }

    #[test]
    fn test_controllers_fire_actions() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        scene.on_joy(JoyControl::Button(3), &mut env.cx());
        scene.on_pad(PadControl::Button(GamepadButton::Y), &mut env.cx());
        assert_eq!(
            scene.take_events(),
            vec![UiEvent::Action(Action::ZoomIn), UiEvent::Action(Action::ZoomIn)]
        );
    }

    #[test]
    fn test_axis_dead_zone() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 20));
        scene.deadzone = 8000;
        env.bindings = Bindings::empty();
        env.bindings[Action::ZoomOut].set_gaxis(GamepadAxis::TriggerRight, true);
        env.bindings[Action::ScrollDown].set_jaxis(1, true);
        env.bindings[Action::ScrollUp].set_jaxis(1, false);

        scene.on_pad_axis(GamepadAxis::TriggerRight, 8000, &mut env.cx());
        assert!(scene.take_events().is_empty());
        assert!(!scene.axis_held(&env.bindings[Action::ZoomOut]));

        // leaving the dead zone presses once, moving further out doesn't repeat
        scene.on_pad_axis(GamepadAxis::TriggerRight, 20000, &mut env.cx());
        scene.on_pad_axis(GamepadAxis::TriggerRight, 25000, &mut env.cx());
        assert_eq!(scene.take_events(), vec![UiEvent::Action(Action::ZoomOut)]);
        assert!(scene.axis_held(&env.bindings[Action::ZoomOut]));

        scene.on_pad_axis(GamepadAxis::TriggerRight, 100, &mut env.cx());
        assert!(!scene.axis_held(&env.bindings[Action::ZoomOut]));
        scene.on_pad_axis(GamepadAxis::TriggerRight, 9000, &mut env.cx());
        assert_eq!(scene.take_events(), vec![UiEvent::Action(Action::ZoomOut)]);

        // continuous actions stay held while their axis is out
        scene.on_joy_axis(1, 12000, &mut env.cx());
        assert!(scene.axis_held(&env.bindings[Action::ScrollDown]));
        assert!(!scene.axis_held(&env.bindings[Action::ScrollUp]));
    }

    #[test]
    fn test_wheel_past_reader_ends() {
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        let reader = scene.set_main(WidgetKind::ReaderBox(ReaderBox::new(ReadDirection::TopToBottom, 0)));
        for _ in 0..2 {
            scene.tree_mut().add_page(reader, None, IVec2::new(200, 100));
        }
        scene.on_mouse_move(IVec2::new(100, 50), IVec2::ZERO);

        scene.on_wheel(IVec2::new(0, 1));
        assert_eq!(scene.take_events(), vec![UiEvent::DirLimit { next: false }]);
        scene.on_wheel(IVec2::new(0, -1));
        assert!(scene.take_events().is_empty());
        assert_eq!(scene.tree().scroll_offset(reader), 100);
        scene.on_wheel(IVec2::new(0, -1));
        assert_eq!(scene.take_events(), vec![UiEvent::DirLimit { next: true }]);
    }

    #[test]
    fn test_held_scroll_speed() {
        let mut scene = list_scene();
        let main = scene.main();
        scene.tick(0.05, |a| a == Action::ScrollDown);
        assert_eq!(scene.tree().scroll_offset(main), 80);
        scene.tick(0.025, |a| a == Action::ScrollUp || a == Action::ScrollSlow);
        assert_eq!(scene.tree().scroll_offset(main), 60);
        scene.tick(0.05, |a| a == Action::ScrollDown || a == Action::ScrollFast);
        assert_eq!(scene.tree().scroll_offset(main), 100);
    }

    fn dump(out: &DrawList) -> String {
        let lines: Vec<String> = out
            .cmds
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Rect { rect, fill, .. } => {
                    let fill = match fill {
                        Fill::Theme(c) => format!("{c:?}"),
                        Fill::Raw(_) => "raw".to_owned(),
                    };
                    format!("rect {},{} {}x{} {fill}", rect.x, rect.y, rect.w, rect.h)
                }
                DrawCmd::Texture {
                    tex,
                    rect,
                    frame,
                    tint,
                } => format!(
                    "tex#{} {},{} {}x{} in {},{} {}x{} {tint:?}",
                    tex.0, rect.x, rect.y, rect.w, rect.h, frame.x, frame.y, frame.w, frame.h
                ),
            })
            .collect();
        lines.join("\n")
    }

    #[test]
    fn test_popup_draws_over_dim() {
        let mut env = Env::new();
        let mut scene: Scene<Msg> = Scene::new(IVec2::new(200, 100));
        let root = popup(&mut scene, &mut env);
        scene
            .tree_mut()
            .push(root, 1.0, WidgetKind::Label(Label::new("ok", Calls::default())));
        scene.on_action(Action::Down, &mut env.cx());

        let mut out = DrawList::new();
        scene.draw(&mut env.ds, &mut out);
        insta::assert_snapshot!(dump(&out), @r"
        rect 0,0 200x100 raw
        rect 50,30 100x40 Normal
        rect 50,30 100x40 Select
        tex#1 55,30 40x40 in 55,30 90x40 Some(Text)
        ");
    }
}
