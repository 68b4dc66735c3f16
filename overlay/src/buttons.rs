// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use enum_map::{Enum, EnumMap};

use platform::{EngineBridge, KeyCode, MacroId, Platform, PointerId};

use crate::geom::{fill_rect, Rect};
use crate::visibility::OverlayVisibility;

// Same translucency as the stick disks: alpha 26 idle, 77 while pressed.
const BUTTON_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 26];
const BUTTON_PRESSED_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 77];

/// Every control in the overlay, one variant per on-screen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[allow(missing_docs)]
pub enum ButtonId {
    Toggle,
    Esc,
    F3,
    AltJ,
    AltM,
    AltH,
    AltA,
    MacroC31,
    MacroC35,
    MacroC39,
    MacroC5,
    Keyboard,
    FireSecondary,
    FirePrimary,
    CyclePrimary,
    CycleSecondary,
    TargetY,
    TargetH,
    TargetB,
    TargetE,
    TargetF,
    TargetT,
    TargetS,
    Tab,
    Plus,
    Minus,
    KeyQ,
    KeyX,
    KeyM,
    KeyA,
    KeyZ,
    Return,
    Backslash,
}

/// What activating a button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Hold semantics: a bridge down on press, a bridge up on release or
    /// cancel.
    Key(KeyCode),
    /// Click semantics: fires once per activation, on release inside the
    /// button.
    Macro(MacroId),
    /// Click semantics: flips the engine's soft keyboard based on whether
    /// the IME is currently showing.
    KeyboardToggle,
    /// Click semantics: advances the overlay visibility cycle. Handled by
    /// the overlay, since the grid doesn't own the visibility state.
    VisibilityToggle,
}

/// Which visibility group a button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Shown in every state (the visibility toggle itself).
    Always,
    /// The top bar.
    TopBar,
    /// The joystick cluster.
    Joystick,
}

impl Group {
    fn visible_in(self, visibility: OverlayVisibility) -> bool {
        match self {
            Group::Always => true,
            Group::TopBar => visibility.top_bar_visible(),
            Group::Joystick => visibility.joystick_visible(),
        }
    }
}

/// A button's static description: identity, grouping, binding, and layout.
///
/// This table takes the place of looking controls up from a resource bundle
/// by name: the whole overlay is declared here, at build time, keyed by
/// [`ButtonId`].
pub struct ButtonSpec {
    /// The button this row describes. [`BUTTONS`] is ordered to match the
    /// [`ButtonId`] discriminant order.
    pub id: ButtonId,
    /// Short label, for diagnostics.
    pub label: &'static str,
    /// Which visibility group the button belongs to.
    pub group: Group,
    /// What the button does.
    pub binding: Binding,
    /// Layout as fractions of the draw area: x, y, width, height.
    frac: [f32; 4],
}

impl ButtonSpec {
    /// The button's rectangle for the given draw-area size.
    pub fn rect(&self, size: (f32, f32)) -> Rect {
        let (w, h) = size;
        let [fx, fy, fw, fh] = self.frac;
        Rect::xywh(fx * w, fy * h, fw * w, fh * h)
    }
}

/// The whole overlay, one row per control.
pub const BUTTONS: [ButtonSpec; 33] = [
    ButtonSpec {
        id: ButtonId::Toggle,
        label: "TGL",
        group: Group::Always,
        binding: Binding::VisibilityToggle,
        frac: [0.93, 0.01, 0.06, 0.06],
    },
    // Top bar: mission/system controls and macros, one row along the top.
    ButtonSpec {
        id: ButtonId::Esc,
        label: "ESC",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::ESC),
        frac: [0.01, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::F3,
        label: "F3",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::F3),
        frac: [0.09, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::AltJ,
        label: "ALT+J",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::ALT_J),
        frac: [0.17, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::AltM,
        label: "ALT+M",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::ALT_M),
        frac: [0.25, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::AltH,
        label: "ALT+H",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::ALT_H),
        frac: [0.33, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::AltA,
        label: "ALT+A",
        group: Group::TopBar,
        binding: Binding::Key(KeyCode::ALT_A),
        frac: [0.41, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::MacroC31,
        label: "C31",
        group: Group::TopBar,
        binding: Binding::Macro(MacroId::C_3_1),
        frac: [0.49, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::MacroC35,
        label: "C35",
        group: Group::TopBar,
        binding: Binding::Macro(MacroId::C_3_5),
        frac: [0.57, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::MacroC39,
        label: "C39",
        group: Group::TopBar,
        binding: Binding::Macro(MacroId::C_3_9),
        frac: [0.65, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::MacroC5,
        label: "C5",
        group: Group::TopBar,
        binding: Binding::Macro(MacroId::C_5),
        frac: [0.73, 0.01, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::Keyboard,
        label: "KYB",
        group: Group::TopBar,
        binding: Binding::KeyboardToggle,
        frac: [0.81, 0.01, 0.07, 0.06],
    },
    // Joystick cluster: fire buttons in the bottom-right corner, weapon
    // cycling above them.
    ButtonSpec {
        id: ButtonId::FireSecondary,
        label: "SPACE",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::SPACE),
        frac: [0.68, 0.78, 0.14, 0.18],
    },
    ButtonSpec {
        id: ButtonId::FirePrimary,
        label: "CTRL",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::CTRL),
        frac: [0.84, 0.78, 0.14, 0.18],
    },
    ButtonSpec {
        id: ButtonId::CyclePrimary,
        label: "CY-P",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::CYCLE_P),
        frac: [0.84, 0.68, 0.14, 0.08],
    },
    ButtonSpec {
        id: ButtonId::CycleSecondary,
        label: "CY-S",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::CYCLE_S),
        frac: [0.68, 0.68, 0.14, 0.08],
    },
    // Targeting column along the right edge.
    ButtonSpec {
        id: ButtonId::TargetY,
        label: "Y",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::Y),
        frac: [0.92, 0.10, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetH,
        label: "H",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::H),
        frac: [0.92, 0.18, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetB,
        label: "B",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::B),
        frac: [0.92, 0.26, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetE,
        label: "E",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::E),
        frac: [0.92, 0.34, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetF,
        label: "F",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::F),
        frac: [0.92, 0.42, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetT,
        label: "T",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::T),
        frac: [0.92, 0.50, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::TargetS,
        label: "S",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::S),
        frac: [0.92, 0.58, 0.07, 0.06],
    },
    // Movement and utility keys between the stick and the fire buttons.
    ButtonSpec {
        id: ButtonId::Tab,
        label: "TAB",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::TAB),
        frac: [0.30, 0.78, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::Plus,
        label: "+",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::PLUS),
        frac: [0.38, 0.78, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::Minus,
        label: "-",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::MINUS),
        frac: [0.46, 0.78, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::KeyQ,
        label: "Q",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::Q),
        frac: [0.54, 0.78, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::KeyX,
        label: "X",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::X),
        frac: [0.30, 0.86, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::KeyM,
        label: "M",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::M),
        frac: [0.38, 0.86, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::KeyA,
        label: "A",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::A),
        frac: [0.46, 0.86, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::KeyZ,
        label: "Z",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::Z),
        frac: [0.54, 0.86, 0.07, 0.06],
    },
    // The return button deliberately sends backspace; the engine build this
    // ships with expects it that way.
    ButtonSpec {
        id: ButtonId::Return,
        label: "RET",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::BACKSPACE),
        frac: [0.30, 0.70, 0.07, 0.06],
    },
    ButtonSpec {
        id: ButtonId::Backslash,
        label: "\\",
        group: Group::Joystick,
        binding: Binding::Key(KeyCode::BACKSLASH),
        frac: [0.38, 0.70, 0.07, 0.06],
    },
];

/// Looks up a button's static description.
pub fn spec(id: ButtonId) -> &'static ButtonSpec {
    // BUTTONS is ordered to match the discriminants; checked by a test.
    &BUTTONS[id.into_usize()]
}

#[derive(Debug, Default, Clone, Copy)]
struct ButtonState {
    pressed: bool,
    capture: Option<PointerId>,
}

/// The released button and whether the release still counted as a click
/// (inside the button, not cancelled).
pub struct Release {
    /// Which button the releasing pointer had pressed down on.
    pub id: ButtonId,
    /// True if click-bound actions fired.
    pub clicked: bool,
}

/// Runtime state of the button grid: which buttons are held, and by which
/// pointer.
///
/// The pressed flag is kept in lockstep with the bridge's down state, so a
/// button can never be drawn held while the engine thinks it's released, or
/// the other way around.
pub struct ButtonGrid {
    state: EnumMap<ButtonId, ButtonState>,
}

impl ButtonGrid {
    /// Creates a grid with nothing held.
    pub fn new() -> ButtonGrid {
        ButtonGrid {
            state: EnumMap::default(),
        }
    }

    /// True while the button is visually and logically held.
    pub fn is_pressed(&self, id: ButtonId) -> bool {
        self.state[id].pressed
    }

    /// The topmost visible button at (x, y), if any.
    pub fn hit_test(
        &self,
        visibility: OverlayVisibility,
        x: f32,
        y: f32,
        size: (f32, f32),
    ) -> Option<ButtonId> {
        BUTTONS
            .iter()
            .find(|spec| spec.group.visible_in(visibility) && spec.rect(size).contains(x, y))
            .map(|spec| spec.id)
    }

    /// A pointer went down on the given button. Key-bound buttons emit their
    /// bridge down immediately; click-bound buttons only arm.
    pub fn pointer_down(&mut self, id: ButtonId, pointer: PointerId, bridge: &dyn EngineBridge) {
        let state = &mut self.state[id];
        if state.capture.is_some() {
            // A second finger on a held button changes nothing.
            return;
        }
        state.capture = Some(pointer);
        state.pressed = true;
        if let Binding::Key(code) = spec(id).binding {
            bridge.on_button(code, true);
        }
    }

    /// A pointer was released at (x, y). Emits the paired bridge up for
    /// key-bound buttons, and fires click-bound actions if the release
    /// landed inside the button.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        size: (f32, f32),
        platform: &dyn Platform,
        bridge: &dyn EngineBridge,
    ) -> Option<Release> {
        let id = self.captured_by(pointer)?;
        let state = &mut self.state[id];
        state.capture = None;
        state.pressed = false;

        let button = spec(id);
        let clicked = button.rect(size).contains(x, y);
        match button.binding {
            Binding::Key(code) => bridge.on_button(code, false),
            Binding::Macro(macro_id) => {
                if clicked {
                    bridge.run_macro(macro_id);
                }
            }
            Binding::KeyboardToggle => {
                if clicked {
                    bridge.set_text_input_enabled(!platform.text_input_active());
                }
            }
            Binding::VisibilityToggle => {}
        }
        Some(Release { id, clicked })
    }

    /// A pointer's gesture was cancelled. Key-bound buttons still get their
    /// paired bridge up; click-bound buttons fire nothing.
    pub fn pointer_cancel(&mut self, pointer: PointerId, bridge: &dyn EngineBridge) -> bool {
        let Some(id) = self.captured_by(pointer) else {
            return false;
        };
        self.cancel_button(id, bridge);
        true
    }

    /// Cancels any held button whose group just became invisible, so hiding
    /// a group can't leak a bridge down without its up.
    pub fn cancel_hidden(&mut self, visibility: OverlayVisibility, bridge: &dyn EngineBridge) {
        for button in BUTTONS.iter() {
            if !button.group.visible_in(visibility) && self.state[button.id].capture.is_some() {
                self.cancel_button(button.id, bridge);
            }
        }
    }

    /// Cancels every held button. Used when the overlay is torn down.
    pub fn release_all(&mut self, bridge: &dyn EngineBridge) {
        for button in BUTTONS.iter() {
            if self.state[button.id].capture.is_some() {
                self.cancel_button(button.id, bridge);
            }
        }
    }

    /// Draws the visible buttons as translucent quads.
    pub fn render(&self, visibility: OverlayVisibility, size: (f32, f32), platform: &dyn Platform) {
        for button in BUTTONS.iter() {
            if !button.group.visible_in(visibility) {
                continue;
            }
            let color = if self.state[button.id].pressed {
                BUTTON_PRESSED_COLOR
            } else {
                BUTTON_COLOR
            };
            fill_rect(platform, &button.rect(size), color);
        }
    }

    fn captured_by(&self, pointer: PointerId) -> Option<ButtonId> {
        BUTTONS
            .iter()
            .find(|button| self.state[button.id].capture == Some(pointer))
            .map(|button| button.id)
    }

    fn cancel_button(&mut self, id: ButtonId, bridge: &dyn EngineBridge) {
        let state = &mut self.state[id];
        state.capture = None;
        state.pressed = false;
        if let Binding::Key(code) = spec(id).binding {
            bridge.on_button(code, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use enum_map::Enum;

    use platform::PointerId;

    use crate::test_support::{BridgeCall, RecordingBridge, TestPlatform};
    use crate::visibility::OverlayVisibility;

    use super::{spec, ButtonGrid, ButtonId, BUTTONS};

    const SIZE: (f32, f32) = (1000.0, 1000.0);

    fn center_of(id: ButtonId) -> (f32, f32) {
        spec(id).rect(SIZE).center()
    }

    #[test]
    fn table_order_matches_the_id_enum() {
        for (i, button) in BUTTONS.iter().enumerate() {
            assert_eq!(button.id.into_usize(), i, "{:?} is out of place", button.id);
        }
    }

    #[test]
    fn layout_rects_do_not_overlap() {
        for (i, a) in BUTTONS.iter().enumerate() {
            for b in BUTTONS.iter().skip(i + 1) {
                let ra = a.rect(SIZE);
                let rb = b.rect(SIZE);
                let disjoint = ra.x + ra.w <= rb.x
                    || rb.x + rb.w <= ra.x
                    || ra.y + ra.h <= rb.y
                    || rb.y + rb.h <= ra.y;
                assert!(disjoint, "{:?} overlaps {:?}", a.id, b.id);
            }
        }
    }

    #[test]
    fn key_button_pairs_down_with_up() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let p = PointerId::new(1);
        let (x, y) = center_of(ButtonId::Esc);

        grid.pointer_down(ButtonId::Esc, p, &bridge);
        assert!(grid.is_pressed(ButtonId::Esc));
        grid.pointer_up(p, x, y, SIZE, &platform, &bridge);
        assert!(!grid.is_pressed(ButtonId::Esc));

        assert_eq!(
            bridge.calls(),
            [BridgeCall::Button(1, true), BridgeCall::Button(1, false)]
        );
    }

    #[test]
    fn cancel_still_pairs_the_down() {
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let p = PointerId::new(4);

        grid.pointer_down(ButtonId::FirePrimary, p, &bridge);
        assert!(grid.pointer_cancel(p, &bridge));

        assert_eq!(
            bridge.calls(),
            [BridgeCall::Button(21, true), BridgeCall::Button(21, false)]
        );
    }

    #[test]
    fn macro_button_fires_once_on_click() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let p = PointerId::new(1);
        let (x, y) = center_of(ButtonId::MacroC35);

        grid.pointer_down(ButtonId::MacroC35, p, &bridge);
        let release = grid.pointer_up(p, x, y, SIZE, &platform, &bridge).unwrap();
        assert!(release.clicked);
        assert_eq!(bridge.calls(), [BridgeCall::Macro(5)]);
    }

    #[test]
    fn macro_button_does_not_fire_when_released_outside() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let p = PointerId::new(1);

        grid.pointer_down(ButtonId::MacroC31, p, &bridge);
        let release = grid.pointer_up(p, 0.0, 999.0, SIZE, &platform, &bridge).unwrap();
        assert!(!release.clicked);
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn macro_button_does_not_fire_on_cancel() {
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let p = PointerId::new(1);

        grid.pointer_down(ButtonId::MacroC39, p, &bridge);
        grid.pointer_cancel(p, &bridge);
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn keyboard_toggle_inverts_the_ime_state() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();
        let (x, y) = center_of(ButtonId::Keyboard);

        grid.pointer_down(ButtonId::Keyboard, PointerId::new(1), &bridge);
        grid.pointer_up(PointerId::new(1), x, y, SIZE, &platform, &bridge);

        platform.set_text_input_active(true);
        grid.pointer_down(ButtonId::Keyboard, PointerId::new(2), &bridge);
        grid.pointer_up(PointerId::new(2), x, y, SIZE, &platform, &bridge);

        assert_eq!(
            bridge.calls(),
            [BridgeCall::TextInput(true), BridgeCall::TextInput(false)]
        );
    }

    #[test]
    fn hiding_a_group_releases_its_held_buttons() {
        let bridge = RecordingBridge::new();
        let mut grid = ButtonGrid::new();

        grid.pointer_down(ButtonId::FireSecondary, PointerId::new(1), &bridge);
        bridge.clear();
        grid.cancel_hidden(OverlayVisibility::Hidden, &bridge);

        assert_eq!(bridge.calls(), [BridgeCall::Button(20, false)]);
        assert!(!grid.is_pressed(ButtonId::FireSecondary));
    }

    #[test]
    fn hit_testing_respects_visibility() {
        let grid = ButtonGrid::new();
        let (x, y) = center_of(ButtonId::Esc);

        assert_eq!(grid.hit_test(OverlayVisibility::Hidden, x, y, SIZE), None);
        assert_eq!(
            grid.hit_test(OverlayVisibility::TopBar, x, y, SIZE),
            Some(ButtonId::Esc)
        );

        let (tx, ty) = center_of(ButtonId::Toggle);
        assert_eq!(
            grid.hit_test(OverlayVisibility::Hidden, tx, ty, SIZE),
            Some(ButtonId::Toggle)
        );
    }
}
