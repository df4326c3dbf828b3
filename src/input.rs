use bitflags::bitflags;
use macroquad::input::{
    get_last_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use macroquad::math::{ivec2, IVec2};

bitflags! {
    /// Mouse buttons pressed this frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerButtons: u8 {
        /// Paints.
        const LEFT = 1;
        /// Unused by the editor.
        const MIDDLE = 1 << 1;
        /// Erases.
        const RIGHT = 1 << 2;
    }
}

/// Per-frame pointer and keyboard state.
pub trait InputSource {
    /// Pointer position in window pixels; may be negative off-window.
    fn pointer_position(&self) -> IVec2;

    /// Buttons that went down this frame.
    fn pressed_buttons(&self) -> PointerButtons;

    /// Next key pressed this frame, if any.
    fn key_event(&mut self) -> Option<KeyCode>;
}

/// Reads input from the macroquad window.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroquadInput;

impl InputSource for MacroquadInput {
    fn pointer_position(&self) -> IVec2 {
        let (x, y) = mouse_position();
        ivec2(x.floor() as i32, y.floor() as i32)
    }

    fn pressed_buttons(&self) -> PointerButtons {
        let mut buttons = PointerButtons::empty();
        buttons.set(PointerButtons::LEFT, is_mouse_button_pressed(MouseButton::Left));
        buttons.set(PointerButtons::MIDDLE, is_mouse_button_pressed(MouseButton::Middle));
        buttons.set(PointerButtons::RIGHT, is_mouse_button_pressed(MouseButton::Right));
        buttons
    }

    fn key_event(&mut self) -> Option<KeyCode> {
        get_last_key_pressed()
    }
}
