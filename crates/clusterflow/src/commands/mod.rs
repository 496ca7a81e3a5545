pub mod down;
pub mod is_up;
pub mod up;
