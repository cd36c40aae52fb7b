pub mod drive_with_joystick;
pub mod follow_trajectory;
pub mod operate;
