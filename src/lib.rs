pub mod action;
pub mod adapter;
pub mod config;
pub mod dashboard;
pub mod debug;
pub mod device;
pub mod display;
pub mod joystick;
pub mod sequence;

pub use device::{Controller, DeviceError};
pub use sequence::{Advance, Sequence, Snapshot, Step, KONAMI_CODE};
