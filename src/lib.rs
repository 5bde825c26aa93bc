//! Virtual Keyboard - key matrix and USB HID report emulator
//!
//! Drives keyboard firmware logic from a line-oriented command stream
//! instead of real hardware: each line is one matrix scan, each scan yields
//! keyswitch events, and the resulting key presses are collected into
//! bitmap HID reports that are only sent when they change.

pub mod config;
pub mod device;
pub mod dispatch;
pub mod hid;
pub mod input;
pub mod leds;
pub mod matrix;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use device::{CycleOutcome, VirtualKeyboard};
