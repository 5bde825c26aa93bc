//! Virtual USB HID keyboard: bitmap report, change-only sending and report
//! consumers.

mod consumer;
mod keyboard;
pub mod labels;
mod report;

pub use consumer::{RecordingConsumer, ReportConsumer, StandardReportConsumer};
pub use keyboard::{HidKeyboard, SendOutcome};
pub use labels::describe_report;
pub use report::{
    KeyboardReport, FIRST_MODIFIER, KEY_BYTES, LAST_KEY, LAST_MODIFIER, REPORT_LEN,
};
