//! Report consumers: where a sent report goes

use super::{describe_report, KeyboardReport};
use crate::telemetry::{TelemetryRecord, TelemetrySender};
use log::{debug, warn};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Receives every report the keyboard actually sends
pub trait ReportConsumer {
    fn process_report(&mut self, report: &KeyboardReport);
}

/// Prints a decoded line per report and forwards it to the telemetry log
pub struct StandardReportConsumer {
    output: Option<Box<dyn Write>>,
    telemetry: Option<TelemetrySender>,
}

impl StandardReportConsumer {
    /// Print reports to stdout
    pub fn stdout() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Print reports to any writer
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self {
            output: Some(output),
            telemetry: None,
        }
    }

    /// Print nothing; only telemetry (if attached) sees reports
    pub fn silent() -> Self {
        Self {
            output: None,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySender) -> Self {
        self.telemetry = Some(telemetry);
        self
    }
}

impl Default for StandardReportConsumer {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ReportConsumer for StandardReportConsumer {
    fn process_report(&mut self, report: &KeyboardReport) {
        let keys = describe_report(report);
        debug!("keyboard report: {}", keys);

        if let Some(output) = self.output.as_mut() {
            let written = writeln!(output, "Sent virtual HID report. Pressed keys: {}", keys)
                .and_then(|_| output.flush());
            if let Err(e) = written {
                warn!("failed to print keyboard report: {}", e);
            }
        }

        if let Some(telemetry) = &self.telemetry {
            let record = TelemetryRecord::UsbEvent(format!("Keyboard HID report; pressed keys: {}", keys));
            if telemetry.send(record).is_err() {
                warn!("telemetry log is gone, dropping keyboard report");
            }
        }
    }
}

/// Keeps every report it receives. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct RecordingConsumer {
    reports: Rc<RefCell<Vec<KeyboardReport>>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports received so far, oldest first
    pub fn reports(&self) -> Vec<KeyboardReport> {
        self.reports.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }

    pub fn last(&self) -> Option<KeyboardReport> {
        self.reports.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.reports.borrow_mut().clear();
    }
}

impl ReportConsumer for RecordingConsumer {
    fn process_report(&mut self, report: &KeyboardReport) {
        self.reports.borrow_mut().push(*report);
    }
}
