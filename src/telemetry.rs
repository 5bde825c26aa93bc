//! Telemetry sink for sent reports and LED states
//!
//! Producers (the report consumer and the LED strip) send records over an
//! mpsc channel; the main loop drains them into per-kind log files once per
//! cycle.

use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

/// File receiving keyboard report lines
pub const USB_EVENTS_FILE: &str = "usb_events.log";
/// File receiving LED state lines
pub const LED_STATES_FILE: &str = "led_states.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryRecord {
    /// One sent keyboard report, decoded
    UsbEvent(String),
    /// One LED telemetry line, already newline terminated
    LedStates(String),
}

pub type TelemetrySender = Sender<TelemetryRecord>;

/// Create a telemetry channel
pub fn channel() -> (TelemetrySender, Receiver<TelemetryRecord>) {
    mpsc::channel()
}

/// Drains telemetry records into log files under a results directory
pub struct TelemetryLog {
    receiver: Receiver<TelemetryRecord>,
    results_dir: Option<PathBuf>,
    usb_file: Option<File>,
    led_file: Option<File>,
    usb_events: u64,
    led_syncs: u64,
}

impl TelemetryLog {
    /// Log into `results_dir`; files are created on the first record
    pub fn new(receiver: Receiver<TelemetryRecord>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            receiver,
            results_dir: Some(results_dir.into()),
            usb_file: None,
            led_file: None,
            usb_events: 0,
            led_syncs: 0,
        }
    }

    /// Count records but write nothing
    pub fn disabled(receiver: Receiver<TelemetryRecord>) -> Self {
        Self {
            receiver,
            results_dir: None,
            usb_file: None,
            led_file: None,
            usb_events: 0,
            led_syncs: 0,
        }
    }

    pub fn results_dir(&self) -> Option<&Path> {
        self.results_dir.as_deref()
    }

    /// Write every pending record, returning how many were handled
    pub fn drain(&mut self) -> io::Result<usize> {
        let mut handled = 0;
        while let Ok(record) = self.receiver.try_recv() {
            self.write_record(&record)?;
            handled += 1;
        }
        Ok(handled)
    }

    fn write_record(&mut self, record: &TelemetryRecord) -> io::Result<()> {
        match record {
            TelemetryRecord::UsbEvent(line) => {
                self.usb_events += 1;
                if let Some(file) = Self::open(&self.results_dir, &mut self.usb_file, USB_EVENTS_FILE)? {
                    writeln!(file, "{}", line)?;
                }
            }
            TelemetryRecord::LedStates(line) => {
                self.led_syncs += 1;
                if let Some(file) = Self::open(&self.results_dir, &mut self.led_file, LED_STATES_FILE)? {
                    file.write_all(line.as_bytes())?;
                }
            }
        }
        Ok(())
    }

    fn open<'a>(
        results_dir: &Option<PathBuf>,
        slot: &'a mut Option<File>,
        name: &str,
    ) -> io::Result<Option<&'a mut File>> {
        let Some(dir) = results_dir else {
            return Ok(None);
        };
        if slot.is_none() {
            fs::create_dir_all(dir)?;
            let path = dir.join(name);
            info!("logging telemetry to {}", path.display());
            *slot = Some(OpenOptions::new().create(true).append(true).open(&path)?);
        }
        Ok(slot.as_mut())
    }

    /// Keyboard reports logged so far
    pub fn usb_events(&self) -> u64 {
        self.usb_events
    }

    /// LED lines logged so far
    pub fn led_syncs(&self) -> u64 {
        self.led_syncs
    }

    /// Flush open files
    pub fn flush(&mut self) -> io::Result<()> {
        for file in [self.usb_file.as_mut(), self.led_file.as_mut()].into_iter().flatten() {
            file.flush()?;
        }
        debug!(
            "telemetry flushed: {} reports, {} led lines",
            self.usb_events, self.led_syncs
        );
        Ok(())
    }
}
