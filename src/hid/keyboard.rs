//! Report engine: accumulates key presses and sends only changed reports

use super::report::modifier_bit;
use super::{KeyboardReport, ReportConsumer, StandardReportConsumer};
use log::trace;
use std::mem;

/// Result of a send request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The report differed from the last one and went to the consumer
    Sent,
    /// Identical to the last sent report, nothing was done
    Suppressed,
}

/// Virtual HID keyboard.
///
/// `last_report` is always the most recently sent report and may lag
/// behind `report` by any number of presses and releases.
pub struct HidKeyboard {
    report: KeyboardReport,
    last_report: KeyboardReport,
    consumer: Box<dyn ReportConsumer>,
    host_leds: u8,
}

impl HidKeyboard {
    pub fn new(consumer: Box<dyn ReportConsumer>) -> Self {
        Self {
            report: KeyboardReport::empty(),
            last_report: KeyboardReport::empty(),
            consumer,
            host_leds: 0,
        }
    }

    pub fn begin(&mut self) {
        self.release_all();
    }

    pub fn end(&mut self) {
        self.release_all();
    }

    /// Set the bit for a key or modifier usage.
    ///
    /// Returns false (and changes nothing) for usages the report cannot carry.
    pub fn press(&mut self, usage: u8) -> bool {
        self.report.set_usage(usage, true)
    }

    /// Clear the bit for a key or modifier usage
    pub fn release(&mut self, usage: u8) -> bool {
        self.report.set_usage(usage, false)
    }

    /// Clear every key and modifier in the pending report
    pub fn release_all(&mut self) {
        self.report.clear();
    }

    /// Whether a modifier is set in the pending report
    pub fn is_modifier_active(&self, usage: u8) -> bool {
        modifier_bit(usage).is_some_and(|mask| self.report.modifiers & mask != 0)
    }

    /// Whether a modifier was set in the last sent report
    pub fn was_modifier_active(&self, usage: u8) -> bool {
        modifier_bit(usage).is_some_and(|mask| self.last_report.modifiers & mask != 0)
    }

    /// Send the pending report if it differs from the last one sent
    pub fn send_report(&mut self) -> SendOutcome {
        if self.report.as_bytes() == self.last_report.as_bytes() {
            trace!("report unchanged, not sending");
            return SendOutcome::Suppressed;
        }

        self.consumer.process_report(&self.report);
        self.last_report = self.report;
        SendOutcome::Sent
    }

    /// The pending report
    pub fn report(&self) -> &KeyboardReport {
        &self.report
    }

    /// The last report handed to the consumer
    pub fn last_report(&self) -> &KeyboardReport {
        &self.last_report
    }

    /// Swap the report consumer, returning the previous one.
    ///
    /// Report state is untouched.
    pub fn set_report_consumer(&mut self, consumer: Box<dyn ReportConsumer>) -> Box<dyn ReportConsumer> {
        mem::replace(&mut self.consumer, consumer)
    }

    /// Lock LED bits last set by the host (0 until a host sets them)
    pub fn host_leds(&self) -> u8 {
        self.host_leds
    }

    pub fn set_host_leds(&mut self, leds: u8) {
        self.host_leds = leds;
    }
}

impl Default for HidKeyboard {
    fn default() -> Self {
        Self::new(Box::new(StandardReportConsumer::default()))
    }
}
