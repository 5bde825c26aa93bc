//! Integration tests for the virtual keyboard
//!
//! These exercise the full pipeline: scan lines through the matrix engine,
//! the reference dispatcher, the HID keyboard and the report consumers.

use proptest::prelude::*;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use virtual_keyboard::dispatch::KeyswitchHandler;
use virtual_keyboard::hid::{
    describe_report, HidKeyboard, KeyboardReport, RecordingConsumer, SendOutcome,
    StandardReportConsumer,
};
use virtual_keyboard::input::ScriptSource;
use virtual_keyboard::leds::{LedStrip, Rgb};
use virtual_keyboard::matrix::{names, KeyState, MatrixEngine, ParseError, ReferenceMatrix};
use virtual_keyboard::session::SessionReport;
use virtual_keyboard::telemetry::{self, TelemetryLog, TelemetryRecord};
use virtual_keyboard::{CycleOutcome, VirtualKeyboard};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

const KEY_A: u8 = 0x04;
const KEY_S: u8 = 0x16;
const LEFT_SHIFT: u8 = 0xE1;

fn recording_device() -> (VirtualKeyboard, RecordingConsumer) {
    init_log();
    let recorder = RecordingConsumer::new();
    let keyboard = HidKeyboard::new(Box::new(recorder.clone()));
    let mut device = VirtualKeyboard::new(keyboard, LedStrip::default());
    device.setup();
    (device, recorder)
}

fn run_script(device: &mut VirtualKeyboard, script: &str) -> CycleOutcome {
    let mut source = ScriptSource::new(script.as_bytes());
    device.run(&mut source).expect("script playback failed")
}

/// Writer whose contents stay readable after it is boxed
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Matrix engine
// ---------------------------------------------------------------------------

#[test]
fn every_named_key_presses_and_releases() {
    init_log();
    for (name, pos) in names::KEY_NAMES.iter() {
        let mut matrix = ReferenceMatrix::new();

        let down = matrix.scan_line(&format!("D {}", name));
        let events: Vec<_> = down
            .events
            .iter()
            .filter(|e| e.row == pos.row && e.col == pos.col)
            .collect();
        assert_eq!(events.len(), 1, "{}", name);
        assert!(events[0].state.is_pressed(), "{}", name);

        let up = matrix.scan_line(&format!("U {}", name));
        let event = up
            .events
            .iter()
            .find(|e| e.row == pos.row && e.col == pos.col)
            .unwrap();
        assert!(event.state.was_pressed() && !event.state.is_pressed(), "{}", name);
    }
}

#[test]
fn tap_yields_press_then_release_in_one_cycle() {
    init_log();
    let mut matrix = ReferenceMatrix::new();
    let outcome = matrix.scan_line("T (1,5)");
    let bits: Vec<u8> = outcome
        .events
        .iter()
        .filter(|e| e.row == 1 && e.col == 5)
        .map(|e| e.state.bits())
        .collect();
    assert_eq!(bits, vec![0b10, 0b01]);
    assert_eq!(matrix.keystate(1, 5), Some(KeyState::NotPressed));

    // next cycle sees nothing left over
    let next = matrix.scan_line("");
    assert!(next.events.iter().all(|e| e.state.bits() == 0));
}

#[test]
fn clear_releases_every_held_key_next_cycle() {
    init_log();
    let mut matrix = ReferenceMatrix::new();
    matrix.scan_line("D a s d f (0,0) (3,15)");
    let outcome = matrix.scan_line("C");
    let released = outcome.events.iter().filter(|e| e.state.toggled_off()).count();
    assert_eq!(released, 6);
    assert!(!matrix.anything_held());
}

#[test]
fn malformed_coordinates_change_nothing() {
    init_log();
    let mut matrix = ReferenceMatrix::new();
    matrix.scan_line("D a");
    let outcome = matrix.scan_line("D (1) (99,99)");
    assert_eq!(
        outcome.errors,
        vec![
            ParseError::BadPair("(1)".into()),
            ParseError::BadCoordinates("(99,99)".into())
        ]
    );
    // only the held key is down, exactly as before
    for row in 0..4 {
        for col in 0..16 {
            assert_eq!(matrix.is_pressed(row, col), (row, col) == (2, 1));
        }
    }
}

// ---------------------------------------------------------------------------
// Report engine
// ---------------------------------------------------------------------------

#[test]
fn flush_sends_once_then_suppresses() {
    let recorder = RecordingConsumer::new();
    let mut keyboard = HidKeyboard::new(Box::new(recorder.clone()));
    keyboard.press(KEY_A);
    assert_eq!(keyboard.send_report(), SendOutcome::Sent);
    assert_eq!(keyboard.send_report(), SendOutcome::Suppressed);
    assert_eq!(recorder.len(), 1);
}

#[test]
fn release_all_then_flush_decodes_none() {
    let buffer = SharedBuffer::default();
    let consumer = StandardReportConsumer::with_output(Box::new(buffer.clone()));
    let mut keyboard = HidKeyboard::new(Box::new(consumer));

    keyboard.press(LEFT_SHIFT);
    keyboard.press(KEY_A);
    keyboard.send_report();
    keyboard.release_all();
    assert_eq!(keyboard.send_report(), SendOutcome::Sent);

    assert_eq!(
        buffer.text(),
        "Sent virtual HID report. Pressed keys: lshift a \n\
         Sent virtual HID report. Pressed keys: none\n"
    );
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn held_shift_and_tapped_key() {
    let (mut device, recorder) = recording_device();
    let outcome = run_script(&mut device, "D lshift T a\n\nU lshift\n");
    assert_eq!(outcome, CycleOutcome::EndOfInput);

    let reports = recorder.reports();
    assert_eq!(reports.len(), 3);
    assert_eq!(describe_report(&reports[0]), "lshift a ");
    assert_eq!(describe_report(&reports[1]), "lshift ");
    assert_eq!(describe_report(&reports[2]), "none");
    assert_eq!(device.stats.reports_suppressed, 0);
}

#[test]
fn unchanged_cycles_are_not_resent() {
    let (mut device, recorder) = recording_device();
    run_script(&mut device, "D a\n\n\n# just a comment\nU a\n");
    assert_eq!(recorder.len(), 2);
    assert_eq!(device.stats.cycles, 5);
    assert_eq!(device.stats.reports_suppressed, 3);
}

#[test]
fn two_keys_held_together() {
    let (mut device, recorder) = recording_device();
    run_script(&mut device, "D a s\nU a\nU s\n");
    let reports = recorder.reports();
    assert!(reports[0].contains(KEY_A) && reports[0].contains(KEY_S));
    assert!(!reports[1].contains(KEY_A) && reports[1].contains(KEY_S));
    assert!(reports[2].is_empty());
}

#[test]
fn quit_ends_the_run() {
    let (mut device, recorder) = recording_device();
    let outcome = run_script(&mut device, "D a\nQ\nU a\n");
    assert_eq!(outcome, CycleOutcome::Quit);
    assert_eq!(recorder.len(), 1);
}

#[test]
fn tap_on_a_quit_line_is_not_replayed() {
    let (mut device, recorder) = recording_device();
    assert_eq!(run_script(&mut device, "D s T a Q\n"), CycleOutcome::Quit);
    assert!(recorder.is_empty());

    // the same device keeps going after the quit request
    assert_eq!(run_script(&mut device, "\n"), CycleOutcome::EndOfInput);
    let reports = recorder.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains(KEY_S));
    assert!(!reports[0].contains(KEY_A));
}

#[test]
fn disabled_reading_ends_the_run() {
    let (mut device, recorder) = recording_device();
    device.matrix.set_read_enabled(false);
    assert_eq!(run_script(&mut device, "D a\n"), CycleOutcome::Idle);
    assert!(recorder.is_empty());

    device.matrix.set_read_enabled(true);
    assert_eq!(run_script(&mut device, "D a\n"), CycleOutcome::EndOfInput);
    assert_eq!(recorder.len(), 1);
}

#[test]
fn consumer_swap_mid_session() {
    let (mut device, first) = recording_device();
    run_script(&mut device, "D a\n");

    let second = RecordingConsumer::new();
    device.keyboard.set_report_consumer(Box::new(second.clone()));
    run_script(&mut device, "\nU a\n");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(second.last().unwrap().is_empty());
}

#[test]
fn telemetry_records_reports_and_leds() {
    init_log();
    let (tx, rx) = telemetry::channel();
    let consumer = StandardReportConsumer::silent().with_telemetry(tx.clone());
    let keyboard = HidKeyboard::new(Box::new(consumer));
    let mut leds = LedStrip::new(2, 16).with_telemetry(tx);
    leds.set_crgb_at(0, Rgb::new(0xff, 0, 0));

    let mut device = VirtualKeyboard::new(keyboard, leds);
    device.setup();
    run_script(&mut device, "a\n");

    let records: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        records,
        vec![
            TelemetryRecord::UsbEvent("Keyboard HID report; pressed keys: a ".into()),
            TelemetryRecord::LedStates("ff.0.0 0.0.0 \n".into()),
        ]
    );
}

#[test]
fn disabled_telemetry_log_still_counts() {
    let (tx, rx) = telemetry::channel();
    let mut log = TelemetryLog::disabled(rx);
    let consumer = StandardReportConsumer::silent().with_telemetry(tx);
    let mut keyboard = HidKeyboard::new(Box::new(consumer));
    keyboard.press(KEY_A);
    keyboard.send_report();
    log.drain().unwrap();
    assert_eq!(log.usb_events(), 1);
}

#[test]
fn session_report_reflects_stats() {
    let (mut device, _) = recording_device();
    run_script(&mut device, "a bogus\n");
    let report = SessionReport::new(std::time::Instant::now(), &device.stats);
    let json = report.to_json().unwrap();
    assert!(json.contains("\"parse_errors\": 1"));
    assert!(json.contains("\"reports_sent\": 1"));
}

#[test]
fn custom_handler_sees_every_event() {
    struct Counter(usize);

    impl KeyswitchHandler for Counter {
        fn handle_keyswitch_event<const ROWS: usize, const COLS: usize>(
            &mut self,
            _event: virtual_keyboard::matrix::KeyswitchEvent,
            _matrix: &mut MatrixEngine<ROWS, COLS>,
            _keyboard: &mut HidKeyboard,
        ) {
            self.0 += 1;
        }
    }

    let mut device: VirtualKeyboard<Counter> = VirtualKeyboard::with_handler(
        HidKeyboard::new(Box::new(RecordingConsumer::new())),
        LedStrip::default(),
        Counter(0),
    );
    let mut source = ScriptSource::new("a\n\n".as_bytes());
    device.run(&mut source).unwrap();
    // 64 cells per cycle plus one synthetic release for the tap
    assert_eq!(device.handler.0, 64 + 1 + 64);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn usage() -> impl Strategy<Value = u8> {
    prop_oneof![0u8..=0xDD, 0xE0u8..=0xE7]
}

proptest! {
    #[test]
    fn net_zero_cycle_is_never_sent(
        held in prop::collection::vec(usage(), 0..10),
        churn in prop::collection::vec(usage(), 1..10),
    ) {
        let recorder = RecordingConsumer::new();
        let mut keyboard = HidKeyboard::new(Box::new(recorder.clone()));
        for u in &held {
            keyboard.press(*u);
        }
        keyboard.send_report();
        let baseline = *keyboard.last_report();

        // press and release keys that were not already held
        for u in churn.iter().filter(|u| !held.contains(*u)) {
            keyboard.press(*u);
            keyboard.release(*u);
        }
        prop_assert_eq!(keyboard.send_report(), SendOutcome::Suppressed);
        prop_assert_eq!(*keyboard.last_report(), baseline);
    }

    #[test]
    fn report_holds_exactly_the_pressed_usages(usages in prop::collection::vec(usage(), 0..20)) {
        let mut report = KeyboardReport::empty();
        for u in &usages {
            prop_assert!(report.set_usage(*u, true));
        }
        for u in 0..=255u8 {
            prop_assert_eq!(report.contains(u), usages.contains(&u));
        }
        prop_assert_eq!(report.is_empty(), usages.is_empty());
    }

    #[test]
    fn mask_matches_held_grid_at_call_time(
        held in prop::collection::vec((0usize..4, 0usize..16), 0..20),
        later in prop::collection::vec((0usize..4, 0usize..16), 0..20),
    ) {
        let mut matrix = ReferenceMatrix::new();
        for (row, col) in &held {
            matrix.set_keystate(*row, *col, KeyState::Pressed).unwrap();
        }
        matrix.mask_held_keys();

        for (row, col) in &later {
            matrix.set_keystate(*row, *col, KeyState::NotPressed).unwrap();
        }
        matrix.scan_line("C");

        for row in 0..4 {
            for col in 0..16 {
                prop_assert_eq!(matrix.is_key_masked(row, col), held.contains(&(row, col)));
            }
        }
    }
}
