//! Session statistics and JSON export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Counters collected over a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Scan cycles that read a line
    pub cycles: u64,
    /// Cycles skipped because reading was disabled
    pub skipped_cycles: u64,
    /// Keyswitch events handed to the dispatcher
    pub keyswitch_events: u64,
    /// Events that only toggled a key on or off
    pub transitions: u64,
    /// Reports that went to the consumer
    pub reports_sent: u64,
    /// Flushes with nothing new to send
    pub reports_suppressed: u64,
    /// Tokens skipped as unparseable
    pub parse_errors: u64,
    /// LED telemetry lines produced
    pub led_syncs: u64,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub metadata: SessionMetadata,
    pub stats: SessionStats,
}

impl SessionReport {
    pub fn new(start_time: Instant, stats: &SessionStats) -> Self {
        let now: DateTime<Utc> = Utc::now();
        Self {
            metadata: SessionMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
            },
            stats: stats.clone(),
        }
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn json_contains_stats_and_metadata() {
        let stats = SessionStats {
            cycles: 3,
            reports_sent: 2,
            ..SessionStats::default()
        };
        let report = SessionReport::new(Instant::now(), &stats);
        let json = report.to_json().expect("JSON serialization failed");
        assert!(json.contains("\"cycles\": 3"));
        assert!(json.contains("\"reports_sent\": 2"));
        assert!(json.contains("\"generated_at\""));
        assert!(!report.metadata.version.is_empty());
    }

    #[test]
    fn export_json_writes_file() {
        let path = env::temp_dir().join(format!("virtual-keyboard-session-{}.json", std::process::id()));
        let report = SessionReport::new(Instant::now(), &SessionStats::default());
        report.export_json(&path).expect("export failed");

        let loaded: SessionReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.stats, SessionStats::default());

        let _ = fs::remove_file(&path);
    }
}
