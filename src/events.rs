//! Inbound payload types delivered by the printer host, plus the print state
//! vocabulary shared between the lifecycle controller and the metrics layer.

use serde::{Deserialize, Deserializer};

/// Discrete print lifecycle states exposed through the state metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintState {
    Init,
    Printing,
    Done,
    Failed,
    Cancelled,
    Idle,
}

impl PrintState {
    pub const ALL: [PrintState; 6] = [
        PrintState::Init,
        PrintState::Printing,
        PrintState::Done,
        PrintState::Failed,
        PrintState::Cancelled,
        PrintState::Idle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrintState::Init => "init",
            PrintState::Printing => "printing",
            PrintState::Done => "done",
            PrintState::Failed => "failed",
            PrintState::Cancelled => "cancelled",
            PrintState::Idle => "idle",
        }
    }
}

/// Lifecycle events as the host reports them.
///
/// `PrintStarted` metadata fields default to empty strings when the host
/// omits them; the whole metadata set is replaced, never merged.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum PrinterEvent {
    PrintStarted {
        #[serde(default)]
        name: String,
        #[serde(default)]
        path: String,
        #[serde(default)]
        origin: String,
    },
    PrintFailed,
    PrintDone,
    PrintCancelled,
    ZChange {
        new: f64,
    },
}

/// One tool's `(actual, target)` temperature pair.
///
/// Either half may be missing or non-numeric in the host's report; such
/// halves deserialize to `None` and are skipped rather than failing the
/// remaining tools.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TemperatureReading(
    #[serde(default, deserialize_with = "lenient_f64")] pub Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")] pub Option<f64>,
);

impl TemperatureReading {
    pub fn actual(&self) -> Option<f64> {
        self.0
    }

    pub fn target(&self) -> Option<f64> {
        self.1
    }
}

/// The host's current job status, pulled on every sent line.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Completion percentage, 0-100.
    #[serde(default)]
    pub completion: Option<f64>,
    /// Elapsed print time in seconds.
    #[serde(default)]
    pub print_time: Option<f64>,
    /// Estimated remaining print time in seconds.
    #[serde(default)]
    pub print_time_left: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_started_defaults_missing_metadata() {
        let event: PrinterEvent =
            serde_json::from_str(r#"{"event": "PrintStarted", "payload": {"name": "benchy.gcode"}}"#)
                .unwrap();
        match event {
            PrinterEvent::PrintStarted { name, path, origin } => {
                assert_eq!(name, "benchy.gcode");
                assert_eq!(path, "");
                assert_eq!(origin, "");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn zchange_carries_new_height() {
        let event: PrinterEvent =
            serde_json::from_str(r#"{"event": "ZChange", "payload": {"new": 1.4}}"#).unwrap();
        assert!(matches!(event, PrinterEvent::ZChange { new } if new == 1.4));
    }

    #[test]
    fn temperature_reading_tolerates_non_numeric_halves() {
        let reading: TemperatureReading = serde_json::from_str("[60.5, null]").unwrap();
        assert_eq!(reading.actual(), Some(60.5));
        assert_eq!(reading.target(), None);

        let reading: TemperatureReading = serde_json::from_str(r#"["off", 200]"#).unwrap();
        assert_eq!(reading.actual(), None);
        assert_eq!(reading.target(), Some(200.0));
    }
}
