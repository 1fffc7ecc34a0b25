//! Print lifecycle state machine and metric pump.
//!
//! Owns the G-code tracker and the current print state, reacts to host
//! lifecycle events and temperature reports, and pushes everything into the
//! registered metrics. A finished print keeps its 100%-complete values
//! observable for a grace window before a deferred reset zeroes them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::{PrintState, PrinterEvent, ProgressSnapshot, TemperatureReading};
use crate::gcode::{Classification, GcodeTracker};
use crate::metrics::PrinterMetrics;

/// Grace window between a terminal print event and the post-print reset. Long
/// enough for a default scrape interval to capture the final values.
const COMPLETION_RESET_DELAY: Duration = Duration::from_secs(30);

/// Mutable state behind the controller's single mutex. Host event dispatch is
/// serialized in practice, but the metrics endpoint and the deferred reset run
/// on their own tasks, so every mutation goes through this lock.
struct ControllerState {
    tracker: GcodeTracker,
    state: PrintState,
    /// Tracker counter value at the last time the lifetime total advanced.
    last_extrusion_counter: f64,
    /// At most one pending deferred reset; replaced or aborted, never stacked.
    completion_timer: Option<JoinHandle<()>>,
}

pub struct LifecycleController {
    metrics: Arc<PrinterMetrics>,
    inner: Arc<Mutex<ControllerState>>,
}

impl LifecycleController {
    pub fn new(metrics: Arc<PrinterMetrics>) -> Arc<Self> {
        Arc::new(Self {
            metrics,
            inner: Arc::new(Mutex::new(ControllerState {
                tracker: GcodeTracker::new(),
                state: PrintState::Init,
                last_extrusion_counter: 0.0,
                completion_timer: None,
            })),
        })
    }

    /// Applies one host lifecycle event to the state machine.
    pub async fn handle_event(&self, event: PrinterEvent) {
        match event {
            PrinterEvent::ZChange { new } => self.metrics.zchange.set(new),
            PrinterEvent::PrintStarted { name, path, origin } => {
                let mut inner = self.inner.lock().await;
                // A stale deferred reset from the previous print must not
                // fire mid-print.
                if let Some(timer) = inner.completion_timer.take() {
                    timer.abort();
                }
                inner.tracker.reset();
                inner.last_extrusion_counter = 0.0;
                inner.state = PrintState::Printing;
                self.metrics.extrusion_print.set(0.0);
                self.metrics.printing.set(1.0);
                self.metrics.printer_state.transition_to(PrintState::Printing);
                self.metrics.print_info.replace(&name, &path, &origin);
                info!(%name, %path, %origin, "print started");
            }
            PrinterEvent::PrintDone => self.print_complete(PrintState::Done).await,
            PrinterEvent::PrintFailed => self.print_complete(PrintState::Failed).await,
            PrinterEvent::PrintCancelled => self.print_complete(PrintState::Cancelled).await,
        }
    }

    async fn print_complete(&self, reason: PrintState) {
        let mut inner = self.inner.lock().await;
        inner.state = reason;
        self.metrics.printer_state.transition_to(reason);
        self.metrics.printing.set(0.0);

        let metrics = Arc::clone(&self.metrics);
        let shared = Arc::clone(&self.inner);
        inner.completion_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(COMPLETION_RESET_DELAY).await;
            Self::completion_reset(&metrics, &shared).await;
        }));
        info!(state = reason.as_str(), "print finished, deferred reset armed");
    }

    /// Zeroes the post-print gauges and parks the state machine at idle.
    /// Idempotent: losing the cancel-vs-fire race just reapplies zeroes.
    async fn completion_reset(metrics: &PrinterMetrics, inner: &Mutex<ControllerState>) {
        let mut inner = inner.lock().await;
        inner.state = PrintState::Idle;
        inner.completion_timer = None;
        metrics.printer_state.transition_to(PrintState::Idle);
        metrics.progress.set(0.0);
        metrics.extrusion_print.set(0.0);
        metrics.print_time.set(0.0);
        metrics.print_time_left.set(0.0);
        metrics.print_info.clear();
        debug!("post-print metrics cleared");
    }

    /// Feeds one sent G-code line through the tracker and updates the
    /// movement, extrusion, fan and print-time metrics accordingly.
    pub async fn handle_line(&self, line: &str, status: ProgressSnapshot) {
        let mut inner = self.inner.lock().await;
        match inner.tracker.process_line(line) {
            Classification::Movement => {
                // Static field-to-gauge table; absent axes stay untouched.
                let axes = [
                    (inner.tracker.x, &self.metrics.movement_x),
                    (inner.tracker.y, &self.metrics.movement_y),
                    (inner.tracker.z, &self.metrics.movement_z),
                    (inner.tracker.e, &self.metrics.movement_e),
                    (inner.tracker.speed, &self.metrics.movement_speed),
                ];
                for (value, gauge) in axes {
                    if let Some(v) = value {
                        gauge.set(v);
                    }
                }

                // The per-print gauge mirrors the tracker and resets with it;
                // the lifetime total only ever advances by positive deltas.
                let counter = inner.tracker.extrusion_counter;
                self.metrics.extrusion_print.set(counter);
                if counter > inner.last_extrusion_counter {
                    self.metrics
                        .extrusion_total
                        .inc_by(counter - inner.last_extrusion_counter);
                    inner.last_extrusion_counter = counter;
                }
            }
            Classification::FanSpeed => {
                if let Some(speed) = inner.tracker.fan_speed {
                    self.metrics.print_fan_speed.set(speed);
                }
            }
            Classification::None => {}
        }

        // Refreshed on every sent line, whatever it parsed to.
        if let Some(print_time) = status.print_time {
            self.metrics.print_time.set(print_time);
        }
        if let Some(print_time_left) = status.print_time_left {
            self.metrics.print_time_left.set(print_time_left);
        }
    }

    /// Writes the host's progress percentage into the progress gauge.
    pub fn handle_progress(&self, completion: f64) {
        self.metrics.progress.set(completion);
    }

    /// Writes a parsed temperature report. Unsupported tool ids and absent
    /// halves are skipped without aborting the rest of the report.
    pub fn handle_temperatures(&self, temperatures: &HashMap<String, TemperatureReading>) {
        for (tool, reading) in temperatures {
            let Some(gauges) = self.metrics.temperature(tool) else {
                debug!(%tool, "ignoring temperature report for unsupported tool");
                continue;
            };
            if let Some(actual) = reading.actual() {
                gauges.actual.set(actual);
            }
            if let Some(target) = reading.target() {
                gauges.target.set(target);
            }
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> PrintState {
        self.inner.lock().await.state
    }

    /// Cumulative extrusion since the current print started.
    pub async fn extrusion_counter(&self) -> f64 {
        self.inner.lock().await.tracker.extrusion_counter
    }
}
