//! Prometheus metric registration and typed handles.
//!
//! The metric name set is closed: every collector is a struct field created
//! and registered once at startup, so a missing metric is a compile error and
//! a registration clash fails loudly before the exporter serves anything.

use prometheus::{Counter, Gauge, IntGaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::events::PrintState;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric registration error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Help strings carried over verbatim from the original exporter, including
/// the stray `__target` keys it shipped with. Names missing from this table
/// fall back to the metric name itself, so registered help text stays
/// byte-compatible with dashboards built against the original.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("octoprint_temperature_bed_actual", "Actual Temperature in Celsius of Bed"),
    ("octoprint_temperature_bed__target", "Target Temperature in Celsius of Bed"),
    ("octoprint_temperature_tool0_actual", "Actual Temperature in Celsius of Extruder Hot End"),
    ("octoprint_temperature_tool0__target", "Target Temperature in Celsius of Extruder Hot End"),
    ("octoprint_movement_x", "Movement of X axis from G0 or G1 gcode"),
    ("octoprint_movement_y", "Movement of Y axis from G0 or G1 gcode"),
    ("octoprint_movement_z", "Movement of Z axis from G0 or G1 gcode"),
    ("octoprint_movement_e", "Movement of Extruder from G0 or G1 gcode"),
    ("octoprint_movement_speed", "Speed setting from G0 or G1 gcode"),
    ("octoprint_extrusion_print", "Filament extruded this print"),
    ("octoprint_extrusion_total", "Filament extruded total"),
    ("octoprint_progress", "Progress percentage of print"),
    ("octoprint_printing", "1 if printing, 0 otherwise"),
    ("octoprint_print", "Filename information about print"),
    ("octoprint_print_time", "Time passing of print"),
    ("octoprint_print_time_left", "Time left of print"),
];

fn description(name: &str) -> &str {
    DESCRIPTIONS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, help)| *help)
        .unwrap_or(name)
}

/// Emulates the Python client's `Enum` metric: one series per state, with the
/// active state at 1 and every other state at 0.
#[derive(Clone)]
pub struct StateEnum {
    states: IntGaugeVec,
}

impl StateEnum {
    fn new(name: &str, help: &str) -> Result<Self, prometheus::Error> {
        let states = IntGaugeVec::new(Opts::new(name, help), &[name])?;
        Ok(Self { states })
    }

    pub fn transition_to(&self, state: PrintState) {
        for candidate in PrintState::ALL {
            self.states
                .with_label_values(&[candidate.as_str()])
                .set((candidate == state) as i64);
        }
    }
}

/// Emulates the Python client's `Info` metric for the current print: a single
/// series at 1 whose labels carry the print metadata. Replaced wholesale on
/// print start and cleared to the empty label set by the deferred reset.
#[derive(Clone)]
pub struct PrintInfo {
    labels: IntGaugeVec,
}

impl PrintInfo {
    fn new(name: &str, help: &str) -> Result<Self, prometheus::Error> {
        let labels = IntGaugeVec::new(Opts::new(name, help), &["name", "path", "origin"])?;
        Ok(Self { labels })
    }

    pub fn replace(&self, name: &str, path: &str, origin: &str) {
        self.labels.reset();
        self.labels.with_label_values(&[name, path, origin]).set(1);
    }

    pub fn clear(&self) {
        self.labels.reset();
    }
}

/// Actual/target gauge pair for one heater.
#[derive(Clone)]
pub struct TemperatureGauges {
    pub actual: Gauge,
    pub target: Gauge,
}

/// Every metric the exporter serves, registered once at construction.
pub struct PrinterMetrics {
    registry: Registry,

    pub printer_state: StateEnum,
    pub progress: Gauge,
    pub printing: Gauge,
    pub print_info: PrintInfo,
    pub extrusion_print: Gauge,
    pub extrusion_total: Counter,
    pub zchange: Gauge,
    pub movement_x: Gauge,
    pub movement_y: Gauge,
    pub movement_z: Gauge,
    pub movement_e: Gauge,
    pub movement_speed: Gauge,
    pub print_fan_speed: Gauge,
    pub print_time: Gauge,
    pub print_time_left: Gauge,
    temperature_bed: TemperatureGauges,
    temperature_tool0: TemperatureGauges,
    temperature_tool1: TemperatureGauges,
    temperature_tool2: TemperatureGauges,
    temperature_tool3: TemperatureGauges,
}

impl PrinterMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let gauge = |name: &str| -> Result<Gauge, prometheus::Error> {
            let g = Gauge::with_opts(Opts::new(name, description(name)))?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };
        let temperature = |prefix: &str| -> Result<TemperatureGauges, prometheus::Error> {
            Ok(TemperatureGauges {
                actual: gauge(&format!("{prefix}_actual"))?,
                target: gauge(&format!("{prefix}_target"))?,
            })
        };

        let printer_state = StateEnum::new("octoprint_printer_state", "State of printer")?;
        registry.register(Box::new(printer_state.states.clone()))?;
        printer_state.transition_to(PrintState::Init);

        let print_info = PrintInfo::new("octoprint_print", description("octoprint_print"))?;
        registry.register(Box::new(print_info.labels.clone()))?;

        let extrusion_total = Counter::with_opts(Opts::new(
            "octoprint_extrusion_total",
            description("octoprint_extrusion_total"),
        ))?;
        registry.register(Box::new(extrusion_total.clone()))?;

        Ok(Self {
            printer_state,
            print_info,
            extrusion_total,
            progress: gauge("octoprint_progress")?,
            printing: gauge("octoprint_printing")?,
            extrusion_print: gauge("octoprint_extrusion_print")?,
            zchange: gauge("octoprint_zchange")?,
            movement_x: gauge("octoprint_movement_x")?,
            movement_y: gauge("octoprint_movement_y")?,
            movement_z: gauge("octoprint_movement_z")?,
            movement_e: gauge("octoprint_movement_e")?,
            movement_speed: gauge("octoprint_movement_speed")?,
            print_fan_speed: gauge("octoprint_print_fan_speed")?,
            print_time: gauge("octoprint_print_time")?,
            print_time_left: gauge("octoprint_print_time_left")?,
            temperature_bed: temperature("octoprint_temperature_bed")?,
            temperature_tool0: temperature("octoprint_temperature_tool0")?,
            temperature_tool1: temperature("octoprint_temperature_tool1")?,
            temperature_tool2: temperature("octoprint_temperature_tool2")?,
            temperature_tool3: temperature("octoprint_temperature_tool3")?,
            registry,
        })
    }

    /// Resolves a host tool identifier to its gauge pair. Only the bed and
    /// four tools are supported; anything else returns `None`.
    pub fn temperature(&self, tool: &str) -> Option<&TemperatureGauges> {
        match tool {
            "B" => Some(&self.temperature_bed),
            "T0" => Some(&self.temperature_tool0),
            "T1" => Some(&self.temperature_tool1),
            "T2" => Some(&self.temperature_tool2),
            "T3" => Some(&self.temperature_tool3),
            _ => None,
        }
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
