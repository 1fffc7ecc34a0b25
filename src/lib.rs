//! octoprom - Prometheus telemetry exporter for OctoPrint-style printer hosts.
//!
//! Observes the host's outbound G-code stream and lifecycle callbacks and
//! derives numeric telemetry: axis positions, feed rate, extrusion volume,
//! fan speed, temperatures and print lifecycle state.

pub mod config;
pub mod events;
pub mod gcode;
pub mod lifecycle;
pub mod metrics;
pub mod web;
