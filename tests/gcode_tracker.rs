// Tests for the G-code line tracker: classification, stateful position
// tracking and the monotonic extrusion counter.

use octoprom::gcode::{Classification, GcodeTracker};

#[test]
fn movement_line_updates_all_present_fields() {
    let mut tracker = GcodeTracker::new();
    let classification = tracker.process_line("G1 X10 Y5 E2.5 F1500");
    assert_eq!(classification, Classification::Movement);
    assert_eq!(tracker.x, Some(10.0));
    assert_eq!(tracker.y, Some(5.0));
    assert_eq!(tracker.z, None);
    assert_eq!(tracker.e, Some(2.5));
    assert_eq!(tracker.speed, Some(1500.0));
    assert_eq!(tracker.extrusion_counter, 2.5);
}

#[test]
fn fields_persist_until_overwritten() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 X10 Y5 F1500");
    tracker.process_line("G1 Z0.2");
    assert_eq!(tracker.x, Some(10.0));
    assert_eq!(tracker.y, Some(5.0));
    assert_eq!(tracker.z, Some(0.2));
    assert_eq!(tracker.speed, Some(1500.0));
}

#[test]
fn extrusion_counter_sums_positive_increments() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 X1 E1.0");
    tracker.process_line("G0 Y2 F3000");
    tracker.process_line("G1 X2 E2.5");
    tracker.process_line("G1 Z0.4");
    tracker.process_line("G1 X3 E4.0");
    assert_eq!(tracker.extrusion_counter, 4.0);
}

#[test]
fn retraction_never_decreases_the_counter() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 E5.0");
    tracker.process_line("G1 E3.0"); // retract
    assert_eq!(tracker.e, Some(3.0));
    assert_eq!(tracker.extrusion_counter, 5.0);
    // Re-prime back to where we were: no new forward feed yet.
    tracker.process_line("G1 E5.0");
    assert_eq!(tracker.extrusion_counter, 7.0);
}

#[test]
fn reset_clears_everything() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 X10 Y5 Z1 E2.5 F1500");
    tracker.process_line("M106 S200");
    tracker.reset();
    let classification = tracker.process_line("G1 X10");
    assert_eq!(classification, Classification::Movement);
    assert_eq!(tracker.x, Some(10.0));
    assert_eq!(tracker.y, None);
    assert_eq!(tracker.z, None);
    assert_eq!(tracker.e, None);
    assert_eq!(tracker.speed, None);
    assert_eq!(tracker.fan_speed, None);
    assert_eq!(tracker.extrusion_counter, 0.0);
}

#[test]
fn instruction_code_is_case_insensitive() {
    let mut tracker = GcodeTracker::new();
    assert_eq!(tracker.process_line("g1 x10 y5"), Classification::Movement);
    assert_eq!(tracker.x, Some(10.0));
    assert_eq!(tracker.y, Some(5.0));
}

#[test]
fn fan_speed_passes_through_unconverted() {
    let mut tracker = GcodeTracker::new();
    assert_eq!(tracker.process_line("M106 S128.5"), Classification::FanSpeed);
    assert_eq!(tracker.fan_speed, Some(128.5));
    assert_eq!(tracker.process_line("M107"), Classification::FanSpeed);
    assert_eq!(tracker.fan_speed, Some(0.0));
}

#[test]
fn fan_command_without_speed_is_not_classified() {
    let mut tracker = GcodeTracker::new();
    assert_eq!(tracker.process_line("M106"), Classification::None);
    assert_eq!(tracker.fan_speed, None);
}

#[test]
fn unrecognized_and_malformed_lines_leave_state_unchanged() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 X10 E1.0");

    assert_eq!(tracker.process_line(""), Classification::None);
    assert_eq!(tracker.process_line("   "), Classification::None);
    assert_eq!(tracker.process_line("; pure comment"), Classification::None);
    assert_eq!(tracker.process_line("M104 S210"), Classification::None);
    assert_eq!(tracker.process_line("G28"), Classification::None);
    assert_eq!(tracker.process_line("T0"), Classification::None);

    assert_eq!(tracker.x, Some(10.0));
    assert_eq!(tracker.extrusion_counter, 1.0);
}

#[test]
fn malformed_parameter_is_treated_as_absent() {
    let mut tracker = GcodeTracker::new();
    let classification = tracker.process_line("G1 Xabc Y5");
    assert_eq!(classification, Classification::Movement);
    assert_eq!(tracker.x, None);
    assert_eq!(tracker.y, Some(5.0));

    // A move with only garbage parameters changed nothing.
    assert_eq!(tracker.process_line("G1 X Y"), Classification::None);
}

#[test]
fn trailing_comment_is_stripped() {
    let mut tracker = GcodeTracker::new();
    let classification = tracker.process_line("G1 X10 ; outer wall");
    assert_eq!(classification, Classification::Movement);
    assert_eq!(tracker.x, Some(10.0));
}

#[test]
fn signed_and_decimal_values_parse() {
    let mut tracker = GcodeTracker::new();
    tracker.process_line("G1 X-3.25 Y+7 Z0.20");
    assert_eq!(tracker.x, Some(-3.25));
    assert_eq!(tracker.y, Some(7.0));
    assert_eq!(tracker.z, Some(0.2));
}
