//! Streaming G-code line tracker.
//!
//! Consumes outbound G-code one line at a time and keeps a running snapshot of
//! machine position, feed rate, fan speed and cumulative extrusion. The
//! tracker is deliberately not a full G-code grammar: firmware and slicer
//! dialects vary wildly, so unknown instructions and malformed values are
//! silently ignored instead of rejected.

/// What a processed line changed, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Line was empty, a comment, unrecognized, or carried no usable fields.
    None,
    /// A `G0`/`G1` move updated at least one of X, Y, Z, E or F.
    Movement,
    /// An `M106`/`M107` fan command updated the fan speed.
    FanSpeed,
}

/// Last-known machine state derived from the command stream.
///
/// All axis fields persist across lines until a later command overwrites them,
/// and stay `None` until first seen. `extrusion_counter` only ever grows
/// between resets: retraction moves update `e` but never shrink the counter.
#[derive(Debug, Clone, Default)]
pub struct GcodeTracker {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub speed: Option<f64>,
    pub fan_speed: Option<f64>,
    pub extrusion_counter: f64,
}

impl GcodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every tracked field. Called once per print start.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Processes one sent line and reports what it changed.
    ///
    /// Never fails: anything that does not parse degrades to "field absent".
    pub fn process_line(&mut self, line: &str) -> Classification {
        // Everything after `;` is a comment.
        let line = line.split(';').next().unwrap_or("");
        let mut words = line.split_whitespace();
        let Some(code) = words.next() else {
            return Classification::None;
        };
        match code.to_ascii_uppercase().as_str() {
            "G0" | "G1" => self.process_move(words),
            "M106" => self.process_fan(words),
            "M107" => {
                self.fan_speed = Some(0.0);
                Classification::FanSpeed
            }
            _ => Classification::None,
        }
    }

    fn process_move<'a>(&mut self, words: impl Iterator<Item = &'a str>) -> Classification {
        let mut matched = false;
        for word in words {
            let Some((letter, value)) = split_word(word) else {
                continue;
            };
            match letter {
                'X' => self.x = Some(value),
                'Y' => self.y = Some(value),
                'Z' => self.z = Some(value),
                'F' => self.speed = Some(value),
                'E' => {
                    // Only forward feed accumulates; a decreasing E is a
                    // retraction and must not shrink the counter.
                    let delta = value - self.e.unwrap_or(0.0);
                    if delta > 0.0 {
                        self.extrusion_counter += delta;
                    }
                    self.e = Some(value);
                }
                _ => continue,
            }
            matched = true;
        }
        if matched {
            Classification::Movement
        } else {
            Classification::None
        }
    }

    fn process_fan<'a>(&mut self, words: impl Iterator<Item = &'a str>) -> Classification {
        for word in words {
            if let Some(('S', value)) = split_word(word) {
                // Units (0-255 or percent) are whatever the slicer sent;
                // passed through unconverted.
                self.fan_speed = Some(value);
                return Classification::FanSpeed;
            }
        }
        Classification::None
    }
}

/// Splits a parameter word like `X10.5` or `E-0.8` into letter and value.
fn split_word(word: &str) -> Option<(char, f64)> {
    let mut chars = word.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    let value: f64 = chars.as_str().parse().ok()?;
    Some((letter.to_ascii_uppercase(), value))
}
