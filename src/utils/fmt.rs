//! Formatting utilities
use std::fmt;

/// Displays a value rounded to a number of decimal places.
///
/// The rounded value is written in its shortest form but always with a fractional part,
/// so `Rounded::new(500.0, 2)` shows `500.0`, `Rounded::new(9.5, 2)` shows `9.5`,
/// and `Rounded::new(495.456, 2)` shows `495.46`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rounded {
    value: f64,
    places: i32,
}

impl Rounded {
    #[must_use]
    pub const fn new(value: f64, places: i32) -> Self {
        Self { value, places }
    }

    /// The rounded value. Halfway cases round away from zero.
    #[must_use]
    pub fn value(&self) -> f64 {
        let scale = 10f64.powi(self.places);
        (self.value * scale).round() / scale
    }
}

impl fmt::Display for Rounded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = self.value();
        if value.is_finite() && value.fract() == 0.0 {
            write!(f, "{:.1}", value)
        } else {
            write!(f, "{}", value)
        }
    }
}
