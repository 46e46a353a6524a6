//! Indicator implementations
//!
//! Contains all concrete indicator implementations.

pub mod fisher;
pub mod jma;
pub mod psar;
pub mod qqe;
pub mod stc;

/// Two-sided trend flag shared by the trend-following recurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    /// Rising / long side active.
    Rising,
    /// Falling / short side active.
    Falling,
}

impl Trend {
    /// `+1.0` for rising, `-1.0` for falling.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Trend::Rising => 1.0,
            Trend::Falling => -1.0,
        }
    }

    /// The opposite direction.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Trend::Rising => Trend::Falling,
            Trend::Falling => Trend::Rising,
        }
    }
}
