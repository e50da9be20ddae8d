//! Per-sample tangent strengths.

use serde::{Deserialize, Serialize};

/// Left/right tangent strength of one timecourse sample, each in `[0, 1]`.
///
/// While `same` is set the two sides move together and only `s1` is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Smoothness {
    s1: f64,
    s2: f64,
    same: bool,
}

impl Default for Smoothness {
    fn default() -> Self {
        Self {
            s1: 1.0,
            s2: 1.0,
            same: true,
        }
    }
}

impl Smoothness {
    pub fn new(s: f64) -> Self {
        let s = s.clamp(0.0, 1.0);
        Self {
            s1: s,
            s2: s,
            same: true,
        }
    }

    pub fn with_sides(left: f64, right: f64) -> Self {
        Self {
            s1: left.clamp(0.0, 1.0),
            s2: right.clamp(0.0, 1.0),
            same: false,
        }
    }

    /// Tangent strength on the incoming side.
    #[inline]
    pub fn left(&self) -> f64 {
        self.s1
    }

    /// Tangent strength on the outgoing side.
    #[inline]
    pub fn right(&self) -> f64 {
        if self.same {
            self.s1
        } else {
            self.s2
        }
    }

    #[inline]
    pub fn is_forced_same(&self) -> bool {
        self.same
    }

    pub fn set(&mut self, s: f64) {
        *self = Self::new(s);
    }

    pub fn set_sides(&mut self, left: f64, right: f64) {
        *self = Self::with_sides(left, right);
    }

    pub fn average(&self) -> f64 {
        0.5 * (self.left() + self.right())
    }

    /// Both sides doubled, clamped to 1.
    pub fn smoother(&self) -> Self {
        Self {
            s1: (self.s1 * 2.0).min(1.0),
            s2: (self.s2 * 2.0).min(1.0),
            same: self.same,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoother_doubles_and_clamps() {
        let s = Smoothness::with_sides(0.25, 0.75).smoother();
        assert_eq!(s.left(), 0.5);
        assert_eq!(s.right(), 1.0);
        assert!(!s.is_forced_same());
    }

    #[test]
    fn forced_same_tracks_left_side() {
        let mut s = Smoothness::with_sides(0.2, 0.8);
        s.set(0.4);
        assert!(s.is_forced_same());
        assert_eq!(s.right(), 0.4);
        assert_eq!(s.average(), 0.4);
    }

    #[test]
    fn values_are_clamped_to_unit_range() {
        let s = Smoothness::with_sides(-1.0, 3.0);
        assert_eq!((s.left(), s.right()), (0.0, 1.0));
    }
}
