use serde::Serialize;

/// Percentage that only moves forward until explicitly reset.
///
/// Out-of-order `progress` events can never pull the displayed value
/// backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub const MAX: f64 = 100.0;

    pub fn value(self) -> f64 {
        self.0
    }

    /// Fold in a reported value. Non-finite values are ignored.
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let value = value.clamp(0.0, Self::MAX);
        if value > self.0 {
            self.0 = value;
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0.0;
    }

    pub fn complete(&mut self) {
        self.0 = Self::MAX;
    }

    pub fn is_complete(self) -> bool {
        self.0 >= Self::MAX
    }

    /// Whole percent for gauges.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    pub fn percent(self) -> u16 {
        self.0.round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_regresses() {
        let mut p = Progress::default();
        for v in [10.0, 40.0, 25.0, 66.0, 3.0] {
            p.observe(v);
        }
        assert!((p.value() - 66.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamps_and_ignores_non_finite() {
        let mut p = Progress::default();
        p.observe(f64::NAN);
        p.observe(-5.0);
        assert!(p.value().abs() < f64::EPSILON);
        p.observe(250.0);
        assert!(p.is_complete());
        p.observe(f64::INFINITY);
        assert!((p.value() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_allows_lower_values_again() {
        let mut p = Progress::default();
        p.observe(90.0);
        p.reset();
        p.observe(5.0);
        assert_eq!(p.percent(), 5);
        p.complete();
        assert_eq!(p.percent(), 100);
    }
}
