/// Tracks the lowest epoch loss seen so far and reports stagnation.
///
/// The training loop calls [`observe`](LossPlateau::observe) once per epoch
/// and decays the learning rate whenever it returns `true`. A stagnating
/// loss does not replace the best one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossPlateau {
    best: f64,
}

impl LossPlateau {
    pub fn new() -> LossPlateau {
        LossPlateau { best: f64::INFINITY }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Returns `true` when `loss` is not lower than the best so far.
    pub fn observe(&mut self, loss: f64) -> bool {
        if loss < self.best {
            self.best = loss;
            false
        } else {
            true
        }
    }
}

impl Default for LossPlateau {
    fn default() -> Self {
        LossPlateau::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_observation_improves() {
        let mut p = LossPlateau::new();
        assert!(!p.observe(10.0));
        assert_eq!(p.best(), 10.0);
    }

    #[test]
    fn test_stagnation_keeps_best() {
        let mut p = LossPlateau::new();
        p.observe(5.0);
        assert!(p.observe(5.0));
        assert!(p.observe(7.0));
        assert_eq!(p.best(), 5.0);
        assert!(!p.observe(4.0));
        assert_eq!(p.best(), 4.0);
    }

    #[test]
    fn test_nan_counts_as_stagnation() {
        let mut p = LossPlateau::new();
        p.observe(1.0);
        assert!(p.observe(f64::NAN));
        assert_eq!(p.best(), 1.0);
    }
}
