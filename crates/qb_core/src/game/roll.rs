//! Random draws consumed by the match engine.
//!
//! Every random decision goes through [`Roll`], so production code can use any
//! `rand::Rng` while tests and replays feed a fixed script of draws.

use std::collections::VecDeque;

use rand::Rng;

/// Source of uniform draws.
pub trait Roll {
    /// Uniform value in `[0, 1)`.
    fn roll_unit(&mut self) -> f64;

    /// Uniform integer in the inclusive range `[min, max]`. Callers guarantee `min <= max`.
    fn roll_inclusive(&mut self, min: u32, max: u32) -> u32;
}

impl<R: Rng + ?Sized> Roll for R {
    fn roll_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn roll_inclusive(&mut self, min: u32, max: u32) -> u32 {
        self.gen_range(min..=max)
    }
}

/// Replays a fixed sequence of unit draws and counts how many were taken.
///
/// Integer draws map a unit value onto the range, so `0.0` yields `min` and a
/// value just below `1.0` yields `max`. Once the script is exhausted the last
/// value is repeated (or `0.0` for an empty script).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoll {
    values: VecDeque<f64>,
    last: f64,
    draws: usize,
}

impl ScriptedRoll {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self { values: values.into_iter().collect(), last: 0.0, draws: 0 }
    }

    /// Number of draws consumed so far
    pub fn draws(&self) -> usize {
        self.draws
    }

    fn next(&mut self) -> f64 {
        self.draws += 1;
        if let Some(v) = self.values.pop_front() {
            self.last = v;
        }
        self.last
    }
}

impl Roll for ScriptedRoll {
    fn roll_unit(&mut self) -> f64 {
        self.next()
    }

    fn roll_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let u = self.next().clamp(0.0, 1.0);
        let span = u64::from(max - min) + 1;
        let offset = ((u * span as f64) as u64).min(span - 1);
        min + offset as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rng_unit_draws_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rng.roll_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_rng_inclusive_hits_both_ends() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let draws: Vec<u32> = (0..500).map(|_| rng.roll_inclusive(10, 12)).collect();
        assert!(draws.iter().all(|v| (10..=12).contains(v)));
        assert!(draws.contains(&10));
        assert!(draws.contains(&12));
    }

    #[test]
    fn test_scripted_roll_replays_and_counts() {
        let mut roll = ScriptedRoll::new([0.25, 0.9]);
        assert_eq!(roll.roll_unit(), 0.25);
        assert_eq!(roll.roll_unit(), 0.9);
        assert_eq!(roll.roll_unit(), 0.9);
        assert_eq!(roll.draws(), 3);
    }

    #[test]
    fn test_scripted_inclusive_maps_unit_to_range() {
        let mut roll = ScriptedRoll::new([0.0, 0.999_999, 0.5]);
        assert_eq!(roll.roll_inclusive(60, 90), 60);
        assert_eq!(roll.roll_inclusive(60, 90), 90);
        assert_eq!(roll.roll_inclusive(60, 90), 75);
    }
}
