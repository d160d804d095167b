//! Trivia-driven probability shift applied to a single player action.

/// Added to the base probability when the prerequisite was satisfied.
pub const CORRECT_BONUS: f64 = 0.15;
/// Subtracted from the base probability when it was not.
pub const WRONG_PENALTY: f64 = 0.25;

/// Shift `base` additively and clamp into `[0, 1]`.
///
/// Always starts from the base value; adjustments never compound.
pub fn adjusted_probability(base: f64, prerequisite_satisfied: bool) -> f64 {
    if prerequisite_satisfied {
        (base + CORRECT_BONUS).min(1.0)
    } else {
        (base - WRONG_PENALTY).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_correct_answer_adds_bonus() {
        assert!((adjusted_probability(0.80, true) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_answer_subtracts_penalty() {
        assert!((adjusted_probability(0.75, false) - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_edges() {
        assert_eq!(adjusted_probability(0.95, true), 1.0);
        assert_eq!(adjusted_probability(0.10, false), 0.0);
    }

    proptest! {
        #[test]
        fn prop_adjustment_stays_a_probability(
            base in 0.0f64..=1.0,
            satisfied in any::<bool>()
        ) {
            let adjusted = adjusted_probability(base, satisfied);
            prop_assert!((0.0..=1.0).contains(&adjusted));
            if satisfied {
                prop_assert_eq!(adjusted, (base + CORRECT_BONUS).min(1.0));
                prop_assert!(adjusted >= base);
            } else {
                prop_assert_eq!(adjusted, (base - WRONG_PENALTY).max(0.0));
                prop_assert!(adjusted <= base);
            }
        }
    }
}
