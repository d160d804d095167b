//! Match engine: vocabulary, random draws, the adjustment rule and the match
//! state machine.

pub mod adjustment;
pub mod draws;
pub mod kinds;
pub mod match_state;
pub mod roll;

pub use adjustment::{adjusted_probability, CORRECT_BONUS, WRONG_PENALTY};
pub use draws::{draw_max_actions, draw_max_score, max_score_from_draw, FALLBACK_RANGE};
pub use kinds::{ActionKind, Actor, DurationClass, Team};
pub use match_state::{ActionResolution, MatchId, MatchSnapshot, MatchState};
pub use roll::{Roll, ScriptedRoll};
