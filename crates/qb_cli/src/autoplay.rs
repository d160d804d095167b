//! Scripted opponent and quiz-taker used to play whole matches unattended.
//!
//! The team in possession passes or dribbles its way forward and shoots once
//! it is close enough; a shot on target still has to beat the goalkeeper. The
//! quiz-taker answers correctly with a fixed accuracy.

use anyhow::Result;
use rand::Rng;
use serde_json::json;

use qb_core::{
    ActionKind, Actor, ConfigProvider, DurationClass, GameService, MatchSnapshot, Team,
};

/// Forward moves needed before a side is allowed to shoot.
const MOVES_BEFORE_SHOT: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct AutoplayOptions {
    pub duration: DurationClass,
    /// Chance the quiz question before each player action is answered correctly
    pub accuracy: f64,
    pub verbose: bool,
}

fn next_action(moves: u32, rng: &mut impl Rng) -> ActionKind {
    if moves >= MOVES_BEFORE_SHOT {
        ActionKind::Shoot
    } else if rng.gen_bool(0.5) {
        ActionKind::Pass
    } else {
        ActionKind::Dribble
    }
}

/// Play one match to completion and return its final state.
pub fn play_match(
    service: &GameService,
    options: AutoplayOptions,
    rng: &mut impl Rng,
) -> Result<MatchSnapshot> {
    let started = service.create(options.duration)?;
    let id = started.match_id;
    if options.verbose {
        println!("{}", serde_json::to_string(&started)?);
    }

    let save_chance = service.config().goalkeeper_save_probability().clamp(0.0, 1.0);
    let mut possession = Team::Blue;
    let mut moves = 0u32;

    loop {
        let snapshot = match possession {
            Team::Blue => {
                let action = next_action(moves, rng);
                let correct = rng.gen_bool(options.accuracy);
                let outcome = service.submit_action(id, action, correct)?;
                if options.verbose {
                    println!(
                        "{}",
                        json!({
                            "team": "blue",
                            "action": action,
                            "question_correct": correct,
                            "probability": outcome.effective_probability,
                            "success": outcome.success,
                        })
                    );
                }

                let mut snapshot = outcome.snapshot;
                if !outcome.success {
                    possession = Team::Red;
                    moves = 0;
                } else if action == ActionKind::Shoot {
                    if !snapshot.is_over && !rng.gen_bool(save_chance) {
                        snapshot = service.update_score(id, Team::Blue, 1)?;
                    }
                    possession = Team::Red;
                    moves = 0;
                } else {
                    moves += 1;
                }
                snapshot
            }
            Team::Red => {
                let action = next_action(moves, rng);
                let probability = service.effective_probability(id, Actor::Opponent, action)?;
                let success = rng.gen_bool(probability.clamp(0.0, 1.0));
                let mut snapshot = service.record_opponent_action(id)?;
                if options.verbose {
                    println!(
                        "{}",
                        json!({
                            "team": "red",
                            "action": action,
                            "probability": probability,
                            "success": success,
                        })
                    );
                }

                if !success {
                    possession = Team::Blue;
                    moves = 0;
                } else if action == ActionKind::Shoot {
                    if !snapshot.is_over && !rng.gen_bool(save_chance) {
                        snapshot = service.update_score(id, Team::Red, 1)?;
                    }
                    possession = Team::Blue;
                    moves = 0;
                } else {
                    moves += 1;
                }
                snapshot
            }
        };

        if snapshot.is_over {
            return Ok(snapshot);
        }
    }
}
