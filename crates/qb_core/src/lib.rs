//! # qb_core - Trivia-Gated Football Match Engine
//!
//! In-memory match state for a quiz-driven football mini-game. Players answer
//! a trivia question before each action; the answer shifts the action's
//! success probability for that single attempt.
//!
//! ## Features
//! - Per-match limits drawn once at creation (score cap, action budget)
//! - Additive, single-use probability adjustment
//! - Registry with one lock per match
//! - Read-only startup config plus runtime probability overrides
//! - JSON request/response API

pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod registry;
pub mod service;

pub use api::{dispatch_json, ApiError, ApiResponse, GameRequest};
pub use config::{ConfigProvider, GameConfig, ProbabilityOverrides, RuntimeConfig};
pub use error::{ConfigError, CoreError, Result};
pub use game::{
    ActionKind, Actor, DurationClass, MatchId, MatchSnapshot, MatchState, Roll, ScriptedRoll, Team,
};
pub use registry::{MatchRegistry, SharedMatch};
pub use service::{ActionOutcome, GameService, PublicProbabilities, StartedMatch};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
