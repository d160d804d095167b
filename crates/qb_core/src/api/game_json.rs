//! JSON API for match operations
//!
//! One request per call: `dispatch_json` parses a tagged request, runs it
//! against a [`GameService`] and answers with an [`ApiResponse`] envelope.
//! Names arrive as strings so that unknown teams, actors and actions are
//! reported as `INVALID_ARGUMENT` rather than as malformed JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::{CoreError, Result};
use crate::game::{ActionKind, Actor, DurationClass, MatchId, Team};
use crate::service::GameService;

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string() }
    }
}

impl From<&CoreError> for ApiError {
    fn from(err: &CoreError) -> Self {
        Self::new(err.code(), &err.to_string())
    }
}

fn default_points() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GameRequest {
    /// Unknown or missing durations start a regular match
    Start {
        #[serde(default)]
        duration: Option<String>,
    },
    State {
        game_id: String,
    },
    Action {
        game_id: String,
        action: String,
        #[serde(default)]
        question_correct: bool,
    },
    Score {
        game_id: String,
        team: String,
        #[serde(default = "default_points")]
        points: i64,
    },
    Probability {
        game_id: String,
        actor: String,
        action: String,
    },
    OpponentAction {
        game_id: String,
    },
    DurationSettings,
    Config,
    /// `value: null` clears the override
    SetOverride {
        actor: String,
        action: String,
        #[serde(default)]
        value: Option<f64>,
    },
}

fn to_data<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CoreError::Internal(format!("Serialization: {e}")))
}

fn parse_points(points: i64) -> Result<u32> {
    u32::try_from(points).map_err(|_| {
        CoreError::InvalidArgument(format!("Points must be between 0 and {}, got {points}", u32::MAX))
    })
}

/// Run a parsed request.
pub fn handle_request(service: &GameService, request: GameRequest) -> Result<Value> {
    match request {
        GameRequest::Start { duration } => {
            let duration =
                duration.as_deref().map(DurationClass::parse_or_regular).unwrap_or_default();
            to_data(&service.create(duration)?)
        }
        GameRequest::State { game_id } => to_data(&service.get_state(game_id.parse()?)?),
        GameRequest::Action { game_id, action, question_correct } => {
            let id: MatchId = game_id.parse()?;
            let action: ActionKind = action.parse()?;
            to_data(&service.submit_action(id, action, question_correct)?)
        }
        GameRequest::Score { game_id, team, points } => {
            let id: MatchId = game_id.parse()?;
            let team: Team = team.parse()?;
            to_data(&service.update_score(id, team, parse_points(points)?)?)
        }
        GameRequest::Probability { game_id, actor, action } => {
            let id: MatchId = game_id.parse()?;
            let actor: Actor = actor.parse()?;
            let action: ActionKind = action.parse()?;
            let probability = service.effective_probability(id, actor, action)?;
            Ok(json!({ "probability": probability, "actor": actor, "action": action }))
        }
        GameRequest::OpponentAction { game_id } => {
            to_data(&service.record_opponent_action(game_id.parse()?)?)
        }
        GameRequest::DurationSettings => {
            Ok(json!({ "duration_settings": to_data(&service.duration_settings())? }))
        }
        GameRequest::Config => to_data(&service.public_probabilities()),
        GameRequest::SetOverride { actor, action, value } => {
            let actor: Actor = actor.parse()?;
            let action: ActionKind = action.parse()?;
            match value {
                Some(v) => service.set_probability_override(actor, action, v)?,
                None => service.clear_probability_override(actor, action)?,
            }
            Ok(json!({ "actor": actor, "action": action, "value": value }))
        }
    }
}

/// Parse, run and serialize one request.
pub fn dispatch_json(service: &GameService, request_json: &str) -> String {
    let response = match serde_json::from_str::<GameRequest>(request_json) {
        Err(e) => {
            error!("Failed to parse GameRequest: {}", e);
            ApiResponse::error(ApiError::new("INVALID_JSON", &format!("Invalid JSON format: {e}")))
        }
        Ok(request) => {
            debug!(?request, "Processing game request");
            match handle_request(service, request) {
                Ok(data) => ApiResponse::success(data),
                Err(err) => {
                    warn!("Game request failed: {}", err);
                    ApiResponse::error(ApiError::from(&err))
                }
            }
        }
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;

    fn call(service: &GameService, request: Value) -> Value {
        let out = dispatch_json(service, &request.to_string());
        serde_json::from_str(&out).unwrap()
    }

    fn service() -> GameService {
        GameService::with_seed(RuntimeConfig::default(), 7)
    }

    #[test]
    fn test_start_then_state() {
        let service = service();
        let started = call(&service, json!({"op": "start", "duration": "short"}));
        assert_eq!(started["success"], true);
        assert_eq!(started["schema_version"], API_VERSION);
        assert_eq!(started["data"]["duration"], "short");
        let game_id = started["data"]["game_id"].as_str().unwrap().to_string();

        let state = call(&service, json!({"op": "state", "game_id": game_id}));
        assert_eq!(state["data"]["game_id"], game_id);
        assert_eq!(state["data"]["total_action_count"], 0);
    }

    #[test]
    fn test_unknown_duration_starts_regular() {
        let service = service();
        let started = call(&service, json!({"op": "start", "duration": "marathon"}));
        assert_eq!(started["data"]["duration"], "regular");
        let started = call(&service, json!({"op": "start"}));
        assert_eq!(started["data"]["duration"], "regular");
    }

    #[test]
    fn test_action_response_shape() {
        let service = service();
        let started = call(&service, json!({"op": "start"}));
        let game_id = started["data"]["game_id"].clone();
        let out = call(
            &service,
            json!({"op": "action", "game_id": game_id, "action": "tackle", "question_correct": false}),
        );
        assert_eq!(out["success"], true);
        assert_eq!(out["data"]["action_success"], false);
        assert!((out["data"]["probability"].as_f64().unwrap() - 0.50).abs() < 1e-9);
        assert_eq!(out["data"]["game"]["player_action_count"], 1);
    }

    #[test]
    fn test_error_codes() {
        let service = service();
        let out = dispatch_json(&service, "{not json");
        let out: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(out["success"], false);
        assert_eq!(out["error"]["code"], "INVALID_JSON");

        let missing = call(&service, json!({"op": "state", "game_id": "does-not-exist"}));
        assert_eq!(missing["error"]["code"], "NOT_FOUND");

        let started = call(&service, json!({"op": "start"}));
        let game_id = started["data"]["game_id"].clone();
        let bad_team = call(&service, json!({"op": "score", "game_id": game_id, "team": "green"}));
        assert_eq!(bad_team["error"]["code"], "INVALID_ARGUMENT");

        let negative =
            call(&service, json!({"op": "score", "game_id": game_id, "team": "blue", "points": -1}));
        assert_eq!(negative["error"]["code"], "INVALID_ARGUMENT");

        let bad_actor = call(
            &service,
            json!({"op": "probability", "game_id": game_id, "actor": "coach", "action": "pass"}),
        );
        assert_eq!(bad_actor["error"]["code"], "INVALID_ARGUMENT");
    }

    #[test]
    fn test_score_defaults_to_one_point() {
        let service = service();
        let started = call(&service, json!({"op": "start"}));
        let game_id = started["data"]["game_id"].clone();
        let out = call(&service, json!({"op": "score", "game_id": game_id, "team": "red"}));
        assert_eq!(out["data"]["red_score"], 1);
        assert_eq!(out["data"]["blue_score"], 0);
    }

    #[test]
    fn test_config_and_duration_settings() {
        let service = service();
        let config = call(&service, json!({"op": "config"}));
        assert!((config["data"]["probabilities"]["pass"].as_f64().unwrap() - 0.80).abs() < 1e-9);
        assert!((config["data"]["goalkeeper_save"].as_f64().unwrap() - 0.50).abs() < 1e-9);

        let durations = call(&service, json!({"op": "duration_settings"}));
        assert_eq!(durations["data"]["duration_settings"]["tiny"]["min"], 10);
        assert_eq!(durations["data"]["duration_settings"]["long"]["max"], 120);
    }

    #[test]
    fn test_set_and_clear_override() {
        let service = service();
        let set = call(
            &service,
            json!({"op": "set_override", "actor": "player", "action": "pass", "value": 0.4}),
        );
        assert_eq!(set["success"], true);
        let started = call(&service, json!({"op": "start"}));
        let game_id = started["data"]["game_id"].clone();
        let probability = json!({
            "op": "probability", "game_id": game_id, "actor": "player", "action": "pass"
        });
        let out = call(&service, probability.clone());
        assert!((out["data"]["probability"].as_f64().unwrap() - 0.4).abs() < 1e-9);
        // the public view reports the startup table
        let config = call(&service, json!({"op": "config"}));
        assert!((config["data"]["probabilities"]["pass"].as_f64().unwrap() - 0.80).abs() < 1e-9);

        let bad = call(
            &service,
            json!({"op": "set_override", "actor": "player", "action": "pass", "value": 3.0}),
        );
        assert_eq!(bad["error"]["code"], "INVALID_ARGUMENT");

        call(&service, json!({"op": "set_override", "actor": "player", "action": "pass"}));
        let out = call(&service, probability);
        assert!((out["data"]["probability"].as_f64().unwrap() - 0.80).abs() < 1e-9);
    }
}
