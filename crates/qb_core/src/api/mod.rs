pub mod game_json;

pub use game_json::{
    dispatch_json, handle_request, ApiError, ApiResponse, GameRequest, API_VERSION,
};
