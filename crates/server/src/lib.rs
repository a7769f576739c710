use api_types::ErrorResponse;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use identity::{HeaderIdentity, IdentityResolver, USER_ID_HEADER};
pub use server::{ServerState, app, run_with_listener};

mod expenses;
mod identity;
mod server;
mod users;
mod views;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{
            AmountInput, ExpenseDelete, ExpenseNew, ExpenseUpdate, ExpenseView, ParticipantView,
        };
    }

    pub mod user {
        pub use api_types::user::{UserEvent, UserEventData, UserView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    /// No caller identity could be resolved.
    Unauthorized,
    Engine(EngineError),
    BadRequest(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Unreadable or wrong-typed JSON bodies are reported like any other bad input.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
