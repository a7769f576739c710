//! User directory endpoints.

use api_types::{
    Success,
    user::{UserEvent, UserView},
};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::UserProfile;

use crate::{
    ServerError,
    server::{Caller, ServerState},
    views::user_view,
};

const USER_CREATED: &str = "user.created";

/// Lists every user known to the directory.
pub async fn list(
    _: Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(user_view).collect()))
}

/// Sink for identity-provider events.
///
/// `user.created` upserts the user; any other event type is acknowledged and
/// ignored so the provider does not retry it.
pub async fn event(
    State(state): State<ServerState>,
    WithRejection(Json(event), _): WithRejection<Json<UserEvent>, ServerError>,
) -> Result<Json<Success>, ServerError> {
    if event.kind != USER_CREATED {
        tracing::debug!("ignoring identity event {}", event.kind);
        return Ok(Json(Success::ok()));
    }
    let Some(data) = event.data else {
        return Err(ServerError::BadRequest(format!(
            "{USER_CREATED} event without data"
        )));
    };

    let profile = UserProfile::new(
        data.id,
        data.first_name.unwrap_or_default(),
        data.last_name.unwrap_or_default(),
    );
    let user_id = profile.id.clone();
    state.engine.upsert_user(profile).await?;
    tracing::info!("directory entry for {user_id} stored");

    Ok(Json(Success::ok()))
}
