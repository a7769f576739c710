use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{
    ServerError, expenses,
    identity::{HeaderIdentity, IdentityResolver},
    users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            identity: Arc::new(HeaderIdentity),
        }
    }

    /// Replace the default header-based identity resolver.
    pub fn with_identity(mut self, identity: impl IdentityResolver + 'static) -> Self {
        self.identity = Arc::new(identity);
        self
    }
}

/// Authenticated caller, inserted into request extensions by [`auth`].
#[derive(Clone, Debug)]
pub struct Caller(pub String);

async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(user_id) = state.identity.resolve(request.headers()) else {
        tracing::debug!("rejecting {} {}: no caller identity", request.method(), request.uri());
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(Caller(user_id));
    Ok(next.run(request).await)
}

/// Builds the application router.
///
/// Identity events are delivered by the identity provider itself and are not
/// subject to caller authentication.
pub fn app(state: ServerState) -> Router {
    Router::new()
        .route(
            "/expenses",
            get(expenses::list)
                .post(expenses::create)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/users", get(users::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/webhooks/users", post(users::event))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await
}
