use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        claims::Identity,
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        errors::AuthError,
        extractors::AuthUser,
        services::AuthService,
    },
    state::AppState,
    users::PublicUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(svc, payload))]
pub async fn register(
    State(svc): State<AuthService>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AuthError> {
    let payload = payload.validate()?;
    let user = svc.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(svc, payload))]
pub async fn login(
    State(svc): State<AuthService>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AuthError> {
    let payload = payload.validate()?;
    let res = svc.login(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Identity is taken from the verified token; no database round-trip.
#[instrument(skip_all)]
pub async fn get_me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}
