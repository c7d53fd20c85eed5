use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap},
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{Credentials, MessageResponse, PublicUser},
    services,
    session::session_cookie,
};
use crate::{error::AppError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

/// A body that is not JSON credentials counts as missing fields; the rejection
/// text stays in the log.
fn read_credentials(
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Credentials, AppError> {
    match payload {
        Ok(Json(c)) => Ok(c),
        Err(rejection) => {
            warn!(error = %rejection, "credentials body rejected");
            Err(AppError::MissingFields)
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let payload = read_credentials(payload)?;
    let Some((email, password)) = payload.present() else {
        warn!("signup missing fields");
        return Err(AppError::MissingFields);
    };

    services::signup(state.store.as_ref(), email, password).await?;

    Ok(Json(MessageResponse {
        message: "Sign up successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(HeaderMap, Json<PublicUser>), AppError> {
    let payload = read_credentials(payload)?;
    let Some((email, password)) = payload.present() else {
        warn!("login missing fields");
        return Err(AppError::MissingFields);
    };

    let (identity, token) =
        services::login(state.store.as_ref(), &state.keys, email, password).await?;

    let cookie = session_cookie(
        &token,
        state.keys.ttl().as_secs(),
        state.config.cookie_secure,
    )
    .map_err(|e| AppError::Internal(e.into()))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((
        headers,
        Json(PublicUser {
            id: identity.id,
            email: identity.email,
        }),
    ))
}
