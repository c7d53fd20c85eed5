use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{dto::CreatedBuyerResponse, services};
use crate::{auth::session::Session, error::AppError, state::AppState};

pub fn buyer_routes() -> Router<AppState> {
    Router::new().route("/buyers", post(create_buyer))
}

/// POST /buyers. The session is checked before the body, so an anonymous
/// caller gets 401 even for a malformed payload.
#[instrument(skip(state, session, payload))]
pub async fn create_buyer(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedBuyerResponse>), AppError> {
    let payload = match payload {
        Ok(Json(v)) => v,
        Err(rejection) => {
            debug!(error = %rejection, "buyer body is not json");
            Value::Null
        }
    };

    let id = services::create_buyer(state.store.as_ref(), session.identity(), &payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/buyers/{id}")) {
        headers.insert(LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(CreatedBuyerResponse { id })))
}
