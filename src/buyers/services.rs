use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    model::NewBuyer,
    validator::validate_create_buyer,
};
use crate::{auth::jwt::Identity, error::AppError, store::Store};

/// Validates `payload` and stores it as a buyer owned by the caller, together
/// with its `{created: ..}` history entry.
#[instrument(skip(store, owner, payload), fields(owner_id))]
pub async fn create_buyer(
    store: &dyn Store,
    owner: Option<&Identity>,
    payload: &Value,
) -> Result<Uuid, AppError> {
    let Some(owner) = owner else {
        warn!("create buyer without session");
        return Err(AppError::Unauthorized);
    };
    tracing::Span::current().record("owner_id", tracing::field::display(owner.id));

    let input = validate_create_buyer(payload).map_err(|issues| {
        warn!(issues = issues.len(), "buyer payload rejected");
        AppError::ValidationFailed(issues)
    })?;

    let diff = json!({ "created": &input });
    let buyer = NewBuyer {
        owner_id: owner.id,
        input,
    };
    let id = store
        .create_buyer(&buyer, &diff)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(buyer_id = %id, "buyer created");
    Ok(id)
}
