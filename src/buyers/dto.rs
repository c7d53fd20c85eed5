use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedBuyerResponse {
    pub id: Uuid,
}
