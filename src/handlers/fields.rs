use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// A record plus the names of the fields to transform.
#[derive(Deserialize)]
pub struct FieldsRequest {
    pub record: Map<String, Value>,
    pub fields: Vec<String>,
}

#[derive(Serialize)]
pub struct FieldsResponse {
    pub record: Map<String, Value>,
}

/// Encrypts the named fields of a record for transport to the browser.
pub async fn encrypt_fields(
    State(state): State<AppState>,
    Json(mut payload): Json<FieldsRequest>,
) -> Result<Json<FieldsResponse>> {
    for field in &payload.fields {
        state.cipher.encrypt_field(&mut payload.record, field)?;
    }

    tracing::debug!("🔒 Encrypted {} field(s)", payload.fields.len());
    Ok(Json(FieldsResponse {
        record: payload.record,
    }))
}

/// Decrypts the named fields of a record sent by the browser.
///
/// A bad envelope here came from the client, so it is a 400 rather than a 500.
pub async fn decrypt_fields(
    State(state): State<AppState>,
    Json(mut payload): Json<FieldsRequest>,
) -> Result<Json<FieldsResponse>> {
    for field in &payload.fields {
        state
            .cipher
            .decrypt_field(&mut payload.record, field)
            .map_err(AppError::InvalidEnvelope)?;
    }

    tracing::debug!("🔓 Decrypted {} field(s)", payload.fields.len());
    Ok(Json(FieldsResponse {
        record: payload.record,
    }))
}
