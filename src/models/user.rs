use crate::utils::AppError;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field the profile endpoint reads from the stored user
pub const ROLE_FIELD: &str = "role";

const ID_FIELD: &str = "_id";

/// Response for POST /user
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateUserResponse {
    pub result: String,
    pub document_id: String,
}

/// Response for GET /user/all/
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UsersResponse {
    #[schema(value_type = Vec<Object>)]
    pub users: Vec<Value>,
}

/// Response for PUT and DELETE /user/{id}
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultResponse {
    pub result: String,
}

/// Successful answer of the profile API: parsed body plus the observed status (always 200)
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExternalResult {
    #[schema(value_type = Object)]
    pub response: Value,
    pub code: u16,
}

/// Response for GET /user/{id}/profile
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub status: String,
    pub external_api_response: ExternalResult,
}

/// Parses a path id into an ObjectId. Existence is not checked here.
pub fn parse_user_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::InvalidIdentifier)
}

/// Turns a raw request body into a storable document.
///
/// Absent, `null` and `{}` bodies are `MissingData`. A client-supplied `_id`
/// is dropped: the store assigns identity and updates never change it.
pub fn document_from_body(body: &[u8]) -> Result<Document, AppError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(AppError::MissingData);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let fields = match value {
        Value::Null => return Err(AppError::MissingData),
        Value::Object(fields) => fields,
        _ => return Err(AppError::InvalidBody("expected a JSON object".to_string())),
    };

    let mut document = Document::new();
    for (key, value) in fields {
        if key == ID_FIELD {
            continue;
        }
        let bson = mongodb::bson::to_bson(&value)
            .map_err(|e| AppError::InvalidBody(format!("field '{}': {}", key, e)))?;
        document.insert(key, bson);
    }

    if document.is_empty() {
        return Err(AppError::MissingData);
    }

    Ok(document)
}

/// Renders a stored document as JSON, with `_id` as a 24-character hex string.
pub fn document_to_json(document: Document) -> Value {
    let mut fields = Map::with_capacity(document.len());
    for (key, value) in document {
        let json = match (key.as_str(), value) {
            (ID_FIELD, Bson::ObjectId(id)) => Value::String(id.to_hex()),
            (_, other) => other.into_relaxed_extjson(),
        };
        fields.insert(key, json);
    }
    Value::Object(fields)
}

/// Reads the `role` of a stored user; it must be a non-empty string.
pub fn role_of(document: &Document) -> Result<&str, AppError> {
    document
        .get_str(ROLE_FIELD)
        .ok()
        .filter(|role| !role.trim().is_empty())
        .ok_or(AppError::MissingField(ROLE_FIELD))
}
