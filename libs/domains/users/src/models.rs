use database::firestore::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// Collection holding one profile per identity, keyed by uid
pub const USERS_COLLECTION: &str = "Users";

/// Role assigned to every self-registered account
pub const PARTICIPANT_ROLE_ID: &str = "wEXDVTBPg0Fe9Hh4Oywu";

/// Set on a profile whose identity could not be deleted
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    /// Strength is enforced by the identity provider
    #[validate(length(min = 1))]
    pub password: String,

    #[serde(default)]
    pub phone: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Profile document stored in `Users/<uid>`.
///
/// Reads return the raw document, so fields written by other clients
/// come back untouched; this type documents the shape the gateway writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub uid: String,
    pub u_name: String,
    pub email: String,
    pub number: String,
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_img: Option<String>,
}

impl UserProfile {
    /// Profile for a freshly registered participant
    pub fn participant(uid: impl Into<String>, input: &CreateUser) -> Self {
        Self {
            uid: uid.into(),
            u_name: input.name.clone(),
            email: input.email.clone(),
            number: input.phone.clone(),
            role_id: PARTICIPANT_ROLE_ID.to_string(),
            u_img: None,
        }
    }

    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("u_name".into(), Value::String(self.u_name));
        doc.insert("email".into(), Value::String(self.email));
        doc.insert("number".into(), Value::String(self.number));
        doc.insert("role_id".into(), Value::String(self.role_id));
        doc.insert("uid".into(), Value::String(self.uid));
        if let Some(img) = self.u_img {
            doc.insert("u_img".into(), Value::String(img));
        }
        doc
    }
}

/// Whether a stored profile is a leftover from an incomplete delete
pub fn is_tombstone(doc: &Document) -> bool {
    doc.contains_key(DELETED_AT_FIELD)
}

/// Uid of the identity behind a profile; falls back to the document id
pub fn identity_uid<'a>(doc: &'a Document, id: &'a str) -> &'a str {
    doc.get("uid")
        .and_then(Value::as_str)
        .filter(|uid| !uid.is_empty())
        .unwrap_or(id)
}

/// `{message}` body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
