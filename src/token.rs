//! Resume tokens and their extraction from change documents
//!
//! A resume token is the `_id` of a change event. It is never interpreted,
//! only stored and handed back to the server when a stream is reopened.

use crate::error::{Error, Result};
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// One change event as delivered by the server
pub type ChangeDocument = Document;

/// Field that carries the resume token in every change document
pub const RESUME_TOKEN_FIELD: &str = "_id";

/// Opaque position in a change feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeToken(Document);

impl ResumeToken {
    /// Wrap a document as a resume token
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    /// Borrow the token document
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    /// Unwrap into the token document
    pub fn into_document(self) -> Document {
        self.0
    }

    /// Render as relaxed extended JSON
    pub fn to_json(&self) -> serde_json::Value {
        Bson::Document(self.0.clone()).into_relaxed_extjson()
    }
}

impl From<ResumeToken> for Document {
    fn from(token: ResumeToken) -> Self {
        token.0
    }
}

/// Extract the resume token from a change document
pub fn extract_resume_token(document: &Document) -> Result<ResumeToken> {
    match document.get(RESUME_TOKEN_FIELD) {
        None => Err(Error::ResumeTokenMissing),
        Some(Bson::Document(token)) => Ok(ResumeToken(token.clone())),
        Some(other) => Err(Error::ResumeTokenInvalidType {
            found: format!("{:?}", other.element_type()),
        }),
    }
}

/// Extract the resume token from an arbitrary BSON value
///
/// Fails with `InvalidInput` unless the value is a document.
pub fn resume_token_from_bson(value: &Bson) -> Result<ResumeToken> {
    match value {
        Bson::Document(document) => extract_resume_token(document),
        other => Err(Error::invalid_input(format!(
            "expected a change document, found {:?}",
            other.element_type()
        ))),
    }
}

/// Extract the resume token from any value that serializes to a document
///
/// The value is serialized to BSON first, then the token is read from the
/// resulting document. Typed change event structs and `serde_json::Value`
/// objects both go through here.
pub fn resume_token_of<T>(value: &T) -> Result<ResumeToken>
where
    T: Serialize + ?Sized,
{
    let bson = bson::to_bson(value)?;
    resume_token_from_bson(&bson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_extract_returns_id_document() {
        let event = doc! {
            "_id": { "_data": "8263A1F0C2000000012B022C0100296E5A1004" },
            "operationType": "insert",
            "fullDocument": { "x": 1 },
        };

        let token = extract_resume_token(&event).unwrap();
        assert_eq!(
            token.as_document(),
            &doc! { "_data": "8263A1F0C2000000012B022C0100296E5A1004" }
        );
    }

    #[test]
    fn test_extract_accepts_empty_token_document() {
        let event = doc! { "_id": {} };
        let token = extract_resume_token(&event).unwrap();
        assert!(token.as_document().is_empty());
    }

    #[test]
    fn test_extract_missing_id() {
        let event = doc! { "operationType": "insert" };
        assert!(matches!(
            extract_resume_token(&event),
            Err(Error::ResumeTokenMissing)
        ));
    }

    #[test]
    fn test_extract_scalar_id() {
        for id in [Bson::Int32(1), Bson::String("abc".into()), Bson::Null] {
            let event = doc! { "_id": id };
            assert!(matches!(
                extract_resume_token(&event),
                Err(Error::ResumeTokenInvalidType { .. })
            ));
        }
    }

    #[test]
    fn test_extract_array_id_is_invalid_type() {
        let event = doc! { "_id": [1, 2] };
        match extract_resume_token(&event) {
            Err(Error::ResumeTokenInvalidType { found }) => assert_eq!(found, "Array"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_bson_rejects_non_document() {
        assert!(matches!(
            resume_token_from_bson(&Bson::Int64(5)),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            resume_token_from_bson(&Bson::Array(vec![])),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_resume_token_of_json_object() {
        let event = json!({
            "_id": { "_data": "82" },
            "operationType": "delete"
        });
        let token = resume_token_of(&event).unwrap();
        assert_eq!(token.as_document(), &doc! { "_data": "82" });
    }

    #[test]
    fn test_resume_token_of_json_scalar_is_invalid_input() {
        assert!(matches!(
            resume_token_of(&json!(42)),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            resume_token_of(&json!("not a document")),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_resume_token_of_typed_struct() {
        #[derive(Serialize)]
        struct Event {
            #[serde(rename = "_id")]
            id: Document,
            #[serde(rename = "operationType")]
            operation_type: String,
        }

        let event = Event {
            id: doc! { "_data": "token-1" },
            operation_type: "update".to_string(),
        };
        let token = resume_token_of(&event).unwrap();
        assert_eq!(token.into_document(), doc! { "_data": "token-1" });
    }

    #[test]
    fn test_resume_token_of_struct_without_id() {
        #[derive(Serialize)]
        struct Heartbeat {
            ok: bool,
        }

        assert!(matches!(
            resume_token_of(&Heartbeat { ok: true }),
            Err(Error::ResumeTokenMissing)
        ));
    }

    #[test]
    fn test_token_json_rendering() {
        let token = ResumeToken::new(doc! { "_data": "abc" });
        assert_eq!(token.to_json(), json!({ "_data": "abc" }));
        assert_eq!(serde_json::to_value(&token).unwrap(), json!({ "_data": "abc" }));
    }
}
