//! Menu items are opaque JSON objects. The service never inspects their
//! fields; it only converts between the HTTP JSON body and the BSON document
//! stored in the collection.

use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a POST body cannot become a stored document.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("{0}")]
    NotJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("value cannot be stored: {0}")]
    Unrepresentable(#[from] bson::ser::Error),
}

/// A parsed request body, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem(Document);

impl MenuItem {
    pub fn from_json_slice(body: &[u8]) -> Result<Self, BodyError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self, BodyError> {
        if !value.is_object() {
            return Err(BodyError::NotAnObject(json_kind(&value)));
        }
        Ok(Self(bson::to_document(&value)?))
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders a stored document as plain JSON.
///
/// ObjectIds become their 24-character hex string, everything else uses
/// relaxed extended JSON.
pub fn render_document(doc: Document) -> Value {
    let map: Map<String, Value> = doc.into_iter().map(|(k, v)| (k, render_id(v))).collect();
    Value::Object(map)
}

/// Renders an inserted id (or any nested BSON value) as plain JSON.
pub fn render_id(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => render_document(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(render_id).collect()),
        other => other.into_relaxed_extjson(),
    }
}
