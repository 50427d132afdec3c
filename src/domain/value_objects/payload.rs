use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Domain fields of a queued submission, shaped like the remote row plus
/// whatever local-only bookkeeping the form layer attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordPayload(Value);

impl RecordPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Clone the payload's fields for translation into a remote row.
    pub fn to_fields(&self) -> Map<String, Value> {
        self.0.as_object().cloned().unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn validate(value: &Value) -> Result<(), String> {
        if !value.is_object() {
            return Err("Record payload must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl From<RecordPayload> for Value {
    fn from(payload: RecordPayload) -> Self {
        payload.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_objects() {
        let payload = RecordPayload::new(json!({"title": "Leak"})).unwrap();
        assert_eq!(payload.get("title"), Some(&json!("Leak")));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(RecordPayload::new(json!("plain")).is_err());
        assert!(RecordPayload::new(json!(null)).is_err());
        assert!(RecordPayload::from_json_str("[1,2]").is_err());
    }
}
