//! Patient records and their merge-on-write semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A keyed patient record: a flat mapping of field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl PatientRecord {
    /// An empty record, as created on first write.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            fields: Map::new(),
        }
    }

    /// Shallow merge: fields in `partial` overwrite same-named fields,
    /// everything else is kept.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.fields.insert(key, value);
        }
    }

    /// The record's fields as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
