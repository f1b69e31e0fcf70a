// Document model: a backend-assigned identifier plus an ordered field map.

use std::collections::BTreeMap;

use super::value::{self, Value};

/// Field names probed, in order, when summarizing a document by its date.
const DATE_FIELD_CANDIDATES: &[&str] = &[
    "createdAt",
    "updatedAt",
    "timestamp",
    "date",
    "created",
    "modified",
];

/// A single document: backend-assigned id and an arbitrary field map.
///
/// Fields are untyped at rest and may nest arrays/maps to any depth. The
/// map is ordered so table columns and previews are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Parse a document resource from the backend (`name` + typed `fields`).
    ///
    /// The id is the last path segment of the resource name. Returns `None`
    /// when the resource has no name.
    pub fn from_resource(resource: &serde_json::Value) -> Option<Document> {
        let name = resource.get("name")?.as_str()?;
        let id = name.rsplit('/').next()?.to_string();
        let fields = resource
            .get("fields")
            .and_then(|f| f.as_object())
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), value::from_wire(v)))
                    .collect()
            })
            .unwrap_or_default();
        Some(Document { id, fields })
    }

    /// Serialize the field map back to the typed wire form.
    pub fn fields_to_wire(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), value::to_wire(v)))
            .collect()
    }

    /// A one-line summary used under the id in selection lists: the first
    /// date-like field, or any timestamp field, or the first field's
    /// truncated preview.
    pub fn date_info(&self) -> String {
        for candidate in DATE_FIELD_CANDIDATES {
            if let Some(Value::Timestamp(_)) = self.fields.get(*candidate) {
                let formatted = value::preview(&self.fields[*candidate]);
                return format!("{candidate}: {formatted}");
            }
        }
        for (name, field) in &self.fields {
            if matches!(field, Value::Timestamp(_)) {
                return format!("{name}: {}", value::preview(field));
            }
        }
        if let Some((name, field)) = self.fields.iter().next() {
            return format!("{name}: {}", value::truncate_cell(&value::preview(field), 30));
        }
        "No additional data".to_string()
    }
}

/// Collect the union of field names across documents, sorted, for the
/// field dropdowns in the query and operations consoles.
pub fn field_names(documents: &[Document]) -> Vec<String> {
    let mut names: Vec<String> = documents
        .iter()
        .flat_map(|doc| doc.fields.keys().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
