// Firestore value model and the text <-> value coercion layer.
//
// Free-text form input is coerced into a native `Value` according to the
// declared `FieldType` the operator picked; native values parse from and
// serialize to Firestore's typed-JSON wire representation; display previews
// are compact, lossy, and never round-tripped.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::json;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("invalid JSON object: {source}")]
    InvalidObject {
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// FieldType (declared type)
// ---------------------------------------------------------------------------

/// The operator-selected target type used to coerce a text input into a
/// native value. Matches the type dropdowns in the query and operations
/// consoles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Timestamp,
    Null,
}

impl FieldType {
    /// All declared types, in dropdown order.
    pub const ALL: &'static [FieldType] = &[
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
        FieldType::Timestamp,
        FieldType::Null,
    ];

    /// Label for display in type selectors.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Timestamp => "timestamp",
            FieldType::Null => "null",
        }
    }

    /// The next type in dropdown order, wrapping at the end. Used by the
    /// TUI to cycle a field's declared type with a single key.
    pub fn next(&self) -> FieldType {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A backend-native field value.
///
/// `Raw` carries the typed-JSON wire map for value kinds the console does
/// not interpret (bytes, references, geo-points). Keeping the raw map means
/// whole-document duplication re-serializes those fields byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Raw(serde_json::Map<String, serde_json::Value>),
}

impl Value {
    /// True when the value is an array (used to validate membership-operator
    /// filter values).
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
}

// ---------------------------------------------------------------------------
// Text -> Value coercion
// ---------------------------------------------------------------------------

/// Coerce operator-entered text into a native value according to the
/// declared type.
///
/// Coercion is type-stable: the same input text under the same declared type
/// always yields the same value, and unparseable input degrades to a safe
/// default instead of failing. The one exception is `object`, where
/// malformed JSON propagates as a user-visible error.
pub fn coerce(text: &str, declared: FieldType) -> Result<Value, CoerceError> {
    match declared {
        FieldType::String => Ok(Value::String(text.to_string())),
        FieldType::Number => Ok(Value::Double(text.trim().parse::<f64>().unwrap_or(0.0))),
        FieldType::Boolean => Ok(Value::Boolean(text == "true")),
        FieldType::Array => Ok(coerce_array(text)),
        FieldType::Object => {
            let parsed: serde_json::Value = serde_json::from_str(text)
                .map_err(|source| CoerceError::InvalidObject { source })?;
            Ok(from_json(parsed))
        }
        FieldType::Timestamp => Ok(match parse_timestamp_input(text) {
            Some(instant) => Value::Timestamp(instant),
            None => Value::Null,
        }),
        FieldType::Null => Ok(Value::Null),
    }
}

/// Array coercion: valid JSON arrays are converted element-by-element
/// (with date promotion); anything else is comma-split into trimmed string
/// tokens.
fn coerce_array(text: &str) -> Value {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(text) {
        return Value::Array(items.into_iter().map(from_json).collect());
    }
    Value::Array(
        text.split(',')
            .map(|token| Value::String(token.trim().to_string()))
            .collect(),
    )
}

/// Convert a plain JSON value into a native value, recursing into arrays
/// and objects.
///
/// Strings that match an ISO date (`YYYY-MM-DD`) or datetime
/// (`YYYY-MM-DDThh:mm[...]`) pattern are promoted to timestamps, even deep
/// inside nested structures. Whole JSON numbers become integers; everything
/// else becomes a double.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => match detect_iso_date(&s) {
            Some(instant) => Value::Timestamp(instant),
            None => Value::String(s),
        },
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter().map(|(k, v)| (k, from_json(v))).collect(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Date-string detection
// ---------------------------------------------------------------------------

/// Detect an ISO date or datetime string and return the instant it names.
///
/// Accepted shapes: `YYYY-MM-DD` (midnight UTC) and `YYYY-MM-DDThh:mm` with
/// optional seconds, fractional seconds, and `Z`/offset suffix. Anything
/// else, including date-like prose, returns `None` and the string is left
/// untouched by the caller.
pub fn detect_iso_date(text: &str) -> Option<DateTime<Utc>> {
    let bytes = text.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[8..10].iter().all(u8::is_ascii_digit);
    if !digits_ok {
        return None;
    }

    if bytes.len() == 10 {
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if bytes[10] != b'T' {
        return None;
    }
    parse_datetime(text)
}

/// Parse a datetime string in any accepted ISO shape.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Parse operator input for the declared `timestamp` type.
///
/// Empty (or whitespace) input means "no instant" and yields `None`; the
/// caller maps that to null. Unparseable input also yields `None` -- the
/// safe default -- rather than an error.
pub fn parse_timestamp_input(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(instant) = parse_datetime(trimmed) {
        return Some(instant);
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

/// Serialize to Firestore's typed-JSON wire representation.
///
/// Integers are string-encoded per the wire format; timestamps are RFC 3339.
pub fn to_wire(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Boolean(b) => json!({ "booleanValue": b }),
        Value::Integer(i) => json!({ "integerValue": i.to_string() }),
        Value::Double(d) => json!({ "doubleValue": d }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Timestamp(t) => {
            json!({ "timestampValue": t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true) })
        }
        Value::Array(items) => {
            let values: Vec<serde_json::Value> = items.iter().map(to_wire).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Map(fields) => {
            let mut out = serde_json::Map::new();
            for (k, v) in fields {
                out.insert(k.clone(), to_wire(v));
            }
            json!({ "mapValue": { "fields": out } })
        }
        Value::Raw(map) => serde_json::Value::Object(map.clone()),
    }
}

/// Parse a typed-JSON wire value into a native value.
///
/// Unrecognized kinds (bytesValue, referenceValue, geoPointValue, ...) are
/// kept as `Raw` so re-serialization is lossless.
pub fn from_wire(wire: &serde_json::Value) -> Value {
    let Some(map) = wire.as_object() else {
        return Value::Null;
    };
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(b) = map.get("booleanValue").and_then(|v| v.as_bool()) {
        return Value::Boolean(b);
    }
    if let Some(v) = map.get("integerValue") {
        // The wire encodes integers as strings, but accept bare numbers too.
        if let Some(i) = v.as_str().and_then(|s| s.parse::<i64>().ok()).or(v.as_i64()) {
            return Value::Integer(i);
        }
    }
    if let Some(d) = map.get("doubleValue").and_then(|v| v.as_f64()) {
        return Value::Double(d);
    }
    if let Some(s) = map.get("stringValue").and_then(|v| v.as_str()) {
        return Value::String(s.to_string());
    }
    if let Some(t) = map.get("timestampValue").and_then(|v| v.as_str()) {
        if let Ok(instant) = DateTime::parse_from_rfc3339(t) {
            return Value::Timestamp(instant.with_timezone(&Utc));
        }
        return Value::Raw(map.clone());
    }
    if let Some(arr) = map.get("arrayValue") {
        let items = arr
            .get("values")
            .and_then(|v| v.as_array())
            .map(|values| values.iter().map(from_wire).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(obj) = map.get("mapValue") {
        let fields = obj
            .get("fields")
            .and_then(|v| v.as_object())
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), from_wire(v)))
                    .collect()
            })
            .unwrap_or_default();
        return Value::Map(fields);
    }
    Value::Raw(map.clone())
}

// ---------------------------------------------------------------------------
// Display previews
// ---------------------------------------------------------------------------

/// How many array elements a preview shows before truncating.
const ARRAY_PREVIEW_LEN: usize = 3;
/// How many map entries a preview shows before truncating.
const MAP_PREVIEW_LEN: usize = 2;

/// Render a compact single-line preview of a value for table cells.
///
/// Lossy by design: nested collections truncate to a short prefix with a
/// `+N more` suffix. Never used for round-tripping.
pub fn preview(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Double(d) => format_double(*d),
        Value::String(s) => s.clone(),
        Value::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Array(items) => {
            let shown: Vec<String> = items.iter().take(ARRAY_PREVIEW_LEN).map(preview).collect();
            let rest = items.len().saturating_sub(ARRAY_PREVIEW_LEN);
            if rest > 0 {
                format!("[{}, +{} more]", shown.join(", "), rest)
            } else {
                format!("[{}]", shown.join(", "))
            }
        }
        Value::Map(fields) => {
            let shown: Vec<String> = fields
                .iter()
                .take(MAP_PREVIEW_LEN)
                .map(|(k, v)| format!("{}: {}", k, preview(v)))
                .collect();
            let rest = fields.len().saturating_sub(MAP_PREVIEW_LEN);
            if rest > 0 {
                format!("{{{}, +{} more}}", shown.join(", "), rest)
            } else {
                format!("{{{}}}", shown.join(", "))
            }
        }
        Value::Raw(map) => serde_json::Value::Object(map.clone()).to_string(),
    }
}

/// Format a double without a trailing `.0` for whole values.
fn format_double(d: f64) -> String {
    if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{:.1}", d)
    } else {
        format!("{}", d)
    }
}

/// Truncate a cell string to `width` characters, appending `...` when cut.
pub fn truncate_cell(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
