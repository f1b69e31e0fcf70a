// Query descriptors and their translation to the backend's structured-query
// wire form.
//
// The query console edits a `QueryForm` (raw text values + declared types);
// submitting it coerces the values and produces a `QuerySpec`, which
// translates to exactly one structured-query request.

use serde_json::json;

use super::value::{self, CoerceError, FieldType, Value};

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Filter operators, matching the backend's comparison and membership set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FilterOp {
    /// All operators, in dropdown order.
    pub const ALL: &'static [FilterOp] = &[
        FilterOp::Equal,
        FilterOp::NotEqual,
        FilterOp::LessThan,
        FilterOp::LessThanOrEqual,
        FilterOp::GreaterThan,
        FilterOp::GreaterThanOrEqual,
        FilterOp::ArrayContains,
        FilterOp::ArrayContainsAny,
        FilterOp::In,
        FilterOp::NotIn,
    ];

    /// The operator's symbolic form as shown in the query console.
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Equal => "==",
            FilterOp::NotEqual => "!=",
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::GreaterThan => ">",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::ArrayContainsAny => "array-contains-any",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
        }
    }

    /// Parse the symbolic form back into an operator.
    pub fn parse(symbol: &str) -> Option<FilterOp> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// The backend's wire name for the operator.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FilterOp::Equal => "EQUAL",
            FilterOp::NotEqual => "NOT_EQUAL",
            FilterOp::LessThan => "LESS_THAN",
            FilterOp::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOp::GreaterThan => "GREATER_THAN",
            FilterOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOp::ArrayContains => "ARRAY_CONTAINS",
            FilterOp::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
            FilterOp::In => "IN",
            FilterOp::NotIn => "NOT_IN",
        }
    }

    /// Membership operators take an array of candidate values.
    pub fn is_membership(&self) -> bool {
        matches!(
            self,
            FilterOp::ArrayContainsAny | FilterOp::In | FilterOp::NotIn
        )
    }

    /// The next operator in dropdown order, wrapping at the end.
    pub fn next(&self) -> FilterOp {
        let idx = Self::ALL.iter().position(|op| op == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Ordering direction for the optional single-field sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn wire_name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASCENDING",
            SortDirection::Descending => "DESCENDING",
        }
    }

    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Short label for the query console.
    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

// ---------------------------------------------------------------------------
// Form (raw text) and spec (coerced) descriptors
// ---------------------------------------------------------------------------

/// One filter row as edited in the query console: raw text plus the
/// operator-selected declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub field: String,
    pub op: FilterOp,
    pub value_text: String,
    pub declared: FieldType,
}

impl Default for FilterForm {
    fn default() -> Self {
        FilterForm {
            field: String::new(),
            op: FilterOp::Equal,
            value_text: String::new(),
            declared: FieldType::String,
        }
    }
}

/// The query console's full edit state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryForm {
    pub filters: Vec<FilterForm>,
    pub order_field: String,
    pub order_direction: SortDirection,
    pub limit_text: String,
}

impl QueryForm {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.order_field.is_empty() && self.limit_text.is_empty()
    }
}

/// A coerced filter ready for translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Optional single-field ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// A fully coerced query descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u32>,
}

impl QuerySpec {
    /// Coerce a form into a spec.
    ///
    /// Filter rows with an empty field or empty value text are dropped
    /// before submission. A non-numeric or non-positive limit means "no
    /// limit". Malformed JSON in an `object`-typed filter value propagates.
    pub fn from_form(form: &QueryForm) -> Result<QuerySpec, CoerceError> {
        let mut filters = Vec::new();
        for row in &form.filters {
            // An empty value row is treated as unfinished input and skipped,
            // rather than coerced to a zero value and matched against.
            if row.field.trim().is_empty() || row.value_text.trim().is_empty() {
                continue;
            }
            filters.push(Filter {
                field: row.field.trim().to_string(),
                op: row.op,
                value: value::coerce(&row.value_text, row.declared)?,
            });
        }

        let order_by = if form.order_field.trim().is_empty() {
            None
        } else {
            Some(OrderBy {
                field: form.order_field.trim().to_string(),
                direction: form.order_direction,
            })
        };

        let limit = form
            .limit_text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0);

        Ok(QuerySpec {
            filters,
            order_by,
            limit,
        })
    }

    /// True when the spec constrains nothing and is equivalent to a full
    /// collection fetch.
    pub fn is_unconstrained(&self) -> bool {
        self.filters.is_empty() && self.order_by.is_none() && self.limit.is_none()
    }
}

// ---------------------------------------------------------------------------
// Wire translation
// ---------------------------------------------------------------------------

/// Build the structured-query request body for a collection and spec.
pub fn structured_query(collection: &str, spec: &QuerySpec) -> serde_json::Value {
    let mut query = serde_json::Map::new();
    query.insert("from".to_string(), json!([{ "collectionId": collection }]));

    match spec.filters.len() {
        0 => {}
        1 => {
            query.insert("where".to_string(), field_filter(&spec.filters[0]));
        }
        _ => {
            let clauses: Vec<serde_json::Value> =
                spec.filters.iter().map(field_filter).collect();
            query.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": clauses } }),
            );
        }
    }

    if let Some(ref order) = spec.order_by {
        query.insert(
            "orderBy".to_string(),
            json!([{
                "field": { "fieldPath": order.field },
                "direction": order.direction.wire_name(),
            }]),
        );
    }

    if let Some(limit) = spec.limit {
        query.insert("limit".to_string(), json!(limit));
    }

    json!({ "structuredQuery": query })
}

fn field_filter(filter: &Filter) -> serde_json::Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field },
            "op": filter.op.wire_name(),
            "value": value::to_wire(&filter.value),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
