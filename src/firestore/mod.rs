// Firestore layer: typed values, documents, query descriptors, and the
// REST client that moves them over the wire.

pub mod client;
pub mod document;
pub mod query;
pub mod value;

pub use client::{FirestoreClient, FirestoreError};
pub use document::Document;
pub use query::{Filter, FilterForm, FilterOp, OrderBy, QueryForm, QuerySpec, SortDirection};
pub use value::{CoerceError, FieldType, Value};
