//! Core value types for the databind engine: bindings, cell values, row
//! metadata and the shared error type.

pub mod binding;
pub mod error;
pub mod lookup;
pub mod metadata;
pub mod value;

pub use binding::{DataBinding, OwnerId, PlainBinding, ResolvedBinding};
pub use error::{DataError, Result};
pub use lookup::CaseInsensitiveMap;
pub use metadata::Metadata;
pub use value::{Value, ValueKind, ValueType};
