pub mod cwl_type;
pub mod field_path;
pub mod fingerprint;
pub mod issues;
pub mod ordered_map;

pub use cwl_type::{CwlType, CwlTypeError};
pub use field_path::{FieldPath, FieldPathSegment};
pub use fingerprint::{canonical_json_bytes, fingerprint_hex, FingerprintOptions};
pub use issues::{IssueSeverity, StructuredIssue};
pub use ordered_map::OrderedMap;
