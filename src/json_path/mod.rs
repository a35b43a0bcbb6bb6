pub mod path;
pub mod resolve;

pub use path::{FieldPath, Segment, ARRAY_MARKER, EMPTY_MARKER, PATH_SEPARATOR};
pub use resolve::{project, resolve, value_at, ProjectedRecord};
