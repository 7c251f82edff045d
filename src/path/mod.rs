/// Path model for nested values
///
/// A path addresses one location inside a nested field, relative to the
/// record root `$`: `$.payload.items[0].sku`, `$.tags[*]`.
///
/// Paths are parsed once, at configuration time, into a sequence of
/// segments so the visitor never re-splits strings while walking a value.

mod error;
mod json_path;
mod segment;

pub use error::PathError;
pub use json_path::JsonPath;
pub use segment::Segment;
