//! XML adapters around the node model.
//!
//! The engine itself never touches text; these functions turn XML into a
//! [`Node`](crate::Node) tree and back, for the CLI and for tests.

mod compare;
mod parse;
mod serialize;

pub use compare::first_difference;
pub use parse::{parse, parse_with_options, ParseOptions};
pub use serialize::{serialize, serialize_fragment};
