//! Small building blocks shared by the marketplace engine and server crates.
mod helpers;
mod secret;

pub use helpers::{parse_boolean_flag, parse_list, ListParseError};
pub use secret::Secret;
