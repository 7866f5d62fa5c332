//! Small parsing utilities shared by extraction and persistence.

mod identifier;
mod numbers;

pub use identifier::{MalformedIdentifier, RepoKey, identifier, split_identifier};
pub use numbers::{ParseError, find_suffixed_number, parse_suffixed_number};
