//! Race Series Common Library
//!
//! I/O-free core shared by the CLI and its tests: member types, the
//! correction table, the registry and the finisher name matcher.

pub mod types;
pub mod alias;
pub mod error;
pub mod registry;
pub mod matcher;

pub use types::{Member, MatchOutcome};
pub use alias::{NameCorrections, normalize_name};
pub use error::{Error, Result};
pub use registry::{MemberRegistry, RegistryBuilder};
pub use matcher::{Candidate, MatcherConfig, NameMatcher, similarity, token_sort};
