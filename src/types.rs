use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// How the set of scheduled units is derived from the requested targets.
///
/// - `Deep`: the targets plus everything they transitively depend on.
/// - `Reverse`: the targets plus everything in the project that transitively
///   depends on them (propagate a change forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolveStrategy {
    #[default]
    Deep,
    Reverse,
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveStrategy::Deep => write!(f, "deep"),
            ResolveStrategy::Reverse => write!(f, "reverse"),
        }
    }
}
