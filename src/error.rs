use thiserror::Error;

/// Contract violations raised by relations and rules.
///
/// A binding conflict or an empty answer is never an `Error`: those are
/// ordinary outcomes of a search and show up as an empty iterator or `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A tuple or pattern did not match the relation's established arity.
    #[error("relation `{relation}` expects {expected} arguments, but got {actual}")]
    RelationArity {
        /// Name of the relation
        relation: String,
        /// Arity fixed by the first tuple or pattern
        expected: usize,
        /// Length of the offending tuple or pattern
        actual: usize,
    },
    /// A rule was called with the wrong number of arguments.
    #[error("rule `{rule}` expects {expected} arguments, got {actual}")]
    RuleArity {
        /// Name of the rule
        rule: String,
        /// Declared arity
        expected: usize,
        /// Number of arguments supplied
        actual: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
