//! # Factlog
//!
//! A small embedded logic programming engine in Rust.
//!
//! ## Features
//!
//! - Relations of ground tuples with lazy pattern queries
//! - Goal trees of fact patterns, conjunctions, disjunctions and rule calls
//! - Rules with fresh variables per call, so recursion and reuse are safe
//! - Lazy backtracking: answers are computed only as they are pulled
//!
//! ## Example
//!
//! ```rust
//! use factlog::{terms, Relation, Rule, Variable, Wildcard};
//!
//! let mut parent = Relation::new("parent");
//! parent
//!     .insert_all([["john", "mary"], ["mary", "susan"], ["bob", "alice"], ["alice", "tom"]])
//!     .unwrap();
//!
//! let grandparent = Rule::define("grandparent", 2, |p| {
//!     let y = Variable::named("Y");
//!     parent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
//! })
//! .unwrap();
//!
//! assert!(grandparent.exists(terms!["john", "susan"]).unwrap());
//! assert_eq!(grandparent.query(terms![Wildcard, Wildcard]).unwrap().iter().count(), 2);
//! ```

/// Error types.
pub mod error;
/// Goal trees and their evaluation.
pub mod goal;
/// Named rule catalogue.
pub mod registry;
/// Fact relations.
pub mod relation;
/// Rules.
pub mod rule;
/// Binding environments.
pub mod solution;
/// Values, variables and terms.
pub mod term;

pub use error::{Error, Result};
pub use goal::{Goal, Solutions};
pub use registry::RuleBook;
pub use relation::{Matches, Relation, Tuple};
pub use rule::{Answers, Invocation, Rule, RuleQuery};
pub use solution::Solution;
pub use term::{Term, Value, ValueKind, Variable, Wildcard};
