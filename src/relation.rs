use std::cell::Cell;
use std::fmt;
use std::ops::Deref;

use indexmap::IndexSet;
use log::{debug, trace};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::goal::Goal;
use crate::term::{Term, Value};

/// A ground tuple stored in a [`Relation`]
///
/// Equality and hashing are by content, which is what makes the relation a
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tuple(SmallVec<[Value; 4]>);

impl Tuple {
    /// The values of this tuple as a slice.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Converts the tuple into a vector of values.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0.into_vec()
    }
}

impl Deref for Tuple {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl<V: Into<Value>> FromIterator<V> for Tuple {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Tuple(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple(SmallVec::from_vec(values))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

/// A named set of ground tuples of one fixed arity (a fact type)
///
/// The arity is fixed by the first tuple inserted or the first pattern
/// queried, whichever comes first. Tuples are kept in insertion order.
#[derive(Debug)]
pub struct Relation {
    name: String,
    arity: Cell<Option<usize>>,
    tuples: IndexSet<Tuple>,
}

impl Relation {
    /// Creates an empty relation with no arity yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: Cell::new(None),
            tuples: IndexSet::new(),
        }
    }

    /// The relation's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The established arity, if any tuple or pattern has been seen.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        self.arity.get()
    }

    /// Number of distinct tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the relation holds no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Iterates over all tuples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    /// Fixes the arity on first use and rejects any later length mismatch.
    pub(crate) fn check_arity(&self, actual: usize) -> Result<()> {
        match self.arity.get() {
            None => {
                debug!("relation `{}` has arity {actual}", self.name);
                self.arity.set(Some(actual));
                Ok(())
            }
            Some(expected) if expected == actual => Ok(()),
            Some(expected) => Err(self.arity_mismatch(expected, actual)),
        }
    }

    pub(crate) fn arity_mismatch(&self, expected: usize, actual: usize) -> Error {
        Error::RelationArity {
            relation: self.name.clone(),
            expected,
            actual,
        }
    }

    /// Adds a ground tuple.
    ///
    /// Returns `true` if the tuple is new, `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationArity`] if the tuple's length differs from
    /// the relation's arity.
    pub fn insert<I, V>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let tuple: Tuple = values.into_iter().collect();
        self.check_arity(tuple.len())?;
        trace!("{}{tuple}", self.name);
        Ok(self.tuples.insert(tuple))
    }

    /// Adds many tuples, returning how many of them were new.
    ///
    /// Stops at the first tuple with the wrong arity; tuples before it stay
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationArity`] on the first mismatched tuple.
    pub fn insert_all<T, I, V>(&mut self, tuples: T) -> Result<usize>
    where
        T: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        tuples.into_iter().try_fold(0, |added, tuple| {
            Ok(added + usize::from(self.insert(tuple)?))
        })
    }

    /// Lazily scans for tuples matching `pattern`.
    ///
    /// A concrete value must equal the stored value; variables and wildcards
    /// match anything. Matching binds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationArity`] immediately if the pattern length is
    /// wrong; the scan itself only runs as the iterator is pulled.
    pub fn query(&self, pattern: impl Into<Vec<Term>>) -> Result<Matches<'_>> {
        let pattern = pattern.into();
        self.check_arity(pattern.len())?;
        Ok(self.scan(pattern))
    }

    /// Whether any tuple matches `pattern`. Stops at the first match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationArity`] if the pattern length is wrong.
    pub fn contains(&self, pattern: impl Into<Vec<Term>>) -> Result<bool> {
        Ok(self.query(pattern)?.next().is_some())
    }

    /// Number of tuples matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationArity`] if the pattern length is wrong.
    pub fn count(&self, pattern: impl Into<Vec<Term>>) -> Result<usize> {
        Ok(self.query(pattern)?.count())
    }

    /// A goal that unifies `pattern` against this relation's tuples.
    ///
    /// The pattern length is checked when the goal is validated (see
    /// [`Goal::validate`]).
    #[must_use]
    pub fn goal(&self, pattern: impl Into<Vec<Term>>) -> Goal<'_> {
        Goal::fact(self, pattern.into())
    }

    /// Scan without arity validation; callers have validated already.
    pub(crate) fn scan(&self, pattern: Vec<Term>) -> Matches<'_> {
        Matches {
            relation: self,
            tuples: self.tuples.iter(),
            pattern,
        }
    }
}

/// Lazy iterator over the tuples of a relation that match a pattern
#[derive(Debug, Clone)]
pub struct Matches<'r> {
    relation: &'r Relation,
    tuples: indexmap::set::Iter<'r, Tuple>,
    pattern: Vec<Term>,
}

impl Matches<'_> {
    /// The pattern being matched.
    #[must_use]
    pub fn pattern(&self) -> &[Term] {
        &self.pattern
    }

    fn matches(pattern: &[Term], tuple: &Tuple) -> bool {
        pattern.len() == tuple.len()
            && pattern.iter().zip(tuple.iter()).all(|(term, value)| match term {
                Term::Value(expected) => expected == value,
                Term::Var(_) | Term::Wildcard => true,
            })
    }
}

impl<'r> Iterator for Matches<'r> {
    type Item = &'r Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern = &self.pattern;
        self.tuples.find(|tuple| Self::matches(pattern, tuple))
    }
}

impl fmt::Display for Matches<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.relation.name)?;
        for (i, term) in self.pattern.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}
