use std::fmt;

use rpds::HashTrieMap;

use crate::term::{Value, Variable};

/// An immutable binding environment mapping variables to ground values.
///
/// Every extension returns a new `Solution` that shares structure with the
/// old one, so sibling branches of a search can never see each other's
/// bindings. A variable is bound at most once per lineage: rebinding it to a
/// different value yields `None` rather than an overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    bindings: HashTrieMap<Variable, Value>,
}

impl Solution {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `value`.
    ///
    /// Returns the environment unchanged if the variable is already bound to
    /// an equal value, `None` if it is bound to a different one.
    #[must_use]
    pub fn bind(&self, variable: &Variable, value: Value) -> Option<Solution> {
        match self.bindings.get(variable) {
            Some(existing) if *existing == value => Some(self.clone()),
            Some(_) => None,
            None => Some(Solution {
                bindings: self.bindings.insert(variable.clone(), value),
            }),
        }
    }

    /// The value bound to `variable`, if any.
    #[must_use]
    pub fn get(&self, variable: &Variable) -> Option<&Value> {
        self.bindings.get(variable)
    }

    /// Whether `variable` has a value in this environment.
    #[must_use]
    pub fn is_bound(&self, variable: &Variable) -> bool {
        self.bindings.contains_key(variable)
    }

    /// True iff every variable bound in both environments holds the same value.
    #[must_use]
    pub fn is_consistent(&self, other: &Solution) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .bindings
            .iter()
            .all(|(var, value)| large.get(var).map_or(true, |v| v == value))
    }

    /// Union of both environments, or `None` if they disagree on some variable.
    #[must_use]
    pub fn merge(&self, other: &Solution) -> Option<Solution> {
        if !self.is_consistent(other) {
            return None;
        }
        let bindings = other
            .bindings
            .iter()
            .fold(self.bindings.clone(), |acc, (var, value)| {
                if acc.contains_key(var) {
                    acc
                } else {
                    acc.insert(var.clone(), value.clone())
                }
            });
        Some(Solution { bindings })
    }

    /// Iterates over the bound variables, in no particular order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.bindings.keys()
    }

    /// Iterates over `(variable, value)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Value)> {
        self.bindings.iter()
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.size()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for Solution {
    /// Renders as `{X: john, Y: mary}`, ordered by variable creation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.bindings.iter().collect();
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));

        f.write_str("{")?;
        for (i, (var, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {value}", var.name())?;
        }
        f.write_str("}")
    }
}
