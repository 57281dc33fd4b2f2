use indexmap::IndexMap;
use log::debug;

use crate::rule::Rule;

/// A caller-owned catalogue of rules by name
///
/// Rules are kept in registration order. Nothing in the engine consults a
/// `RuleBook`; it exists for front ends that look rules up by name.
#[derive(Debug, Default, Clone)]
pub struct RuleBook<'a> {
    rules: IndexMap<String, Rule<'a>>,
}

impl<'a> RuleBook<'a> {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Adds `rule` under its own name, returning the rule it replaces.
    pub fn register(&mut self, rule: Rule<'a>) -> Option<Rule<'a>> {
        debug!("registering rule {rule}");
        self.rules.insert(rule.name().to_string(), rule)
    }

    /// Looks a rule up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule<'a>> {
        self.rules.get(name)
    }

    /// Whether a rule with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + use<'_, 'a> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
