use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Source of variable ids; never reset, so an id is never handed out twice.
static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(1);

/// A ground value stored in relations and bound to variables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A boolean constant
    Bool(bool),
    /// An integer constant (e.g., `45`)
    Int(i64),
    /// A symbolic constant (e.g., `"alice"`)
    Symbol(String),
}

impl Value {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Symbol(_) => ValueKind::Symbol,
        }
    }

    /// Returns the symbol text, if this is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Symbol(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Symbol(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Symbol(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The kind of a [`Value`], usable as a variable's semantic tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::Symbol`]
    Symbol,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Symbol => "symbol",
        })
    }
}

/// A logic variable.
///
/// Two variables are the same variable only if one was cloned from the
/// other: equality, ordering and hashing go through a process-unique id and
/// never look at the name. Clones are cheap.
#[derive(Clone)]
pub struct Variable {
    id: u64,
    name: Rc<str>,
    tag: Option<ValueKind>,
}

impl Variable {
    /// Creates a variable with a generated name (e.g., `_G17`).
    #[must_use]
    pub fn new() -> Self {
        let id = Self::next_id();
        Self {
            id,
            name: format!("_G{id}").into(),
            tag: None,
        }
    }

    /// Creates a variable with the given display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            name: name.into().into(),
            tag: None,
        }
    }

    /// Creates a named variable tagged with the kind of value it stands for.
    ///
    /// The tag is informational; binding is never refused because of it.
    #[must_use]
    pub fn typed(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            tag: Some(kind),
            ..Self::named(name)
        }
    }

    fn next_id() -> u64 {
        NEXT_VARIABLE_ID.fetch_add(1, AtomicOrdering::Relaxed)
    }

    /// The process-unique id of this variable.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The semantic tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<ValueKind> {
        self.tag
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(kind) => write!(f, "var {}: {kind}", self.name),
            None => write!(f, "var {}", self.name),
        }
    }
}

/// The anonymous "match anything" term, written `_`.
///
/// Every `Wildcard` equals every other one. It never binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Wildcard;

impl fmt::Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("_")
    }
}

/// One position of a pattern or of a rule call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A concrete value that must match exactly
    Value(Value),
    /// A logic variable, bound by unification
    Var(Variable),
    /// Matches anything and binds nothing
    Wildcard,
}

impl Term {
    /// True for variables and wildcards.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Term::Value(_))
    }

    /// The concrete value, if this term has one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Term::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Value(v) => write!(f, "{v}"),
            Term::Var(v) => f.write_str(v.name()),
            Term::Wildcard => write!(f, "{Wildcard}"),
        }
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Value(v)
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Var(v)
    }
}

impl From<&Variable> for Term {
    fn from(v: &Variable) -> Self {
        Term::Var(v.clone())
    }
}

impl From<Wildcard> for Term {
    fn from(_: Wildcard) -> Self {
        Term::Wildcard
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Value(s.into())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Value(s.into())
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Value(i.into())
    }
}

impl From<i32> for Term {
    fn from(i: i32) -> Self {
        Term::Value(i.into())
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Value(b.into())
    }
}

/// Builds a `Vec<Term>` from anything convertible into a [`Term`].
///
/// ```rust
/// use factlog::{terms, Term, Variable, Wildcard};
///
/// let x = Variable::named("X");
/// let pattern = terms![&x, "mary", Wildcard, 3];
/// assert_eq!(pattern.len(), 4);
/// assert_eq!(pattern[2], Term::Wildcard);
/// ```
#[macro_export]
macro_rules! terms {
    () => {
        ::std::vec::Vec::<$crate::Term>::new()
    };
    ($($term:expr),+ $(,)?) => {
        ::std::vec![$($crate::Term::from($term)),+]
    };
}
