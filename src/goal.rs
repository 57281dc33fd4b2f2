use std::fmt;
use std::iter;
use std::ops::{BitAnd, BitOr};
use std::ptr;
use std::rc::Rc;

use crate::error::Result;
use crate::relation::{Relation, Tuple};
use crate::rule::Rule;
use crate::solution::Solution;
use crate::term::Term;

/// Lazy stream of environments produced by evaluating a [`Goal`].
pub type Solutions<'a> = Box<dyn Iterator<Item = Solution> + 'a>;

/// A node of a goal tree
///
/// Goals borrow the relations they scan for `'a`, so a relation cannot be
/// modified while a goal over it is alive. Sub-goals are shared, which makes
/// cloning a goal cheap and lets a lazy stream keep the parts it still has
/// to evaluate.
///
/// Compose goals with `&` (conjunction) and `|` (disjunction):
///
/// ```rust
/// use factlog::{terms, Relation, Variable};
///
/// let mut parent = Relation::new("parent");
/// parent.insert(["john", "mary"]).unwrap();
/// parent.insert(["mary", "susan"]).unwrap();
///
/// let (x, y, z) = (Variable::named("X"), Variable::named("Y"), Variable::named("Z"));
/// let grandparent = parent.goal(terms![&x, &y]) & parent.goal(terms![&y, &z]);
///
/// let found: Vec<_> = grandparent.solve().unwrap().collect();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].get(&z), Some(&"susan".into()));
/// ```
#[derive(Debug, Clone)]
pub enum Goal<'a> {
    /// Unify a pattern against the tuples of a relation
    Fact {
        /// Relation to scan
        relation: &'a Relation,
        /// Pattern, one term per relation position
        pattern: Rc<[Term]>,
    },
    /// Both goals, left first; the right goal sees the left goal's bindings
    Conjunction(Rc<Goal<'a>>, Rc<Goal<'a>>),
    /// Every solution of the left goal, then every solution of the right
    Disjunction(Rc<Goal<'a>>, Rc<Goal<'a>>),
    /// Invoke a rule, binding the caller's variables to its answers
    Call {
        /// Rule to invoke
        rule: Rule<'a>,
        /// Arguments, one term per rule parameter
        args: Rc<[Term]>,
    },
}

impl<'a> Goal<'a> {
    pub(crate) fn fact(relation: &'a Relation, pattern: Vec<Term>) -> Self {
        Goal::Fact {
            relation,
            pattern: pattern.into(),
        }
    }

    pub(crate) fn call(rule: Rule<'a>, args: Vec<Term>) -> Self {
        Goal::Call {
            rule,
            args: args.into(),
        }
    }

    /// Checks every pattern and call in the tree against the arity of the
    /// relation or rule it targets.
    ///
    /// Relations that have no arity yet take it from the pattern, but only
    /// once the whole tree has passed; a failed validation fixes nothing.
    /// Rule bodies are not descended into; they were checked when the rule
    /// was defined.
    ///
    /// # Errors
    ///
    /// Returns the first arity mismatch found, left to right.
    pub fn validate(&self) -> Result<()> {
        let mut pending = Vec::new();
        self.check(&mut pending)?;
        for (relation, arity) in pending {
            relation.check_arity(arity)?;
        }
        Ok(())
    }

    /// Arity check without side effects. New arities for relations that
    /// have none yet are collected in `pending`.
    fn check(&self, pending: &mut Vec<(&'a Relation, usize)>) -> Result<()> {
        match self {
            Goal::Fact { relation, pattern } => {
                let relation: &'a Relation = *relation;
                let actual = pattern.len();
                let expected = relation.arity().or_else(|| {
                    pending
                        .iter()
                        .find(|(seen, _)| ptr::eq(*seen, relation))
                        .map(|(_, arity)| *arity)
                });
                match expected {
                    Some(expected) if expected != actual => {
                        Err(relation.arity_mismatch(expected, actual))
                    }
                    Some(_) => Ok(()),
                    None => {
                        pending.push((relation, actual));
                        Ok(())
                    }
                }
            }
            Goal::Conjunction(left, right) | Goal::Disjunction(left, right) => {
                left.check(pending)?;
                right.check(pending)
            }
            Goal::Call { rule, args } => rule.check_arity(args.len()),
        }
    }

    /// Validates the tree, then evaluates it from an empty environment.
    ///
    /// # Errors
    ///
    /// Returns an arity error found by [`Goal::validate`].
    pub fn solve(&self) -> Result<Solutions<'a>> {
        self.validate()?;
        Ok(self.evaluate(Solution::new()))
    }

    /// Lazily yields every extension of `env` for which this goal holds.
    ///
    /// Nothing is scanned until the stream is pulled, and dropping the
    /// stream abandons the rest of the search. Assumes a validated tree;
    /// a pattern of the wrong length simply matches nothing.
    #[must_use]
    pub fn evaluate(&self, env: Solution) -> Solutions<'a> {
        match self {
            Goal::Fact { relation, pattern } => {
                let relation: &'a Relation = *relation;
                let narrowed = pattern.iter().map(|term| substitute(term, &env)).collect();
                let pattern = Rc::clone(pattern);
                Box::new(
                    relation
                        .scan(narrowed)
                        .filter_map(move |tuple| unify(&pattern, tuple, &env)),
                )
            }
            Goal::Conjunction(left, right) => {
                let right = Rc::clone(right);
                Box::new(
                    left.evaluate(env)
                        .flat_map(move |solution| right.evaluate(solution)),
                )
            }
            Goal::Disjunction(left, right) => {
                let right = Rc::clone(right);
                let first = left.evaluate(env.clone());
                Box::new(first.chain(Deferred::new(move || right.evaluate(env))))
            }
            Goal::Call { rule, args } => {
                let rule = rule.clone();
                let args: Vec<Term> = args.iter().map(|term| substitute(term, &env)).collect();
                Box::new(Deferred::new(move || rule.resolve(args, env)))
            }
        }
    }
}

impl<'a> BitAnd for Goal<'a> {
    type Output = Goal<'a>;

    fn bitand(self, rhs: Goal<'a>) -> Goal<'a> {
        Goal::Conjunction(Rc::new(self), Rc::new(rhs))
    }
}

impl<'a> BitOr for Goal<'a> {
    type Output = Goal<'a>;

    fn bitor(self, rhs: Goal<'a>) -> Goal<'a> {
        Goal::Disjunction(Rc::new(self), Rc::new(rhs))
    }
}

impl fmt::Display for Goal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Fact { relation, pattern } => write_call(f, relation.name(), pattern),
            Goal::Conjunction(left, right) => write!(f, "{left} & {right}"),
            Goal::Disjunction(left, right) => write!(f, "({left} | {right})"),
            Goal::Call { rule, args } => write_call(f, rule.name(), args),
        }
    }
}

pub(crate) fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: &[Term]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, term) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}

/// Replaces a variable already bound in `env` by its value.
fn substitute(term: &Term, env: &Solution) -> Term {
    match term {
        Term::Var(var) => env
            .get(var)
            .map_or_else(|| term.clone(), |value| Term::Value(value.clone())),
        Term::Value(_) | Term::Wildcard => term.clone(),
    }
}

/// Extends `env` so that `pattern` equals `tuple`, or fails on a conflict.
fn unify(pattern: &[Term], tuple: &Tuple, env: &Solution) -> Option<Solution> {
    pattern
        .iter()
        .zip(tuple.iter())
        .try_fold(env.clone(), |acc, (term, value)| match term {
            Term::Var(var) => acc.bind(var, value.clone()),
            Term::Value(expected) => (expected == value).then_some(acc),
            Term::Wildcard => Some(acc),
        })
}

/// An iterator that is only built on its first pull.
pub(crate) struct Deferred<F, I> {
    init: Option<F>,
    inner: Option<I>,
}

impl<F, I> Deferred<F, I>
where
    F: FnOnce() -> I,
    I: Iterator,
{
    pub(crate) fn new(init: F) -> Self {
        Self {
            init: Some(init),
            inner: None,
        }
    }
}

impl<F, I> Iterator for Deferred<F, I>
where
    F: FnOnce() -> I,
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if let Some(init) = self.init.take() {
            self.inner = Some(init());
        }
        self.inner.as_mut()?.next()
    }
}

/// A stream with no solutions.
pub(crate) fn failure<'a>() -> Solutions<'a> {
    Box::new(iter::empty())
}
