use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::goal::{failure, write_call, Goal, Solutions};
use crate::solution::Solution;
use crate::term::{Term, Variable};

type Builder<'a> = dyn Fn(&Rule<'a>, &[Variable]) -> Goal<'a> + 'a;

struct RuleDef<'a> {
    name: String,
    arity: usize,
    builder: Box<Builder<'a>>,
}

/// A named, parameterised goal tree
///
/// The body is produced by a builder function from a list of parameter
/// variables. Every invocation builds the body again from brand-new
/// variables, so two calls to the same rule (including a rule that reaches
/// itself through other rules) never share a variable. A `Rule` holds no
/// mutable state and clones share the definition.
///
/// ```rust
/// use factlog::{terms, Relation, Rule, Variable, Wildcard};
///
/// let mut parent = Relation::new("parent");
/// parent.insert_all([["john", "mary"], ["mary", "susan"]]).unwrap();
///
/// let grandparent = Rule::define("grandparent", 2, |p| {
///     let y = Variable::named("Y");
///     parent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
/// })
/// .unwrap();
///
/// assert!(grandparent.exists(terms!["john", "susan"]).unwrap());
/// let answers: Vec<_> = grandparent.query(terms![Wildcard, "susan"]).unwrap().iter().collect();
/// assert_eq!(answers, vec![terms!["john", "susan"]]);
/// ```
#[derive(Clone)]
pub struct Rule<'a> {
    def: Rc<RuleDef<'a>>,
}

impl<'a> Rule<'a> {
    /// Defines a rule of `arity` parameters whose body is `builder(params)`.
    ///
    /// Nothing is evaluated. The builder runs once against placeholder
    /// parameters so that arity errors in the body surface here.
    ///
    /// # Errors
    ///
    /// Returns the first arity mismatch in the body.
    pub fn define<F>(name: impl Into<String>, arity: usize, builder: F) -> Result<Self>
    where
        F: Fn(&[Variable]) -> Goal<'a> + 'a,
    {
        Self::recursive(name, arity, move |_, params| builder(params))
    }

    /// Like [`Rule::define`], but the builder also receives the rule itself
    /// so the body can call it.
    ///
    /// ```rust
    /// use factlog::{terms, Relation, Rule, Variable, Wildcard};
    ///
    /// let mut parent = Relation::new("parent");
    /// parent.insert_all([["a", "b"], ["b", "c"], ["c", "d"]]).unwrap();
    ///
    /// let ancestor = Rule::recursive("ancestor", 2, |ancestor, p| {
    ///     let y = Variable::named("Y");
    ///     parent.goal(terms![&p[0], &p[1]])
    ///         | (parent.goal(terms![&p[0], &y]) & ancestor.goal(terms![&y, &p[1]]))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(ancestor.query(terms!["a", Wildcard]).unwrap().iter().count(), 3);
    /// ```
    ///
    /// Evaluation is top-down over nested lazy streams, so every level of
    /// recursion holds stack frames while it is being pulled. A chain a few
    /// thousand levels deep can overflow a default 2 MiB thread stack. Left
    /// recursion (the rule calling itself before anything narrows its
    /// arguments) never terminates.
    ///
    /// # Errors
    ///
    /// Returns the first arity mismatch in the body.
    pub fn recursive<F>(name: impl Into<String>, arity: usize, builder: F) -> Result<Self>
    where
        F: Fn(&Rule<'a>, &[Variable]) -> Goal<'a> + 'a,
    {
        let rule = Rule {
            def: Rc::new(RuleDef {
                name: name.into(),
                arity,
                builder: Box::new(builder),
            }),
        };
        let (_, body) = rule.build();
        body.validate()?;
        debug!("defined rule {rule}: {body}");
        Ok(rule)
    }

    /// The rule's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The declared number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.def.arity
    }

    pub(crate) fn check_arity(&self, actual: usize) -> Result<()> {
        if actual == self.def.arity {
            Ok(())
        } else {
            Err(Error::RuleArity {
                rule: self.def.name.clone(),
                expected: self.def.arity,
                actual,
            })
        }
    }

    /// Calls the rule.
    ///
    /// A call whose arguments are all concrete is answered with
    /// [`Invocation::Exists`]; any variable or wildcard makes it a
    /// [`Invocation::Query`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleArity`] if the argument count is wrong.
    pub fn invoke(&self, args: impl Into<Vec<Term>>) -> Result<Invocation<'a>> {
        let args = args.into();
        self.check_arity(args.len())?;
        if args.iter().any(Term::is_open) {
            Ok(Invocation::Query(RuleQuery {
                rule: self.clone(),
                pattern: args,
            }))
        } else {
            Ok(Invocation::Exists(self.first_solution(&args).is_some()))
        }
    }

    /// Whether at least one solution exists. Evaluation stops at the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleArity`] if the argument count is wrong.
    pub fn exists(&self, args: impl Into<Vec<Term>>) -> Result<bool> {
        let args = args.into();
        self.check_arity(args.len())?;
        Ok(self.first_solution(&args).is_some())
    }

    /// A lazy query for every answer to this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleArity`] if the argument count is wrong. The
    /// check happens now; evaluation waits until the query is iterated.
    pub fn query(&self, args: impl Into<Vec<Term>>) -> Result<RuleQuery<'a>> {
        let pattern = args.into();
        self.check_arity(pattern.len())?;
        Ok(RuleQuery {
            rule: self.clone(),
            pattern,
        })
    }

    /// A goal that calls this rule, for use in another rule's body.
    #[must_use]
    pub fn goal(&self, args: impl Into<Vec<Term>>) -> Goal<'a> {
        Goal::call(self.clone(), args.into())
    }

    fn first_solution(&self, args: &[Term]) -> Option<Solution> {
        let (_, body, start) = self.instantiate(args)?;
        body.evaluate(start).next()
    }

    /// Builds the body from fresh parameter variables.
    fn build(&self) -> (Vec<Variable>, Goal<'a>) {
        let params: Vec<Variable> = (0..self.def.arity)
            .map(|i| Variable::named(format!("{}.{i}", self.def.name)))
            .collect();
        let body = (self.def.builder)(self, &params);
        (params, body)
    }

    /// Fresh body plus an environment binding each concrete argument to its
    /// parameter. Open arguments leave their parameter unbound.
    fn instantiate(&self, args: &[Term]) -> Option<(Vec<Variable>, Goal<'a>, Solution)> {
        let (params, body) = self.build();
        let start = args
            .iter()
            .zip(&params)
            .try_fold(Solution::new(), |env, (arg, param)| match arg {
                Term::Value(value) => env.bind(param, value.clone()),
                Term::Var(_) | Term::Wildcard => Some(env),
            })?;
        trace!("instantiated {}: {start}", self.def.name);
        Some((params, body, start))
    }

    /// Evaluates a call made from inside a goal tree.
    ///
    /// `args` are already narrowed by the caller's bindings. Each answer is
    /// bound back into `env` at the positions holding caller variables.
    pub(crate) fn resolve(&self, args: Vec<Term>, env: Solution) -> Solutions<'a> {
        let Some((params, body, start)) = self.instantiate(&args) else {
            return failure();
        };
        Box::new(body.evaluate(start).filter_map(move |answer| {
            args.iter()
                .zip(&params)
                .try_fold(env.clone(), |acc, (arg, param)| match (arg, answer.get(param)) {
                    (Term::Var(var), Some(value)) => acc.bind(var, value.clone()),
                    _ => Some(acc),
                })
        }))
    }
}

impl fmt::Debug for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.def.name)
            .field("arity", &self.def.arity)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.def.name, self.def.arity)
    }
}

/// Outcome of [`Rule::invoke`]
#[derive(Debug)]
pub enum Invocation<'a> {
    /// All arguments were concrete: whether the call holds
    Exists(bool),
    /// Some argument was open: the answers, computed lazily
    Query(RuleQuery<'a>),
}

/// A pending rule call with at least one open argument
///
/// Each iteration instantiates the rule afresh and projects every solution
/// onto the call pattern: open positions take the value found for them,
/// concrete positions are echoed back. A position stays open only if the
/// rule body never bound it.
///
/// Projection is position by position from the rule's own parameters, so a
/// caller variable repeated across positions is not forced to one value:
/// `query(terms![&x, &x])` can answer `("a", "b")`. Use [`Rule::goal`] when
/// the repeated variable must unify; its answers are bound into the caller's
/// environment and mismatches are dropped.
#[derive(Debug, Clone)]
pub struct RuleQuery<'a> {
    rule: Rule<'a>,
    pattern: Vec<Term>,
}

impl<'a> RuleQuery<'a> {
    /// The call pattern.
    #[must_use]
    pub fn pattern(&self) -> &[Term] {
        &self.pattern
    }

    /// Starts a new enumeration of the answers.
    #[must_use]
    pub fn iter(&self) -> Answers<'a> {
        let pattern = self.pattern.clone();
        let Some((params, body, start)) = self.rule.instantiate(&pattern) else {
            return Answers {
                inner: Box::new(std::iter::empty()),
            };
        };
        Answers {
            inner: Box::new(
                body.evaluate(start)
                    .map(move |solution| project(&pattern, &params, &solution)),
            ),
        }
    }
}

fn project(pattern: &[Term], params: &[Variable], solution: &Solution) -> Vec<Term> {
    pattern
        .iter()
        .zip(params)
        .map(|(term, param)| match term {
            Term::Value(_) => term.clone(),
            Term::Var(_) | Term::Wildcard => solution
                .get(param)
                .map_or_else(|| term.clone(), |value| Term::Value(value.clone())),
        })
        .collect()
}

impl<'a> IntoIterator for &RuleQuery<'a> {
    type Item = Vec<Term>;
    type IntoIter = Answers<'a>;

    fn into_iter(self) -> Answers<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for RuleQuery<'a> {
    type Item = Vec<Term>;
    type IntoIter = Answers<'a>;

    fn into_iter(self) -> Answers<'a> {
        self.iter()
    }
}

impl fmt::Display for RuleQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self.rule.name(), &self.pattern)
    }
}

/// Lazy iterator over the answer tuples of a [`RuleQuery`]
pub struct Answers<'a> {
    inner: Box<dyn Iterator<Item = Vec<Term>> + 'a>,
}

impl Iterator for Answers<'_> {
    type Item = Vec<Term>;

    fn next(&mut self) -> Option<Vec<Term>> {
        self.inner.next()
    }
}

impl fmt::Debug for Answers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Answers").finish_non_exhaustive()
    }
}
