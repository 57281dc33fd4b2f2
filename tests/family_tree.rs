//! End-to-end scenarios over a small family database.

use std::cell::Cell;

use anyhow::Result;
use factlog::{terms, Error, Invocation, Relation, Rule, Term, Value, Variable, Wildcard};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parents() -> Result<Relation> {
    let mut parent = Relation::new("parent");
    parent.insert_all([
        ["john", "mary"],
        ["mary", "susan"],
        ["bob", "alice"],
        ["alice", "tom"],
    ])?;
    Ok(parent)
}

fn ages() -> Result<Relation> {
    let mut age = Relation::new("age");
    for (name, years) in [
        ("john", 45),
        ("mary", 20),
        ("bob", 40),
        ("alice", 18),
        ("susan", 5),
        ("tom", 2),
    ] {
        age.insert([Value::from(name), Value::from(years)])?;
    }
    Ok(age)
}

fn sorted_answers(answers: impl Iterator<Item = Vec<Term>>) -> Vec<Vec<Term>> {
    let mut all: Vec<Vec<Term>> = answers.collect();
    all.sort_by_key(|answer| format!("{answer:?}"));
    all
}

#[test]
fn test_family_queries_end_to_end() -> Result<()> {
    init_logging();
    let parent = parents()?;
    let age = ages()?;

    let mut all_parents: Vec<Value> = parent
        .query(terms![Wildcard, Wildcard])?
        .map(|t| t[0].clone())
        .collect();
    all_parents.dedup();
    assert_eq!(all_parents.len(), 4);

    let marys_children: Vec<Value> = parent
        .query(terms!["mary", Wildcard])?
        .map(|t| t[1].clone())
        .collect();
    assert_eq!(marys_children, vec![Value::from("susan")]);

    let adults: Vec<Value> = age
        .query(terms![Wildcard, Wildcard])?
        .filter(|t| t[1].as_int().is_some_and(|years| years >= 18))
        .map(|t| t[0].clone())
        .collect();
    assert_eq!(adults.len(), 4);

    assert!(parent.contains(terms!["john", "mary"])?);
    assert!(!parent.contains(terms!["mary", "john"])?);
    assert!(age.contains(terms!["susan", 5])?);
    Ok(())
}

#[test]
fn test_arity_is_enforced_across_operations() -> Result<()> {
    let mut relation = Relation::new("relation");
    relation.insert(["john", "friend", "mary"])?;
    assert_eq!(relation.arity(), Some(3));

    assert!(relation.contains(terms!["john", "friend", "mary"])?);
    assert_eq!(relation.count(terms![Wildcard, "friend", Wildcard])?, 1);

    let expected = Error::RelationArity {
        relation: "relation".to_string(),
        expected: 3,
        actual: 2,
    };
    assert_eq!(relation.insert(["john", "mary"]).unwrap_err(), expected);
    assert_eq!(relation.contains(terms!["john", "mary"]).unwrap_err(), expected);
    assert_eq!(relation.query(terms![Wildcard, Wildcard]).unwrap_err(), expected);
    Ok(())
}

#[test]
fn test_grandparent_rule() -> Result<()> {
    init_logging();
    let parent = parents()?;
    let grandparent = Rule::define("grandparent", 2, |p| {
        let y = Variable::named("Y");
        parent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
    })?;

    let answers = sorted_answers(grandparent.query(terms![Wildcard, Wildcard])?.iter());
    assert_eq!(
        answers,
        vec![terms!["bob", "tom"], terms!["john", "susan"]]
    );

    match grandparent.invoke(terms!["john", "susan"])? {
        Invocation::Exists(found) => assert!(found),
        Invocation::Query(q) => panic!("Ground call returned a query: {q}"),
    }
    assert!(!grandparent.exists(terms!["susan", "john"])?);
    Ok(())
}

#[test]
fn test_great_grandparent_built_from_grandparent() -> Result<()> {
    init_logging();
    let mut parent = parents()?;
    parent.insert(["susan", "tom"])?;
    let parent = &parent;

    let grandparent = Rule::define("grandparent", 2, move |p| {
        let y = Variable::named("Y");
        parent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
    })?;
    let great = Rule::define("great_grandparent", 2, {
        let grandparent = grandparent.clone();
        move |p| {
            let y = Variable::named("Y");
            grandparent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
        }
    })?;

    assert!(great.exists(terms!["john", "tom"])?);
    assert!(!great.exists(terms!["mary", "tom"])?);

    // Interleave two enumerations of the inner rule with one of the outer.
    let outer = great.query(terms![Wildcard, Wildcard])?;
    let inner = grandparent.query(terms![Wildcard, Wildcard])?;
    let mut a = inner.iter();
    let mut b = outer.iter();
    let mut c = inner.iter();
    let mut seen_a = Vec::new();
    let mut seen_b = Vec::new();
    let mut seen_c = Vec::new();
    loop {
        let (x, y, z) = (a.next(), b.next(), c.next());
        if x.is_none() && y.is_none() && z.is_none() {
            break;
        }
        seen_a.extend(x);
        seen_b.extend(y);
        seen_c.extend(z);
    }

    assert_eq!(seen_a, seen_c);
    assert_eq!(
        sorted_answers(seen_a.into_iter()),
        vec![
            terms!["bob", "tom"],
            terms!["john", "susan"],
            terms!["mary", "tom"],
        ]
    );
    assert_eq!(seen_b, vec![terms!["john", "tom"]]);
    Ok(())
}

#[test]
fn test_disjunction_of_rules_keeps_duplicates() -> Result<()> {
    let mut likes = Relation::new("likes");
    likes.insert_all([["mary", "chocolate"], ["susan", "toys"], ["alice", "books"]])?;
    let age = ages()?;

    let has_hobby = Rule::define("has_hobby", 1, |p| likes.goal(terms![&p[0], Wildcard]))?;
    let is_young = Rule::define("is_young", 1, |p| age.goal(terms![&p[0], 5]) | age.goal(terms![&p[0], 2]))?;
    let either = Rule::define("either", 1, {
        let (has_hobby, is_young) = (has_hobby.clone(), is_young.clone());
        move |p| has_hobby.goal(terms![&p[0]]) | is_young.goal(terms![&p[0]])
    })?;

    let names: Vec<Vec<Term>> = either.query(terms![Wildcard])?.iter().collect();
    assert_eq!(
        names,
        vec![
            terms!["mary"],
            terms!["susan"],
            terms!["alice"],
            terms!["susan"],
            terms!["tom"],
        ]
    );
    Ok(())
}

#[test]
fn test_rule_over_large_relation_is_lazy() -> Result<()> {
    let mut number = Relation::new("number");
    for i in 0..1000 {
        number.insert([i, i * 2])?;
    }
    let pulled = Cell::new(0);
    let seen = Rule::define("seen", 1, |p| {
        pulled.set(pulled.get() + 1);
        number.goal(terms![&p[0], Wildcard])
    })?;
    let doubled = Rule::define("doubled", 2, {
        let seen = seen.clone();
        let number = &number;
        move |p| number.goal(terms![&p[0], &p[1]]) & seen.goal(terms![&p[0]])
    })?;
    pulled.set(0);

    let first_two: Vec<Vec<Term>> = doubled.query(terms![Wildcard, Wildcard])?.iter().take(2).collect();

    assert_eq!(first_two, vec![terms![0, 0], terms![1, 2]]);
    assert_eq!(pulled.get(), 2, "Only two rows should have been joined");
    Ok(())
}

#[test]
fn test_caller_variable_is_answered_in_place() -> Result<()> {
    let parent = parents()?;
    let child_of = Rule::define("child_of", 2, |p| parent.goal(terms![&p[1], &p[0]]))?;
    let kid = Variable::typed("Kid", factlog::ValueKind::Symbol);

    let answers: Vec<Vec<Term>> = child_of.query(terms![&kid, "alice"])?.iter().collect();
    assert_eq!(answers, vec![terms!["tom", "alice"]]);

    // As a goal, the same call binds `kid` in the caller's environment.
    let bound: Vec<Value> = child_of
        .goal(terms![&kid, "alice"])
        .solve()?
        .filter_map(|s| s.get(&kid).cloned())
        .collect();
    assert_eq!(bound, vec![Value::from("tom")]);
    Ok(())
}
