//! Family tree walkthrough.
//!
//! Run with `RUST_LOG=debug cargo run --example family_tree` to see rule
//! definitions and arity decisions logged.

use anyhow::Result;
use factlog::{terms, Invocation, Relation, Rule, RuleBook, Value, Variable, Wildcard};

fn main() -> Result<()> {
    env_logger::init();

    let mut parent = Relation::new("parent");
    parent.insert_all([
        ["john", "mary"],
        ["mary", "susan"],
        ["bob", "alice"],
        ["alice", "tom"],
        ["susan", "tom"],
    ])?;

    let mut age = Relation::new("age");
    for (name, years) in [("john", 45), ("mary", 20), ("bob", 40), ("alice", 18)] {
        age.insert([Value::from(name), Value::from(years)])?;
    }

    let parent = &parent;
    let grandparent = Rule::define("grandparent", 2, move |p| {
        let y = Variable::named("Y");
        parent.goal(terms![&p[0], &y]) & parent.goal(terms![&y, &p[1]])
    })?;
    let ancestor = Rule::recursive("ancestor", 2, move |ancestor, p| {
        let y = Variable::named("Y");
        parent.goal(terms![&p[0], &p[1]])
            | (parent.goal(terms![&p[0], &y]) & ancestor.goal(terms![&y, &p[1]]))
    })?;

    let mut book = RuleBook::new();
    book.register(grandparent);
    book.register(ancestor);

    for name in book.names() {
        let Some(rule) = book.get(name) else { continue };
        match rule.invoke(terms![Wildcard, "tom"])? {
            Invocation::Query(query) => {
                println!("{query}:");
                for answer in &query {
                    println!("  {}", answer[0]);
                }
            }
            Invocation::Exists(found) => println!("{rule}: {found}"),
        }
    }

    let who = Variable::named("Who");
    let years = Variable::named("Years");
    let adult_parents = parent.goal(terms![&who, Wildcard]) & age.goal(terms![&who, &years]);
    for solution in adult_parents.solve()? {
        if solution.get(&years).and_then(Value::as_int).is_some_and(|y| y >= 18) {
            println!("adult parent: {solution}");
        }
    }

    Ok(())
}
