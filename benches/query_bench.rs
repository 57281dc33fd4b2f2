#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use factlog::{terms, Relation, Rule, Variable, Wildcard};

fn setup_large_relation() -> Relation {
    let mut edge = Relation::new("edge");

    // 1000 nodes, each with 5 outgoing edges
    for i in 0..1000 {
        for j in 0..5 {
            let next = (i + j + 1) % 1000;
            edge.insert([format!("node_{i}"), format!("node_{next}")])
                .expect("edge arity");
        }
    }

    edge
}

fn query_first_two(c: &mut Criterion) {
    let edge = setup_large_relation();

    c.bench_function("query_first_two", |b| {
        b.iter(|| {
            let matches = edge.query(terms![Wildcard, Wildcard]).expect("arity");
            black_box(matches.take(2).count())
        });
    });
}

fn query_bound_first_position(c: &mut Criterion) {
    let edge = setup_large_relation();
    let x = Variable::named("X");

    c.bench_function("query_bound_first_position", |b| {
        b.iter(|| {
            let matches = edge.query(terms!["node_0", &x]).expect("arity");
            black_box(matches.count())
        });
    });
}

fn rule_existence_vs_count(c: &mut Criterion) {
    let edge = setup_large_relation();
    let two_step = Rule::define("two_step", 2, |p| {
        let y = Variable::named("Y");
        edge.goal(terms![&p[0], &y]) & edge.goal(terms![&y, &p[1]])
    })
    .expect("valid body");

    c.bench_function("rule_exists", |b| {
        b.iter(|| black_box(two_step.exists(terms![Wildcard, Wildcard]).expect("arity")));
    });

    c.bench_function("rule_count_all", |b| {
        b.iter(|| {
            let query = two_step
                .query(terms![Wildcard, Wildcard])
                .expect("arity");
            black_box(query.iter().count())
        });
    });
}

criterion_group!(
    benches,
    query_first_two,
    query_bound_first_position,
    rule_existence_vs_count
);
criterion_main!(benches);
