#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use factlog::{terms, Relation, Rule, Variable, Wildcard};

fn chain(len: usize) -> Relation {
    let mut edge = Relation::new("edge");
    for i in 0..len {
        edge.insert([format!("n{i}"), format!("n{}", i + 1)])
            .expect("edge arity");
    }
    edge
}

/// Benchmark for adding facts to a relation
fn bench_insert_facts(c: &mut Criterion) {
    c.bench_function("insert_facts", |b| {
        b.iter(|| {
            let mut edge = Relation::new("edge");

            for i in 0..1000 {
                edge.insert(black_box([format!("node_{i}"), format!("node_{}", i + 1)]))
                    .expect("edge arity");
            }

            black_box(edge)
        });
    });
}

/// Benchmark for a two-step join rule
fn bench_join_rule(c: &mut Criterion) {
    let edge = chain(200);
    let two_step = Rule::define("two_step", 2, |p| {
        let y = Variable::named("Y");
        edge.goal(terms![&p[0], &y]) & edge.goal(terms![&y, &p[1]])
    })
    .expect("valid body");

    c.bench_function("join_rule", |b| {
        b.iter(|| {
            let query = two_step
                .query(terms![Wildcard, Wildcard])
                .expect("arity");
            black_box(query.iter().count())
        });
    });
}

/// Benchmark for a recursive reachability rule
fn bench_recursive_rule(c: &mut Criterion) {
    let edge = chain(50);
    let path = Rule::recursive("path", 2, |path, p| {
        let y = Variable::named("Y");
        edge.goal(terms![&p[0], &p[1]])
            | (edge.goal(terms![&p[0], &y]) & path.goal(terms![&y, &p[1]]))
    })
    .expect("valid body");

    c.bench_function("recursive_rule", |b| {
        b.iter(|| {
            let query = path.query(terms!["n0", Wildcard]).expect("arity");
            black_box(query.iter().count())
        });
    });
}

criterion_group!(
    benches,
    bench_insert_facts,
    bench_join_rule,
    bench_recursive_rule
);
criterion_main!(benches);
