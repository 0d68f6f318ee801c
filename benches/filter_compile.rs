//! End-to-end benchmarks: query string to SQL, and update statements.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sieve::prelude::*;

#[allow(dead_code)]
#[derive(UpdateSet)]
struct Account {
    id: i64,
    name: Option<String>,
    email: Option<String>,
    roles: Vec<String>,
    created: i64,
    modified: i64,
}

fn bench_request_to_sql(c: &mut Criterion) {
    let config = FilterConfig::new().with_soft_delete(true).with_max_limit(100);
    let query = "where=%7B%22%24or%22%3A%5B%7B%22age%22%3A%7B%22%24gte%22%3A18%7D%7D%2C%7B%22vip%22%3Atrue%7D%5D%7D&order=-created,name&limit=20&skip=40";

    c.bench_function("request_to_sql", |b| {
        b.iter(|| {
            let filter = Filter::from_query(black_box(query), &config).unwrap();
            black_box(filter.to_sql())
        })
    });
}

fn bench_update_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_sql");

    let sparse = Account {
        id: 1,
        name: Some("ada".to_string()),
        email: None,
        roles: Vec::new(),
        created: 0,
        modified: 0,
    };
    let full = Account {
        id: 1,
        name: Some("ada".to_string()),
        email: Some("ada@example.com".to_string()),
        roles: vec!["admin".to_string(), "owner".to_string()],
        created: 0,
        modified: 0,
    };

    let mut filter = Filter::new();
    filter.where_("id", 1).soft_delete(true);

    for (name, account) in [("sparse", &sparse), ("full", &full)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), account, |b, account| {
            b.iter(|| black_box(build_update_sql("accounts", account, &filter)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_request_to_sql, bench_update_sql);
criterion_main!(benches);
