//! Path matching benchmarks.
//!
//! Run with: `cargo bench -p trellis-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use trellis_router::{MethodRouter, PathMatcher, Router};

fn build_router(num_routes: usize) -> Router {
    let mut router = Router::new();

    for i in 0..num_routes / 3 {
        router.insert(
            &format!("/api/v1/resource{i}"),
            MethodRouter::new().get(format!("resource{i}#index")),
        );
    }

    for i in 0..num_routes / 3 {
        router.insert(
            &format!("/api/v1/resource{i}/{{id}}"),
            MethodRouter::new().get(format!("resource{i}#show")),
        );
    }

    for i in 0..num_routes / 3 {
        router.insert(
            &format!("/api/v1/org/{{org}}/resource{i}/**"),
            MethodRouter::new().get(format!("org_resource{i}#any")),
        );
    }

    router
}

fn bench_literal_pattern(c: &mut Criterion) {
    let matcher = PathMatcher::new();

    c.bench_function("literal_pattern", |b| {
        b.iter(|| black_box(matcher.matches("/api/v1/users", "/api/v1/users")));
    });
}

fn bench_variable_extraction(c: &mut Criterion) {
    let matcher = PathMatcher::new();

    c.bench_function("variable_extraction", |b| {
        b.iter(|| {
            black_box(matcher.extract_variables("/orgs/{org}/users/{id:\\d+}", "/orgs/acme/users/12345"))
        });
    });
}

fn bench_double_wildcard(c: &mut Criterion) {
    let matcher = PathMatcher::new();

    c.bench_function("double_wildcard", |b| {
        b.iter(|| black_box(matcher.matches("/static/**/img/**/*.png", "/static/a/b/img/c/d/logo.png")));
    });
}

fn bench_router_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_scaling");

    for size in [30, 90, 300] {
        let router = build_router(size);
        let last = size / 3 - 1;
        let path = format!("/api/v1/org/acme/resource{last}/deep/path");
        group.bench_with_input(BenchmarkId::from_parameter(size), &path, |b, path| {
            b.iter(|| black_box(router.match_route(&Method::GET, path)));
        });
    }

    group.finish();
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(90);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v2/nonexistent/path")));
    });
}

criterion_group!(
    benches,
    bench_literal_pattern,
    bench_variable_extraction,
    bench_double_wildcard,
    bench_router_scaling,
    bench_miss,
);
criterion_main!(benches);
