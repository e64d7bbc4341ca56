use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::{AuthConfig, AuthService};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{LoginInput, RegisterInput};

fn bench_auth(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let user = rt
        .block_on(svc.register(RegisterInput { email: "bench@example.com".into(), name: "Bench".into(), password: "Benchmark1".into() }))
        .unwrap();
    let token = svc.issue_token(&user).unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    c.bench_function("auth_token_authenticate", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.authenticate(&token)).unwrap();
        });
    });
}

criterion_group!(benches, bench_auth);
criterion_main!(benches);
