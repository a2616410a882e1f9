//! Integration tests for web API authentication through the backend chain.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hookhub_auth::{
    AccountService, AuthBackendChain, AuthDecision, AuthOutcome, AuthRequest, BackendRegistry,
    IdentityProvider, MemoryIdentityProvider,
};
use hookhub_core::config::AppConfig;
use hookhub_core::config::auth::{AuthConfig, DEFAULT_AUTH_BACKEND};
use hookhub_core::error::ErrorKind;

use helpers::{ApiKeyBackend, CountingProvider, basic_header};

struct Fixture {
    chain: AuthBackendChain,
    provider: Arc<CountingProvider>,
    api_key_calls: Arc<AtomicUsize>,
}

fn fixture(backends: &[&str]) -> Fixture {
    let provider = Arc::new(CountingProvider::default());
    let api_key_calls = Arc::new(AtomicUsize::new(0));

    let mut registry = BackendRegistry::new();
    let calls = api_key_calls.clone();
    registry.register("tests::ApiKeyBackend", move |_config, provider| {
        Arc::new(ApiKeyBackend {
            provider,
            calls: calls.clone(),
        })
    });

    let config = AuthConfig {
        backends: backends.iter().map(|s| s.to_string()).collect(),
        ..AuthConfig::default()
    };
    let chain = AuthBackendChain::new(config, registry, provider.clone());

    Fixture {
        chain,
        provider,
        api_key_calls,
    }
}

#[tokio::test]
async fn test_second_backend_decides_when_first_declines() {
    let fx = fixture(&[DEFAULT_AUTH_BACKEND, "tests::ApiKeyBackend"]);
    let mut request = AuthRequest::new().with_header("Authorization", "ApiKey valid-key");

    let outcome = fx.chain.authenticate(&mut request).await.unwrap();

    let mut expected = AuthDecision::success();
    expected.headers = vec![("X-Auth-Scheme".to_string(), "ApiKey".to_string())];
    assert_eq!(outcome, AuthOutcome::Decided(expected));
    assert_eq!(fx.api_key_calls.load(Ordering::SeqCst), 1);

    // The Basic backend declined without validating or touching the session.
    assert_eq!(fx.provider.validations(), 0);
    assert!(request.session_user().is_none());
}

#[tokio::test]
async fn test_declining_backend_is_tried_first() {
    let fx = fixture(&["tests::ApiKeyBackend", DEFAULT_AUTH_BACKEND]);
    let mut request =
        AuthRequest::new().with_header("Authorization", basic_header("alice", "password"));

    let outcome = fx.chain.authenticate(&mut request).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(fx.api_key_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.provider.validations(), 1);
    assert_eq!(request.session_user().unwrap().username, "alice");
}

#[tokio::test]
async fn test_first_decisive_backend_stops_chain() {
    let fx = fixture(&[DEFAULT_AUTH_BACKEND, "tests::ApiKeyBackend"]);
    let mut request =
        AuthRequest::new().with_header("Authorization", basic_header("alice", "password"));

    let outcome = fx.chain.authenticate(&mut request).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(fx.api_key_calls.load(Ordering::SeqCst), 0);
    assert_eq!(request.session_user().unwrap().username, "alice");
}

#[tokio::test]
async fn test_matching_session_skips_validation() {
    let fx = fixture(&[]);

    let mut first = AuthRequest::new().with_header("Authorization", basic_header("alice", "password"));
    assert!(fx.chain.authenticate(&mut first).await.unwrap().is_success());
    assert_eq!(fx.provider.validations(), 1);

    let session = first.session_user().cloned().unwrap();
    let mut second = AuthRequest::new()
        .with_header("Authorization", basic_header("alice", "stale-password"))
        .with_session(session);
    assert!(fx.chain.authenticate(&mut second).await.unwrap().is_success());
    assert_eq!(fx.provider.validations(), 1);
}

#[tokio::test]
async fn test_failed_login_clears_session() {
    let fx = fixture(&[]);
    let mut first = AuthRequest::new().with_header("Authorization", basic_header("alice", "password"));
    fx.chain.authenticate(&mut first).await.unwrap();

    let session = first.session_user().cloned().unwrap();
    let mut second = AuthRequest::new()
        .with_header("Authorization", basic_header("mallory", "guess"))
        .with_session(session);
    let outcome = fx.chain.authenticate(&mut second).await.unwrap();

    assert_eq!(outcome, AuthOutcome::Decided(AuthDecision::failure()));
    assert!(second.session_user().is_none());
}

#[test]
fn test_reset_twice_rebuilds_once() {
    let fx = fixture(&["tests::ApiKeyBackend"]);

    fx.chain.backends().unwrap();
    fx.chain.backends().unwrap();
    assert_eq!(fx.chain.rebuild_count(), 1);

    fx.chain.reset();
    fx.chain.reset();
    fx.chain.backends().unwrap();
    fx.chain.backends().unwrap();
    assert_eq!(fx.chain.rebuild_count(), 2);
}

#[test]
fn test_empty_config_yields_default_backend() {
    let config = AppConfig::from_toml("[auth]\nbackends = []\n").unwrap();
    let chain = AuthBackendChain::new(
        config.auth,
        BackendRegistry::new(),
        Arc::new(CountingProvider::default()),
    );

    let backends = chain.backends().unwrap();
    assert_eq!(backends.len(), 1);
    assert_eq!(
        chain.challenge_headers().unwrap(),
        vec![(
            "WWW-Authenticate".to_string(),
            "Basic realm=\"Web API\"".to_string()
        )]
    );
}

#[test]
fn test_unknown_backend_fails_fast() {
    let fx = fixture(&[DEFAULT_AUTH_BACKEND, "myapp.auth.TokenBackend"]);

    let err = fx.chain.backends().unwrap_err();
    assert!(err.is(ErrorKind::Configuration));
    assert!(fx.chain.challenge_headers().unwrap_err().is(ErrorKind::Configuration));
}

#[tokio::test]
async fn test_account_login_with_memory_provider() {
    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.add_user("alice", "correct horse", true).unwrap();
    provider.add_user("bob", "battery staple", false).unwrap();

    let identity: Arc<dyn IdentityProvider> = provider.clone();
    let accounts = AccountService::new(identity.clone());
    let chain = AuthBackendChain::new(AuthConfig::default(), BackendRegistry::new(), identity);

    let mut request = AuthRequest::new();
    let user = accounts
        .login(&mut request, "alice", "correct horse")
        .await
        .unwrap();
    assert_eq!(request.session_user(), Some(&user));

    let err = accounts
        .login(&mut AuthRequest::new(), "bob", "battery staple")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authentication));

    let mut inactive =
        AuthRequest::new().with_header("Authorization", basic_header("bob", "battery staple"));
    let outcome = chain.authenticate(&mut inactive).await.unwrap();
    assert!(outcome.is_decisive() && !outcome.is_success());

    accounts.logout(&mut request);
    assert!(request.session_user().is_none());
}
