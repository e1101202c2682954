//! Integration tests for sign-in, session restore and forced sign-out.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;

use devmart_integration_tests::{StubBackend, sign_in};
use devmart_storefront::api::ApiError;
use devmart_storefront::routes::{Access, Route, authorize};
use devmart_storefront::services::{AuthError, SessionState};
use devmart_storefront::storage::{MemoryStorage, Storage, keys};
use devmart_storefront::validation::{LoginForm, RegisterForm};

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(password),
    }
}

// =============================================================================
// Sign-in Tests
// =============================================================================

#[tokio::test]
async fn test_login_persists_token() {
    let backend = StubBackend::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let state = backend.storefront_with(storage.clone());

    let user = state
        .session()
        .login(&login_form("ana@devmart.test", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.username, "ana");
    assert!(!user.is_admin());
    assert!(state.session().is_authenticated());
    assert!(storage.get(keys::ACCESS_TOKEN).unwrap().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let err = state
        .session()
        .login(&login_form("ana@devmart.test", "wrong-password"))
        .await
        .unwrap_err();

    let AuthError::InvalidCredentials(message) = &err else {
        panic!("expected invalid credentials, got {err:?}");
    };
    assert_eq!(message, "Invalid credentials");
    assert_eq!(state.session().state(), SessionState::Unauthenticated);
    assert!(!state.api().tokens().is_present());
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let err = state
        .session()
        .login(&login_form("not-an-email", "123"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(backend.hits("POST /auth/login"), 0);
}

#[tokio::test]
async fn test_register_signs_in() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let form = RegisterForm {
        username: "grace".to_string(),
        email: "grace@devmart.test".to_string(),
        password: SecretString::from("hopper1"),
        confirm_password: SecretString::from("hopper1"),
    };
    let user = state.session().register(&form).await.unwrap().unwrap();
    assert_eq!(user.email.as_str(), "grace@devmart.test");
    assert!(state.session().is_authenticated());

    let again = state.session().register(&form).await.unwrap_err();
    assert!(matches!(again, AuthError::UserAlreadyExists(_)));
}

// =============================================================================
// Session Restore Tests
// =============================================================================

#[tokio::test]
async fn test_stored_token_resolves_on_restart() {
    let backend = StubBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let first = backend.storefront_with(Arc::clone(&storage));
    sign_in(&first, "admin@devmart.test", "adminpass").await;

    let second = backend.storefront_with(storage);
    assert_eq!(second.session().state(), SessionState::Unresolved);
    assert_eq!(
        authorize(&Route::Admin, &second.session().state()),
        Access::Loading
    );

    let user = second.session().resolve().await.unwrap().unwrap();
    assert!(user.is_admin());
    assert_eq!(
        authorize(&Route::Admin, &second.session().state()),
        Access::Granted
    );
}

#[tokio::test]
async fn test_expired_token_is_discarded_on_resolve() {
    let backend = StubBackend::start().await;
    let storage = Arc::new(MemoryStorage::with_entries([(
        keys::ACCESS_TOKEN,
        "token-from-last-week",
    )]));
    let state = backend.storefront_with(storage.clone());

    assert_eq!(state.session().resolve().await.unwrap(), None);
    assert_eq!(state.session().state(), SessionState::Unauthenticated);
    assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap(), None);
}

#[tokio::test]
async fn test_deleted_user_is_signed_out() {
    let backend = StubBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    sign_in(
        &backend.storefront_with(Arc::clone(&storage)),
        "ana@devmart.test",
        "secret1",
    )
    .await;
    backend.delete_user("ana@devmart.test");

    let state = backend.storefront_with(storage);
    assert_eq!(state.session().resolve().await.unwrap(), None);
    assert!(!state.api().tokens().is_present());
}

#[tokio::test]
async fn test_probe_failure_is_retried_once() {
    let backend = StubBackend::start().await;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    sign_in(
        &backend.storefront_with(Arc::clone(&storage)),
        "ana@devmart.test",
        "secret1",
    )
    .await;

    backend.fail_me(1);
    let state = backend.storefront_with(Arc::clone(&storage));
    let user = state.session().resolve().await.unwrap();
    assert!(user.is_some());
    assert_eq!(backend.hits("GET /auth/me"), 2);

    backend.fail_me(2);
    let state = backend.storefront_with(storage);
    let err = state.session().resolve().await.unwrap_err();
    assert!(matches!(err, AuthError::Api(ApiError::Server { .. })));
    assert_eq!(state.session().state(), SessionState::Unauthenticated);
    assert!(state.api().tokens().is_present());
}

// =============================================================================
// Forced Sign-out Tests
// =============================================================================

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "ana@devmart.test", "secret1").await;
    assert!(state.session().is_authenticated());

    backend.revoke_tokens();
    let err = state.api().orders().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Token has expired");
    assert!(!state.api().tokens().is_present());
    assert!(!state.session().is_authenticated());
    assert_eq!(
        authorize(&Route::Orders, &state.session().state()),
        Access::RedirectToLogin
    );
}

#[tokio::test]
async fn test_failed_login_keeps_existing_token() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "ana@devmart.test", "secret1").await;

    let err = state
        .session()
        .login(&login_form("ana@devmart.test", "wrong-password"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials(_)));
    assert!(state.api().tokens().is_present());
}

#[tokio::test]
async fn test_logout_drops_user_scoped_cache() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "ana@devmart.test", "secret1").await;

    state.api().orders().await.unwrap();
    state.api().orders().await.unwrap();
    assert_eq!(backend.hits("GET /orders/"), 1);

    state.session().logout().await;
    assert_eq!(state.session().state(), SessionState::Unauthenticated);

    sign_in(&state, "admin@devmart.test", "adminpass").await;
    state.api().orders().await.unwrap();
    assert_eq!(backend.hits("GET /orders/"), 2);
}

#[tokio::test]
async fn test_customer_is_kept_out_of_admin() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "ana@devmart.test", "secret1").await;

    assert_eq!(
        authorize(&Route::Admin, &state.session().state()),
        Access::RedirectHome
    );
    let err = state.api().update_order_status(
        devmart_core::OrderId::new(1),
        devmart_core::OrderStatus::Shipped,
    );
    assert!(matches!(err.await.unwrap_err(), ApiError::Forbidden(_)));
    assert!(state.session().is_authenticated());
}
