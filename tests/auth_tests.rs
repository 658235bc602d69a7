mod common;

use common::{PASSWORD, spawn_app};
use scribe::domain::Role;
use scribe::services::AuthError;

#[tokio::test]
async fn test_login_issues_token_for_stored_role() {
    let app = spawn_app().await;
    app.seed_user("carol", Role::Admin).await;

    let result = app
        .shared()
        .auth_service
        .login("carol@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(result.username, "carol");
    assert_eq!(result.role, Role::Admin);
    assert_eq!(result.token_type, "Bearer");

    let claims = app.shared().tokens.validate(&result.token).unwrap();
    assert_eq!(claims.username, "carol");
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn test_login_errors() {
    let app = spawn_app().await;
    app.seed_user("alice", Role::User).await;
    let auth = &app.shared().auth_service;

    let err = auth
        .login("missing@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound(_)), "{err:?}");

    let err = auth
        .login("alice@example.com", "not-the-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials), "{err:?}");
}

#[tokio::test]
async fn test_identity_resolution() {
    let app = spawn_app().await;
    let alice = app.seed_user("alice", Role::User).await;
    let identity = &app.shared().identity;

    assert_eq!(identity.resolve(None).await.unwrap(), None);
    assert_eq!(identity.resolve(Some("Basic abc")).await.unwrap(), None);

    let token = app.shared().tokens.issue("alice", Role::User).unwrap().token;
    let caller = identity
        .resolve(Some(&format!("Bearer {token}")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(caller.id, alice.id);
    assert_eq!(caller.username, "alice");
    assert_eq!(caller.role, Role::User);

    let err = identity.resolve(Some("Bearer ")).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)), "{err:?}");

    let ghost = app.shared().tokens.issue("ghost", Role::User).unwrap().token;
    let err = identity
        .resolve(Some(&format!("Bearer {ghost}")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)), "{err:?}");
}
