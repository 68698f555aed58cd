//! Integration tests for the authentication service.

use chrono::{Duration, Utc};
use homestay_auth::config::AuthConfig;
use homestay_auth::service::{AuthService, SessionContext};
use homestay_auth::{authorize, require_moderator, require_role, token};
use homestay_core::access::{Action, Resource, Role};
use homestay_core::error::HomestayError;
use homestay_core::models::session::CreateSession;
use homestay_core::models::user::{SignIn, SignUp, UpdateUser};
use homestay_core::repository::{SessionRepository, UserRepository};
use homestay_db::repository::{SurrealSessionRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Service = AuthService<SurrealUserRepository<Db>, SurrealSessionRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        pepper: Some("test-pepper".into()),
        ..Default::default()
    }
}

async fn setup() -> (Service, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    homestay_db::run_migrations(&db).await.unwrap();

    let service = AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
        test_config(),
    );
    (service, db)
}

fn sign_up_input(email: &str, password: &str) -> SignUp {
    SignUp {
        name: "Alice".into(),
        email: email.into(),
        password: password.into(),
        image: None,
    }
}

fn ctx() -> SessionContext {
    SessionContext {
        ip_address: Some("10.0.0.1".into()),
        user_agent: Some("test-agent".into()),
    }
}

#[tokio::test]
async fn sign_up_creates_user_role_and_session() {
    let (service, _) = setup().await;

    let issued = service
        .sign_up(sign_up_input("alice@example.com", "longenough"), ctx())
        .await
        .unwrap();

    assert_eq!(issued.user.role, Role::User);
    assert_eq!(issued.session.user_id, issued.user.id);
    assert_eq!(issued.session.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(issued.token.len(), 43);

    let resolved = service.get_session(&issued.token).await.unwrap();
    assert_eq!(resolved.user.id, issued.user.id);
    assert_eq!(resolved.session.id, issued.session.id);
}

#[tokio::test]
async fn sign_up_rejects_short_password() {
    let (service, _) = setup().await;

    let err = service
        .sign_up(sign_up_input("bob@example.com", "short"), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, HomestayError::Validation { .. }));
}

#[tokio::test]
async fn sign_up_rejects_bad_email() {
    let (service, _) = setup().await;

    let err = service
        .sign_up(sign_up_input("not-an-email", "longenough"), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, HomestayError::InvalidInput(_)));
}

#[tokio::test]
async fn duplicate_sign_up_is_conflict() {
    let (service, _) = setup().await;

    service
        .sign_up(sign_up_input("carol@example.com", "longenough"), ctx())
        .await
        .unwrap();
    let err = service
        .sign_up(sign_up_input("Carol@Example.com", "longenough"), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, HomestayError::AlreadyExists { .. }));
}

#[tokio::test]
async fn sign_in_with_correct_password() {
    let (service, _) = setup().await;
    service
        .sign_up(sign_up_input("dan@example.com", "correct-horse"), ctx())
        .await
        .unwrap();

    let issued = service
        .sign_in(
            SignIn {
                email: "DAN@example.com".into(),
                password: "correct-horse".into(),
            },
            SessionContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(issued.user.email, "dan@example.com");
}

#[tokio::test]
async fn sign_in_failures_look_identical() {
    let (service, _) = setup().await;
    service
        .sign_up(sign_up_input("erin@example.com", "correct-horse"), ctx())
        .await
        .unwrap();

    let wrong_password = service
        .sign_in(
            SignIn {
                email: "erin@example.com".into(),
                password: "battery-staple".into(),
            },
            SessionContext::default(),
        )
        .await
        .unwrap_err();
    let unknown_email = service
        .sign_in(
            SignIn {
                email: "nobody@example.com".into(),
                password: "battery-staple".into(),
            },
            SessionContext::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(matches!(
        wrong_password,
        HomestayError::AuthenticationFailed { .. }
    ));
}

#[tokio::test]
async fn sign_out_invalidates_session() {
    let (service, _) = setup().await;
    let issued = service
        .sign_up(sign_up_input("fay@example.com", "longenough"), ctx())
        .await
        .unwrap();

    service.sign_out(&issued.token).await.unwrap();

    let err = service.get_session(&issued.token).await.unwrap_err();
    assert!(matches!(err, HomestayError::AuthenticationFailed { .. }));

    // Signing out twice is harmless.
    service.sign_out(&issued.token).await.unwrap();
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let (service, _) = setup().await;

    let err = service.get_session("not-a-real-token").await.unwrap_err();
    assert!(matches!(err, HomestayError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn expired_session_is_deleted_on_lookup() {
    let (service, db) = setup().await;
    let issued = service
        .sign_up(sign_up_input("gus@example.com", "longenough"), ctx())
        .await
        .unwrap();

    let sessions = SurrealSessionRepository::new(db);
    let raw = token::generate_session_token();
    sessions
        .create(CreateSession {
            user_id: issued.user.id,
            token_hash: token::hash_session_token(&raw),
            ip_address: None,
            user_agent: None,
            expires_at: Utc::now() - Duration::minutes(1),
        })
        .await
        .unwrap();

    let err = service.get_session(&raw).await.unwrap_err();
    assert!(matches!(err, HomestayError::AuthenticationFailed { .. }));

    let lookup = sessions
        .get_by_token_hash(&token::hash_session_token(&raw))
        .await;
    assert!(matches!(lookup, Err(HomestayError::NotFound { .. })));
}

#[tokio::test]
async fn session_reflects_current_role() {
    let (service, db) = setup().await;
    let issued = service
        .sign_up(sign_up_input("hal@example.com", "longenough"), ctx())
        .await
        .unwrap();

    SurrealUserRepository::new(db)
        .update(
            issued.user.id,
            UpdateUser {
                role: Some(Role::SuperAdmin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let resolved = service.get_session(&issued.token).await.unwrap();
    assert_eq!(resolved.user.role, Role::SuperAdmin);
}

#[tokio::test]
async fn permission_guards_follow_roles() {
    let (service, db) = setup().await;
    let issued = service
        .sign_up(sign_up_input("jo@example.com", "longenough"), ctx())
        .await
        .unwrap();
    let mut user = issued.user;

    assert!(authorize(&user, Resource::Review, &[Action::Write]).is_ok());
    assert!(matches!(
        authorize(&user, Resource::Dashboard, &[Action::View]),
        Err(HomestayError::AuthorizationDenied { .. })
    ));
    assert!(require_moderator(&user).is_err());

    user = SurrealUserRepository::new(db)
        .update(
            user.id,
            UpdateUser {
                role: Some(Role::SuperUser),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(authorize(&user, Resource::Dashboard, &[Action::View, Action::Update]).is_ok());
    assert!(authorize(&user, Resource::Dashboard, &[Action::View, Action::Delete]).is_err());
    assert!(require_moderator(&user).is_ok());
    assert!(require_role(&user, Role::SuperAdmin).is_err());
}
