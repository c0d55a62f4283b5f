//! Tests for the account service.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockSessionTokens, MockUserRepository, StoredCredentials,
};
use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, patient};
use crate::domain::{
    ErrorCode, PasswordHash, RegistrationDraft, RegistrationProfile, Role, SessionToken,
};

fn registration() -> Registration {
    let draft = RegistrationDraft {
        name: "Alice",
        email: "Alice@Example.com",
        password: "correct horse",
        role: Some(Role::Patient),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1),
        specialization: None,
        consent: true,
    };
    Registration::try_from_draft(&draft, fixture_timestamp().date_naive())
        .expect("valid registration")
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("alice@example.com", password).expect("valid credentials")
}

fn accepting_tokens() -> MockSessionTokens {
    let mut tokens = MockSessionTokens::new();
    tokens
        .expect_issue()
        .returning(|caller| Ok(SessionToken::new(format!("token-for-{}", caller.id))));
    tokens
}

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockSessionTokens,
) -> AccountService<MockUserRepository> {
    AccountService::new(
        Arc::new(users),
        Arc::new(hasher),
        Arc::new(tokens),
        fixture_clock(),
    )
}

#[tokio::test]
async fn register_hashes_password_and_issues_token() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "correct horse")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$argon2id$stub")));

    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|new_user| {
            new_user.email.to_string() == "alice@example.com"
                && new_user.password_hash.as_str() == "$argon2id$stub"
                && new_user.created_at == fixture_timestamp()
                && matches!(new_user.profile, RegistrationProfile::Patient { .. })
        })
        .times(1)
        .returning(|new_user| {
            let mut user = patient("Alice", None);
            user.id = new_user.id;
            Ok(user)
        });

    let session = service(users, hasher, accepting_tokens())
        .register(registration())
        .await
        .expect("registration succeeds");

    assert_eq!(
        session.token.as_str(),
        format!("token-for-{}", session.user.id)
    );
    assert_eq!(session.user.role(), Role::Patient);
}

#[tokio::test]
async fn register_maps_duplicate_email_to_conflict() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("$argon2id$stub")));
    let mut users = MockUserRepository::new();
    users.expect_insert().return_once(|new_user| {
        Err(UserRepositoryError::duplicate_email(
            new_user.email.to_string(),
        ))
    });
    let mut tokens = MockSessionTokens::new();
    tokens.expect_issue().times(0);

    let error = service(users, hasher, tokens)
        .register(registration())
        .await
        .expect_err("duplicate email rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], "email");
}

#[tokio::test]
async fn register_maps_connection_error_to_service_unavailable() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("$argon2id$stub")));
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

    let error = service(users, hasher, MockSessionTokens::new())
        .register(registration())
        .await
        .expect_err("connection failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn login_succeeds_with_matching_password() {
    let alice = patient("Alice", None);
    let expected_id = alice.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials_by_email()
        .withf(|email| email.to_string() == "alice@example.com")
        .return_once(move |_| {
            Ok(Some(StoredCredentials {
                user: alice,
                password_hash: PasswordHash::new("$argon2id$stored"),
            }))
        });
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, hash| password == "correct horse" && hash.as_str() == "$argon2id$stored")
        .return_once(|_, _| Ok(true));

    let session = service(users, hasher, accepting_tokens())
        .login(credentials("correct horse"))
        .await
        .expect("login succeeds");

    assert_eq!(session.user.id, expected_id);
}

#[rstest]
#[case::unknown_email(false)]
#[case::wrong_password(true)]
#[tokio::test]
async fn login_failures_are_indistinguishable(#[case] account_exists: bool) {
    let mut users = MockUserRepository::new();
    users.expect_find_credentials_by_email().return_once(move |_| {
        Ok(account_exists.then(|| StoredCredentials {
            user: patient("Alice", None),
            password_hash: PasswordHash::new("$argon2id$stored"),
        }))
    });
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(false));
    let mut tokens = MockSessionTokens::new();
    tokens.expect_issue().times(0);

    let error = service(users, hasher, tokens)
        .login(credentials("wrong password"))
        .await
        .expect_err("login rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[rstest]
#[case(SessionTokenError::Malformed, ErrorCode::Unauthorized)]
#[case(SessionTokenError::BadSignature, ErrorCode::Unauthorized)]
#[case(SessionTokenError::Expired, ErrorCode::Unauthorized)]
#[case(SessionTokenError::signing("no key"), ErrorCode::InternalError)]
fn authenticate_maps_token_errors(#[case] failure: SessionTokenError, #[case] code: ErrorCode) {
    let mut tokens = MockSessionTokens::new();
    tokens.expect_verify().return_once(move |_| Err(failure));

    let error = service(MockUserRepository::new(), MockPasswordHasher::new(), tokens)
        .authenticate("abc.def.ghi")
        .expect_err("token rejected");

    assert_eq!(error.code(), code);
}

#[test]
fn authenticate_returns_verified_caller() {
    let alice = patient("Alice", None);
    let expected = Caller::for_user(&alice);
    let mut tokens = MockSessionTokens::new();
    tokens.expect_verify().return_once(move |_| Ok(expected));

    let caller = service(MockUserRepository::new(), MockPasswordHasher::new(), tokens)
        .authenticate("abc.def.ghi")
        .expect("token accepted");

    assert_eq!(caller, expected);
}
