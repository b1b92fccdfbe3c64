//! Integration tests for account verification and credential recovery.

mod support;

use megascans_sync::AuthError;
use megascans_sync::prompt::{EMAIL_PROMPT, TOKEN_PROMPT};
use support::socket_guard::start_mock_server_or_skip;
use support::{EMAIL, TOKEN, prompter, session_for};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_authenticate_accepted_on_first_try_prompts_nothing() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{EMAIL}")))
        .and(query_param("email", EMAIL))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let answers = prompter(&[]);
    let mut session = session_for(&server, EMAIL, TOKEN, answers.clone());

    session.authenticate().await.unwrap();

    assert!(session.session().has_authenticated_once());
    assert!(answers.asked().is_empty());
    assert_eq!(session.current_credential(), TOKEN);
}

#[tokio::test]
async fn test_first_rejection_prompts_token_then_email() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/new@example.com"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let answers = prompter(&["fresh", "new@example.com"]);
    let mut session = session_for(&server, EMAIL, "stale", answers.clone());

    session.authenticate().await.unwrap();

    assert_eq!(answers.asked(), vec![TOKEN_PROMPT, EMAIL_PROMPT]);
    assert_eq!(session.current_credential(), "fresh");
    assert_eq!(session.current_account_identifier(), "new@example.com");
}

#[tokio::test]
async fn test_repeated_rejections_keep_prompting_without_limit() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer t3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    let answers = prompter(&["t1", EMAIL, "t2", EMAIL, "t3", EMAIL]);
    let mut session = session_for(&server, EMAIL, "t0", answers.clone());

    session.authenticate().await.unwrap();

    assert_eq!(answers.asked().len(), 6);
    assert_eq!(answers.remaining(), 0);
    assert_eq!(session.current_credential(), "t3");
}

#[tokio::test]
async fn test_rejection_after_success_prompts_email_only() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{EMAIL}")))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{EMAIL}")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/other@example.com"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let answers = prompter(&["other@example.com"]);
    let mut session = session_for(&server, EMAIL, TOKEN, answers.clone());

    session.authenticate().await.unwrap();
    session.authenticate().await.unwrap();

    assert_eq!(answers.asked(), vec![EMAIL_PROMPT]);
    assert_eq!(session.current_credential(), TOKEN);
    assert_eq!(session.current_account_identifier(), "other@example.com");
}

#[tokio::test]
async fn test_forbidden_is_treated_like_unauthorized() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let answers = prompter(&["fresh", EMAIL]);
    let mut session = session_for(&server, EMAIL, "stale", answers.clone());

    session.authenticate().await.unwrap();
    assert_eq!(answers.asked(), vec![TOKEN_PROMPT, EMAIL_PROMPT]);
}

#[tokio::test]
async fn test_exhausted_input_surfaces_prompt_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut session = session_for(&server, EMAIL, "stale", prompter(&[]));

    let err = session.authenticate().await.unwrap_err();
    assert!(matches!(err, AuthError::Prompt { .. }), "got {err:?}");
    assert!(!session.session().has_authenticated_once());
}

#[tokio::test]
async fn test_unexpected_status_is_an_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let answers = prompter(&["unused"]);
    let mut session = session_for(&server, EMAIL, TOKEN, answers.clone());

    let err = session.authenticate().await.unwrap_err();
    assert!(
        matches!(err, AuthError::UnexpectedStatus { status: 500, .. }),
        "got {err:?}"
    );
    assert!(answers.asked().is_empty());
}

#[tokio::test]
async fn test_refresh_credential_prompts_token_and_verifies_it() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let answers = prompter(&["renewed"]);
    let mut session = session_for(&server, EMAIL, TOKEN, answers.clone());

    session.refresh_credential().await.unwrap();

    assert_eq!(answers.asked(), vec![TOKEN_PROMPT]);
    assert_eq!(session.current_credential(), "renewed");
    assert!(session.session().has_authenticated_once());
}

#[tokio::test]
async fn test_rejected_refreshed_token_asks_for_token_again() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let answers = prompter(&["typo", "good", EMAIL]);
    let mut session = session_for(&server, EMAIL, TOKEN, answers.clone());

    session.authenticate().await.unwrap();
    session.refresh_credential().await.unwrap();

    assert_eq!(answers.asked(), vec![TOKEN_PROMPT, TOKEN_PROMPT, EMAIL_PROMPT]);
    assert_eq!(session.current_credential(), "good");
    assert_eq!(session.current_account_identifier(), EMAIL);
    assert!(session.session().has_authenticated_once());
}
