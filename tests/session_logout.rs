mod common;

use common::{MockBackend, MockConfig, Wizard, HOST_APP_URL};

use profile_wizard::core::Cookie;
use profile_wizard::{ApiError, NavigationEvent};

#[tokio::test]
async fn test_unauthorized_response_logs_out() {
    let backend = MockBackend::start(MockConfig {
        reject_all: true,
        ..MockConfig::default()
    })
    .await;
    let wizard = Wizard::signed_in(&backend.base_url, "u1").await;
    wizard.session.store().storage_set("draft", "{}").await.unwrap();
    wizard
        .session
        .store()
        .cookie_set(&Cookie::new("theme", "dark").with_domain("localhost"))
        .await
        .unwrap();

    let err = wizard.client.get_timezones().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(wizard.token().await.is_none());
    assert!(wizard.session.store().storage_keys().await.unwrap().is_empty());
    assert!(wizard.session.store().cookies().await.unwrap().is_empty());
    assert!(!wizard.session.is_authenticated().await.unwrap());
    assert_eq!(
        wizard.navigator.events(),
        vec![
            NavigationEvent::ReplaceHistory(HOST_APP_URL.to_string()),
            NavigationEvent::Replace(HOST_APP_URL.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_profile_service_swallows_unauthorized() {
    let backend = MockBackend::start(MockConfig {
        reject_all: true,
        ..MockConfig::default()
    })
    .await;
    let wizard = Wizard::signed_in(&backend.base_url, "u1").await;

    assert!(wizard.profiles.get_profile(None).await.is_none());
    assert_eq!(backend.hits("GET /profiles/u1"), 1);
    assert_eq!(wizard.navigator.events().len(), 2);
}

#[tokio::test]
async fn test_token_removed_elsewhere_returns_to_host() {
    let backend = MockBackend::start(MockConfig::default()).await;
    let wizard = Wizard::signed_in(&backend.base_url, "u1").await;
    assert!(wizard.session.handle_token_removed().await.unwrap());

    wizard.session.store().storage_remove("token").await.unwrap();

    assert!(!wizard.session.handle_token_removed().await.unwrap());
    assert_eq!(
        wizard.navigator.events(),
        vec![NavigationEvent::Replace(HOST_APP_URL.to_string())]
    );
}

#[tokio::test]
async fn test_requests_carry_no_token_before_sign_in() {
    let backend = MockBackend::start(MockConfig::default()).await;
    let wizard = Wizard::with_user_cookie(&backend.base_url, "u1").await;

    assert!(!wizard.session.is_authenticated().await.unwrap());
    // no token, so the profile is not even requested
    assert!(wizard.profiles.get_profile(None).await.is_none());
    assert_eq!(backend.total_hits(), 0);
}
