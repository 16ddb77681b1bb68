//! Typed endpoint operations: request shape, session effects, decoding.

use crate::mock_server::{MockServerFixture, API_VERSION};
use gossip_client::forms::{ProfileUpdate, SignInForm, SignUpForm};
use gossip_client::models::{Gender, RelationshipStatus};
use gossip_client::notify::Severity;
use gossip_client::{AvatarUpload, Error, ErrorKind, SearchQuery, SessionStore};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn sign_in_stores_session_and_sends_bearer_afterwards() {
    let mut fx = MockServerFixture::new().await;
    let sign_in = fx
        .server
        .mock("POST", "/api/v1/users/sign_in")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({
            "user": {"email_or_username": "amy", "password": "secret1"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 200,
                "message": "Signed in",
                "data": {"token": "jwt-123", "user": {"id": 5, "username": "amy"}}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let profile = fx
        .server
        .mock("GET", "/api/v1/profiles/host/5")
        .match_header("authorization", "Bearer jwt-123")
        .with_status(200)
        .with_body(
            json!({
                "code": 200,
                "data": {"id": 5, "username": "amy", "gender": "female", "relationship_status": 2}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = fx.client();
    let response = client.sign_in(&SignInForm::new("amy", "secret1")).await.unwrap();
    assert_eq!(response.access_token, "jwt-123");
    assert_eq!(client.current_user().map(|u| u.id), Some(5));
    assert_eq!(fx.session.current_credential().as_deref(), Some("jwt-123"));

    let p = client.host_profile(5).await.unwrap();
    assert_eq!(p.gender, Some(Gender::Female));
    assert_eq!(p.relationship_status, Some(RelationshipStatus::Married));

    sign_in.assert_async().await;
    profile.assert_async().await;
    let notes = fx.notifications();
    assert_eq!(notes[0].severity, Severity::Success);
    assert_eq!(notes[0].message, "Welcome back, amy!");
}

#[tokio::test]
async fn sign_in_without_token_is_an_error_and_keeps_session_empty() {
    let mut fx = MockServerFixture::new().await;
    let _m = fx
        .mock_json("POST", "/users/sign_in", 200, r#"{"code":200,"data":{"user":{"id":1}}}"#)
        .await;

    let err = fx
        .client()
        .sign_in(&SignInForm::new("amy", "secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Runtime { .. }));
    assert!(!fx.session.is_signed_in());
}

#[tokio::test]
async fn invalid_forms_never_reach_the_server() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let client = fx.client();

    let err = client.sign_in(&SignInForm::new("", "")).await.unwrap_err();
    match err {
        Error::InvalidForm(errors) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {other}"),
    }

    let form = SignUpForm {
        username: "amy".into(),
        email: "amy@gossip.app".into(),
        password: "secret1".into(),
        password_confirmation: "secret2".into(),
        first_name: "Amy".into(),
        last_name: "Tran".into(),
        gender: Some(1),
    };
    assert!(matches!(client.sign_up(&form).await, Err(Error::InvalidForm(_))));

    mock.assert_async().await;
}

#[tokio::test]
async fn sign_up_wraps_form_in_user_object() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/api/v1/users/sign_up")
        .match_body(Matcher::PartialJson(json!({
            "user": {"username": "amy", "email": "amy@gossip.app", "gender": 0}
        })))
        .with_status(200)
        .with_body(r#"{"code":200,"message":"Registered"}"#)
        .create_async()
        .await;

    let form = SignUpForm {
        username: "amy".into(),
        email: "amy@gossip.app".into(),
        password: "secret1".into(),
        password_confirmation: "secret1".into(),
        first_name: "Amy".into(),
        last_name: "Tran".into(),
        gender: Some(0),
    };
    let payload = fx.client().sign_up(&form).await.unwrap();

    assert!(payload.is_done());
    mock.assert_async().await;
}

#[tokio::test]
async fn sign_out_clears_session_once() {
    let fx = MockServerFixture::signed_in("tok").await;
    let client = fx.client();

    assert!(client.sign_out());
    assert!(!client.sign_out());
    assert!(!fx.session.is_signed_in());
    assert_eq!(fx.notifications().len(), 1);
    assert_eq!(fx.notifications()[0].severity, Severity::Info);
}

#[tokio::test]
async fn search_sends_paging_params() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let mock = fx
        .server
        .mock("GET", "/api/v1/profiles/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "tran".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "12".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "code": 200,
                "data": {
                    "data": [{"id": 1, "first_name": "Amy", "last_name": "Tran"}],
                    "meta": {"pagination": {"total_pages": 3}}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = fx
        .client()
        .search_profiles(&SearchQuery::new("tran").page(2).per_page(12))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].full_name(), "Amy Tran");
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn avatar_upload_is_multipart() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let mock = fx
        .server
        .mock("PATCH", "/api/v1/profiles/avatar/4")
        .match_header("authorization", "Bearer tok")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::Regex(r#"name="raw_avatar_data"; filename="me.png""#.into()))
        .with_status(200)
        .with_body(r#"{"code":200,"data":{"url":"https://cdn.gossip.app/4.png"}}"#)
        .create_async()
        .await;

    let upload = AvatarUpload::new("me.png", "image/png", b"PNGDATA".to_vec());
    let payload = fx.client().update_avatar(4, upload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(payload.data().unwrap()["url"], json!("https://cdn.gossip.app/4.png"));
}

#[tokio::test]
async fn avatar_lookup_decodes_url() {
    let mut fx = MockServerFixture::new().await;
    let _m = fx
        .mock_json(
            "GET",
            "/profiles/avatar/4",
            200,
            r#"{"code":200,"data":{"avatar_data":{"url":"https://cdn.gossip.app/4.png"}}}"#,
        )
        .await;

    let avatar = fx.client().avatar(4).await.unwrap();
    assert_eq!(avatar.url(), Some("https://cdn.gossip.app/4.png"));
}

#[tokio::test]
async fn profile_update_sends_only_set_fields() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let mock = fx
        .server
        .mock("PATCH", format!("{}/profiles/update/4", API_VERSION).as_str())
        .match_body(Matcher::Json(json!({"bio": "hi", "relationship_status": 0})))
        .with_status(200)
        .with_body(r#"{"code":200,"message":"Profile updated"}"#)
        .create_async()
        .await;

    let update = ProfileUpdate {
        bio: Some("hi".into()),
        relationship_status: Some(RelationshipStatus::Single),
        ..Default::default()
    };
    let payload = fx.client().update_profile(4, &update).await.unwrap();

    mock.assert_async().await;
    assert!(payload.is_done());
}

#[tokio::test]
async fn guest_profile_validation_error_propagates() {
    let mut fx = MockServerFixture::signed_in("tok").await;
    let _m = fx
        .mock_json("GET", "/profiles/guest/8", 200, r#"{"code":422,"message":"Profile is private"}"#)
        .await;

    let err = fx.client().guest_profile(8).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
    assert_eq!(err.to_string(), "Profile is private");
    assert!(fx.session.is_signed_in());
}
