use reqwest::Method;
use serde_json::{Value, json};

use crate::common::{FilePart, TestApp, routes};

fn site_body() -> Value {
    json!({
        "main_bg_image": "https://res.cloudinary.com/x/image/upload/v1/site_info_media/hero.jpg",
        "membershi_plan": {"monthly": 1200, "yearly": 12000},
        "phone1": 9876543210i64,
        "gym_address": "12 Iron Street",
        "instagram": "https://instagram.com/gym",
    })
}

#[tokio::test]
async fn create_applies_defaults_and_wire_names() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app.post_with_token(routes::SITE_INFO, &site_body(), &token).await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["email"], "exampleEmail@gmail.com");
    assert_eq!(res.body["membershi_plan"]["monthly"], 1200);
    assert_eq!(res.body["phone1"], 9876543210i64);
    assert!(res.body["phone2"].is_null());
}

#[tokio::test]
async fn reads_are_public_writes_are_not() {
    let app = TestApp::spawn().await;

    let write = app.post_without_token(routes::SITE_INFO, &site_body()).await;
    assert_eq!(write.status, 401);

    let read = app.get_without_token(routes::SITE_INFO).await;
    assert_eq!(read.status, 200);
    assert_eq!(read.body, json!([]));
}

#[tokio::test]
async fn multipart_create_uploads_background_and_coerces_strings() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .multipart_with_token(
            Method::POST,
            routes::SITE_INFO,
            &[
                ("membershi_plan", r#"{"monthly": 999}"#),
                ("phone1", "5551234"),
                ("phone2", ""),
                ("gym_address", "12 Iron Street"),
            ],
            vec![FilePart::new("main_bg_image", "hero.png")],
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["membershi_plan"]["monthly"], 999);
    assert_eq!(res.body["phone1"], 5551234);
    assert!(
        res.body["main_bg_image"]
            .as_str()
            .unwrap()
            .contains("/site_info_media/hero_")
    );
}

#[tokio::test]
async fn edit_without_a_row_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app.get_with_token(routes::EDIT, &token).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn edit_partially_updates_the_first_row() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let first = app.post_with_token(routes::SITE_INFO, &site_body(), &token).await.id();
    app.post_with_token(routes::SITE_INFO, &site_body(), &token).await;

    let res = app
        .put_with_token(
            routes::EDIT,
            &json!({"gym_address": "1 New Road", "instagram": null}),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.id(), first);
    assert_eq!(res.body["gym_address"], "1 New Road");
    assert!(res.body["instagram"].is_null());
    assert_eq!(res.body["phone1"], 9876543210i64);

    let fetched = app.get_with_token(routes::EDIT, &token).await;
    assert_eq!(fetched.body["gym_address"], "1 New Road");
}

#[tokio::test]
async fn edit_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::EDIT).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn put_by_id_requires_core_fields() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = app.post_with_token(routes::SITE_INFO, &site_body(), &token).await.id();

    let res = app
        .put_with_token(&routes::site_info(id), &json!({"gym_address": "x"}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert!(res.body["fields"]["phone1"].is_array());
    assert!(res.body["fields"]["membershi_plan"].is_array());
}

#[tokio::test]
async fn invalid_email_is_a_field_error() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = app.post_with_token(routes::SITE_INFO, &site_body(), &token).await.id();

    let res = app
        .patch_with_token(&routes::site_info(id), &json!({"email": "not-an-email"}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert!(res.body["fields"]["email"].is_array());
}

#[tokio::test]
async fn site_info_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = app.post_with_token(routes::SITE_INFO, &site_body(), &token).await.id();

    let res = app.delete_with_token(&routes::site_info(id), &token).await;

    assert_eq!(res.status, 405);
}
