use ::common::ResourceType;
use reqwest::Method;
use serde_json::json;

use crate::common::{FilePart, TestApp, routes};

const FIELDS: &[(&str, &str)] = &[
    ("title", "Deadlift meet"),
    ("highlights", "PRs everywhere"),
    ("description", "Annual strength meet."),
    ("location", "Main floor"),
];

async fn create_event(app: &TestApp, token: &str, photos: &[&'static str]) -> i32 {
    let res = app
        .multipart_with_token(
            Method::POST,
            routes::EVENTS,
            FIELDS,
            photos
                .iter()
                .map(|name| FilePart::new("uploaded_images", *name))
                .collect(),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "create failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn photos_are_returned_as_file_urls() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let id = create_event(&app, &token, &["podium.jpg"]).await;
    let res = app.get_without_token(&routes::event(id)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["location"], "Main floor");
    let url = res.body["files"][0]["file_url"].as_str().unwrap();
    assert!(url.contains("/image/upload/"));
    assert!(url.contains("/event_photos/podium_"));
}

#[tokio::test]
async fn create_requires_every_text_field() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .post_with_token(routes::EVENTS, &json!({"title": "Meet"}), &token)
        .await;

    assert_eq!(res.status, 400);
    for field in ["highlights", "description", "location"] {
        assert!(res.body["fields"][field].is_array(), "no error for {field}");
    }
}

#[tokio::test]
async fn patch_with_photos_only_appends() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = create_event(&app, &token, &["a.jpg"]).await;

    let res = app
        .multipart_with_token(
            Method::PATCH,
            &routes::event(id),
            &[],
            vec![
                FilePart::new("uploaded_images", "b.jpg"),
                FilePart::new("uploaded_images", "c.jpg"),
            ],
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["files"].as_array().unwrap().len(), 3);
    assert_eq!(res.body["title"], "Deadlift meet");
}

#[tokio::test]
async fn delete_purges_each_photo() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = create_event(&app, &token, &["a.jpg", "b.jpg"]).await;

    let res = app.delete_with_token(&routes::event(id), &token).await;

    assert_eq!(res.status, 204);
    let destroyed = app.media.destroyed();
    assert_eq!(destroyed.len(), 2);
    assert!(destroyed.iter().all(|(id, rt)| {
        id.starts_with("event_photos/") && *rt == ResourceType::Image
    }));
    assert_eq!(app.get_without_token(&routes::event(id)).await.status, 404);
}

#[tokio::test]
async fn single_photo_can_be_removed() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = create_event(&app, &token, &["a.jpg", "b.jpg"]).await;
    let event = app.get_without_token(&routes::event(id)).await;
    let photo_id = event.body["files"][1]["id"].as_i64().unwrap() as i32;

    let res = app
        .delete_with_token(&routes::event_file(id, photo_id), &token)
        .await;

    assert_eq!(res.status, 204);
    let after = app.get_without_token(&routes::event(id)).await;
    let remaining = after.body["files"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0]["id"].as_i64().unwrap() as i32, photo_id);
}

#[tokio::test]
async fn anonymous_delete_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = create_event(&app, &token, &[]).await;

    let res = app
        .client
        .delete(app.url(&routes::event(id)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn failed_photo_upload_leaves_event_unchanged() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = create_event(&app, &token, &["podium.jpg"]).await;
    app.media.fail_uploads_after(1);

    let res = app
        .multipart_with_token(
            Method::PATCH,
            &routes::event(id),
            &[("title", "Renamed meet")],
            vec![
                FilePart::new("uploaded_images", "crowd.jpg"),
                FilePart::new("uploaded_images", "bar.jpg"),
            ],
            &token,
        )
        .await;

    assert_eq!(res.status, 502, "{}", res.text);
    assert_eq!(res.body["code"], "MEDIA_UPLOAD_FAILED");
    let after = app.get_without_token(&routes::event(id)).await;
    assert_eq!(after.body["title"], "Deadlift meet");
    assert_eq!(after.body["files"].as_array().unwrap().len(), 1);
    // Only the original photo remains remotely.
    assert_eq!(app.media.asset_count(), 1);
}
