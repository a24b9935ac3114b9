use ::common::ResourceType;
use reqwest::Method;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use server::entity::{live_update, live_update_file};

use crate::common::{FilePart, TestApp, routes};

async fn post_with_files(app: &TestApp, token: &str, files: &[&'static str]) -> i32 {
    let res = app
        .multipart_with_token(
            Method::POST,
            routes::LIVE_UPDATES,
            &[("subject", "Holiday hours"), ("description", "Closed Sunday.")],
            files
                .iter()
                .map(|name| FilePart::new("uploaded_files", *name))
                .collect(),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "create failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn create_with_attachments_returns_raw_urls() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let id = post_with_files(&app, &token, &["a.pdf", "b.pdf"]).await;
    let res = app.get_without_token(&routes::live_update(id)).await;

    assert_eq!(res.body["subject"], "Holiday hours");
    let files = res.body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for file in files {
        assert!(file["id"].is_number());
        assert!(file["file"].as_str().unwrap().contains("/raw/upload/"));
    }
    assert!(res.body["timestamp"].is_string());
    assert!(res.body["last_modified"].is_string());
}

#[tokio::test]
async fn updates_append_attachments() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = post_with_files(&app, &token, &["a.pdf", "b.pdf"]).await;

    let res = app
        .multipart_with_token(
            Method::PATCH,
            &routes::live_update(id),
            &[],
            vec![FilePart::new("uploaded_files", "c.pdf")],
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["files"].as_array().unwrap().len(), 3);
    assert_eq!(res.body["subject"], "Holiday hours");
}

#[tokio::test]
async fn put_without_files_keeps_existing_attachments() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = post_with_files(&app, &token, &["a.pdf"]).await;

    let res = app
        .put_with_token(
            &routes::live_update(id),
            &json!({"subject": "Open Sunday", "description": "Changed plans."}),
            &token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["subject"], "Open Sunday");
    assert_eq!(res.body["files"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn json_create_without_files_is_accepted() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .post_with_token(
            routes::LIVE_UPDATES,
            &json!({"subject": "New classes", "description": "Yoga at 7."}),
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["files"], json!([]));
}

#[tokio::test]
async fn overlong_subject_is_rejected_before_uploading() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let subject = "x".repeat(301);

    let res = app
        .multipart_with_token(
            Method::POST,
            routes::LIVE_UPDATES,
            &[("subject", subject.as_str()), ("description", "d")],
            vec![FilePart::new("uploaded_files", "a.pdf")],
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert!(res.body["fields"]["subject"].is_array());
    assert_eq!(app.media.asset_count(), 0);
}

#[tokio::test]
async fn delete_cascades_and_purges_every_attachment() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = post_with_files(&app, &token, &["a.pdf", "b.pdf"]).await;
    assert_eq!(app.media.asset_count(), 2);

    let res = app.delete_with_token(&routes::live_update(id), &token).await;

    assert_eq!(res.status, 204);
    let destroyed = app.media.destroyed();
    assert_eq!(destroyed.len(), 2);
    assert!(destroyed.iter().all(|(_, rt)| *rt == ResourceType::Raw));
    assert!(destroyed.iter().all(|(id, _)| id.ends_with(".pdf")), "{destroyed:?}");
    assert_eq!(app.media.asset_count(), 0);
    assert_eq!(live_update_file::Entity::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn single_attachment_can_be_removed() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = post_with_files(&app, &token, &["a.pdf", "b.pdf"]).await;
    let post = app.get_without_token(&routes::live_update(id)).await;
    let file_id = post.body["files"][0]["id"].as_i64().unwrap() as i32;

    let res = app
        .delete_with_token(&routes::live_update_file(id, file_id), &token)
        .await;

    assert_eq!(res.status, 204);
    assert_eq!(app.media.destroyed().len(), 1);
    let after = app.get_without_token(&routes::live_update(id)).await;
    assert_eq!(after.body["files"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn attachment_of_another_post_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let first = post_with_files(&app, &token, &["a.pdf"]).await;
    let second = post_with_files(&app, &token, &[]).await;
    let post = app.get_without_token(&routes::live_update(first)).await;
    let file_id = post.body["files"][0]["id"].as_i64().unwrap() as i32;

    let res = app
        .delete_with_token(&routes::live_update_file(second, file_id), &token)
        .await;

    assert_eq!(res.status, 404);
    assert!(app.media.destroyed().is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let older = post_with_files(&app, &token, &[]).await;
    let newer = post_with_files(&app, &token, &[]).await;

    let res = app.get_without_token(routes::LIVE_UPDATES).await;

    let ids: Vec<i64> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [newer as i64, older as i64]);
}

#[tokio::test]
async fn failed_second_upload_leaves_no_post_or_files() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    app.media.fail_uploads_after(1);

    let res = app
        .multipart_with_token(
            Method::POST,
            routes::LIVE_UPDATES,
            &[("subject", "Holiday hours"), ("description", "Closed Sunday.")],
            vec![
                FilePart::new("uploaded_files", "a.pdf"),
                FilePart::new("uploaded_files", "b.pdf"),
            ],
            &token,
        )
        .await;

    assert_eq!(res.status, 502, "{}", res.text);
    assert_eq!(res.body["code"], "MEDIA_UPLOAD_FAILED");
    assert_eq!(live_update::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(live_update_file::Entity::find().count(&app.db).await.unwrap(), 0);
    // The first file made it to the store and was taken back out.
    assert_eq!(app.media.asset_count(), 0);
    assert_eq!(app.media.destroyed().len(), 1);
}
