use ::common::ResourceType;
use reqwest::Method;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use server::entity::gym_gallery;

use crate::common::{FilePart, TestApp, routes};

#[tokio::test]
async fn direct_upload_url_is_stored_and_echoed_unchanged() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let url = "https://res.cloudinary.com/x/image/upload/v1/a/b.png";

    let created = app
        .post_with_token(routes::GALLERY, &json!({"image": url, "title": "Floor"}), &token)
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    assert_eq!(created.body["image"], url);

    let fetched = app.get_without_token(&routes::gallery(created.id())).await;
    assert_eq!(fetched.body["image"], url);

    // Saving the echoed value back must not prefix it again.
    let resaved = app
        .patch_with_token(
            &routes::gallery(created.id()),
            &json!({"image": fetched.body["image"]}),
            &token,
        )
        .await;
    assert_eq!(resaved.status, 200);
    assert_eq!(resaved.body["image"], url);
}

#[tokio::test]
async fn relative_paths_are_served_as_delivery_urls() {
    let app = TestApp::spawn().await;
    let row = gym_gallery::ActiveModel {
        image: Set(Some("gym_gallery/legacy.jpg".into())),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let res = app.get_without_token(&routes::gallery(row.id)).await;

    assert_eq!(
        res.body["image"],
        "https://res.cloudinary.com/test-cloud/image/upload/gym_gallery/legacy.jpg"
    );
}

#[tokio::test]
async fn multipart_image_is_uploaded_to_the_gallery_folder() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .multipart_with_token(
            Method::POST,
            routes::GALLERY,
            &[("title", "Squat racks")],
            vec![FilePart::new("image", "racks.jpg")],
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["title"], "Squat racks");
    let image = res.body["image"].as_str().unwrap();
    assert!(image.contains("/image/upload/"));
    assert!(image.contains("/gym_gallery/racks_"));
    assert_eq!(app.media.asset_count(), 1);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    for title in ["a", "b", "c"] {
        app.post_with_token(routes::GALLERY, &json!({"title": title}), &token)
            .await;
    }

    let res = app.get_without_token(routes::GALLERY).await;

    let titles: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["c", "b", "a"]);
}

#[tokio::test]
async fn writes_require_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(routes::GALLERY, &json!({"title": "x"}))
        .await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn delete_removes_the_remote_asset_by_public_id() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = app
        .post_with_token(
            routes::GALLERY,
            &json!({"image": "https://res.cloudinary.com/x/image/upload/v123/folder/name.jpg"}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::gallery(id), &token).await;

    assert_eq!(res.status, 204);
    assert_eq!(
        app.media.destroyed(),
        vec![("folder/name".to_string(), ResourceType::Image)]
    );
    assert_eq!(app.get_without_token(&routes::gallery(id)).await.status, 404);
}

#[tokio::test]
async fn delete_without_upload_marker_makes_no_remote_call() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    let id = app
        .post_with_token(
            routes::GALLERY,
            &json!({"image": "https://example.com/photos/name.jpg"}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::gallery(id), &token).await;

    assert_eq!(res.status, 204);
    assert!(app.media.destroyed().is_empty());
}

#[tokio::test]
async fn remote_failure_does_not_block_local_delete() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    app.media.set_fail_destroys(true);
    let id = app
        .post_with_token(
            routes::GALLERY,
            &json!({"image": "https://res.cloudinary.com/x/image/upload/v9/gym_gallery/a.png"}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::gallery(id), &token).await;

    assert_eq!(res.status, 204);
    assert_eq!(app.media.destroyed().len(), 1);
    assert_eq!(app.get_without_token(&routes::gallery(id)).await.status, 404);
}

#[tokio::test]
async fn overlong_title_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .post_with_token(routes::GALLERY, &json!({"title": "x".repeat(251)}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert!(res.body["fields"]["title"].is_array());
}

#[tokio::test]
async fn rejected_upload_is_reported_and_nothing_is_saved() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;
    app.media.set_fail_uploads(true);

    let res = app
        .multipart_with_token(
            Method::POST,
            routes::GALLERY,
            &[("title", "Cable station")],
            vec![FilePart::new("image", "cables.jpg")],
            &token,
        )
        .await;

    assert_eq!(res.status, 502, "{}", res.text);
    assert_eq!(res.body["code"], "MEDIA_UPLOAD_FAILED");
    assert_eq!(gym_gallery::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.media.asset_count(), 0);
}
