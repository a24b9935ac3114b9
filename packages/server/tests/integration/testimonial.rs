use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn rating_defaults_to_five() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let res = app
        .post_with_token(
            routes::TESTIMONIALS,
            &json!({"name": "Arjun", "text": "Best equipment in town."}),
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["rating"], 5);
    assert_eq!(res.body["name"], "Arjun");
}

#[tokio::test]
async fn anyone_can_read_testimonials_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;
    for name in ["First", "Second", "Third"] {
        let res = app
            .post_with_token(
                routes::TESTIMONIALS,
                &json!({"name": name, "text": "Great", "rating": 4}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201);
    }

    let res = app.get_without_token(routes::TESTIMONIALS).await;

    assert_eq!(res.status, 200);
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);
}

#[tokio::test]
async fn non_staff_users_cannot_write() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app
        .post_with_token(
            routes::TESTIMONIALS,
            &json!({"name": "Arjun", "text": "Great"}),
            &token,
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn anonymous_users_cannot_write() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(routes::TESTIMONIALS, &json!({"name": "A", "text": "B"}))
        .await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn missing_fields_are_reported_per_field() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let res = app
        .post_with_token(routes::TESTIMONIALS, &json!({"rating": 3}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["fields"]["name"][0], "This field is required.");
    assert_eq!(res.body["fields"]["text"][0], "This field is required.");
}

#[tokio::test]
async fn put_requires_all_fields_but_patch_does_not() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;
    let id = app
        .post_with_token(
            routes::TESTIMONIALS,
            &json!({"name": "Arjun", "text": "Great", "rating": 3}),
            &token,
        )
        .await
        .id();

    let put = app
        .put_with_token(&routes::testimonial(id), &json!({"text": "Changed"}), &token)
        .await;
    assert_eq!(put.status, 400);
    assert!(put.body["fields"]["name"].is_array());

    let patch = app
        .patch_with_token(&routes::testimonial(id), &json!({"text": "Changed"}), &token)
        .await;
    assert_eq!(patch.status, 200, "{}", patch.text);
    assert_eq!(patch.body["text"], "Changed");
    assert_eq!(patch.body["name"], "Arjun");
    assert_eq!(patch.body["rating"], 3);
}

#[tokio::test]
async fn staff_can_delete() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;
    let id = app
        .post_with_token(
            routes::TESTIMONIALS,
            &json!({"name": "Arjun", "text": "Great"}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::testimonial(id), &token).await;
    assert_eq!(res.status, 204);

    let gone = app.get_without_token(&routes::testimonial(id)).await;
    assert_eq!(gone.status, 404);
    assert_eq!(gone.body["code"], "NOT_FOUND");
}
