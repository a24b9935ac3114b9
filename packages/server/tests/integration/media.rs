use ::common::SignatureAlgorithm;
use ::common::media::signature::api_sign_request;

use crate::common::{API_SECRET, CLOUD_NAME, TestApp, routes};

#[tokio::test]
async fn signature_covers_folder_and_timestamp() {
    let app = TestApp::spawn().await;
    let token = app.member_token().await;

    let res = app.get_with_token(routes::SIGNATURE, &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["folder"], "gym_gallery");
    assert_eq!(res.body["cloud_name"], CLOUD_NAME);
    assert_eq!(res.body["api_key"], "test-api-key");

    let timestamp = res.body["timestamp"].as_i64().unwrap();
    let now = chrono::Utc::now().timestamp();
    assert!((now - timestamp).abs() < 60);

    let expected = api_sign_request(
        &[
            ("folder", "gym_gallery".to_string()),
            ("timestamp", timestamp.to_string()),
        ],
        API_SECRET,
        SignatureAlgorithm::Sha1,
    );
    assert_eq!(res.body["signature"], expected);
}

#[tokio::test]
async fn signature_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::SIGNATURE).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
