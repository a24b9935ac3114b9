use serde_json::json;

use crate::common::{TestApp, routes};

const COOKIE: &str = "refresh_token";

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_access_token_and_sets_refresh_cookie() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;

        let res = app.login("coach", "barbell-42").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["access"].is_string());
        assert!(res.body.get("refresh").is_none(), "refresh token leaked into body");

        let cookie = res.cookie(COOKIE).expect("refresh cookie not set");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;

        let res = app.login("coach", "wrong").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
        assert!(res.cookie(COOKIE).is_none());
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_error_as_a_bad_password() {
        let app = TestApp::spawn().await;

        let res = app.login("ghost", "whatever").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn blank_credentials_are_field_errors() {
        let app = TestApp::spawn().await;

        let res = app.login(" ", "").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["fields"]["username"].is_array());
        assert!(res.body["fields"]["password"].is_array());
    }

    #[tokio::test]
    async fn me_reports_the_token_owner() {
        let app = TestApp::spawn().await;
        let token = app.staff_token().await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "coach");
        assert_eq!(res.body["is_staff"], true);
    }

    #[tokio::test]
    async fn me_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod refresh {
    use super::*;

    #[tokio::test]
    async fn refresh_works_with_only_the_cookie() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let login = app.login("coach", "barbell-42").await;
        let first_refresh = login.cookie_value(COOKIE).unwrap();

        let res = app.post_empty(routes::TOKEN_REFRESH).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let access = res.body["access"].as_str().unwrap();
        assert!(res.body.get("refresh").is_none());
        let rotated = res.cookie_value(COOKIE).expect("rotated cookie not set");
        assert_ne!(rotated, first_refresh);

        let me = app.get_with_token(routes::ME, access).await;
        assert_eq!(me.status, 200);
    }

    #[tokio::test]
    async fn body_token_is_used_when_no_cookie_is_sent() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let refresh = app
            .login("coach", "barbell-42")
            .await
            .cookie_value(COOKIE)
            .unwrap();

        let res = app
            .post_without_cookies(routes::TOKEN_REFRESH, &json!({"refresh": refresh}))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["access"].is_string());
    }

    #[tokio::test]
    async fn rotated_token_cannot_be_used_again() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let refresh = app
            .login("coach", "barbell-42")
            .await
            .cookie_value(COOKIE)
            .unwrap();
        let body = json!({"refresh": refresh});

        let first = app.post_without_cookies(routes::TOKEN_REFRESH, &body).await;
        assert_eq!(first.status, 200);

        let replay = app.post_without_cookies(routes::TOKEN_REFRESH, &body).await;

        assert_eq!(replay.status, 401);
        assert_eq!(replay.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn access_token_is_not_accepted_as_refresh_token() {
        let app = TestApp::spawn().await;
        let access = app.staff_token().await;

        let res = app
            .post_without_cookies(routes::TOKEN_REFRESH, &json!({"refresh": access}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn missing_token_is_a_field_error() {
        let app = TestApp::spawn().await;

        let res = app.post_without_cookies(routes::TOKEN_REFRESH, &json!({})).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["fields"]["refresh"].is_array());
    }
}

mod logout {
    use super::*;

    #[tokio::test]
    async fn logout_blacklists_the_refresh_token() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let login = app.login("coach", "barbell-42").await;
        let access = login.body["access"].as_str().unwrap().to_string();
        let refresh = login.cookie_value(COOKIE).unwrap();

        let res = app
            .post_with_token(routes::LOGOUT, &json!({"refresh": refresh}), &access)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["detail"], "Successfully logged out.");
        assert!(res.cookie(COOKIE).is_some(), "cookie should be cleared");

        let after = app
            .post_without_cookies(routes::TOKEN_REFRESH, &json!({"refresh": refresh}))
            .await;
        assert_eq!(after.status, 401);
        assert_eq!(after.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn logout_falls_back_to_the_cookie() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let login = app.login("coach", "barbell-42").await;
        let access = login.body["access"].as_str().unwrap().to_string();
        let refresh = login.cookie_value(COOKIE).unwrap();

        let res = app.post_with_token(routes::LOGOUT, &json!({}), &access).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let after = app
            .post_without_cookies(routes::TOKEN_REFRESH, &json!({"refresh": refresh}))
            .await;
        assert_eq!(after.status, 401);
    }

    #[tokio::test]
    async fn invalid_token_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let access = app.staff_token().await;

        let res = app
            .post_with_token(routes::LOGOUT, &json!({"refresh": "garbage"}), &access)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Invalid token.");
    }

    #[tokio::test]
    async fn logging_out_twice_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_user("coach", "barbell-42", true).await;
        let login = app.login("coach", "barbell-42").await;
        let access = login.body["access"].as_str().unwrap().to_string();
        let body = json!({"refresh": login.cookie_value(COOKIE).unwrap()});

        assert_eq!(app.post_with_token(routes::LOGOUT, &body, &access).await.status, 200);
        let again = app.post_with_token(routes::LOGOUT, &body, &access).await;

        assert_eq!(again.status, 400);
    }

    #[tokio::test]
    async fn logout_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::LOGOUT, &json!({})).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
