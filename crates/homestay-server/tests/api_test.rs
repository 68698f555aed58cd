//! End-to-end API tests: the full router over in-memory SurrealDB with
//! recording fakes for email and image hosting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use homestay_auth::AuthConfig;
use homestay_core::access::Role;
use homestay_core::models::user::UpdateUser;
use homestay_core::repository::UserRepository;
use homestay_db::{DbConfig, DbManager};
use homestay_server::mail::{Email, MailError, Mailer};
use homestay_server::media::{ImageHost, MediaError, UploadFile, UploadedImage};
use homestay_server::{AppState, app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Fakes and helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.subject.clone())
            .collect()
    }

    /// Background sends land shortly after the response.
    async fn wait_for(&self, subject: &str) -> bool {
        for _ in 0..100 {
            if self.subjects().iter().any(|s| s == subject) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[derive(Default)]
struct FakeImageHost {
    uploads: Mutex<Vec<UploadFile>>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, MediaError> {
        let url = format!("https://ik.imagekit.io/demo/cms/{}", file.file_name);
        self.uploads.lock().unwrap().push(file);
        Ok(UploadedImage {
            url,
            file_id: "file_1".into(),
        })
    }
}

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    mailer: Arc<RecordingMailer>,
    images: Arc<FakeImageHost>,
}

async fn setup() -> TestApp {
    let db = DbManager::connect(&DbConfig {
        url: "mem://".into(),
        ..Default::default()
    })
    .await
    .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let images = Arc::new(FakeImageHost::default());
    let state = AppState::new(
        db.client().clone(),
        AuthConfig::default(),
        false,
        mailer.clone(),
        images.clone(),
    );

    TestApp {
        router: app(state.clone(), &["http://localhost:3000".to_string()]),
        state,
        mailer,
        images,
    }
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Register an account and return its bearer token.
    async fn sign_up(&self, email: &str, role: Role) -> String {
        let res = self
            .call(
                Method::POST,
                "/api/auth/sign-up",
                None,
                Some(json!({ "name": "Test User", "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "sign-up failed: {}", res.body);

        if role != Role::User {
            let user = self.state.users.get_by_email(email).await.unwrap();
            self.state
                .users
                .update(
                    user.id,
                    UpdateUser {
                        role: Some(role),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        res.body["token"].as_str().unwrap().to_string()
    }

    async fn submit_review(&self, token: &str, rating: u32) -> TestResponse {
        self.call(
            Method::POST,
            "/api/reviews",
            Some(token),
            Some(json!({
                "stayDuration": "2 weeks",
                "stayPeriod": "March 2024",
                "rating": rating,
                "title": "Wonderful family",
                "nationality": "Canadian",
                "countryFlag": "CA",
                "reviewText": "I learned so much and made lifelong friends."
            })),
        )
        .await
    }
}

fn total_count(res: &TestResponse) -> u64 {
    res.headers
        .get("x-total-count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitting_without_session_is_unauthorized() {
    let app = setup().await;

    let res = app
        .call(
            Method::POST,
            "/api/reviews",
            None,
            Some(json!({ "reviewText": "Great place to stay!" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_submission_validates_body() {
    let app = setup().await;
    let token = app.sign_up("val@example.com", Role::User).await;

    let res = app
        .call(
            Method::POST,
            "/api/reviews",
            Some(&token),
            Some(json!({
                "stayDuration": "2 weeks",
                "stayPeriod": "March 2024",
                "rating": 7,
                "nationality": "Canadian",
                "countryFlag": "CA",
                "reviewText": "short"
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let details = res.body["details"].as_object().unwrap();
    assert!(details.contains_key("rating"));
    assert_eq!(details.len(), 2);
}

#[tokio::test]
async fn second_review_is_conflict() {
    let app = setup().await;
    let token = app.sign_up("writer@example.com", Role::User).await;

    let first = app.submit_review(&token, 5).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["success"], json!(true));
    assert_eq!(first.body["data"]["approved"], json!(false));
    assert_eq!(first.body["data"]["user"]["email"], json!("writer@example.com"));
    assert_eq!(first.body["data"]["user"]["name"], json!("Test User"));
    assert!(app.mailer.wait_for("Thank you for sharing your story!").await);

    let second = app.submit_review(&token, 3).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_submissions_create_one_review() {
    let app = setup().await;
    let token = app.sign_up("racer@example.com", Role::User).await;
    let body = json!({
        "stayDuration": "2 weeks",
        "stayPeriod": "March 2024",
        "rating": 5,
        "nationality": "Canadian",
        "countryFlag": "CA",
        "reviewText": "I learned so much and made lifelong friends."
    })
    .to_string();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let router = app.router.clone();
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/reviews")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.clone()))
                .unwrap();
            tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!((created, conflicts), (1, 5), "statuses: {statuses:?}");
}

#[tokio::test]
async fn huge_page_number_yields_empty_page() {
    let app = setup().await;

    for page in ["9223372036854775807", "99999999999999999"] {
        let res = app
            .call(
                Method::GET,
                &format!("/api/reviews?currentPage={page}&pageSize=100"),
                None,
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, json!([]));
        assert_eq!(total_count(&res), 0);
    }
}

#[tokio::test]
async fn public_listing_hides_unapproved_until_moderated() {
    let app = setup().await;
    let author = app.sign_up("author@example.com", Role::User).await;
    let admin = app.sign_up("admin@example.com", Role::SuperAdmin).await;

    let created = app.submit_review(&author, 4).await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let public = app.call(Method::GET, "/api/reviews", None, None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(total_count(&public), 0);
    assert_eq!(public.body, json!([]));
    assert!(
        public.headers["access-control-expose-headers"]
            .to_str()
            .unwrap()
            .eq_ignore_ascii_case("x-total-count")
    );

    let hidden = app
        .call(Method::GET, &format!("/api/reviews/{id}"), None, None)
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let approved = app
        .call(
            Method::PATCH,
            &format!("/api/get-all-reviews/{id}"),
            Some(&admin),
            Some(json!({ "approved": true, "userId": "ignored" })),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["approved"], json!(true));
    assert_eq!(approved.body["user"]["email"], json!("author@example.com"));
    assert!(app.mailer.wait_for("Your review is now live!").await);

    let public = app.call(Method::GET, "/api/reviews", None, None).await;
    assert_eq!(total_count(&public), 1);
    assert_eq!(public.body[0]["id"], json!(id));
    assert_eq!(public.body[0]["user"]["email"], json!("author@example.com"));

    let single = app
        .call(Method::GET, &format!("/api/reviews/{id}"), None, None)
        .await;
    assert_eq!(single.status, StatusCode::OK);
    assert_eq!(single.body["rating"], json!(4));
}

#[tokio::test]
async fn listing_clamps_page_size_and_sorts() {
    let app = setup().await;
    let admin = app.sign_up("sorter@example.com", Role::SuperAdmin).await;
    for (i, rating) in [2, 5, 3].into_iter().enumerate() {
        let token = app
            .sign_up(&format!("r{i}@example.com"), Role::User)
            .await;
        app.submit_review(&token, rating).await;
    }

    let res = app
        .call(
            Method::GET,
            "/api/get-all-reviews?currentPage=0&pageSize=500&_sort=rating&_order=DESC",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(total_count(&res), 3);
    let ratings: Vec<u64> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rating"].as_u64().unwrap())
        .collect();
    assert_eq!(ratings, vec![5, 3, 2]);

    let fallback = app
        .call(
            Method::GET,
            "/api/get-all-reviews?pageSize=abc&_sort=password",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(fallback.status, StatusCode::OK);
    assert_eq!(fallback.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn moderation_respects_permissions() {
    let app = setup().await;
    let author = app.sign_up("a@example.com", Role::User).await;
    let staff = app.sign_up("staff@example.com", Role::SuperUser).await;
    let admin = app.sign_up("boss@example.com", Role::SuperAdmin).await;

    let created = app.submit_review(&author, 5).await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/get-all-reviews/{id}");

    let res = app
        .call(Method::GET, "/api/get-all-reviews", Some(&author), None)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.call(Method::GET, &path, Some(&staff), None).await;
    assert_eq!(res.status, StatusCode::OK);

    // superUser may update but not approve.
    let res = app
        .call(Method::PATCH, &path, Some(&staff), Some(json!({ "rating": 4 })))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app
        .call(Method::PUT, &path, Some(&staff), Some(json!({ "rating": 4 })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["rating"], json!(4));
    assert_eq!(res.body["user"]["email"], json!("a@example.com"));

    let res = app.call(Method::DELETE, &path, Some(&staff), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.call(Method::DELETE, &path, Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .call(Method::DELETE, &format!("/api/reviews/{id}"), Some(&admin), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_projection_is_bad_request() {
    let app = setup().await;
    let author = app.sign_up("p@example.com", Role::User).await;
    let admin = app.sign_up("padmin@example.com", Role::SuperAdmin).await;
    let created = app.submit_review(&author, 5).await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let res = app
        .call(
            Method::PATCH,
            &format!("/api/get-all-reviews/{id}"),
            Some(&admin),
            Some(json!({ "userId": "someone-else", "date": "2020-01-01" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], json!("No valid fields provided for update"));

    let res = app
        .call(
            Method::PATCH,
            &format!("/api/get-all-reviews/{}", uuid::Uuid::new_v4()),
            Some(&admin),
            Some(json!({ "approved": true })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = setup().await;

    let res = app
        .call(Method::GET, "/api/reviews/not-a-uuid", None, None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exists_only_answers_for_self() {
    let app = setup().await;
    let token = app.sign_up("self@example.com", Role::User).await;
    let other = app.sign_up("other@example.com", Role::User).await;
    app.submit_review(&token, 5).await;

    let me = app
        .call(Method::GET, "/api/auth/session", Some(&token), None)
        .await;
    let user_id = me.body["user"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/reviews/exists?userId={user_id}");

    let res = app.call(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(res.body, json!({ "exists": true }));

    let res = app.call(Method::GET, &uri, Some(&other), None).await;
    assert_eq!(res.body, json!({ "exists": false }));

    let res = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "exists": false }));
}

#[tokio::test]
async fn send_email_requires_a_review() {
    let app = setup().await;
    let token = app.sign_up("mail@example.com", Role::User).await;

    let res = app
        .call(Method::POST, "/api/send-email", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    app.submit_review(&token, 5).await;
    let res = app
        .call(Method::POST, "/api/send-email", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], json!("Email sent!"));
}

// ---------------------------------------------------------------------------
// Applications, CMS, upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn application_intake_and_review() {
    let app = setup().await;
    let user = app.sign_up("plain@example.com", Role::User).await;
    let staff = app.sign_up("coord@example.com", Role::SuperUser).await;

    let res = app
        .call(
            Method::POST,
            "/api/applications",
            None,
            Some(json!({
                "fullName": "Lena Vogel",
                "email": "lena@example.com",
                "startDate": "2025-07-01",
                "duration": "1 month",
                "program": "Teaching"
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["status"], json!("PENDING"));
    let id = res.body["id"].as_str().unwrap().to_string();
    assert!(app.mailer.wait_for("We received your application!").await);

    let res = app
        .call(Method::GET, "/api/applications", Some(&user), None)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(Method::GET, "/api/applications", Some(&staff), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 1);

    let path = format!("/api/applications/{id}");
    let res = app
        .call(
            Method::PATCH,
            &path,
            Some(&staff),
            Some(json!({ "status": "MAYBE" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .call(
            Method::PATCH,
            &path,
            Some(&staff),
            Some(json!({ "status": "APPROVED", "email": "ignored@example.com" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], json!("APPROVED"));
    assert_eq!(res.body["email"], json!("lena@example.com"));
}

#[tokio::test]
async fn landing_page_upsert_and_read() {
    let app = setup().await;
    let staff = app.sign_up("cms@example.com", Role::SuperUser).await;

    let res = app
        .call(
            Method::PATCH,
            "/api/landing-page",
            None,
            Some(json!({ "section": "hero", "title": "Welcome" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .call(
            Method::PATCH,
            "/api/landing-page",
            Some(&staff),
            Some(json!({ "section": "hero", "title": "Welcome", "videoUrl": "https://v.example/x.mp4" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    app.call(
        Method::PATCH,
        "/api/landing-page",
        Some(&staff),
        Some(json!({ "section": "hero", "subtitle": "Live with a local family" })),
    )
    .await;

    let res = app.call(Method::GET, "/api/landing-page", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["hero"]["title"], json!("Welcome"));
    assert_eq!(res.body["hero"]["subtitle"], json!("Live with a local family"));
    assert_eq!(res.body["hero"]["videoUrl"], json!("https://v.example/x.mp4"));
}

fn multipart_request(token: &str, field_name: &str) -> Request<Body> {
    let boundary = "X-HOMESTAY-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field_name}\"; filename=\"hero.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_forwards_file_part() {
    let app = setup().await;
    let staff = app.sign_up("uploader@example.com", Role::SuperUser).await;
    let user = app.sign_up("nobody@example.com", Role::User).await;

    let res = app.send(multipart_request(&user, "file")).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.send(multipart_request(&staff, "attachment")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.send(multipart_request(&staff, "file")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["fileId"], json!("file_1"));
    assert_eq!(
        res.body["url"],
        json!("https://ik.imagekit.io/demo/cms/hero.png")
    );

    let uploads = app.images.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bytes, b"PNGDATA");
    assert_eq!(uploads[0].content_type.as_deref(), Some("image/png"));
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_management_is_super_admin_only() {
    let app = setup().await;
    let staff = app.sign_up("su@example.com", Role::SuperUser).await;
    let admin = app.sign_up("sa@example.com", Role::SuperAdmin).await;

    let res = app.call(Method::GET, "/api/users", Some(&staff), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.call(Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let users = res.body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let me = app
        .call(Method::GET, "/api/auth/session", Some(&admin), None)
        .await;
    let admin_id = me.body["user"]["id"].as_str().unwrap().to_string();
    let res = app
        .call(
            Method::PATCH,
            "/api/users",
            Some(&admin),
            Some(json!({ "userId": admin_id, "role": "user" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .call(
            Method::PATCH,
            "/api/users",
            Some(&admin),
            Some(json!({ "userId": uuid::Uuid::new_v4(), "role": "superUser" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let staff_user = app.state.users.get_by_email("su@example.com").await.unwrap();
    let res = app
        .call(
            Method::PATCH,
            "/api/users",
            Some(&admin),
            Some(json!({ "userId": staff_user.id, "role": "superAdmin" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["role"], json!("superAdmin"));

    // The promotion applies to the live session.
    let res = app.call(Method::GET, "/api/users", Some(&staff), None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn cookie_session_lifecycle() {
    let app = setup().await;
    app.sign_up("cookie@example.com", Role::User).await;

    let res = app
        .call(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "cookie@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .call(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "cookie@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let set_cookie = res.headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let with_cookie = |method: Method, uri: &str| {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let res = app.send(with_cookie(Method::GET, "/api/auth/session")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["email"], json!("cookie@example.com"));
    assert_eq!(res.body["user"]["role"], json!("user"));

    let res = app.send(with_cookie(Method::POST, "/api/auth/sign-out")).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.send(with_cookie(Method::GET, "/api/auth/session")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn short_password_and_duplicate_email() {
    let app = setup().await;

    let res = app
        .call(
            Method::POST,
            "/api/auth/sign-up",
            None,
            Some(json!({ "name": "Short", "email": "short@example.com", "password": "1234" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    app.sign_up("dupe@example.com", Role::User).await;
    let res = app
        .call(
            Method::POST,
            "/api/auth/sign-up",
            None,
            Some(json!({ "name": "Dupe", "email": "dupe@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}
