use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::auth::ServerState;

fn png() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(2, 2).write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

struct TestApp {
    router: Router,
    media: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media);
    }
}

async fn build_app() -> anyhow::Result<TestApp> {
    let media = std::env::temp_dir().join(format!("recipe_api_test_{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.media.root = media.to_string_lossy().to_string();

    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::migrate(&db).await?;
    Ok(TestApp { router: server::build_app(ServerState::new(db, &cfg)), media })
}

impl TestApp {
    async fn request(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, body)
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(req).await
    }

    /// Register `email` with password `abcdef` and return a bearer token.
    async fn user_token(&self, email: &str) -> String {
        let (status, _) = self
            .call("POST", "/user/create", None, Some(json!({"email": email, "password": "abcdef", "name": "Test"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .call("POST", "/user/token", None, Some(json!({"email": email, "password": "abcdef"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_named(&self, path: &str, token: &str, name: &str) -> i64 {
        let (status, body) = self.call("POST", path, Some(token), Some(json!({"name": name}))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn upload(&self, recipe_id: i64, token: &str, field: &str, filename: Option<&str>, data: &[u8]) -> (StatusCode, Value) {
        let boundary = "recipeboundary42";
        let disposition = match filename {
            Some(f) => format!("form-data; name=\"{field}\"; filename=\"{f}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        let mut body = format!("--{boundary}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n").into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri(format!("/recipe/recipes/{recipe_id}/upload-image"))
            .header(header::AUTHORIZATION, format!("Token {token}"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        self.request(req).await
    }
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array().unwrap().iter().map(|v| v["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_public_endpoints() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let resp = app.router.clone().oneshot(Request::get("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("recipe_api_http_requests_total"));

    let (status, body) = app.call("GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/recipe/recipes/{id}"].is_object());
    Ok(())
}

#[tokio::test]
async fn test_protected_endpoints_require_token() -> anyhow::Result<()> {
    let app = build_app().await?;
    for uri in ["/user/me", "/recipe/tags", "/recipe/ingredients", "/recipe/recipes", "/recipe/recipes/1"] {
        let (status, body) = app.call("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["detail"].is_string());
    }
    let (status, _) = app.call("GET", "/recipe/tags", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call("POST", "/recipe/tags", None, Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_registration_and_token_issuance() -> anyhow::Result<()> {
    let app = build_app().await?;

    let payload = json!({"email": "a@x.com", "password": "abcdef"});
    let (status, body) = app.call("POST", "/user/create", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"email": "a@x.com", "name": ""}));

    let (status, body) = app.call("POST", "/user/create", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["email"].is_array());

    let (status, body) = app
        .call("POST", "/user/create", None, Some(json!({"email": "b@x.com", "password": "abc"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["password"].is_array());

    let (status, body) = app.call("POST", "/user/create", None, Some(json!({"name": "nobody"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"][0], "This field is required.");
    assert_eq!(body["password"][0], "This field is required.");

    let (status, body) = app
        .call("POST", "/user/token", None, Some(json!({"email": "a@X.com", "password": "abcdef"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = app
        .call("POST", "/user/token", None, Some(json!({"email": "a@x.com", "password": "wrong"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("token").is_none());
    assert!(body["non_field_errors"].is_array());

    let (status, body) = app.call("POST", "/user/token", None, Some(json!({"email": "a@x.com"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() -> anyhow::Result<()> {
    let app = build_app().await?;
    let req = Request::post("/user/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = app.request(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_profile_retrieve_and_update() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = app.user_token("me@example.com").await;

    let (status, body) = app.call("GET", "/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"email": "me@example.com", "name": "Test"}));

    let (status, _) = app.call("POST", "/user/me", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, body) = app
        .call("PATCH", "/user/me", Some(&token), Some(json!({"name": "Renamed", "password": "newpass123"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    let (status, _) = app
        .call("POST", "/user/token", None, Some(json!({"email": "me@example.com", "password": "newpass123"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("PATCH", "/user/me", Some(&token), Some(json!({"password": "ab"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["password"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_tags_are_isolated_and_validated() -> anyhow::Result<()> {
    let app = build_app().await?;
    let alice = app.user_token("alice@example.com").await;
    let bob = app.user_token("bob@example.com").await;

    app.create_named("/recipe/tags", &alice, "Breakfast").await;
    app.create_named("/recipe/tags", &alice, "Vegan").await;
    app.create_named("/recipe/tags", &bob, "Dessert").await;

    let (status, body) = app.call("GET", "/recipe/tags", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Vegan", "Breakfast"]);

    let (status, body) = app.call("POST", "/recipe/tags", Some(&alice), Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["name"].is_array());
    let (_, body) = app.call("GET", "/recipe/tags", Some(&alice), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.call("GET", "/recipe/tags?assigned_only=maybe", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["assigned_only"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_assigned_only_ingredients_are_unique() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = app.user_token("cook@example.com").await;
    let eggs = app.create_named("/recipe/ingredients", &token, "Eggs").await;
    app.create_named("/recipe/ingredients", &token, "Cheese").await;

    for title in ["Omelette", "Frittata"] {
        let (status, _) = app
            .call(
                "POST",
                "/recipe/recipes",
                Some(&token),
                Some(json!({"title": title, "time_minutes": 5, "price": "4.50", "ingredients": [eggs]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.call("GET", "/recipe/ingredients?assigned_only=1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![eggs]);

    let (_, body) = app.call("GET", "/recipe/ingredients?assigned_only=0", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_assigned_only_tags_are_unique() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = app.user_token("baker@example.com").await;
    let breakfast = app.create_named("/recipe/tags", &token, "Breakfast").await;
    app.create_named("/recipe/tags", &token, "Lunch").await;

    for title in ["Pancakes", "Porridge"] {
        let (status, body) = app
            .call(
                "POST",
                "/recipe/recipes",
                Some(&token),
                Some(json!({"title": title, "time_minutes": 15, "price": 3, "tags": [breakfast]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["price"], "3.00");
    }

    let (status, body) = app.call("GET", "/recipe/tags?assigned_only=true", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![breakfast]);

    let (_, body) = app.call("GET", "/recipe/tags", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_recipe_lifecycle_and_filters() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = app.user_token("chef@example.com").await;
    let t1 = app.create_named("/recipe/tags", &token, "Dinner").await;
    let t2 = app.create_named("/recipe/tags", &token, "Winter").await;
    let salt = app.create_named("/recipe/ingredients", &token, "Salt").await;

    let (status, soup) = app
        .call(
            "POST",
            "/recipe/recipes",
            Some(&token),
            Some(json!({"title": "Soup", "time_minutes": 10, "price": 5.00, "tags": [t1, t2]})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let soup_id = soup["id"].as_i64().unwrap();
    assert_eq!(soup["tags"], json!([t1, t2]));
    assert_eq!(soup["ingredients"], json!([]));

    let (status, detail) = app.call("GET", &format!("/recipe/recipes/{soup_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tags"], json!([{"id": t1, "name": "Dinner"}, {"id": t2, "name": "Winter"}]));
    assert_eq!(detail["image"], Value::Null);
    assert_eq!(detail["price"], "5.00");

    let (_, salad) = app
        .call(
            "POST",
            "/recipe/recipes",
            Some(&token),
            Some(json!({"title": "Salad", "time_minutes": 3, "price": 2.25, "ingredients": [salt]})),
        )
        .await;
    let salad_id = salad["id"].as_i64().unwrap();

    let (_, all) = app.call("GET", "/recipe/recipes", Some(&token), None).await;
    assert_eq!(ids(&all), vec![salad_id, soup_id]);
    let (_, by_tag) = app.call("GET", &format!("/recipe/recipes?tags={t1},%20{t2}"), Some(&token), None).await;
    assert_eq!(ids(&by_tag), vec![soup_id]);
    let (_, both) = app
        .call("GET", &format!("/recipe/recipes?tags={t1}&ingredients={salt}"), Some(&token), None)
        .await;
    assert!(ids(&both).is_empty());
    let (status, body) = app.call("GET", "/recipe/recipes?tags=1,x", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["tags"].is_array());

    let (status, patched) = app
        .call("PATCH", &format!("/recipe/recipes/{soup_id}"), Some(&token), Some(json!({"title": "Stew", "tags": [t2]})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Stew");
    assert_eq!(patched["time_minutes"], 10);
    assert_eq!(patched["tags"], json!([t2]));

    let (status, body) = app
        .call("PUT", &format!("/recipe/recipes/{soup_id}"), Some(&token), Some(json!({"title": "Broth"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["time_minutes"].is_array() && body["price"].is_array());

    let (status, put) = app
        .call(
            "PUT",
            &format!("/recipe/recipes/{soup_id}"),
            Some(&token),
            Some(json!({"title": "Broth", "time_minutes": 30, "price": "1.10"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(put["tags"], json!([]));
    assert_eq!(put["price"], "1.10");

    let (status, _) = app.call("DELETE", &format!("/recipe/recipes/{soup_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.call("GET", &format!("/recipe/recipes/{soup_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not found."}));
    Ok(())
}

#[tokio::test]
async fn test_recipes_of_other_users_are_hidden() -> anyhow::Result<()> {
    let app = build_app().await?;
    let alice = app.user_token("alice@example.com").await;
    let bob = app.user_token("bob@example.com").await;
    let bobs_tag = app.create_named("/recipe/tags", &bob, "Secret").await;

    let (status, body) = app
        .call(
            "POST",
            "/recipe/recipes",
            Some(&alice),
            Some(json!({"title": "Pie", "time_minutes": 40, "price": 9.99, "tags": [bobs_tag]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["tags"].is_array());

    let (_, pie) = app
        .call("POST", "/recipe/recipes", Some(&alice), Some(json!({"title": "Pie", "time_minutes": 40, "price": 9.99})))
        .await;
    let pie_id = pie["id"].as_i64().unwrap();

    let (_, list) = app.call("GET", "/recipe/recipes", Some(&bob), None).await;
    assert!(ids(&list).is_empty());
    for method in ["GET", "DELETE"] {
        let (status, _) = app.call(method, &format!("/recipe/recipes/{pie_id}"), Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
    }
    let (status, _) = app
        .call("PATCH", &format!("/recipe/recipes/{pie_id}"), Some(&bob), Some(json!({"title": "Mine"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.upload(pie_id, &bob, "image", Some("pie.png"), &png()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call("GET", "/recipe/recipes/not-a-number", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_image_upload() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = app.user_token("photo@example.com").await;
    let (_, recipe) = app
        .call("POST", "/recipe/recipes", Some(&token), Some(json!({"title": "Cake", "time_minutes": 60, "price": 12.5})))
        .await;
    let id = recipe["id"].as_i64().unwrap();

    let png = png();
    let (status, body) = app.upload(id, &token, "image", Some("cake.png"), &png).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["id"], id);
    let url = body["image"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/uploads/recipe/") && url.ends_with(".png"));

    let resp = app.router.clone().oneshot(Request::get(url.as_str()).body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(to_bytes(resp.into_body(), usize::MAX).await?.as_ref(), png.as_slice());

    let (_, detail) = app.call("GET", &format!("/recipe/recipes/{id}"), Some(&token), None).await;
    assert_eq!(detail["image"], url.as_str());

    let (status, body) = app.upload(id, &token, "image", Some("notes.txt"), b"just some text").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());

    let (status, body) = app.upload(id, &token, "image", None, b"plain field").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());

    let corrupt: [&[u8]; 2] = [&png[..png.len() / 2], b"\xFF\xD8\xFFthis is definitely not a jpeg body"];
    for bytes in corrupt {
        let (status, body) = app.upload(id, &token, "image", Some("broken.jpg"), bytes).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["image"][0].as_str().unwrap().starts_with("Upload a valid image."));
    }
    let (_, detail) = app.call("GET", &format!("/recipe/recipes/{id}"), Some(&token), None).await;
    assert_eq!(detail["image"], url.as_str());

    let (status, body) = app.upload(id, &token, "other", Some("cake.png"), &png).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["image"][0], "No file was submitted.");

    let (status, body) = app.call("POST", &format!("/recipe/recipes/{id}/upload-image"), Some(&token), Some(json!({"image": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());
    Ok(())
}
