use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use calcraftr::app::build_app;
use calcraftr::session::jwt::JwtKeys;
use calcraftr::session::store::{FileProfileStore, MemoryProfileStore, ProfileStore};
use calcraftr::session::user::User;
use calcraftr::state::AppState;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn complete_profile(app: &Router, token: &str) {
    let (status, _) = send(
        app,
        Method::PATCH,
        "/api/profile",
        Some(token),
        Some(json!({ "height": "170", "weight": 65, "allergies": "Gluten, dairy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_is_open() {
    let app = build_app(AppState::fake());
    let res = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_duplicates_and_banned_names() {
    let app = build_app(AppState::fake());
    let body = Some(json!({ "username": "ana" }));

    let (status, json) = send(&app, Method::POST, "/api/register", None, body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = send(&app, Method::POST, "/api/register", None, body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "username": "dog" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn banned_login_is_refused_and_clears_cookie() {
    let app = build_app(AppState::fake());
    let req = Request::post("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "dog" }).to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let cookie = res.headers().get(header::SET_COOKIE).unwrap();
    assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn empty_username_is_invalid() {
    let app = build_app(AppState::fake());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_sets_cookie_that_authenticates() {
    let app = build_app(AppState::fake());
    let req = Request::post("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "  ana " }).to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let pair = set_cookie.split(';').next().unwrap().to_string();
    assert!(pair.starts_with("sid="));

    let req = Request::get("/api/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["username"], "ana");
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let app = build_app(AppState::fake());
    let (status, _) = send(&app, Method::GET, "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/me", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn view_gates_until_profile_is_complete() {
    let app = build_app(AppState::fake());

    let (_, body) = send(&app, Method::GET, "/api/view", None, None).await;
    assert_eq!(body["access"], "unauthenticated");

    let token = login(&app, "ana").await;
    let (_, body) = send(&app, Method::GET, "/api/view?page=mealPlans", Some(&token), None).await;
    assert_eq!(body["access"], "profile_incomplete");

    let (status, _) = send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    complete_profile(&app, &token).await;

    let (_, body) = send(&app, Method::GET, "/api/view?page=mealPlans", Some(&token), None).await;
    assert_eq!(body["access"], "authenticated");
    assert_eq!(body["view"], "mealPlans");

    let (_, body) = send(&app, Method::GET, "/api/view?page=nonsense", Some(&token), None).await;
    assert_eq!(body["view"], "dashboard");
}

#[tokio::test]
async fn invalid_profile_update_changes_nothing() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile",
        Some(&token),
        Some(json!({ "height": 170, "weight": "heavy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid weight");

    let (_, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(body["height"], 0.0);
    assert_eq!(body["profile_complete"], false);
}

#[tokio::test]
async fn logging_a_meal_updates_tracking() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;
    complete_profile(&app, &token).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tracking/meals",
        Some(&token),
        Some(json!({ "meal_id": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["logged"]["name"], "Protein-Packed Breakfast Bowl");
    assert_eq!(body["logged"]["username"], "ana");
    assert_eq!(body["notification"]["message"], "Meal logged successfully!");

    let (status, body) = send(&app, Method::GET, "/api/tracking", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meals"].as_array().unwrap().len(), 1);
    assert_eq!(body["totals"]["calories"], 450);
    assert_eq!(body["targets"]["calories"], 2200);
    assert_eq!(body["progress"]["calories"], 20);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tracking/meals",
        Some(&token),
        Some(json!({ "meal_id": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_search_and_dieticians() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;
    complete_profile(&app, &token).await;

    let (_, body) = send(&app, Method::GET, "/api/catalog/meals?q=", Some(&token), None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, Method::GET, "/api/catalog/meals?q=SALAD", Some(&token), None).await;
    assert!(!body.as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/catalog/dieticians?filter_by_allergies=false",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = send(&app, Method::GET, "/api/catalog/specializations", None, None).await;
    assert_eq!(body[0], "all");
}

#[tokio::test]
async fn saving_a_plan_toggles() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;
    complete_profile(&app, &token).await;

    let (_, body) = send(&app, Method::POST, "/api/catalog/plans/mp2/save", Some(&token), None).await;
    assert_eq!(body["saved"], true);

    let (_, body) = send(&app, Method::GET, "/api/catalog/plans", Some(&token), None).await;
    let plans = body.as_array().unwrap();
    assert!(plans.iter().any(|p| p["id"] == "mp2" && p["saved"] == true));

    let (_, body) = send(&app, Method::POST, "/api/catalog/plans/mp2/save", Some(&token), None).await;
    assert_eq!(body["saved"], false);

    let (status, _) =
        send(&app, Method::POST, "/api/catalog/plans/zzz/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn relogin_on_a_device_replaces_the_old_identity() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::fake_with_store(Arc::new(FileProfileStore::new(dir.path())));
    let sessions = state.sessions.clone();
    let app = build_app(state);

    let ana = login(&app, "ana").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(&ana),
        Some(json!({ "username": "ben" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ben = body["token"].as_str().unwrap().to_string();

    let records = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(records, 1);
    assert_eq!(sessions.len().await, 1);

    let (status, _) = send(&app, Method::GET, "/api/me", Some(&ana), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, Method::GET, "/api/me", Some(&ben), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ben");
}

#[tokio::test]
async fn targets_activities_notification_and_goal_plans() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;
    complete_profile(&app, &token).await;

    let (status, body) = send(&app, Method::GET, "/api/targets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal"], "stay-healthy");
    assert_eq!(body["targets"]["calories"], 2200);
    assert_eq!(body["targets"]["protein_g"], 120);
    assert_eq!(body["estimated"]["protein_g"], 165);

    let (_, body) = send(&app, Method::GET, "/api/notification", Some(&token), None).await;
    assert_eq!(body, Value::Null);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tracking/activities",
        Some(&token),
        Some(json!({ "title": "Morning Yoga" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["logged"]["title"], "Morning Yoga");
    assert_eq!(body["totals"]["burned_calories"], 120);
    assert_eq!(body["totals"]["net_calories"], -120);

    let (status, body) = send(&app, Method::GET, "/api/notification", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Activity added successfully!");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tracking/activities",
        Some(&token),
        Some(json!({ "title": "Underwater Basket Weaving" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/catalog/plans?goal=burn-fat",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["id"], "mp1");
    assert_eq!(plans[0]["saved"], false);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = build_app(AppState::fake());
    let token = login(&app, "ana").await;

    let (status, _) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_is_restored_from_the_profile_store() {
    let store = Arc::new(MemoryProfileStore::new());
    let mut user = User::new("ana", "restoredsid01".into());
    user.height = 170.0;
    user.weight = 65.0;
    store.save("restoredsid01", &user).await.unwrap();

    let state = AppState::fake_with_store(store);
    let token = JwtKeys::from_config(&state.config.jwt)
        .sign("ana", "restoredsid01")
        .unwrap();
    let app = build_app(state);

    let (status, body) = send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana");
    assert_eq!(body["recommended_calories"], 2200);
}

#[tokio::test]
async fn stale_banned_record_is_blocked() {
    let store = Arc::new(MemoryProfileStore::new());
    store
        .save("stalesession1", &User::new("dog", "stalesession1".into()))
        .await
        .unwrap();

    let state = AppState::fake_with_store(store.clone());
    let keys = JwtKeys::from_config(&state.config.jwt);
    let app = build_app(state);

    let token = keys.sign("dog", "stalesession1").unwrap();
    let (_, body) = send(&app, Method::GET, "/api/view", Some(&token), None).await;
    assert_eq!(body["access"], "blocked");

    let (status, _) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(store.load("stalesession1").await.unwrap().is_none());
}
