#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};

use common::{bearer, echoes_body, state};

#[actix_web::test]
async fn health_reports_generator_state() {
    let mut ai = mj_core::traits::MockTextGenerator::new();
    ai.expect_is_configured().return_const(false);
    let state = common::state_with(ai, mj_core::traits::MockMusicSearch::new()).await;
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(body, json!({ "status": "ok", "geminiConfigured": false }));
}

#[actix_web::test]
async fn creating_requires_a_session() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post().uri("/api/issues").set_json(echoes_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .set_json(echoes_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_then_fetch() {
    let state = state().await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(echoes_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["title"], "Echoes");
    assert_eq!(created["issueNumber"], "5");
    assert_eq!(created["layout"], "anime");
    assert_eq!(created["images"], json!([]));
    assert!(created["reflections"].is_null(), "blank sections are stored as absent");

    let id = created["id"].as_str().unwrap();
    let fetched: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&format!("/api/issues/{id}")).to_request())
            .await;
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["lessons"], "**Lesson One**\nBe kind.");
}

#[actix_web::test]
async fn invalid_issue_lists_every_field() {
    let state = state().await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "title": "  ", "volume": "0", "issueNumber": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["fields"].as_array().unwrap().iter().map(|f| f["field"].as_str().unwrap()).collect();
    assert_eq!(fields, ["title", "volume", "issueNumber", "content"]);
}

#[actix_web::test]
async fn malformed_body_is_a_bad_request() {
    let state = state().await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .insert_header((header::AUTHORIZATION, token))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn listing_is_newest_first_and_latest_is_capped() {
    let state = state().await;
    let token = bearer(&state).await;
    let app = app!(state);

    for title in ["First", "Second", "Third", "Fourth"] {
        let mut body = echoes_body();
        body["title"] = json!(title);
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .insert_header((header::AUTHORIZATION, token.clone()))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let all: Vec<Value> = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/issues").to_request()).await;
    let titles: Vec<&str> = all.iter().map(|i| i["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Fourth", "Third", "Second", "First"]);

    let latest: Vec<Value> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/issues/latest").to_request()).await;
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0]["title"], "Fourth");

    let searched: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/issues?q=sec&sort=title").to_request(),
    )
    .await;
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0]["title"], "Second");
}

#[actix_web::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/issues/018f3b5e-0000-7000-8000-000000000000").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Issue not found");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/issues/not-a-uuid").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_replaces_and_delete_returns_the_issue() {
    let state = state().await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(echoes_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/issues/{id}"))
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "title": "Echoes, revised", "volume": "2", "issueNumber": "6", "layout": "retro" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["title"], "Echoes, revised");
    assert!(updated["foreword"].is_null(), "full replace clears omitted sections");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/issues/{id}"))
        .insert_header((header::AUTHORIZATION, token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Issue deleted successfully");
    assert_eq!(body["issue"]["title"], "Echoes, revised");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/issues/{id}"))
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_api_route_is_json() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not found");
}
