#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use mj_core::error::AppError;
use mj_core::models::MusicTrack;
use mj_core::traits::{MockMusicSearch, MockTextGenerator};
use mockall::predicate::eq;
use serde_json::{json, Value};

use common::{bearer, state_with};

#[actix_web::test]
async fn generation_requires_a_session() {
    let state = state_with(MockTextGenerator::new(), MockMusicSearch::new()).await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/gemini/generate-title").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn generate_all_fills_every_section() {
    let mut ai = MockTextGenerator::new();
    ai.expect_complete().times(3).returning(|prompt| {
        let section = ["foreword", "reflections", "lessons"]
            .into_iter()
            .find(|s| prompt.to_lowercase().contains(s))
            .unwrap_or("unknown");
        Ok(format!("generated {section}"))
    });
    let state = state_with(ai, MockMusicSearch::new()).await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/gemini/generate-all")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "title": "Echoes", "volume": "2", "issueNumber": "5", "layout": "anime" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["foreword"], "generated foreword");
    assert_eq!(body["data"]["reflections"], "generated reflections");
    assert_eq!(body["data"]["lessons"], "generated lessons");
}

#[actix_web::test]
async fn unknown_content_type_is_rejected() {
    let mut ai = MockTextGenerator::new();
    ai.expect_complete().never();
    let state = state_with(ai, MockMusicSearch::new()).await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/gemini/generate-content")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "type": "horoscope", "title": "Echoes" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid content type: horoscope");
}

#[actix_web::test]
async fn upstream_failure_is_a_bad_gateway() {
    let mut ai = MockTextGenerator::new();
    ai.expect_complete().returning(|_| Err(AppError::Upstream("quota exceeded".into())));
    let state = state_with(ai, MockMusicSearch::new()).await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/gemini/generate-title")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn generated_title_is_wrapped_in_data() {
    let mut ai = MockTextGenerator::new();
    ai.expect_complete().times(1).returning(|_| Ok("Quiet Mornings".into()));
    let state = state_with(ai, MockMusicSearch::new()).await;
    let token = bearer(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/gemini/generate-title")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "data": { "title": "Quiet Mornings" } }));
}

#[actix_web::test]
async fn music_search_defaults_to_lofi() {
    let mut music = MockMusicSearch::new();
    music.expect_search().with(eq("lofi")).times(1).returning(|_| {
        Ok(vec![MusicTrack {
            id: 3135556,
            title: "Harder, Better, Faster, Stronger".into(),
            artist_name: "Daft Punk".into(),
            cover_url: None,
            preview_url: Some("https://cdn.example/preview.mp3".into()),
        }])
    });
    let state = state_with(MockTextGenerator::new(), music).await;
    let app = app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/music/search?q=%20").to_request()).await;
    assert_eq!(body["data"][0]["artistName"], "Daft Punk");
    assert_eq!(body["data"][0]["previewUrl"], "https://cdn.example/preview.mp3");
}

#[actix_web::test]
async fn music_search_passes_the_query_through() {
    let mut music = MockMusicSearch::new();
    music.expect_search().with(eq("city pop")).times(1).returning(|_| Ok(Vec::new()));
    let state = state_with(MockTextGenerator::new(), music).await;
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/music/search?q=city%20pop").to_request(),
    )
    .await;
    assert_eq!(body, json!({ "data": [] }));
}
