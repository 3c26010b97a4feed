//! Public rendering endpoints: published-only visibility, search, image
//! normalization, schema-drift retries, and the degrade-to-empty policy.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, send, Harness};

fn story(title: &str, slug: &str, published: bool) -> serde_json::Value {
    json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "title": title,
        "slug": slug,
        "summary": "summary",
        "body": "body",
        "published": published,
        "views_count": 0,
        "created_at": "2026-08-01T00:00:00Z",
    })
}

#[tokio::test]
async fn story_list_shows_only_published_rows() {
    let harness = Harness::new();
    harness.scoped.seed(
        "stories",
        vec![
            story("Shere Hills Climb", "shere-hills-climb", true),
            story("Unfinished Draft", "unfinished-draft", false),
        ],
    );

    let (status, body) = send(harness.app(), get("/api/stories")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["slug"], "shere-hills-climb");
    // Public reads go through the anonymous tier only.
    assert_eq!(harness.elevated.select_count("stories"), 0);
}

#[tokio::test]
async fn draft_story_is_not_reachable_by_slug() {
    let harness = Harness::new();
    harness
        .scoped
        .seed("stories", vec![story("Draft", "draft-slug", false)]);

    let (status, body) = send(harness.app(), get("/api/stories/draft-slug")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn site_search_matches_name_case_insensitively() {
    let harness = Harness::new();
    harness.scoped.seed(
        "cultural_sites",
        vec![
            json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "name": "Jos Wildlife Park",
                "description": "Animals",
                "status": "published",
            }),
            json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "name": "National Museum",
                "description": "History",
                "status": "published",
            }),
        ],
    );

    let (status, body) = send(harness.app(), get("/api/sites?search=wildlife")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Jos Wildlife Park");
}

#[tokio::test]
async fn events_are_ordered_by_start_date_ascending() {
    let harness = Harness::new();
    harness.scoped.seed(
        "events",
        vec![
            json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "title": "Later Festival",
                "status": "published",
                "start_date": "2026-10-01",
            }),
            json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "title": "Sooner Durbar",
                "status": "published",
                "start_date": "2026-09-01",
            }),
        ],
    );

    let (status, body) = send(harness.app(), get("/api/events")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows[0]["title"], "Sooner Durbar");
    assert_eq!(rows[1]["title"], "Later Festival");
}

#[tokio::test]
async fn backend_failure_degrades_to_an_empty_list() {
    let harness = Harness::new();
    harness.scoped.fail_table("stories");

    let (status, body) = send(harness.app(), get("/api/stories")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn missing_column_triggers_a_reduced_retry_not_an_error() {
    let harness = Harness::new();
    harness
        .scoped
        .seed("stories", vec![story("Climb", "climb", true)]);
    harness.scoped.drop_column("stories", "views_count");

    let (status, body) = send(harness.app(), get("/api/stories")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].get("views_count").is_none());
    // First attempt failed on the missing column, second succeeded.
    assert_eq!(harness.scoped.select_count("stories"), 2);
}

#[tokio::test]
async fn images_are_normalized_to_an_array_of_public_urls() {
    let harness = Harness::new();
    let mut row = story("Climb", "climb", true);
    // A JSON-encoded string of a list, with one bare storage path.
    row["images"] = json!("[\"uploads/1-a.jpg\", \"https://cdn.example.org/b.jpg\"]");
    harness.scoped.seed("stories", vec![row]);

    let (status, body) = send(harness.app(), get("/api/stories")).await;

    assert_eq!(status, StatusCode::OK);
    let images = body[0]["images"].as_array().unwrap();
    assert_eq!(
        images[0],
        "http://localhost:54321/storage/v1/object/public/media/uploads/1-a.jpg"
    );
    assert_eq!(images[1], "https://cdn.example.org/b.jpg");
}

#[tokio::test]
async fn hero_endpoint_renders_empty_when_settings_are_absent() {
    let harness = Harness::new();

    let (status, body) = send(harness.app(), get("/api/settings/hero")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hero"], json!([]));
}

#[tokio::test]
async fn hero_endpoint_parses_a_json_encoded_value() {
    let harness = Harness::new();
    harness.scoped.seed(
        "site_settings",
        vec![json!({
            "key": "hero_images",
            "value": "[{\"url\": \"https://cdn.example.org/hero.jpg\", \"alt\": \"Hills\"}]",
        })],
    );

    let (status, body) = send(harness.app(), get("/api/settings/hero")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hero"][0]["url"], "https://cdn.example.org/hero.jpg");
    assert_eq!(body["hero"][0]["alt"], "Hills");
}
