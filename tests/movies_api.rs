//! Movie API Tests
//!
//! Drive the assembled router end to end over a real store in a temp dir:
//! - create / list / filter / delete through HTTP
//! - validation and not-found responses with their Portuguese messages
//! - filter results always equal the matching subset of the full list

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dudaflix::catalog::Catalog;
use dudaflix::http_server::HttpServer;
use dudaflix::storage::FileStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_router(temp_dir: &TempDir) -> Router {
    let store = FileStore::open(temp_dir.path()).expect("Failed to open store");
    let catalog = Arc::new(Catalog::load(store));
    HttpServer::new(catalog).router()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post_json(router: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post("/movies")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn delete(router: &Router, id: &str) -> (StatusCode, Value) {
    let request = Request::delete(format!("/movies/{}", id))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn create(router: &Router, name: &str, genre: &str, recommendation: Value) -> Value {
    let (status, body) = post_json(
        router,
        json!({"name": name, "genre": genre, "recommendation": recommendation}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

fn ids(movies: &Value) -> Vec<String> {
    movies
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["_id"].as_str().unwrap().to_string())
        .collect()
}

/// Every genre and rating filter must equal the matching subset of the list.
async fn assert_filters_match_list(router: &Router) {
    let (_, list) = get(router, "/movies").await;
    let list = list.as_array().unwrap().clone();

    for genre in ["Sci-Fi", "Drama", "Comedy"] {
        let (status, filtered) = get(router, &format!("/movies/filter?genre={}", genre)).await;
        assert_eq!(status, StatusCode::OK);
        let expected: Vec<&Value> = list.iter().filter(|m| m["genre"] == genre).collect();
        let filtered: Vec<&Value> = filtered.as_array().unwrap().iter().collect();
        assert_eq!(filtered, expected, "genre filter diverged for {}", genre);
    }

    for rating in 1..=5 {
        let (status, filtered) = get(router, &format!("/movies/filter?rating={}", rating)).await;
        assert_eq!(status, StatusCode::OK);
        let mut expected: Vec<String> = list
            .iter()
            .filter(|m| m["rating"] == rating)
            .map(|m| m["_id"].as_str().unwrap().to_string())
            .collect();
        let mut actual = ids(&filtered);
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "rating filter diverged for {}", rating);
    }
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_dune_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let (status, created) = post_json(
        &router,
        json!({"name": "Dune", "genre": "Sci-Fi", "recommendation": "5"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Dune");
    assert_eq!(created["genre"], "Sci-Fi");
    assert_eq!(created["rating"], 5);
    let id = created["_id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, list) = get(&router, "/movies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created.clone()]));

    let (status, filtered) = get(&router, "/movies/filter?genre=Sci-Fi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered, json!([created]));

    let (status, body) = delete(&router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Filme removido com sucesso."}));

    let (_, filtered) = get(&router, "/movies/filter?genre=Sci-Fi").await;
    assert_eq!(filtered, json!([]));

    let (_, list) = get(&router, "/movies").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let a = create(&router, "Alien", "Sci-Fi", json!(4)).await;
    let b = create(&router, "Amélie", "Comedy", json!("3")).await;
    let c = create(&router, "Brazil", "Comedy", json!(2)).await;

    let (_, list) = get(&router, "/movies").await;
    assert_eq!(list, json!([a, b, c]));
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_out_of_range_and_non_numeric_ratings_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    for recommendation in [json!(0), json!(6), json!("abc"), json!(null), json!("")] {
        let (status, body) = post_json(
            &router,
            json!({"name": "X", "genre": "Drama", "recommendation": recommendation}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}", recommendation);
        assert_eq!(
            body,
            json!({"error": "A avaliação (recommendation) deve ser um número entre 1 e 5."})
        );
    }

    let (status, _) = post_json(&router, json!({"name": "X", "genre": "Drama"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = get(&router, "/movies").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_leading_integer_ratings_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let movie = create(&router, "Heat", "Drama", json!("4 stars")).await;
    assert_eq!(movie["rating"], 4);

    let movie = create(&router, "Ran", "Drama", json!(3.9)).await;
    assert_eq!(movie["rating"], 3);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let request = Request::post("/movies")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Corpo da requisição inválido."}));
}

#[tokio::test]
async fn test_filter_parameter_errors() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let (status, body) = get(&router, "/movies/filter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Forneça um gênero ou uma avaliação para filtrar."})
    );

    let (status, body) = get(&router, "/movies/filter?rating=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "A avaliação para filtro deve ser um número entre 1 e 5."})
    );

    let (status, _) = get(&router, "/movies/filter?rating=9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_parameters_answer_with_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    for uri in ["/movies/filter?genre=a&genre=b", "/movies/filter?rating=1&rating=2"] {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "Parâmetros da requisição inválidos."}));
    }

    let (status, body) = delete(&router, "%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Parâmetros da requisição inválidos."}));
}

#[tokio::test]
async fn test_genre_takes_precedence_over_rating() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let drama = create(&router, "Heat", "Drama", json!(4)).await;
    create(&router, "Alien", "Sci-Fi", json!(5)).await;

    let (status, filtered) = get(&router, "/movies/filter?genre=Drama&rating=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered, json!([drama]));

    // An invalid rating is ignored when a genre is present
    let (status, _) = get(&router, "/movies/filter?genre=Drama&rating=abc").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_genre_filter_is_exact_match() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    create(&router, "Alien", "Sci-Fi", json!(4)).await;

    for genre in ["sci-fi", "Sci", "Horror"] {
        let (status, filtered) = get(&router, &format!("/movies/filter?genre={}", genre)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(filtered, json!([]));
    }
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_unknown_and_twice() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let (status, body) = delete(&router, "does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Filme não encontrado."}));

    let movie = create(&router, "Alien", "Sci-Fi", json!(4)).await;
    let id = movie["_id"].as_str().unwrap();

    let (status, _) = delete(&router, id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = delete(&router, id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Mirror / index consistency
// =============================================================================

#[tokio::test]
async fn test_filters_track_list_across_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let seeds = [
        ("Alien", "Sci-Fi", 4),
        ("Dune", "Sci-Fi", 5),
        ("Heat", "Drama", 4),
        ("Amélie", "Comedy", 5),
        ("Brazil", "Comedy", 2),
        ("Ran", "Drama", 1),
    ];

    let mut created = Vec::new();
    for (name, genre, rating) in seeds {
        created.push(create(&router, name, genre, json!(rating)).await);
        assert_filters_match_list(&router).await;
    }

    for movie in created.iter().step_by(2) {
        let (status, _) = delete(&router, movie["_id"].as_str().unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_filters_match_list(&router).await;
    }

    let (_, list) = get(&router, "/movies").await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_restart_reloads_same_catalog() {
    let temp_dir = TempDir::new().unwrap();

    let (kept, removed_id) = {
        let router = create_router(&temp_dir);
        let kept = create(&router, "Alien", "Sci-Fi", json!(4)).await;
        let removed = create(&router, "Heat", "Drama", json!(3)).await;
        let removed_id = removed["_id"].as_str().unwrap().to_string();
        let (status, _) = delete(&router, &removed_id).await;
        assert_eq!(status, StatusCode::OK);
        (kept, removed_id)
    };

    let router = create_router(&temp_dir);

    let (_, list) = get(&router, "/movies").await;
    assert_eq!(list, json!([kept.clone()]));

    let (_, filtered) = get(&router, "/movies/filter?rating=4").await;
    assert_eq!(filtered, json!([kept.clone()]));

    let (status, _) = delete(&router, &removed_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&router, kept["_id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Health and metrics
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    for uri in ["/health", "/observability/health"] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let movie = create(&router, "Alien", "Sci-Fi", json!(4)).await;
    create(&router, "Heat", "Drama", json!(3)).await;
    post_json(&router, json!({"name": "X", "genre": "Y", "recommendation": 9})).await;
    get(&router, "/movies/filter?genre=Drama").await;
    delete(&router, movie["_id"].as_str().unwrap()).await;

    let (status, metrics) = get(&router, "/observability/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["movies_created"], 2);
    assert_eq!(metrics["movies_removed"], 1);
    assert_eq!(metrics["requests_rejected"], 1);
    assert_eq!(metrics["filters_served"], 1);
    assert_eq!(metrics["store_failures"], 0);
    assert_eq!(metrics["movies"], 1);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let router = create_router(&temp_dir);

    let request = Request::get("/movies")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
