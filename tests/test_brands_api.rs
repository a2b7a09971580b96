//! Brand endpoints driven through the router over the in-memory store.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn create_then_get_returns_trimmed_name() {
    let app = memory_app();

    let (status, body) = post(&app, "/api/brands", json!({ "name": "  Volkswagen  " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Volkswagen");
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(id >= 1);

    let (status, body) = get(&app, &format!("/api/brands/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": id, "name": "Volkswagen" }));
}

#[tokio::test]
async fn duplicate_name_is_rejected_without_a_new_row() {
    let app = memory_app();
    seed_brand(&app, "Fiat").await;

    let (status, body) = post(&app, "/api/brands", json!({ "name": "Fiat" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, StatusCode::BAD_REQUEST, "ConflictError");

    let (_, list) = get(&app, "/api/brands").await;
    assert_eq!(list["pagination"]["total"], 1);
}

#[tokio::test]
async fn unsafe_names_are_rejected_and_nothing_is_stored() {
    let app = memory_app();

    for name in ["<script>alert(1)</script>", "DROP TABLE brands", "Fiat; --", "Fiat@Home", "", "A"] {
        let (status, body) = post(&app, "/api/brands", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name {name:?} was accepted");
        assert_error(&body, StatusCode::BAD_REQUEST, "ValidationError");
    }

    let (_, list) = get(&app, "/api/brands").await;
    assert_eq!(list["pagination"]["total"], 0);
    assert_eq!(list["data"], json!([]));
}

#[tokio::test]
async fn malformed_body_and_id_are_validation_errors() {
    let app = memory_app();

    let (status, body) = post(&app, "/api/brands", json!({ "title": "Fiat" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, StatusCode::BAD_REQUEST, "ValidationError");

    for uri in ["/api/brands/abc", "/api/brands/0", "/api/brands/-1"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_error(&body, StatusCode::BAD_REQUEST, "ValidationError");
    }
}

#[tokio::test]
async fn update_renames_and_rejects_taken_names() {
    let app = memory_app();
    let fiat = seed_brand(&app, "Fiat").await;
    seed_brand(&app, "Ford").await;

    let (status, body) = put(&app, &format!("/api/brands/{fiat}"), json!({ "name": "Fiat Auto" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Fiat Auto");

    // Keeping its own name is not a conflict.
    let (status, _) = put(&app, &format!("/api/brands/{fiat}"), json!({ "name": "Fiat Auto" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = put(&app, &format!("/api/brands/{fiat}"), json!({ "name": "Ford" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, StatusCode::BAD_REQUEST, "ConflictError");

    let (status, body) = put(&app, "/api/brands/999", json!({ "name": "Nobody" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, StatusCode::NOT_FOUND, "NotFoundError");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = memory_app();
    let id = seed_brand(&app, "Renault").await;

    let (status, body) = delete(&app, &format!("/api/brands/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": null }));

    let (status, body) = get(&app, &format!("/api/brands/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, StatusCode::NOT_FOUND, "NotFoundError");

    let (status, _) = delete(&app, &format!("/api/brands/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_cascades_to_models_and_cars() {
    let app = memory_app();
    let brand = seed_brand(&app, "Chevrolet").await;
    let model = seed_model(&app, "Onix", brand, 70000.0).await;
    let car = seed_car(&app, model, "Preto", 2021, 4).await;

    let (status, _) = delete(&app, &format!("/api/brands/{brand}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/models/{model}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &format!("/api/cars/{car}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pagination_metadata_is_consistent() {
    let app = memory_app();
    for name in ["Audi", "BMW", "Citroen", "Dodge", "Exeed", "Fiat", "GWM"] {
        seed_brand(&app, name).await;
    }

    let mut seen = Vec::new();
    for page in 1..=3u64 {
        let (status, body) = get(&app, &format!("/api/brands?page={page}&limit=3")).await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert!(data.len() <= 3);
        seen.extend(data.iter().map(|b| b["name"].as_str().unwrap().to_string()));

        let pagination = &body["pagination"];
        assert_eq!(pagination["total"], 7);
        assert_eq!(pagination["totalPages"], 3);
        assert_eq!(pagination["page"], page);
        assert_eq!(pagination["limit"], 3);
        assert_eq!(pagination["hasNext"], page < 3);
        assert_eq!(pagination["hasPrev"], page > 1);
    }
    assert_eq!(seen.len(), 7);

    let (status, body) = get(&app, "/api/brands?page=9&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn search_and_sort_by_name() {
    let app = memory_app();
    for name in ["Ford", "Fiat", "Ferrari", "Honda"] {
        seed_brand(&app, name).await;
    }

    let (_, body) = get(&app, "/api/brands?search=f&sortBy=name&sortOrder=desc").await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ford", "Fiat", "Ferrari"]);
}

#[tokio::test]
async fn name_sort_ignores_case() {
    let app = memory_app();
    for name in ["BMW", "Citroen", "audi"] {
        seed_brand(&app, name).await;
    }

    let (_, body) = get(&app, "/api/brands?sortBy=name").await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["audi", "BMW", "Citroen"]);
}

#[tokio::test]
async fn characters_outside_allow_list_store_nothing() {
    let app = memory_app();
    for name in ["Citroën ×", "Azul ÷", "Fiat\nUno", "Fiat\tUno"] {
        let (status, body) = post(&app, "/api/brands", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name {name:?} was accepted");
        assert_error(&body, StatusCode::BAD_REQUEST, "ValidationError");
    }

    let (_, list) = get(&app, "/api/brands").await;
    assert_eq!(list["pagination"]["total"], 0);
}

#[tokio::test]
async fn invalid_paging_and_order_are_rejected() {
    let app = memory_app();
    for uri in [
        "/api/brands?page=0",
        "/api/brands?limit=0",
        "/api/brands?limit=101",
        "/api/brands?sortOrder=sideways",
        "/api/brands?page=abc",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_error(&body, StatusCode::BAD_REQUEST, "ValidationError");
    }
}
