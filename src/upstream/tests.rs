//! Upstream Module Tests
//!
//! ## Test Scopes
//! - **Mapping**: id/name fallbacks, brand extraction, kJ to kcal conversion.
//! - **Parameters**: alias names and limit clamping.
//! - **Client**: request parameters and status mapping against a local mock server.

#[cfg(test)]
mod tests {
    use crate::upstream::handlers::handle_food_search;
    use crate::upstream::openfoodfacts::{
        OpenFoodFactsClient, UpstreamError, clamp_limit, extract_number, kj_to_kcal, map_product,
        primary_brand,
    };
    use crate::upstream::types::{FoodSearchParams, Product};
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Extension, Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn product(value: Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    async fn mock_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/cgi/search.pl", addr)
    }

    fn client(endpoint: String) -> OpenFoodFactsClient {
        OpenFoodFactsClient::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    // ============================================================
    // MAPPING
    // ============================================================

    #[test]
    fn test_map_product_full() {
        let item = map_product(product(json!({
            "id": "3017620422003",
            "product_name": "Nutella",
            "brands": " Ferrero , Nutella",
            "serving_size": "15 g",
            "serving_quantity": "15",
            "nutriments": {"energy-kcal_serving": 80, "energy-kcal_100g": "539"}
        })))
        .unwrap();

        assert_eq!(item.id, "3017620422003");
        assert_eq!(item.name, "Nutella");
        assert_eq!(item.brand.as_deref(), Some("Ferrero"));
        assert_eq!(item.serving_size.as_deref(), Some("15 g"));
        assert_eq!(item.serving_quantity, Some(15.0));
        assert_eq!(item.calories_per_serving, Some(80.0));
        assert_eq!(item.calories_per_100g, Some(539.0));
    }

    #[test]
    fn test_map_product_fallbacks() {
        let item = map_product(product(json!({
            "_id": 12345,
            "generic_name": "Rye bread",
            "nutriments": {"energy_serving": 418.4, "energy_100g": "1046 kJ"}
        })))
        .unwrap();

        assert_eq!(item.id, "12345");
        assert_eq!(item.name, "Rye bread");
        assert_eq!(item.brand, None);
        assert!((item.calories_per_serving.unwrap() - 100.0).abs() < 1e-9);
        assert!((item.calories_per_100g.unwrap() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_product_requires_id_and_name() {
        assert!(map_product(product(json!({"product_name": "Orphan"}))).is_none());
        assert!(map_product(product(json!({"id": "1"}))).is_none());
        assert!(map_product(product(json!({"id": "", "product_name": "x"}))).is_none());
        assert!(map_product(product(json!({"id": "1", "product_name": ""}))).is_none());
    }

    #[test]
    fn test_serialized_item_omits_missing_fields() {
        let item = map_product(product(json!({"id": "1", "product_name": "Water"}))).unwrap();
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value, json!({"id": "1", "name": "Water"}));
    }

    #[test]
    fn test_primary_brand() {
        assert_eq!(primary_brand(Some("A, B")), Some("A".to_string()));
        assert_eq!(primary_brand(Some(" , ,B ")), Some("B".to_string()));
        assert_eq!(primary_brand(Some("")), None);
        assert_eq!(primary_brand(None), None);
    }

    #[test]
    fn test_extract_number_key_priority() {
        let nutriments = json!({"a": "n/a", "b": "12.5g", "c": 99})
            .as_object()
            .unwrap()
            .clone();

        assert_eq!(extract_number(&nutriments, &["a", "b", "c"]), Some(12.5));
        assert_eq!(extract_number(&nutriments, &["c", "b"]), Some(99.0));
        assert_eq!(extract_number(&nutriments, &["missing"]), None);
    }

    #[test]
    fn test_kj_to_kcal() {
        assert_eq!(kj_to_kcal(None), None);
        assert_eq!(kj_to_kcal(Some(0.0)), None);
        assert!((kj_to_kcal(Some(4184.0)).unwrap() - 1000.0).abs() < 1e-9);
    }

    // ============================================================
    // PARAMETERS
    // ============================================================

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some("abc")), 10);
        assert_eq!(clamp_limit(Some("0")), 10);
        assert_eq!(clamp_limit(Some("-3")), 1);
        assert_eq!(clamp_limit(Some("7")), 7);
        assert_eq!(clamp_limit(Some("100")), 25);
    }

    #[test]
    fn test_param_aliases() {
        let params = FoodSearchParams {
            q: Some("  kimchi ".to_string()),
            lc: Some("ko".to_string()),
            page_size: Some("5".to_string()),
            ..Default::default()
        };
        assert_eq!(params.query(), "kimchi");
        assert_eq!(params.language(), Some("ko"));
        assert_eq!(params.limit(), Some("5"));

        let params = FoodSearchParams {
            query: Some("tofu".to_string()),
            q: Some("ignored".to_string()),
            language: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.query(), "tofu");
        assert_eq!(params.language(), None);
    }

    // ============================================================
    // CLIENT
    // ============================================================

    #[tokio::test]
    async fn test_client_sends_search_parameters() {
        let router = Router::new().route(
            "/cgi/search.pl",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "products": [
                        {"id": "1", "product_name": query["search_terms"].clone()},
                        {"id": "2", "product_name": query["page_size"].clone()},
                        {"id": "3", "product_name": query.get("lc").cloned().unwrap_or_default()},
                        {"product_name": "no id"}
                    ]
                }))
            }),
        );
        let client = client(mock_server(router).await);

        let items = client.search("green tea", Some("fr"), 4).await.unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["green tea", "4", "fr"]);
    }

    #[tokio::test]
    async fn test_client_maps_upstream_failure() {
        let router = Router::new().route(
            "/cgi/search.pl",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let client = client(mock_server(router).await);

        let err = client.search("milk", None, 10).await.unwrap_err();
        match &err {
            UpstreamError::Status { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected Status, got {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_client_transport_failure() {
        // Nothing listens on this port once the listener is dropped
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client(format!("http://{}/cgi/search.pl", addr));

        let err = client.search("milk", None, 10).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Transport(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_short_query_skips_upstream() {
        // Unroutable endpoint: a request would fail the test
        let client = Arc::new(client("http://127.0.0.1:9/cgi/search.pl".to_string()));
        let params = FoodSearchParams {
            query: Some(" a ".to_string()),
            ..Default::default()
        };

        let Json(response) = handle_food_search(Query(params), Extension(client))
            .await
            .unwrap();

        assert!(response.items.is_empty());
        assert_eq!(response.total, 0);
    }
}
