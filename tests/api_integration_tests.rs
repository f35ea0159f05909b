// API Integration Tests
//
// Purpose: Drive POST /predict/ end to end against the sample artifacts in model/ and data/
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use crop_advisor::{create_router, AppState, MonthOrdering, ServerConfig};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt; // for oneshot

    fn repo_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
    }

    fn sample_config() -> ServerConfig {
        ServerConfig {
            model_path: repo_path("model/crop_model.json"),
            label_encoder_path: repo_path("model/label_encoder.json"),
            rice_data_path: repo_path("data/RICE_TNAU_STXT.csv"),
            ..ServerConfig::default()
        }
    }

    // Helper: Create test app from the shipped sample artifacts
    fn create_test_app(config: &ServerConfig) -> axum::Router {
        let state = AppState::new(config).expect("sample artifacts should load");
        create_router(state)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn post_predict(app: axum::Router, body: Value) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict/")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    fn humid_request(district: &str, month: &str, soil_texture: &str) -> Value {
        json!({
            "temperature": 26.0,
            "humidity": 85.0,
            "ph": 6.5,
            "district": district,
            "month": month,
            "soil_texture": soil_texture,
        })
    }

    /// Hot and dry: rice falls outside the top five
    fn dry_request() -> Value {
        json!({
            "temperature": 30.0,
            "humidity": 40.0,
            "ph": 6.5,
            "district": "Thanjavur",
            "month": "August",
            "soil_texture": "Clay",
        })
    }

    /// Confidence strings look like "12.34%"
    fn is_percentage(s: &str) -> bool {
        let Some(number) = s.strip_suffix('%') else {
            return false;
        };
        let Some((whole, frac)) = number.split_once('.') else {
            return false;
        };
        !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && frac.len() == 2
            && frac.chars().all(|c| c.is_ascii_digit())
    }

    fn top_crops(body: &Value) -> Vec<(String, f64)> {
        body["Top_5_Crops"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| {
                let obj = entry.as_object().unwrap();
                assert_eq!(obj.len(), 1, "each crop entry has exactly one key");
                let (name, pct) = obj.iter().next().unwrap();
                let pct = pct.as_str().unwrap();
                assert!(is_percentage(pct), "bad confidence string: {}", pct);
                (name.clone(), pct.trim_end_matches('%').parse().unwrap())
            })
            .collect()
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(&sample_config());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["classes"], 8);
        assert_eq!(body["rice_varieties"], 13);
    }

    // =========================================================================
    // Section 2: Top-5 crops
    // =========================================================================

    #[tokio::test]
    async fn test_top_five_shape() {
        let app = create_test_app(&sample_config());
        let response = post_predict(app, humid_request("Thanjavur", "August", "Clay")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let crops = top_crops(&body);

        assert_eq!(crops.len(), 5);
        assert!(crops.windows(2).all(|w| w[0].1 >= w[1].1), "not sorted: {:?}", crops);

        let names: Vec<&str> = crops.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["rice", "jute", "banana", "mango", "cotton"]);
        assert_eq!(body["Top_5_Crops"][0], json!({ "rice": "29.00%" }));
        assert_eq!(body["Top_5_Crops"][4], json!({ "cotton": "12.00%" }));
    }

    #[tokio::test]
    async fn test_no_trailing_slash_route() {
        let app = create_test_app(&sample_config());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(dry_request().to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_out_of_range_inputs_still_classified() {
        let app = create_test_app(&sample_config());
        let response = post_predict(
            app,
            json!({
                "temperature": -273.0,
                "humidity": 1000,
                "ph": 42,
                "district": "",
                "month": "",
                "soil_texture": "",
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(top_crops(&body).len(), 5);
    }

    // =========================================================================
    // Section 3: Rice varieties
    // =========================================================================

    #[tokio::test]
    async fn test_rice_varieties_attached() {
        let app = create_test_app(&sample_config());
        let body = json_response(post_predict(app, humid_request("Thanjavur", "August", "Clay")).await).await;

        // String order: April..September and August..October contain "August"; June..September does not
        assert_eq!(body["Rice_Varieties"], json!(["ADT 43", "CR 1009"]));
    }

    #[tokio::test]
    async fn test_calendar_ordering_includes_june_to_september() {
        let config = ServerConfig {
            month_ordering: MonthOrdering::Calendar,
            ..sample_config()
        };
        let app = create_test_app(&config);
        let body = json_response(post_predict(app, humid_request("Thanjavur", "August", "Clay")).await).await;

        assert_eq!(body["Rice_Varieties"], json!(["ADT 43", "ADT 51", "CR 1009"]));
    }

    #[tokio::test]
    async fn test_rice_varieties_normalized_inputs() {
        let plain = json_response(
            post_predict(create_test_app(&sample_config()), humid_request("Thanjavur", "August", "Clay")).await,
        )
        .await;
        let noisy = json_response(
            post_predict(
                create_test_app(&sample_config()),
                humid_request("  THANJAVUR ", "august  ", " cLAY"),
            )
            .await,
        )
        .await;

        assert_eq!(plain["Rice_Varieties"], noisy["Rice_Varieties"]);
    }

    #[tokio::test]
    async fn test_unknown_district_placeholder() {
        let app = create_test_app(&sample_config());
        let body = json_response(post_predict(app, humid_request("Nowhere", "August", "Clay")).await).await;

        assert_eq!(body["Rice_Varieties"], json!(["No varieties found"]));
    }

    #[tokio::test]
    async fn test_no_rice_no_varieties_key() {
        let app = create_test_app(&sample_config());
        let body = json_response(post_predict(app, dry_request()).await).await;

        let crops = top_crops(&body);
        let names: Vec<&str> = crops.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["cotton", "maize", "mango", "chickpea", "coffee"]);
        assert!(crops.iter().all(|(name, _)| !name.eq_ignore_ascii_case("rice")));
        assert!(body.get("Rice_Varieties").is_none());
    }

    #[tokio::test]
    async fn test_repeat_request_identical() {
        let state = AppState::new(&sample_config()).unwrap();
        let first = json_response(
            post_predict(create_router(state.clone()), humid_request("Thanjavur", "August", "Clay")).await,
        )
        .await;
        let second = json_response(
            post_predict(create_router(state), humid_request("Thanjavur", "August", "Clay")).await,
        )
        .await;

        assert_eq!(first, second);
    }

    // =========================================================================
    // Section 4: Validation
    // =========================================================================

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let app = create_test_app(&sample_config());
        let response = post_predict(
            app,
            json!({
                "temperature": 26.0,
                "humidity": 85.0,
                "district": "Thanjavur",
                "month": "August",
                "soil_texture": "Clay",
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_string_number_rejected() {
        let app = create_test_app(&sample_config());
        let mut body = dry_request();
        body["ph"] = json!("6.5");

        let response = post_predict(app, body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let app = create_test_app(&sample_config());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"temperature\": 26.0,"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    // =========================================================================
    // Section 5: Startup faults
    // =========================================================================

    #[test]
    fn test_broken_model_fails_startup() {
        let config = ServerConfig {
            model_path: repo_path("tests/fixtures/broken_forest.json"),
            ..sample_config()
        };
        assert!(AppState::new(&config).is_err());
    }

    #[test]
    fn test_label_count_mismatch_fails_startup() {
        let config = ServerConfig {
            label_encoder_path: repo_path("tests/fixtures/mismatched_label_encoder.json"),
            ..sample_config()
        };
        let err = AppState::new(&config).err().expect("startup should fail");
        assert!(format!("{:#}", err).contains("disagree"));
    }

    #[test]
    fn test_missing_reference_table_fails_startup() {
        let config = ServerConfig {
            rice_data_path: repo_path("data/does_not_exist.csv"),
            ..sample_config()
        };
        assert!(AppState::new(&config).is_err());
    }
}
