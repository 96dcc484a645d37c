//! Integration tests for the API server.

use std::sync::OnceLock;

use api::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use document_store::{InMemoryDocumentStore, StoreOperation, UserStore};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    router: axum::Router,
    store: InMemoryDocumentStore,
}

fn setup() -> TestApp {
    let config = Config::default();
    let store = InMemoryDocumentStore::new();
    let state = api::create_default_state(store.clone(), &config);
    let router = api::create_app(state, get_metrics_handle(), &config);
    TestApp { router, store }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Signs up and logs in a user, returning (token, user id).
    async fn login_new_user(&self, email: &str, phone: &str) -> (String, String) {
        let response = self
            .post_json(
                "/users/signup",
                json!({
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "password": "engine42",
                    "email": email,
                    "phone": phone,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .post_json(
                "/users/login",
                json!({ "email": email, "password": "engine42" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = body_json(response).await;
        (
            json["token"].as_str().unwrap().to_string(),
            json["user_id"].as_str().unwrap().to_string(),
        )
    }

    async fn add_product(&self, name: &str, price: i64) -> String {
        let response = self
            .post_json(
                "/admin/addproduct",
                json!({ "product_name": name, "price": price, "rating": 4, "image": "x.png" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = self.get("/users/productview", None).await;
        let products = body_json(response).await;
        products
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["product_name"] == name)
            .map(|p| p["product_id"].as_str().unwrap().to_string())
            .unwrap()
    }
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app.get("/metrics", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

mod accounts {
    use super::*;

    #[tokio::test]
    async fn signup_returns_created() {
        let app = setup();
        let response = app
            .post_json(
                "/users/signup",
                json!({
                    "first_name": "Grace",
                    "last_name": "Hopper",
                    "password": "cobol59",
                    "email": "grace@example.com",
                    "phone": "555-0101",
                }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!("Successfully Signed Up!!"));
        assert_eq!(app.store.user_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_bad_request() {
        let app = setup();
        app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .post_json(
                "/users/signup",
                json!({
                    "first_name": "Ada",
                    "last_name": "Byron",
                    "password": "engine42",
                    "email": "ADA@example.com",
                    "phone": "555-0199",
                }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "user already exists");
    }

    #[tokio::test]
    async fn login_hides_password_hash() {
        let app = setup();
        app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .post_json(
                "/users/login",
                json!({ "email": "ada@example.com", "password": "engine42" }),
            )
            .await;
        let json = body_json(response).await;
        assert!(json.get("password_hash").is_none());
        assert!(json["refresh_token"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = setup();
        app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .post_json(
                "/users/login",
                json!({ "email": "ada@example.com", "password": "wrong-one" }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "login or password is incorrect"
        );
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn add_product_message() {
        let app = setup();
        let response = app
            .post_json(
                "/admin/addproduct",
                json!({ "product_name": "Mouse", "price": 2500, "image": "mouse.png" }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Successfully added the product!"
        );
    }

    #[tokio::test]
    async fn search_by_name() {
        let app = setup();
        app.add_product("iPhone 15", 99_900).await;
        app.add_product("Pixel 8", 69_900).await;

        let response = app.get("/users/search?name=iPhone", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let hits = body_json(response).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["product_name"], "iPhone 15");
    }

    #[tokio::test]
    async fn empty_search_is_not_found() {
        let app = setup();

        let response = app.get("/users/search?name=", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Invalid search index");
    }
}

mod cart {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = setup();
        let response = app.get("/listcart", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let app = setup();
        let response = app.get("/listcart", Some("not-a-token")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_product_id_is_bad_request() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .get(&format!("/addtocart?userID={user_id}"), Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "product id is empty");
    }

    #[tokio::test]
    async fn token_for_another_user_is_forbidden() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;
        let (_, other_user) = app.login_new_user("grace@example.com", "555-0101").await;
        let product_id = app.add_product("Mouse", 2_500).await;

        let response = app
            .get(
                &format!("/addtocart?id={product_id}&userID={other_user}"),
                Some(&token),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_user_id_is_bad_request() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .get("/listcart?userID=64b7f0c2a1e4b5d6c7e8f901", Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn padded_user_id_is_bad_request() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;

        let response = app
            .get(&format!("/listcart?userID=%20{user_id}"), Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn user_is_checked_before_product() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;

        for route in ["addtocart", "removeitem", "instantbuy"] {
            let response = app
                .get(&format!("/{route}?id=nope&userID=also-nope"), Some(&token))
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{route}");
        }
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;
        let missing = common::ProductId::new();

        let response = app
            .get(
                &format!("/addtocart?id={missing}&userID={user_id}"),
                Some(&token),
            )
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn add_list_remove() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;
        let mouse = app.add_product("Mouse", 2_500).await;
        let pad = app.add_product("Pad", 900).await;

        for id in [&mouse, &mouse, &pad] {
            let response = app
                .get(&format!("/addtocart?id={id}&userID={user_id}"), Some(&token))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let cart = body_json(app.get("/listcart", Some(&token)).await).await;
        assert_eq!(cart["lines"].as_array().unwrap().len(), 3);
        assert_eq!(cart["total"], 5_900);

        let response = app
            .get(&format!("/removeitem?id={mouse}"), Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["removed"], 2);

        let cart = body_json(app.get("/listcart", Some(&token)).await).await;
        assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
        assert_eq!(cart["total"], 900);
    }
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn checkout_moves_cart_into_order() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;
        let a = app.add_product("A", 100).await;
        let b = app.add_product("B", 250).await;
        for id in [&a, &b] {
            app.get(&format!("/addtocart?id={id}&userID={user_id}"), Some(&token))
                .await;
        }

        let response = app
            .get(&format!("/cartcheckout?userID={user_id}"), Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 350);
        assert_eq!(json["receipt"]["order"]["order_cart"].as_array().unwrap().len(), 2);
        let steps = json["receipt"]["steps"].as_array().unwrap();
        assert_eq!(steps.last().and_then(Value::as_str), Some("CartCleared"));

        let cart = body_json(app.get("/listcart", Some(&token)).await).await;
        assert!(cart["lines"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn overflowing_cart_total_is_bad_request() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;
        let huge = i64::MAX / 2 + 1;
        for name in ["Yacht", "Island"] {
            let id = app.add_product(name, huge).await;
            app.get(&format!("/addtocart?id={id}&userID={user_id}"), Some(&token))
                .await;
        }

        let response = app
            .get(&format!("/cartcheckout?userID={user_id}"), Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let user_id = common::UserId::parse(&user_id).unwrap();
        assert!(app.store.orders(user_id).await.unwrap().is_empty());
        assert_eq!(app.store.cart_lines(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_cart_is_conflict() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;

        let response = app.get("/cartcheckout", Some(&token)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn instant_buy_leaves_cart() {
        let app = setup();
        let (token, user_id) = app.login_new_user("ada@example.com", "555-0100").await;
        let mouse = app.add_product("Mouse", 2_500).await;
        let camera = app.add_product("Camera", 45_000).await;
        app.get(&format!("/addtocart?id={mouse}"), Some(&token)).await;

        let response = app
            .get(
                &format!("/instantbuy?id={camera}&userID={user_id}"),
                Some(&token),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 45_000);

        let cart = body_json(app.get("/listcart", Some(&token)).await).await;
        assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_failure_names_the_step() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;
        let camera = app.add_product("Camera", 45_000).await;
        app.store
            .fail_on(StoreOperation::AppendOrderDetailLines)
            .await;

        let response = app
            .get(&format!("/instantbuy?id={camera}"), Some(&token))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("LineItemsAppended"));
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let app = setup();
        let (token, _) = app.login_new_user("ada@example.com", "555-0100").await;
        app.store.fail_on(StoreOperation::CartLines).await;

        let response = app.get("/cartcheckout", Some(&token)).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
