use std::collections::HashMap;

use db::DBService;
use local_deployment::LocalDeployment;
use reqwest::{StatusCode, multipart};
use serde_json::{Value, json};
use server::routes;
use services::services::config::Config;
use tempfile::TempDir;
use tokio::net::TcpListener;

const ADMIN_PASSWORD: &str = "asmara-rahasia";

struct TestServer {
    base: String,
    http: reqwest::Client,
    _uploads: TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let uploads = tempfile::tempdir().unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            ("ADMIN_PASSWORD", ADMIN_PASSWORD.to_string()),
            ("ADMIN_SESSION_SECRET", "test-session-secret".to_string()),
            ("UPLOAD_DIR", uploads.path().display().to_string()),
            ("PUBLIC_BASE_URL", base.clone()),
            ("WHATSAPP_NUMBER", "+62 812 3456 789".to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let db = DBService::new_in_memory().await.unwrap();
        let deployment = LocalDeployment::from_parts(config, db).unwrap();

        tokio::spawn(async move {
            axum::serve(listener, routes::router(deployment)).await.unwrap();
        });

        Self {
            base,
            http: reqwest::Client::new(),
            _uploads: uploads,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.http.get(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn login(&self) -> String {
        let res = self
            .http
            .post(self.url("/api/admin/login"))
            .json(&json!({ "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn admin(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn create_product(&self, token: &str, name: &str, category: &str, featured: bool) -> Value {
        let (status, body) = self
            .admin(
                reqwest::Method::POST,
                "/api/products",
                token,
                Some(json!({
                    "name": name,
                    "category": category,
                    "description": "Produk pilihan",
                    "images": [format!("https://cdn.example/{name}.jpg")],
                    "featured": featured,
                    "tags": ["hadiah"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body["data"]["item"].clone()
    }
}

#[tokio::test]
async fn health_check_reports_ok() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn seeded_categories_are_public() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["bunga", "boneka", "aksesoris"]);
}

#[tokio::test]
async fn mutations_require_an_admin_session() {
    let server = TestServer::spawn().await;

    let res = server
        .http
        .post(server.url("/api/products"))
        .json(&json!({ "name": "Tulip", "category": "bunga", "images": ["a.jpg"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = server
        .admin(reqwest::Method::DELETE, "/api/products?id=1", "not-a-token", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let res = server
        .http
        .post(server.url("/api/admin/login"))
        .json(&json!({ "password": "salah" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_lifecycle_through_the_api() {
    let server = TestServer::spawn().await;
    let token = server.login().await;

    let created = server.create_product(&token, "Bunga Mawar", "bunga", false).await;
    assert_eq!(created["slug"], "bunga-mawar");
    let id = created["id"].as_i64().unwrap();

    let (status, body) = server
        .admin(
            reqwest::Method::POST,
            &format!("/api/products/{id}/toggle-featured"),
            &token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["featured"], true);

    let (status, body) = server
        .admin(
            reqwest::Method::PUT,
            "/api/products",
            &token,
            Some(json!({ "id": id, "name": "Mawar Merah" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["name"], "Mawar Merah");
    assert_eq!(body["data"]["item"]["slug"], "bunga-mawar");
    assert_eq!(body["data"]["collection"].as_array().unwrap().len(), 1);

    let (status, body) = server
        .admin(
            reqwest::Method::DELETE,
            &format!("/api/products?id={id}"),
            &token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["item"].is_null());
    assert!(body["data"]["collection"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_products_are_rejected_with_bad_request() {
    let server = TestServer::spawn().await;
    let token = server.login().await;

    let (status, body) = server
        .admin(
            reqwest::Method::POST,
            "/api/products",
            &token,
            Some(json!({ "name": "Tulip", "category": "bunga", "images": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("image"));

    let (status, _) = server
        .admin(
            reqwest::Method::POST,
            "/api/products",
            &token,
            Some(json!({ "name": "Tulip", "category": "tidak-ada", "images": ["a.jpg"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get("/api/products").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn catalog_search_and_featured_views() {
    let server = TestServer::spawn().await;
    let token = server.login().await;
    server.create_product(&token, "Mawar", "bunga", true).await;
    server.create_product(&token, "anggrek", "bunga", false).await;
    server.create_product(&token, "Teddy", "boneka", true).await;

    let (status, body) = server
        .get("/api/catalog/products?category=bunga&sort=name_asc")
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["anggrek", "Mawar"]);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["featured_total"], 2);

    let (_, body) = server.get("/api/catalog/products?search=HADIAH").await;
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 3);

    let (_, body) = server.get("/api/catalog/featured?sort=bogus").await;
    let names: Vec<&str> = body["data"]["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Teddy", "Mawar"]);
}

#[tokio::test]
async fn product_detail_and_order_link() {
    let server = TestServer::spawn().await;
    let token = server.login().await;
    server.create_product(&token, "Mawar", "bunga", false).await;
    server.create_product(&token, "Tulip", "bunga", false).await;

    let (status, body) = server.get("/api/catalog/products/mawar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["name"], "Mawar");
    assert_eq!(body["data"]["related"][0]["name"], "Tulip");

    let (status, body) = server.get("/api/catalog/products/tidak-ada").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (_, body) = server.get("/api/order-link?product=mawar").await;
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/628123456789?text="));
    assert!(url.contains("%2AMawar%2A"));

    let (_, body) = server.get("/api/order-link").await;
    assert!(body["data"]["url"].as_str().unwrap().ends_with("Toko%20Asmara%20Jaya%21"));
}

#[tokio::test]
async fn categories_in_use_cannot_be_deleted() {
    let server = TestServer::spawn().await;
    let token = server.login().await;
    server.create_product(&token, "Teddy", "boneka", false).await;

    let (_, body) = server.get("/api/categories").await;
    let boneka_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["slug"] == "boneka")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, _) = server
        .admin(
            reqwest::Method::DELETE,
            &format!("/api/categories?id={boneka_id}"),
            &token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = server
        .admin(
            reqwest::Method::PUT,
            "/api/categories",
            &token,
            Some(json!({ "id": boneka_id, "slug": "mainan" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["slug"], "mainan");

    let (_, body) = server.get("/api/catalog/products?category=mainan").await;
    assert_eq!(body["data"]["products"][0]["name"], "Teddy");
}

#[tokio::test]
async fn admin_stats_count_the_catalog() {
    let server = TestServer::spawn().await;
    let token = server.login().await;
    server.create_product(&token, "Mawar", "bunga", true).await;
    server.create_product(&token, "Teddy", "boneka", false).await;

    let (status, body) = server
        .admin(reqwest::Method::GET, "/api/admin/stats", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_products"], 2);
    assert_eq!(body["data"]["featured_products"], 1);
    assert_eq!(body["data"]["total_categories"], 3);
}

#[tokio::test]
async fn uploaded_images_are_served_back() {
    let server = TestServer::spawn().await;
    let token = server.login().await;

    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(b"\x89PNG fake".to_vec())
            .file_name("mawar.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let res = server
        .http
        .post(server.url("/api/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with(&server.url("/uploads/products/")));
    assert!(url.ends_with(".png"));

    let served = server.http.get(url).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"\x89PNG fake");
}
