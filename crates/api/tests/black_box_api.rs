use oneclick_core::TenantId;
use oneclick_products::PriceDigits;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod with in-memory services, bound to an ephemeral port.
        let services =
            oneclick_api::app::services::build_in_memory_services(PriceDigits::default());
        let app = oneclick_api::app::build_router(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Client {
    http: reqwest::Client,
    base_url: String,
    tenant_id: TenantId,
}

impl Client {
    fn new(srv: &TestServer, tenant_id: TenantId) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: srv.base_url.clone(),
            tenant_id,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("X-Tenant-Id", self.tenant_id.to_string())
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let res = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("X-Tenant-Id", self.tenant_id.to_string())
            .json(body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn uom(&self, symbol: &str) -> String {
        let (status, uoms) = self.get("/uoms").await;
        assert_eq!(status, StatusCode::OK);
        uoms.as_array()
            .unwrap()
            .iter()
            .find(|u| u["symbol"] == symbol)
            .and_then(|u| u["id"].as_str())
            .unwrap_or_else(|| panic!("no unit with symbol {symbol}"))
            .to_string()
    }

    /// A complete input for a unit-counted product.
    async fn input(&self, name: &str, code: &str) -> Value {
        let unit = self.uom("u").await;
        json!({
            "name": name,
            "code": code,
            "list_price": "19.99",
            "cost_price": "7.50",
            "default_uom": unit,
            "sale_uom": unit,
            "purchase_uom": unit,
        })
    }

    async fn product_count(&self) -> usize {
        let (status, body) = self.get("/products").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().len()
    }

    async fn template_count(&self) -> usize {
        let (status, body) = self.get("/templates").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().len()
    }
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn tenant_header_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let http = reqwest::Client::new();

    let res = http
        .get(format!("{}/products/oneclick", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert!(body["message"].as_str().unwrap().contains("X-Tenant-Id"));

    let res = http
        .get(format!("{}/products", srv.base_url))
        .header("X-Tenant-Id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn form_starts_with_defaults_and_both_pages_visible() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let (status, form) = client.get("/products/oneclick").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["state"], "view");
    assert_eq!(form["input"]["type"], "goods");
    assert_eq!(form["input"]["cost_price_method"], "fixed");
    assert_eq!(form["input"]["salable"], true);
    assert_eq!(form["input"]["purchasable"], true);
    assert_eq!(form["view"]["fields"]["list_price"]["required"], true);
    assert_eq!(form["view"]["fields"]["default_uom_category"]["readonly"], true);

    let pages = form["view"]["pages"].as_array().unwrap();
    assert!(pages.iter().all(|p| p["invisible"] == false));
}

#[tokio::test]
async fn changing_default_uom_rederives_units() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());
    let kg = client.uom("kg").await;
    let g = client.uom("g").await;
    let meter = client.uom("m").await;

    let (status, form) = client
        .post(
            "/products/oneclick/on_change/default_uom",
            &json!({ "default_uom": kg, "sale_uom": g, "purchase_uom": meter }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["input"]["sale_uom"], g.as_str());
    assert_eq!(form["input"]["purchase_uom"], kg.as_str());
    assert!(form["input"]["default_uom_category"].is_string());

    // Switching to another category never keeps the stale units.
    let mut input = form["input"].clone();
    input["default_uom"] = json!(meter);
    let (_, form) = client
        .post("/products/oneclick/on_change/default_uom", &input)
        .await;
    assert_eq!(form["input"]["sale_uom"], meter.as_str());
    assert_eq!(form["input"]["purchase_uom"], meter.as_str());
}

#[tokio::test]
async fn hidden_pages_follow_salable_and_purchasable() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let (_, form) = client
        .post(
            "/products/oneclick/on_change/default_uom",
            &json!({ "salable": false }),
        )
        .await;

    let pages = form["view"]["pages"].as_array().unwrap();
    let sale = pages.iter().find(|p| p["id"] == "sale").unwrap();
    let purchase = pages.iter().find(|p| p["id"] == "purchase").unwrap();
    assert_eq!(sale["invisible"], true);
    assert_eq!(purchase["invisible"], false);
    assert_eq!(form["view"]["fields"]["list_price"]["required"], false);
}

#[tokio::test]
async fn create_makes_one_template_and_one_product_and_opens_it() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let input = client.input("Widget", "W-100").await;
    let (status, created) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["state"], "open_");

    let product_id = created["product_id"].as_str().unwrap().to_string();
    let template_id = created["template_id"].as_str().unwrap().to_string();

    // The action filters on exactly the new product.
    let domain = created["action"]["domain"].clone();
    assert_eq!(domain, json!([["id", "=", product_id]]));
    assert_eq!(created["action"]["res_model"], "product.product");

    let (status, product) = client.get(&format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["template"], template_id.as_str());
    assert_eq!(product["rec_name"], "[W-100] Widget");
    assert_eq!(product["name"], "Widget");

    let (status, template) = client.get(&format!("/templates/{template_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(template["account_category"], true);

    // Following the action's domain lists the single product.
    let encoded = created["action"]["pyson_domain"].as_str().unwrap().to_string();
    let res = client
        .http
        .get(format!("{}/products", client.base_url))
        .header("X-Tenant-Id", client.tenant_id.to_string())
        .query(&[("domain", encoded)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], product_id.as_str());

    assert_eq!(client.product_count().await, 1);
    assert_eq!(client.template_count().await, 1);
}

#[tokio::test]
async fn non_salable_product_stores_no_sale_unit() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let mut input = client.input("Raw steel", "RS-1").await;
    input["salable"] = json!(false);
    let (status, created) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let template_id = created["template_id"].as_str().unwrap();
    let (_, template) = client.get(&format!("/templates/{template_id}")).await;
    assert_eq!(template["salable"], false);
    assert!(template["sale_uom"].is_null());
    assert!(template["purchase_uom"].is_string());
}

#[tokio::test]
async fn non_purchasable_product_stores_no_purchase_unit() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let mut input = client.input("Consulting", "SVC-1").await;
    input["purchasable"] = json!(false);
    input["type"] = json!("service");
    let (status, created) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let template_id = created["template_id"].as_str().unwrap();
    let (_, template) = client.get(&format!("/templates/{template_id}")).await;
    assert_eq!(template["purchasable"], false);
    assert!(template["purchase_uom"].is_null());
    assert_eq!(template["type"], "service");
}

#[tokio::test]
async fn existing_code_is_rejected_and_nothing_is_written() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let input = client.input("Widget", "W-100").await;
    let (status, _) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED);

    let other = client.input("Gadget", "W-100").await;
    let (status, err) = client.post("/products/oneclick/create", &other).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "product_exist");
    assert_eq!(
        err["message"],
        "Product \"[W-100] Widget\" with code \"W-100\" already exists."
    );

    assert_eq!(client.product_count().await, 1);
    assert_eq!(client.template_count().await, 1);
}

#[tokio::test]
async fn existing_name_without_code_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let input = client.input("Widget", "W-100").await;
    let (status, _) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED);

    let again = client.input("Widget", "").await;
    let (status, err) = client.post("/products/oneclick/create", &again).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "product_exist");
    assert_eq!(
        err["message"],
        "Product \"Widget\" with code \"W-100\" already exists."
    );
    assert_eq!(client.product_count().await, 1);
}

#[tokio::test]
async fn duplicates_are_checked_per_tenant() {
    let srv = TestServer::spawn().await;
    let acme = Client::new(&srv, TenantId::new());
    let globex = Client::new(&srv, TenantId::new());

    let input = acme.input("Widget", "W-100").await;
    let (status, _) = acme.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = globex.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(acme.product_count().await, 1);
    assert_eq!(globex.product_count().await, 1);
}

#[tokio::test]
async fn invalid_input_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let mut input = client.input("Widget", "W-100").await;
    input["list_price"] = Value::Null;
    let (status, err) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "validation_error");

    let mut input = client.input("Widget", "W-100").await;
    input["sale_uom"] = json!(client.uom("kg").await);
    let (status, _) = client.post("/products/oneclick/create", &input).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(client.product_count().await, 0);
    assert_eq!(client.template_count().await, 0);
}

#[tokio::test]
async fn cancel_ends_without_records() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let (status, body) = client.post("/products/oneclick/cancel", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "end");

    assert_eq!(client.product_count().await, 0);
    assert_eq!(client.template_count().await, 0);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let (status, err) = client
        .get(&format!("/products/{}", TenantId::new()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "not_found");

    let (status, err) = client.get("/products/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "invalid_id");

    let res = client
        .http
        .get(format!("{}/products", client.base_url))
        .header("X-Tenant-Id", client.tenant_id.to_string())
        .query(&[("domain", "not json")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reference_data_is_listed() {
    let srv = TestServer::spawn().await;
    let client = Client::new(&srv, TenantId::new());

    let (status, uoms) = client.get("/uoms").await;
    assert_eq!(status, StatusCode::OK);
    assert!(uoms.as_array().unwrap().len() >= 20);

    let (status, categories) = client.get("/uoms/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert!(categories.as_array().unwrap().iter().any(|c| c["name"] == "Weight"));

    let (status, categories) = client.get("/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!categories.as_array().unwrap().is_empty());
}
