use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN: &str = "Atza|mock-access-token";
/// `key:secret`, base64 encoded
const BASIC_AUTH: &str = "Basic a2V5OnNlY3JldA==";

#[derive(Default)]
pub struct Calls {
    pub token: AtomicUsize,
    pub definitions: AtomicUsize,
    pub schema_documents: AtomicUsize,
    pub carriers: AtomicUsize,
    pub rates: AtomicUsize,
}

struct MockState {
    base_url: String,
    calls: Arc<Calls>,
    listings: Arc<Mutex<Vec<Value>>>,
    /// Requests with this token get a 403
    revoked_token: Mutex<Option<String>>,
}

type Shared = Arc<MockState>;

/// In-process stand-in for LWA, SP-API and ShipStation
pub struct MockServer {
    pub base_url: String,
    pub calls: Arc<Calls>,
    pub listings: Arc<Mutex<Vec<Value>>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let calls = Arc::new(Calls::default());
        let listings = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            calls: calls.clone(),
            listings: listings.clone(),
            revoked_token: Mutex::new(None),
        });

        let app = Router::new()
            .route("/auth/o2/token", post(token))
            .route("/definitions/2020-09-01/productTypes", get(search))
            .route("/definitions/2020-09-01/productTypes/:product_type", get(definition))
            .route("/schemas/:name", get(schema_document))
            .route("/listings/2021-08-01/items/:seller_id/:sku", put(put_listing))
            .route("/carriers", get(carriers))
            .route("/shipments/getrates", post(rates))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockServer {
            base_url,
            calls,
            listings,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub fn luggage_schema() -> Value {
    json!({
        "$schema": "https://schemas.amazon.com/selling-partners/definitions/product-types/meta-schema/v1",
        "properties": {
            "item_name": {
                "title": "Item Name",
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "string", "maxLength": 200 },
                        "language_tag": { "type": "string" },
                        "marketplace_id": { "type": "string" }
                    }
                }
            },
            "purchasable_offer": { "type": "object" },
            "item_package_weight": {
                "title": "Package Weight",
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "number" },
                        "unit": { "type": "string", "enum": ["pounds", "kilograms"] },
                        "marketplace_id": { "type": "string" }
                    }
                }
            },
            "is_expiration_dated_product": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "value": {
                            "type": "boolean",
                            "enum": [true, false],
                            "enumNames": ["Yes", "No"]
                        }
                    }
                }
            }
        },
        "required": ["item_name"]
    })
}

fn bearer_ok(state: &MockState, headers: &HeaderMap) -> bool {
    let Some(token) = headers.get("x-amz-access-token").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let revoked = state.revoked_token.lock().unwrap();
    token.starts_with("Atza|") && revoked.as_deref() != Some(token)
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "errors": [{ "code": "Unauthorized", "message": "Access to requested resource is denied." }] })),
    )
        .into_response()
}

async fn token(State(state): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    let n = state.calls.token.fetch_add(1, Ordering::SeqCst);

    if form.get("grant_type").map(String::as_str) != Some("refresh_token")
        || form.get("refresh_token").map(String::as_str) != Some("Atzr|refresh")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "The request has an invalid grant parameter" })),
        )
            .into_response();
    }

    // Every later token differs so a refresh is observable
    let access_token = if n == 0 {
        ACCESS_TOKEN.to_string()
    } else {
        format!("{}-{}", ACCESS_TOKEN, n)
    };

    Json(json!({
        "access_token": access_token,
        "refresh_token": "Atzr|refresh",
        "token_type": "bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn search(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !bearer_ok(&state, &headers) {
        return forbidden();
    }
    Json(json!({
        "productTypes": [
            { "name": "LUGGAGE", "displayName": "Luggage", "marketplaceIds": ["ATVPDBKIKQHOKH"] },
            { "name": "SUITCASE", "displayName": "Suitcase", "marketplaceIds": ["ATVPDBKIKQHOKH"] }
        ],
        "productTypeVersion": "UHARDLINES"
    }))
    .into_response()
}

async fn definition(
    State(state): State<Shared>,
    Path(product_type): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.calls.definitions.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&state, &headers) {
        return forbidden();
    }

    let schema = match product_type.as_str() {
        "LUGGAGE" => json!({
            "link": {
                "resource": format!("{}/schemas/luggage.json", state.base_url),
                "verb": "GET"
            },
            "checksum": "d41d8cd98f00b204e9800998ecf8427e"
        }),
        "NOT_OBJECT" => json!({
            "link": {
                "resource": format!("{}/schemas/not_object.json", state.base_url),
                "verb": "GET"
            }
        }),
        "SHIRT" => json!({
            "properties": {
                "color": { "type": "string", "enum": ["red", "blue"] }
            },
            "required": []
        }),
        "REVOKED" => {
            *state.revoked_token.lock().unwrap() = headers
                .get("x-amz-access-token")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return forbidden();
        }
        "BROKEN" => Value::Null,
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "errors": [{ "code": "NotFound", "message": "Product type not found" }] })),
            )
                .into_response()
        }
    };

    let mut body = json!({
        "productType": product_type,
        "displayName": product_type.to_lowercase(),
        "propertyGroups": {
            "offer": { "title": "Offer", "propertyNames": ["purchasable_offer"] }
        },
        "productTypeVersion": { "version": "U1", "latest": true, "releaseCandidate": false }
    });
    if !schema.is_null() {
        body["schema"] = schema;
    }
    Json(body).into_response()
}

async fn schema_document(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    state.calls.schema_documents.fetch_add(1, Ordering::SeqCst);
    match name.as_str() {
        "luggage.json" => Json(luggage_schema()).into_response(),
        "not_object.json" => Json(json!([1, 2])).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_listing(
    State(state): State<Shared>,
    Path((_seller_id, sku)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&state, &headers) {
        return forbidden();
    }
    state.listings.lock().unwrap().push(body);

    Json(json!({
        "sku": sku,
        "status": "ACCEPTED",
        "submissionId": "f1dc2914-75dd-11ea-bc55-0242ac130003",
        "issues": []
    }))
    .into_response()
}

fn basic_auth_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BASIC_AUTH)
}

async fn carriers(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.calls.carriers.fetch_add(1, Ordering::SeqCst);
    if !basic_auth_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "name": "Stamps.com", "code": "stamps_com", "accountNumber": "example", "requiresFundedAccount": true, "balance": 24.52 },
        { "name": "UPS", "code": "ups", "requiresFundedAccount": false },
        { "name": "Broken Carrier", "code": "broken" }
    ]))
    .into_response()
}

async fn rates(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.calls.rates.fetch_add(1, Ordering::SeqCst);
    if !basic_auth_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let quotes = match body["carrierCode"].as_str() {
        Some("stamps_com") => json!([
            { "serviceName": "USPS Priority Mail", "serviceCode": "usps_priority_mail", "shipmentCost": 8.9, "otherCost": 0.0 },
            { "serviceName": "USPS First Class Mail", "serviceCode": "usps_first_class_mail", "shipmentCost": 3.2, "otherCost": 0.5 }
        ]),
        Some("ups") => json!([
            { "serviceName": "UPS Ground", "serviceCode": "ups_ground", "shipmentCost": 9.75, "otherCost": 1.25 }
        ]),
        _ => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "Message": "An error has occurred" })),
            )
                .into_response()
        }
    };
    Json(quotes).into_response()
}
