//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use truck_core::{
    ApiError, CreateTruck, FipeItem, HttpMethod, HttpRequest, HttpResponse, Truck, TruckClient,
    UpdateTruck,
};

const BASE_URL: &str = "http://localhost:8000";

fn client() -> TruckClient {
    TruckClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Method, path, headers and JSON body of `req` against `expected_request`.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    match expected.get("headers") {
        Some(headers) => {
            let expected_headers: Vec<(String, String)> = headers
                .as_array()
                .unwrap()
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect();
            assert_eq!(req.headers, expected_headers, "{name}: headers");
        }
        None => assert!(req.headers.is_empty(), "{name}: headers should be empty"),
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

// ---------------------------------------------------------------------------
// List and lookup by id
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        assert_request(name, &c.build_list_trucks(), &case["expected_request"]);

        let trucks = c.parse_list_trucks(simulated(case)).unwrap();
        let expected: Vec<Truck> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(trucks, expected, "{name}: parsed result");

        if let Some(lookup) = case.get("lookup") {
            let id = lookup["id"].as_i64().unwrap();
            let truck = c.parse_get_truck(simulated(case), id).unwrap();
            assert_eq!(truck.license_plate, lookup["expected_plate"].as_str().unwrap(), "{name}: lookup");

            let missing = lookup["missing_id"].as_i64().unwrap();
            let err = c.parse_get_truck(simulated(case), missing).unwrap_err();
            assert_eq!(err, ApiError::NotFound, "{name}: missing id");
        }
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: CreateTruck = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_truck(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let truck = c.parse_create_truck(simulated(case)).unwrap();
        let expected: Truck = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(truck, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let raw = include_str!("../../test-vectors/update.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();
        let input: UpdateTruck = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_truck(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let truck = c.parse_update_truck(simulated(case)).unwrap();
        let expected: Truck = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(truck, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// FIPE catalogs
// ---------------------------------------------------------------------------

#[test]
fn fipe_test_vectors() {
    let raw = include_str!("../../test-vectors/fipe.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let brand = case["brand"].as_str().unwrap_or_default();
        let model = case["model"].as_str().unwrap_or_default();

        let req = match case["endpoint"].as_str().unwrap() {
            "brands" => c.build_fipe_brands(),
            "models" => c.build_fipe_models(brand),
            "years" => c.build_fipe_years(brand, model),
            other => panic!("unknown endpoint: {other}"),
        };
        assert_request(name, &req, &case["expected_request"]);

        let items = c.parse_fipe_items(simulated(case)).unwrap();
        let expected: Vec<FipeItem> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(items, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    let raw = include_str!("../../test-vectors/errors.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: case["body"].as_str().unwrap().to_string(),
        };

        let err = c.parse_list_trucks(response).unwrap_err();
        assert!(
            matches!(err, ApiError::Http { status: s, .. } if s == status),
            "{name}: variant"
        );
        assert_eq!(err.message(), case["expected_message"].as_str().unwrap(), "{name}: message");
    }
}
