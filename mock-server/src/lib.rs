//! In-memory stand-in for the truck backend.
//!
//! Serves `/api/trucks/` and the `/api/fipe/*` catalog proxies with the same
//! JSON shapes and error bodies as the real service, backed by a seeded
//! `Catalog` instead of the FIPE API.

pub mod catalog;

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, LazyLock},
};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

use catalog::{Catalog, FipeItem, Lookup};

static PLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z]{3}-?[0-9]{4}|[A-Z]{3}[0-9][A-Z][0-9]{2})$").expect("plate pattern is valid")
});

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Truck {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
    pub fipe_price: String,
}

#[derive(Deserialize)]
pub struct CreateTruck {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
}

/// PATCH body. Omitted fields keep their stored value; a plate in the body
/// is ignored.
#[derive(Deserialize)]
pub struct UpdateTruck {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub manufacturing_year: Option<i32>,
}

#[derive(Default)]
pub struct Store {
    trucks: BTreeMap<i64, Truck>,
    next_id: i64,
}

pub struct AppState {
    pub store: RwLock<Store>,
    pub catalog: Catalog,
}

pub type Db = Arc<AppState>;

/// JSON error response.
pub struct ApiFailure(StatusCode, serde_json::Value);

impl ApiFailure {
    fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(status, json!({ "error": message }))
    }

    /// Field-keyed validation error, e.g. `{"license_plate": ["..."]}`.
    fn field(field: &str, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), json!([message]));
        Self(StatusCode::BAD_REQUEST, serde_json::Value::Object(body))
    }

    fn from_lookup(lookup: Lookup) -> Self {
        match lookup {
            Lookup::Missing(msg) => Self::error(StatusCode::BAD_REQUEST, msg),
            Lookup::Upstream(msg) => Self::error(StatusCode::SERVICE_UNAVAILABLE, msg),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::error(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

pub fn app() -> Router {
    app_with_catalog(Catalog::default())
}

pub fn app_with_catalog(catalog: Catalog) -> Router {
    let db: Db = Arc::new(AppState {
        store: RwLock::new(Store::default()),
        catalog,
    });
    Router::new()
        .route("/api/trucks/", get(list_trucks).post(create_truck))
        .route("/api/trucks/{id}/", patch(update_truck))
        .route("/api/fipe/brands/", get(fipe_brands))
        .route("/api/fipe/models/", get(fipe_models))
        .route("/api/fipe/years/", get(fipe_years))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase().replace(' ', "")
}

async fn list_trucks(State(db): State<Db>) -> Json<Vec<Truck>> {
    let store = db.store.read().await;
    Json(store.trucks.values().cloned().collect())
}

async fn create_truck(
    State(db): State<Db>,
    input: Result<Json<CreateTruck>, JsonRejection>,
) -> Result<(StatusCode, Json<Truck>), ApiFailure> {
    let Json(input) = input?;
    let plate = normalize_plate(&input.license_plate);
    if !PLATE_RE.is_match(&plate) {
        return Err(ApiFailure::field(
            "license_plate",
            "Placa inválida. Use AAA-1234 ou AAA1A23.",
        ));
    }

    let priced = db
        .catalog
        .price(&input.brand, &input.model, input.manufacturing_year)
        .map_err(|e| ApiFailure::field("fipe", e.message()))?;

    let mut store = db.store.write().await;
    if store.trucks.values().any(|t| t.license_plate == plate) {
        return Err(ApiFailure::field(
            "license_plate",
            "Já existe um caminhão com esta placa.",
        ));
    }
    store.next_id += 1;
    let truck = Truck {
        id: store.next_id,
        license_plate: plate,
        brand: priced.brand,
        model: priced.model,
        manufacturing_year: priced.year,
        fipe_price: priced.price,
    };
    store.trucks.insert(truck.id, truck.clone());
    tracing::info!(id = truck.id, plate = %truck.license_plate, "truck created");
    Ok((StatusCode::CREATED, Json(truck)))
}

async fn update_truck(
    State(db): State<Db>,
    Path(id): Path<i64>,
    input: Result<Json<UpdateTruck>, JsonRejection>,
) -> Result<Json<Truck>, ApiFailure> {
    let Json(input) = input?;
    let mut store = db.store.write().await;
    let truck = store
        .trucks
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::error(StatusCode::NOT_FOUND, "Not found."))?;

    let brand = input.brand.unwrap_or_else(|| truck.brand.clone());
    let model = input.model.unwrap_or_else(|| truck.model.clone());
    let year = input.manufacturing_year.unwrap_or(truck.manufacturing_year);
    let priced = db
        .catalog
        .price(&brand, &model, year)
        .map_err(|e| ApiFailure::field("fipe", e.message()))?;

    truck.brand = priced.brand;
    truck.model = priced.model;
    truck.manufacturing_year = priced.year;
    truck.fipe_price = priced.price;
    tracing::info!(id, "truck updated");
    Ok(Json(truck.clone()))
}

async fn fipe_brands(State(db): State<Db>) -> Json<Vec<FipeItem>> {
    Json(db.catalog.brands())
}

async fn fipe_models(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<FipeItem>>, ApiFailure> {
    let brand = param(&params, "brand");
    if brand.is_empty() {
        return Err(ApiFailure::error(
            StatusCode::BAD_REQUEST,
            "Parâmetro obrigatório: brand",
        ));
    }
    db.catalog.models(brand).map(Json).map_err(ApiFailure::from_lookup)
}

async fn fipe_years(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<FipeItem>>, ApiFailure> {
    let brand = param(&params, "brand");
    let model = param(&params, "model");
    if brand.is_empty() || model.is_empty() {
        return Err(ApiFailure::error(
            StatusCode::BAD_REQUEST,
            "Parâmetros obrigatórios: brand, model",
        ));
    }
    db.catalog
        .years(brand, model)
        .map(Json)
        .map_err(ApiFailure::from_lookup)
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(|v| v.trim()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truck_serializes_to_json() {
        let truck = Truck {
            id: 1,
            license_plate: "ABC1D23".to_string(),
            brand: "FORD".to_string(),
            model: "CARGO 816".to_string(),
            manufacturing_year: 2020,
            fipe_price: "180500.00".to_string(),
        };
        let json = serde_json::to_value(&truck).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["fipe_price"], "180500.00");
        assert_eq!(json["manufacturing_year"], 2020);
    }

    #[test]
    fn create_truck_rejects_missing_year() {
        let result: Result<CreateTruck, _> =
            serde_json::from_str(r#"{"license_plate":"ABC1234","brand":"FORD","model":"X"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_truck_all_fields_optional() {
        let input: UpdateTruck = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.brand.is_none());
        assert!(input.model.is_none());
        assert!(input.manufacturing_year.is_none());
    }

    #[test]
    fn update_truck_ignores_plate() {
        let input: UpdateTruck =
            serde_json::from_str(r#"{"license_plate":"ZZZ9999","brand":"FORD"}"#).unwrap();
        assert_eq!(input.brand.as_deref(), Some("FORD"));
    }

    #[test]
    fn plate_normalization() {
        assert_eq!(normalize_plate(" abc 1d23 "), "ABC1D23");
        assert!(PLATE_RE.is_match(&normalize_plate("abc-1234")));
        assert!(!PLATE_RE.is_match(&normalize_plate("ab-1234")));
        assert!(!PLATE_RE.is_match(&normalize_plate("abc١٢٣٤")));
    }
}
