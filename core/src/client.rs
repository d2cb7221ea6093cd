//! Stateless HTTP request builder and response parser for the truck API.
//!
//! # Design
//! `TruckClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Every path lives under `/api` with a trailing slash, the way the backend
//! routes them.
//!
//! There is no fetch-by-id endpoint: `build_get_truck` issues the listing
//! request and `parse_get_truck` filters the result.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTruck, FipeItem, Truck, UpdateTruck};

const API_PREFIX: &str = "/api";

/// Synchronous, stateless client for the truck backend.
#[derive(Debug, Clone)]
pub struct TruckClient {
    base_url: String,
}

impl TruckClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_trucks(&self) -> HttpRequest {
        self.get("/trucks/")
    }

    /// Same request as `build_list_trucks`; pair it with `parse_get_truck`.
    pub fn build_get_truck(&self) -> HttpRequest {
        self.build_list_trucks()
    }

    pub fn build_create_truck(&self, input: &CreateTruck) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/trucks/", input)
    }

    pub fn build_update_truck(&self, id: i64, input: &UpdateTruck) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Patch, &format!("/trucks/{id}/"), input)
    }

    pub fn build_fipe_brands(&self) -> HttpRequest {
        self.get("/fipe/brands/")
    }

    /// `brand` may be a reference code or a free-text name.
    pub fn build_fipe_models(&self, brand: &str) -> HttpRequest {
        self.get(&format!("/fipe/models/?brand={}", urlencoding::encode(brand)))
    }

    /// `brand` and `model` may each be a reference code or a free-text name.
    pub fn build_fipe_years(&self, brand: &str, model: &str) -> HttpRequest {
        self.get(&format!(
            "/fipe/years/?brand={}&model={}",
            urlencoding::encode(brand),
            urlencoding::encode(model)
        ))
    }

    pub fn parse_list_trucks(&self, response: HttpResponse) -> Result<Vec<Truck>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_truck(&self, response: HttpResponse, id: i64) -> Result<Truck, ApiError> {
        let trucks = self.parse_list_trucks(response)?;
        find_truck(trucks, id)
    }

    pub fn parse_create_truck(&self, response: HttpResponse) -> Result<Truck, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_truck(&self, response: HttpResponse) -> Result<Truck, ApiError> {
        parse_json(response)
    }

    /// Parses any of the three catalog responses.
    pub fn parse_fipe_items(&self, response: HttpResponse) -> Result<Vec<FipeItem>, ApiError> {
        parse_json(response)
    }
}

/// Select one truck out of a listing by its identifier.
pub fn find_truck(trucks: Vec<Truck>, id: i64) -> Result<Truck, ApiError> {
    trucks.into_iter().find(|t| t.id == id).ok_or(ApiError::NotFound)
}

/// Map non-2xx statuses to `ApiError::Http` with the body's message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
