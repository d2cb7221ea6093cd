//! Synchronous client core for the truck registry.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the stateless
//! `TruckClient` sit two view state machines, `ListingView` and `TruckForm`,
//! which emit `Command`s for the host to execute and consume the replies.
//!
//! # Design
//! - `TruckClient` is stateless: it holds only `base_url`.
//! - Each backend call is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Views tag every request with a `Ticket`; replies to superseded requests
//!   are dropped by generation.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod command;
pub mod currency;
pub mod error;
pub mod form;
pub mod http;
pub mod listing;
pub mod plate;
pub mod selection;
pub mod types;

pub use client::{find_truck, TruckClient};
pub use command::{Command, Effect, FetchKind, Route, Ticket};
pub use currency::format_price_brl;
pub use error::ApiError;
pub use form::{Field, FormError, FormMode, FormState, TruckForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Reply, TransportError};
pub use listing::{ListingRender, ListingView, TruckRow};
pub use plate::{is_valid_plate, normalize_plate};
pub use selection::{find_item, parse_year_from_label, Selection};
pub use types::{CreateTruck, FipeItem, Truck, UpdateTruck};
