//! The truck listing view.
//!
//! Holds the last fetched list and renders it as a table, an empty state or a
//! loading indicator. `load` and `refresh` emit the same request; a newer
//! load supersedes any reply still in flight.

use tracing::{debug, warn};

use crate::client::TruckClient;
use crate::command::{settle, Command, FetchKind, Generation, Ticket};
use crate::currency::format_price_brl;
use crate::http::Reply;
use crate::types::Truck;

pub const EMPTY_MESSAGE: &str = "Nenhum caminhão cadastrado ainda.";

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckRow {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub manufacturing_year: i32,
    pub price: String,
}

impl From<&Truck> for TruckRow {
    fn from(truck: &Truck) -> Self {
        Self {
            id: truck.id,
            license_plate: truck.license_plate.clone(),
            brand: truck.brand.clone(),
            model: truck.model.clone(),
            manufacturing_year: truck.manufacturing_year,
            price: format_price_brl(&truck.fipe_price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRender {
    Loading,
    Empty,
    Table(Vec<TruckRow>),
}

#[derive(Debug)]
pub struct ListingView {
    client: TruckClient,
    items: Vec<Truck>,
    loading: bool,
    error: Option<String>,
    generation: Generation,
}

impl ListingView {
    pub fn new(client: TruckClient) -> Self {
        Self {
            client,
            items: Vec::new(),
            loading: true,
            error: None,
            generation: Generation::default(),
        }
    }

    /// Mount: request the full list.
    pub fn load(&mut self) -> Command {
        self.loading = true;
        self.error = None;
        let generation = self.generation.advance();
        Command::new(FetchKind::Trucks, generation, self.client.build_list_trucks())
    }

    /// Manual refresh.
    pub fn refresh(&mut self) -> Command {
        self.load()
    }

    pub fn handle_reply(&mut self, ticket: Ticket, reply: Reply) {
        if ticket.kind != FetchKind::Trucks || !self.generation.is_current(ticket.generation) {
            debug!(?ticket, "discarding stale listing reply");
            return;
        }
        self.loading = false;
        match settle(reply, |r| self.client.parse_list_trucks(r)) {
            Ok(items) => {
                debug!(count = items.len(), "listing loaded");
                self.items = items;
            }
            Err(e) => {
                warn!(error = %e, "listing load failed");
                self.error = Some(e.message());
            }
        }
    }

    pub fn render(&self) -> ListingRender {
        if self.loading {
            ListingRender::Loading
        } else if self.items.is_empty() {
            ListingRender::Empty
        } else {
            ListingRender::Table(self.items.iter().map(TruckRow::from).collect())
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Truck] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
