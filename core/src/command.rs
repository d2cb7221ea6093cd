//! Requests emitted by the views and the tickets that route replies back.
//!
//! # Design
//! A view never performs I/O. Each state transition that needs the backend
//! returns `Command`s; the host executes `command.request` and passes the
//! reply back together with `command.ticket`. Tickets carry a generation
//! number so a view can drop replies that a newer request has superseded.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Reply};

/// Which backend call a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Trucks,
    Truck,
    Brands,
    Models,
    Years,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: FetchKind,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

impl Command {
    pub fn new(kind: FetchKind, generation: u64, request: HttpRequest) -> Self {
        Self {
            ticket: Ticket { kind, generation },
            request,
        }
    }
}

/// Navigation targets a view can ask the host for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Listing,
}

/// Side effects that are not HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Navigate { to: Route, after: Duration },
}

/// Monotonic request counter for one fetch chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation(u64);

impl Generation {
    /// Issue a new generation, obsoleting every earlier one.
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

/// Fold a transport failure and the parse step into one result.
pub(crate) fn settle<T>(
    reply: Reply,
    parse: impl FnOnce(HttpResponse) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    reply.map_err(ApiError::from).and_then(parse)
}
