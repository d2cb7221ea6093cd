//! Executes core requests over HTTP and pumps replies back into the views.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;
use truck_core::{
    Command, HttpMethod, HttpRequest, HttpResponse, ListingView, Reply, TransportError, TruckForm,
};

pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Reply;
}

/// Blocking transport on a shared ureq agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        // Status interpretation belongs to the core client.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Reply {
        debug!(method = request.method.as_str(), path = %request.path, "sending");
        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => self.agent.get(&request.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&request.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&request.path).send_empty(),
            (HttpMethod::Patch, Some(body)) => self
                .agent
                .patch(&request.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Patch, None) => self.agent.patch(&request.path).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;
        debug!(status, "received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Execute `commands` and every follow-up the form emits until it is idle.
pub fn drive_form(transport: &dyn Transport, form: &mut TruckForm, commands: Vec<Command>) {
    let mut queue: VecDeque<Command> = commands.into();
    while let Some(command) = queue.pop_front() {
        let reply = transport.execute(command.request);
        queue.extend(form.handle_reply(command.ticket, reply));
    }
}

pub fn load_listing(transport: &dyn Transport, listing: &mut ListingView) {
    let command = listing.load();
    let reply = transport.execute(command.request);
    listing.handle_reply(command.ticket, reply);
}
