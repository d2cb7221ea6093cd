//! The create/edit truck form.
//!
//! # Overview
//! `TruckForm` owns the transient form state of one create or edit
//! interaction: the plate text, the brand/model/year selections, the three
//! FIPE catalogs, the touched-field set and the banners. It drives the
//! cascading lookups brand → models → years and validates before submit.
//!
//! # Design
//! - Every transition returns the `Command`s it needs; replies come back
//!   through `handle_reply` in any order.
//! - The models chain and the years chain each have a `Generation`. Changing
//!   the brand advances both, changing the model advances the years chain, so
//!   a late reply for an older selection is dropped instead of populating a
//!   newer field.
//! - A user selection clears the dependent fields. Prefill and reconciliation
//!   refine a field without changing what it names, so they refetch the
//!   dependent catalogs but keep the dependent fields.
//! - Reconciliation (edit mode) turns prefilled free text into catalog
//!   entries as soon as the matching catalog is available.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::TruckClient;
use crate::command::{settle, Command, Effect, FetchKind, Generation, Route, Ticket};
use crate::error::ApiError;
use crate::http::Reply;
use crate::plate::{is_valid_plate, normalize_plate};
use crate::selection::{reconcile_by_name, reconcile_year, resolve_year, Selection};
use crate::types::{CreateTruck, FipeItem, Truck, UpdateTruck};

/// Delay between a successful save and the return to the listing.
pub const NAVIGATE_DELAY: Duration = Duration::from_millis(400);

pub const REQUIRED: &str = "Campo obrigatório.";
pub const INVALID_PLATE: &str = "Placa inválida. Use AAA-1234 ou AAA1A23.";
pub const INVALID_YEAR: &str = "Ano inválido.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LicensePlate,
    Brand,
    Model,
    ManufacturingYear,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::LicensePlate,
        Field::Brand,
        Field::Model,
        Field::ManufacturingYear,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub license_plate: String,
    pub brand: Selection,
    pub model: Selection,
    pub manufacturing_year: Selection,
}

/// Why `submit` did not produce a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Preencha os campos obrigatórios corretamente.")]
    Incomplete,
    #[error("Ano inválido.")]
    InvalidYear,
    #[error("Já existe um envio em andamento.")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct TruckForm {
    client: TruckClient,
    mode: FormMode,
    state: FormState,
    brands: Vec<FipeItem>,
    models: Vec<FipeItem>,
    years: Vec<FipeItem>,
    touched: HashSet<Field>,
    pending_mount: usize,
    submitting: bool,
    error: Option<String>,
    success: Option<String>,
    saved: Option<Truck>,
    effect: Option<Effect>,
    models_gen: Generation,
    years_gen: Generation,
    submit_gen: Generation,
}

impl TruckForm {
    /// Mount a create form. Requests the brand catalog.
    pub fn create(client: TruckClient) -> (Self, Vec<Command>) {
        Self::mount(client, FormMode::Create)
    }

    /// Mount an edit form. Requests the brand catalog and the truck record.
    pub fn edit(client: TruckClient, id: i64) -> (Self, Vec<Command>) {
        Self::mount(client, FormMode::Edit { id })
    }

    fn mount(client: TruckClient, mode: FormMode) -> (Self, Vec<Command>) {
        let mut commands = vec![Command::new(FetchKind::Brands, 0, client.build_fipe_brands())];
        if let FormMode::Edit { .. } = mode {
            commands.push(Command::new(FetchKind::Truck, 0, client.build_get_truck()));
        }
        let form = Self {
            client,
            mode,
            state: FormState::default(),
            brands: Vec::new(),
            models: Vec::new(),
            years: Vec::new(),
            touched: HashSet::new(),
            pending_mount: commands.len(),
            submitting: false,
            error: None,
            success: None,
            saved: None,
            effect: None,
            models_gen: Generation::default(),
            years_gen: Generation::default(),
            submit_gen: Generation::default(),
        };
        debug!(?mode, "form mounted");
        (form, commands)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            "Atualizar caminhão"
        } else {
            "Cadastrar caminhão"
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn brands(&self) -> &[FipeItem] {
        &self.brands
    }

    pub fn models(&self) -> &[FipeItem] {
        &self.models
    }

    pub fn years(&self) -> &[FipeItem] {
        &self.years
    }

    pub fn is_loading(&self) -> bool {
        self.pending_mount > 0
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// The truck returned by the last successful save.
    pub fn saved(&self) -> Option<&Truck> {
        self.saved.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Pending non-HTTP effect, if any. Taking it clears it.
    pub fn take_effect(&mut self) -> Option<Effect> {
        self.effect.take()
    }

    pub fn field_enabled(&self, field: Field) -> bool {
        match field {
            Field::LicensePlate => !self.is_edit(),
            Field::Brand => true,
            Field::Model => !self.state.brand.is_empty() && !self.models.is_empty(),
            Field::ManufacturingYear => {
                !self.state.brand.is_empty() && !self.state.model.is_empty() && !self.years.is_empty()
            }
        }
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Message for `field`, computed from the current values. Only touched
    /// fields report errors.
    pub fn field_error(&self, field: Field) -> Option<&'static str> {
        if !self.touched.contains(&field) {
            return None;
        }
        match field {
            Field::LicensePlate => {
                if self.is_edit() {
                    None
                } else if self.state.license_plate.trim().is_empty() {
                    Some(REQUIRED)
                } else if !is_valid_plate(&self.state.license_plate) {
                    Some(INVALID_PLATE)
                } else {
                    None
                }
            }
            Field::Brand => self.state.brand.is_empty().then_some(REQUIRED),
            Field::Model => self.state.model.is_empty().then_some(REQUIRED),
            Field::ManufacturingYear => self.state.manufacturing_year.is_empty().then_some(REQUIRED),
        }
    }

    pub fn field_errors(&self) -> Vec<(Field, &'static str)> {
        Field::ALL
            .iter()
            .filter_map(|f| self.field_error(*f).map(|msg| (*f, msg)))
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        let plate_ok = self.is_edit() || is_valid_plate(&self.state.license_plate);
        plate_ok
            && !self.state.brand.is_empty()
            && !self.state.model.is_empty()
            && !self.state.manufacturing_year.is_empty()
    }

    // ------------------------------------------------------------------
    // User input
    // ------------------------------------------------------------------

    /// Field lost focus.
    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn set_plate(&mut self, value: &str) {
        if self.is_edit() {
            return;
        }
        self.state.license_plate = value.to_string();
    }

    /// The user picked a brand option. `value` is the option's code; an
    /// empty value is the placeholder.
    pub fn select_brand(&mut self, value: &str) -> Vec<Command> {
        self.touched.insert(Field::Brand);
        self.state.brand = pick(&self.brands, value);
        self.state.model = Selection::Empty;
        self.state.manufacturing_year = Selection::Empty;
        self.brand_changed()
    }

    pub fn select_model(&mut self, value: &str) -> Vec<Command> {
        self.touched.insert(Field::Model);
        self.state.model = pick(&self.models, value);
        self.state.manufacturing_year = Selection::Empty;
        self.model_changed()
    }

    pub fn select_year(&mut self, value: &str) {
        self.touched.insert(Field::ManufacturingYear);
        self.state.manufacturing_year = pick(&self.years, value);
    }

    // ------------------------------------------------------------------
    // Cascade
    // ------------------------------------------------------------------

    fn brand_changed(&mut self) -> Vec<Command> {
        self.models.clear();
        let generation = self.models_gen.advance();
        let mut commands = Vec::new();
        if !self.state.brand.is_empty() {
            let brand = self.state.brand.lookup_key();
            debug!(brand, generation, "requesting models");
            commands.push(Command::new(
                FetchKind::Models,
                generation,
                self.client.build_fipe_models(brand),
            ));
        }
        commands.extend(self.model_changed());
        commands
    }

    fn model_changed(&mut self) -> Vec<Command> {
        self.years.clear();
        let generation = self.years_gen.advance();
        if self.state.brand.is_empty() || self.state.model.is_empty() {
            return Vec::new();
        }
        let brand = self.state.brand.lookup_key();
        let model = self.state.model.lookup_key();
        debug!(brand, model, generation, "requesting years");
        vec![Command::new(
            FetchKind::Years,
            generation,
            self.client.build_fipe_years(brand, model),
        )]
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate and build the create/update request. Marks every field as
    /// touched, so a rejected submit leaves the field errors visible.
    pub fn submit(&mut self) -> Result<Command, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        self.touched.extend(Field::ALL);
        self.error = None;
        self.success = None;

        if !self.can_submit() {
            debug!(errors = ?self.field_errors(), "submit blocked");
            return Err(FormError::Incomplete);
        }

        let brand = self.state.brand.display_name().to_string();
        let model = self.state.model.display_name().to_string();
        let Some(year) = resolve_year(&self.state.manufacturing_year) else {
            self.error = Some(INVALID_YEAR.to_string());
            return Err(FormError::InvalidYear);
        };

        let request = match self.mode {
            FormMode::Create => self.client.build_create_truck(&CreateTruck {
                license_plate: normalize_plate(&self.state.license_plate),
                brand,
                model,
                manufacturing_year: year,
            }),
            FormMode::Edit { id } => self.client.build_update_truck(
                id,
                &UpdateTruck {
                    brand,
                    model,
                    manufacturing_year: year,
                },
            ),
        };
        let request = request.inspect_err(|e| self.error = Some(e.message()))?;

        self.submitting = true;
        let generation = self.submit_gen.advance();
        Ok(Command::new(FetchKind::Submit, generation, request))
    }

    // ------------------------------------------------------------------
    // Replies
    // ------------------------------------------------------------------

    pub fn handle_reply(&mut self, ticket: Ticket, reply: Reply) -> Vec<Command> {
        match ticket.kind {
            FetchKind::Brands => self.on_brands(reply),
            FetchKind::Truck => self.on_truck(reply),
            FetchKind::Models if self.models_gen.is_current(ticket.generation) => self.on_models(reply),
            FetchKind::Years if self.years_gen.is_current(ticket.generation) => {
                self.on_years(reply);
                Vec::new()
            }
            FetchKind::Submit if self.submit_gen.is_current(ticket.generation) => {
                self.on_submitted(reply);
                Vec::new()
            }
            _ => {
                debug!(?ticket, "discarding stale reply");
                Vec::new()
            }
        }
    }

    fn mount_settled(&mut self) {
        self.pending_mount = self.pending_mount.saturating_sub(1);
    }

    fn fail(&mut self, context: &str, e: &ApiError) {
        warn!(error = %e, "{context}");
        self.error = Some(e.message());
    }

    fn on_brands(&mut self, reply: Reply) -> Vec<Command> {
        self.mount_settled();
        match settle(reply, |r| self.client.parse_fipe_items(r)) {
            Ok(items) => {
                debug!(count = items.len(), "brands loaded");
                self.brands = items;
                self.reconcile_brand()
            }
            Err(e) => {
                self.fail("brand catalog failed", &e);
                Vec::new()
            }
        }
    }

    fn on_truck(&mut self, reply: Reply) -> Vec<Command> {
        self.mount_settled();
        let FormMode::Edit { id } = self.mode else {
            return Vec::new();
        };
        let truck = match settle(reply, |r| self.client.parse_get_truck(r, id)) {
            Ok(truck) => truck,
            Err(e) => {
                self.fail("truck lookup failed", &e);
                return Vec::new();
            }
        };
        info!(id, plate = %truck.license_plate, "prefilling edit form");
        self.state.license_plate = truck.license_plate;
        self.state.brand = reconcile_by_name(&self.brands, &Selection::text(truck.brand));
        self.state.model = Selection::text(truck.model);
        self.state.manufacturing_year = Selection::text(truck.manufacturing_year.to_string());
        self.brand_changed()
    }

    fn on_models(&mut self, reply: Reply) -> Vec<Command> {
        match settle(reply, |r| self.client.parse_fipe_items(r)) {
            Ok(items) => {
                debug!(count = items.len(), "models loaded");
                self.models = items;
                self.reconcile_model()
            }
            Err(e) => {
                self.models.clear();
                self.years.clear();
                self.fail("model catalog failed", &e);
                Vec::new()
            }
        }
    }

    fn on_years(&mut self, reply: Reply) {
        match settle(reply, |r| self.client.parse_fipe_items(r)) {
            Ok(items) => {
                debug!(count = items.len(), "years loaded");
                self.years = items;
                self.reconcile_year();
            }
            Err(e) => {
                self.years.clear();
                self.fail("year catalog failed", &e);
            }
        }
    }

    fn on_submitted(&mut self, reply: Reply) {
        self.submitting = false;
        let result = match self.mode {
            FormMode::Create => settle(reply, |r| self.client.parse_create_truck(r)),
            FormMode::Edit { .. } => settle(reply, |r| self.client.parse_update_truck(r)),
        };
        match result {
            Ok(truck) => {
                info!(id = truck.id, plate = %truck.license_plate, "truck saved");
                self.success = Some(
                    if self.is_edit() {
                        "Caminhão atualizado com sucesso."
                    } else {
                        "Caminhão cadastrado com sucesso."
                    }
                    .to_string(),
                );
                self.saved = Some(truck);
                self.effect = Some(Effect::Navigate {
                    to: Route::Listing,
                    after: NAVIGATE_DELAY,
                });
            }
            Err(e) => self.fail("save failed", &e),
        }
    }

    // ------------------------------------------------------------------
    // Reconciliation (edit mode only)
    // ------------------------------------------------------------------

    fn reconcile_brand(&mut self) -> Vec<Command> {
        if !self.is_edit() || self.state.brand.is_resolved() {
            return Vec::new();
        }
        let resolved = reconcile_by_name(&self.brands, &self.state.brand);
        if resolved == self.state.brand {
            return Vec::new();
        }
        debug!(brand = resolved.lookup_key(), "brand reconciled");
        self.state.brand = resolved;
        self.brand_changed()
    }

    fn reconcile_model(&mut self) -> Vec<Command> {
        if !self.is_edit() || self.state.brand.is_empty() || self.state.model.is_resolved() {
            return Vec::new();
        }
        let resolved = reconcile_by_name(&self.models, &self.state.model);
        if resolved == self.state.model {
            return Vec::new();
        }
        debug!(model = resolved.lookup_key(), "model reconciled");
        self.state.model = resolved;
        self.model_changed()
    }

    fn reconcile_year(&mut self) {
        if !self.is_edit() {
            return;
        }
        let resolved = reconcile_year(&self.years, &self.state.manufacturing_year);
        if resolved != self.state.manufacturing_year {
            debug!(year = resolved.lookup_key(), "year reconciled");
            self.state.manufacturing_year = resolved;
        }
    }
}

/// Selection for an option value picked from `catalog`.
fn pick(catalog: &[FipeItem], value: &str) -> Selection {
    catalog
        .iter()
        .find(|item| item.code == value)
        .map(Selection::from_item)
        .unwrap_or_else(|| Selection::text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse, TransportError};

    const BASE: &str = "http://localhost:8000";

    fn client() -> TruckClient {
        TruckClient::new(BASE)
    }

    fn json(status: u16, body: &str) -> Reply {
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    const BRANDS: &str = r#"[{"code":"59","name":"FORD"},{"code":"102","name":"AGRALE"}]"#;
    const FORD_MODELS: &str = r#"[{"code":"5001","name":"CARGO 816"},{"code":"5002","name":"CARGO 2429"}]"#;
    const CARGO_YEARS: &str = r#"[{"code":"2020-3","name":"2020 Diesel"},{"code":"2019-3","name":"2019 Diesel"}]"#;
    const TRUCKS: &str = r#"[{"id":4,"license_plate":"ABC1D23","brand":"ford","model":"Cargo 816","manufacturing_year":2019,"fipe_price":"180000.00"}]"#;

    fn only(commands: Vec<Command>, kind: FetchKind) -> Command {
        let mut matching: Vec<_> = commands.into_iter().filter(|c| c.ticket.kind == kind).collect();
        assert_eq!(matching.len(), 1, "expected exactly one {kind:?} command");
        matching.remove(0)
    }

    fn loaded_create_form() -> TruckForm {
        let (mut form, commands) = TruckForm::create(client());
        let brands = only(commands, FetchKind::Brands);
        assert!(form.handle_reply(brands.ticket, json(200, BRANDS)).is_empty());
        form
    }

    #[test]
    fn create_mount_requests_brands_only() {
        let (form, commands) = TruckForm::create(client());
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].request.path, format!("{BASE}/api/fipe/brands/"));
        assert!(form.is_loading());
        assert_eq!(form.title(), "Cadastrar caminhão");
    }

    #[test]
    fn selecting_brand_fetches_models_by_code_and_clears_dependents() {
        let mut form = loaded_create_form();
        assert!(!form.is_loading());
        let models = only(form.select_brand("59"), FetchKind::Models);
        assert_eq!(models.request.path, format!("{BASE}/api/fipe/models/?brand=59"));
        form.handle_reply(models.ticket, json(200, FORD_MODELS));
        let years = only(form.select_model("5001"), FetchKind::Years);
        assert_eq!(years.request.path, format!("{BASE}/api/fipe/years/?brand=59&model=5001"));
        form.handle_reply(years.ticket, json(200, CARGO_YEARS));
        form.select_year("2020-3");
        assert!(form.field_enabled(Field::ManufacturingYear));

        // Picking another brand wipes model and year.
        form.select_brand("102");
        assert_eq!(form.state().model, Selection::Empty);
        assert_eq!(form.state().manufacturing_year, Selection::Empty);
        assert!(form.models().is_empty());
        assert!(form.years().is_empty());
    }

    #[test]
    fn placeholder_brand_issues_no_request() {
        let mut form = loaded_create_form();
        assert!(form.select_brand("").is_empty());
        assert_eq!(form.field_error(Field::Brand), Some(REQUIRED));
    }

    #[test]
    fn stale_model_reply_is_discarded() {
        let mut form = loaded_create_form();
        let first = only(form.select_brand("59"), FetchKind::Models);
        let second = only(form.select_brand("102"), FetchKind::Models);
        form.handle_reply(second.ticket, json(200, r#"[{"code":"7","name":"10000"}]"#));
        form.handle_reply(first.ticket, json(200, FORD_MODELS));
        assert_eq!(form.models(), &[FipeItem::new("7", "10000")]);
    }

    #[test]
    fn stale_year_reply_after_brand_change_is_discarded() {
        let mut form = loaded_create_form();
        let models = only(form.select_brand("59"), FetchKind::Models);
        form.handle_reply(models.ticket, json(200, FORD_MODELS));
        let years = only(form.select_model("5001"), FetchKind::Years);
        form.select_brand("102");
        form.handle_reply(years.ticket, json(200, CARGO_YEARS));
        assert!(form.years().is_empty());
    }

    #[test]
    fn model_failure_clears_catalogs_and_surfaces_error() {
        let mut form = loaded_create_form();
        let models = only(form.select_brand("59"), FetchKind::Models);
        form.handle_reply(models.ticket, json(503, r#"{"error":"Falha ao acessar FIPE"}"#));
        assert!(form.models().is_empty());
        assert_eq!(form.error(), Some("Falha ao acessar FIPE"));
        assert!(!form.field_enabled(Field::Model));
    }

    #[test]
    fn year_failure_clears_years_and_surfaces_error() {
        let mut form = loaded_create_form();
        let models = only(form.select_brand("59"), FetchKind::Models);
        form.handle_reply(models.ticket, json(200, FORD_MODELS));
        let years = only(form.select_model("5001"), FetchKind::Years);
        form.handle_reply(years.ticket, json(503, r#"{"detail":"FIPE indisponível"}"#));
        assert!(form.years().is_empty());
        assert_eq!(form.models().len(), 2);
        assert_eq!(form.error(), Some("FIPE indisponível"));
        assert!(!form.field_enabled(Field::ManufacturingYear));
    }

    #[test]
    fn brand_catalog_failure_on_mount_surfaces_error() {
        let (mut form, commands) = TruckForm::edit(client(), 4);
        let brands = only(commands.clone(), FetchKind::Brands);
        let truck = only(commands, FetchKind::Truck);

        form.handle_reply(brands.ticket, Err(TransportError("connection refused".into())));
        assert!(form.is_loading());
        assert!(form.brands().is_empty());
        assert!(form.error().unwrap().contains("connection refused"));

        form.handle_reply(truck.ticket, json(200, TRUCKS));
        assert!(!form.is_loading());
        assert_eq!(form.state().brand, Selection::text("ford"));
        assert!(form.error().unwrap().contains("connection refused"));
    }

    #[test]
    fn non_ascii_digit_plate_blocks_submit() {
        let mut form = filled_create_form("2020 Diesel");
        form.set_plate("ABC１２３４");
        assert_eq!(form.submit(), Err(FormError::Incomplete));
        assert_eq!(form.field_error(Field::LicensePlate), Some(INVALID_PLATE));
        assert!(!form.is_submitting());
    }

    #[test]
    fn form_errors_display_in_portuguese() {
        assert_eq!(
            FormError::Incomplete.to_string(),
            "Preencha os campos obrigatórios corretamente."
        );
        assert_eq!(FormError::Busy.to_string(), "Já existe um envio em andamento.");
        assert_eq!(FormError::InvalidYear.to_string(), INVALID_YEAR);
    }

    #[test]
    fn blank_submit_shows_four_errors_and_sends_nothing() {
        let mut form = loaded_create_form();
        for field in Field::ALL {
            form.touch(field);
        }
        assert_eq!(form.submit(), Err(FormError::Incomplete));
        let errors = form.field_errors();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|(_, msg)| *msg == REQUIRED));
        assert!(!form.is_submitting());
    }

    #[test]
    fn field_errors_only_for_touched_fields() {
        let mut form = loaded_create_form();
        form.set_plate("AB-12");
        assert!(form.field_errors().is_empty());
        form.touch(Field::LicensePlate);
        assert_eq!(form.field_error(Field::LicensePlate), Some(INVALID_PLATE));
        form.set_plate("abc-1234");
        assert_eq!(form.field_error(Field::LicensePlate), None);
    }

    fn filled_create_form(year_label: &str) -> TruckForm {
        let mut form = loaded_create_form();
        form.set_plate(" abc 1d23");
        let models = only(form.select_brand("59"), FetchKind::Models);
        form.handle_reply(models.ticket, json(200, FORD_MODELS));
        let years = only(form.select_model("5001"), FetchKind::Years);
        let body = format!(r#"[{{"code":"y1","name":"{year_label}"}}]"#);
        form.handle_reply(years.ticket, json(200, &body));
        form.select_year("y1");
        form
    }

    #[test]
    fn create_submit_sends_names_and_parsed_year() {
        let mut form = filled_create_form("2024 Gasolina");
        let command = form.submit().unwrap();
        assert_eq!(command.request.method, HttpMethod::Post);
        let body: serde_json::Value =
            serde_json::from_str(command.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["license_plate"], "ABC1D23");
        assert_eq!(body["brand"], "FORD");
        assert_eq!(body["model"], "CARGO 816");
        assert_eq!(body["manufacturing_year"], 2024);
        assert!(form.is_submitting());
        assert_eq!(form.submit(), Err(FormError::Busy));
    }

    #[test]
    fn unparsable_year_fails_locally() {
        let mut form = filled_create_form("Zero KM");
        assert_eq!(form.submit(), Err(FormError::InvalidYear));
        assert_eq!(form.error(), Some(INVALID_YEAR));
        assert!(!form.is_submitting());
    }

    #[test]
    fn successful_submit_navigates_after_delay() {
        let mut form = filled_create_form("2024 Gasolina");
        let command = form.submit().unwrap();
        let saved = r#"{"id":9,"license_plate":"ABC1D23","brand":"FORD","model":"CARGO 816","manufacturing_year":2024,"fipe_price":"1.00"}"#;
        form.handle_reply(command.ticket, json(201, saved));
        assert_eq!(form.success(), Some("Caminhão cadastrado com sucesso."));
        assert_eq!(form.saved().map(|t| t.id), Some(9));
        assert_eq!(
            form.take_effect(),
            Some(Effect::Navigate {
                to: Route::Listing,
                after: NAVIGATE_DELAY
            })
        );
        assert!(form.take_effect().is_none());
    }

    #[test]
    fn failed_submit_surfaces_server_message() {
        let mut form = filled_create_form("2024 Gasolina");
        let command = form.submit().unwrap();
        form.handle_reply(
            command.ticket,
            json(400, r#"{"error":"Já existe um caminhão com esta placa."}"#),
        );
        assert_eq!(form.error(), Some("Já existe um caminhão com esta placa."));
        assert!(!form.is_submitting());
        assert!(form.take_effect().is_none());
    }

    #[test]
    fn transport_failure_on_submit_is_surfaced() {
        let mut form = filled_create_form("2024 Gasolina");
        let command = form.submit().unwrap();
        form.handle_reply(command.ticket, Err(TransportError("timed out".to_string())));
        assert!(form.error().unwrap().contains("timed out"));
    }

    #[test]
    fn edit_mount_prefills_and_reconciles_brand() {
        let (mut form, commands) = TruckForm::edit(client(), 4);
        assert_eq!(commands.len(), 2);
        let brands = only(commands.clone(), FetchKind::Brands);
        let truck = only(commands, FetchKind::Truck);

        // Truck first: fields hold the raw stored values, lookups use text.
        let followups = form.handle_reply(truck.ticket, json(200, TRUCKS));
        assert_eq!(form.state().license_plate, "ABC1D23");
        assert_eq!(form.state().brand, Selection::text("ford"));
        let text_models = only(followups, FetchKind::Models);
        assert_eq!(text_models.request.path, format!("{BASE}/api/fipe/models/?brand=ford"));

        // Brand catalog arrives: "ford" becomes code 59 and models are refetched.
        let followups = form.handle_reply(brands.ticket, json(200, BRANDS));
        assert_eq!(form.state().brand.lookup_key(), "59");
        let code_models = only(followups.clone(), FetchKind::Models);
        assert_eq!(code_models.request.path, format!("{BASE}/api/fipe/models/?brand=59"));
        let years = only(followups, FetchKind::Years);
        assert_eq!(
            years.request.path,
            format!("{BASE}/api/fipe/years/?brand=59&model=Cargo%20816")
        );
        assert!(!form.is_loading());

        // The text-based reply is stale now.
        form.handle_reply(text_models.ticket, json(200, FORD_MODELS));
        assert!(form.models().is_empty());

        // Model reconciles to its code and years are refetched with codes.
        let followups = form.handle_reply(code_models.ticket, json(200, FORD_MODELS));
        assert_eq!(form.state().model.lookup_key(), "5001");
        let coded_years = only(followups, FetchKind::Years);
        assert_eq!(
            coded_years.request.path,
            format!("{BASE}/api/fipe/years/?brand=59&model=5001")
        );

        form.handle_reply(coded_years.ticket, json(200, CARGO_YEARS));
        assert_eq!(form.state().manufacturing_year.lookup_key(), "2019-3");

        let submit = form.submit().unwrap();
        assert_eq!(submit.request.method, HttpMethod::Patch);
        assert_eq!(submit.request.path, format!("{BASE}/api/trucks/4/"));
        let body: serde_json::Value =
            serde_json::from_str(submit.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["brand"], "FORD");
        assert_eq!(body["model"], "CARGO 816");
        assert_eq!(body["manufacturing_year"], 2019);
        assert!(body.get("license_plate").is_none());
    }

    #[test]
    fn edit_prefill_after_brands_requests_models_by_code_directly() {
        let (mut form, commands) = TruckForm::edit(client(), 4);
        let brands = only(commands.clone(), FetchKind::Brands);
        let truck = only(commands, FetchKind::Truck);
        form.handle_reply(brands.ticket, json(200, BRANDS));
        let followups = form.handle_reply(truck.ticket, json(200, TRUCKS));
        let models = only(followups, FetchKind::Models);
        assert_eq!(models.request.path, format!("{BASE}/api/fipe/models/?brand=59"));
    }

    #[test]
    fn edit_of_missing_truck_reports_not_found() {
        let (mut form, commands) = TruckForm::edit(client(), 99);
        let truck = only(commands, FetchKind::Truck);
        form.handle_reply(truck.ticket, json(200, TRUCKS));
        assert_eq!(form.error(), Some("Caminhão não encontrado."));
        assert!(form.state().brand.is_empty());
    }

    #[test]
    fn edit_mode_skips_plate_checks_and_ignores_plate_input() {
        let (mut form, _) = TruckForm::edit(client(), 4);
        form.set_plate("ZZZ");
        assert_eq!(form.state().license_plate, "");
        form.touch(Field::LicensePlate);
        assert_eq!(form.field_error(Field::LicensePlate), None);
        assert!(!form.field_enabled(Field::LicensePlate));
    }

    #[test]
    fn edit_without_catalog_match_submits_raw_text() {
        let (mut form, commands) = TruckForm::edit(client(), 4);
        let brands = only(commands.clone(), FetchKind::Brands);
        let truck = only(commands, FetchKind::Truck);
        form.handle_reply(brands.ticket, json(200, r#"[{"code":"1","name":"VOLVO"}]"#));
        form.handle_reply(truck.ticket, json(200, TRUCKS));
        assert_eq!(form.state().brand, Selection::text("ford"));

        let submit = form.submit().unwrap();
        let body: serde_json::Value =
            serde_json::from_str(submit.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["brand"], "ford");
        assert_eq!(body["model"], "Cargo 816");
        assert_eq!(body["manufacturing_year"], 2019);
    }

    #[test]
    fn create_mode_does_not_reconcile() {
        let mut form = loaded_create_form();
        // A value that is not an option code stays free text.
        form.select_brand("ford");
        assert_eq!(form.state().brand, Selection::text("ford"));
    }
}
