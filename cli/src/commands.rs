//! Command handlers

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use tracing::info;
use truck_core::{
    find_item, parse_year_from_label, Effect, FipeItem, FormError, HttpRequest, ListingView,
    Route, TruckClient, TruckForm,
};

use crate::cli::{Cli, Commands};
use crate::output;
use crate::transport::{drive_form, load_listing, Transport, UreqTransport};

pub fn execute(cli: Cli) -> Result<()> {
    let client = TruckClient::new(&cli.base_url);
    let transport = UreqTransport::new(Duration::from_secs(cli.timeout_secs));
    info!(base_url = client.base_url(), "using backend");

    match cli.command {
        Commands::List => list(&transport, &client),
        Commands::Create {
            plate,
            brand,
            model,
            year,
        } => create(&transport, &client, &plate, &brand, &model, &year),
        Commands::Edit {
            id,
            brand,
            model,
            year,
        } => edit(
            &transport,
            &client,
            id,
            brand.as_deref(),
            model.as_deref(),
            year.as_deref(),
        ),
        Commands::Brands => catalog(&transport, &client, client.build_fipe_brands()),
        Commands::Models { brand } => {
            catalog(&transport, &client, client.build_fipe_models(&brand))
        }
        Commands::Years { brand, model } => {
            catalog(&transport, &client, client.build_fipe_years(&brand, &model))
        }
    }
}

fn list(transport: &dyn Transport, client: &TruckClient) -> Result<()> {
    let mut listing = ListingView::new(client.clone());
    load_listing(transport, &mut listing);
    if let Some(error) = listing.error() {
        bail!("{error}");
    }
    println!("{}", output::format_listing(&listing));
    Ok(())
}

fn catalog(transport: &dyn Transport, client: &TruckClient, request: HttpRequest) -> Result<()> {
    let response = transport.execute(request)?;
    let items = client
        .parse_fipe_items(response)
        .map_err(|e| anyhow!(e.message()))?;
    println!("{}", output::format_catalog(&items));
    Ok(())
}

fn create(
    transport: &dyn Transport,
    client: &TruckClient,
    plate: &str,
    brand: &str,
    model: &str,
    year: &str,
) -> Result<()> {
    let (mut form, commands) = TruckForm::create(client.clone());
    drive_form(transport, &mut form, commands);
    ensure_no_error(&form)?;

    form.set_plate(plate);
    choose_brand(transport, &mut form, brand)?;
    choose_model(transport, &mut form, model)?;
    choose_year(&mut form, year)?;
    save(transport, client, &mut form)
}

fn edit(
    transport: &dyn Transport,
    client: &TruckClient,
    id: i64,
    brand: Option<&str>,
    model: Option<&str>,
    year: Option<&str>,
) -> Result<()> {
    let (mut form, commands) = TruckForm::edit(client.clone(), id);
    drive_form(transport, &mut form, commands);
    ensure_no_error(&form)?;

    let state = form.state();
    println!(
        "{}: {} | {} | {} | {}",
        form.title(),
        state.license_plate,
        state.brand.display_name(),
        state.model.display_name(),
        state.manufacturing_year.display_name(),
    );

    if let Some(brand) = brand {
        choose_brand(transport, &mut form, brand)?;
    }
    if let Some(model) = model {
        choose_model(transport, &mut form, model)?;
    }
    match year {
        Some(year) => choose_year(&mut form, year)?,
        None => return Ok(()),
    }
    save(transport, client, &mut form)
}

fn ensure_no_error(form: &TruckForm) -> Result<()> {
    match form.error() {
        Some(error) => bail!("{error}"),
        None => Ok(()),
    }
}

fn choose_brand(transport: &dyn Transport, form: &mut TruckForm, wanted: &str) -> Result<()> {
    let code = find_item(form.brands(), wanted)
        .map(|item| item.code.clone())
        .ok_or_else(|| anyhow!("Marca não encontrada: {wanted}"))?;
    let commands = form.select_brand(&code);
    drive_form(transport, form, commands);
    ensure_no_error(form)
}

fn choose_model(transport: &dyn Transport, form: &mut TruckForm, wanted: &str) -> Result<()> {
    let code = find_item(form.models(), wanted)
        .map(|item| item.code.clone())
        .ok_or_else(|| anyhow!("Modelo não encontrado: {wanted}"))?;
    let commands = form.select_model(&code);
    drive_form(transport, form, commands);
    ensure_no_error(form)
}

fn choose_year(form: &mut TruckForm, wanted: &str) -> Result<()> {
    let code = year_code(form.years(), wanted).ok_or_else(|| anyhow!("Ano não encontrado: {wanted}"))?;
    form.select_year(&code);
    Ok(())
}

/// Match a year option by code, by label, or by the plain year it starts with.
fn year_code(years: &[FipeItem], wanted: &str) -> Option<String> {
    find_item(years, wanted)
        .or_else(|| {
            let year: i32 = wanted.trim().parse().ok()?;
            years
                .iter()
                .find(|item| parse_year_from_label(&item.name) == Some(year))
        })
        .map(|item| item.code.clone())
}

fn save(transport: &dyn Transport, client: &TruckClient, form: &mut TruckForm) -> Result<()> {
    let command = match form.submit() {
        Ok(command) => command,
        Err(FormError::Incomplete) => {
            bail!("Campos inválidos:\n{}", output::format_field_errors(form))
        }
        Err(e) => return Err(e.into()),
    };
    drive_form(transport, form, vec![command]);
    ensure_no_error(form)?;

    if let Some(success) = form.success() {
        println!("{success}");
    }
    if let Some(Effect::Navigate {
        to: Route::Listing,
        after,
    }) = form.take_effect()
    {
        thread::sleep(after);
        let mut listing = ListingView::new(client.clone());
        load_listing(transport, &mut listing);
        println!("{}", output::format_listing(&listing));
    }
    Ok(())
}
