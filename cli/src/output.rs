//! Terminal rendering of the views.

use truck_core::listing::EMPTY_MESSAGE;
use truck_core::{FipeItem, ListingRender, ListingView, TruckForm, TruckRow};

const HEADERS: [&str; 6] = ["ID", "Placa", "Marca", "Modelo", "Ano", "Preço FIPE"];

fn cells(row: &TruckRow) -> [String; 6] {
    [
        row.id.to_string(),
        row.license_plate.clone(),
        row.brand.clone(),
        row.model.clone(),
        row.manufacturing_year.to_string(),
        row.price.clone(),
    ]
}

/// Render rows as a left-aligned table.
pub fn format_table(rows: &[TruckRow]) -> String {
    let body: Vec<[String; 6]> = rows.iter().map(cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &body {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |line: &[String]| -> String {
        line.iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = vec![render(&header)];
    out.extend(body.iter().map(|line| render(line)));
    out.join("\n")
}

pub fn format_listing(listing: &ListingView) -> String {
    let mut out = Vec::new();
    if let Some(error) = listing.error() {
        out.push(format!("Erro: {error}"));
    }
    out.push(format!("Caminhões ({} cadastrados)", listing.count()));
    match listing.render() {
        ListingRender::Loading => out.push("Carregando...".to_string()),
        ListingRender::Empty => out.push(EMPTY_MESSAGE.to_string()),
        ListingRender::Table(rows) => out.push(format_table(&rows)),
    }
    out.join("\n")
}

pub fn format_catalog(items: &[FipeItem]) -> String {
    let width = items.iter().map(|i| i.code.len()).max().unwrap_or(0);
    items
        .iter()
        .map(|i| format!("{:<width$}  {}", i.code, i.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The form's field errors, one per line.
pub fn format_field_errors(form: &TruckForm) -> String {
    form.field_errors()
        .iter()
        .map(|(field, msg)| format!("  {field:?}: {msg}"))
        .collect::<Vec<_>>()
        .join("\n")
}
