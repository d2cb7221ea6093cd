//! Catalog-backed field values and their reconciliation.
//!
//! A brand, model or year field either holds nothing, free text that has not
//! been matched against a catalog yet, or a catalog entry. Free text comes
//! from prefilling an edit form with the names stored on the truck; a
//! catalog entry comes from the user picking an option or from reconciling
//! the free text once the catalog has loaded.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::FipeItem;

static LEADING_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})").expect("year pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Unresolved(String),
    Resolved { code: String, name: String },
}

impl Selection {
    /// Free text; an empty string yields `Empty`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Selection::Empty
        } else {
            Selection::Unresolved(value)
        }
    }

    pub fn from_item(item: &FipeItem) -> Self {
        Selection::Resolved {
            code: item.code.clone(),
            name: item.name.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Selection::Resolved { .. })
    }

    /// Value sent to the catalog endpoints: the code when known, else the text.
    pub fn lookup_key(&self) -> &str {
        match self {
            Selection::Empty => "",
            Selection::Unresolved(text) => text,
            Selection::Resolved { code, .. } => code,
        }
    }

    /// Value sent on submit: the catalog name when known, else the text.
    pub fn display_name(&self) -> &str {
        match self {
            Selection::Empty => "",
            Selection::Unresolved(text) => text,
            Selection::Resolved { name, .. } => name,
        }
    }
}

/// Leading four-digit year of a catalog label such as `"2024 Gasolina"`.
pub fn parse_year_from_label(label: &str) -> Option<i32> {
    LEADING_YEAR_RE
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
}

/// Match free text against a catalog by case-insensitive name.
pub fn reconcile_by_name(catalog: &[FipeItem], current: &Selection) -> Selection {
    let Selection::Unresolved(text) = current else {
        return current.clone();
    };
    let wanted = text.to_lowercase();
    catalog
        .iter()
        .find(|item| item.name.to_lowercase() == wanted)
        .map(Selection::from_item)
        .unwrap_or_else(|| current.clone())
}

/// Match a free-text year (e.g. `"2022"`) against the leading year of each
/// catalog label.
pub fn reconcile_year(catalog: &[FipeItem], current: &Selection) -> Selection {
    let Selection::Unresolved(text) = current else {
        return current.clone();
    };
    let Ok(wanted) = text.trim().parse::<i32>() else {
        return current.clone();
    };
    catalog
        .iter()
        .find(|item| parse_year_from_label(&item.name) == Some(wanted))
        .map(Selection::from_item)
        .unwrap_or_else(|| current.clone())
}

/// Integer year for submission: leading year of the resolved label, then of
/// the raw text, then the raw text parsed as a whole number.
pub fn resolve_year(selection: &Selection) -> Option<i32> {
    match selection {
        Selection::Empty => None,
        Selection::Resolved { code, name } => {
            parse_year_from_label(name).or_else(|| code.trim().parse().ok())
        }
        Selection::Unresolved(text) => {
            parse_year_from_label(text).or_else(|| text.trim().parse().ok())
        }
    }
}

/// Find a catalog entry by code or by case-insensitive name.
pub fn find_item<'a>(catalog: &'a [FipeItem], wanted: &str) -> Option<&'a FipeItem> {
    let lowered = wanted.trim().to_lowercase();
    catalog
        .iter()
        .find(|item| item.code == wanted.trim())
        .or_else(|| catalog.iter().find(|item| item.name.to_lowercase() == lowered))
}
