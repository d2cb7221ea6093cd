//! Seeded FIPE reference table.
//!
//! Prices are stored the way the FIPE API reports them (`"R$ 243.652,00"`)
//! and converted to plain decimal strings when a truck is saved.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LEADING_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})").expect("year pattern is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// `{code, name}` pair as served by the catalog endpoints.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FipeItem {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct Year {
    pub code: String,
    pub name: String,
    pub price: String,
}

#[derive(Clone, Debug)]
pub struct Model {
    pub code: String,
    pub name: String,
    pub years: Vec<Year>,
}

#[derive(Clone, Debug)]
pub struct Brand {
    pub code: String,
    pub name: String,
    pub models: Vec<Model>,
}

#[derive(Debug)]
pub enum Lookup {
    /// The name did not match any entry (client error).
    Missing(String),
    /// A code that the reference table does not know (upstream error).
    Upstream(String),
}

impl Lookup {
    pub fn message(&self) -> &str {
        match self {
            Lookup::Missing(msg) | Lookup::Upstream(msg) => msg,
        }
    }
}

/// A resolved brand/model/year with its price as a decimal string.
#[derive(Debug, PartialEq, Eq)]
pub struct Priced {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: String,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    brands: Vec<Brand>,
}

impl Catalog {
    pub fn new(brands: Vec<Brand>) -> Self {
        Self { brands }
    }

    pub fn brands(&self) -> Vec<FipeItem> {
        self.brands.iter().map(|b| item(&b.code, &b.name)).collect()
    }

    /// `brand` is a code when it is all digits, otherwise a name.
    pub fn models(&self, brand: &str) -> Result<Vec<FipeItem>, Lookup> {
        let brand = self.brand(brand)?;
        Ok(brand.models.iter().map(|m| item(&m.code, &m.name)).collect())
    }

    pub fn years(&self, brand: &str, model: &str) -> Result<Vec<FipeItem>, Lookup> {
        let brand = self.brand(brand)?;
        let model = model_in(brand, model)?;
        Ok(model.years.iter().map(|y| item(&y.code, &y.name)).collect())
    }

    /// Resolve names and year to canonical entries and look up the price.
    pub fn price(&self, brand: &str, model: &str, year: i32) -> Result<Priced, Lookup> {
        let brand = find_by_name(&self.brands, brand, "Marca", |b| &b.name)?;
        let model = find_by_name(&brand.models, model, "Modelo", |m| &m.name)?;
        let entry = model
            .years
            .iter()
            .find(|y| leading_year(&y.name) == Some(year))
            .ok_or_else(|| Lookup::Missing(format!("Ano não encontrado na FIPE: {year}")))?;
        let price = parse_brl_price(&entry.price)
            .ok_or_else(|| Lookup::Upstream(format!("Preço inválido retornado pela FIPE: {}", entry.price)))?;
        Ok(Priced {
            brand: brand.name.clone(),
            model: model.name.clone(),
            year,
            price,
        })
    }

    fn brand(&self, key: &str) -> Result<&Brand, Lookup> {
        if is_code(key) {
            self.brands
                .iter()
                .find(|b| b.code == key)
                .ok_or_else(|| Lookup::Upstream("FIPE retornou 404".to_string()))
        } else {
            find_by_name(&self.brands, key, "Marca", |b| &b.name)
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        seed()
    }
}

fn model_in<'a>(brand: &'a Brand, key: &str) -> Result<&'a Model, Lookup> {
    if is_code(key) {
        brand
            .models
            .iter()
            .find(|m| m.code == key)
            .ok_or_else(|| Lookup::Upstream("FIPE retornou 404".to_string()))
    } else {
        find_by_name(&brand.models, key, "Modelo", |m| &m.name)
    }
}

fn item(code: &str, name: &str) -> FipeItem {
    FipeItem {
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn is_code(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

/// Collapse whitespace runs and lowercase.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").to_lowercase()
}

fn find_by_name<'a, T>(
    items: &'a [T],
    name: &str,
    label: &str,
    name_of: impl Fn(&T) -> &String,
) -> Result<&'a T, Lookup> {
    let wanted = normalize_name(name);
    items
        .iter()
        .find(|i| normalize_name(name_of(i)) == wanted)
        .ok_or_else(|| Lookup::Missing(format!("{label} não encontrado na FIPE: {name}")))
}

pub fn leading_year(label: &str) -> Option<i32> {
    LEADING_YEAR_RE
        .captures(label.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// `"R$ 500.000,00"` → `"500000.00"`.
pub fn parse_brl_price(value: &str) -> Option<String> {
    let digits: String = value
        .replace("R$", "")
        .trim()
        .replace('.', "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!digits.is_empty()).then_some(digits)
}

fn year(code: &str, name: &str, price: &str) -> Year {
    Year {
        code: code.to_string(),
        name: name.to_string(),
        price: price.to_string(),
    }
}

fn model(code: &str, name: &str, years: Vec<Year>) -> Model {
    Model {
        code: code.to_string(),
        name: name.to_string(),
        years,
    }
}

fn brand(code: &str, name: &str, models: Vec<Model>) -> Brand {
    Brand {
        code: code.to_string(),
        name: name.to_string(),
        models,
    }
}

/// A small slice of the trucks table.
pub fn seed() -> Catalog {
    Catalog::new(vec![
        brand(
            "102",
            "AGRALE",
            vec![model(
                "5986",
                "10000 / 10000 S  2p (diesel) (E5)",
                vec![
                    year("2022-3", "2022", "R$ 243.652,00"),
                    year("2021-3", "2021 Diesel", "R$ 231.000,00"),
                ],
            )],
        ),
        brand(
            "59",
            "FORD",
            vec![
                model(
                    "5001",
                    "CARGO 816",
                    vec![
                        year("2020-3", "2020 Diesel", "R$ 180.500,00"),
                        year("2019-3", "2019 Diesel", "R$ 172.300,50"),
                    ],
                ),
                model(
                    "5002",
                    "CARGO 2429",
                    vec![year("2022-3", "2022 Diesel", "R$ 410.000,00")],
                ),
            ],
        ),
        brand(
            "109",
            "MERCEDES-BENZ",
            vec![model(
                "6010",
                "Accelo 1016",
                vec![year("2023-3", "2023 Diesel", "R$ 320.990,00")],
            )],
        ),
    ])
}
