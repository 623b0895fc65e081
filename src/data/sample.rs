//! Synthetic sales data in the input CSV schema.
//!
//! Every branch sells every product in every month. Each product has a base
//! volume, unit price and margin; volume grows linearly over time with
//! multiplicative noise, so the generated file has a visible trend.

use std::io::Write;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;

use crate::error::AppError;

const BRANCH_NAMES: [&str; 5] = ["Centro", "Norte", "Sur", "Este", "Oeste"];
const PRODUCT_NAMES: [&str; 6] = ["Pan", "Leche", "Cafe", "Yerba", "Azucar", "Aceite"];

/// Relative noise applied to monthly volume.
const VOLUME_NOISE: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub branches: usize,
    pub products: usize,
    pub months: usize,
    pub start_year: i32,
    pub start_month: u32,
    /// Monthly growth of base volume (0.02 = +2% of the base per month).
    pub growth: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            branches: 3,
            products: 4,
            months: 12,
            start_year: 2023,
            start_month: 1,
            growth: 0.02,
            seed: 42,
        }
    }
}

/// One generated CSV row, serialized with the input column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    #[serde(rename = "Sucursal")]
    pub branch: String,
    #[serde(rename = "Producto")]
    pub product: String,
    #[serde(rename = "Año")]
    pub year: i32,
    #[serde(rename = "Mes")]
    pub month: u32,
    #[serde(rename = "Unidades_vendidas")]
    pub units_sold: u64,
    #[serde(rename = "Ingreso_total")]
    pub revenue: f64,
    #[serde(rename = "Costo_total")]
    pub cost: f64,
}

struct ProductProfile {
    name: String,
    base_units: f64,
    unit_price: f64,
    margin: f64,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleRow>, AppError> {
    if config.branches == 0 || config.products == 0 || config.months == 0 {
        return Err(AppError::input("Sample branches, products and months must be > 0."));
    }
    let start = NaiveDate::from_ymd_opt(config.start_year, config.start_month, 1).ok_or_else(|| {
        AppError::input(format!(
            "Invalid sample start month {}-{}.",
            config.start_year, config.start_month
        ))
    })?;
    if !config.growth.is_finite() {
        return Err(AppError::input("Sample growth must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, VOLUME_NOISE)
        .map_err(|e| AppError::input(format!("Noise distribution error: {e}")))?;

    let branches: Vec<String> = (0..config.branches).map(|i| pick_name(&BRANCH_NAMES, "Sucursal", i)).collect();
    let branch_scale: Vec<f64> = branches.iter().map(|_| rng.gen_range(0.6..=1.4)).collect();
    let products: Vec<ProductProfile> = (0..config.products)
        .map(|i| ProductProfile {
            name: pick_name(&PRODUCT_NAMES, "Producto", i),
            base_units: rng.gen_range(20.0..=200.0),
            unit_price: rng.gen_range(1.0..=50.0),
            margin: rng.gen_range(0.1..=0.45),
        })
        .collect();

    let mut rows = Vec::with_capacity(config.branches * config.products * config.months);
    for m in 0..config.months {
        let date = add_months(start, m)
            .ok_or_else(|| AppError::input("Sample period runs past the supported calendar range."))?;
        let growth = (1.0 + config.growth * m as f64).max(0.0);

        for (branch, scale) in branches.iter().zip(&branch_scale) {
            for p in &products {
                let noise: f64 = normal.sample(&mut rng);
                let units = (p.base_units * scale * growth * (1.0 + noise)).round().max(0.0) as u64;
                let revenue = round_cents(units as f64 * p.unit_price);
                let cost = round_cents(revenue * (1.0 - p.margin));
                rows.push(SampleRow {
                    branch: branch.clone(),
                    product: p.name.clone(),
                    year: date.year(),
                    month: date.month(),
                    units_sold: units,
                    revenue,
                    cost,
                });
            }
        }
    }

    Ok(rows)
}

/// Write rows as CSV (header included).
pub fn write_sample_csv<W: Write>(writer: W, rows: &[SampleRow]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write sample row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::io(format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn pick_name(pool: &[&str], prefix: &str, i: usize) -> String {
    pool.get(i)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{prefix} {}", i + 1))
}

fn add_months(start: NaiveDate, months: usize) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    start.checked_add_months(chrono::Months::new(months))
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
