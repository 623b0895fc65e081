//! Per-product aggregation.
//!
//! Averages follow the run's `AveragePolicy`:
//!
//! ```text
//! weighted:  price  = Σrevenue / Σunits
//!            margin = (Σrevenue − Σcost) / Σrevenue
//! simple:    price  = mean(revenue_i / units_i)
//!            margin = mean((revenue_i − cost_i) / revenue_i)
//! ```
//!
//! Missing amounts are skipped. A zero denominator makes that product's metric
//! not computable (`None`); it never aborts the rest of the table.

use std::collections::BTreeMap;

use crate::domain::{AveragePolicy, ProductAnnotation, ProductMetric, SalesRecord};

/// Group records by product (ascending product order) and compute metrics.
///
/// Records with an empty product name are left out of the table.
pub fn aggregate_products(records: &[&SalesRecord], policy: AveragePolicy) -> Vec<ProductMetric> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    // Rows without a product name have no group; they still count in the monthly series.
    for r in records.iter().filter(|r| !r.product.is_empty()) {
        groups.entry(r.product.as_str()).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|(product, acc)| {
            let (average_unit_price, average_margin) = match policy {
                AveragePolicy::Weighted => (acc.weighted_price(), acc.weighted_margin()),
                AveragePolicy::Simple => (acc.price_ratios.mean(), acc.margin_ratios.mean()),
            };
            ProductMetric {
                product: product.to_string(),
                average_unit_price,
                average_margin,
                total_units_sold: acc.units.sum,
            }
        })
        .collect()
}

/// The values a chart callout shows for each product.
pub fn annotations(metrics: &[ProductMetric]) -> Vec<ProductAnnotation> {
    metrics
        .iter()
        .map(|m| ProductAnnotation {
            product: m.product.clone(),
            average_unit_price: m.average_unit_price,
            average_margin: m.average_margin,
        })
        .collect()
}

#[derive(Debug, Default)]
struct Accumulator {
    units: Sum,
    revenue: Sum,
    cost: Sum,
    price_ratios: RatioMean,
    margin_ratios: RatioMean,
}

impl Accumulator {
    fn push(&mut self, r: &SalesRecord) {
        self.units.add(r.units_sold);
        self.revenue.add(r.revenue);
        self.cost.add(r.cost);

        if let (Some(revenue), Some(units)) = (r.revenue, r.units_sold) {
            self.price_ratios.add(revenue, units);
        }
        if let (Some(revenue), Some(cost)) = (r.revenue, r.cost) {
            self.margin_ratios.add(revenue - cost, revenue);
        }
    }

    fn weighted_price(&self) -> Option<f64> {
        ratio(self.revenue.value()?, self.units.value()?)
    }

    fn weighted_margin(&self) -> Option<f64> {
        let revenue = self.revenue.value()?;
        ratio(revenue - self.cost.value()?, revenue)
    }
}

/// Sum over present values only.
#[derive(Debug, Default)]
struct Sum {
    sum: f64,
    count: usize,
}

impl Sum {
    fn add(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }
}

/// Mean of per-row ratios; a single zero denominator poisons the mean.
#[derive(Debug, Default)]
struct RatioMean {
    sum: f64,
    count: usize,
    zero_denominator: bool,
}

impl RatioMean {
    fn add(&mut self, numerator: f64, denominator: f64) {
        match ratio(numerator, denominator) {
            Some(v) => {
                self.sum += v;
                self.count += 1;
            }
            None => self.zero_denominator = true,
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.zero_denominator || self.count == 0 {
            return None;
        }
        let m = self.sum / self.count as f64;
        m.is_finite().then_some(m)
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let v = numerator / denominator;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product: &str, units: Option<f64>, revenue: Option<f64>, cost: Option<f64>) -> SalesRecord {
        SalesRecord {
            line: 2,
            branch: "A".to_string(),
            product: product.to_string(),
            year: 2023,
            month: 1,
            units_sold: units,
            revenue,
            cost,
        }
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn weighted_metrics_use_group_sums() {
        let rows = vec![
            record("X", Some(10.0), Some(100.0), Some(60.0)),
            record("X", Some(20.0), Some(180.0), Some(100.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let m = aggregate_products(&refs, AveragePolicy::Weighted);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].total_units_sold, 30.0);
        assert!(approx(m[0].average_unit_price, 280.0 / 30.0));
        assert!(approx(m[0].average_margin, 120.0 / 280.0));
    }

    #[test]
    fn simple_metrics_average_row_ratios() {
        let rows = vec![
            record("X", Some(10.0), Some(100.0), Some(60.0)),
            record("X", Some(20.0), Some(180.0), Some(100.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let m = aggregate_products(&refs, AveragePolicy::Simple);
        assert!(approx(m[0].average_unit_price, (10.0 + 9.0) / 2.0));
        assert!(approx(m[0].average_margin, (0.4 + 80.0 / 180.0) / 2.0));
    }

    #[test]
    fn zero_units_is_not_computable_and_does_not_affect_other_products() {
        let rows = vec![
            record("X", Some(0.0), Some(100.0), Some(60.0)),
            record("Y", Some(5.0), Some(50.0), Some(25.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        for policy in [AveragePolicy::Weighted, AveragePolicy::Simple] {
            let m = aggregate_products(&refs, policy);
            assert_eq!(m[0].product, "X");
            assert_eq!(m[0].average_unit_price, None);
            assert!(approx(m[0].average_margin, 0.4));
            assert!(approx(m[1].average_unit_price, 10.0));
            assert!(approx(m[1].average_margin, 0.5));
        }
    }

    #[test]
    fn zero_revenue_makes_margin_not_computable() {
        let rows = vec![record("X", Some(3.0), Some(0.0), Some(10.0))];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let m = aggregate_products(&refs, AveragePolicy::Weighted);
        assert_eq!(m[0].average_margin, None);
        assert!(approx(m[0].average_unit_price, 0.0));
    }

    #[test]
    fn missing_amounts_are_skipped_not_zeroed() {
        let rows = vec![
            record("X", Some(10.0), Some(100.0), Some(60.0)),
            record("X", None, Some(50.0), None),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let w = aggregate_products(&refs, AveragePolicy::Weighted);
        assert_eq!(w[0].total_units_sold, 10.0);
        assert!(approx(w[0].average_unit_price, 150.0 / 10.0));
        assert!(approx(w[0].average_margin, (150.0 - 60.0) / 150.0));

        let s = aggregate_products(&refs, AveragePolicy::Simple);
        assert!(approx(s[0].average_unit_price, 10.0));
        assert!(approx(s[0].average_margin, 0.4));
    }

    #[test]
    fn products_are_sorted_and_annotated() {
        let rows = vec![
            record("b", Some(1.0), Some(2.0), Some(1.0)),
            record("a", Some(1.0), Some(4.0), Some(1.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let m = aggregate_products(&refs, AveragePolicy::Weighted);
        let names: Vec<&str> = m.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let notes = annotations(&m);
        assert_eq!(notes[0].product, "a");
        assert!(approx(notes[0].average_unit_price, 4.0));
        assert!(approx(notes[0].average_margin, 0.75));
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(aggregate_products(&[], AveragePolicy::Weighted).is_empty());
    }

    #[test]
    fn blank_product_rows_are_not_grouped() {
        let rows = vec![
            record("X", Some(10.0), Some(100.0), Some(60.0)),
            record("", Some(5.0), Some(50.0), Some(20.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let m = aggregate_products(&refs, AveragePolicy::Weighted);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].product, "X");
        assert_eq!(m[0].total_units_sold, 10.0);
    }
}
