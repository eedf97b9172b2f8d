//! Sign-aware stacking of a composition matrix into bar series.
//!
//! Rebate components can push a category below zero. Each component column is
//! split into a non-negative part stacked upwards and a non-positive part
//! stacked downwards, so a relative bar chart shows both without cancelling.

use crate::config::{AGGREGATE_COLOR, FALLBACK_NEGATIVE_COLOR, FINAL_PRICE_LABEL};
use crate::models::{CompositionMatrix, DataPoint, Series, SeriesRole, Sign, StrokeStyle};

/// Split values into `(max(v, 0), min(v, 0))` sequences of the same length.
pub fn split_signed(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    values.iter().map(|v| (v.max(0.0), v.min(0.0))).unzip()
}

/// Build the stacked series for a composition matrix.
///
/// For every component, in declaration order, emits a positive series when
/// the clipped non-negative values sum above zero and a negative series when
/// any clipped non-positive value is non-zero. A trailing
/// [`FINAL_PRICE_LABEL`] marker carries the per-category reconciliation total.
///
/// The output depends only on the matrix, so repeated calls yield identical
/// series in identical order.
pub fn split_signed_series(matrix: &CompositionMatrix) -> Vec<Series> {
    let mut series = Vec::new();

    for &component in &matrix.components {
        let (pos, neg) = split_signed(&matrix.column(component));
        let style = component.style();

        if pos.iter().sum::<f64>() > 0.0 {
            series.push(Series {
                name: format!("{} (+)", component),
                label: component.label().to_string(),
                role: SeriesRole::Component,
                sign: Some(Sign::Positive),
                color: style.positive.to_string(),
                stroke: StrokeStyle::Solid,
                points: points(&matrix.categories, &pos),
            });
        }

        if neg.iter().any(|v| *v != 0.0) {
            series.push(Series {
                name: format!("{} (-)", component),
                label: component.label().to_string(),
                role: SeriesRole::Component,
                sign: Some(Sign::Negative),
                color: style.negative.unwrap_or(FALLBACK_NEGATIVE_COLOR).to_string(),
                stroke: StrokeStyle::Solid,
                points: points(&matrix.categories, &neg),
            });
        }
    }

    series.push(reconciliation_series(matrix));
    series
}

/// Marker series holding the row-wise sum of every component per category.
pub fn reconciliation_series(matrix: &CompositionMatrix) -> Series {
    Series {
        name: FINAL_PRICE_LABEL.to_string(),
        label: FINAL_PRICE_LABEL.to_string(),
        role: SeriesRole::ReconciliationTotal,
        sign: None,
        color: AGGREGATE_COLOR.to_string(),
        stroke: StrokeStyle::Solid,
        points: points(&matrix.categories, &matrix.row_totals()),
    }
}

fn points(categories: &[String], values: &[f64]) -> Vec<DataPoint> {
    categories
        .iter()
        .zip(values)
        .map(|(c, v)| DataPoint::new(c.clone(), *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentLabel;

    fn matrix(cells: Vec<(&str, ComponentLabel, f64)>) -> CompositionMatrix {
        CompositionMatrix::from_cells(
            "XX",
            "2022",
            cells.into_iter().map(|(c, p, v)| (c.to_string(), p, v)),
        )
    }

    #[test]
    fn split_signed_clips_both_ways() {
        let (pos, neg) = split_signed(&[0.3, -0.2, 0.0]);
        assert_eq!(pos, vec![0.3, 0.0, 0.0]);
        assert_eq!(neg, vec![0.0, -0.2, 0.0]);
    }

    #[test]
    fn split_signed_handles_empty_input() {
        let (pos, neg) = split_signed(&[]);
        assert!(pos.is_empty());
        assert!(neg.is_empty());
    }

    #[test]
    fn mixed_column_yields_positive_then_negative() {
        let m = matrix(vec![
            ("Household", ComponentLabel::RenewableTaxes, 0.04),
            ("Industry", ComponentLabel::RenewableTaxes, -0.02),
        ]);
        let series = split_signed_series(&m);
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Renewable taxes (+)", "Renewable taxes (-)", FINAL_PRICE_LABEL]
        );
        assert_eq!(series[0].color, "limegreen");
        assert_eq!(series[1].color, "salmon");
        assert_eq!(series[1].values(), vec![0.0, -0.02]);
    }

    #[test]
    fn single_negative_cell_is_still_rendered() {
        let m = matrix(vec![
            ("A", ComponentLabel::Other, 0.0),
            ("B", ComponentLabel::Other, -0.0001),
        ]);
        let series = split_signed_series(&m);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].sign, Some(Sign::Negative));
    }

    #[test]
    fn all_zero_column_is_skipped() {
        let m = matrix(vec![
            ("A", ComponentLabel::NuclearTaxes, 0.0),
            ("A", ComponentLabel::EnergyAndSupply, 0.1),
        ]);
        let series = split_signed_series(&m);
        assert!(series.iter().all(|s| s.label != "Nuclear taxes"));
    }

    #[test]
    fn negative_without_declared_color_falls_back() {
        let m = matrix(vec![("A", ComponentLabel::EnergyAndSupply, -0.1)]);
        let series = split_signed_series(&m);
        assert_eq!(series[0].color, FALLBACK_NEGATIVE_COLOR);
    }

    #[test]
    fn marker_equals_row_sums() {
        let m = matrix(vec![
            ("A", ComponentLabel::EnergyAndSupply, 0.2),
            ("A", ComponentLabel::OtherAllowance, -0.05),
            ("B", ComponentLabel::NetworkCosts, 0.07),
        ]);
        let series = split_signed_series(&m);
        let marker = series.last().unwrap();
        assert_eq!(marker.role, SeriesRole::ReconciliationTotal);
        assert!((marker.points[0].y - 0.15).abs() < 1e-12);
        assert!((marker.points[1].y - 0.07).abs() < 1e-12);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let m = matrix(vec![
            ("A", ComponentLabel::Vat, 0.05),
            ("B", ComponentLabel::EnvironmentalTaxesAllowance, -0.01),
            ("A", ComponentLabel::NetworkCosts, 0.06),
        ]);
        assert_eq!(split_signed_series(&m), split_signed_series(&m));
    }
}
