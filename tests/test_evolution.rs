//! Evolution integration tests: component time series per country/category.

mod common;

use tariff_explorer::config::SINGLE_COMPONENTS;
use tariff_explorer::models::{ChartKind, ComponentLabel, MismatchKind, SeriesRole, StrokeStyle};
use tariff_explorer::TariffError;

// ---------------------------------------------------------------------------
// assemble_timeseries
// ---------------------------------------------------------------------------

#[test]
fn one_line_per_observed_component_plus_dashed_aggregate() {
    let explorer = common::setup_explorer();
    let series = explorer
        .evolution()
        .assemble_timeseries("DE", "Household", &SINGLE_COMPONENTS, &["2021", "2022"])
        .unwrap();

    let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Network costs",
            "Energy and supply",
            "Environmental taxes",
            "Renewable taxes",
            "Value added tax (VAT)",
            "Taxes, fees, levies and charges",
        ]
    );

    let aggregate = series.last().unwrap();
    assert_eq!(aggregate.role, SeriesRole::Aggregate);
    assert_eq!(aggregate.stroke, StrokeStyle::Dashed);
    assert_eq!(aggregate.color, "black");
    assert!(series[..series.len() - 1]
        .iter()
        .all(|s| s.stroke == StrokeStyle::Solid));
}

#[test]
fn points_follow_requested_years_in_order() {
    let explorer = common::setup_explorer();
    let series = explorer
        .evolution()
        .assemble_timeseries(
            "DE",
            "Household",
            &[ComponentLabel::EnergyAndSupply],
            &["2022", "2021"],
        )
        .unwrap();

    let energy = &series[0];
    let years: Vec<&str> = energy.points.iter().map(|p| p.x.as_str()).collect();
    assert_eq!(years, vec!["2021", "2022"]);
    assert_eq!(energy.values(), vec![0.15, 0.20]);
}

#[test]
fn missing_years_leave_gaps_instead_of_zeros() {
    let explorer = common::setup_explorer();
    let series = explorer
        .evolution()
        .assemble_timeseries(
            "DE",
            "Household",
            &[ComponentLabel::OtherAllowance],
            &["2021", "2022"],
        )
        .unwrap();

    let allowance = &series[0];
    assert_eq!(allowance.points.len(), 1);
    assert_eq!(allowance.points[0].x, "2022");
}

#[test]
fn unobserved_components_are_skipped() {
    let explorer = common::setup_explorer();
    let series = explorer
        .evolution()
        .assemble_timeseries(
            "AT",
            "Household",
            &[ComponentLabel::NuclearTaxes, ComponentLabel::NetworkCosts],
            &["2021"],
        )
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].label, "Network costs");
}

#[test]
fn invalid_selection_is_rejected() {
    let explorer = common::setup_explorer();
    let evolution = explorer.evolution();

    assert!(matches!(
        evolution
            .assemble_timeseries("DE", "Household", &SINGLE_COMPONENTS, &[])
            .unwrap_err(),
        TariffError::InvalidArgument(_)
    ));
    assert!(matches!(
        evolution
            .assemble_timeseries("DE", "Band XY", &SINGLE_COMPONENTS, &["2022"])
            .unwrap_err(),
        TariffError::UnknownCategory(_)
    ));
    assert!(matches!(
        evolution
            .assemble_timeseries("DE", "Household", &SINGLE_COMPONENTS, &["2022", "2031"])
            .unwrap_err(),
        TariffError::UnknownPeriod(ref y) if y == "2031"
    ));
}

#[test]
fn known_country_and_category_without_shared_rows_is_missing_data() {
    let explorer = common::setup_explorer();
    let err = explorer
        .evolution()
        .assemble_timeseries("FR", "Household", &SINGLE_COMPONENTS, &["2021"])
        .unwrap_err();
    assert!(matches!(err, TariffError::MissingData(_)));
}

// ---------------------------------------------------------------------------
// evolution_chart
// ---------------------------------------------------------------------------

#[test]
fn chart_covers_every_year_and_flags_tax_mismatch() {
    let explorer = common::setup_explorer();
    let chart = explorer
        .evolution()
        .evolution_chart("DE", "Household")
        .unwrap();

    assert_eq!(chart.kind, ChartKind::Line);
    assert_eq!(chart.series.len(), 6);
    assert_eq!(chart.warnings.len(), 1);
    assert_eq!(chart.warnings[0].kind, MismatchKind::TaxAggregate);
    assert_eq!(chart.warnings[0].key, "2021");
    assert_eq!(chart.metadata.legend_title.as_deref(), Some("Component"));
    assert_eq!(
        chart.metadata.title,
        "Electricity tariff evolution by component in DE for Household"
    );
}

#[test]
fn chart_without_aggregate_has_no_dashed_line() {
    let explorer = common::setup_explorer();
    let chart = explorer
        .evolution()
        .evolution_chart("AT", "Household")
        .unwrap();

    assert_eq!(chart.series.len(), 2);
    assert!(chart.series.iter().all(|s| s.role == SeriesRole::Component));
    assert!(!chart.has_warnings());
}

#[test]
fn chart_for_unobserved_pair_is_missing_data() {
    let explorer = common::setup_explorer();
    let err = explorer
        .evolution()
        .evolution_chart("AT", "Small firms")
        .unwrap_err();
    assert!(matches!(err, TariffError::MissingData(_)));
}
