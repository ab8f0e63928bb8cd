use redline_core::{
    classify::SeverityBand,
    config::DashboardConfig,
    dashboard::Dashboard,
    error::RedlineError,
    lender::LenderSelection,
    palette::{BLACK, WHITE},
    query::FilterSpec,
    record::LendingRecord,
    sort::{sort_records, SortColumn, SortDirection, SortState},
    store::RecordStore,
    views::classify_row,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Row {
    bank: &'static str,
    state: &'static str,
    cbsa: &'static str,
    county: &'static str,
    year: i32,
    ratio: Option<f64>,
    gap: Option<f64>,
    count: u64,
}

fn record(r: Row) -> LendingRecord {
    LendingRecord {
        bank: r.bank.into(),
        lei: "LEI".into(),
        state: r.state.into(),
        cbsa: r.cbsa.into(),
        county: r.county.into(),
        year: r.year,
        metric: "LMI Borrower".into(),
        loan_purpose: "Home Purchase".into(),
        kind: "Originations".into(),
        bank_count: r.count,
        bank_share: None,
        peer_share: None,
        gap: r.gap,
        ratio: r.ratio,
        cbsa_app_percent_bucket: None,
        avg_loan_amount: None,
        shortfall: None,
        damages: None,
    }
}

fn dashboard() -> Dashboard {
    let rows = vec![
        Row { bank: "Frost Bank", state: "TX", cbsa: "Austin", county: "Travis", year: 2022, ratio: Some(1.2), gap: Some(-1.0), count: 10 },
        Row { bank: "Frost Bank", state: "TX", cbsa: "Austin", county: "Hays", year: 2024, ratio: Some(2.5), gap: Some(-6.0), count: 5 },
        Row { bank: "Frost Bank", state: "TX", cbsa: "Houston", county: "Harris", year: 2023, ratio: None, gap: None, count: 8 },
        Row { bank: "Webster Bank", state: "CT", cbsa: "New Haven, CT", county: "New Haven County", year: 2024, ratio: Some(0.8), gap: Some(3.0), count: 20 },
        Row { bank: "Webster Bank", state: "NY", cbsa: "New York", county: "Kings", year: 2023, ratio: Some(3.4), gap: Some(-12.0), count: 2 },
    ];
    let store = RecordStore::from_records(rows.into_iter().map(record).collect());
    Dashboard::new(store, DashboardConfig::builtin())
}

fn dashboard_of(rows: Vec<Row>) -> Dashboard {
    let store = RecordStore::from_records(rows.into_iter().map(record).collect());
    Dashboard::new(store, DashboardConfig::builtin())
}

fn frost() -> LenderSelection {
    LenderSelection::One("frost".into())
}

// ── State overview ───────────────────────────────────────────────────────────

#[test]
fn state_overview_is_scoped_to_the_lender() {
    let cards = dashboard().state_overview(&frost()).unwrap();
    assert_eq!(cards.len(), 1);
    let tx = &cards[0];
    assert_eq!(tx.state, "TX");
    assert_eq!(tx.stats.total_loans, 23);
    assert_eq!(tx.stats.underperforming_areas, 1);
    assert_eq!(tx.stats.total_records, 3);
    assert_eq!(tx.cbsa_count, 2);
}

#[test]
fn both_lenders_see_every_state_in_first_seen_order() {
    let cards = dashboard().state_overview(&LenderSelection::Both).unwrap();
    let states: Vec<&str> = cards.iter().map(|c| c.state.as_str()).collect();
    assert_eq!(states, vec!["TX", "CT", "NY"]);
}

#[test]
fn unknown_lender_is_reported() {
    assert!(dashboard().state_overview(&LenderSelection::One("chase".into())).is_err());
}

// ── CBSA / county views ──────────────────────────────────────────────────────

#[test]
fn cbsa_view_lists_cards_with_record_counts() {
    let view = dashboard().cbsa_view(&frost(), "TX").unwrap();
    let cards: Vec<(&str, usize)> = view.cards.iter().map(|c| (c.cbsa.as_str(), c.record_count)).collect();
    assert_eq!(cards, vec![("Austin", 2), ("Houston", 1)]);
    assert_eq!(view.rows.len(), 3);
}

#[test]
fn cbsa_view_for_a_state_the_lender_does_not_serve_is_empty() {
    let view = dashboard().cbsa_view(&frost(), "CT").unwrap();
    assert!(view.cards.is_empty());
    assert!(view.rows.is_empty());
}

#[test]
fn county_view_keeps_all_years_when_one_is_selected() {
    let d = dashboard();
    let all = d.county_view(&frost(), "TX", "Austin", None).unwrap();
    assert_eq!(all.years, vec![2022, 2024]);
    assert_eq!(all.rows.len(), 2);

    let only_2024 = d.county_view(&frost(), "TX", "Austin", Some(2024)).unwrap();
    assert_eq!(only_2024.years, vec![2022, 2024]);
    assert_eq!(only_2024.rows.len(), 1);
    assert_eq!(only_2024.rows[0].county, "Hays");
}

// ── Empty geography names ────────────────────────────────────────────────────

#[test]
fn empty_state_name_is_its_own_card() {
    let d = dashboard_of(vec![
        Row { bank: "Frost Bank", state: "TX", cbsa: "Austin", county: "Travis", year: 2024, ratio: Some(1.2), gap: Some(-1.0), count: 10 },
        Row { bank: "Frost Bank", state: "", cbsa: "", county: "", year: 2024, ratio: None, gap: None, count: 1 },
    ]);
    let cards = d.state_overview(&frost()).unwrap();
    assert_eq!(cards.len(), 2);
    let blank = cards.iter().find(|c| c.state.is_empty()).unwrap();
    assert_eq!(blank.stats.total_loans, 1);
    assert_eq!(blank.stats.total_records, 1);
    assert_eq!(cards[0].stats.total_loans, 10);
}

#[test]
fn non_metro_rows_stay_out_of_other_cbsas() {
    let d = dashboard_of(vec![
        Row { bank: "Frost Bank", state: "TX", cbsa: "Austin", county: "Travis", year: 2023, ratio: Some(1.2), gap: Some(-1.0), count: 10 },
        Row { bank: "Frost Bank", state: "TX", cbsa: "", county: "Llano", year: 2024, ratio: Some(0.9), gap: Some(1.0), count: 3 },
    ]);

    let non_metro = d.county_view(&frost(), "TX", "", None).unwrap();
    assert_eq!(non_metro.rows.len(), 1);
    assert_eq!(non_metro.rows[0].county, "Llano");
    assert_eq!(non_metro.years, vec![2024]);

    let view = d.cbsa_view(&frost(), "TX").unwrap();
    let cards: Vec<(&str, usize)> = view.cards.iter().map(|c| (c.cbsa.as_str(), c.record_count)).collect();
    assert_eq!(cards, vec![("Austin", 1), ("", 1)]);

    assert!(d.cbsa_view(&frost(), "").unwrap().rows.is_empty());
}

// ── Geography summaries ──────────────────────────────────────────────────────

#[test]
fn aggregate_summarizes_each_group() {
    let summaries = dashboard().aggregate(&FilterSpec::new().bank("Frost Bank"), "cbsa").unwrap();
    let labels: Vec<&str> = summaries.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["TX-Austin", "TX-Houston"]);
    assert_eq!(summaries[0].stats.total_loans, 15);
    assert_eq!(summaries[0].stats.underperforming_areas, 1);
    assert_eq!(summaries[1].stats.avg_ratio, None);
}

#[test]
fn aggregate_rejects_an_unknown_level() {
    let err = dashboard().aggregate(&FilterSpec::new(), "zip").unwrap_err();
    assert!(matches!(err, RedlineError::UnknownGeoLevel { ref level } if level == "zip"), "{err}");
}

// ── Table rows ───────────────────────────────────────────────────────────────

#[test]
fn gap_cells_use_the_gap_scale() {
    let d = dashboard();
    let rows = d.table(d.records(), SortState::default());
    let kings = rows.iter().find(|r| r.record.county == "Kings").unwrap();
    assert_eq!(kings.ratio.band, SeverityBand::Severe);
    assert_eq!(kings.gap.band, SeverityBand::SevereNegative);
    assert_eq!(kings.gap.text, WHITE);
}

#[test]
fn missing_values_render_as_na_on_white() {
    let d = dashboard();
    let harris = d.records().iter().find(|r| r.county == "Harris").unwrap();
    let row = classify_row(harris, &d.config().palette);
    assert_eq!(row.ratio.band, SeverityBand::NoData);
    assert_eq!(row.ratio.display(), "N/A");
    assert_eq!(row.ratio.background, WHITE);
    assert_eq!(row.ratio.text, BLACK);
}

#[test]
fn values_display_with_two_decimals() {
    let d = dashboard();
    let travis = d.records().iter().find(|r| r.county == "Travis").unwrap();
    let row = classify_row(travis, &d.config().palette);
    assert_eq!(row.ratio.display(), "1.20");
    assert_eq!(row.gap.display(), "-1.00");
    assert_eq!(row.gap.band, SeverityBand::MinorNegative);
}

// ── Sorting ──────────────────────────────────────────────────────────────────

#[test]
fn nulls_sort_last_in_both_directions() {
    let d = dashboard();
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let sorted = sort_records(d.records(), SortColumn::Ratio, direction);
        assert_eq!(sorted.last().unwrap().county, "Harris", "{direction:?}");
    }
}

#[test]
fn numeric_columns_sort_numerically() {
    let d = dashboard();
    let asc: Vec<Option<f64>> = sort_records(d.records(), SortColumn::Gap, SortDirection::Asc)
        .iter()
        .map(|r| r.gap)
        .collect();
    assert_eq!(asc, vec![Some(-12.0), Some(-6.0), Some(-1.0), Some(3.0), None]);

    let desc: Vec<Option<f64>> = sort_records(d.records(), SortColumn::Gap, SortDirection::Desc)
        .iter()
        .map(|r| r.gap)
        .collect();
    assert_eq!(desc, vec![Some(3.0), Some(-1.0), Some(-6.0), Some(-12.0), None]);
}

#[test]
fn text_columns_sort_and_ties_keep_input_order() {
    let d = dashboard();
    let by_state: Vec<&str> = sort_records(d.records(), SortColumn::State, SortDirection::Asc)
        .iter()
        .map(|r| r.county.as_str())
        .map(|c| match c {
            "Travis" | "Hays" | "Harris" => "TX",
            "New Haven County" => "CT",
            _ => "NY",
        })
        .collect();
    assert_eq!(by_state, vec!["CT", "NY", "TX", "TX", "TX"]);

    let tx_order: Vec<String> = sort_records(d.records(), SortColumn::State, SortDirection::Asc)
        .into_iter()
        .filter(|r| r.state == "TX")
        .map(|r| r.county)
        .collect();
    assert_eq!(tx_order, vec!["Travis", "Hays", "Harris"]);
}

#[test]
fn header_toggle_semantics() {
    let state = SortState::default();
    assert_eq!(state.column, SortColumn::County);
    assert_eq!(state.direction, SortDirection::Asc);

    let flipped = state.toggle(SortColumn::County);
    assert_eq!(flipped.direction, SortDirection::Desc);

    let other = flipped.toggle(SortColumn::Ratio);
    assert_eq!(other.column, SortColumn::Ratio);
    assert_eq!(other.direction, SortDirection::Asc);
}

#[test]
fn sorting_returns_a_copy() {
    let d = dashboard();
    let before: Vec<String> = d.records().iter().map(|r| r.county.clone()).collect();
    let _ = sort_records(d.records(), SortColumn::County, SortDirection::Desc);
    let after: Vec<String> = d.records().iter().map(|r| r.county.clone()).collect();
    assert_eq!(before, after);
}
