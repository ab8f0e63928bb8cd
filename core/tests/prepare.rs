use redline_core::{
    lender::LenderDirectory,
    prepare::{prepare_records, BankType, GeographyAliases, RawCountRow},
    store,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn raw(
    state: &str,
    cbsa: &str,
    county: &str,
    metric: &str,
    bank_type: BankType,
    count: u64,
) -> RawCountRow {
    let (bank_count, peer_count) = match bank_type {
        BankType::Subject => (Some(count), None),
        BankType::Peer => (None, Some(count)),
    };
    RawCountRow {
        state: state.into(),
        cbsa: cbsa.into(),
        county: county.into(),
        year: 2024,
        metric: metric.into(),
        loan_purpose: "Home Purchase".into(),
        kind: "Originations".into(),
        bank_type,
        bank_count,
        peer_count,
        avg_loan_amount: None,
    }
}

fn approx(a: Option<f64>, b: f64) -> bool {
    matches!(a, Some(a) if (a - b).abs() < 1e-9)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn shares_gap_and_ratio_are_derived_from_group_totals() {
    let lenders = LenderDirectory::builtin();
    let webster = lenders.lookup("webster").unwrap();
    let rows = vec![
        raw("Rhode Island", "Providence", "Kent County", "LMI Borrower", BankType::Subject, 25),
        raw("Rhode Island", "Providence", "Kent County", "High Income", BankType::Subject, 75),
        raw("Rhode Island", "Providence", "Kent County", "LMI Borrower", BankType::Peer, 400),
        raw("Rhode Island", "Providence", "Kent County", "High Income", BankType::Peer, 600),
    ];

    let out = prepare_records(&rows, webster, &GeographyAliases::default());
    assert_eq!(out.len(), 2);

    let lmi = &out[0];
    assert_eq!(lmi.bank, "Webster Bank");
    assert_eq!(lmi.lei, "WV0OVGBTLUP1XIUJE722");
    assert_eq!(lmi.bank_count, 25);
    assert!(approx(lmi.bank_share, 25.0));
    assert!(approx(lmi.peer_share, 40.0));
    assert!(approx(lmi.gap, -15.0));
    assert!(approx(lmi.ratio, 1.6));

    let high = &out[1];
    assert!(approx(high.gap, 15.0));
    assert!(approx(high.ratio, 0.8));
}

#[test]
fn values_are_rounded_to_two_places() {
    let frost = LenderDirectory::builtin().lookup("frost").unwrap().clone();
    let rows = vec![
        raw("Texas", "Austin", "Travis County", "A", BankType::Subject, 1),
        raw("Texas", "Austin", "Travis County", "B", BankType::Subject, 2),
        raw("Texas", "Austin", "Travis County", "A", BankType::Peer, 1),
        raw("Texas", "Austin", "Travis County", "B", BankType::Peer, 1),
    ];
    let out = prepare_records(&rows, &frost, &GeographyAliases::default());
    assert_eq!(out[0].bank_share, Some(33.33));
    assert_eq!(out[0].peer_share, Some(50.0));
    assert_eq!(out[0].gap, Some(-16.67));
    assert_eq!(out[0].ratio, Some(1.5));
}

#[test]
fn missing_peer_side_leaves_peer_values_absent() {
    let frost = LenderDirectory::builtin().lookup("frost").unwrap().clone();
    let rows = vec![raw("Texas", "Austin", "Travis County", "A", BankType::Subject, 4)];
    let out = prepare_records(&rows, &frost, &GeographyAliases::default());
    assert_eq!(out[0].bank_share, Some(100.0));
    assert_eq!(out[0].peer_share, None);
    assert_eq!(out[0].gap, None);
    assert_eq!(out[0].ratio, None);
}

#[test]
fn zero_bank_share_has_gap_but_no_ratio() {
    let frost = LenderDirectory::builtin().lookup("frost").unwrap().clone();
    let rows = vec![
        raw("Texas", "Austin", "Travis County", "A", BankType::Subject, 0),
        raw("Texas", "Austin", "Travis County", "B", BankType::Subject, 5),
        raw("Texas", "Austin", "Travis County", "A", BankType::Peer, 10),
        raw("Texas", "Austin", "Travis County", "B", BankType::Peer, 10),
    ];
    let out = prepare_records(&rows, &frost, &GeographyAliases::default());
    assert_eq!(out[0].bank_share, Some(0.0));
    assert_eq!(out[0].gap, Some(-50.0));
    assert_eq!(out[0].ratio, None);
}

#[test]
fn adverse_rows_carry_shortfall_and_damages() {
    let webster = LenderDirectory::builtin().lookup("webster").unwrap().clone();
    let mut rows = vec![
        raw("Rhode Island", "Providence", "Kent County", "LMI Borrower", BankType::Subject, 25),
        raw("Rhode Island", "Providence", "Kent County", "High Income", BankType::Subject, 75),
        raw("Rhode Island", "Providence", "Kent County", "LMI Borrower", BankType::Peer, 400),
        raw("Rhode Island", "Providence", "Kent County", "High Income", BankType::Peer, 600),
    ];
    rows[0].avg_loan_amount = Some(250_000.0);
    rows[1].avg_loan_amount = Some(310_000.456);

    let out = prepare_records(&rows, &webster, &GeographyAliases::default());

    // gap -15 points of a 100-loan group: 15 loans short.
    let lmi = &out[0];
    assert_eq!(lmi.shortfall, Some(-15.0));
    assert_eq!(lmi.damages, Some(3_750_000.0));
    assert_eq!(lmi.avg_loan_amount, Some(250_000.0));

    let high = &out[1];
    assert_eq!(high.shortfall, None, "bank ahead of peers is not adverse");
    assert_eq!(high.damages, None);
    assert_eq!(high.avg_loan_amount, Some(310_000.46));
}

#[test]
fn shortfall_without_loan_amount_has_no_damages() {
    let frost = LenderDirectory::builtin().lookup("frost").unwrap().clone();
    let rows = vec![
        raw("Texas", "Austin", "Travis County", "A", BankType::Subject, 1),
        raw("Texas", "Austin", "Travis County", "B", BankType::Subject, 3),
        raw("Texas", "Austin", "Travis County", "A", BankType::Peer, 1),
        raw("Texas", "Austin", "Travis County", "B", BankType::Peer, 1),
    ];
    let out = prepare_records(&rows, &frost, &GeographyAliases::default());
    assert_eq!(out[0].gap, Some(-25.0));
    assert_eq!(out[0].shortfall, Some(-1.0));
    assert_eq!(out[0].damages, None);
}

#[test]
fn connecticut_planning_regions_fold_into_counties() {
    let webster = LenderDirectory::builtin().lookup("webster").unwrap().clone();
    let rows = vec![
        raw("Connecticut", "Bridgeport-Stamford-Norwalk, CT", "Western Connecticut Planning Region", "A", BankType::Subject, 3),
        raw("Connecticut", "Bridgeport-Stamford-Danbury, CT", "Fairfield County", "A", BankType::Subject, 1),
        raw("Connecticut", "Bridgeport-Stamford-Danbury, CT", "Fairfield County", "A", BankType::Peer, 8),
        // Same names outside Connecticut stay as they are.
        raw("New York", "New Haven-Milford, CT", "Capitol Planning Region", "A", BankType::Subject, 2),
    ];
    let out = prepare_records(&rows, &webster, &GeographyAliases::builtin());

    assert_eq!(out[0].cbsa, "Bridgeport-Stamford-Danbury, CT");
    assert_eq!(out[0].county, "Fairfield County");
    // Both subject rows now share one group: 3 of 4 loans.
    assert_eq!(out[0].bank_share, Some(75.0));
    assert_eq!(out[1].bank_share, Some(25.0));
    assert_eq!(out[2].cbsa, "New Haven-Milford, CT");
    assert_eq!(out[2].county, "Capitol Planning Region");
}

#[test]
fn camel_case_export_round_trips_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("raw.json");
    std::fs::write(
        &raw_path,
        r#"{"records":[
            {"state":"Texas","cbsa":"Austin","county":"Travis County","year":2023,"metric":"LMI",
             "loanPurpose":"Refinance","kind":"Applications","bankType":"subject","bankCount":9,
             "avgLoanAmount":180000.0},
            {"state":"Texas","cbsa":"Austin","county":"Travis County","year":2023,"metric":"LMI",
             "loanPurpose":"Refinance","kind":"Applications","bankType":"peer","peerCount":90}
        ]}"#,
    )
    .unwrap();

    let rows = store::read_raw_export(&raw_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].loan_purpose, "Refinance");

    let frost = LenderDirectory::builtin().lookup("frost").unwrap().clone();
    let records = prepare_records(&rows, &frost, &GeographyAliases::builtin());
    let out_path = dir.path().join("frost-bank-data.json");
    store::write_records(&out_path, &records).unwrap();

    let loaded = store::RecordStore::open(&out_path).unwrap();
    assert_eq!(loaded.records(), records.as_slice());
    assert_eq!(loaded.records()[0].ratio, Some(1.0));
    assert_eq!(loaded.records()[0].avg_loan_amount, Some(180_000.0));
    assert_eq!(loaded.records()[0].shortfall, None);

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(!written.contains("damages"), "absent estimates are not written");
}
