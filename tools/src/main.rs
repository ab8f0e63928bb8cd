//! redline-report: headless runner for the redlining dashboard engine.
//!
//! Usage:
//!   redline-report --data-dir ./data --lender frost
//!   redline-report --data-dir ./data --lender frost --state TX --cbsa "Austin-Round Rock-San Marcos, TX" --year 2024
//!   redline-report --data-dir ./data --ipc-mode
//!   redline-report --prepare raw.json --lender webster --out webster-bank-data.json

use anyhow::Result;
use redline_core::{
    config::DashboardConfig,
    dashboard::Dashboard,
    error::RedlineResult,
    lender::LenderSelection,
    prepare::prepare_records,
    query::{FilterOptions, FilterSpec},
    sort::SortState,
    store,
    types::Year,
    views::{CbsaView, CountyView, StateCard},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    States {
        #[serde(default = "default_lender")]
        lender: String,
    },
    Cbsas {
        #[serde(default = "default_lender")]
        lender: String,
        state: String,
    },
    Counties {
        #[serde(default = "default_lender")]
        lender: String,
        state: String,
        cbsa: String,
        #[serde(default)]
        year: Option<Year>,
        #[serde(default)]
        sort: Option<SortState>,
    },
    Summary {
        #[serde(default)]
        filter: FilterOptions,
    },
    Unique {
        #[serde(default)]
        filter: FilterOptions,
        field: String,
    },
    Aggregate {
        #[serde(default)]
        filter: FilterOptions,
        level: String,
    },
    Quit,
}

fn default_lender() -> String {
    "both".into()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let lender = string_arg(&args, "--lender").unwrap_or("both");
    let state = string_arg(&args, "--state");
    let cbsa = string_arg(&args, "--cbsa");
    let year: Option<Year> = string_arg(&args, "--year").and_then(|y| y.parse().ok());

    let config = match string_arg(&args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::builtin(),
    }
    .with_data_dir(data_dir);

    if let Some(raw_path) = string_arg(&args, "--prepare") {
        let out = string_arg(&args, "--out").unwrap_or("prepared-bank-data.json");
        return run_prepare(&config, raw_path, lender, out);
    }

    let (dashboard, source) = Dashboard::build(config);
    let selection: LenderSelection = lender.parse()?;

    if ipc_mode {
        return run_ipc_loop(&dashboard);
    }

    println!("Redlining dashboard — redline-report");
    println!("  data_dir:  {data_dir}");
    println!("  source:    {source:?}");
    println!("  records:   {}", dashboard.records().len());
    println!("  lender:    {selection}");
    println!();

    match (state, cbsa) {
        (Some(state), Some(cbsa)) => {
            print_county_view(&dashboard, &dashboard.county_view(&selection, state, cbsa, year)?)
        }
        (Some(state), None) => print_cbsa_view(&dashboard.cbsa_view(&selection, state)?),
        _ => print_state_overview(&dashboard.state_overview(&selection)?),
    }
    Ok(())
}

fn run_prepare(config: &DashboardConfig, raw_path: &str, lender: &str, out: &str) -> Result<()> {
    let info = config.lenders.lookup(lender)?;
    let raw = store::read_raw_export(raw_path)?;
    let records = prepare_records(&raw, info, &config.geography);
    store::write_records(out, &records)?;

    println!("=== PREPARE SUMMARY ===");
    println!("  lender:      {}", info.name);
    println!("  raw rows:    {}", raw.len());
    println!("  records:     {}", records.len());
    println!("  written to:  {out}");
    Ok(())
}

fn run_ipc_loop(dashboard: &Dashboard) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match answer(dashboard, cmd) {
            Ok(response) => writeln!(stdout, "{response}")?,
            Err(e) => {
                log::warn!("ipc command failed: {e}");
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn answer(dashboard: &Dashboard, cmd: IpcCommand) -> RedlineResult<serde_json::Value> {
    let value = match cmd {
        IpcCommand::States { lender } => {
            serde_json::to_value(dashboard.state_overview(&lender.parse::<LenderSelection>()?)?)?
        }
        IpcCommand::Cbsas { lender, state } => {
            serde_json::to_value(dashboard.cbsa_view(&lender.parse::<LenderSelection>()?, &state)?)?
        }
        IpcCommand::Counties { lender, state, cbsa, year, sort } => {
            let view = dashboard.county_view(&lender.parse::<LenderSelection>()?, &state, &cbsa, year)?;
            let rows = dashboard.table(&view.rows, sort.unwrap_or_default());
            serde_json::json!({
                "state": view.state,
                "cbsa": view.cbsa,
                "years": view.years,
                "selected_year": view.selected_year,
                "rows": rows,
            })
        }
        IpcCommand::Summary { filter } => {
            serde_json::to_value(dashboard.summary(&FilterSpec::from(filter)))?
        }
        IpcCommand::Unique { filter, field } => {
            serde_json::to_value(dashboard.unique(&FilterSpec::from(filter), &field)?)?
        }
        IpcCommand::Aggregate { filter, level } => {
            serde_json::to_value(dashboard.aggregate(&FilterSpec::from(filter), &level)?)?
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

// ── Printing ─────────────────────────────────────────────────────────────────

fn print_state_overview(cards: &[StateCard]) {
    println!("=== STATES ===");
    if cards.is_empty() {
        println!("  (No data available for the selected filters)");
    }
    for card in cards {
        let avg_ratio = card
            .stats
            .avg_ratio
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "N/A".into());
        println!(
            "  {:<24} loans: {:>8} | avg ratio: {:>5} | underperforming: {:>4} | CBSAs: {}",
            card.state,
            card.stats.total_loans,
            avg_ratio,
            card.stats.underperforming_areas,
            card.cbsa_count
        );
    }
}

fn print_cbsa_view(view: &CbsaView) {
    println!("=== {} — CBSAs ===", view.state);
    if view.cards.is_empty() {
        println!("  (No data available for the selected filters)");
    }
    for card in &view.cards {
        println!("  {:<56} {:>6} records", card.cbsa, card.record_count);
    }
}

fn print_county_view(dashboard: &Dashboard, view: &CountyView) {
    let years: Vec<String> = view.years.iter().map(|y| y.to_string()).collect();
    println!("=== {} — Counties ===", view.cbsa);
    println!("  years: {}", years.join(", "));
    if let Some(year) = view.selected_year {
        println!("  showing: {year}");
    }
    if view.rows.is_empty() {
        println!("  (No data available for the selected filters)");
        return;
    }
    for row in dashboard.table(&view.rows, SortState::default()) {
        println!(
            "  {:<28} {:<28} {} | ratio {:>6} ({}) | gap {:>7} ({}) | loans {}",
            row.record.county,
            row.record.metric,
            row.record.year,
            row.ratio.display(),
            row.ratio.band.label(),
            row.gap.display(),
            row.gap.band.label(),
            row.record.bank_count
        );
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
