// Entry point and high-level CLI flow.
//
// - Option [1] runs the preparation pipeline (load, cast, canonicalize,
//   spatial join), printing diagnostics.
// - Option [2] generates the dashboard reports and a JSON summary.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
use irve_dashboard::errors::PipelineError;
use irve_dashboard::types::EnrichedStation;
use irve_dashboard::{geo, loader, output, prep, reports, util};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

const STATIONS_CSV: &str = "data/station_electrique.csv";
const DEPARTMENTS_GEOJSON: &str = "data/departements-version-simplifiee.geojson";

// Simple in-memory app state so the pipeline runs once per process but
// reports can be generated multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<EnrichedStation>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn run_pipeline() -> Result<Vec<EnrichedStation>, PipelineError> {
    let (rows, read_errors) = loader::load_raw(Path::new(STATIONS_CSV))?;
    let (records, report) = prep::prepare(rows, read_errors);
    let departments = geo::load_departments(Path::new(DEPARTMENTS_GEOJSON))?;
    let enriched = geo::enrich(&records, &departments);

    println!(
        "Processing snapshot... ({} rows, {} with usable coordinates, {} placed in a department)",
        util::format_int(report.total_rows as i64),
        util::format_int(report.with_coords as i64),
        util::format_int(enriched.len() as i64)
    );
    println!(
        "Note: {} unreadable rows skipped, {} power ratings nulled, {} stations without a commissioning date.",
        util::format_int(report.read_errors as i64),
        util::format_int(report.unparsed_power as i64),
        util::format_int(report.missing_dates as i64)
    );
    println!("");
    Ok(enriched)
}

/// Handle option [1]: run the full preparation pipeline and cache the
/// enriched table.
fn handle_load() {
    match run_pipeline() {
        Ok(enriched) => {
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(enriched);
        }
        Err(e) => {
            eprintln!("Pipeline failed: {}\n", e);
        }
    }
}

/// Handle option [2]: generate all reports and the JSON summary.
///
/// This function is intentionally side-effectful: it writes four CSV files
/// and a JSON summary, and prints Markdown previews to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please run the pipeline first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let quarterly = reports::quarterly_installations(&data);
    let file1 = "report1_quarterly_installations.csv";
    if let Err(e) = output::write_csv(file1, &quarterly) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Quarterly Installations by Power Band\n");
    output::preview_table_rows(&quarterly, 4);
    println!("(Full table exported to {})\n", file1);

    let market = reports::operator_market_share(&data);
    let file2 = "report2_operator_market_share.csv";
    if let Err(e) = output::write_csv(file2, &market) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Operator Market Share (Top 10 + Others)\n");
    output::preview_table_rows(&market, 11);
    println!("(Full table exported to {})\n", file2);

    let departments = reports::department_counts(&data, 20);
    let file3 = "report3_department_density.csv";
    if let Err(e) = output::write_csv(file3, &departments) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Best-Equipped Departments (Top 20)\n");
    output::preview_table_rows(&departments, 5);
    println!("(Full table exported to {})\n", file3);

    // Zoom into the densest department and profile the market leaders.
    if let Some(densest) = departments.first() {
        let top_local = reports::top_operators_in_department(&data, &densest.department, 5);
        println!(
            "Report 4: Top Operators in Department {}\n",
            densest.department
        );
        output::preview_table_rows(&top_local, 5);
    }

    let leaders: Vec<String> = market
        .iter()
        .filter(|row| row.operator != "Others")
        .take(5)
        .map(|row| row.operator.clone())
        .collect();
    let comparison = reports::compare_operators(&data, &leaders);
    let file4 = "report5_operator_comparison.csv";
    if let Err(e) = output::write_csv(file4, &comparison) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 5: Leading Operator Comparison\n");
    output::preview_table_rows(&comparison, 5);
    println!("(Full table exported to {})\n", file4);

    let summary = reports::network_summary(&data);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"stations\": {}, \"charge_points\": {}, \"avg_power_kw\": {}}}\n",
        util::format_int(summary.stations as i64),
        util::format_int(summary.charge_points as i64),
        util::format_number(summary.avg_power_kw, 2)
    );
}

fn main() {
    loop {
        println!("IRVE Charging-Station Analytics");
        println!("[1] Run preparation pipeline");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
