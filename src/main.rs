// Entry point and interactive CLI flow.
//
// The dataset is loaded and derived once. Every menu action that changes the
// filter selection rebuilds the whole dashboard from scratch.
mod config;
mod error;
mod filters;
mod loader;
mod metrics;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use config::{Args, CityPalette};
use filters::{available_cities, CityFilter, FilterCriteria, MonthRange};
use reports::Dashboard;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use types::Dataset;

const PREVIEW_ROWS: usize = 12;

/// What one run of the program works with: the immutable dataset, the
/// injected palette and the current filter selection.
struct Session {
    dataset: Dataset,
    palette: CityPalette,
    criteria: FilterCriteria,
    out_dir: PathBuf,
}

impl Session {
    fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::build(&self.dataset, &self.criteria)
    }
}

/// Print `label` and read a trimmed line from `input`. `None` once the input
/// is closed or unreadable.
fn prompt(input: &mut impl BufRead, label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            tracing::warn!("could not read input: {e}");
            None
        }
    }
}

fn handle_select_city(session: &mut Session, input: &mut impl BufRead) -> Option<()> {
    let options = available_cities(&session.dataset);
    for (i, city) in options.iter().enumerate() {
        println!("[{}] {}", i + 1, city);
    }
    let choice = prompt(input, "Select city: ")?;
    let picked = choice
        .parse::<usize>()
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| options.get(i));
    match picked {
        Some(city) => {
            session.criteria = FilterCriteria {
                city: CityFilter::parse(city),
                months: session.criteria.months,
            };
            println!("City filter set to {}.\n", session.criteria.city);
        }
        None => println!("Invalid choice. Please enter 1 to {}.\n", options.len()),
    }
    Some(())
}

fn handle_select_months(session: &mut Session, input: &mut impl BufRead) -> Option<()> {
    let start = prompt(input, "First month (1-12): ")?;
    let end = prompt(input, "Last month (1-12): ")?;
    let (Ok(start), Ok(end)) = (start.parse::<u8>(), end.parse::<u8>()) else {
        println!("Invalid month. Please enter a number from 1 to 12.\n");
        return Some(());
    };
    match MonthRange::new(start, end) {
        Ok(months) => {
            session.criteria = FilterCriteria {
                city: session.criteria.city.clone(),
                months,
            };
            println!("Month range set to {}.\n", months);
        }
        Err(e) => println!("{e}\n"),
    }
    Some(())
}

fn handle_export(session: &Session) {
    let dashboard = session.dashboard();
    match output::export(&dashboard, &session.palette, &session.out_dir) {
        Ok(paths) => {
            for p in paths {
                println!("Saved {}", p.display());
            }
            println!();
        }
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

/// Show the menu until the user exits or the input is closed.
fn run_menu(session: &mut Session, input: &mut impl BufRead) {
    loop {
        println!(
            "Active filters: city={}, months={}",
            session.criteria.city, session.criteria.months
        );
        println!("[1] Select city");
        println!("[2] Select month range");
        println!("[3] Show dashboard");
        println!("[4] Show filtered rows");
        println!("[5] Export reports");
        println!("[0] Exit\n");
        let Some(choice) = prompt(input, "Enter choice: ") else {
            println!();
            break;
        };
        let handled = match choice.as_str() {
            "1" => handle_select_city(session, input),
            "2" => handle_select_months(session, input),
            "3" => {
                output::render_dashboard(&session.dashboard(), &session.palette, PREVIEW_ROWS);
                Some(())
            }
            "4" => {
                output::render_detail(&session.dashboard().view);
                Some(())
            }
            "5" => {
                handle_export(session);
                Some(())
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0 to 5.\n");
                Some(())
            }
        };
        if handled.is_none() {
            println!();
            break;
        }
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    setup_logging();
    let args = Args::parse();

    let criteria = match args.criteria() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let palette = match &args.palette {
        Some(path) => match CityPalette::load(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => CityPalette::default(),
    };

    let dataset = match loader::load_dataset(&args.data) {
        Ok((dataset, report)) => {
            tracing::info!(
                "loaded {} rows for {} cities from {}",
                util::format_int(report.total_rows),
                report.cities,
                args.data.display()
            );
            if dataset.is_empty() {
                tracing::warn!("{} has no data rows", args.data.display());
            }
            dataset
        }
        Err(e) => {
            eprintln!("Failed to load file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session {
        dataset,
        palette,
        criteria,
        out_dir: args.out_dir,
    };

    if args.once {
        output::render_dashboard(&session.dashboard(), &session.palette, PREVIEW_ROWS);
    } else {
        run_menu(&mut session, &mut io::stdin().lock());
    }
    ExitCode::SUCCESS
}
