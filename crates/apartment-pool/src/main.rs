//! `aptpool` - CLI for apartment-pool
//!
//! Browse the building catalog and keep local reservations from the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use apartment_pool::cli::output;
use apartment_pool::cli::{Cli, Command, ConfigCommand, FloorsCommand};
use apartment_pool::query::{self, StatusFilter};
use apartment_pool::reservations::LoadReport;
use apartment_pool::session::{Action, Session};
use apartment_pool::{init_logging, Catalog, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        command => {
            let mut session = open_session(&config).await?;
            run(&mut session, command)
        }
    }
}

fn run(session: &mut Session<Storage>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sections(args) => {
            let summaries =
                query::section_summaries(session.catalog(), session.store().reservations());
            print!("{}", output::render_sections(&summaries, args.json)?);
        }
        Command::Floors(args) => handle_floors(session, &args)?,
        Command::Show(args) => {
            let details = session.details(&args.id)?;
            print!("{}", output::render_details(&details, args.json)?);
        }
        Command::Reserve(args) => {
            session.dispatch(Action::OpenApartment(args.id));
            let id = session.reserve_selected(&args.buyer_name())?;
            println!("Reserved {id} for {}.", args.buyer_name().trim());
        }
        Command::Cancel(args) => {
            if session.cancel(args.id)? {
                println!("Cancelled reservation for {}.", args.id);
            } else {
                println!("{} was not reserved.", args.id);
            }
        }
        Command::Reservations(args) => {
            print!(
                "{}",
                output::render_reservations(
                    session.store().reservations(),
                    session.catalog(),
                    args.json
                )?
            );
        }
        Command::Stats(args) => {
            let reservations = session.store().reservations();
            let building = query::building_stats(session.catalog(), reservations);
            let summaries = query::section_summaries(session.catalog(), reservations);
            print!("{}", output::render_stats(&building, &summaries, args.json)?);
        }
        Command::Config(_) => {}
    }

    Ok(())
}

/// Generate the catalog, open the database and wait for hydration.
async fn open_session(config: &Config) -> anyhow::Result<Session<Storage>> {
    let catalog = Catalog::generate(&config.catalog)?;
    debug!(
        apartments = catalog.len(),
        scheme = %catalog.scheme(),
        "Catalog generated"
    );

    let db_path = config.database_path();
    let storage = Storage::open(&db_path)
        .with_context(|| format!("opening reservation database {}", db_path.display()))?;

    let (session, report) =
        Session::hydrate(catalog, storage, config.storage.state_key.clone()).await?;
    report_load(&report, &session);

    Ok(session)
}

fn report_load(report: &LoadReport, session: &Session<Storage>) {
    if report.source.is_read_only() {
        warn!(
            key = session.store().key(),
            "Stored reservations could not be loaded; reserve and cancel are disabled"
        );
    }
    if report.catalog_changed {
        warn!("The catalog changed since reservations were saved; check `aptpool reservations`");
    }
    let orphaned = session.orphaned_reservations();
    if !orphaned.is_empty() {
        warn!(count = orphaned.len(), "Some reservations refer to apartments not in the catalog");
    }
}

fn handle_floors(session: &mut Session<Storage>, args: &FloorsCommand) -> anyhow::Result<()> {
    session.dispatch(Action::SelectSection(args.section));
    session.dispatch(Action::SelectFloor(args.floor));
    session.dispatch(Action::SelectStatus(StatusFilter::from(args.status)));

    let view = session.view();
    print!(
        "{}",
        output::render_floors(&view, session.store().reservations(), args.format)?
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  State key:      {}", config.storage.state_key);
                println!();
                println!("[Catalog]");
                println!(
                    "  Price per m²:   {}",
                    output::format_price(config.catalog.price_per_sqm)
                );
                println!("  Section scheme: {}", config.catalog.section_scheme);

                let db_path = config.database_path();
                if db_path.exists() {
                    let stats = Storage::open(&db_path)?.stats()?;
                    println!();
                    println!("[Database]");
                    println!("  Keys:           {}", stats.entries);
                    println!("  Size (bytes):   {}", stats.db_size_bytes);
                    if let Some(at) = stats.last_write {
                        println!("  Last write:     {}", at.format("%Y-%m-%d %H:%M UTC"));
                    }
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
