//! TripPlanner - AI trip planning from the terminal
//!
//! CLI entry point.

use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use tripplanner::cli::{Cli, Command, TripsCommand};
use tripplanner::config::Config;
use tripplanner::itinerary::{ItineraryRequester, TripParameters};
use tripplanner::llm::create_client;
use tripplanner::places::{DestinationResolver, GooglePlacesClient};
use tripplanner::planner::{PlanError, TripPlan, TripPlanner};
use tripplanner::retry::RetryPolicy;
use tripplanner::session::{
    FirebaseIdentityProvider, Identity, IdentityProvider, OfflineIdentityProvider, SessionReconciler,
    SessionSettings, SessionState,
};
use tripplanner::trips::TripManager;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("tripplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            destination,
            days,
            style,
            companions,
            save,
        } => cmd_plan(&config, &destination, TripParameters::new(days, &style, &companions), save).await,
        Command::Suggest { text } => cmd_suggest(&config, &text).await,
        Command::Login { email } => cmd_login(&config, &email).await,
        Command::Logout => cmd_logout(&config).await,
        Command::Whoami => cmd_whoami(&config).await,
        Command::Trips { command } => cmd_trips(&config, command).await,
    }
}

fn build_identity_provider(config: &Config) -> Arc<dyn IdentityProvider> {
    match FirebaseIdentityProvider::from_config(&config.session) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            warn!(error = %e, "Identity provider unavailable, continuing signed out");
            Arc::new(OfflineIdentityProvider::new(e.to_string()))
        }
    }
}

fn start_session(config: &Config) -> SessionReconciler {
    SessionReconciler::start(
        build_identity_provider(config),
        SessionSettings::from_config(&config.session),
    )
}

fn build_resolver(config: &Config) -> DestinationResolver {
    match GooglePlacesClient::from_config(&config.places) {
        Ok(client) => DestinationResolver::new(
            Arc::new(client),
            Duration::from_millis(config.places.redetect_delay_ms),
        ),
        Err(e) => {
            info!(error = %e, "Places capability unavailable, using curated destinations");
            DestinationResolver::fallback_only()
        }
    }
}

async fn cmd_plan(config: &Config, destination: &str, params: TripParameters, save: bool) -> Result<()> {
    debug!(%destination, ?params, save, "cmd_plan: called");
    config.validate()?;

    let client = create_client(&config.llm)?;
    let requester = ItineraryRequester::new(client, RetryPolicy::from_config(&config.retry));
    let trips = TripManager::spawn(&config.storage.trips_dir)?;
    let mut planner = TripPlanner::new(start_session(config), build_resolver(config), requester, trips)
        .with_max_photos(config.places.max_photos);

    let place = planner.resolve_destination(destination).await?;
    println!(
        "Planning a {}-day trip to {}...",
        params.days,
        place.display_name.cyan()
    );
    let plan = planner.plan(&place, &params).await?;
    print_plan(&plan);

    if save {
        planner.session().settled().await;
        match planner.save(&plan).await {
            Ok(record) => println!("{} Saved trip: {}", "✓".green(), record.id.cyan()),
            Err(PlanError::NotSignedIn) => println!("{} {}", "!".yellow(), PlanError::NotSignedIn),
            Err(e) => return Err(e.into()),
        }
    }

    planner.shutdown().await;
    Ok(())
}

fn print_plan(plan: &TripPlan) {
    println!();
    println!("{}", plan.destination().bold());
    println!("{}", "-".repeat(plan.destination().chars().count()).dimmed());
    println!("{}", plan.itinerary.text());
    println!();
    println!("{} {}", "Main image:".dimmed(), plan.images.main);
    println!("{} {}", "Travel image:".dimmed(), plan.images.travel);
}

async fn cmd_suggest(config: &Config, text: &str) -> Result<()> {
    debug!(%text, "cmd_suggest: called");
    let resolver = build_resolver(config);
    let suggestions = resolver.suggest(text).await;
    if suggestions.is_empty() {
        println!("No destinations match '{}'", text);
        return Ok(());
    }
    for candidate in suggestions {
        match &candidate.place_id {
            Some(place_id) => println!("{} {}", candidate.display_name, place_id.dimmed()),
            None => println!("{}", candidate.display_name),
        }
    }
    Ok(())
}

async fn cmd_login(config: &Config, email: &str) -> Result<()> {
    debug!(%email, "cmd_login: called");
    let session = start_session(config);
    session.settled().await;

    eprint!("Password: ");
    let mut password = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut password)
        .context("Failed to read password")?;

    let options = session
        .sign_in_options()
        .with_credentials(email, password.trim_end_matches(['\r', '\n']));
    let identity = session.login(options).await.context("Sign-in failed")?;
    println!("{} Signed in as {}", "✓".green(), identity.label().cyan());

    session.shutdown();
    Ok(())
}

async fn cmd_logout(config: &Config) -> Result<()> {
    debug!("cmd_logout: called");
    let session = start_session(config);
    // Let startup validation finish so it cannot race the sign-out
    session.settled().await;
    session.logout().await.context("Sign-out failed")?;
    println!("{} Signed out", "✓".green());
    session.shutdown();
    Ok(())
}

async fn cmd_whoami(config: &Config) -> Result<()> {
    debug!("cmd_whoami: called");
    let session = start_session(config);
    match session.settled().await {
        SessionState::Resolved(identity) => {
            println!("Signed in as {} ({})", identity.label().cyan(), identity.uid.dimmed())
        }
        SessionState::TimedOut => println!("Not signed in (identity provider did not answer in time)"),
        _ => println!("Not signed in"),
    }
    session.shutdown();
    Ok(())
}

async fn signed_in_identity(session: &SessionReconciler) -> Result<Identity> {
    session
        .settled()
        .await
        .identity()
        .cloned()
        .ok_or_else(|| eyre::eyre!("Log in to see saved trips"))
}

async fn cmd_trips(config: &Config, command: TripsCommand) -> Result<()> {
    debug!(?command, "cmd_trips: called");
    let session = start_session(config);
    let identity = signed_in_identity(&session).await?;
    let trips = TripManager::spawn(&config.storage.trips_dir)?;

    match command {
        TripsCommand::List { search } => {
            let records = trips.list(&identity.uid, search.as_deref()).await?;
            if records.is_empty() {
                println!("No saved trips");
            }
            for record in records {
                println!(
                    "{} {} {}",
                    record.id.yellow(),
                    record.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    record.destination
                );
            }
        }
        TripsCommand::Show { id } => {
            let record = trips.get_required(&identity.uid, &id).await?;
            println!("{}", record.destination.bold());
            println!("{}", record.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed());
            println!();
            println!("{}", record.itinerary);
            if let Some(notes) = &record.notes {
                println!();
                println!("{} {}", "Notes:".dimmed(), notes);
            }
            println!();
            println!("{} {}", "Main image:".dimmed(), record.images.main);
            println!("{} {}", "Travel image:".dimmed(), record.images.travel);
        }
        TripsCommand::Notes { id, notes } => {
            trips.update_notes(&identity.uid, &id, &notes).await?;
            println!("{} Updated notes for {}", "✓".green(), id);
        }
        TripsCommand::Delete { id } => {
            if trips.delete(&identity.uid, &id).await? {
                println!("{} Deleted trip: {}", "✓".green(), id);
            } else {
                println!("{} No trip with id {}", "!".yellow(), id);
            }
        }
    }

    trips.shutdown().await;
    session.shutdown();
    Ok(())
}
