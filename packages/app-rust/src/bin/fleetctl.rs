//! `fleetctl` -- command-line shell over the fleet service.
//!
//! Entity and analytics commands run through the standard handler pipeline,
//! so an anonymous invocation (no `--user`) is denied. `health` probes the
//! store directly.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use fleetline_app::config::{AiConfig, LogConfig, PipelineConfig};
use fleetline_app::storage::FleetEntity;
use fleetline_app::{
    telemetry, AppConfig, FleetService, FleetStore, MemoryNotifier, Outcome, SessionIdentity,
};
use fleetline_core::{Driver, Principal, Route, Vehicle};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "fleetctl", version, about = "Manage routes, drivers, and vehicles")]
struct Cli {
    /// JSON snapshot to load the fleet from and save it back to.
    #[arg(long, env = "FLEETLINE_DATA_FILE", global = true)]
    data_file: Option<PathBuf>,

    /// Signed-in user. Without one every command except `health` is denied.
    #[arg(long, env = "FLEETLINE_USER", global = true)]
    user: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "FLEETLINE_LOG", default_value = "warn", global = true)]
    log_filter: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "FLEETLINE_LOG_JSON", global = true)]
    log_json: bool,

    /// Per-operation timeout in milliseconds.
    #[arg(long, env = "FLEETLINE_OP_TIMEOUT_MS", default_value_t = 30_000, global = true)]
    op_timeout_ms: u64,

    #[command(flatten)]
    ai: AiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct AiArgs {
    /// API key for the chat-completion endpoint. Analytics are off without it.
    #[arg(long, env = "FLEETLINE_AI_API_KEY", hide_env_values = true, global = true)]
    ai_api_key: Option<String>,

    #[arg(long, env = "FLEETLINE_AI_BASE_URL", default_value = AiConfig::DEFAULT_BASE_URL, global = true)]
    ai_base_url: String,

    #[arg(long, env = "FLEETLINE_AI_MODEL", default_value = AiConfig::DEFAULT_MODEL, global = true)]
    ai_model: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage routes.
    #[command(subcommand)]
    Route(RouteCommand),
    /// Manage drivers.
    #[command(subcommand)]
    Driver(DriverCommand),
    /// Manage vehicles.
    #[command(subcommand)]
    Vehicle(VehicleCommand),
    /// Check that the store is reachable and show entity counts.
    Health,
    /// Ask the AI analyst a question about the fleet.
    Analyze { question: String },
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    size: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum RouteCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        distance_km: f64,
        #[arg(long)]
        minutes: u32,
    },
    List(PageArgs),
    Show { id: u64 },
    Remove { id: u64 },
}

#[derive(Debug, Subcommand)]
enum DriverCommand {
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        license: String,
        #[arg(long)]
        phone: String,
    },
    List(PageArgs),
}

#[derive(Debug, Subcommand)]
enum VehicleCommand {
    Add {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: u16,
        #[arg(long)]
        capacity_kg: u32,
    },
    List(PageArgs),
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        let ai = self.ai.ai_api_key.as_ref().map(|key| AiConfig {
            base_url: self.ai.ai_base_url.clone(),
            model: self.ai.ai_model.clone(),
            ..AiConfig::with_api_key(key.clone())
        });
        AppConfig {
            pipeline: PipelineConfig {
                operation_timeout: Duration::from_millis(self.op_timeout_ms),
            },
            ai,
            logging: LogConfig {
                filter: self.log_filter.clone(),
                json: self.log_json,
            },
            data_file: self.data_file.clone(),
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.app_config();

    if let Err(e) = telemetry::init_tracing(&config.logging) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "fleetctl failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the operation was denied or failed
/// and the user has already been told why.
async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<bool> {
    let store = match &config.data_file {
        Some(path) => FleetStore::load_snapshot(path).await?,
        None => FleetStore::in_memory(),
    };
    let identity = Arc::new(match &cli.user {
        Some(user) => SessionIdentity::signed_in(Principal::new(user.clone())),
        None => SessionIdentity::anonymous(),
    });
    let notifier = Arc::new(MemoryNotifier::new());
    let service = FleetService::from_config(&config, store, identity, notifier.clone())?;

    let succeeded = match cli.command {
        Command::Route(cmd) => route_command(&service, cmd).await?,
        Command::Driver(cmd) => driver_command(&service, cmd).await?,
        Command::Vehicle(cmd) => vehicle_command(&service, cmd).await?,
        Command::Health => {
            let health = service.health().await;
            print_json(&health)?;
            health.ok
        }
        Command::Analyze { question } => {
            report(service.analyze(&question).await?, |answer| {
                println!("{answer}");
                Ok(())
            })?
        }
    };

    for notice in notifier.drain() {
        eprintln!("{notice}");
    }

    if let Some(path) = &config.data_file {
        service.store().save_snapshot(path).await?;
    }
    Ok(succeeded)
}

async fn route_command(service: &FleetService, cmd: RouteCommand) -> anyhow::Result<bool> {
    match cmd {
        RouteCommand::Add {
            name,
            origin,
            destination,
            distance_km,
            minutes,
        } => {
            let route = Route::new(name, origin, destination, distance_km, minutes);
            report(service.create(route).await?, print_json)
        }
        RouteCommand::List(page) => list::<Route>(service, page).await,
        RouteCommand::Show { id } => report(service.read::<Route>(id).await?, print_json),
        RouteCommand::Remove { id } => report(service.delete::<Route>(id).await?, |()| {
            println!("route {id} removed");
            Ok(())
        }),
    }
}

async fn driver_command(service: &FleetService, cmd: DriverCommand) -> anyhow::Result<bool> {
    match cmd {
        DriverCommand::Add {
            first_name,
            last_name,
            license,
            phone,
        } => {
            let driver = Driver::new(first_name, last_name, license, phone);
            report(service.create(driver).await?, print_json)
        }
        DriverCommand::List(page) => list::<Driver>(service, page).await,
    }
}

async fn vehicle_command(service: &FleetService, cmd: VehicleCommand) -> anyhow::Result<bool> {
    match cmd {
        VehicleCommand::Add {
            plate,
            make,
            model,
            year,
            capacity_kg,
        } => {
            let vehicle = Vehicle::new(plate, make, model, year, capacity_kg);
            report(service.create(vehicle).await?, print_json)
        }
        VehicleCommand::List(page) => list::<Vehicle>(service, page).await,
    }
}

async fn list<E: FleetEntity>(service: &FleetService, args: PageArgs) -> anyhow::Result<bool> {
    report(service.list::<E>(args.page, args.size).await?, print_json)
}

/// Prints a completed value; denials and caught failures were already
/// reported through the notifier.
fn report<T>(
    outcome: Outcome<T>,
    print: impl FnOnce(T) -> anyhow::Result<()>,
) -> anyhow::Result<bool> {
    match outcome {
        Outcome::Completed(value) => {
            print(value)?;
            Ok(true)
        }
        Outcome::ShortCircuited | Outcome::Failed(_) => Ok(false),
    }
}

fn print_json<T: Serialize>(value: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
