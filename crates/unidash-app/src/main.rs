#![warn(missing_docs)]
//! # unidash binary
//!
//! Command-line entry point for the unidash management console.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, warn};
use unidash_app::{
    AppError, Console, ConsoleConfig, DashboardSummary, InstanceRow, app_version, init_logging,
    redact_sensitive,
};
use unidash_config::OverrideConfig;
use unidash_core::{Instance, InstanceStatus};

#[derive(Parser, Debug)]
#[command(name = "unidash", author, version = app_version(), about = "WhatsApp gateway management console")]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage gateway instances.
    #[command(subcommand)]
    Instances(InstanceCommand),
    /// Read and write persisted settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Inspect the active gateway configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
struct Target {
    /// Instance id or name.
    instance: String,
    /// Instance token; looked up through the admin listing when omitted.
    #[arg(long, env = "UNIDASH_INSTANCE_TOKEN")]
    token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum InstanceCommand {
    /// List instances with dashboard counts.
    List,
    /// Create an instance.
    Create {
        /// Instance name.
        name: String,
        /// Owning system label.
        #[arg(long)]
        system_name: Option<String>,
    },
    /// Start pairing; prints the QR payload or pairing code.
    Connect {
        #[command(flatten)]
        target: Target,
        /// Request a pairing code for this phone instead of a QR payload.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Tear down the device session.
    Disconnect {
        #[command(flatten)]
        target: Target,
    },
    /// Reconcile and print the instance status.
    Status {
        #[command(flatten)]
        target: Target,
    },
    /// Poll status until the instance is connected or the timeout elapses.
    Watch {
        #[command(flatten)]
        target: Target,
        /// Seconds between polls.
        #[arg(long, default_value_t = 5)]
        interval: u64,
        /// Give up after this many seconds.
        #[arg(long, default_value_t = 180)]
        timeout: u64,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print settings, secrets masked.
    Show {
        /// Print secrets in clear.
        #[arg(long)]
        raw: bool,
    },
    /// Save the gateway URL and admin token.
    SetApi {
        /// Gateway base URL.
        #[arg(long)]
        url: String,
        /// Admin token; a masked value keeps the stored one.
        #[arg(long, env = "UNIDASH_ADMIN_TOKEN")]
        token: String,
    },
    /// Save branding.
    SetBranding {
        /// Console name.
        #[arg(long)]
        app_name: String,
        /// Company name.
        #[arg(long)]
        company_name: String,
        /// Logo URL; pass an empty string to clear.
        #[arg(long)]
        logo_url: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved configuration and where it came from.
    Show,
    /// Save or clear the manual endpoint override.
    Override {
        /// Gateway base URL.
        #[arg(long, required_unless_present = "clear")]
        url: Option<String>,
        /// Admin token; a masked value keeps the stored one.
        #[arg(long, default_value = "")]
        token: String,
        /// Remove the override.
        #[arg(long, conflicts_with = "url")]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match ConsoleConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("unidash: {error}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = init_logging(config.log_dir()) {
        eprintln!("unidash: {error}");
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            let message = redact_sensitive(&failure.to_string());
            error!(error = %message, "command failed");
            eprintln!("unidash: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ConsoleConfig) -> Result<(), AppError> {
    let console = Console::open(config)?;
    let json = cli.json;

    match cli.command {
        Command::Instances(command) => run_instances(&console, command, json).await,
        Command::Settings(command) => run_settings(&console, command, json).await,
        Command::Config(command) => run_config(&console, command, json).await,
    }
}

async fn run_instances(console: &Console, command: InstanceCommand, json: bool) -> Result<(), AppError> {
    let lifecycle = console.lifecycle();
    match command {
        InstanceCommand::List => {
            let (instances, summary) = console.dashboard().await?;
            print_dashboard(&instances, summary, json)
        }
        InstanceCommand::Create { name, system_name } => {
            let instance = lifecycle.create(&name, system_name.as_deref()).await?;
            if json {
                return print_json(&instance);
            }
            print_instance(&instance);
            if let Some(token) = &instance.token {
                println!("token: {token}");
            }
            Ok(())
        }
        InstanceCommand::Connect { target, phone } => {
            let instance = console.locate(&target.instance, target.token.as_deref()).await?;
            let result = match phone {
                Some(phone) => lifecycle.connect_with_phone(&instance, &phone).await?,
                None => lifecycle.connect(&instance).await?,
            };
            print_row(&result.instance, json)
        }
        InstanceCommand::Disconnect { target } => {
            let instance = console.locate(&target.instance, target.token.as_deref()).await?;
            let instance = lifecycle.disconnect(&instance).await?;
            print_row(&instance, json)
        }
        InstanceCommand::Status { target } => {
            let instance = console.locate(&target.instance, target.token.as_deref()).await?;
            print_row(&instance, json)
        }
        InstanceCommand::Watch {
            target,
            interval,
            timeout,
        } => {
            let mut instance = console.locate(&target.instance, target.token.as_deref()).await?;
            let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout);
            let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
            let mut last_shown = None;

            loop {
                ticker.tick().await;
                instance = lifecycle.fetch_status(&instance).await?;
                let row = InstanceRow::from(&instance);
                if last_shown.as_ref() != Some(&row) {
                    print_row(&instance, json)?;
                    last_shown = Some(row);
                }
                if instance.status() == InstanceStatus::Connected {
                    return Ok(());
                }
                if tokio::time::Instant::now() >= deadline {
                    warn!(instance_id = %instance.id, "watch timed out before pairing completed");
                    return Ok(());
                }
            }
        }
    }
}

async fn run_settings(console: &Console, command: SettingsCommand, json: bool) -> Result<(), AppError> {
    let settings = console.settings();
    match command {
        SettingsCommand::Show { raw } => {
            let current = if raw {
                warn!("printing settings with secrets in clear");
                settings.get_raw_settings().await
            } else {
                settings.get_settings().await
            };
            if json {
                return print_json(&current);
            }
            println!("api_base_url: {}", current.api_base_url);
            println!("api_admin_token: {}", current.api_admin_token);
            println!("app_name: {}", current.app_name);
            println!("company_name: {}", current.company_name);
            println!("logo_url: {}", current.logo_url.as_deref().unwrap_or("-"));
            Ok(())
        }
        SettingsCommand::SetApi { url, token } => {
            settings.save_api_config(&url, &token).await?;
            println!("api configuration saved");
            Ok(())
        }
        SettingsCommand::SetBranding {
            app_name,
            company_name,
            logo_url,
        } => {
            settings
                .save_branding(&app_name, &company_name, logo_url.as_deref())
                .await?;
            println!("branding saved");
            Ok(())
        }
    }
}

async fn run_config(console: &Console, command: ConfigCommand, json: bool) -> Result<(), AppError> {
    match command {
        ConfigCommand::Show => {
            let resolved = console.resolver().resolve().await.masked();
            if json {
                return print_json(&resolved);
            }
            println!("endpoint: {}", resolved.endpoint_url);
            println!("admin_token: {}", display_or_dash(&resolved.admin_token));
            println!("source: {}", resolved.source);
            println!("configured: {}", resolved.source != unidash_core::ConfigSource::Default);
            Ok(())
        }
        ConfigCommand::Override { clear: true, .. } => {
            console.settings().clear_local_override().await?;
            println!("override cleared");
            Ok(())
        }
        ConfigCommand::Override { url, token, .. } => {
            let endpoint_url = url.ok_or_else(|| AppError::Config("--url is required".to_string()))?;
            console
                .settings()
                .save_local_override(OverrideConfig {
                    endpoint_url,
                    admin_token: token,
                })
                .await?;
            println!("override saved");
            Ok(())
        }
    }
}

fn print_dashboard(instances: &[Instance], summary: DashboardSummary, json: bool) -> Result<(), AppError> {
    if json {
        #[derive(Serialize)]
        struct Dashboard {
            summary: DashboardSummary,
            instances: Vec<InstanceRow>,
        }
        return print_json(&Dashboard {
            summary,
            instances: instances.iter().map(InstanceRow::from).collect(),
        });
    }

    println!(
        "total: {}  connected: {}  not connected: {}",
        summary.total, summary.connected, summary.not_connected
    );
    for instance in instances {
        print_instance(instance);
    }
    Ok(())
}

fn print_row(instance: &Instance, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(&InstanceRow::from(instance));
    }
    print_instance(instance);
    Ok(())
}

fn print_instance(instance: &Instance) {
    let row = InstanceRow::from(instance);
    println!(
        "{}  {}  [{}]  phone={}  profile={}  system={}",
        row.id,
        row.name,
        row.label,
        row.phone.as_deref().unwrap_or("-"),
        row.profile_name.as_deref().unwrap_or("-"),
        row.system_name.as_deref().unwrap_or("-"),
    );
    if let Some(qr_code) = &row.qr_code {
        println!("  qr code: {qr_code}");
    }
    if let Some(pairing_code) = &row.pairing_code {
        println!("  pairing code: {pairing_code}");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
