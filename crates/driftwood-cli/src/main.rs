use std::path::PathBuf;

use clap::{Parser, Subcommand};
use driftwood_cli::commands::{self, AddClient};
use driftwood_cli::config::{default_config_path, load_config, redacted, save_config};
use driftwood_core::models::{
    DiagnosisCategory, EvaluationType, FailureReason, Language, QuestionnaireStatus,
    QuestionnaireType,
};
use eyre::Result;
use jiff::civil::Date;

#[derive(Debug, Parser)]
#[command(name = "driftwood", version, about = "Questionnaire reminders for an evaluation clinic")]
struct Cli {
    /// Path to config.json.
    #[arg(long, global = true, env = "DRIFTWOOD_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long = "json", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one reminder batch and send the admin summary.
    Run {
        /// Treat this date as today.
        #[arg(long)]
        date: Option<Date>,
    },
    /// Add a client or update their contact details.
    AddClient {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        dob: Date,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        preferred_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        diagnosis: Option<DiagnosisCategory>,
        #[arg(long, default_value = "english")]
        language: Language,
        /// The client has an IFSP to download.
        #[arg(long)]
        ifsp: bool,
    },
    /// Assign a questionnaire to a client.
    Assign {
        client_id: i64,
        questionnaire: QuestionnaireType,
        #[arg(long)]
        link: Option<String>,
        /// Date the questionnaire was sent to the family.
        #[arg(long)]
        sent: Option<Date>,
        #[arg(long, default_value = "PENDING")]
        status: QuestionnaireStatus,
    },
    /// Mark a questionnaire completed.
    Complete { questionnaire_id: i64 },
    /// Record why a client's evaluation is blocked.
    RecordFailure {
        client_id: i64,
        reason: String,
        #[arg(long)]
        evaluation: Option<EvaluationType>,
        #[arg(long)]
        date: Option<Date>,
    },
    /// Mark a client's failure resolved.
    ResolveFailure { client_id: i64, reason: String },
    /// Stop reminding a client.
    Deactivate { client_id: i64 },
    /// Record that a client's IFSP has been downloaded.
    IfspDownloaded { client_id: i64 },
    /// List the questionnaires a client needs for an evaluation.
    Required {
        client_id: i64,
        evaluation: EvaluationType,
        /// A recent Vineland is already on file.
        #[arg(long)]
        vineland_on_file: bool,
    },
    /// Show a client's questionnaires and failures with their stages.
    Status { client_id: i64 },
    /// Inspect or upgrade the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the config with secrets masked.
    Show,
    /// Print where the config is read from.
    Path,
    /// Rewrite the config at the current version.
    Migrate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let today = jiff::Zoned::now().date();

    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config(&config_path)?;
                println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
                Ok(())
            }
            ConfigAction::Migrate => {
                let config = load_config(&config_path)?;
                save_config(&config_path, &config)
            }
        };
    }

    let config = load_config(&config_path)?;

    if let Command::Run { date } = cli.command {
        let report = commands::run_reminders(&config, date.unwrap_or(today)).await?;
        tracing::info!(
            sent = report.sent,
            delivered = report.delivered,
            escalated = report.escalated,
            "reminder run complete"
        );
        return Ok(());
    }

    let store = commands::open_store(&config)?;
    match cli.command {
        Command::AddClient {
            id,
            dob,
            first_name,
            last_name,
            preferred_name,
            phone,
            gender,
            diagnosis,
            language,
            ifsp,
        } => {
            commands::add_client(
                &store,
                AddClient {
                    id,
                    dob,
                    first_name,
                    last_name,
                    preferred_name,
                    phone_number: phone,
                    gender,
                    diagnosis,
                    language,
                    ifsp,
                },
            )?;
        }
        Command::Assign {
            client_id,
            questionnaire,
            link,
            sent,
            status,
        } => {
            let id = commands::assign(&store, client_id, questionnaire, link, sent, status)?;
            println!("{id}");
        }
        Command::Complete { questionnaire_id } => {
            store.set_questionnaire_status(questionnaire_id, QuestionnaireStatus::Completed)?;
        }
        Command::RecordFailure {
            client_id,
            reason,
            evaluation,
            date,
        } => {
            let id = commands::record_failure(
                &store,
                client_id,
                &reason,
                evaluation,
                date.unwrap_or(today),
            )?;
            println!("{id}");
        }
        Command::ResolveFailure { client_id, reason } => {
            store.resolve_failure(client_id, &FailureReason::from(reason))?;
        }
        Command::Deactivate { client_id } => {
            store.set_client_active(client_id, false)?;
        }
        Command::IfspDownloaded { client_id } => {
            store.mark_ifsp_downloaded(client_id)?;
        }
        Command::Required {
            client_id,
            evaluation,
            vineland_on_file,
        } => {
            let requirement = commands::required_for_client(
                &store,
                client_id,
                evaluation,
                vineland_on_file,
                today,
            )?;
            println!("{}", serde_json::to_string_pretty(&requirement)?);
        }
        Command::Status { client_id } => {
            let status = commands::client_status(&store, client_id)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Run { .. } | Command::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
