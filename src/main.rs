//! Spam Protection CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spam_protection::config::FrequencySetting;
use spam_protection::subject::validate;
use spam_protection::{Config, SpamProtection};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spam-protection")]
#[command(about = "Check IPs, emails and usernames against StopForumSpam and report spammers")]
#[command(version)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "warn")]
    log_level: String,

    /// Frequency threshold: a number or strict, high, medium, low
    #[arg(short, long)]
    threshold: Option<String>,

    /// Minimum confidence (0-100) required on top of the frequency
    #[arg(long)]
    confidence: Option<f64>,

    /// Do not treat Tor exit nodes as spam sources
    #[arg(long)]
    allow_tor: bool,

    /// API key for submitting reports
    #[arg(long, env = "STOPFORUMSPAM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a subject of the given type (ip, email or username)
    Check {
        #[arg(value_name = "TYPE")]
        subject_type: String,
        value: Option<String>,
    },
    /// Check an IP address
    Ip { value: String },
    /// Check an email address
    Email { value: String },
    /// Check a username
    Username { value: String },
    /// Submit a spam report
    Report {
        #[arg(long)]
        username: String,
        #[arg(long)]
        ip: String,
        #[arg(long)]
        email: String,
        /// Evidence text, e.g. the original message with headers
        #[arg(long, conflicts_with = "evidence_file", required_unless_present = "evidence_file")]
        evidence: Option<String>,
        /// Read evidence from a file
        #[arg(long)]
        evidence_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;

    // Handle --validate
    if args.validate {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    let client = SpamProtection::from_config(&config)?;

    let Some(command) = args.command else {
        anyhow::bail!("no command given, see --help");
    };

    let spam = match command {
        Command::Check {
            subject_type,
            value,
        } => {
            let subject = validate(&subject_type, value.as_deref())?;
            client.check_subject(&subject).await?
        }
        Command::Ip { value } => client.check_ip(&value).await?,
        Command::Email { value } => client.check_email(&value).await?,
        Command::Username { value } => client.check_username(&value).await?,
        Command::Report {
            username,
            ip,
            email,
            evidence,
            evidence_file,
        } => {
            let evidence = match (evidence, evidence_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading evidence from {}", path.display()))?,
                (None, None) => String::new(),
            };
            client
                .submit_report(&username, &ip, &evidence, &email)
                .await?;
            println!("report submitted");
            return Ok(ExitCode::SUCCESS);
        }
    };

    if spam {
        println!("spam");
        Ok(ExitCode::FAILURE)
    } else {
        println!("not spam");
        Ok(ExitCode::SUCCESS)
    }
}

/// Load the config file (if any) and apply command line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(threshold) = &args.threshold {
        config.thresholds.frequency = threshold.parse::<FrequencySetting>()?;
    }

    if args.confidence.is_some() {
        config.thresholds.confidence = args.confidence;
    }

    if args.allow_tor {
        config.tor.allow_tor_nodes = true;
    }

    if let Some(api_key) = &args.api_key {
        config.api.api_key = api_key.clone();
    }

    config.validate()?;
    Ok(config)
}
