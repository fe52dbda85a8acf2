//! `idchain`: command-line front end for identity chains.
//!
//! Results are printed as pretty JSON on stdout; logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use idchain::config::DEFAULT_LOG_FILTER;
use idchain::{AuthContext, Config, EventType, IdentityEvent, IdentityService, RiskLevel};

#[derive(Parser, Debug)]
#[command(name = "idchain", version, about = "Signed, hash-linked identity event chains")]
struct Cli {
    /// Chain document path (overrides IDENTITY_STORE_PATH).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Flush each commit to disk before it becomes visible.
    #[arg(long, global = true)]
    durable: bool,

    /// Log filter directive (overrides IDENTITY_LOG).
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a chain. Prints the generated private key if none was supplied.
    Create {
        owner_id: String,
        /// Base64 root public key to bind instead of generating one.
        #[arg(long)]
        root_public_key: Option<String>,
    },
    /// Print one chain.
    Show { owner_id: String },
    /// Print every chain.
    List,
    /// Append a signed event.
    Append(AppendArgs),
    /// Verify one chain. Exits non-zero if it is broken.
    Verify { owner_id: String },
}

#[derive(Args, Debug)]
struct AppendArgs {
    owner_id: String,

    /// Event type, e.g. login or identity_assertion.
    #[arg(long = "type")]
    kind: String,

    /// Defaults to the owner.
    #[arg(long)]
    actor: Option<String>,

    /// Defaults to a random id.
    #[arg(long)]
    id: Option<String>,

    /// RFC3339 timestamp. Defaults to now.
    #[arg(long)]
    timestamp: Option<DateTime<Utc>>,

    /// Free-form risk tag recorded in the event.
    #[arg(long)]
    risk: Option<String>,

    /// Payload entry as KEY=VALUE. Repeatable.
    #[arg(long = "payload", value_parser = parse_payload_entry)]
    payload: Vec<(String, String)>,

    /// Base64 signer private key (32-byte seed or 64-byte keypair).
    #[arg(long, conflicts_with = "key_file")]
    key: Option<String>,

    /// File holding the base64 signer private key.
    #[arg(long)]
    key_file: Option<PathBuf>,

    #[command(flatten)]
    auth: AuthArgs,
}

#[derive(Args, Debug)]
struct AuthArgs {
    #[arg(long)]
    long_phrase: bool,
    #[arg(long)]
    email_otp: bool,
    #[arg(long)]
    totp: bool,
    #[arg(long)]
    hardware_key: bool,
    /// Risk tier for the policy check: normal or high.
    #[arg(long, default_value = "normal")]
    auth_risk: RiskLevel,
}

impl From<&AuthArgs> for AuthContext {
    fn from(args: &AuthArgs) -> Self {
        AuthContext {
            long_phrase: args.long_phrase,
            email_otp: args.email_otp,
            totp: args.totp,
            hardware_key: args.hardware_key,
            risk: args.auth_risk,
        }
    }
}

fn parse_payload_entry(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.store {
        config.store_path = path;
    }
    if cli.durable {
        config.durable_commit = true;
    }
    if let Some(filter) = cli.log {
        config.log_filter = filter;
    }
    init_tracing(&config.log_filter);

    let service = IdentityService::open(&config)
        .with_context(|| format!("open store {}", config.store_path.display()))?;

    match cli.command {
        Command::Create {
            owner_id,
            root_public_key,
        } => {
            let created = service.create_chain(&owner_id, root_public_key.as_deref())?;
            print_json(&created)?;
        }
        Command::Show { owner_id } => {
            print_json(&service.get_chain(&owner_id)?)?;
        }
        Command::List => {
            print_json(&json!({ "chains": service.list_chains()? }))?;
        }
        Command::Append(args) => {
            let kind: EventType = args.kind.parse()?;
            let mut event = IdentityEvent::new(kind, args.actor.unwrap_or_default())
                .with_id(args.id.unwrap_or_default())
                .with_risk(args.risk.unwrap_or_default());
            event.timestamp = args.timestamp;
            if !args.payload.is_empty() {
                event.payload = Some(args.payload.into_iter().collect());
            }

            let key = match &args.key_file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("read key file {}", path.display()))?,
                None => args.key.unwrap_or_default(),
            };
            let chain =
                service.append_event(&args.owner_id, event, &key, &AuthContext::from(&args.auth))?;
            print_json(&chain)?;
        }
        Command::Verify { owner_id } => {
            let report = service.verify_chain(&owner_id)?;
            print_json(&report)?;
            if !report.valid {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_append() {
        let cli = Cli::try_parse_from([
            "idchain",
            "--store",
            "/tmp/chains.json",
            "append",
            "user:alice",
            "--type",
            "login",
            "--payload",
            "ip=10.0.0.1",
            "--payload",
            "note=a=b",
            "--key",
            "AAAA",
            "--long-phrase",
            "--totp",
            "--auth-risk",
            "high",
        ])
        .unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/chains.json")));
        let Command::Append(args) = cli.command else {
            panic!("expected append");
        };
        assert_eq!(args.kind, "login");
        assert_eq!(
            args.payload,
            vec![
                ("ip".to_string(), "10.0.0.1".to_string()),
                ("note".to_string(), "a=b".to_string())
            ]
        );
        let auth = AuthContext::from(&args.auth);
        assert!(auth.long_phrase && auth.totp && !auth.email_otp);
        assert_eq!(auth.risk, RiskLevel::High);
    }

    #[test]
    fn test_payload_entry_requires_separator() {
        assert!(parse_payload_entry("novalue").is_err());
        assert_eq!(
            parse_payload_entry("k=").unwrap(),
            ("k".to_string(), String::new())
        );
    }
}
