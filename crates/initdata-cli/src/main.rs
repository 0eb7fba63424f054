//! initdata CLI - validate, generate and inspect signed launch-parameter bundles.

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod output;

use commands::{canonicalize, generate, validate};

#[derive(Parser)]
#[command(name = "initdata")]
#[command(version, about = "Validate and generate signed initData bundles")]
struct Cli {
    /// Issuer credential (defaults to $INITDATA_CREDENTIAL)
    #[arg(long, global = true)]
    credential: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a bundle
    Validate {
        /// File containing the bundle (or stdin if not provided)
        input: Option<String>,
        /// Accept bundles of any age
        #[arg(long)]
        skip_freshness: bool,
        /// Freshness window in seconds
        #[arg(long)]
        max_age: Option<u64>,
        /// Leave `signature` out of the digest input
        #[arg(long)]
        exclude_signature: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a freshly signed bundle
    Generate {
        /// User id
        #[arg(long)]
        id: i64,
        /// First name
        #[arg(long)]
        first_name: String,
        /// Last name
        #[arg(long)]
        last_name: Option<String>,
        /// Username
        #[arg(long)]
        username: Option<String>,
        /// IETF language tag
        #[arg(long)]
        language_code: Option<String>,
        /// Avatar URL
        #[arg(long)]
        photo_url: Option<String>,
        /// Mark the user as allowing bot messages
        #[arg(long)]
        allows_write_to_pm: bool,
        /// Session identifier
        #[arg(long)]
        query_id: Option<String>,
        /// Chat instance
        #[arg(long)]
        chat_instance: Option<String>,
        /// Chat type
        #[arg(long)]
        chat_type: Option<String>,
        /// Platform signature value to embed
        #[arg(long)]
        signature: Option<String>,
        /// Leave `signature` out of the digest input
        #[arg(long)]
        exclude_signature: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the data-check string of a bundle
    Canonicalize {
        /// File containing the bundle (or stdin if not provided)
        input: Option<String>,
        /// Leave `signature` out of the output
        #[arg(long)]
        exclude_signature: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Validate {
            input,
            skip_freshness,
            max_age,
            exclude_signature,
            json,
        } => validate::run(
            cli.credential,
            input,
            validate::Options {
                skip_freshness,
                max_age,
                exclude_signature,
                json,
            },
        ),
        Commands::Generate {
            id,
            first_name,
            last_name,
            username,
            language_code,
            photo_url,
            allows_write_to_pm,
            query_id,
            chat_instance,
            chat_type,
            signature,
            exclude_signature,
            json,
        } => generate::run(
            cli.credential,
            generate::Options {
                id,
                first_name,
                last_name,
                username,
                language_code,
                photo_url,
                allows_write_to_pm,
                query_id,
                chat_instance,
                chat_type,
                signature,
                exclude_signature,
                json,
            },
        ),
        Commands::Canonicalize {
            input,
            exclude_signature,
        } => canonicalize::run(input, exclude_signature),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
