// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! LeadLens CLI - ad-hoc lead enrichment from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Find social profiles for an email address
//! leadlens search "jane@acme.example"
//!
//! # Search specific networks only
//! leadlens search "Jane Doe" --networks linkedin,github
//!
//! # Enrich a company
//! leadlens enrich company "Acme Corp"
//!
//! # Enrich a person with company context
//! leadlens enrich person "Jane Doe" --company "Acme Corp"
//!
//! # Enrich a contact and print usage stats afterwards
//! leadlens enrich contact "jane@acme.example" --stats
//!
//! # JSON output, pro-tier rate limits
//! leadlens search "Jane Doe" --format json --tier pro
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use leadlens_core::RateTier;
use leadlens_providers::{
    ChatParams, PerplexityClient, SearchParams, SocialLinksClient, SocialNetwork,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Definition
// ============================================================================

/// LeadLens CLI - rate-limited lead enrichment.
#[derive(Parser)]
#[command(name = "leadlens")]
#[command(about = "Lead enrichment from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RapidAPI key; falls back to the RAPIDAPI_KEY environment variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Rate-limit tier preset (basic, pro, ultra, mega).
    #[arg(long, global = true)]
    tier: Option<String>,

    /// Requests per second; overrides the tier preset.
    #[arg(long, global = true)]
    rps: Option<u32>,

    /// Output format.
    #[arg(long, short = 'f', default_value = "text", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search social networks for profile links.
    Search {
        /// Name, email address, or handle to look up.
        query: String,

        /// Comma-separated list of networks (default: all).
        #[arg(long, value_delimiter = ',')]
        networks: Vec<String>,
    },

    /// Run an AI enrichment query.
    Enrich {
        #[command(subcommand)]
        subject: EnrichSubject,
    },

    /// Send a free-form prompt to the AI provider.
    Ask {
        /// The prompt text.
        prompt: String,
    },
}

#[derive(Subcommand)]
enum EnrichSubject {
    /// Research a company.
    Company {
        /// Company name.
        name: String,
        /// Print usage statistics after the call.
        #[arg(long)]
        stats: bool,
    },
    /// Research a person.
    Person {
        /// Person's name.
        name: String,
        /// Company for context.
        #[arg(long)]
        company: Option<String>,
        /// Print usage statistics after the call.
        #[arg(long)]
        stats: bool,
    },
    /// Research a contact from an email address.
    Contact {
        /// Email address.
        email: String,
        /// Print usage statistics after the call.
        #[arg(long)]
        stats: bool,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("RAPIDAPI_KEY").ok())
        .context("no API key: pass --api-key or set RAPIDAPI_KEY")?;

    match &cli.command {
        Commands::Search { query, networks } => {
            let networks = networks
                .iter()
                .map(|n| n.parse::<SocialNetwork>())
                .collect::<Result<Vec<_>, _>>()?;

            let client = SocialLinksClient::from_api_key(api_key)?;
            apply_limits(&cli, |rps| client.set_rate_limit(rps).map_err(Into::into))?;

            let response = client
                .search(SearchParams::new(query.clone()).with_networks(&networks))
                .await?;

            match cli.format {
                OutputFormat::Json => {
                    let mut links = serde_json::Map::new();
                    for network in SocialNetwork::all() {
                        let found = response.links_for(*network);
                        if !found.is_empty() {
                            links.insert(network.to_string(), serde_json::json!(found));
                        }
                    }
                    println!("{}", serde_json::to_string_pretty(&links)?);
                }
                OutputFormat::Text => {
                    if response.total_links() == 0 {
                        println!("No profiles found for \"{query}\"");
                    }
                    for network in SocialNetwork::all() {
                        for link in response.links_for(*network) {
                            println!("{network:>10}  {link}");
                        }
                    }
                }
            }
        }

        Commands::Enrich { subject } => {
            let client = PerplexityClient::from_api_key(api_key)?;
            apply_limits(&cli, |rps| client.set_rate_limit(rps).map_err(Into::into))?;

            let (response, show_stats) = match subject {
                EnrichSubject::Company { name, stats } => {
                    (client.enrich_company(name).await?, *stats)
                }
                EnrichSubject::Person {
                    name,
                    company,
                    stats,
                } => (
                    client.enrich_person(name, company.as_deref()).await?,
                    *stats,
                ),
                EnrichSubject::Contact { email, stats } => {
                    (client.enrich_contact(email).await?, *stats)
                }
            };

            print_chat(&cli, response.content().unwrap_or(""), response.citations())?;
            if show_stats {
                let stats = client.stats();
                eprintln!("\n{}", serde_json::to_string_pretty(&stats)?);
            }
        }

        Commands::Ask { prompt } => {
            let client = PerplexityClient::from_api_key(api_key)?;
            apply_limits(&cli, |rps| client.set_rate_limit(rps).map_err(Into::into))?;

            let response = client
                .chat(ChatParams::from_prompt(prompt.clone()).with_citations())
                .await?;
            print_chat(&cli, response.content().unwrap_or(""), response.citations())?;
        }
    }

    Ok(())
}

/// Applies `--tier` then `--rps` (the explicit rate wins) to a client.
fn apply_limits(cli: &Cli, set_rate_limit: impl Fn(u32) -> Result<()>) -> Result<()> {
    if let Some(tier) = &cli.tier {
        let tier: RateTier = tier.parse()?;
        set_rate_limit(tier.requests_per_second())?;
    }
    if let Some(rps) = cli.rps {
        set_rate_limit(rps)?;
    }
    Ok(())
}

fn print_chat(cli: &Cli, content: &str, citations: &[String]) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "content": content,
                    "citations": citations,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{content}");
            if !citations.is_empty() {
                println!("\nSources:");
                for citation in citations {
                    println!("  {citation}");
                }
            }
        }
    }
    Ok(())
}
