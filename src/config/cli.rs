use crate::domain::model::Actor;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "city-service")]
#[command(about = "Geographic reference data: city lookups, search and reconciliation")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "city-service.toml")]
    pub config: String,

    /// Override the seed file from the configuration
    #[arg(long)]
    pub seed_file: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit results as JSON
    #[arg(long)]
    pub json: bool,

    /// Id of the user on whose behalf the lookup runs
    #[arg(long)]
    pub actor_id: Option<i64>,

    #[arg(long, requires = "actor_id")]
    pub actor_login: Option<String>,

    #[arg(long, value_delimiter = ',', requires = "actor_id")]
    pub actor_authorities: Vec<String>,

    #[arg(long, requires = "actor_id")]
    pub actor_integration_id: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a city against the local store and the geocoder
    Reconcile {
        #[arg(long)]
        city: String,
        #[arg(long)]
        province_id: Option<i64>,
        #[arg(long)]
        postal: String,
    },
    /// Geocode a postal code and look the city up locally
    FindByPostal { postal: String },
    /// List cities, optionally filtered
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        province_id: Option<i64>,
        #[arg(long)]
        region_id: Option<i64>,
        #[arg(long)]
        hide_disabled: bool,
    },
    /// Full-text search over city names
    Search { query: String },
    /// Show one city
    Get { id: i64 },
}

impl CliConfig {
    pub fn actor(&self) -> Option<Actor> {
        self.actor_id.map(|id| Actor {
            id,
            login: self.actor_login.clone().unwrap_or_default(),
            authorities: self.actor_authorities.clone(),
            integration_id: self.actor_integration_id,
        })
    }
}
