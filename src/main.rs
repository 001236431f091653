use city_service::adapters::seed;
use city_service::utils::error::ErrorSeverity;
use city_service::utils::{logger, validation::Validate};
use city_service::{
    CityDto, CityService, CliConfig, Command, InMemoryCityStore, InMemorySearchIndex, Resolution,
    ServiceError, TomlConfig,
};
use clap::Parser;

fn exit_code(e: &ServiceError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: ServiceError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e).max(1));
}

fn print_cities(cities: &[city_service::City], json: bool) -> anyhow::Result<()> {
    if json {
        let dtos: Vec<CityDto> = cities.iter().map(CityDto::from).collect();
        println!("{}", serde_json::to_string_pretty(&dtos)?);
        return Ok(());
    }
    if cities.is_empty() {
        println!("No cities found");
    }
    for city in cities {
        let region = city.region.as_ref().map(|r| r.name.as_str()).unwrap_or("-");
        let province = city.province().map(|p| p.abbrev.as_str()).unwrap_or("-");
        let disabled = if city.disabled { " (disabled)" } else { "" };
        println!(
            "{:>6}  {}  [{} / {}]{}",
            city.id.map(|id| id.to_string()).unwrap_or_default(),
            city.name,
            region,
            province,
            disabled
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // Load the TOML configuration
    let config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(config.log_format(), cli.verbose || config.verbose());
    tracing::info!("🚀 Starting {}", config.service.name);

    if let Err(e) = config.validate() {
        fail(e);
    }

    let store = InMemoryCityStore::new();
    let index = InMemorySearchIndex::new();
    let geocoder = config.build_geocoder().unwrap_or_else(|e| fail(e));
    let service = CityService::new(store, index, geocoder);

    if let Some(seed_file) = cli.seed_file.as_deref().or(config.seed_file()) {
        seed::seed_service(&service, seed_file)
            .await
            .unwrap_or_else(|e| fail(e));
    }

    let actor = cli.actor();

    match &cli.command {
        Command::Reconcile {
            city,
            province_id,
            postal,
        } => {
            let outcome = service
                .reconcile(city, *province_id, postal, actor.as_ref())
                .await;
            if cli.json {
                let source = match &outcome.resolution {
                    Resolution::Local(_) => "local",
                    Resolution::External(_) => "external",
                    Resolution::NotFound => "not_found",
                };
                let body = serde_json::json!({
                    "source": source,
                    "branch": outcome.branch,
                    "issue": outcome.branch.issue(),
                    "city": outcome.resolution.clone().into_dto(),
                    "diagnostics": outcome.diagnostics,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("🔎 {:?}: {}", outcome.branch, outcome.branch.message());
                match &outcome.resolution {
                    Resolution::Local(city) => println!("✅ local: {}", city.name),
                    Resolution::External(city) => println!("🌐 geocoded: {}", city.name),
                    Resolution::NotFound => println!("❓ no authoritative answer"),
                }
            }
            if outcome.resolution.is_not_found() {
                std::process::exit(4);
            }
        }
        Command::FindByPostal { postal } => {
            let found = service.find_by_postal(postal).await;
            print_cities(found.as_slice(), cli.json)?;
            if found.is_none() {
                std::process::exit(4);
            }
        }
        Command::List {
            query,
            province_id,
            region_id,
            hide_disabled,
        } => {
            let cities = service
                .find_all(query.as_deref(), *province_id, *region_id, *hide_disabled)
                .await
                .unwrap_or_else(|e| fail(e));
            print_cities(&cities, cli.json)?;
        }
        Command::Search { query } => {
            let cities = service.search(query).await.unwrap_or_else(|e| fail(e));
            print_cities(&cities, cli.json)?;
        }
        Command::Get { id } => match service.find_one(*id).await.unwrap_or_else(|e| fail(e)) {
            Some(city) => print_cities(std::slice::from_ref(&city), cli.json)?,
            None => fail(ServiceError::NotFoundError {
                entity: "City".to_string(),
                id: id.to_string(),
            }),
        },
    }

    Ok(())
}
