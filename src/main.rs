use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use estate_search::config::AppConfig;
use estate_search::filter::{apply_filters, PropertyFilter};
use estate_search::models::{ListingType, Property, PropertyType};
use estate_search::repository::{
    fetch_all_active, fetch_all_filtered, InMemoryPropertyRepository, PropertyRepository,
    RestPropertyRepository,
};
use estate_search::search::{search_properties, select_strategy, MatcherKind};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estate-search")]
#[command(about = "Search and filter property listings", long_about = None)]
struct Cli {
    /// Read listings from a JSON file instead of the backend
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Free-text search over active listings
    Search {
        /// Query words, e.g. `$350000`, `pool gym`, `main street`
        query: Vec<String>,
    },
    /// Narrow active listings with structured criteria
    Filter {
        #[arg(long = "type", value_parser = parse_property_type)]
        property_type: Vec<PropertyType>,
        #[arg(long = "listing", value_parser = parse_listing_type)]
        listing_type: Option<ListingType>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        bedrooms: Vec<u32>,
        #[arg(long)]
        bathrooms: Vec<f32>,
        #[arg(long)]
        min_area: Option<f64>,
        #[arg(long)]
        max_area: Option<f64>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Let the store apply the filter instead of filtering locally
        #[arg(long)]
        remote: bool,
    },
    /// Show one listing with agent and images, counting a view
    Show { id: String },
    /// List featured listings
    Featured {
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
}

fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map_err(|_| format!("unknown property type '{}'", raw))
}

fn parse_listing_type(raw: &str) -> Result<ListingType, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map_err(|_| format!("unknown listing type '{}'", raw))
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Matcher a query will run through; `None` when the query is blank.
fn matcher_for(query: &str) -> Option<MatcherKind> {
    if query.trim().is_empty() {
        None
    } else {
        Some(select_strategy(query))
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn open_repository(
    cli_data: Option<&PathBuf>,
    config: &AppConfig,
) -> Result<Box<dyn PropertyRepository>> {
    if let Some(path) = cli_data {
        let repo = InMemoryPropertyRepository::from_json_file(path)
            .await
            .with_context(|| format!("Failed to load listings from {}", path.display()))?;
        return Ok(Box::new(repo));
    }

    if config.backend_url.is_some() {
        let repo = RestPropertyRepository::from_config(config)
            .context("Failed to create backend client")?;
        return Ok(Box::new(repo));
    }

    warn!("No backend configured and no --data file given");
    info!("Using sample listings...");
    Ok(Box::new(InMemoryPropertyRepository::sample()))
}

fn print_properties(properties: &[Property], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(properties)?);
        return Ok(());
    }

    for (i, property) in properties.iter().enumerate() {
        println!(
            "{}. {} ({} {})",
            i + 1,
            property.title,
            property.price,
            property.currency
        );
        println!(
            "   {} for {}, {} m²",
            property.property_type, property.listing_type, property.area
        );
        if let Some(bedrooms) = property.bedrooms {
            let bathrooms = property
                .bathrooms
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("   {} bed, {} bath", bedrooms, bathrooms);
        }
        println!(
            "   {}, {} {}",
            property.location.address, property.location.city, property.location.state
        );
        if !property.features.is_empty() {
            println!("   Features: {}", property.features.join(", "));
        }
        println!("   ID: {}", property.id);
        println!();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to read configuration")?;
    init_logging(&config);

    let cli = Cli::parse();
    let repository = open_repository(cli.data.as_ref(), &config).await?;
    info!("Using {} listing store", repository.source_name());

    match cli.command {
        Commands::Search { query } => {
            let query = query.join(" ");
            let listings = fetch_all_active(repository.as_ref(), config.page_size)
                .await
                .context("Failed to fetch listings")?;

            match matcher_for(&query) {
                Some(matcher) => info!(
                    "Searching {} listings with {} matcher",
                    listings.len(),
                    matcher
                ),
                None => info!("Blank query, listing all {} properties", listings.len()),
            }
            let results = search_properties(&listings, &query, None);
            info!("✅ Found {} matching properties", results.len());
            print_properties(&results, cli.json)?;
        }
        Commands::Filter {
            property_type,
            listing_type,
            min_price,
            max_price,
            bedrooms,
            bathrooms,
            min_area,
            max_area,
            city,
            features,
            remote,
        } => {
            let filter = PropertyFilter {
                property_type: non_empty(property_type),
                listing_type,
                min_price,
                max_price,
                bedrooms: non_empty(bedrooms),
                bathrooms: non_empty(bathrooms),
                min_area,
                max_area,
                city,
                features: non_empty(features),
            };

            let results = if remote {
                fetch_all_filtered(repository.as_ref(), &filter, config.page_size)
                    .await
                    .context("Failed to fetch filtered listings")?
            } else {
                let listings = fetch_all_active(repository.as_ref(), config.page_size)
                    .await
                    .context("Failed to fetch listings")?;
                apply_filters(&listings, &filter)
            };

            info!("✅ {} properties match the filter", results.len());
            print_properties(&results, cli.json)?;
        }
        Commands::Show { id } => {
            let details = repository
                .fetch_by_id(&id)
                .await
                .with_context(|| format!("Failed to fetch property {}", id))?;

            match repository.increment_views(&id).await {
                Ok(views) => info!("Property {} now has {} views", id, views),
                Err(e) => warn!("Could not record view for {}: {}", id, e),
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print_properties(std::slice::from_ref(&details.property), false)?;
                if let Some(agent) = &details.agent {
                    let agency = agent.agency.as_deref().unwrap_or("independent");
                    println!("   Agent: {} ({})", agent.full_name, agency);
                }
                for image in &details.images {
                    println!("   Image: {}", image.url);
                }
            }
        }
        Commands::Featured { limit } => {
            let featured = repository
                .fetch_featured(limit)
                .await
                .context("Failed to fetch featured listings")?;
            print_properties(&featured, cli.json)?;
        }
    }

    Ok(())
}
