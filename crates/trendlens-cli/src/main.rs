//! TrendLens CLI - federated search over social analytics data

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trendlens_core::api::{ErrorEnvelope, SearchRequest};
use trendlens_core::config::Config;
use trendlens_core::domain::search::{
    EntityType, HistoryRecorder, SearchEngine, SearchFilters, SearchResponse, SortBy, SortOrder,
    SqliteHistoryRecorder,
};
use trendlens_core::storage::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "trendlens")]
#[command(author, version, about = "Federated search over social analytics data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Database file path (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// User to act as
    #[arg(long, global = true, default_value = "local")]
    user: String,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search
    Search {
        /// Search text
        query: String,

        /// Scope: "all" or an entity type (tag, post, trend, ...)
        #[arg(short, long, default_value = "all")]
        scope: String,

        /// Comma-separated type allow-list (e.g. "tag,post")
        #[arg(short, long)]
        types: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        /// Sort key (relevance, date, alphabetical)
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        order: Option<String>,

        /// Minimum relevance score (0-100)
        #[arg(long)]
        min_relevance: Option<f64>,

        /// Inclusive lower bound of the date window (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Inclusive upper bound of the date window (RFC 3339)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show recent searches
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Populate the database with demo data
    Seed,

    /// Run health check
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trendlens=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let db_config = match &cli.db {
        Some(path) => DatabaseConfig::with_path(path),
        None => DatabaseConfig::default(),
    };
    let db = Database::new(db_config).await?;
    let config = Config::load()?;

    match cli.command {
        Commands::Search {
            query,
            scope,
            types,
            limit,
            sort,
            order,
            min_relevance,
            from,
            to,
        } => {
            let filters = build_filters(types, sort, order, min_relevance, from, to)?;
            cmd_search(
                &db,
                &config,
                &cli.user,
                query,
                scope,
                filters,
                limit,
                cli.format,
                cli.quiet,
            )
            .await
        }

        Commands::History { limit } => cmd_history(&db, &cli.user, limit, cli.format).await,

        Commands::Seed => cmd_seed(&db, &cli.user, cli.quiet).await,

        Commands::Doctor => cmd_doctor(&db, cli.quiet).await,
    }
}

fn build_filters(
    types: Option<String>,
    sort: Option<String>,
    order: Option<String>,
    min_relevance: Option<f64>,
    from: Option<String>,
    to: Option<String>,
) -> anyhow::Result<SearchFilters> {
    let mut filters = SearchFilters::default();

    if let Some(types) = types {
        for name in types.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let entity_type = EntityType::parse(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown entity type '{}'", name))?;
            filters.types.push(entity_type);
        }
    }

    if let Some(sort) = sort {
        filters.sort_by =
            SortBy::parse(&sort).ok_or_else(|| anyhow::anyhow!("Unknown sort key '{}'", sort))?;
    }
    if let Some(order) = order {
        filters.sort_order = SortOrder::parse(&order)
            .ok_or_else(|| anyhow::anyhow!("Unknown sort order '{}'", order))?;
    }

    filters.min_relevance = min_relevance;
    filters.date_from = from.as_deref().map(parse_date).transpose()?;
    filters.date_to = to.as_deref().map(parse_date).transpose()?;

    Ok(filters)
}

fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Invalid RFC 3339 date '{}': {}", s, e))
}

// ============================================================================
// Command Implementations
// ============================================================================

#[allow(clippy::too_many_arguments)]
async fn cmd_search(
    db: &Database,
    config: &Config,
    user: &str,
    query: String,
    scope: String,
    filters: SearchFilters,
    limit: Option<u32>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let request = SearchRequest {
        query,
        scope: Some(scope),
        filters: Some(filters),
        result_limit: limit,
    };

    let engine = SearchEngine::new(db.pool().clone(), config.search.clone());
    let outcome = match request.into_query(&config.search) {
        Ok(q) => engine.dispatch(&q, user).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(response) => {
            print_response(&response, format, quiet)?;
            Ok(())
        }
        Err(e) => {
            if let OutputFormat::Json = format {
                println!("{}", serde_json::to_string_pretty(&ErrorEnvelope::from_error(&e))?);
                std::process::exit(1);
            }
            Err(e.into())
        }
    }
}

fn print_response(
    response: &SearchResponse,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text => {
            if response.results.is_empty() {
                println!("No results.");
            } else {
                for r in &response.results {
                    println!(
                        "  [{:>5.1}] {} - {}{}",
                        r.relevance_score,
                        r.entity_type,
                        r.title,
                        if r.subtitle.is_empty() {
                            String::new()
                        } else {
                            format!(" ({})", r.subtitle)
                        }
                    );
                }
            }
            if !quiet {
                println!(
                    "\n{} of {} merged results after filters, {}ms",
                    response.results.len(),
                    response.total_count,
                    response.execution_time_ms
                );
                if !response.insights.suggested_terms.is_empty() {
                    println!("Try also: {}", response.insights.suggested_terms.join(", "));
                }
                if !response.insights.related_queries.is_empty() {
                    println!("Related: {}", response.insights.related_queries.join(" | "));
                }
            }
        }
    }
    Ok(())
}

async fn cmd_history(
    db: &Database,
    user: &str,
    limit: u32,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let recorder = SqliteHistoryRecorder::new(db.pool().clone());
    let entries = recorder.recent(user, limit).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No search history.");
            } else {
                for entry in entries {
                    let count = entry
                        .result_count
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!(
                        "  {} \"{}\" ({} results)",
                        entry.executed_at.format("%Y-%m-%d %H:%M:%S"),
                        entry.query,
                        count
                    );
                }
            }
        }
    }
    Ok(())
}

async fn cmd_seed(db: &Database, user: &str, quiet: bool) -> anyhow::Result<()> {
    let pool = db.pool();

    let rows: &[(&str, &str)] = &[
        (
            "INSERT OR IGNORE INTO tags (id, user_id, name, category, usage_count) VALUES (?, ?, 'growthhacks', 'marketing', 42)",
            "seed-tag-1",
        ),
        (
            "INSERT OR IGNORE INTO tags (id, user_id, name, category, usage_count) VALUES (?, ?, 'fitnessjourney', 'fitness', 17)",
            "seed-tag-2",
        ),
        (
            "INSERT OR IGNORE INTO content_items (id, user_id, title, caption, media_type, like_count, comment_count) VALUES (?, ?, 'Account Growth Report', 'How we doubled reach in a quarter', 'carousel', 320, 41)",
            "seed-content-1",
        ),
        (
            "INSERT OR IGNORE INTO trends (id, user_id, topic, description, momentum) VALUES (?, ?, 'Growth Trend Analysis', 'Audience growth tactics gaining traction', 4.2)",
            "seed-trend-1",
        ),
        (
            "INSERT OR IGNORE INTO posts (id, user_id, caption, hashtags, like_count) VALUES (?, ?, 'Our growth story so far', '#growth #startup', 128)",
            "seed-post-1",
        ),
        (
            "INSERT OR IGNORE INTO competitors (id, user_id, name, handle, follower_count) VALUES (?, ?, 'GrowthLab', '@growthlab', 88000)",
            "seed-competitor-1",
        ),
        (
            "INSERT OR IGNORE INTO notable_accounts (id, user_id, username, niche, follower_count, engagement_rate) VALUES (?, ?, 'growthguru', 'marketing', 240000, 3.4)",
            "seed-notable-1",
        ),
        (
            "INSERT OR IGNORE INTO accounts (id, user_id, username, display_name, platform, follower_count, media_count) VALUES (?, ?, 'trendlens_demo', 'TrendLens Demo', 'instagram', 1200, 85)",
            "seed-account-1",
        ),
        (
            "INSERT OR IGNORE INTO analytics_snapshots (id, user_id, period_label, summary, follower_delta, engagement_rate) VALUES (?, ?, 'Q2 growth', 'Follower growth up 12% quarter over quarter', 1450, 2.8)",
            "seed-snapshot-1",
        ),
        (
            "INSERT OR IGNORE INTO team_members (id, user_id, name, role, email) VALUES (?, ?, 'Alex Rivera', 'editor', 'alex@example.com')",
            "seed-member-1",
        ),
    ];

    for (sql, id) in rows {
        sqlx::query(sql).bind(id).bind(user).execute(pool).await?;
    }

    if !quiet {
        println!("Seeded {} demo records for user '{}'.", rows.len(), user);
        println!("\nTry: trendlens search growth");
    }
    Ok(())
}

async fn cmd_doctor(db: &Database, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Running health checks...\n");
    }

    print!("Database connection... ");
    db.health_check().await?;
    println!("ok ({})", db.path().display());

    print!("Schema migrations... ");
    let status = db.migration_status().await?;
    if status.needs_migration {
        println!(
            "behind (version {} of {})",
            status.current_version, status.target_version
        );
    } else {
        println!("up to date (version {})", status.current_version);
    }

    print!("Config file... ");
    match Config::config_file() {
        Ok(path) if path.exists() => println!("ok ({})", path.display()),
        Ok(path) => println!("using defaults ({} not present)", path.display()),
        Err(e) => println!("unavailable ({})", e),
    }

    Ok(())
}
