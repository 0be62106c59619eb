use advodir_client::{HttpFetcher, Pager, QueryCache};
use advodir_core::config::Config;
use advodir_core::store::{load_roster, open_store};
use advodir_core::{Advocate, SearchExecutor, SearchRequest};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "advodir", version, about = "Advocate directory: paginated roster search")]
struct Cli {
    /// Write debug logs to /tmp/advodir-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Config file to use instead of ~/.config/advodir/config.toml.
    #[arg(long, global = true, env = "ADVODIR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the roster search API.
    Serve {
        /// Address to listen on; overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Append advocates from a JSON array file to the store.
    Import {
        file: PathBuf,
    },
    /// Run one search and print the JSON response.
    Search {
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<String>,
        /// Substring matched against first name, last name, city and degree.
        term: Option<String>,
    },
    /// Page through a running server's matches and print them as a table.
    Browse {
        /// Base URL of the server, e.g. http://127.0.0.1:3000.
        #[arg(long)]
        url: String,
        #[arg(long)]
        page_size: Option<String>,
        term: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    tracing::debug!(?config, "config loaded");

    match cli.command {
        Command::Serve { bind } => {
            let store = open_store(&config.store).await.context("opening store")?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let executor =
                Arc::new(SearchExecutor::new(store).with_timeout(config.store.timeout()));
            let app = advodir::router(executor, config.search.clone());
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("binding {bind}"))?;
            advodir::serve(listener, app).await?;
        }
        Command::Import { file } => {
            let store = open_store(&config.store).await.context("opening store")?;
            let records = load_roster(&file)?;
            let imported = store.import(records).await?;
            tracing::info!(count = imported.len(), backend = ?store.backend(), "import complete");
            println!("imported {} advocates", imported.len());
        }
        Command::Search {
            page,
            page_size,
            term,
        } => {
            let request = SearchRequest::from_params(
                page.as_deref(),
                page_size.as_deref(),
                term.as_deref(),
                &config.search,
            );
            let store = open_store(&config.store).await.context("opening store")?;
            let executor = SearchExecutor::new(store).with_timeout(config.store.timeout());
            let response = executor.execute(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Browse {
            url,
            page_size,
            term,
        } => {
            let size = SearchRequest::from_params(None, page_size.as_deref(), None, &config.search)
                .page_size();
            browse(HttpFetcher::new(url), size, term.as_deref().unwrap_or("")).await?;
        }
    }

    Ok(())
}

/// Walk every page of `term` through the client cache, one table row per
/// advocate.
async fn browse(fetcher: HttpFetcher, page_size: u32, term: &str) -> anyhow::Result<()> {
    let cache = QueryCache::new(fetcher);
    let mut pager = Pager::new(page_size);
    pager.set_search(term);

    println!(
        "{:<12} {:<14} {:<16} {:<6} {:<28} {:>5}  {}",
        "FIRST", "LAST", "CITY", "DEGREE", "SPECIALTIES", "YEARS", "PHONE"
    );
    loop {
        let response = cache
            .get(pager.request())
            .await
            .with_context(|| {
                format!("fetching page {} from {}", pager.page(), cache.fetcher().base())
            })?;
        pager.observe(&response);
        for advocate in &response.data {
            println!("{}", row(advocate));
        }
        if !pager.next() {
            break;
        }
    }
    println!(
        "page {} of {} ({} advocates)",
        pager.page(),
        pager.total_pages(),
        cache.placeholder().map_or(0, |r| r.total_items)
    );
    Ok(())
}

fn row(a: &Advocate) -> String {
    format!(
        "{:<12} {:<14} {:<16} {:<6} {:<28} {:>5}  {}",
        a.first_name,
        a.last_name,
        a.city,
        a.degree,
        a.specialties.join(", "),
        a.years_of_experience,
        a.phone_number
    )
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/advodir-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("advodir debug log started, tail -f /tmp/advodir-debug.log");
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
    Ok(())
}
