use clap::{Args, Parser, Subcommand};
use searchui::{ActionError, App, ExportOutcome, SendOutcome};
use searchui_core::config::Config;
use searchui_core::message::MessageOutcome;
use searchui_core::{FacetFilter, SearchState};
use searchui_net::{HttpMessageTarget, SearchClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "searchui", about = "Export search results or hand them to a webplayer")]
struct Cli {
    /// Config file to use instead of ~/.config/searchui/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write debug logs to /tmp/searchui-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the query and write every field of every hit to a CSV file.
    Export(QueryArgs),
    /// Run the query and post the display field of every hit to the webplayer.
    Send(QueryArgs),
    /// List the city cards for the query.
    Cities(QueryArgs),
    /// Rate the city at a result position.
    Rate {
        #[command(flatten)]
        query: QueryArgs,
        /// Zero-based position in the result list.
        #[arg(long)]
        position: usize,
        /// Star rating, 1 to 5.
        #[arg(long)]
        rating: u8,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Free-text query. `*:*` or empty is rejected.
    #[arg(short, long, default_value = "*:*")]
    query: String,
    /// Extra filter appended after the geo-filters.
    #[arg(long)]
    filter: Option<String>,
    /// Geo-filter, repeatable.
    #[arg(long = "geo-filter")]
    geo_filters: Vec<String>,
    /// Facet selection as `facet=bucket`, repeatable.
    #[arg(long = "facet", value_parser = parse_facet_filter)]
    facet_filters: Vec<FacetFilter>,
    /// Sort as `field:ASC|DESC`, repeatable.
    #[arg(long)]
    sort: Vec<String>,
    #[arg(long)]
    relevancy_model: Option<String>,
}

impl QueryArgs {
    fn state(&self) -> SearchState {
        SearchState {
            query: self.query.clone(),
            geo_filters: (!self.geo_filters.is_empty()).then(|| self.geo_filters.clone()),
            facet_filters: self.facet_filters.clone(),
            sort: self.sort.clone(),
            relevancy_model: self.relevancy_model.clone(),
        }
    }
}

fn parse_facet_filter(s: &str) -> Result<FacetFilter, String> {
    let (facet, bucket) = s
        .split_once('=')
        .ok_or_else(|| format!("expected facet=bucket, got {s:?}"))?;
    Ok(FacetFilter {
        facet_name: facet.to_string(),
        bucket_label: bucket.to_string(),
        filter: format!("{facet}:FACET(\"{bucket}\")"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let backend = SearchClient::new(&config);
    let app = App::new(config, backend, HttpMessageTarget::new());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let result = match &cli.command {
        Command::Export(args) => app.export(&args.state(), args.filter.clone()).await.map(|o| {
            match o {
                ExportOutcome::Written(d) => match d.path {
                    Some(path) => eprintln!("exported to {}", path.display()),
                    None => eprintln!("exported {} bytes", d.bytes),
                },
                ExportOutcome::Empty => eprintln!("nothing to export"),
                ExportOutcome::Superseded => {}
            }
            ExitCode::SUCCESS
        }),
        Command::Send(args) => app
            .send_to_webplayer(&args.state(), args.filter.clone(), &cancel)
            .await
            .map(|o| match o {
                SendOutcome::Sent(MessageOutcome::Webplayer) => {
                    eprintln!("sent to webplayer");
                    ExitCode::SUCCESS
                }
                SendOutcome::Sent(MessageOutcome::LocalPort(port)) => {
                    eprintln!("sent to local port {port}");
                    ExitCode::SUCCESS
                }
                SendOutcome::Sent(_) => {
                    eprintln!("no webplayer accepted the results");
                    ExitCode::FAILURE
                }
                SendOutcome::Superseded => {
                    eprintln!("results superseded by a newer search, nothing sent");
                    ExitCode::SUCCESS
                }
            }),
        Command::Cities(args) => app.cities(&args.state(), args.filter.clone()).await.map(|cards| {
            for card in cards {
                let (lon, lat) = card.center;
                println!("#{} {} ({lat:.4}, {lon:.4})", card.position, card.title);
                println!("    {}", card.summary);
            }
            ExitCode::SUCCESS
        }),
        Command::Rate { query, position, rating } => app
            .rate_city(&query.state(), query.filter.clone(), *position, *rating)
            .await
            .map(|recorded| {
                if !recorded {
                    eprintln!("document does not accept ratings");
                }
                ExitCode::SUCCESS
            }),
    };

    match result {
        Ok(code) => Ok(code),
        Err(ActionError::Validation(e)) => {
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };
    if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/searchui-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter("debug"))
            .init();
        tracing::info!("searchui debug log started — tail -f /tmp/searchui-debug.log");
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn"))
            .init();
    }
    Ok(())
}
