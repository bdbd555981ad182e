use clap::{Parser, Subcommand};
use musicbrowse::{Browser, PlayableItem, browser_from_env};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "musicbrowse",
    about = "Search and browse YouTube, Spotify and SoundCloud",
    long_about = "Search, resolve urls and list featured content across YouTube, Spotify and SoundCloud.\n\n\
    Examples:\n\
      musicbrowse search \"daft punk\"                          # Search the default backend\n\
      musicbrowse -b youtube search \"lofi\"                    # Search YouTube\n\
      musicbrowse resolve https://soundcloud.com/artist/track  # Backend picked from the url\n\
      musicbrowse --json featured                              # Featured items as JSON"
)]
struct Args {
    /// Backend to use for search and featured
    #[arg(short = 'b', long = "backend", help = "Backend: youtube, spotify or soundcloud")]
    backend: Option<String>,

    /// Print results as JSON
    #[arg(long = "json", help = "Print results as JSON")]
    json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the active backend
    Search { query: String },
    /// Resolve a url to a single item
    Resolve { url: String },
    /// List featured items of the active backend
    Featured,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "musicbrowse=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn display_items(items: &[PlayableItem]) {
    if items.is_empty() {
        println!("No results.");
        return;
    }

    for (index, item) in items.iter().enumerate() {
        println!("[{}] {}", index + 1, item.title());
        match item {
            PlayableItem::Entry(entry) => {
                println!("    Artist: {}", entry.artist);
                if let Some(duration) = entry.duration {
                    println!("    Duration: {}", format_duration(duration));
                }
            }
            PlayableItem::Playlist(playlist) => {
                println!("    Author: {}", playlist.author);
                if let Some(count) = playlist.entry_count {
                    println!("    Entries: {}", count);
                }
            }
        }
        println!("    Platform: {} ({})", item.platform(), item.kind());
        println!("    URL: {}", item.url());
        println!();
    }
}

async fn run(args: &Args, browser: &Browser) -> musicbrowse::Result<Vec<PlayableItem>> {
    match &args.command {
        Command::Search { query } => browser.search(query).await,
        Command::Featured => browser.featured().await,
        Command::Resolve { url } => browser.resolve_url(url).await.map(|item| vec![item]),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut browser = match browser_from_env() {
        Ok(browser) => browser,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(backend) = args.backend.as_deref()
        && let Err(e) = browser.switch_backend(backend)
    {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let items = match run(&args, &browser).await {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&items) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        display_items(&items);
    }
}
