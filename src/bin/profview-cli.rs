use std::path::PathBuf;

use clap::{Parser, Subcommand};
use profview::resolve::{decode_series, encode_series, parse_selector};
use url::Url;

#[derive(Parser)]
#[command(name = "profview-cli")]
#[command(about = "Build, fetch and inspect profile snapshot view URLs", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10902")]
    url: String,

    #[arg(short, long, default_value = "/pprof")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the view URL for a series selector and timestamp
    Url {
        /// Series selector, e.g. '{job="api",profile_type="heap"}'
        selector: String,
        /// Timestamp in milliseconds
        timestamp: i64,
        /// View sub-path, e.g. /goroutines
        #[arg(default_value = "")]
        view: String,
    },
    /// Fetch a view and write the body to stdout or a file
    Fetch {
        selector: String,
        timestamp: i64,
        #[arg(default_value = "")]
        view: String,
        /// Write the body here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a series token back into its selector
    Decode {
        token: String,
        /// Label naming the profile type
        #[arg(long, default_value = "profile_type")]
        profile_type_label: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check server liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = Url::parse(&cli.url)?;

    match cli.command {
        Commands::Url {
            selector,
            timestamp,
            view,
        } => {
            println!("{}", view_url(&base, &cli.prefix, &selector, timestamp, &view)?);
        }
        Commands::Fetch {
            selector,
            timestamp,
            view,
            output,
        } => {
            let url = view_url(&base, &cli.prefix, &selector, timestamp, &view)?;
            let res = reqwest::get(url).await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: server returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                std::process::exit(1);
            }
            let body = res.bytes().await?;
            match output {
                Some(path) => tokio::fs::write(&path, &body).await?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&body)?;
                }
            }
        }
        Commands::Decode {
            token,
            profile_type_label,
            json,
        } => {
            let selector = decode_series(&token, &profile_type_label)?;
            if json {
                let matchers: Vec<_> = selector
                    .matchers()
                    .iter()
                    .map(|m| serde_json::json!({ "name": m.name, "value": m.value }))
                    .collect();
                let value = serde_json::json!({
                    "matchers": matchers,
                    "profile_type": selector.profile_type(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", selector);
            }
        }
        Commands::Health => {
            let res = reqwest::get(base.join("/healthz")?).await?;
            println!("{} {}", res.status(), res.text().await?);
        }
    }

    Ok(())
}

/// Build `{base}{prefix}/{token}/{timestamp}{view}` after checking the selector parses.
fn view_url(
    base: &Url,
    prefix: &str,
    selector: &str,
    timestamp: i64,
    view: &str,
) -> Result<Url, Box<dyn std::error::Error>> {
    parse_selector(selector)?;
    let view = if view.is_empty() || view.starts_with('/') {
        view.to_string()
    } else {
        format!("/{view}")
    };
    let path = format!(
        "{}/{}/{}{}",
        prefix.trim_end_matches('/'),
        encode_series(selector),
        timestamp,
        view
    );
    Ok(base.join(&path)?)
}
