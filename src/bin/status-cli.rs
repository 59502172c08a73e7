use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "status-cli")]
#[command(about = "Command-line client for the status API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Bearer token; falls back to API_SECRET_KEY.
    #[arg(short, long, env = "API_SECRET_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service and store health
    Health,
    /// Record a status check for a client
    Create {
        /// Client name (letters, digits, spaces, hyphens, underscores)
        client_name: String,
    },
    /// List recent status checks, newest first
    List {
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Create { client_name } => {
            client
                .post(format!("{base}/status"))
                .headers(headers)
                .json(&json!({ "client_name": client_name }))
                .send()
                .await?
        }
        Commands::List { limit } => {
            let mut req = client.get(format!("{base}/status")).headers(headers);
            if let Some(limit) = limit {
                req = req.query(&[("limit", limit)]);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(retry) = res.headers().get("retry-after") {
        eprintln!("Rate limited, retry after {}s", retry.to_str().unwrap_or("?"));
    }

    let body = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => body,
    };

    if status.is_success() {
        println!("{rendered}");
        Ok(())
    } else {
        eprintln!("Error: API returned status {status}");
        eprintln!("{rendered}");
        std::process::exit(1);
    }
}
