use clap::{Parser, Subcommand};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "mrp-cli")]
#[command(about = "Command-line client for the media ratings API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for authenticated commands
    #[arg(short, long, env = "MRP_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register { username: String, password: String },
    /// Log in and print a bearer token
    Login { username: String, password: String },
    /// Show a user's profile (needs --token)
    Profile { username: String },
    /// End the session for --token
    Logout,
    /// Check server status
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }

    let res = match cli.command {
        Commands::Register { username, password } => {
            client
                .post(format!("{}/api/users/register", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::Login { username, password } => {
            client
                .post(format!("{}/api/users/login", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::Profile { username } => {
            client
                .get(format!(
                    "{}/api/users/{}/profile",
                    cli.url,
                    utf8_percent_encode(&username, NON_ALPHANUMERIC)
                ))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Logout => {
            client
                .post(format!("{}/api/users/logout", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text)
        .and_then(|json| serde_json::to_string_pretty(&json))
        .unwrap_or(text);

    if status.is_success() {
        println!("{body}");
    } else {
        eprintln!("Error: server returned status {status}");
        eprintln!("{body}");
        std::process::exit(1);
    }
    Ok(())
}
