use clap::{Parser, Subcommand};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use solana_sdk::signature::Signer;
use std::path::PathBuf;

use wallet_server::blockchain::wallet::{generate_keypair, parse_secret_key, secret_to_hex};

#[derive(Parser)]
#[command(name = "wallet-cli")]
#[command(about = "Command-line client for the wallet API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// File holding the session token written by `login`.
    #[arg(short, long, default_value = ".wallet-session")]
    session: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup { username: String, password: String },
    /// Log in and store the session token
    Login { username: String, password: String },
    /// Revoke the stored session token
    Logout,
    /// Show the dashboard greeting
    Dashboard,
    /// Change your username
    Profile { username: String },
    /// Generate a keypair locally (nothing is sent to the server)
    Generate,
    /// Register the wallet derived from a secret key
    Import {
        /// Secret key: hex, base58 or a JSON byte array
        secret: String,
    },
    /// List registered wallets
    Wallets,
    /// Live on-chain balance of an address
    Balance { address: String },
    /// Credit a registered wallet in the ledger
    Deposit { address: String, amount: f64 },
    /// Sign and submit an on-chain transfer
    Send {
        #[arg(long)]
        secret: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    /// Record a transfer between two registered wallets
    Record {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        signature: Option<String>,
    },
    /// Transaction log of one wallet
    History { address: String },
    /// Transfers involving your wallets
    Transactions,
    /// Delete a transfer record
    Delete { id: String },
}

struct Api {
    client: reqwest::Client,
    url: String,
    session: PathBuf,
}

impl Api {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.url, path));
        match std::fs::read_to_string(&self.session) {
            Ok(token) if !token.trim().is_empty() => builder.bearer_auth(token.trim()),
            _ => builder,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        url: cli.url.trim_end_matches('/').to_string(),
        session: cli.session,
    };

    match cli.command {
        Commands::Signup { username, password } => {
            let res = api
                .request(Method::POST, "/auth/signup")
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Login { username, password } => {
            let res = api
                .request(Method::POST, "/auth/login")
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?;
            let body = print_response(res).await?;
            if let Some(token) = body.get("token").and_then(Value::as_str) {
                std::fs::write(&api.session, token)?;
                println!("Session saved to {}", api.session.display());
            }
        }
        Commands::Logout => {
            let res = api.request(Method::POST, "/auth/logout").send().await?;
            // Keep the session file if the server did not confirm.
            print_response(res).await?;
            if api.session.exists() {
                std::fs::remove_file(&api.session)?;
            }
        }
        Commands::Dashboard => {
            let res = api.request(Method::GET, "/auth/dashboard").send().await?;
            print_response(res).await?;
        }
        Commands::Profile { username } => {
            let res = api
                .request(Method::PATCH, "/auth/profile")
                .json(&json!({ "username": username }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Generate => {
            let keypair = generate_keypair();
            println!("Address: {}", keypair.pubkey());
            println!("Secret:  {}", secret_to_hex(&keypair));
            println!("Keep the secret safe; it cannot be recovered.");
        }
        Commands::Import { secret } => {
            let keypair = parse_secret_key(&secret)?;
            let res = api
                .request(Method::POST, "/auth/wallets")
                .json(&json!({ "publicKey": keypair.pubkey().to_string() }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Wallets => {
            let res = api.request(Method::GET, "/auth/wallets").send().await?;
            print_response(res).await?;
        }
        Commands::Balance { address } => {
            let res = api
                .request(Method::POST, "/auth/check-balance")
                .json(&json!({ "walletAddress": address }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Deposit { address, amount } => {
            let res = api
                .request(Method::POST, "/auth/deposit")
                .json(&json!({ "walletAddress": address, "amount": amount }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Send { secret, to, amount } => {
            let res = api
                .request(Method::POST, "/api/send-transaction")
                .json(&json!({
                    "senderPrivateKey": secret,
                    "recipientAddress": to,
                    "amount": amount,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Record {
            from,
            to,
            amount,
            signature,
        } => {
            let res = api
                .request(Method::POST, "/auth/send-transaction")
                .json(&json!({
                    "senderAddress": from,
                    "recipientAddress": to,
                    "amount": amount,
                    "signature": signature,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::History { address } => {
            let res = api
                .request(Method::GET, &format!("/auth/wallet/{}/transactions", address))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Transactions => {
            let res = api.request(Method::GET, "/auth/transactions").send().await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = api
                .request(Method::DELETE, &format!("/auth/transaction/{}", id))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Pretty-print the body. An error status becomes an `Err`, so the process
/// exits non-zero.
async fn print_response(res: reqwest::Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if !status.is_success() {
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        return Err(format!("API returned status {}", status).into());
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let err = print_response(response(401, r#"{"error":"Invalid token"}"#))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let body = print_response(response(200, r#"{"token":"abc"}"#))
            .await
            .unwrap();
        assert_eq!(body["token"], "abc");

        let body = print_response(response(200, "plain")).await.unwrap();
        assert_eq!(body, Value::String("plain".into()));
    }
}
