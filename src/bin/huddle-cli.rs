use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "huddle-cli")]
#[command(about = "Management CLI for the huddle backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active huddles
    List,
    /// Start a huddle on a derived channel
    Create {
        created_by: String,
    },
    /// Add a participant to a huddle
    Join {
        huddle_id: String,
        user_id: String,
    },
    /// Remove a participant from a huddle
    Leave {
        huddle_id: String,
        user_id: String,
    },
    /// End a huddle by id
    End {
        huddle_id: String,
    },
    /// End the huddle on a channel
    EndChannel {
        channel_name: String,
    },
    /// Request an RTC token (creates the channel's huddle if needed)
    Token {
        channel_name: String,
        uid: String,
        #[arg(long, default_value = "publisher")]
        role: String,
        #[arg(long, default_value = "userAccount")]
        token_type: String,
        #[arg(long)]
        expiry: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.as_str();

    let res = match cli.command {
        Commands::List => client.get(endpoint(base, &["huddles"])?).send().await?,
        Commands::Create { created_by } => {
            client
                .post(endpoint(base, &["huddle", "create"])?)
                .json(&json!({ "created_by": created_by }))
                .send()
                .await?
        }
        Commands::Join { huddle_id, user_id } => {
            client
                .post(endpoint(base, &["huddle", "join"])?)
                .json(&json!({ "huddle_id": huddle_id, "user_id": user_id }))
                .send()
                .await?
        }
        Commands::Leave { huddle_id, user_id } => {
            client
                .post(endpoint(base, &["huddle", "leave"])?)
                .json(&json!({ "huddle_id": huddle_id, "user_id": user_id }))
                .send()
                .await?
        }
        Commands::End { huddle_id } => {
            client
                .post(endpoint(base, &["huddle", "end"])?)
                .json(&json!({ "huddle_id": huddle_id }))
                .send()
                .await?
        }
        Commands::EndChannel { channel_name } => {
            client
                .delete(endpoint(base, &["huddles", channel_name.as_str()])?)
                .send()
                .await?
        }
        Commands::Token {
            channel_name,
            uid,
            role,
            token_type,
            expiry,
        } => {
            let mut req = client.get(endpoint(
                base,
                &["rtc", channel_name.as_str(), role.as_str(), token_type.as_str(), uid.as_str()],
            )?);
            if let Some(expiry) = expiry {
                req = req.query(&[("expiry", expiry)]);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

/// `base` extended by percent-encoded path segments.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: huddle API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
