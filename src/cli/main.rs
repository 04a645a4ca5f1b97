use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use emergency_triage::config::{ClassifierConfig, Config};
use emergency_triage::triage::{MatchStrategy, PriorityClassifier};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;

#[derive(Parser)]
#[command(name = "triage-cli")]
#[command(about = "Emergency Triage CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    endpoint: String,

    /// Bearer token from `login`
    #[arg(short, long, env = "TRIAGE_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a description locally, without a server.
    ///
    /// Thresholds and weights come from the same layered configuration as
    /// the server (`CONFIG_PATH`, `TRIAGE__CLASSIFIER__*`).
    Classify {
        #[arg(value_name = "DESCRIPTION")]
        description: String,

        /// Keyword matching strategy: substring or exact-token; overrides the config
        #[arg(short, long)]
        strategy: Option<MatchStrategy>,
    },

    /// Sign in and print the session token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Report an emergency
    Report {
        #[arg(short = 'T', long = "type")]
        emergency_type: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        location: String,

        /// Leave unset to let the server classify the description
        #[arg(short, long)]
        priority: Option<String>,

        /// Reporter id, needed when no token is given
        #[arg(short, long)]
        user_id: Option<String>,
    },

    /// List emergencies
    List {
        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        /// Only emergencies reported by this user
        #[arg(short, long)]
        user_id: Option<String>,

        #[arg(short, long)]
        responder: Option<String>,
    },

    /// Change an emergency's status or responder
    Update {
        #[arg(value_name = "EMERGENCY_ID")]
        id: String,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        responder: Option<String>,
    },

    /// Check server health
    Health,
}

/// Classifier settings from the layered config, with an optional strategy override
fn classifier_config(strategy: Option<MatchStrategy>) -> anyhow::Result<ClassifierConfig> {
    let mut config = Config::load()
        .context("Failed to load configuration")?
        .classifier;
    if let Some(strategy) = strategy {
        config.match_strategy = strategy;
    }
    Ok(config)
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn print_body(response: Response) -> anyhow::Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let token = cli.token.as_deref();

    match cli.command {
        Commands::Classify {
            description,
            strategy,
        } => {
            let classifier = PriorityClassifier::new(classifier_config(strategy)?);
            let classification = classifier.classify(&description)?;
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }

        Commands::Login { username, password } => {
            let response = client
                .post(format!("{}/api/auth/login", cli.endpoint))
                .json(&json!({
                    "username": username,
                    "password": password,
                }))
                .send()
                .await?;

            print_body(response).await?;
        }

        Commands::Report {
            emergency_type,
            description,
            location,
            priority,
            user_id,
        } => {
            if token.is_none() && user_id.is_none() {
                bail!("Either --token or --user-id is required");
            }

            let mut body = json!({
                "type": emergency_type,
                "description": description,
                "location": location,
            });
            if let Some(priority) = priority {
                body["priority"] = json!(priority);
            }
            if let Some(user_id) = user_id {
                body["userId"] = json!(user_id);
            }

            let request = client
                .post(format!("{}/api/emergencies", cli.endpoint))
                .json(&body);
            let response = authorize(request, token).send().await?;

            print_body(response).await?;
        }

        Commands::List {
            status,
            priority,
            user_id,
            responder,
        } => {
            let mut query = Vec::new();
            if let Some(status) = status {
                query.push(("status", status));
            }
            if let Some(priority) = priority {
                query.push(("priority", priority));
            }
            if let Some(user_id) = user_id {
                query.push(("user_id", user_id));
            }
            if let Some(responder) = responder {
                query.push(("responder", responder));
            }

            let request = client
                .get(format!("{}/api/emergencies", cli.endpoint))
                .query(&query);
            let response = authorize(request, token).send().await?;

            print_body(response).await?;
        }

        Commands::Update {
            id,
            status,
            responder,
        } => {
            if status.is_none() && responder.is_none() {
                bail!("Nothing to update: pass --status and/or --responder");
            }

            let request = client
                .put(format!("{}/api/emergencies/{}", cli.endpoint, id))
                .json(&json!({
                    "status": status,
                    "responder": responder,
                }));
            let response = authorize(request, token).send().await?;

            print_body(response).await?;
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            print_body(response).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_accepts_user_filter() {
        let cli = Cli::try_parse_from([
            "triage-cli",
            "list",
            "--user-id",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "--status",
            "pending",
        ])
        .unwrap();

        match cli.command {
            Commands::List {
                user_id, status, ..
            } => {
                assert_eq!(user_id.as_deref(), Some("67e55044-10b1-426f-9247-bb680e5fe0c8"));
                assert_eq!(status.as_deref(), Some("pending"));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_classify_strategy_is_optional() {
        let cli = Cli::try_parse_from(["triage-cli", "classify", "fire"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { strategy: None, .. }));

        let cli =
            Cli::try_parse_from(["triage-cli", "classify", "fire", "--strategy", "exact-token"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Classify {
                strategy: Some(MatchStrategy::ExactToken),
                ..
            }
        ));
    }

    #[test]
    fn test_classifier_config_follows_layered_config() {
        let loaded = Config::load().unwrap().classifier;

        let config = classifier_config(None).unwrap();
        assert_eq!(config.match_strategy, loaded.match_strategy);
        assert_eq!(config.high_threshold, loaded.high_threshold);
        assert_eq!(config.sentiment_weight, loaded.sentiment_weight);

        let config = classifier_config(Some(MatchStrategy::ExactToken)).unwrap();
        assert_eq!(config.match_strategy, MatchStrategy::ExactToken);
        assert_eq!(config.medium_threshold, loaded.medium_threshold);
    }
}
