use crate::Config;
use crate::access::{self, Decision, PathClass};
use crate::app::services;
use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands};
use crate::pipeline::{MESSAGE_FIELD, MessageOutcome, RawFields, USER_ID_FIELD, UserId};
use crate::store::ConversationTurn;
use anyhow::{Result, bail};
use serde_json::Value;

fn send_fields(user: String, message: String) -> RawFields {
    let mut fields = RawFields::new();
    fields.insert(MESSAGE_FIELD.to_string(), Value::String(message));
    fields.insert(USER_ID_FIELD.to_string(), Value::String(user));
    fields
}

fn render_outcome(outcome: &MessageOutcome) -> String {
    let mut lines = vec![format!("sentiment: {}", outcome.sentiment)];
    if !outcome.ai_message.is_empty() {
        lines.push(outcome.ai_message.clone());
    }
    if !outcome.referral_message.is_empty() {
        lines.push(outcome.referral_message.clone());
    }
    lines.join("\n")
}

fn render_turn(turn: &ConversationTurn) -> String {
    let stamp = turn.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut rendered = format!("[{stamp}] ({}) you: {}", turn.sentiment, turn.user_message);
    if !turn.ai_message.is_empty() {
        rendered.push_str(&format!("\n{:>28} {}", "ai:", turn.ai_message));
    }
    rendered
}

fn render_decision(path: &str, authenticated: bool, decision: Decision) -> String {
    let class = PathClass::of(path);
    let state = if authenticated {
        "signed in"
    } else {
        "signed out"
    };
    match decision {
        Decision::Allow => format!("{path} ({class}, {state}): allow"),
        Decision::Redirect { target } => {
            format!("{path} ({class}, {state}): redirect -> {target}")
        }
    }
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            crate::gateway::run_gateway(&host, port, config).await
        }

        Commands::Send { user, message } => {
            let services = services::shared(&config).await?;
            match services.pipeline.run(&send_fields(user, message)).await {
                Ok(outcome) => {
                    println!("{}", render_outcome(&outcome));
                    Ok(())
                }
                Err(failure) => {
                    tracing::debug!(stage = %failure.stage, error = %failure.error, "send failed");
                    bail!(failure.user_message())
                }
            }
        }

        Commands::History { user } => {
            let user_id = UserId::parse(&user).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let services = services::shared(&config).await?;
            let turns = services.history.read(&user_id).await?;
            if turns.is_empty() {
                println!("No conversation history for {user_id}.");
            }
            for turn in &turns {
                println!("{}", render_turn(turn));
            }
            Ok(())
        }

        Commands::Forget { user } => {
            let user_id = UserId::parse(&user).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let services = services::shared(&config).await?;
            match services.history.erase_user(&user_id).await {
                Ok(deleted) => {
                    println!("✓ Deleted {deleted} message(s) for {user_id}.");
                    Ok(())
                }
                Err(failure) => {
                    tracing::debug!(error = %failure.error(), "erase failed");
                    bail!(failure.user_message())
                }
            }
        }

        Commands::Navigate {
            path,
            authenticated,
        } => {
            let decision = access::decide(authenticated, &path);
            println!("{}", render_decision(&path, authenticated, decision));
            Ok(())
        }

        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}
