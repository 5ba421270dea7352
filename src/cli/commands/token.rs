use anyhow::Context;
use chrono::Duration;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{IdentityVerifier, TokenRequest};
use crate::cli::OutputFormat;
use crate::config::AuthConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token for a subject (local development only)")]
    Mint {
        #[arg(long, help = "Subject claim, normally the profile UUID")]
        sub: String,
        #[arg(long, default_value_t = 3600, help = "Lifetime in seconds")]
        ttl_secs: i64,
        #[arg(long, help = "Optional role claim")]
        role: Option<String>,
        #[arg(long, help = "Optional email claim")]
        email: Option<String>,
    },

    #[command(about = "Verify a token or Authorization header value and show the identity")]
    Inspect {
        #[arg(help = "Token, `Bearer <token>`, or the service key")]
        credential: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AuthConfig::from_env().context("could not load auth config")?;
    let verifier = IdentityVerifier::new(config);

    match cmd {
        TokenCommands::Mint { sub, ttl_secs, role, email } => {
            let ttl = token_ttl(ttl_secs)?;
            let request = TokenRequest {
                subject: sub,
                ttl,
                role,
                email,
            };
            let token = verifier.issue(&request)?;

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "token": token, "subject": request.subject, "expires_in": ttl_secs })
                ),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
        TokenCommands::Inspect { credential } => {
            let header = if credential.starts_with("Bearer ") {
                credential
            } else if credential.matches('.').count() == 2 {
                format!("Bearer {}", credential)
            } else {
                credential
            };

            let identity = verifier.verify(Some(&header))?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&identity)?),
                OutputFormat::Text => {
                    println!("subject: {}", identity.subject);
                    println!("source:  {:?}", identity.source);
                    if let Some(role) = &identity.role {
                        println!("role:    {}", role);
                    }
                    if let Some(email) = &identity.email {
                        println!("email:   {}", email);
                    }
                }
            }
            Ok(())
        }
    }
}

fn token_ttl(ttl_secs: i64) -> anyhow::Result<Duration> {
    anyhow::ensure!(ttl_secs > 0, "--ttl-secs must be positive");
    Duration::try_seconds(ttl_secs)
        .with_context(|| format!("--ttl-secs {} is out of range", ttl_secs))
}
