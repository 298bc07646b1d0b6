use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{AuthClaims, JwtKeys};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a signed token with the configured secret")]
    Issue {
        #[arg(long, help = "Subject (user id)")]
        sub: String,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Role claim value (e.g. admin)")]
        role: Option<String>,
        #[arg(long, help = "Lifetime in hours (defaults to configured expiry)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        #[arg(help = "Bearer token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    match cmd {
        TokenCommands::Issue { sub, email, role, hours } => {
            let keys = JwtKeys::from_secret(&security.jwt_secret, hours.unwrap_or(security.jwt_expiry_hours))
                .context("JWT_SECRET must be set to issue tokens")?;

            let claims = issue_claims(sub, email, role, &security.admin_claim);
            let token = keys.issue(claims)?;

            match output_format {
                OutputFormat::Json => println!("{}", json!({ "token": token })),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
        TokenCommands::Inspect { token } => {
            let keys = JwtKeys::from_secret(&security.jwt_secret, security.jwt_expiry_hours)
                .context("JWT_SECRET must be set to inspect tokens")?;
            let claims = keys.verify(token.trim())?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&claims)?),
                OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&claims)?),
            }
            Ok(())
        }
    }
}

fn issue_claims(sub: String, email: Option<String>, role: Option<String>, role_claim: &str) -> AuthClaims {
    let mut claims = AuthClaims::new().with("sub", sub);
    if let Some(email) = email {
        claims = claims.with("email", email);
    }
    if let Some(role) = role {
        claims = claims.with(role_claim, role);
    }
    claims
}
