use serde_json::json;

use crate::auth::generate_jwt;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

/// Sign a token locally with the server's configured secret
pub fn handle(subject: &str, expiry_hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let expiry_hours = expiry_hours.unwrap_or(security.jwt_expiry_hours);

    let token = generate_jwt(subject, &security.jwt_secret, expiry_hours)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Issued token for '{}'", subject),
            Some(json!({ "token": token, "expires_in_hours": expiry_hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
