use clap::Args;
use serde_json::{Map, Value};

use crate::cli::client::StudentClient;
use crate::cli::utils::output_response;
use crate::cli::{Commands, OutputFormat};
use crate::types::Verb;

/// Field flags shared by create/update/patch. Omitted flags are not sent.
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long, help = "Student name")]
    pub name: Option<String>,
    #[arg(long, help = "Roll number")]
    pub roll: Option<i64>,
    #[arg(long, help = "City")]
    pub city: Option<String>,
    #[arg(long, help = "Raw JSON object merged under the field flags")]
    pub data: Option<String>,
}

impl FieldArgs {
    pub fn into_payload(self) -> anyhow::Result<Map<String, Value>> {
        let mut payload = match self.data.as_deref() {
            Some(raw) => match serde_json::from_str::<Value>(raw)? {
                Value::Object(map) => map,
                _ => anyhow::bail!("--data must be a JSON object"),
            },
            None => Map::new(),
        };

        if let Some(name) = self.name {
            payload.insert("name".into(), Value::from(name));
        }
        if let Some(roll) = self.roll {
            payload.insert("roll".into(), Value::from(roll));
        }
        if let Some(city) = self.city {
            payload.insert("city".into(), Value::from(city));
        }
        Ok(payload)
    }
}

pub async fn handle(client: &StudentClient, cmd: Commands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (verb, id, payload) = match cmd {
        Commands::List => (Verb::Get, None, None),
        Commands::Get { id } => (Verb::Get, Some(id), None),
        Commands::Create { fields } => (Verb::Post, None, Some(fields.into_payload()?)),
        Commands::Update { id, fields } => (Verb::Put, Some(id), Some(fields.into_payload()?)),
        Commands::Patch { id, fields } => (Verb::Patch, Some(id), Some(fields.into_payload()?)),
        Commands::Delete { id } => (Verb::Delete, Some(id), None),
        Commands::Token { .. } => anyhow::bail!("token is handled locally"),
    };

    let response = client.send(verb, id, payload).await?;
    output_response(&output_format, &response)?;

    if !response.is_success() {
        anyhow::bail!("{} request failed with status {}", verb.as_str(), response.status);
    }
    Ok(())
}
