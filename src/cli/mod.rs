pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::{Addressing, StudentClient};

#[derive(Parser)]
#[command(name = "student")]
#[command(about = "Student CLI - command-line client for the Student API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "STUDENT_API_URL", default_value = "http://127.0.0.1:3000", help = "Base URL of the API server")]
    pub url: String,

    #[arg(long, global = true, env = "STUDENT_API_TOKEN", help = "Bearer token sent with every request")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Send the id in the JSON body to /studentapi/ instead of the URL path")]
    pub body_id: bool,

    #[arg(long, global = true, help = "Output raw JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List all students")]
    List,

    #[command(about = "Show one student")]
    Get {
        #[arg(help = "Student ID")]
        id: i64,
    },

    #[command(about = "Create a student")]
    Create {
        #[command(flatten)]
        fields: commands::students::FieldArgs,
    },

    #[command(about = "Replace a student (PUT)")]
    Update {
        #[arg(help = "Student ID")]
        id: i64,
        #[command(flatten)]
        fields: commands::students::FieldArgs,
    },

    #[command(about = "Change some fields of a student (PATCH)")]
    Patch {
        #[arg(help = "Student ID")]
        id: i64,
        #[command(flatten)]
        fields: commands::students::FieldArgs,
    },

    #[command(about = "Delete a student")]
    Delete {
        #[arg(help = "Student ID")]
        id: i64,
    },

    #[command(about = "Issue a bearer token signed with SECURITY_JWT_SECRET")]
    Token {
        #[arg(help = "Subject (user name) the token is issued to")]
        subject: String,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        expiry_hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    if let Commands::Token { subject, expiry_hours } = &cli.command {
        return commands::token::handle(subject, *expiry_hours, output_format);
    }

    let addressing = if cli.body_id { Addressing::Body } else { Addressing::Path };
    let client = StudentClient::new(&cli.url, cli.token.clone(), addressing)?;

    commands::students::handle(&client, cli.command, output_format).await
}
