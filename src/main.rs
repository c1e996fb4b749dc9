mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use showcase::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ShowcaseConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url.clone() {
        config.database_url = Some(url);
    }

    let default_level = if config.environment.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Classify { input } => {
            println!("{}", classify(&input));
        }
        Commands::Normalize { input, tag } => {
            let tag = match tag {
                Some(t) => t.parse::<PlatformTag>()?,
                None => classify(&input),
            };
            if !tag.is_known() {
                eprintln!("unrecognized input; nothing to normalize");
                return Ok(());
            }
            let reference = normalize(&input, tag);
            if config.environment.is_development() {
                println!("{tag}\t{reference}");
            } else {
                println!("{reference}");
            }
        }
        Commands::Show { address, raw } => {
            let app = Showcase::connect(&config, true).await?;
            let auth = auth_for(address);
            let doc = if raw { app.load_document(&auth).await } else { Some(app.resolved_document(&auth).await) };
            match doc {
                Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                None => eprintln!("no stored document for {}", StorageKey::for_identity(&auth)),
            }
        }
        Commands::Clear { address } => {
            let app = Showcase::connect(&config, true).await?;
            let auth = auth_for(address);
            app.clear(&auth).await?;
            println!("cleared {}", StorageKey::for_identity(&auth));
        }
        Commands::Keys => {
            let app = Showcase::connect(&config, true).await?;
            if let Some(db) = app.database() {
                for (key, updated_at) in db.list_keys().await? {
                    println!("{key}\t{updated_at}");
                }
            }
        }
    }
    Ok(())
}

fn auth_for(address: Option<String>) -> AuthState {
    match address {
        Some(a) => AuthState::signed_in(a),
        None => AuthState::anonymous(),
    }
}
