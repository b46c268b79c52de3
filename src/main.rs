mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use mp_core::config::Config;
use mp_core::MangaId;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting mangapress server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    mp_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mangapress=trace,mp_server=trace,mp_db=debug,mp_core=debug,tower_http=debug".to_string()
        } else {
            "mangapress=debug,mp_server=debug,mp_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::DeleteManga { id } => delete_manga(MangaId::from(id), cli.config.as_deref()),
        Commands::Version => {
            println!("mangapress {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let contents = std::fs::read_to_string(p)?;
            let config = Config::from_json(&contents)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Upload root: {}", config.uploads.root.display());
    println!("  Overwrite uploads: {}", config.uploads.overwrite);
    println!("  Max body: {} bytes", config.uploads.max_body_bytes);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

fn delete_manga(id: MangaId, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let db_path = config.server.db_path.to_string_lossy();
    if !config.server.db_path.exists() {
        anyhow::bail!("Database does not exist: {db_path}");
    }

    let pool = mp_db::pool::init_pool(&db_path)?;
    let conn = mp_db::pool::get_conn(&pool)?;
    if mp_db::queries::mangas::delete_manga(&conn, id)? {
        tracing::info!(manga_id = %id, "Manga deleted");
        println!("Deleted manga {id} with its chapters and pages");
    } else {
        println!("No manga with id {id}");
    }

    Ok(())
}
