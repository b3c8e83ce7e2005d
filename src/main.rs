mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::Parser;
use cli::{Cli, Commands};
use ih_core::config::{Config, StoreConfig};
use ih_pipeline::{parse_chain, ActionRegistry, ImageService, ParsedRequest, Rendered};
use ih_store::LocalStore;
use tokio_util::sync::CancellationToken;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting image handler");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    ih_server::start(config, CancellationToken::new()).await?;
    Ok(())
}

async fn process_file(input: &Path, chain: &str, output: Option<&Path>) -> Result<()> {
    let key = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", input.display()))?
        .to_string();
    let root = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let service = ImageService::with_builtin(Arc::new(LocalStore::new(root)));
    let request = ParsedRequest::new(key, parse_chain(chain)?);

    match service.render(&request, CancellationToken::new()).await? {
        Rendered::Info(info) => {
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Rendered::Image { bytes, format } => {
            tracing::debug!("Encoded {} bytes as {:?}", bytes.len(), format);
            write_output(output, &bytes)
        }
        Rendered::Original(object) => write_output(output, &object.buffer),
        Rendered::DirectAccess => bail!("Local files are always served directly"),
    }
}

fn write_output(output: Option<&Path>, bytes: &Bytes) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn list_actions() -> Result<()> {
    let registry = ActionRegistry::builtin();
    for name in registry.names() {
        println!("{name}");
    }
    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = Config::load(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Request timeout: {}s", config.server.request_timeout_secs);
    match &config.store {
        StoreConfig::Local { root } => println!("  Store: local ({})", root.display()),
        StoreConfig::Http {
            base_url, bypass, ..
        } => println!("  Store: http ({base_url}, bypass {bypass})"),
    }

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "image_handler=trace,ih_core=trace,ih_store=trace,ih_engine=trace,ih_pipeline=trace,ih_server=trace,tower_http=debug".to_string()
        } else {
            "image_handler=info,ih_store=info,ih_pipeline=info,ih_server=info,tower_http=info"
                .to_string()
        }
    });

    // Logs go to stderr so `process` can stream image bytes on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Process {
            input,
            chain,
            output,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(process_file(&input, &chain, output.as_deref()))
        }
        Commands::Actions => list_actions(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("image-handler {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
