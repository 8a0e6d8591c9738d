use std::{path::Path, sync::Arc};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use waypost::{
    adapters::AxumServer,
    config::{ServerConfig, ServerConfigValidator, loader::load_config},
    core::RouterBuilder,
    metrics,
    ports::HttpServer,
    resources, tracing_setup,
    utils::GracefulShutdown,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Start the router (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Some(Commands::Validate { config }) => validate_config_command(&config).await,
        Some(Commands::Init { config }) => init_config_command(&config).await,
        Some(Commands::Serve { config }) => serve_command(&config).await,
        None => serve_command(&args.config).await,
    }
}

async fn serve_command(config_path: &str) -> Result<()> {
    let config = if Path::new(config_path).exists() {
        load_config(config_path)
            .await
            .with_context(|| format!("Failed to load config from {config_path}"))?
    } else {
        eprintln!("No configuration at '{config_path}', using defaults");
        ServerConfig::default()
    };
    ServerConfigValidator::validate(&config).map_err(|e| eyre!("Invalid configuration: {e}"))?;

    tracing_setup::init_from_config(&config.logging)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;
    metrics::init_metrics().map_err(|e| eyre!("Failed to initialize metrics: {}", e))?;

    let router = RouterBuilder::from_config(&config)
        .resources(resources::bundled())
        .build()
        .context("Failed to register bundled resources")?;
    for resource in router.resources() {
        for pattern in resource.patterns() {
            tracing::info!(
                "Registered resource: {} {} -> {}",
                resource.name(),
                pattern.raw_template(),
                pattern.search_term()
            );
        }
    }

    let graceful_shutdown = GracefulShutdown::new();
    let signal_handler_shutdown = graceful_shutdown.clone();
    tokio::spawn(async move {
        signal_handler_shutdown.run_signal_handler().await;
    });

    let server = AxumServer::new(Arc::new(config), Arc::new(router), graceful_shutdown);
    server.run().await
}

/// Validate configuration file and exit
async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match ServerConfigValidator::validate(&config) {
        Ok(()) => {
            let cache = match config.cache.effective_capacity() {
                None => "unbounded".to_string(),
                Some(capacity) => format!("lru ({capacity} paths)"),
            };
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!("   • Default Content-Type: {}", config.default_content_type);
            println!("   • Max Body Bytes: {}", config.max_body_bytes);
            println!("   • Path Cache: {cache}");
            println!("   • Log Level: {}", config.logging.level);
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Verify listen address format (e.g., '127.0.0.1:1997')");
            println!("   • Use a non-zero cache capacity, or policy = \"unbounded\"");
            println!("   • Check the log level is a valid filter (e.g., 'info' or 'waypost=debug')");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# Waypost Configuration

# The address to listen on
listen_addr = "127.0.0.1:1997"

# Initial Content-Type of every response, also used for error bodies
default_content_type = "application/json"

# Larger request bodies are rejected with 413
max_body_bytes = 1048576

# Path -> matching resources cache (LRU capacities below 64 are raised to 64)
[cache]
policy = "lru"
capacity = 4096
# policy = "unbounded"

[logging]
level = "info"
format = "json"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'waypost serve --config {config_path}' to start the server");
    Ok(())
}
