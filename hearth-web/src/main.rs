//! Hearth Web Server
//!
//! The access-control boundary of the Hearth hub-management API.

use clap::Parser;
use hearth_core::HearthConfig;
use hearth_web::server::HearthServer;
use hearth_web::{init_logging, WebConfig};

/// Hearth API server - multi-tenant home-automation management
#[derive(Parser)]
#[command(name = "hearth-web")]
#[command(about = "The Hearth hub-management API server")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Configuration file (TOML); environment variables still override
    #[arg(long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!("hearth_web={},tower_http=debug", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    // File configuration first, then environment, then flags
    let mut config = match &args.config {
        Some(path) => match HearthConfig::from_file(path).and_then(|c| {
            c.validate()?;
            Ok(c)
        }) {
            Ok(core_config) => WebConfig::from_core(&core_config),
            Err(e) => {
                eprintln!("❌ Failed to load config file {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => WebConfig::from_env(),
    };

    config.host = args.host;
    config.port = args.port;

    println!("🚀 Starting Hearth API server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🔧 API root: {}", config.api_root);

    if let Some(issuer) = &config.federation_issuer {
        println!("🔗 Federated identity provider: {}", issuer);
    }

    if config.signing_secret == WebConfig::default().signing_secret {
        println!("⚠️  Warning: using the default signing secret.");
        println!("   Set HEARTH_JWT_SECRET before exposing this server.");
    }

    let server = match HearthServer::new(config.clone()).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed: {}", e);
        std::process::exit(1);
    }

    println!("✅ Server shut down gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        use clap::Parser;

        let args = Args::parse_from(["hearth-web"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(args.config.is_none());

        let args = Args::parse_from(["hearth-web", "--host", "0.0.0.0", "--port", "3000"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
    }
}
