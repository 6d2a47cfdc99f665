use anyhow::Result;
use clap::Parser;
use openstack_exporter::{collectors::CollectorRegistry, config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Pre-issued Keystone token (overrides config)
    #[arg(long, env = "OS_TOKEN", hide_env_values = true)]
    os_token: Option<String>,

    /// Region used for endpoint selection (overrides config)
    #[arg(long, env = "OS_REGION_NAME")]
    os_region_name: Option<String>,

    /// Endpoint interface: public, internal or admin (overrides config)
    #[arg(long, env = "OS_INTERFACE")]
    os_interface: Option<String>,

    /// Collectors to enable, comma separated (overrides config)
    #[arg(long, value_delimiter = ',')]
    collectors: Option<Vec<String>>,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting OpenStack Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    apply_overrides(&mut config, args);

    info!("Configuration loaded successfully");
    info!(
        "Region: {}, interface: {}",
        config.openstack.region.as_deref().unwrap_or("any"),
        config.openstack.interface
    );
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    let registry = CollectorRegistry::with_defaults();

    // Start the metrics server
    if let Err(e) = server::start(config, registry).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Flags and their environment variables only win when actually given
fn apply_overrides(config: &mut Config, args: Args) {
    if let Some(token) = args.os_token {
        config.openstack.token = secrecy::SecretString::from(token);
    }
    if let Some(region) = args.os_region_name {
        config.openstack.region = Some(region);
    }
    if let Some(interface) = args.os_interface {
        config.openstack.interface = interface;
    }
    if let Some(collectors) = args.collectors {
        config.metrics.collectors = collectors;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_server(addr: &str, port: u16) -> Config {
        let mut config = Config::load("config/missing-exporter-config").unwrap();
        config.server.addr = addr.to_string();
        config.server.port = port;
        config
    }

    #[test]
    fn test_configured_server_kept_without_flags() {
        let mut config = config_with_server("127.0.0.1", 9999);
        let args = Args::try_parse_from(["openstack-exporter"]).unwrap();

        apply_overrides(&mut config, args);

        assert_eq!(config.server.addr, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = config_with_server("127.0.0.1", 9999);
        let args = Args::try_parse_from([
            "openstack-exporter",
            "--port",
            "9200",
            "--addr",
            "0.0.0.0",
            "--collectors",
            "compute,extra",
        ])
        .unwrap();

        apply_overrides(&mut config, args);

        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.addr, "0.0.0.0");
        assert_eq!(config.metrics.collectors, vec!["compute", "extra"]);
    }
}
