//! CLI for the AP beacon (apbeacon)

#[cfg(feature = "cli")]
use beaconlib::{Beacon, BeaconConfig, SystemTelemetry, UdpTransport, WriterSink};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::net::Ipv4Addr;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "apbeacon")]
#[command(about = "AP Beacon: broadcast access point throughput, clients and health over UDP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Interface clients associate on
    #[arg(long, global = true)]
    ap_interface: Option<String>,

    /// Interface uplinked to the router
    #[arg(long, global = true)]
    uplink_interface: Option<String>,

    /// Unicast consumer or subnet broadcast address
    #[arg(short, long, global = true)]
    destination: Option<Ipv4Addr>,

    /// Destination UDP port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Sampling interval in seconds
    #[arg(short, long, global = true)]
    interval: Option<f64>,

    /// Enable SO_BROADCAST regardless of the destination
    #[arg(long, global = true)]
    broadcast: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Sample and send telemetry until interrupted (default)
    Run,
    /// Print a single payload to stdout instead of sending it
    Once,
    /// Print a commented sample configuration
    SampleConfig,
    /// Load and validate the configuration, then exit
    Validate,
}

#[cfg(feature = "cli")]
impl Cli {
    fn load_config(&self) -> beaconlib::Result<BeaconConfig> {
        let mut config = match &self.config {
            Some(path) => BeaconConfig::from_toml_file(&path.to_string_lossy())?,
            None => BeaconConfig::default(),
        };

        if let Some(ref iface) = self.ap_interface {
            config.ap_interface = iface.clone();
        }
        if let Some(ref iface) = self.uplink_interface {
            config.uplink_interface = iface.clone();
        }
        if let Some(destination) = self.destination {
            config.destination = destination;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if self.broadcast {
            config.broadcast = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::SampleConfig) = cli.command {
        print!("{}", BeaconConfig::sample_toml());
        return Ok(());
    }

    let config = cli.load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_filter()),
    )
    .init();

    #[cfg(unix)]
    {
        for iface in beaconlib::config::missing_interfaces(&config) {
            log::warn!("Interface {} does not exist (yet)", iface);
        }
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::SampleConfig => unreachable!("handled before config load"),
        Commands::Validate => {
            println!(
                "Configuration OK: {} -> {}, uplink {}, every {}s{}",
                config.ap_interface,
                config.target(),
                config.uplink_interface,
                config.interval_secs,
                if config.wants_broadcast() { " (broadcast)" } else { "" }
            );
        }
        Commands::Once => {
            let telemetry = SystemTelemetry::from_config(&config);
            let mut beacon = Beacon::new(config, telemetry, WriterSink::new(std::io::stdout()));
            beacon.run_once()?;
        }
        Commands::Run => {
            let transport = UdpTransport::open(config.target(), config.wants_broadcast())?;
            log::info!(
                "Beaconing {} / {} to {} every {}s{}",
                config.ap_interface,
                config.uplink_interface,
                transport.target(),
                config.interval_secs,
                if config.wants_broadcast() { " (broadcast)" } else { "" }
            );

            let telemetry = SystemTelemetry::from_config(&config);
            let mut beacon = Beacon::new(config, telemetry, transport);

            // SIGINT and SIGTERM both end the wait between ticks
            let (stop, shutdown) = std::sync::mpsc::channel();
            ctrlc::set_handler(move || {
                let _ = stop.send(());
            })?;

            beacon.run(&shutdown)?;
            // dropping the beacon closes the socket
            drop(beacon);
            log::info!("Socket closed, exiting");
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
