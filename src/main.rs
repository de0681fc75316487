//! Protoprobe CLI
//!
//! Runs the configured probe plan, or a single probe given on the command line.

use clap::{Parser, Subcommand, ValueEnum};
use protoprobe_core::cli::print_exit_codes;
use protoprobe_core::{
    AppConfig, CanConfig, CliResult, ExitCodes, FtpConfig, HttpConfig, I2cConfig, MqttConfig, OutputFormat,
    ProbeSpec, Protocol, Reporter, Runner, SerialConfig, SpiConfig, TcpConfig, UdpConfig,
    WebSocketConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Human-readable text
    Text,
    /// JSON lines for scripting
    Json,
    /// Text with payloads as hex bytes
    Hex,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => Self::Text,
            Format::Json => Self::Json,
            Format::Hex => Self::Hex,
        }
    }
}

/// Protoprobe CLI
#[derive(Parser, Debug)]
#[command(
    name = "protoprobe",
    author = "Protoprobe Team",
    version,
    about = "Minimal request/response probes for common protocols",
    long_about = None
)]
struct Cli {
    /// Output format (defaults to the config file setting)
    #[arg(short, long, value_enum, global = true)]
    format: Option<Format>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (no per-probe headers)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "PROTOPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Connect timeout (milliseconds)
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    /// Read timeout (milliseconds)
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every probe of the configured plan (the default)
    Run,

    /// HTTP GET and print the body
    Http {
        /// Host name
        #[arg(short = 'H', long, default_value = "example.com")]
        host: String,

        /// Port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Request path
        #[arg(long, default_value = "/")]
        path: String,

        /// Ignore proxy settings from the environment
        #[arg(long)]
        no_proxy: bool,
    },

    /// Connect over TCP, write a greeting, print the reply
    Tcp {
        /// Host address
        #[arg(short = 'H', long)]
        host: String,

        /// Port number
        #[arg(short, long)]
        port: u16,

        /// Message to send
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Send a UDP datagram, print the reply
    Udp {
        /// Host address
        #[arg(short = 'H', long)]
        host: String,

        /// Port number
        #[arg(short, long)]
        port: u16,

        /// Message to send
        #[arg(short, long)]
        message: Option<String>,

        /// Local bind address
        #[arg(long, default_value = "0.0.0.0:0")]
        bind: String,
    },

    /// Open a WebSocket, send a text frame, print the first message
    Ws {
        /// ws:// URL
        url: String,

        /// Message to send
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Serial port (not integrated)
    Serial {
        /// Serial port name (e.g., COM3, /dev/ttyUSB0)
        #[arg(short, long, default_value = "/dev/ttyUSB0")]
        port: String,

        /// Baud rate
        #[arg(short, long, default_value = "9600")]
        baud: u32,
    },

    /// I2C bus (not integrated)
    I2c {
        /// Bus number
        #[arg(short, long, default_value = "1")]
        bus: u8,
    },

    /// SPI bus (not integrated)
    Spi {
        /// Bus number
        #[arg(short, long, default_value = "0")]
        bus: u8,

        /// Chip select
        #[arg(short, long, default_value = "0")]
        device: u8,
    },

    /// CAN interface (not integrated)
    Can {
        /// Interface name
        #[arg(short, long, default_value = "can0")]
        interface: String,
    },

    /// MQTT broker (not integrated)
    Mqtt {
        /// Broker host
        #[arg(short = 'H', long, default_value = "localhost")]
        broker: String,

        /// Broker port
        #[arg(short, long, default_value = "1883")]
        port: u16,
    },

    /// FTP server (not integrated)
    Ftp {
        /// Host
        #[arg(short = 'H', long)]
        host: String,

        /// Username
        #[arg(short, long, default_value = "anonymous")]
        user: String,

        /// Password
        #[arg(short = 'P', long, env = "FTP_PASSWORD", default_value = "")]
        password: String,
    },

    /// List protocols and whether they are implemented
    List,

    /// Print the exit code table
    ExitCodes,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_logging(&cli, "warn");
            eprintln!("Error: {e}");
            return Ok(CliResult::config_error(e.to_string()).to_exit_code());
        }
    };

    init_logging(&cli, &config.logging.level);
    tracing::info!("Starting Protoprobe v{}", env!("CARGO_PKG_VERSION"));

    let format = cli.format.map_or(config.output.format, OutputFormat::from);
    let reporter = Reporter::new(std::io::stdout(), format).quiet(cli.quiet || config.output.quiet);
    let mut runner = Runner::new(reporter);

    let run = Commands::Run;
    let command = cli.command.as_ref().unwrap_or(&run);
    match command {
        Commands::Run => {
            let mut plan = config.probes.clone();
            for spec in &mut plan {
                spec.set_timeouts(cli.connect_timeout, cli.read_timeout);
            }
            runner.run_plan(&plan).await?;
            // Probe failures are reported, not propagated.
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => {
            list_protocols();
            Ok(ExitCode::SUCCESS)
        }
        Commands::ExitCodes => {
            print_exit_codes();
            Ok(ExitCode::SUCCESS)
        }
        other => {
            let Some(mut spec) = single_probe(other, &config) else {
                return Ok(CliResult::error(ExitCodes::INVALID_ARGS, "not a probe").to_exit_code());
            };
            spec.set_timeouts(cli.connect_timeout, cli.read_timeout);

            let report = runner.run_one(spec).await?;
            Ok(CliResult::from_outcome(&report.outcome).to_exit_code())
        }
    }
}

fn init_logging(cli: &Cli, config_level: &str) {
    let level = if cli.verbose { "debug" } else { config_level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the spec for a single-probe subcommand
fn single_probe(command: &Commands, config: &AppConfig) -> Option<ProbeSpec> {
    let connect_ms = config.timeouts.connect_ms;
    let read_ms = config.timeouts.read_ms;

    let spec = match command {
        Commands::Http { host, port, path, no_proxy } => {
            let mut cfg = HttpConfig::new(host, path)
                .system_proxy(!no_proxy)
                .timeouts(connect_ms, read_ms);
            cfg.port = *port;
            ProbeSpec::Http(cfg)
        }
        Commands::Tcp { host, port, message } => {
            let mut cfg = TcpConfig::new(host, *port).timeouts(connect_ms, read_ms);
            if let Some(msg) = message {
                cfg = cfg.message(msg);
            }
            ProbeSpec::Tcp(cfg)
        }
        Commands::Udp { host, port, message, bind } => {
            let mut cfg = UdpConfig::new(host, *port)
                .bind_addr(bind)
                .timeouts(connect_ms, read_ms);
            if let Some(msg) = message {
                cfg = cfg.message(msg);
            }
            ProbeSpec::Udp(cfg)
        }
        Commands::Ws { url, message } => {
            let mut cfg = WebSocketConfig::new(url).timeouts(connect_ms, read_ms);
            if let Some(msg) = message {
                cfg = cfg.message(msg);
            }
            ProbeSpec::WebSocket(cfg)
        }
        Commands::Serial { port, baud } => ProbeSpec::Serial(SerialConfig::new(port, *baud)),
        Commands::I2c { bus } => ProbeSpec::I2c(I2cConfig::new(*bus)),
        Commands::Spi { bus, device } => ProbeSpec::Spi(SpiConfig::new(*bus, *device)),
        Commands::Can { interface } => ProbeSpec::Can(CanConfig::new(interface)),
        Commands::Mqtt { broker, port } => ProbeSpec::Mqtt(MqttConfig::new(broker, *port)),
        Commands::Ftp { host, user, password } => {
            ProbeSpec::Ftp(FtpConfig::new(host, user, password))
        }
        Commands::Run | Commands::List | Commands::ExitCodes => return None,
    };
    Some(spec)
}

fn list_protocols() {
    println!("{:<12} {}", "Protocol", "Status");
    println!("{:-<30}", "");
    for protocol in Protocol::all() {
        let status = if protocol.is_implemented() {
            "implemented"
        } else {
            "notice only"
        };
        println!("{:<12} {}", protocol.to_string(), status);
    }
}
