use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vflex_core::{
    DEFAULT_PORT_NAME, DeviceSnapshot, LedState, MidiPort, SessionConfig, SessionError,
    SimulatedDevice, TransportConfig, VFlex, parse_volts,
};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("VFLEXCTL_BUILD_COMMIT"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  vflexctl read\n  vflexctl read --json --pretty\n  vflexctl set -v 12\n  vflexctl set --voltage 5.5 --led off\n  vflexctl --simulate read";

#[derive(Parser, Debug)]
#[command(name = "vflexctl")]
#[command(version = VERSION)]
#[command(
    about = "Read and adjust a Werewolf vFlex USB-C power adapter over MIDI.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// MIDI port name of the adapter
    #[arg(long, global = true, env = "VFLEXCTL_PORT", default_value = DEFAULT_PORT_NAME)]
    port: String,

    /// Talk to an in-memory simulated adapter instead of hardware
    #[arg(long, global = true)]
    simulate: bool,

    /// Skip the serial-number and voltage consistency checks
    #[arg(long, global = true)]
    unsafe_adjust: bool,

    /// How long to collect each reply, in milliseconds
    #[arg(long, global = true, env = "VFLEXCTL_DRAIN_MS", default_value_t = 500)]
    drain_ms: u64,

    /// Log filter, e.g. `warn`, `info` or `vflex_core=debug`
    #[arg(long, global = true, env = "VFLEXCTL_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the serial number, output voltage and LED state.
    Read {
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
    /// Change the output voltage and/or the LED behaviour.
    #[command(group(
        ArgGroup::new("change")
            .required(true)
            .multiple(true)
            .args(["voltage", "led"])
    ))]
    Set {
        /// Output voltage in volts, e.g. 12 or 5.5
        #[arg(short = 'v', long)]
        voltage: Option<String>,

        /// LED behaviour
        #[arg(short = 'l', long, value_enum)]
        led: Option<LedArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LedArg {
    On,
    Off,
}

impl From<LedArg> for LedState {
    fn from(arg: LedArg) -> Self {
        match arg {
            LedArg::On => LedState::On,
            LedArg::Off => LedState::Off,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        let hint = match &err {
            SessionError::SerialNumberMismatch { .. } => {
                "a different adapter answered; reconnect it, or pass --unsafe-adjust to skip the check"
            }
            SessionError::VoltageMismatch { .. } => {
                "the output changed while vflexctl was talking to it; run the command again"
            }
            SessionError::Protocol(_) | SessionError::MissingValue { .. } => {
                "the adapter did not answer as expected; check the cable or raise --drain-ms"
            }
            SessionError::Transport(_) | SessionError::NotReady { .. } => {
                "check that the adapter is plugged in and no other program holds the port"
            }
            SessionError::VoltageInput(_) => "use a value between 0 and 48 volts, e.g. 12 or 5.5",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli.log_level)?;
    let config = SessionConfig {
        safe_adjust: !cli.unsafe_adjust,
        transport: TransportConfig {
            drain_window: Duration::from_millis(cli.drain_ms),
            ..TransportConfig::default()
        },
    };
    debug!(?config, port = %cli.port, simulate = cli.simulate, "starting");

    match cli.command {
        Commands::Read { json, pretty } => {
            let mut vflex = VFlex::new(open_port(&cli.port, cli.simulate)?, config);
            cmd_read(&mut vflex, json, pretty)
        }
        Commands::Set { voltage, led } => {
            // Reject bad input before the adapter is touched.
            let millivolts = voltage
                .as_deref()
                .map(parse_volts)
                .transpose()
                .map_err(|err| {
                    CliError::new(
                        err.to_string(),
                        Some("use a value between 0 and 48 volts, e.g. 12 or 5.5".to_string()),
                    )
                })?;
            let mut vflex = VFlex::new(open_port(&cli.port, cli.simulate)?, config);
            cmd_set(&mut vflex, millivolts, led.map(LedState::from))
        }
    }
}

fn init_logging(filter: &str) -> Result<(), CliError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|err| {
        CliError::new(
            format!("invalid log filter '{filter}'"),
            Some(format!("{err}; try warn, info or vflex_core=debug")),
        )
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialise logging: {err}"), None))
}

fn open_port(name: &str, simulate: bool) -> Result<Box<dyn MidiPort>, CliError> {
    if simulate {
        info!("using simulated adapter");
        return Ok(Box::new(SimulatedDevice::default()));
    }
    open_hardware_port(name)
}

#[cfg(feature = "midir")]
fn open_hardware_port(name: &str) -> Result<Box<dyn MidiPort>, CliError> {
    let port = vflex_core::MidirPort::open(name).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some(
                "check that the adapter is plugged in, or pass --port with the exact MIDI port name"
                    .to_string(),
            ),
        )
    })?;
    Ok(Box::new(port))
}

#[cfg(not(feature = "midir"))]
fn open_hardware_port(name: &str) -> Result<Box<dyn MidiPort>, CliError> {
    Err(CliError::new(
        format!("cannot open MIDI port '{name}': this build has no MIDI backend"),
        Some("rebuild with `--features midir`, or pass --simulate".to_string()),
    ))
}

fn cmd_read<P: MidiPort>(vflex: &mut VFlex<P>, json: bool, pretty: bool) -> Result<(), CliError> {
    let snapshot = vflex.read_state()?;
    if json {
        println!("{}", render_report(&snapshot, pretty)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

fn cmd_set<P: MidiPort>(
    vflex: &mut VFlex<P>,
    millivolts: Option<u16>,
    led: Option<LedState>,
) -> Result<(), CliError> {
    vflex.wake_up()?;
    if let Some(millivolts) = millivolts {
        println!("Setting voltage to {:.2} V", f64::from(millivolts) / 1000.0);
        vflex.set_voltage(millivolts)?;
    }
    if let Some(led) = led {
        println!("Setting LED to {led}");
        vflex.set_led_state(led)?;
    }
    let snapshot = vflex.read_state()?;
    println!("State after setting:");
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &DeviceSnapshot) {
    println!("Serial number: {}", snapshot.serial_number);
    println!("Voltage: {:.2} V", snapshot.volts());
    println!("LED: {}", snapshot.led_state);
}

#[derive(Serialize)]
struct ToolInfo {
    name: &'static str,
    version: &'static str,
    commit: &'static str,
}

#[derive(Serialize)]
struct ReadReport<'a> {
    tool: ToolInfo,
    read_at: String,
    device: &'a DeviceSnapshot,
}

fn render_report(snapshot: &DeviceSnapshot, pretty: bool) -> Result<String, CliError> {
    let read_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format timestamp")?;
    let report = ReadReport {
        tool: ToolInfo {
            name: "vflexctl",
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("VFLEXCTL_BUILD_COMMIT"),
        },
        read_at,
        device: snapshot,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}
