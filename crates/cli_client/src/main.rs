//! devicectl command line
//! Resolves a device controller the way an instrumentation run does and
//! applies a single command.

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use devicectl_controller::{
    ControllerRegistry, ControllerResolver, DeviceContext, EmulatorProbe, FixedProbe,
    InstrumentationArgs, PropertyEmulatorProbe, SystemProperties,
};
use devicectl_core::{DeviceController, DeviceMode, ScreenOrientation};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// CLI argument parser
#[derive(Parser, Debug)]
#[command(name = "devicectl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Control device mode and screen orientation", long_about = None)]
struct Args {
    /// Instrumentation argument, e.g. `-e grpc.port 8554`
    #[arg(
        short = 'e',
        long = "arg",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = ArgAction::Append
    )]
    extra: Vec<String>,

    /// Controller backend to assume
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    backend: Backend,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Probe device properties
    Auto,
    /// Treat the device as an emulator
    Emulator,
    /// Treat the device as a physical device
    Physical,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set the device mode (flat, tabletop, book, closed or an integer)
    SetMode { mode: String },
    /// Set the screen orientation (portrait, landscape or an integer)
    SetOrientation { orientation: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let instrumentation = instrumentation_args(&args.extra)?;
    let properties = Arc::new(SystemProperties::new());
    let probe: Box<dyn EmulatorProbe> = match args.backend {
        Backend::Auto => Box::new(PropertyEmulatorProbe::new(Arc::clone(&properties))),
        Backend::Emulator => Box::new(FixedProbe(true)),
        Backend::Physical => Box::new(FixedProbe(false)),
    };

    let resolver = ControllerResolver::new(ControllerRegistry::new(), probe, instrumentation, properties);
    let context = DeviceContext::resolve(&resolver)
        .map_err(|e| {
            error!("Controller resolution failed at {} stage", e.stage());
            e
        })
        .context("Failed to resolve device controller")?;

    match args.command {
        Command::SetMode { mode } => {
            let value = parse_value::<DeviceMode>(&mode, DeviceMode::as_i32)?;
            context
                .controller()
                .set_device_mode(value)
                .with_context(|| format!("set-mode {} failed", mode))?;
            info!("Device mode set to {} via {} controller", mode, context.kind());
        }
        Command::SetOrientation { orientation } => {
            let value = parse_value::<ScreenOrientation>(&orientation, ScreenOrientation::as_i32)?;
            context
                .controller()
                .set_screen_orientation(value)
                .with_context(|| format!("set-orientation {} failed", orientation))?;
            info!(
                "Screen orientation set to {} via {} controller",
                orientation,
                context.kind()
            );
        }
    }

    Ok(())
}

/// Turn `-e KEY VALUE` pairs into an argument bundle
fn instrumentation_args(extra: &[String]) -> Result<InstrumentationArgs> {
    if extra.len() % 2 != 0 {
        return Err(anyhow!("-e expects KEY VALUE pairs"));
    }
    Ok(extra
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

/// Accept a known name or any integer; integers are passed through so the
/// controller decides what is supported
fn parse_value<T: FromStr<Err = String>>(raw: &str, to_i32: fn(T) -> i32) -> Result<i32> {
    if let Ok(value) = raw.trim().parse::<i32>() {
        return Ok(value);
    }
    raw.parse::<T>().map(to_i32).map_err(|e| anyhow!(e))
}

/// Setup logging with tracing
fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicectl_controller::ArgumentSource;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "devicectl",
            "-e",
            "grpc.port",
            "8554",
            "-e",
            "grpc.token",
            "tok",
            "--backend",
            "emulator",
            "set-mode",
            "book",
        ])
        .unwrap();

        assert_eq!(args.backend, Backend::Emulator);
        assert_eq!(args.extra.len(), 4);
        assert!(matches!(args.command, Command::SetMode { ref mode } if mode == "book"));

        let instrumentation = instrumentation_args(&args.extra).unwrap();
        assert_eq!(instrumentation.get_int("grpc.port"), 8554);
        assert_eq!(instrumentation.get_string("grpc.token"), "tok");
    }

    #[test]
    fn test_odd_pairs_rejected() {
        assert!(instrumentation_args(&["grpc.port".to_string()]).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<DeviceMode>("closed", DeviceMode::as_i32).unwrap(), 3);
        assert_eq!(parse_value::<DeviceMode>("7", DeviceMode::as_i32).unwrap(), 7);
        assert_eq!(
            parse_value::<ScreenOrientation>("Landscape", ScreenOrientation::as_i32).unwrap(),
            1
        );
        assert!(parse_value::<ScreenOrientation>("sideways", ScreenOrientation::as_i32).is_err());
    }
}
