//! Command line front end over the fake camera backend.
//!
//! Every subcommand drives the `vb_cam_*` surface through the safe facade,
//! against a simulated camera setup described by a JSON scenario.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use vision_boundary::calib_sdk::PoseMethod;
use vision_boundary::camera::{CameraRuntime, Device, HasNodeMap, Node, NodeMap};
use vision_boundary::camera_sdk::fake::{
    FakeCameraScenario, FakeCameraSdk, FakeFrame, ScenarioIoError,
};
use vision_boundary::camera_sdk::{
    AccessModeSet, GrabStatus, InterfaceType, PayloadType, PixelType, Visibility,
};
use vision_boundary::core::{BoundaryEnum, Source, StatusCode};
use vision_boundary::{BoundaryConfig, ConfigError};

#[derive(Parser)]
#[command(name = "vision-boundary")]
#[command(about = "Exercise the vision-boundary C surface against a simulated camera setup")]
struct Cli {
    /// JSON scenario describing the simulated devices. Defaults to two cameras.
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,

    /// JSON boundary configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered devices with their serial number and model
    ListDevices,

    /// Print every parameter node of a device
    DumpNodes {
        /// Serial number; the first device when omitted
        #[arg(long)]
        serial: Option<String>,

        /// Dump the GigE transport layer instead of a device
        #[arg(long)]
        transport_layer: bool,
    },

    /// Print a boundary enumeration table with its native values
    EnumTable {
        #[arg(value_enum)]
        table: EnumTable,
    },

    /// Grab simulated frames and report each result
    Grab {
        #[arg(long)]
        serial: Option<String>,

        #[arg(long, default_value_t = 3)]
        frames: u32,

        /// Directory receiving one PNG per grabbed Mono8 frame
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EnumTable {
    Status,
    Interface,
    Visibility,
    GrabStatus,
    PayloadType,
    PixelType,
    PoseMethod,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Boundary(#[from] vision_boundary::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("scenario: {0}")]
    Scenario(#[from] ScenarioIoError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no device with serial number {0}")]
    NoSuchDevice(String),
    #[error("no devices found")]
    NoDevices,
}

fn print_table<E: BoundaryEnum>() {
    println!("{:>6}  {:<24} {:>12}", "code", "name", "native");
    for (native, value) in E::TABLE {
        let native: i64 = (*native).into();
        println!("{:>6}  {:<24} {:>#12x}", value.code(), format!("{value:?}"), native);
    }
}

fn print_status_table() {
    println!("{:>6}  {:<24}", "code", "name");
    for status in StatusCode::ALL {
        println!("{:>6}  {:<24}", status.code(), format!("{status:?}"));
    }
}

fn load_scenario(path: Option<&Path>) -> Result<FakeCameraScenario, CliError> {
    match path {
        Some(path) => Ok(FakeCameraScenario::load_json(path)?),
        None => Ok(FakeCameraScenario::with_cameras(2)),
    }
}

fn open_device(runtime: &CameraRuntime, serial: Option<&str>) -> Result<Device, CliError> {
    let factory = runtime.tl_factory()?;
    let infos = factory.enumerate_devices()?;
    let info = match serial {
        Some(serial) => infos
            .iter()
            .find(|info| info.serial_number().is_ok_and(|s| s == serial))
            .ok_or_else(|| CliError::NoSuchDevice(serial.to_string()))?,
        None => infos.first().ok_or(CliError::NoDevices)?,
    };
    let mut device = factory.create_device(info)?;
    device.open(AccessModeSet::CONTROL.union(AccessModeSet::STREAM))?;
    Ok(device)
}

fn describe_value(node: Node) -> Result<String, vision_boundary::Error> {
    Ok(match node.principal_interface_type()? {
        InterfaceType::IInteger => node.into_integer()?.value()?.to_string(),
        InterfaceType::IFloat => node.into_float()?.value()?.to_string(),
        InterfaceType::IBoolean => node.into_boolean()?.value()?.to_string(),
        InterfaceType::IString => node.into_string()?.value()?,
        InterfaceType::IEnumeration => node.into_enumeration()?.value()?,
        _ => String::new(),
    })
}

fn dump(map: &NodeMap) -> Result<(), CliError> {
    for node in map.nodes()? {
        let name = node.name(true)?;
        let interface = match node.principal_interface_type() {
            Ok(interface) => format!("{interface:?}"),
            Err(err) => format!("<{err}>"),
        };
        let visibility = match node.visibility() {
            Ok(visibility) => format!("{visibility:?}"),
            Err(err) => format!("<{err}>"),
        };
        let value = describe_value(node).unwrap_or_else(|err| format!("<{err}>"));
        println!("{name:<40} {interface:<14} {visibility:<10} {value}");
    }
    Ok(())
}

fn grab(
    runtime: &CameraRuntime,
    sdk: &FakeCameraSdk,
    serial: Option<&str>,
    frames: u32,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let mut device = open_device(runtime, serial)?;
    let width = device.integer_value("Width")?;
    let height = device.integer_value("Height")?;
    let payload = (width * height) as usize;
    let config = runtime.config();

    let mut grabber = device.stream_grabber(0)?;
    grabber.open()?;
    grabber.prepare_grab()?;
    for _ in 0..config.buffer_count.max(1) {
        let id = grabber.register_buffer(payload)?;
        grabber.queue_buffer(id)?;
    }
    let wait = grabber.wait_object()?;

    let serial = match serial {
        Some(serial) => serial.to_string(),
        None => sdk
            .scenario()
            .devices
            .first()
            .and_then(|d| d.serial())
            .unwrap_or_default()
            .to_string(),
    };
    let stream = sdk.stream(&serial, 0);
    if let Some(dir) = output {
        std::fs::create_dir_all(dir)?;
    }

    for i in 0..frames {
        stream.emit_frame(FakeFrame::mono8(width as u32, height as u32, (i * 40) as u8));
        let outcome = wait.wait(config.wait_timeout())?;
        let Some(result) = grabber.retrieve_result()? else {
            warn!("frame {i}: wait returned {outcome:?} without a result");
            continue;
        };
        let status = result.status()?;
        if status != GrabStatus::Grabbed {
            println!(
                "frame {i}: {status:?} error {:#x} {}",
                result.error_code()?,
                result.error_description()?
            );
        } else {
            println!(
                "frame {i}: block {} {}x{} {} bytes",
                result.block_id()?,
                result.size_x()?,
                result.size_y()?,
                result.payload_size()?
            );
            if let Some(dir) = output {
                if let Some(img) = result.image()?.to_gray_image()? {
                    let path = dir.join(format!("frame_{i:04}.png"));
                    img.save(&path)?;
                    info!("wrote {}", path.display());
                }
            }
        }
        let id = result.buffer_id()?;
        drop(result);
        grabber.queue_buffer(id)?;
    }

    grabber.cancel_grab()?;
    while grabber.retrieve_result()?.is_some() {}
    grabber.finish_grab()?;
    grabber.close()?;
    device.close()?;
    Ok(())
}

/// `env_logger` with one module filter per source of `log_level`.
/// `RUST_LOG` still overrides.
fn init_logging(config: &BoundaryConfig) {
    let levels = config.log_levels();
    let mut builder = env_logger::Builder::new();
    builder.filter_level(levels.level(Source::External));
    for source in Source::ALL {
        for name in source.crates() {
            builder.filter_module(name, levels.level(source));
        }
    }
    builder.parse_default_env().init();
    #[cfg(feature = "tracing")]
    vision_boundary::core::init_tracing(levels, false);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => BoundaryConfig::load_json(path)?,
        None => BoundaryConfig::default(),
    };
    init_logging(&config);

    if let Commands::EnumTable { table } = cli.command {
        match table {
            EnumTable::Status => print_status_table(),
            EnumTable::Interface => print_table::<InterfaceType>(),
            EnumTable::Visibility => print_table::<Visibility>(),
            EnumTable::GrabStatus => print_table::<GrabStatus>(),
            EnumTable::PayloadType => print_table::<PayloadType>(),
            EnumTable::PixelType => print_table::<PixelType>(),
            EnumTable::PoseMethod => print_table::<PoseMethod>(),
        }
        return Ok(());
    }

    let sdk = Arc::new(FakeCameraSdk::new(load_scenario(cli.scenario.as_deref())?));
    vision_boundary::camera_sdk::install_backend(sdk.clone());
    let runtime = CameraRuntime::with_config(config)?;
    info!("camera SDK {}", vision_boundary::camera::version_string()?);

    match cli.command {
        Commands::ListDevices => {
            let factory = runtime.tl_factory()?;
            for info in factory.enumerate_devices()? {
                println!(
                    "{:<12} {:<20} {}",
                    info.serial_number()?,
                    info.model_name()?,
                    info.property_value("FriendlyName").unwrap_or_default()
                );
            }
        }
        Commands::DumpNodes {
            serial,
            transport_layer,
        } => {
            if transport_layer {
                let factory = runtime.tl_factory()?;
                dump(&factory.create_gige_transport_layer()?.node_map()?)?;
            } else {
                let device = open_device(&runtime, serial.as_deref())?;
                dump(&device.node_map()?)?;
            }
        }
        Commands::Grab {
            serial,
            frames,
            output,
        } => grab(&runtime, &sdk, serial.as_deref(), frames, output.as_deref())?,
        Commands::EnumTable { .. } => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
