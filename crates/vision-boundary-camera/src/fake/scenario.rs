//! JSON description of a simulated camera setup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ScenarioIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_version() -> String {
    "7.4.0-fake".to_string()
}

fn default_channels() -> u64 {
    1
}

/// Devices, parameter trees and failure points of a fake camera SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeCameraScenario {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub devices: Vec<FakeDeviceSpec>,
    /// Parameters of the GigE transport layer.
    #[serde(default)]
    pub transport_layer_nodes: Vec<FakeNodeSpec>,
    /// Parameters exposed by every stream grabber.
    #[serde(default)]
    pub stream_nodes: Vec<FakeNodeSpec>,
}

impl Default for FakeCameraScenario {
    fn default() -> Self {
        Self {
            version: default_version(),
            devices: Vec::new(),
            transport_layer_nodes: Vec::new(),
            stream_nodes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeDeviceSpec {
    /// Device info properties. `SerialNumber` identifies the device.
    pub properties: BTreeMap<String, String>,
    #[serde(default = "default_channels")]
    pub stream_grabber_channels: u64,
    #[serde(default)]
    pub nodes: Vec<FakeNodeSpec>,
    /// When set, opening the device fails with this description.
    #[serde(default)]
    pub open_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeNodeSpec {
    pub name: String,
    /// Native visibility value; 0 is beginner.
    #[serde(default)]
    pub visibility: i32,
    /// Native principal interface, overriding the one implied by `kind`.
    #[serde(default)]
    pub interface: Option<i32>,
    #[serde(default)]
    pub read_only: bool,
    /// Physical unit of integer and float values, e.g. `"us"`.
    #[serde(default)]
    pub unit: String,
    pub kind: FakeNodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FakeNodeKind {
    Integer { value: i64, min: i64, max: i64 },
    Boolean { value: bool },
    Float { value: f64, min: f64, max: f64 },
    String { value: String },
    Enumeration {
        value: String,
        entries: Vec<String>,
        /// Entries that exist but cannot be set.
        #[serde(default)]
        unavailable: Vec<String>,
    },
    Command,
    Category,
}

impl FakeNodeSpec {
    pub fn new(name: impl Into<String>, kind: FakeNodeKind) -> Self {
        Self {
            name: name.into(),
            visibility: 0,
            interface: None,
            read_only: false,
            unit: String::new(),
            kind,
        }
    }

    pub fn integer(name: &str, value: i64, min: i64, max: i64) -> Self {
        Self::new(name, FakeNodeKind::Integer { value, min, max })
    }

    pub fn float(name: &str, value: f64, min: f64, max: f64) -> Self {
        Self::new(name, FakeNodeKind::Float { value, min, max })
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self::new(name, FakeNodeKind::Boolean { value })
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self::new(
            name,
            FakeNodeKind::String {
                value: value.to_string(),
            },
        )
    }

    pub fn enumeration(name: &str, value: &str, entries: &[&str]) -> Self {
        Self::new(
            name,
            FakeNodeKind::Enumeration {
                value: value.to_string(),
                entries: entries.iter().map(|e| e.to_string()).collect(),
                unavailable: Vec::new(),
            },
        )
    }

    pub fn command(name: &str) -> Self {
        Self::new(name, FakeNodeKind::Command)
    }

    pub fn with_visibility(mut self, visibility: i32) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Mark enumeration entries as present but not settable.
    pub fn with_unavailable(mut self, symbols: &[&str]) -> Self {
        if let FakeNodeKind::Enumeration { unavailable, .. } = &mut self.kind {
            unavailable.extend(symbols.iter().map(|s| s.to_string()));
        }
        self
    }
}

impl FakeDeviceSpec {
    /// A GigE camera with the usual image format and acquisition nodes.
    pub fn camera(serial: &str, model: &str) -> Self {
        let friendly = format!("{model} ({serial})");
        let properties = [
            ("SerialNumber", serial),
            ("ModelName", model),
            ("VendorName", "Basler"),
            ("DeviceClass", "BaslerGigE"),
            ("FriendlyName", friendly.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            properties,
            stream_grabber_channels: 1,
            nodes: vec![
                FakeNodeSpec::string("DeviceModelName", model).read_only(),
                FakeNodeSpec::integer("Width", 640, 16, 1280).with_unit("px"),
                FakeNodeSpec::integer("Height", 480, 16, 1024).with_unit("px"),
                FakeNodeSpec::integer("PayloadSize", 640 * 480, 0, i64::MAX).read_only(),
                FakeNodeSpec::enumeration(
                    "PixelFormat",
                    "Mono8",
                    &["Mono8", "Mono12p", "BayerRG8", "RGB8packed"],
                )
                .with_unavailable(&["Mono12p"]),
                FakeNodeSpec::float("ExposureTime", 5000.0, 19.0, 1.0e7).with_unit("us"),
                FakeNodeSpec::enumeration("GainAuto", "Off", &["Off", "Once", "Continuous"]),
                FakeNodeSpec::boolean("ReverseX", false).with_visibility(1),
                FakeNodeSpec::command("AcquisitionStart"),
                FakeNodeSpec::command("AcquisitionStop"),
                FakeNodeSpec::new("ImageFormatControl", FakeNodeKind::Category),
            ],
            open_error: None,
        }
    }

    pub fn serial(&self) -> Option<&str> {
        self.properties.get("SerialNumber").map(String::as_str)
    }
}

impl FakeCameraScenario {
    /// `count` cameras with serials `21000000`, `21000001`, ...
    pub fn with_cameras(count: usize) -> Self {
        let devices = (0..count)
            .map(|i| FakeDeviceSpec::camera(&format!("{}", 21_000_000 + i), "acA640-120gm"))
            .collect();
        Self {
            devices,
            transport_layer_nodes: vec![
                FakeNodeSpec::integer("HeartbeatTimeout", 3000, 500, 60_000),
                FakeNodeSpec::command("DeviceDiscovery"),
            ],
            stream_nodes: vec![
                FakeNodeSpec::integer("MaxNumBuffer", 16, 1, 1024),
                FakeNodeSpec::integer("MaxBufferSize", 640 * 480, 1, i64::MAX),
            ],
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioIoError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a scenario from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScenarioIoError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write this scenario to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScenarioIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
