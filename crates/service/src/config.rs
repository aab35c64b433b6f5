//! Daemon configuration file
//!
//! One TOML file holds the `[global]` daemon settings and every controller
//! section. A controller's [`ControllerConfig`] is layered from `[default]`,
//! then `[profiles.<name>]` when the merged result names a profile, then its
//! own `[controllers."vvvv-pppp"]` section, which is applied again after the
//! profile so it always wins.
//!
//! Controller keys:
//!
//! | Key | Value |
//! |-----|-------|
//! | `b`, `a`, `dpad_up`, ... | `"1,2,-x"`: up to two pins and one signed axis |
//! | `driver`, `profile`, `controller_type` | names, lowercased |
//! | `input_max_packet_size`, `output_max_packet_size` | bytes |
//! | `simulate_<button>` | `"l+r"`: chord that presses `<button>` |
//! | `alias_<button>` | another button name, or `none` |
//! | `deadzone_<axis>`, `factor_<axis>` | percent |
//! | `left_stick_x` ... `right_stick_y` | signed axis or `none` |
//! | `stick_activation_threshold` | percent |
//! | `color_body`, `color_buttons`, `color_leftgrip`, `color_rightgrip`, `color_led` | `#RRGGBB` or `#RRGGBBAA` |
//!
//! A bad value only drops its own key; unknown keys are logged and skipped.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use padbridge_controller_types::{
    AnalogAxis, AnalogBinding, ComboConfig, ControllerButton, ControllerConfig,
};
use padbridge_controllers::{DriverKind, driver_for_device};
use padbridge_errors::ConfigError;
use padbridge_usb::UsbDeviceInfo;
use padbridge_virtual::BackendKind;
use padbridge_virtual::priority::NICENESS_RANGE;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::discovery::{DiscoveryFilter, DiscoveryMode, VidPid};

/// Location used when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/config/padbridge/config.toml";

/// Written to disk when the configuration file does not exist yet.
pub const DEFAULT_TEMPLATE: &str = include_str!("../config/default.toml");

/// Accepted `log_level` values.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Mapping written for an auto-added controller that has no driver profile.
pub const DEFAULT_MAPPING: [(ControllerButton, u8); 12] = [
    (ControllerButton::B, 1),
    (ControllerButton::A, 2),
    (ControllerButton::X, 3),
    (ControllerButton::Y, 4),
    (ControllerButton::L, 5),
    (ControllerButton::R, 6),
    (ControllerButton::ZL, 7),
    (ControllerButton::ZR, 8),
    (ControllerButton::Minus, 9),
    (ControllerButton::Plus, 10),
    (ControllerButton::Capture, 11),
    (ControllerButton::Home, 12),
];

/// `[global]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Read budget of one poll in milliseconds
    pub polling_timeout_ms: u32,
    /// Niceness of the polling threads, 0 keeps the default
    pub polling_thread_priority: i32,
    pub log_level: String,
    pub discovery_mode: DiscoveryMode,
    /// `"vvvv-pppp"` identifiers consulted by the VID/PID discovery modes
    pub discovery_vidpid: Vec<String>,
    /// Append a section for controllers missing from the file
    pub auto_add_controller: bool,
    /// `device_list` or `shared_state`
    pub backend: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            polling_timeout_ms: 10,
            polling_thread_priority: 0,
            log_level: "info".to_string(),
            discovery_mode: DiscoveryMode::default(),
            discovery_vidpid: Vec::new(),
            auto_add_controller: true,
            backend: BackendKind::default().name().to_string(),
        }
    }
}

impl GlobalConfig {
    /// Rejects values the daemon cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.polling_timeout_ms == 0 {
            anyhow::bail!("Invalid polling timeout: {} ms", self.polling_timeout_ms);
        }

        if !NICENESS_RANGE.contains(&self.polling_thread_priority) {
            anyhow::bail!(
                "Invalid polling thread priority: {} (expected {}..={})",
                self.polling_thread_priority,
                NICENESS_RANGE.start(),
                NICENESS_RANGE.end()
            );
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            anyhow::bail!("Invalid log level: {}", self.log_level);
        }

        self.backend_kind()?;
        let ids = self.discovery_ids()?;

        if self.discovery_mode.uses_vidpid_list() && ids.is_empty() {
            warn!(
                mode = %self.discovery_mode,
                "discovery_vidpid is empty, only Xbox One interfaces (if any) will be picked up"
            );
        }

        Ok(())
    }

    pub fn backend_kind(&self) -> Result<BackendKind> {
        self.backend
            .parse()
            .with_context(|| format!("Invalid backend: {}", self.backend))
    }

    pub fn discovery_ids(&self) -> Result<Vec<VidPid>> {
        self.discovery_vidpid
            .iter()
            .map(|id| id.parse().context("Invalid discovery_vidpid entry"))
            .collect()
    }

    pub fn discovery_filter(&self) -> Result<DiscoveryFilter> {
        Ok(DiscoveryFilter::new(self.discovery_mode, self.discovery_ids()?))
    }
}

/// The configuration file and its parsed document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: toml::Table,
}

impl ConfigStore {
    /// Reads `path`, writing [`DEFAULT_TEMPLATE`] there first when the file
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "config file not found, creating default");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            fs::write(path, DEFAULT_TEMPLATE)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        }

        let document = read_document(path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `[global]` section, defaults when absent.
    pub fn global(&self) -> Result<GlobalConfig> {
        match self.document.get("global") {
            Some(section) => section
                .clone()
                .try_into()
                .context("Failed to parse [global] section"),
            None => Ok(GlobalConfig::default()),
        }
    }

    pub fn has_controller_section(&self, id: VidPid) -> bool {
        self.controller_section(id).is_some()
    }

    /// Builds the configuration of the controller described by `info`.
    ///
    /// With `auto_add` set, a controller without its own section gets one
    /// appended to the file first.
    pub fn controller_config(&mut self, info: &UsbDeviceInfo, auto_add: bool) -> ControllerConfig {
        let id = VidPid::of(info);
        let id_name = id.to_string();
        let mut config = ControllerConfig::default();

        debug!(controller = %id, "loading controller config [default]");
        if let Some(section) = named_table(&self.document, "default") {
            apply_section(&mut config, "default", section);
        }

        if !self.has_controller_section(id) && auto_add {
            let profile = default_profile(info);
            info!(controller = %id, profile, "controller not found in config file, adding it");
            if let Err(e) = self.add_controller(id, profile) {
                error!(controller = %id, error = %e, "could not add controller to config file");
            }
        }

        let own = self.controller_section(id).cloned();
        if let Some(section) = &own {
            apply_section(&mut config, &id_name, section);
        }

        if !config.profile.is_empty() {
            let profile = config.profile.clone();
            debug!(controller = %id, profile, "loading controller profile");
            match self.profile_section(&profile) {
                Some(section) => apply_section(&mut config, &profile, section),
                None => warn!(controller = %id, profile, "profile section not found"),
            }
            if let Some(section) = &own {
                apply_section(&mut config, &id_name, section);
            }
        }

        if config.has_face_buttons() {
            info!(
                controller = %id,
                b = config.pins(ControllerButton::B)[0],
                a = config.pins(ControllerButton::A)[0],
                y = config.pins(ControllerButton::Y)[0],
                x = config.pins(ControllerButton::X)[0],
                "controller successfully loaded"
            );
        } else {
            let problem = ConfigError::NoButtonsBound {
                vid: id.vendor_id,
                pid: id.product_id,
            };
            warn!("{problem} - sticks might work but buttons will not");
        }

        config
    }

    /// Appends a section for `id` to the file and reloads it. An empty
    /// `profile` writes [`DEFAULT_MAPPING`] instead of a profile reference.
    pub fn add_controller(&mut self, id: VidPid, profile: &str) -> Result<()> {
        let section = auto_added_section(id, profile, Utc::now());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open config file: {}", self.path.display()))?;
        file.write_all(section.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;
        file.flush()?;

        self.document = read_document(&self.path)?;
        Ok(())
    }

    fn controller_section(&self, id: VidPid) -> Option<&toml::Table> {
        named_table(self.document.get("controllers")?.as_table()?, &id.to_string())
    }

    fn profile_section(&self, profile: &str) -> Option<&toml::Table> {
        named_table(self.document.get("profiles")?.as_table()?, profile)
    }
}

fn read_document(path: &Path) -> Result<toml::Table> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_document(&text).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_document(text: &str) -> Result<toml::Table, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Section names are matched case-insensitively.
fn named_table<'a>(table: &'a toml::Table, name: &str) -> Option<&'a toml::Table> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_table())
}

/// Profile written for an auto-added controller: its driver's profile, or
/// none for generic HID devices.
pub fn default_profile(info: &UsbDeviceInfo) -> &'static str {
    match driver_for_device(info, "") {
        Some(DriverKind::Generic) | None => "",
        Some(kind) => kind.name(),
    }
}

/// Text appended to the file for an auto-added controller.
pub fn auto_added_section(id: VidPid, profile: &str, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "\n[controllers.\"{id}\"] # Automatically added on {} UTC\n",
        now.format("%Y-%m-%d %H:%M:%S")
    );
    if profile.is_empty() {
        for (button, pin) in DEFAULT_MAPPING {
            out.push_str(&format!("{} = \"{pin}\"\n", button.name()));
        }
    } else {
        out.push_str(&format!("profile = \"{profile}\"\n"));
    }
    out
}

/// Applies every key of one section on top of `config`.
pub fn apply_section(config: &mut ControllerConfig, section: &str, table: &toml::Table) {
    for (key, value) in table {
        let Some(text) = value_text(value) else {
            warn!(section, key, "unsupported value type, continue");
            continue;
        };
        match apply_key(config, &key.to_ascii_lowercase(), &text) {
            Ok(true) => {}
            Ok(false) => warn!(section, key, "unknown key, continue"),
            Err(e) => error!(section, key, value = %text, error = %e, "invalid configuration value"),
        }
    }
}

fn value_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Boolean(flag) => Some(u8::from(*flag).to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        _ => None,
    }
}

/// Applies one key. `Ok(false)` means the key is not recognised.
pub fn apply_key(config: &mut ControllerConfig, key: &str, value: &str) -> Result<bool, ConfigError> {
    if let Ok(button) = key.parse::<ControllerButton>() {
        apply_binding(config, button, value)?;
        return Ok(true);
    }

    let value = value.trim();
    match key {
        "driver" => config.driver = value.to_ascii_lowercase(),
        "profile" => config.profile = value.to_ascii_lowercase(),
        "controller_type" => config.controller_type = value.parse()?,
        "input_max_packet_size" => config.input_max_packet_size = parse_number(key, value)?,
        "output_max_packet_size" => config.output_max_packet_size = parse_number(key, value)?,
        "stick_activation_threshold" => config.stick_activation_threshold = parse_percent(key, value)?,
        "color_body" => config.body_color = value.parse()?,
        "color_buttons" => config.buttons_color = value.parse()?,
        "color_leftgrip" => config.left_grip_color = value.parse()?,
        "color_rightgrip" => config.right_grip_color = value.parse()?,
        "color_led" => config.led_color = value.parse()?,
        _ => return apply_prefixed_key(config, key, value),
    }
    Ok(true)
}

fn apply_prefixed_key(config: &mut ControllerConfig, key: &str, value: &str) -> Result<bool, ConfigError> {
    if let Some(target) = key.strip_prefix("simulate_") {
        let combo = parse_combo(target.parse()?, value)?;
        config.set_combo(combo)?;
    } else if let Some(button) = key.strip_prefix("alias_") {
        let button: ControllerButton = button.parse()?;
        config.buttons_alias[button.index()] = parse_alias(value)?;
    } else if let Some(axis) = key.strip_prefix("deadzone_") {
        let axis: AnalogAxis = axis.parse()?;
        config.analog_deadzone_percent[axis.index()] = parse_percent(key, value)?;
    } else if let Some(axis) = key.strip_prefix("factor_") {
        let axis: AnalogAxis = axis.parse()?;
        config.analog_factor_percent[axis.index()] = parse_number(key, value)?;
    } else if let Some((stick, vertical)) = stick_key(key) {
        let binding = parse_axis_token(value)?;
        let slot = &mut config.sticks[stick];
        if vertical {
            slot.y = binding;
        } else {
            slot.x = binding;
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}

/// Replaces the binding of `button` with the pins and axis in `value`.
///
/// Every new binding starts from scratch. Numeric tokens are pins, any
/// other token is an analog axis (`x`, `-rz`, `none`). The valid part of
/// the list is kept when a token is rejected.
pub fn apply_binding(config: &mut ControllerConfig, button: ControllerButton, value: &str) -> Result<(), ConfigError> {
    let mut pins = Vec::new();
    let mut analog = None;
    let mut first_error = None;

    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Ok(pin) = token.parse::<u32>() {
            pins.push(pin);
            continue;
        }
        match parse_axis_token(token) {
            Ok(binding) => analog = binding,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    config.buttons_analog[button.index()] = analog;
    let pinned = config.set_pins(button, &pins);
    match first_error {
        Some(e) => Err(e),
        None => pinned,
    }
}

fn parse_axis_token(token: &str) -> Result<Option<AnalogBinding>, ConfigError> {
    let name = token.trim().trim_start_matches(['+', '-']);
    if name.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    token.parse().map(Some)
}

fn parse_combo(target: ControllerButton, value: &str) -> Result<ComboConfig, ConfigError> {
    let invalid = || ConfigError::invalid_value(format!("simulate_{target}"), format!("expecting \"button+button\", got \"{value}\""));
    let (first, second) = value.split_once('+').ok_or_else(invalid)?;
    if second.contains('+') {
        return Err(invalid());
    }
    Ok(ComboConfig::new(target, first.parse()?, second.parse()?))
}

fn parse_alias(value: &str) -> Result<ControllerButton, ConfigError> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(ControllerButton::None);
    }
    value.parse()
}

fn stick_key(key: &str) -> Option<(usize, bool)> {
    match key {
        "left_stick_x" => Some((0, false)),
        "left_stick_y" => Some((0, true)),
        "right_stick_x" => Some((1, false)),
        "right_stick_y" => Some((1, true)),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid_value(key, e.to_string()))
}

fn parse_percent(key: &str, value: &str) -> Result<u8, ConfigError> {
    let percent: u8 = parse_number(key, value)?;
    if percent > 100 {
        return Err(ConfigError::invalid_value(key, format!("{percent} is above 100%")));
    }
    Ok(percent)
}
