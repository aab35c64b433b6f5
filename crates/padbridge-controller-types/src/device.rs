//! Controller type, platform device type and optional features.

use std::fmt;
use std::str::FromStr;

use padbridge_errors::ConfigError;

/// Which first-party controller the virtual device impersonates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerType {
    Unknown,
    #[default]
    Pro,
    ProWithBattery,
    Tarragon,
    Snes,
    PokeballPlus,
    Gamecube,
    ThirdPartyPro,
    N64,
    Sega,
    Nes,
    Famicom,
}

impl ControllerType {
    /// Configuration spelling.
    pub const fn name(self) -> &'static str {
        match self {
            ControllerType::Unknown => "unknown",
            ControllerType::Pro => "pro",
            ControllerType::ProWithBattery => "prowithbattery",
            ControllerType::Tarragon => "tarragon",
            ControllerType::Snes => "snes",
            ControllerType::PokeballPlus => "pokeballplus",
            ControllerType::Gamecube => "gamecube",
            ControllerType::ThirdPartyPro => "3rdpartypro",
            ControllerType::N64 => "n64",
            ControllerType::Sega => "sega",
            ControllerType::Nes => "nes",
            ControllerType::Famicom => "famicom",
        }
    }

    /// Platform device type registered by the device-list backend.
    ///
    /// `Unknown` falls back to the full-key pro layout.
    pub const fn device_type(self) -> DeviceType {
        match self {
            ControllerType::ProWithBattery => DeviceType::FullKey3,
            ControllerType::Tarragon => DeviceType::FullKey6,
            ControllerType::Snes => DeviceType::Lucia,
            ControllerType::PokeballPlus => DeviceType::Palma,
            ControllerType::Gamecube => DeviceType::FullKey13,
            ControllerType::Pro | ControllerType::Unknown => DeviceType::FullKey15,
            ControllerType::ThirdPartyPro => DeviceType::System19,
            ControllerType::N64 => DeviceType::Lagon,
            ControllerType::Sega => DeviceType::Lager,
            ControllerType::Nes => DeviceType::LarkNesLeft,
            ControllerType::Famicom => DeviceType::LarkHvcLeft,
        }
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerType {
    type Err = ConfigError;

    /// Unrecognized names map to [`ControllerType::Unknown`]; only an empty
    /// value is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let ty = match lower.as_str() {
            "" => return Err(ConfigError::invalid_value("controller_type", "empty value")),
            "pro" => ControllerType::Pro,
            "prowithbattery" => ControllerType::ProWithBattery,
            "tarragon" => ControllerType::Tarragon,
            "snes" => ControllerType::Snes,
            "pokeballplus" => ControllerType::PokeballPlus,
            "gamecube" => ControllerType::Gamecube,
            "3rdpartypro" => ControllerType::ThirdPartyPro,
            "n64" => ControllerType::N64,
            "sega" => ControllerType::Sega,
            "nes" => ControllerType::Nes,
            "famicom" => ControllerType::Famicom,
            _ => ControllerType::Unknown,
        };
        Ok(ty)
    }
}

/// Device families understood by the platform's virtual-device registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceType {
    FullKey3 = 3,
    FullKey6 = 6,
    FullKey13 = 13,
    FullKey15 = 15,
    Palma = 16,
    System19 = 19,
    Lucia = 20,
    Lagon = 21,
    Lager = 22,
    LarkHvcLeft = 23,
    LarkNesLeft = 25,
}

/// Optional capabilities a controller driver may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerFeature {
    Rumble,
    Bluetooth,
    Sixaxis,
    Pairing,
    Nothing,
}
