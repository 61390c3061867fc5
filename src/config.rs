use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Socket the daemon listens on when nothing else is configured
pub const DEFAULT_SOCKET: &str = "/run/robot-face/face.sock";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// e.g., "info" | "debug"
    pub log_level: Option<String>,
    /// command socket path
    pub socket: Option<PathBuf>,
    /// panel wiring & geometry
    pub display: Option<DisplayConfig>,
}

/// Panel settings as written by the user; every field may be left out
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub spi_bus: Option<String>,    // e.g. "/dev/spidev0.0"
    pub speed_hz: Option<u32>,
    pub cs_pin: Option<u32>,        // BCM numbering
    pub dc_pin: Option<u32>,
    pub reset_pin: Option<u32>,
    pub backlight_pin: Option<u32>,
    pub headless: Option<bool>,     // never touch hardware
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// 240x240 IPS panel with backlight pin
    #[default]
    St7789,
    /// 128x160 TFT, backlight hard-wired
    St7735,
    /// No panel attached
    #[serde(rename = "none")]
    #[value(name = "none")]
    NoPanel,
}

impl DriverKind {
    pub fn name(&self) -> &'static str {
        match self {
            DriverKind::St7789 => "st7789",
            DriverKind::St7735 => "st7735",
            DriverKind::NoPanel => "none",
        }
    }
}

/// Pin assignment, BCM numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPins {
    pub cs: u32,
    pub dc: u32,
    pub reset: u32,
    pub backlight: Option<u32>,
}

/// Fully resolved panel settings, profile defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSettings {
    pub driver: DriverKind,
    pub width: u32,
    pub height: u32,
    pub rotation: u16,
    pub spi_bus: String,
    pub speed_hz: u32,
    pub pins: PanelPins,
    pub headless: bool,
}

impl DisplayConfig {
    /// Build from the host framework's untyped attribute map.
    ///
    /// Numeric attributes are truncated to integers; an attribute of any
    /// other type is ignored and the profile default applies.
    pub fn from_attributes(attrs: &Map<String, Value>) -> Result<Self, ConfigError> {
        let int = |name: &str| -> Result<Option<u32>, ConfigError> {
            match attrs.get(name).and_then(Value::as_f64) {
                None => Ok(None),
                Some(v) if v < 0.0 || v > u32::MAX as f64 => Err(ConfigError::Validation(
                    format!("attribute {} out of range: {}", name, v)
                )),
                Some(v) => Ok(Some(v.trunc() as u32)),
            }
        };

        let rotate_deg = match int("rotation")? {
            Some(r) => Some(u16::try_from(r).map_err(|_| {
                ConfigError::Validation(format!("rotation out of range: {}", r))
            })?),
            None => None,
        };

        let driver = match attrs.get("driver").and_then(Value::as_str) {
            Some(name) => Some(DriverKind::from_str(name, false).map_err(|_| {
                ConfigError::Validation(format!("unknown driver: {}", name))
            })?),
            None => None,
        };

        Ok(Self {
            driver,
            width: int("width")?,
            height: int("height")?,
            rotate_deg,
            spi_bus: attrs.get("spi_bus").and_then(Value::as_str).map(str::to_string),
            speed_hz: int("speed_hz")?,
            cs_pin: int("cs_pin")?,
            dc_pin: int("dc_pin")?,
            reset_pin: int("reset_pin")?,
            backlight_pin: int("backlight_pin")?,
            headless: attrs.get("headless").and_then(Value::as_bool),
        })
    }

    /// Apply profile defaults and validate
    pub fn resolve(&self) -> Result<PanelSettings, ConfigError> {
        let driver = self.driver.unwrap_or_default();
        let (width, height, backlight) = match driver {
            DriverKind::St7735 => (128, 160, None),
            DriverKind::St7789 | DriverKind::NoPanel => (240, 240, Some(18)),
        };

        let cs = self.cs_pin.unwrap_or(8);
        let settings = PanelSettings {
            driver,
            width: self.width.unwrap_or(width),
            height: self.height.unwrap_or(height),
            rotation: self.rotate_deg.unwrap_or(90),
            // CE0 is BCM 8, CE1 is BCM 7
            spi_bus: self.spi_bus.clone().unwrap_or_else(|| {
                format!("/dev/spidev0.{}", if cs == 7 { 1 } else { 0 })
            }),
            speed_hz: self.speed_hz.unwrap_or(24_000_000),
            pins: PanelPins {
                cs,
                dc: self.dc_pin.unwrap_or(25),
                reset: self.reset_pin.unwrap_or(24),
                backlight: self.backlight_pin.or(backlight),
            },
            headless: self.headless.unwrap_or(false) || driver == DriverKind::NoPanel,
        };

        validate_panel(&settings)?;
        Ok(settings)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "robot-face", about = "Robot face display service", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Command socket path
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub socket: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub display_driver: Option<DriverKind>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    /// Run without touching display hardware
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Merge defaults, YAML and `cli` without touching process args
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

impl Config {
    /// Resolved panel settings (profile defaults when no display section)
    pub fn panel(&self) -> Result<PanelSettings, ConfigError> {
        self.display.clone().unwrap_or_default().resolve()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.socket.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET))
    }
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/robot-face/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/robot-face/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/robot-face.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["robot-face.yaml", "config.yaml", "config/robot-face.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.socket.is_some()         { dst.socket = src.socket; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()        { dst.driver = src.driver; }
    if src.width.is_some()         { dst.width = src.width; }
    if src.height.is_some()        { dst.height = src.height; }
    if src.rotate_deg.is_some()    { dst.rotate_deg = src.rotate_deg; }
    if src.spi_bus.is_some()       { dst.spi_bus = src.spi_bus; }
    if src.speed_hz.is_some()      { dst.speed_hz = src.speed_hz; }
    if src.cs_pin.is_some()        { dst.cs_pin = src.cs_pin; }
    if src.dc_pin.is_some()        { dst.dc_pin = src.dc_pin; }
    if src.reset_pin.is_some()     { dst.reset_pin = src.reset_pin; }
    if src.backlight_pin.is_some() { dst.backlight_pin = src.backlight_pin; }
    if src.headless.is_some()      { dst.headless = src.headless; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.socket.is_some()          { cfg.socket = cli.socket.clone(); }
    let any_case = cli.display_driver.is_some()
        || cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some()
        || cli.headless;

    if any_case && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_driver.is_some()      { display.driver = cli.display_driver; }
        if cli.display_width.is_some()       { display.width = cli.display_width; }
        if cli.display_height.is_some()      { display.height = cli.display_height; }
        if cli.display_rotate_deg.is_some()  { display.rotate_deg = cli.display_rotate_deg; }
        if cli.headless                      { display.headless = Some(true); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.panel().map(|_| ())
}

fn validate_panel(p: &PanelSettings) -> Result<(), ConfigError> {
    if p.width == 0 || p.height == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    // the canvas works in i32 coordinates
    if p.width > i32::MAX as u32 / 16 || p.height > i32::MAX as u32 / 16 {
        return Err(ConfigError::Validation("display width/height out of range".into()));
    }
    match p.rotation {
        0 | 90 | 180 | 270 => {},
        _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
    }
    if p.pins.cs != 8 && p.pins.cs != 7 {
        return Err(ConfigError::Validation(
            format!("cs_pin must be a hardware chip select (8 or 7), got {}", p.pins.cs)
        ));
    }
    if p.speed_hz == 0 {
        return Err(ConfigError::Validation("display speed_hz must be > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_profile() {
        let p = DisplayConfig::default().resolve().unwrap();
        assert_eq!(p.driver, DriverKind::St7789);
        assert_eq!((p.width, p.height), (240, 240));
        assert_eq!(p.rotation, 90);
        assert_eq!(p.pins, PanelPins { cs: 8, dc: 25, reset: 24, backlight: Some(18) });
        assert_eq!(p.spi_bus, "/dev/spidev0.0");
        assert_eq!(p.speed_hz, 24_000_000);
        assert!(!p.headless);
    }

    #[test]
    fn test_st7735_profile() {
        let cfg = DisplayConfig { driver: Some(DriverKind::St7735), ..Default::default() };
        let p = cfg.resolve().unwrap();
        assert_eq!((p.width, p.height), (128, 160));
        assert_eq!(p.pins.backlight, None);
    }

    #[test]
    fn test_none_driver_is_headless() {
        let cfg = DisplayConfig { driver: Some(DriverKind::NoPanel), ..Default::default() };
        assert!(cfg.resolve().unwrap().headless);
    }

    #[test]
    fn test_ce1_picks_second_spidev() {
        let cfg = DisplayConfig { cs_pin: Some(7), ..Default::default() };
        assert_eq!(cfg.resolve().unwrap().spi_bus, "/dev/spidev0.1");
    }

    #[test]
    fn test_from_attributes() {
        let cfg = DisplayConfig::from_attributes(&attrs(json!({
            "cs_pin": 7,
            "dc_pin": 22.9,
            "rotation": 180,
            "width": 128,
            "height": "tall",
        })))
        .unwrap();
        assert_eq!(cfg.cs_pin, Some(7));
        assert_eq!(cfg.dc_pin, Some(22));
        assert_eq!(cfg.rotate_deg, Some(180));
        assert_eq!(cfg.width, Some(128));
        // wrong type falls back to the default
        assert_eq!(cfg.height, None);
        assert_eq!(cfg.resolve().unwrap().height, 240);
    }

    #[test]
    fn test_from_attributes_driver() {
        let cfg = DisplayConfig::from_attributes(&attrs(json!({ "driver": "st7735" }))).unwrap();
        assert_eq!(cfg.driver, Some(DriverKind::St7735));
        assert!(DisplayConfig::from_attributes(&attrs(json!({ "driver": "ili9341" }))).is_err());
    }

    #[test]
    fn test_from_attributes_rejects_negative() {
        assert!(DisplayConfig::from_attributes(&attrs(json!({ "width": -240 }))).is_err());
    }

    #[test]
    fn test_validation() {
        let zero = DisplayConfig { width: Some(0), ..Default::default() };
        assert!(zero.resolve().is_err());

        let tilted = DisplayConfig { rotate_deg: Some(45), ..Default::default() };
        assert!(tilted.resolve().is_err());

        let bad_cs = DisplayConfig { cs_pin: Some(5), ..Default::default() };
        assert!(bad_cs.resolve().is_err());
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.yaml");
        fs::write(
            &path,
            "log_level: debug\ndisplay:\n  driver: st7735\n  rotate_deg: 0\n  width: 100\n",
        )
        .unwrap();

        let cli = Cli {
            config: Some(path),
            display_width: Some(120),
            headless: true,
            ..Default::default()
        };
        let cfg = load_with(&cli).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        let p = cfg.panel().unwrap();
        assert_eq!(p.driver, DriverKind::St7735);
        assert_eq!(p.rotation, 0);
        assert_eq!(p.width, 120);
        assert_eq!(p.height, 160);
        assert!(p.headless);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli { config: Some(PathBuf::from("/nonexistent/face.yaml")), ..Default::default() };
        assert!(matches!(load_with(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_socket_default() {
        assert_eq!(Config::default().socket_path(), PathBuf::from(DEFAULT_SOCKET));
    }
}
