// ABOUTME: Configuration file loading, validation, and hierarchical merging for gifpeek
// ABOUTME: Folds config, environment toggles and terminal detection into resolved Settings

use crate::constants::{env as env_vars, timeouts};
use crate::image_protocols::detection::{ProtocolChoice, TerminalCapabilities, resolve_cell_aspect};
use crate::image_protocols::InlineProtocol;
use crate::preview::PreviewConfig;
use anyhow::{Context, Result, anyhow};
use gifpeek_decode::DecodeLimits;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub decode: Option<DecodeSection>,
    #[serde(default)]
    pub preview: Option<PreviewSection>,
    #[serde(default)]
    pub fetch: Option<FetchSection>,
}

/// Decode limits; delays are integer milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DecodeSection {
    #[serde(default)]
    pub max_frames: Option<i64>,
    #[serde(default)]
    pub max_pixels: Option<i64>,
    #[serde(default)]
    pub max_bytes: Option<i64>,
    #[serde(default)]
    pub default_delay: Option<u64>,
    #[serde(default)]
    pub min_delay: Option<u64>,
    #[serde(default)]
    pub max_delay: Option<u64>,
    #[serde(default)]
    pub strict_animated_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct PreviewSection {
    #[serde(default, deserialize_with = "validate_protocol")]
    pub protocol: Option<String>,
    #[serde(default)]
    pub software_animation: Option<bool>,
    #[serde(default)]
    pub cell_aspect: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct FetchSection {
    #[serde(default, deserialize_with = "validate_duration")]
    pub timeout: Option<String>,
    /// `-1` disables the cap
    #[serde(default)]
    pub max_bytes: Option<i64>,
}

impl Config {
    /// Load the file given on the command line, or the standard locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_paths(&Self::get_config_paths()),
        }
    }

    /// Load configuration files in order; later files override earlier ones and
    /// missing files are skipped
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            log::debug!("loading config from {}", path.display());
            config = config.merge(Self::load_from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config").join("gifpeek").join("config.toml"));
        }

        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(config_home).join("gifpeek").join("config.toml"));
        }

        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("gifpeek.toml"));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            decode: merge_section(self.decode, other.decode, DecodeSection::merge),
            preview: merge_section(self.preview, other.preview, PreviewSection::merge),
            fetch: merge_section(self.fetch, other.fetch, FetchSection::merge),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(aspect) = self.preview.as_ref().and_then(|p| p.cell_aspect) {
            if !(aspect > 0.1 && aspect < 2.0) {
                return Err(anyhow!("preview.cell_aspect must be between 0.1 and 2, got {aspect}"));
            }
        }
        if let Some(decode) = &self.decode {
            if let (Some(min), Some(max)) = (decode.min_delay, decode.max_delay) {
                if max != 0 && max < min {
                    log::warn!("decode.max_delay {max}ms is below min_delay {min}ms and will be raised");
                }
            }
        }
        Ok(())
    }
}

fn merge_section<T>(base: Option<T>, other: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (base, other) {
        (Some(base), Some(other)) => Some(merge(base, other)),
        (base, other) => other.or(base),
    }
}

impl DecodeSection {
    fn merge(self, other: DecodeSection) -> DecodeSection {
        DecodeSection {
            max_frames: other.max_frames.or(self.max_frames),
            max_pixels: other.max_pixels.or(self.max_pixels),
            max_bytes: other.max_bytes.or(self.max_bytes),
            default_delay: other.default_delay.or(self.default_delay),
            min_delay: other.min_delay.or(self.min_delay),
            max_delay: other.max_delay.or(self.max_delay),
            strict_animated_only: other.strict_animated_only.or(self.strict_animated_only),
        }
    }

    pub fn limits(&self) -> DecodeLimits {
        let defaults = DecodeLimits::default();
        let millis = |value: Option<u64>, fallback: Duration| value.map_or(fallback, Duration::from_millis);
        DecodeLimits {
            max_frames: self.max_frames.unwrap_or(defaults.max_frames),
            max_pixels: self.max_pixels.unwrap_or(defaults.max_pixels),
            max_bytes: self.max_bytes.unwrap_or(defaults.max_bytes),
            default_delay: millis(self.default_delay, defaults.default_delay),
            min_delay: millis(self.min_delay, defaults.min_delay),
            max_delay: millis(self.max_delay, defaults.max_delay),
            strict_animated_only: self.strict_animated_only.unwrap_or(defaults.strict_animated_only),
        }
    }
}

impl PreviewSection {
    fn merge(self, other: PreviewSection) -> PreviewSection {
        PreviewSection {
            protocol: other.protocol.or(self.protocol),
            software_animation: other.software_animation.or(self.software_animation),
            cell_aspect: other.cell_aspect.or(self.cell_aspect),
        }
    }
}

impl FetchSection {
    fn merge(self, other: FetchSection) -> FetchSection {
        FetchSection {
            timeout: other.timeout.or(self.timeout),
            max_bytes: other.max_bytes.or(self.max_bytes),
        }
    }
}

/// Everything the commands need, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub limits: DecodeLimits,
    pub preview: PreviewConfig,
    pub fetch_timeout: Duration,
    /// `None` means unlimited
    pub fetch_max_bytes: Option<u64>,
}

impl Settings {
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Environment overrides beat the config file, which beats terminal detection
    pub fn resolve_with<F>(config: &Config, getenv: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let detected = TerminalCapabilities::detect_with(&getenv);
        let preview = config.preview.clone().unwrap_or_default();
        let env_is_set = |key: &str| getenv(key).is_some_and(|value| !value.trim().is_empty());

        let env_forces_protocol = getenv(env_vars::INLINE)
            .map(|value| value.parse::<ProtocolChoice>())
            .is_some_and(|choice| choice != Ok(ProtocolChoice::Auto));
        let configured_protocol = preview
            .protocol
            .as_deref()
            .and_then(|value| value.parse::<ProtocolChoice>().ok());
        let protocol = match configured_protocol {
            Some(ProtocolChoice::Fixed(protocol)) if !env_forces_protocol => protocol,
            _ => detected.protocol,
        };

        let software_animation = if env_is_set(env_vars::SOFTWARE_ANIM) {
            detected.software_animation
        } else {
            preview.software_animation.unwrap_or(detected.software_animation)
        };

        let limits = config.decode.clone().unwrap_or_default().limits();
        let fetch = config.fetch.clone().unwrap_or_default();
        let fetch_timeout = fetch
            .timeout
            .as_deref()
            .and_then(|value| parse_duration(value).ok())
            .unwrap_or(timeouts::DEFAULT_FETCH_TIMEOUT);
        let fetch_max_bytes = match fetch.max_bytes {
            Some(max) if max < 0 => None,
            Some(max) if max > 0 => Some(max as u64),
            _ => limits.normalized().byte_cap(),
        };

        Settings {
            limits,
            preview: PreviewConfig {
                protocol,
                software_animation,
                cell_aspect: resolve_cell_aspect(detected.cell_aspect, preview.cell_aspect),
            },
            fetch_timeout,
            fetch_max_bytes,
        }
    }

    pub fn protocol(&self) -> InlineProtocol {
        self.preview.protocol
    }
}

/// Parse "500ms", "15s", "2m" or "1h"
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (number, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(split) => value.split_at(split),
        None => return Err(anyhow!("Invalid duration '{value}': missing unit (ms, s, m or h)")),
    };
    let amount: u64 = number
        .parse()
        .map_err(|_| anyhow!("Invalid duration '{value}': expected a whole number"))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        "h" => Ok(Duration::from_secs(amount * 3600)),
        _ => Err(anyhow!("Invalid duration '{value}': unit must be ms, s, m or h")),
    }
}

// Custom deserializer for protocol validation
fn validate_protocol<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<String>::deserialize(deserializer)?;
    if let Some(ref protocol) = value {
        protocol.parse::<ProtocolChoice>().map_err(D::Error::custom)?;
    }
    Ok(value)
}

// Custom deserializer for duration validation
fn validate_duration<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<String>::deserialize(deserializer)?;
    if let Some(ref duration) = value {
        match parse_duration(duration) {
            Ok(parsed) if parsed.is_zero() => {
                return Err(D::Error::custom(format!("Duration '{duration}' must be positive")));
            }
            Ok(_) => {}
            Err(err) => return Err(D::Error::custom(err.to_string())),
        }
    }
    Ok(value)
}
