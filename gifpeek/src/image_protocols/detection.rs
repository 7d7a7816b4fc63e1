// ABOUTME: Terminal capability detection for inline image protocol support
// ABOUTME: Reads the environment through an injectable lookup so detection is testable

use crate::constants::{env as env_vars, ui};
use std::fmt;
use std::str::FromStr;

/// Inline graphics protocol family used for the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InlineProtocol {
    #[default]
    None,
    /// Cell-bitmap protocol with terminal-side animation
    Kitty,
    /// Whole-file inline protocol
    Iterm,
}

impl fmt::Display for InlineProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineProtocol::None => write!(f, "none"),
            InlineProtocol::Kitty => write!(f, "kitty"),
            InlineProtocol::Iterm => write!(f, "iterm"),
        }
    }
}

/// Result of parsing a protocol override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolChoice {
    Auto,
    Fixed(InlineProtocol),
}

impl FromStr for ProtocolChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(ProtocolChoice::Auto),
            "kitty" => Ok(ProtocolChoice::Fixed(InlineProtocol::Kitty)),
            "iterm" | "iterm2" => Ok(ProtocolChoice::Fixed(InlineProtocol::Iterm)),
            "none" | "off" | "false" | "0" => Ok(ProtocolChoice::Fixed(InlineProtocol::None)),
            other => Err(format!(
                "unknown protocol '{other}' (expected auto, kitty, iterm or none)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalCapabilities {
    pub protocol: InlineProtocol,
    /// The terminal is known to mishandle native animation
    pub software_animation: bool,
    /// Cell width divided by cell height, when the environment supplied one
    pub cell_aspect: Option<f64>,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    pub fn detect_with<F>(getenv: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| getenv(key).unwrap_or_default();
        Self {
            protocol: detect_protocol(&get),
            software_animation: detect_software_animation(&get),
            cell_aspect: detect_cell_aspect(&get),
        }
    }
}

fn detect_protocol(get: &dyn Fn(&str) -> String) -> InlineProtocol {
    match get(env_vars::INLINE).parse::<ProtocolChoice>() {
        Ok(ProtocolChoice::Fixed(protocol)) => return protocol,
        Ok(ProtocolChoice::Auto) => {}
        Err(message) => {
            log::warn!("{}: {message}, disabling inline images", env_vars::INLINE);
            return InlineProtocol::None;
        }
    }

    if !get("KITTY_WINDOW_ID").trim().is_empty() {
        return InlineProtocol::Kitty;
    }

    let term_program = get("TERM_PROGRAM").to_lowercase();
    if term_program.contains("ghostty") {
        return InlineProtocol::Kitty;
    }
    if term_program.contains("iterm") || !get("ITERM_SESSION_ID").trim().is_empty() {
        return InlineProtocol::Iterm;
    }
    if term_program.contains("apple_terminal") {
        return InlineProtocol::None;
    }

    let term = get("TERM").to_lowercase();
    if term.contains("xterm-kitty") || term.contains("ghostty") {
        return InlineProtocol::Kitty;
    }

    InlineProtocol::None
}

fn detect_software_animation(get: &dyn Fn(&str) -> String) -> bool {
    let forced = get(env_vars::SOFTWARE_ANIM).trim().to_lowercase();
    if !forced.is_empty() {
        return matches!(forced.as_str(), "1" | "true" | "yes");
    }
    let term_program = get("TERM_PROGRAM").to_lowercase();
    let term = get("TERM").to_lowercase();
    term_program.contains("ghostty") || term.contains("ghostty")
}

fn detect_cell_aspect(get: &dyn Fn(&str) -> String) -> Option<f64> {
    let raw = get(env_vars::CELL_ASPECT);
    parse_cell_aspect(raw.trim())
}

/// Accept a cell aspect strictly between 0.1 and 2
pub fn parse_cell_aspect(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| *value > 0.1 && *value < 2.0)
}

/// Cell aspect from the environment, then config, then the default
pub fn resolve_cell_aspect(detected: Option<f64>, configured: Option<f64>) -> f64 {
    detected
        .or(configured.filter(|value| *value > 0.1 && *value < 2.0))
        .unwrap_or(ui::DEFAULT_CELL_ASPECT)
}
