use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

use crate::theme::catppuccin::Mocha as P;

/// Highlighter colours, one per instruction class.
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub op_right: Color,   // '>'
    pub op_left: Color,    // '<'
    pub op_inc: Color,     // '+'
    pub op_dec: Color,     // '-'
    pub op_output: Color,  // '.'
    pub op_input: Color,   // ','
    pub op_bracket: Color, // '[' and ']'
    pub unknown: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            op_right: P::SKY,
            op_left: P::TEAL,
            op_inc: P::GREEN,
            op_dec: P::RED,
            op_output: P::YELLOW,
            op_input: P::PEACH,
            op_bracket: P::MAUVE,
            unknown: P::SURFACE2,
        }
    }
}

/// Execution limits applied when no flag or environment variable sets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Limits {
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub colors: Colors,
    pub limits: Limits,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| load_from_toml().unwrap_or_default())
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        return None;
    }

    let name = s.to_ascii_lowercase();
    Some(match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Purple,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightmagenta" | "light_magenta" => Color::LightPurple,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        _ => return None,
    })
}

fn load_from_toml() -> Option<Config> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("inmfuck.toml");

    let content = fs::read_to_string(path).ok()?;
    Some(parse_config(&content))
}

/// Very small hand-rolled reader: `[section]` headers and `key = value`
/// pairs. Values may be quoted. Unknown keys and bad values are ignored.
pub fn parse_config(content: &str) -> Config {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            let val = if val_raw.len() >= 2 && val_raw.starts_with('"') && val_raw.ends_with('"') {
                &val_raw[1..val_raw.len() - 1]
            } else {
                val_raw
            };
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_string(), val.to_string());
        }
    }

    let mut cfg = Config::default();

    if let Some(colors) = sections.get("colors") {
        macro_rules! set {
            ($field:ident, $key:literal) => {
                if let Some(v) = colors.get($key).and_then(|s| parse_color(s)) {
                    cfg.colors.$field = v;
                }
            };
        }

        set!(op_right, "op_right");
        set!(op_left, "op_left");
        set!(op_inc, "op_inc");
        set!(op_dec, "op_dec");
        set!(op_output, "op_output");
        set!(op_input, "op_input");
        set!(op_bracket, "op_bracket");
        set!(unknown, "unknown");
    }

    if let Some(limits) = sections.get("limits") {
        cfg.limits.timeout_ms = limits.get("timeout_ms").and_then(|s| s.parse().ok());
        cfg.limits.max_steps = limits.get("max_steps").and_then(|s| s.parse().ok());
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config(""), Config::default());
    }

    #[test]
    fn reads_colors_and_limits() {
        let cfg = parse_config(
            r##"
# comment
[colors]
op_inc = "#102030"
op_dec = red
op_left = "not-a-color"

[limits]
timeout_ms = 1500
max_steps = "10000"
"##,
        );
        assert_eq!(cfg.colors.op_inc, Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(cfg.colors.op_dec, Color::Red);
        assert_eq!(cfg.colors.op_left, Colors::default().op_left);
        assert_eq!(cfg.limits, Limits { timeout_ms: Some(1500), max_steps: Some(10_000) });
    }

    #[test]
    fn keys_outside_their_section_are_ignored() {
        let cfg = parse_config("timeout_ms = 5\n[other]\nop_inc = red\n");
        assert_eq!(cfg, Config::default());
    }
}
