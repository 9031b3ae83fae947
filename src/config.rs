use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use cross_xdg::BaseDirs;

use crate::tape::CellWidth;

/// Values read from `bf.toml`. Missing or malformed keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub bits: Option<u32>,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Fully resolved settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub width: CellWidth,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Command-line overrides, highest precedence.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bits: Option<u32>,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    /// Resolve: flags -> env (`BF_BITS`, `BF_MAX_STEPS`, `BF_TIMEOUT_MS`) -> config file -> defaults.
    pub fn resolve(overrides: &Overrides) -> Self {
        let file = load().unwrap_or_default();
        Self::resolve_with(overrides, &file, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::resolve`] with the file contents and environment supplied by the caller.
    pub fn resolve_with<F>(overrides: &Overrides, file: &FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bits = overrides
            .bits
            .or_else(|| env("BF_BITS").and_then(|s| s.trim().parse().ok()))
            .or(file.bits)
            .unwrap_or(8);
        let max_steps = overrides
            .max_steps
            .or_else(|| env("BF_MAX_STEPS").and_then(|s| s.trim().parse().ok()))
            .or(file.max_steps);
        let timeout_ms = overrides
            .timeout_ms
            .or_else(|| env("BF_TIMEOUT_MS").and_then(|s| s.trim().parse().ok()))
            .or(file.timeout_ms);

        Self {
            width: CellWidth::from_bits(bits),
            max_steps,
            timeout_ms,
        }
    }
}

/// Location of the config file: `$BF_CONFIG`, else `<xdg config home>/bf.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

/// Read the config file, if there is one.
pub fn load() -> Option<FileConfig> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Option<FileConfig> {
    let content = fs::read_to_string(path).ok()?;
    Some(parse(&content))
}

/// Very small hand-rolled parser: look for the [interpreter] section and key = value pairs.
pub fn parse(content: &str) -> FileConfig {
    let mut in_section = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == "interpreter";
            continue;
        }
        if !in_section { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            // Drop trailing comments, accept quoted or unquoted
            let val_raw = val_raw.split('#').next().unwrap_or("").trim();
            let val = val_raw.trim_matches('"').replace('_', "");
            map.insert(key.trim().to_string(), val);
        }
    }

    FileConfig {
        bits: map.get("bits").and_then(|v| v.parse().ok()),
        max_steps: map.get("max_steps").and_then(|v| v.parse().ok()),
        timeout_ms: map.get("timeout_ms").and_then(|v| v.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interpreter_section_only() {
        let cfg = parse(
            r#"
# settings for bf
[colors]
bits = 64

[interpreter]
bits = 16
max_steps = "1_000_000"  # plenty
timeout_ms = nope
"#,
        );
        assert_eq!(
            cfg,
            FileConfig {
                bits: Some(16),
                max_steps: Some(1_000_000),
                timeout_ms: None,
            }
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse(""), FileConfig::default());
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let file = FileConfig {
            bits: Some(16),
            max_steps: Some(10),
            timeout_ms: Some(5),
        };
        let env = |key: &str| match key {
            "BF_BITS" => Some("32".to_string()),
            _ => None,
        };

        let s = Settings::resolve_with(&Overrides::default(), &file, env);
        assert_eq!(s.width, CellWidth::Bits32);
        assert_eq!(s.max_steps, Some(10));
        assert_eq!(s.timeout_ms, Some(5));

        let flags = Overrides {
            bits: Some(64),
            max_steps: Some(1),
            timeout_ms: None,
        };
        let s = Settings::resolve_with(&flags, &file, env);
        assert_eq!(s.width, CellWidth::Bits64);
        assert_eq!(s.max_steps, Some(1));
    }

    #[test]
    fn defaults_are_eight_bits_and_unbounded() {
        let s = Settings::resolve_with(&Overrides::default(), &FileConfig::default(), |_| None);
        assert_eq!(s.width, CellWidth::Bits8);
        assert_eq!(s.max_steps, None);
        assert_eq!(s.timeout_ms, None);
    }

    #[test]
    fn unsupported_bits_fall_back() {
        let file = FileConfig { bits: Some(7), ..FileConfig::default() };
        let s = Settings::resolve_with(&Overrides::default(), &file, |_| None);
        assert_eq!(s.width, CellWidth::Bits8);
    }

    #[test]
    fn load_from_missing_file_is_none() {
        assert!(load_from(Path::new("/no/such/bf.toml")).is_none());
    }
}
