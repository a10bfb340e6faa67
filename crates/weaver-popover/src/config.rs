//! Popover configuration, loaded from TOML.

use std::path::Path;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::error::PopoverError;

/// Marker emitted when italic is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItalicMarker {
    /// `_text_`
    #[default]
    Underscore,
    /// `*text*`
    Asterisk,
}

impl ItalicMarker {
    pub const fn as_str(self) -> &'static str {
        match self {
            ItalicMarker::Underscore => "_",
            ItalicMarker::Asterisk => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    /// Pixels between the top of the selection and the bottom of the toolbar.
    pub gap: f64,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self { gap: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub italic_marker: ItalicMarker,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    pub toolbar: ToolbarConfig,
    pub format: FormatConfig,
}

impl PopoverConfig {
    /// Read a config file, substituting `$VAR` references from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PopoverError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PopoverError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config_string = substitute_vars(&raw, env::vars());

        tracing::debug!(path = %path.display(), "loaded popover config");
        Self::from_toml_str(&config_string)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, PopoverError> {
        Ok(toml::from_str(s)?)
    }
}

/// Replace `$NAME` with its value for every variable in `vars`.
///
/// Longer names go first, so `$HOMEDIR` is not eaten by `$HOME`.
fn substitute_vars(s: &str, vars: impl IntoIterator<Item = (String, String)>) -> String {
    let mut vars: Vec<_> = vars.into_iter().collect();
    vars.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut out = s.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("${k}"), &v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PopoverConfig::from_toml_str("").unwrap();
        assert_eq!(config, PopoverConfig::default());
        assert_eq!(config.toolbar.gap, 10.0);
        assert_eq!(config.format.italic_marker, ItalicMarker::Underscore);
    }

    #[test]
    fn test_partial_config() {
        let config = PopoverConfig::from_toml_str(
            r#"
            [format]
            italic_marker = "asterisk"
            "#,
        )
        .unwrap();
        assert_eq!(config.format.italic_marker, ItalicMarker::Asterisk);
        assert_eq!(config.toolbar.gap, 10.0);
    }

    #[test]
    fn test_invalid_marker_is_rejected() {
        let err = PopoverConfig::from_toml_str("[format]\nitalic_marker = \"tilde\"\n");
        assert!(matches!(err, Err(PopoverError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = PopoverConfig::load("/nonexistent/popover.toml").unwrap_err();
        assert!(matches!(err, PopoverError::ConfigRead { .. }));
    }

    #[test]
    fn test_prefix_variable_does_not_clobber_longer_name() {
        let out = substitute_vars(
            "a = \"$HOME\"\nb = \"$HOMEDIR\"\n",
            vars(&[("HOME", "/home/u"), ("HOMEDIR", "/srv/u")]),
        );
        assert_eq!(out, "a = \"/home/u\"\nb = \"/srv/u\"\n");
    }

    #[test]
    fn test_unknown_variable_left_alone() {
        let out = substitute_vars("gap = $NOT_SET", vars(&[("GAP", "1")]));
        assert_eq!(out, "gap = $NOT_SET");
    }

    #[test]
    fn test_load_substitutes_environment() {
        let path = env::temp_dir().join(format!("popover-env-{}.toml", std::process::id()));
        fs::write(&path, "[toolbar]\ngap = $WEAVER_POPOVER_TEST_GAP\n").unwrap();
        // SAFETY: no other test reads or writes this variable.
        unsafe { env::set_var("WEAVER_POPOVER_TEST_GAP", "24.5") };

        let config = PopoverConfig::load(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().toolbar.gap, 24.5);
    }
}
