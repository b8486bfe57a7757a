//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sse/sse.toml`
//! 3. Local config: `<corpus_dir>/.sse.toml`
//! 4. Environment variables: `SSE_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::layout::{
    LayoutConfig, DEFAULT_BAR_HEIGHT, DEFAULT_FALLBACK_FILL, DEFAULT_ROOT_FILL, DEFAULT_WORD_CAP,
};
use crate::domain::tags::{Fill, TagDef, TagRegistry};
use crate::util::path::expand_env_vars;

/// Layout tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Words fitting the full width (0 = longest sentence of the file)
    pub word_cap: u32,
    /// Base bar height of an unscaled sentence
    pub bar_height: f64,
    /// Fixed display width in pixels (0 = fluid)
    pub display_width: u32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            word_cap: DEFAULT_WORD_CAP,
            bar_height: DEFAULT_BAR_HEIGHT,
            display_width: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorSettings {
    pub root_default: String,
    pub fill_fallback: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            root_default: DEFAULT_ROOT_FILL.into(),
            fill_fallback: DEFAULT_FALLBACK_FILL.into(),
        }
    }
}

/// Tag registry entry as written in a config file.
///
/// Fields left out keep the value of the built-in entry of the same key.
/// `patterns` wins over `palette` when both are given.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawTagDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
}

impl RawTagDef {
    /// Overlay this entry onto `base`.
    fn apply_to(&self, base: Option<&TagDef>) -> TagDef {
        let fill = match (&self.patterns, &self.palette, base) {
            (Some(p), _, _) => Fill::Patterns(p.clone()),
            (None, Some(p), _) => Fill::Palette(p.clone()),
            (None, None, Some(b)) => b.fill.clone(),
            (None, None, None) => Fill::Palette(Vec::new()),
        };
        TagDef {
            label: self
                .label
                .clone()
                .or_else(|| base.map(|b| b.label.clone()))
                .unwrap_or_default(),
            fill,
        }
    }
}

/// Raw layout settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub word_cap: Option<u32>,
    pub bar_height: Option<f64>,
    pub display_width: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawColorSettings {
    pub root_default: Option<String>,
    pub fill_fallback: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub corpus_dir: Option<PathBuf>,
    pub layout: RawLayoutSettings,
    pub colors: RawColorSettings,
    pub tags: Option<BTreeMap<String, RawTagDef>>,
}

/// Unified configuration for sse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding corpus files (default: current directory)
    pub corpus_dir: PathBuf,
    pub layout: LayoutSettings,
    pub colors: ColorSettings,
    /// Extra or overriding tag registry entries
    pub tags: BTreeMap<String, RawTagDef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("."),
            layout: LayoutSettings::default(),
            colors: ColorSettings::default(),
            tags: BTreeMap::new(),
        }
    }
}

/// Get the XDG config directory for sse.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sse").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sse.toml"))
}

/// Get the path to the local config file in a corpus directory.
pub fn local_config_path(corpus_dir: &Path) -> PathBuf {
    corpus_dir.join(".sse.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge tag maps key by key.
    ///
    /// A key prefixed with `!` removes the inherited entry of that key.
    pub fn merge_tags(
        base: &BTreeMap<String, RawTagDef>,
        overlay: &BTreeMap<String, RawTagDef>,
    ) -> BTreeMap<String, RawTagDef> {
        let mut result = base.clone();
        for (key, def) in overlay {
            if let Some(negated) = key.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(key.clone(), def.clone());
            }
        }
        result
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.corpus_dir.to_string_lossy().as_ref());
        self.corpus_dir = PathBuf::from(expanded);
    }

    fn apply_scalars(&self, overlay: &RawSettings) -> Self {
        Self {
            corpus_dir: overlay
                .corpus_dir
                .clone()
                .unwrap_or_else(|| self.corpus_dir.clone()),
            layout: LayoutSettings {
                word_cap: overlay.layout.word_cap.unwrap_or(self.layout.word_cap),
                bar_height: overlay.layout.bar_height.unwrap_or(self.layout.bar_height),
                display_width: overlay
                    .layout
                    .display_width
                    .unwrap_or(self.layout.display_width),
            },
            colors: ColorSettings {
                root_default: overlay
                    .colors
                    .root_default
                    .clone()
                    .unwrap_or_else(|| self.colors.root_default.clone()),
                fill_fallback: overlay
                    .colors
                    .fill_fallback
                    .clone()
                    .unwrap_or_else(|| self.colors.fill_fallback.clone()),
            },
            tags: self.tags.clone(),
        }
    }

    /// Apply global config onto defaults: a `tags` table REPLACES the inherited one.
    fn apply_global(&self, global: &RawSettings) -> Self {
        let mut next = self.apply_scalars(global);
        if let Some(tags) = &global.tags {
            next.tags = tags.clone();
        }
        next
    }

    /// Merge a corpus-local config: `tags` entries merge key by key.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut next = self.apply_scalars(overlay);
        if let Some(tags) = &overlay.tags {
            next.tags = Self::merge_tags(&self.tags, tags);
        }
        next
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `corpus_dir` - Corpus directory for local config, kept over any
    ///   `corpus_dir` from files or env; when None the layered value is used
    #[instrument(level = "debug")]
    pub fn load(corpus_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = corpus_dir {
            current.corpus_dir = dir.to_path_buf();
        }
        let local_path = local_config_path(&current.corpus_dir);
        if local_path.exists() {
            debug!(path = %local_path.display(), "loading local config");
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        // an explicit directory beats every file and env layer
        if let Some(dir) = corpus_dir {
            current.corpus_dir = dir.to_path_buf();
        }
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply SSE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SSE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("corpus_dir") {
            settings.corpus_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("layout.word_cap") {
            settings.layout.word_cap = u32::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("layout.word_cap out of range: {val}"),
            })?;
        }
        if let Ok(val) = config.get_float("layout.bar_height") {
            settings.layout.bar_height = val;
        }
        if let Ok(val) = config.get_int("layout.display_width") {
            settings.layout.display_width =
                u32::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("layout.display_width out of range: {val}"),
                })?;
        }
        if let Ok(val) = config.get_string("colors.root_default") {
            settings.colors.root_default = val;
        }
        if let Ok(val) = config.get_string("colors.fill_fallback") {
            settings.colors.fill_fallback = val;
        }

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        let h = self.layout.bar_height;
        if !h.is_finite() || h <= 0.0 {
            return Err(ApplicationError::Config {
                message: format!("layout.bar_height must be positive, got {h}"),
            });
        }
        Ok(())
    }

    /// Tag registry: built-in entries overlaid with the `tags` table.
    pub fn registry(&self) -> TagRegistry {
        let mut registry = TagRegistry::default();
        for (key, raw) in &self.tags {
            let def = raw.apply_to(registry.get(key));
            registry.insert(key.clone(), def);
        }
        registry
    }

    /// Build the layout engine configuration.
    pub fn layout_config(&self) -> Result<LayoutConfig, ApplicationError> {
        self.validate()?;
        Ok(LayoutConfig {
            word_cap: self.layout.word_cap,
            bar_height: self.layout.bar_height,
            root_fill: self.colors.root_default.clone(),
            fallback_fill: self.colors.fill_fallback.clone(),
            registry: self.registry(),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# sse configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sse/sse.toml     (defines your baseline)
#   Local:  <corpus_dir>/.sse.toml     (corpus-specific additions)
#   Env:    SSE_* environment variables (explicit overrides, e.g. SSE_LAYOUT__WORD_CAP=30)
#
# Tag Merge Semantics:
#   A [tags] table in the global config REPLACES compiled overrides.
#   Local [tags] entries merge key by key with the global ones.
#   Use a "!KEY" entry in local config to REMOVE an inherited override:
#     [tags."!DC"]

# Directory holding corpus files
# corpus_dir = "~/corpus"

[layout]
# Words that fit the full width; 0 = longest sentence of the file
# word_cap = 50

# Base bar height; long sentences grow by the same factor they shrink
# bar_height = 45.0

# Fixed display width in pixels; 0 = fluid
# display_width = 0

[colors]
# root_default = "#808080"
# fill_fallback = "rgba(231,215,182,.35)"

# Tag registry overrides; omitted fields keep the built-in value
# [tags.IC]
# label = "independent clause"
# palette = ["#89CFF1", "#6EB1D6"]
#
# [tags.QT]
# label = "quotation"
# patterns = ["contrast_line1"]
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
