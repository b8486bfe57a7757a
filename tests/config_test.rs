//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Local: tag entries merge key by key, `!KEY` removes one
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use sse::application::ApplicationError;
use sse::config::{local_config_path, Settings};
use sse::domain::Fill;

#[test]
fn given_no_local_config_when_load_then_uses_defaults_with_corpus_dir() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.corpus_dir, dir.path());
    assert_eq!(settings.layout.word_cap, 50);
    assert_eq!(settings.layout.bar_height, 45.0);
}

#[test]
fn given_local_config_when_load_then_overrides_layout_scalars() {
    let dir = TempDir::new().unwrap();
    let local = r##"
[layout]
word_cap = 30
bar_height = 60.0

[colors]
root_default = "#000000"
"##;
    fs::write(local_config_path(dir.path()), local).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");
    let layout = settings.layout_config().unwrap();

    assert_eq!(layout.word_cap, 30);
    assert_eq!(layout.bar_height, 60.0);
    assert_eq!(layout.root_fill, "#000000");
    // untouched keys keep their defaults
    assert_eq!(layout.fallback_fill, "rgba(231,215,182,.35)");
}

#[test]
fn given_local_tags_when_load_then_registry_gains_and_overrides_entries() {
    let dir = TempDir::new().unwrap();
    let local = r##"
[tags.QT]
label = "quotation"
patterns = ["contrast_line2"]

[tags.IC]
palette = ["#111111"]
"##;
    fs::write(local_config_path(dir.path()), local).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");
    let registry = settings.registry();

    assert_eq!(registry.len(), 10);
    let qt = registry.get("QT").unwrap();
    assert_eq!(qt.label, "quotation");
    assert_eq!(qt.fill, Fill::Patterns(vec!["contrast_line2".to_string()]));

    let ic = registry.get("IC").unwrap();
    assert_eq!(ic.label, "independent clause");
    assert_eq!(ic.fill.entries().to_vec(), vec!["#111111".to_string()]);
}

#[test]
fn given_non_positive_bar_height_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[layout]\nbar_height = 0.0\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("bar_height"));
}

#[test]
fn given_malformed_local_config_when_load_then_names_file() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[layout\nword_cap = ").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(".sse.toml"));
}

#[test]
fn given_corpus_dir_in_local_config_when_load_with_dir_then_explicit_dir_wins() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "corpus_dir = \"/from_local\"\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.corpus_dir, dir.path());
}
