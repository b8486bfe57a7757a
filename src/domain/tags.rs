//! Tag registry: labels and fills for clause/phrase codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Suffix selecting the forward variant of a tag.
pub const FORWARD_SUFFIX: char = 'f';

/// How intervals of one tag are filled; entries rotate per tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// Solid colours
    Palette(Vec<String>),
    /// Pattern ids defined by the renderer
    Patterns(Vec<String>),
}

impl Fill {
    pub fn entries(&self) -> &[String] {
        match self {
            Fill::Palette(v) | Fill::Patterns(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDef {
    pub label: String,
    pub fill: Fill,
}

impl TagDef {
    fn palette(label: &str, colors: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            fill: Fill::Palette(colors.iter().map(|c| c.to_string()).collect()),
        }
    }
}

/// Lookup from registry key (`IC`, `DCf`, ...) to its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRegistry {
    defs: BTreeMap<String, TagDef>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        let defs = [
            (
                "IC",
                TagDef::palette(
                    "independent clause",
                    &["#89CFF1", "#6EB1D6", "#5293BB", "#3776A1", "#1B5886", "#003A6B"],
                ),
            ),
            (
                "DC",
                TagDef::palette(
                    "dependent clause",
                    &[
                        "#f2d6a6", "#f0c493", "#e59f7d", "#d47557", "#b75f4b", "#9f4e3b",
                        "#7c3e29", "#5a2a1e",
                    ],
                ),
            ),
            (
                "DCf",
                TagDef::palette(
                    "dependent clause before the subject of the referenced clause",
                    &["#e38989", "#c55a5a", "#ae3a3a"],
                ),
            ),
            (
                "PP",
                TagDef::palette(
                    "participial phrase or similar, optional",
                    &["#C7E9C0", "#A1D99B", "#74C476", "#41AB5D"],
                ),
            ),
            (
                "PPf",
                TagDef::palette(
                    "participial phrase or similar, optional, before the refered subject",
                    &["#6EE389", "#34B75A", "#0D8A37"],
                ),
            ),
            (
                "AP",
                TagDef::palette(
                    "other adjunct phrase, optional",
                    &["#f8ed62", "#e9d700", "#dab600", "#a98600"],
                ),
            ),
            ("AT", TagDef::palette("attribution", &["#808080"])),
            (
                "CP",
                TagDef {
                    label: "compound predicate or coordinated parallel constituent".into(),
                    fill: Fill::Patterns(
                        (1..=4).map(|n| format!("contrast_line{n}")).collect(),
                    ),
                },
            ),
            (
                "FG",
                TagDef::palette("fragment", &["#C7A3E6", "#A884D2", "#8A66BC"]),
            ),
        ];

        Self {
            defs: defs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl TagRegistry {
    /// Add or replace the definition for `key`.
    pub fn insert(&mut self, key: impl Into<String>, def: TagDef) {
        self.defs.insert(key.into(), def);
    }

    pub fn get(&self, key: &str) -> Option<&TagDef> {
        self.defs.get(key)
    }

    /// Registry key for a node: the forward variant when requested and
    /// defined, else the plain tag when defined.
    pub fn resolve_key(&self, tag: &str, forward: bool) -> Option<&str> {
        if tag.is_empty() {
            return None;
        }
        if forward {
            let key = format!("{tag}{FORWARD_SUFFIX}");
            if let Some((k, _)) = self.defs.get_key_value(&key) {
                return Some(k.as_str());
            }
        }
        self.defs.get_key_value(tag).map(|(k, _)| k.as_str())
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.defs.get(key).map(|d| d.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
