//! Run options shared by the merge and render stages.
//!
//! Built once at startup (defaults, then config file, then CLI flags) and
//! passed by reference; nothing mutates it afterwards.

use std::collections::BTreeSet;

use crate::config::Config;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "paleGreen";
pub const DEFAULT_WRAP_WIDTH: u32 = 150;

/// A set of ticket identifiers given on the command line or in config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet(BTreeSet<String>);

impl KeySet {
    /// Parse a comma-delimited list. Entries are trimmed; empty ones dropped.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|key| key.as_ref().trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
        )
    }
}

/// Per-identifier visibility and decoration rules.
#[derive(Debug, Clone, Default)]
pub struct KeyRules {
    pub hide: KeySet,
    pub show: KeySet,
    pub highlight: KeySet,
}

impl KeyRules {
    /// Hidden means listed in `hide` and not overridden by `show`.
    #[must_use]
    pub fn is_hidden(&self, key: &str) -> bool {
        self.hide.contains(key) && !self.show.contains(key)
    }

    /// Always shown, even as an orphan.
    #[must_use]
    pub fn is_pinned(&self, key: &str) -> bool {
        self.show.contains(key)
    }

    #[must_use]
    pub fn is_highlighted(&self, key: &str) -> bool {
        self.highlight.contains(key)
    }
}

/// Immutable options for one run.
#[derive(Debug, Clone)]
pub struct Options {
    pub hide_summary: bool,
    pub hide_orphans: bool,
    pub keys: KeyRules,
    pub highlight_color: String,
    pub wrap_width: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hide_summary: false,
            hide_orphans: true,
            keys: KeyRules::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl Options {
    /// Options as described by a loaded config file.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            hide_summary: config.render.hide_summary,
            hide_orphans: config.render.hide_orphans,
            keys: KeyRules {
                hide: config.keys.hide.iter().collect(),
                show: config.keys.show.iter().collect(),
                highlight: config.keys.highlight.iter().collect(),
            },
            highlight_color: config.render.highlight_color.clone(),
            wrap_width: config.render.wrap_width,
        }
    }
}
