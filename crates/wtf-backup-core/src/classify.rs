//! Deciding which files inside a snapshot belong to an addon
//!
//! WoW keeps addon settings in `SavedVariables` (account-wide) and
//! `SavedVariablesPerCharacter` folders, either directly under an account or
//! under `<realm>/<character>`. An addon owns `<addon>.lua` in any of those
//! folders, plus companion files named `<addon>_*`.

use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Structural shapes, `{addon}` is replaced by the escaped addon name.
/// `*` covers exactly one path segment.
const ADDON_PATTERNS: &[&str] = &[
    // Account-wide settings
    "Account/*/SavedVariables/{addon}.lua",
    // Per realm/character settings
    "Account/*/*/*/SavedVariables/{addon}.lua",
    "Account/*/SavedVariablesPerCharacter/{addon}.lua",
    "Account/*/*/*/SavedVariablesPerCharacter/{addon}.lua",
];

/// Folders whose `<addon>_` prefixed files count as companions
const COMPANION_FOLDERS: &[&str] = &["SavedVariables", "SavedVariablesPerCharacter"];

/// Compiled membership test for one addon
#[derive(Debug, Clone)]
pub struct AddonMatcher {
    addon: String,
    globs: GlobSet,
    companions: Vec<String>,
}

impl AddonMatcher {
    /// Compile the patterns for `addon`
    ///
    /// Glob metacharacters in the name are escaped, so `My*Addon` only
    /// matches a file literally named `My*Addon.lua`. A blank name matches
    /// nothing.
    pub fn new(addon: &str) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut companions = Vec::new();

        if !addon.trim().is_empty() {
            let escaped = globset::escape(addon);
            for pattern in ADDON_PATTERNS {
                let pattern = pattern.replace("{addon}", &escaped);
                let glob = GlobBuilder::new(&pattern)
                    .literal_separator(true)
                    .backslash_escape(false)
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        addon: addon.to_string(),
                        source,
                    })?;
                builder.add(glob);
            }

            companions = COMPANION_FOLDERS
                .iter()
                .map(|folder| format!("/{}/{}_", folder, addon))
                .collect();
        }

        let globs = builder.build().map_err(|source| Error::InvalidPattern {
            addon: addon.to_string(),
            source,
        })?;

        Ok(Self {
            addon: addon.to_string(),
            globs,
            companions,
        })
    }

    /// The addon name this matcher was built for
    pub fn addon(&self) -> &str {
        &self.addon
    }

    /// Whether `relative_path` (relative to a snapshot root) belongs to the addon.
    ///
    /// Matching is case-sensitive.
    pub fn matches(&self, relative_path: &str) -> bool {
        let path = normalize_separators(relative_path);

        self.globs.is_match(path.as_str())
            || self.companions.iter().any(|needle| path.contains(needle.as_str()))
    }
}

/// One-shot form of [`AddonMatcher::matches`]
///
/// A name whose patterns fail to compile matches nothing.
pub fn matches(relative_path: &str, addon: &str) -> bool {
    AddonMatcher::new(addon)
        .map(|matcher| matcher.matches(relative_path))
        .unwrap_or(false)
}

#[cfg(windows)]
fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(not(windows))]
fn normalize_separators(path: &str) -> String {
    path.to_string()
}
