//! Path normalization for user-supplied folder paths

use std::path::PathBuf;

/// Separator convention to normalize towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `/` separators
    Unix,
    /// `\` separators, optional drive letter
    Windows,
}

impl PathStyle {
    /// Convention of the host this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Unix
        }
    }

    fn separator(self) -> char {
        match self {
            PathStyle::Unix => '/',
            PathStyle::Windows => '\\',
        }
    }

    fn is_separator(self, c: char) -> bool {
        match self {
            PathStyle::Unix => c == '/',
            PathStyle::Windows => c == '/' || c == '\\',
        }
    }
}

/// Normalize a path for the host: expand `~`, use host separators, drop
/// redundant segments. An empty path stays empty.
pub fn normalize_path(raw: &str) -> PathBuf {
    PathBuf::from(normalize_path_for(raw, PathStyle::current()))
}

/// [`normalize_path`] for an explicit separator convention.
///
/// On the Windows convention a drive letter is uppercased, e.g.
/// `c:/Games/WoW/./WTF` becomes `C:\Games\WoW\WTF`.
pub fn normalize_path_for(raw: &str, style: PathStyle) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let expanded = expand_home(raw, style);
    let mut cleaned = clean(&expanded, style);

    if style == PathStyle::Windows && has_drive(&cleaned) {
        let drive = cleaned[..1].to_ascii_uppercase();
        cleaned.replace_range(..1, &drive);
    }

    cleaned
}

/// Replace a leading `~` (alone or followed by a separator) with the home directory
fn expand_home(raw: &str, style: PathStyle) -> String {
    let Some(rest) = raw.strip_prefix('~') else {
        return raw.to_string();
    };
    if !(rest.is_empty() || rest.starts_with(|c: char| style.is_separator(c))) {
        return raw.to_string();
    }

    match dirs::home_dir() {
        Some(home) => format!("{}{}{}", home.display(), style.separator(), rest),
        None => raw.to_string(),
    }
}

fn has_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexical cleanup: collapse separators, drop `.`, resolve `..` against
/// preceding segments. Never climbs above a root; an empty result is `.`.
fn clean(path: &str, style: PathStyle) -> String {
    let (volume, rest) = if style == PathStyle::Windows && has_drive(path) {
        path.split_at(2)
    } else {
        ("", path)
    };

    let rooted = rest.starts_with(|c: char| style.is_separator(c));
    let mut parts: Vec<&str> = Vec::new();

    for part in rest.split(|c: char| style.is_separator(c)) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let separator = style.separator().to_string();
    let mut out = String::from(volume);
    if rooted {
        out.push_str(&separator);
    }
    out.push_str(&parts.join(&separator));

    if parts.is_empty() && !rooted {
        out.push('.');
    }
    out
}
