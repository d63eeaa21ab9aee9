//! Phrase-list autocoding
//!
//! A rule file holds lines of the form
//!
//! ```text
//! 0-codeable-auto: Trump, Xi, WHO
//! 8-covid-19: coronavirus, covid-19, COVID-19
//! ```
//!
//! Only the first `window` characters of the story are searched. Rules are
//! tried in file order and phrases in listed order; the first literal,
//! case-sensitive hit decides the mode. "Xi said the coronavirus was under
//! control" is therefore `0-codeable-auto`, not `8-covid-19`.

use crate::categories::is_valid_mode;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One line of the rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocodeRule {
    pub mode: String,
    pub phrases: Vec<String>,
}

/// Ordered rule set plus the search window
#[derive(Debug, Clone)]
pub struct Autocoder {
    rules: Vec<AutocodeRule>,
    window: usize,
    source: PathBuf,
}

impl Autocoder {
    /// Load a rule file
    ///
    /// A missing file is a startup error; a malformed line is a rule
    /// format error naming the line.
    pub fn load(path: &Path, window: usize) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::StartupConfig(format!(
                "The autocoding file {} could not be found",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path, window)
    }

    /// Parse rule text; `path` is used for error messages and provenance
    pub fn parse(text: &str, path: &Path, window: usize) -> Result<Self> {
        let mut rules = Vec::new();

        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let format_error = |message: String| Error::RuleFormat {
                path: path.to_path_buf(),
                line: n + 1,
                message,
            };

            let (label, phrase_list) = line
                .split_once(':')
                .ok_or_else(|| format_error("missing ':' after the mode label".to_string()))?;
            let mode = label.trim();
            if !is_valid_mode(mode) {
                return Err(format_error(format!(
                    "label '{}' is not of the form <digit>-<text>",
                    mode
                )));
            }

            let phrases: Vec<String> = phrase_list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if phrases.is_empty() {
                warn!(line = n + 1, mode, "Autocode rule has no phrases and will never match");
            }

            rules.push(AutocodeRule {
                mode: mode.to_string(),
                phrases,
            });
        }

        debug!(
            file = %path.display(),
            rules = rules.len(),
            window,
            "Loaded autocode rules"
        );

        Ok(Self {
            rules,
            window,
            source: path.to_path_buf(),
        })
    }

    /// Mode for the first rule whose phrase occurs inside the window
    pub fn classify(&self, text: &str) -> Option<&str> {
        let windowed = window_prefix(text, self.window);
        self.rules
            .iter()
            .find(|rule| rule.phrases.iter().any(|p| windowed.contains(p.as_str())))
            .map(|rule| rule.mode.as_str())
    }

    pub fn rules(&self) -> &[AutocodeRule] {
        &self.rules
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Rule file the rules came from
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// First `chars` characters of `text`
fn window_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
