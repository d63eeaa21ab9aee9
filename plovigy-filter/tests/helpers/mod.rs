//! Shared test fixtures for plovigy-filter integration tests
//!
//! - `ScriptedConsole`: plays back a fixed key sequence and records every
//!   view it was asked to show
//! - `Workspace`: temp directory with a corpus, optional rule file and a
//!   ledger, plus helpers to build sessions against them

#![allow(dead_code)]

use plovigy_common::config::{CliOverrides, Settings, TomlConfig};
use plovigy_filter::classifier::{Console, KeyEvent};
use plovigy_filter::corpus::{CorpusReader, Record};
use plovigy_filter::view::RecordView;
use plovigy_filter::{Error, FilterConfig, Result, SessionController};
use serde_json::json;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Console that replays scripted keys
pub struct ScriptedConsole {
    keys: VecDeque<KeyEvent>,
    pub views: Vec<RecordView>,
    pub reprompts: usize,
}

impl ScriptedConsole {
    /// One key per character of `keys`
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().map(KeyEvent::Char).collect(),
            views: Vec::new(),
            reprompts: 0,
        }
    }

    /// Indices of the records that were shown, in order
    pub fn shown(&self) -> Vec<usize> {
        self.views.iter().map(|v| v.index).collect()
    }

    pub fn keys_left(&self) -> usize {
        self.keys.len()
    }
}

impl Console for ScriptedConsole {
    fn render(&mut self, view: &RecordView) -> Result<()> {
        self.views.push(view.clone());
        Ok(())
    }

    fn read_key(&mut self) -> Result<KeyEvent> {
        self.keys
            .pop_front()
            .ok_or_else(|| Error::Terminal("key script exhausted".to_string()))
    }

    fn reprompt(&mut self) -> Result<()> {
        self.reprompts += 1;
        Ok(())
    }
}

/// Story record in corpus layout
pub fn story(id: &str, title: &str, text: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "date": "2020-03-09",
        "citeInfo": { "title": title, "source": "wire" },
        "textInfo": { "textStory": text },
    })
}

/// Pretty-printed corpus text: closing brace of each record in column 0
pub fn corpus_text(records: &[serde_json::Value]) -> String {
    records
        .iter()
        .map(|r| serde_json::to_string_pretty(r).unwrap() + "\n")
        .collect()
}

/// `n` plain records with ids `r0`, `r1`, ...
pub fn plain_records(n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| story(&format!("r{}", i), &format!("Title {}", i), &["Nothing to see here."]))
        .collect()
}

/// Temp directory holding one corpus and its ledger
pub struct Workspace {
    pub dir: TempDir,
    pub corpus: PathBuf,
    pub ledger: PathBuf,
    pub rules: Option<PathBuf>,
}

impl Workspace {
    pub fn new(records: &[serde_json::Value]) -> Self {
        Self::with_text(&corpus_text(records))
    }

    pub fn with_text(text: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("test-stories.jsonl");
        std::fs::write(&corpus, text).unwrap();
        let ledger = dir.path().join("filerecs.txt");
        Self {
            dir,
            corpus,
            ledger,
            rules: None,
        }
    }

    /// Write an autocode rule file and use it for later sessions
    pub fn with_rules(mut self, rules: &str) -> Self {
        let path = self.dir.path().join("auto.txt");
        std::fs::write(&path, rules).unwrap();
        self.rules = Some(path);
        self
    }

    pub fn settings(&self) -> Settings {
        let overrides = CliOverrides {
            coder: Some("Test Coder".to_string()),
            ledger_path: Some(self.ledger.clone()),
            ..Default::default()
        };
        Settings::resolve(&overrides, &TomlConfig::default(), None, None).unwrap()
    }

    pub fn controller(&self) -> SessionController {
        let config = FilterConfig::new(self.corpus.clone(), self.rules.clone(), &self.settings()).unwrap();
        SessionController::new(config).unwrap()
    }

    pub fn ledger_lines(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.ledger) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Records in a labelled output file
pub fn read_output(path: &Path) -> Vec<Record> {
    CorpusReader::open(path)
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}
