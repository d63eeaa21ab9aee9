//! Session controller
//!
//! Drives one coding session over a corpus:
//! 1. Skip records below the resume point without looking at them
//! 2. Try the autocoder; a hit is written without operator input
//! 3. Otherwise ask the operator through the interactive classifier
//! 4. On quit, exhaustion or a fatal error: close the output and append a
//!    ledger entry, then report or propagate
//!
//! The ledger entry is written on every exit path that reaches the loop, so
//! the next session always knows where this one stopped.

use crate::autocode::Autocoder;
use crate::classifier::{Console, Decision, InteractiveClassifier};
use crate::corpus::{CorpusReader, Record};
use crate::error::{Error, Result};
use crate::ledger::{LedgerEntry, PositionLedger, ResumePoint, SessionCounters};
use crate::output::{output_path_for, LabelledOutput};
use crate::view::{RecordView, ScreenLayout};
use plovigy_common::config::Settings;
use plovigy_common::time;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Tool name recorded in `citeInfo.parser`
pub const PARSER_NAME: &str = "plovigy-filter";

/// Immutable configuration for one session
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Corpus file to code
    pub corpus_path: PathBuf,
    /// Ledger key for the corpus: the path as given
    pub corpus_name: String,
    /// Operator identity written into `coder`
    pub coder: String,
    /// Optional autocode rule file
    pub autocode_file: Option<PathBuf>,
    /// Characters scanned by the autocoder
    pub autocode_window: usize,
    /// Position ledger file
    pub ledger_path: PathBuf,
    /// Story area dimensions
    pub layout: ScreenLayout,
}

impl FilterConfig {
    /// Combine command-line inputs with resolved settings
    ///
    /// The corpus must exist and its name must not contain whitespace
    /// (the ledger is whitespace-delimited).
    pub fn new(corpus_path: PathBuf, autocode_file: Option<PathBuf>, settings: &Settings) -> Result<Self> {
        if !corpus_path.is_file() {
            return Err(Error::StartupConfig(format!(
                "The corpus file {} could not be found",
                corpus_path.display()
            )));
        }
        let corpus_name = corpus_key(&corpus_path);
        if corpus_name.chars().any(char::is_whitespace) {
            return Err(Error::StartupConfig(format!(
                "Corpus path '{}' contains whitespace, which the position ledger cannot record",
                corpus_name
            )));
        }

        Ok(Self {
            corpus_path,
            corpus_name,
            coder: settings.coder.clone(),
            autocode_file,
            autocode_window: settings.autocode_window,
            ledger_path: settings.ledger_path.clone(),
            layout: ScreenLayout {
                wrap_width: settings.wrap_width,
                max_story_lines: settings.max_story_lines,
            },
        })
    }
}

/// Outcome of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session tag used in the output name and ledger
    pub tag: String,
    /// Labelled output file
    pub output: PathBuf,
    /// Position recorded in the ledger
    pub position: ResumePoint,
    pub counters: SessionCounters,
}

/// Resolve the starting index from a ledger resume point
///
/// A completed corpus restarts at 0 only if `confirm_restart` says so;
/// otherwise `None` and the session must not start.
pub fn resolve_start<F>(point: ResumePoint, confirm_restart: F) -> Result<Option<usize>>
where
    F: FnOnce() -> Result<bool>,
{
    match point {
        ResumePoint::At(index) => Ok(Some(index)),
        ResumePoint::Completed => {
            if confirm_restart()? {
                info!("Restarting completed corpus from the beginning");
                Ok(Some(0))
            } else {
                info!("Completed corpus not restarted");
                Ok(None)
            }
        }
    }
}

/// Owns the ledger, rules and output for one session
pub struct SessionController {
    config: FilterConfig,
    autocoder: Option<Autocoder>,
    ledger: PositionLedger,
}

impl SessionController {
    /// Load autocode rules and bind the ledger
    pub fn new(config: FilterConfig) -> Result<Self> {
        let autocoder = match &config.autocode_file {
            Some(path) => Some(Autocoder::load(path, config.autocode_window)?),
            None => None,
        };
        let ledger = PositionLedger::new(&config.ledger_path);
        Ok(Self {
            config,
            autocoder,
            ledger,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Where the ledger says this corpus should resume
    pub fn resume_point(&self) -> Result<ResumePoint> {
        self.ledger.resume_index(&self.config.corpus_name)
    }

    /// Run a session on the configured corpus starting at record `start`
    pub fn run<C: Console>(&self, start: usize, console: C) -> Result<SessionSummary> {
        let reader = CorpusReader::open(&self.config.corpus_path)?;
        self.run_with_reader(reader, start, console)
    }

    /// Run a session over an already-open record source
    pub fn run_with_reader<R, C>(&self, reader: CorpusReader<R>, start: usize, console: C) -> Result<SessionSummary>
    where
        R: BufRead,
        C: Console,
    {
        let tag = time::session_tag(&time::now());
        let mut output = LabelledOutput::create(&output_path_for(&self.config.corpus_path, &tag)?)?;
        let mut classifier = InteractiveClassifier::new(console);
        let mut counters = SessionCounters::default();
        let mut next_index = start;

        info!(
            corpus = %self.config.corpus_name,
            start,
            autocode = self.autocoder.is_some(),
            "Starting coding session"
        );

        let outcome = self.code_records(
            reader,
            start,
            &mut output,
            &mut classifier,
            &mut counters,
            &mut next_index,
        );
        drop(classifier);

        let position = match &outcome {
            Ok(position) => *position,
            Err(e) => {
                error!("Session stopped at record {}: {}", next_index, e);
                ResumePoint::At(next_index.max(start))
            }
        };

        let output_path = output.path().to_path_buf();
        let written = output.written();
        let closed = output.close();
        let entry = LedgerEntry {
            corpus: self.config.corpus_name.clone(),
            position,
            tag: tag.clone(),
            output: output_path.to_string_lossy().into_owned(),
            counters,
            autocode_file: self
                .config
                .autocode_file
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        };
        let appended = self.ledger.append(&entry);

        if let Err(e) = outcome {
            if let Err(close_err) = closed {
                error!("{}", close_err);
            }
            if let Err(ledger_err) = appended {
                error!("Could not record position in ledger: {}", ledger_err);
            }
            return Err(e);
        }
        closed?;
        appended?;

        info!(
            position = %position,
            accepted = counters.accepted,
            skipped = counters.skipped,
            autocoded = counters.autocoded,
            total = counters.total(),
            written,
            "Session finished"
        );

        Ok(SessionSummary {
            tag,
            output: output_path,
            position,
            counters,
        })
    }

    fn code_records<R, C>(
        &self,
        reader: CorpusReader<R>,
        start: usize,
        output: &mut LabelledOutput,
        classifier: &mut InteractiveClassifier<C>,
        counters: &mut SessionCounters,
        next_index: &mut usize,
    ) -> Result<ResumePoint>
    where
        R: BufRead,
        C: Console,
    {
        for (index, item) in reader.enumerate() {
            let mut record = item?;
            if index < start {
                continue;
            }
            *next_index = index;

            let story = record.story_text();
            if let Some(autocoder) = &self.autocoder {
                if let Some(mode) = autocoder.classify(&story) {
                    let parser = format!(
                        "Mode autocoded in {} using {}",
                        PARSER_NAME,
                        autocoder.source().display()
                    );
                    self.write_coded(output, &mut record, mode, &parser)?;
                    counters.autocoded += 1;
                    debug!(index, id = record.id(), mode, "Autocoded");
                    *next_index = index + 1;
                    continue;
                }
            }

            let view = RecordView::new(index, &record, *counters, &self.config.layout);
            match classifier.decide(&view)? {
                Decision::Accept(category) => {
                    let mode = category.mode();
                    let parser = format!("Mode set in {}", PARSER_NAME);
                    self.write_coded(output, &mut record, &mode, &parser)?;
                    counters.accepted += 1;
                    debug!(index, id = record.id(), mode = %mode, "Accepted");
                }
                Decision::Skip => {
                    counters.skipped += 1;
                    debug!(index, id = record.id(), "Skipped");
                }
                Decision::Quit => {
                    info!(index, "Operator quit");
                    return Ok(ResumePoint::At(index));
                }
            }
            *next_index = index + 1;
        }

        info!("All records have been coded");
        Ok(ResumePoint::Completed)
    }

    fn write_coded(&self, output: &mut LabelledOutput, record: &mut Record, mode: &str, parser: &str) -> Result<()> {
        let (coded_date, coded_time) = time::coded_date_time(&time::now());
        record.stamp(mode, parser, &self.config.coder, &coded_date, &coded_time);
        output.write_record(record)
    }
}

/// Ledger key for a corpus path, as `FilterConfig` records it
pub fn corpus_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
