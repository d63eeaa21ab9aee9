//! Interactive classification of a single record
//!
//! The classifier shows a [`RecordView`] on a [`Console`] and blocks until
//! the operator presses a valid key. Invalid keys are ignored: they never
//! advance to another record and never touch the counters.
//!
//! Key matching is case-insensitive (`q` quits). Autocode phrase matching
//! is case-sensitive; the two paths are deliberately not unified.

use crate::categories::{self, Category};
use crate::error::Result;
use crate::view::RecordView;
use tracing::trace;

/// Keys that skip a record
pub const SKIP_KEYS: [char; 2] = [' ', '+'];

/// Key that ends the session
pub const QUIT_KEY: char = 'Q';

/// A key press as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character
    Char(char),
    /// Any non-character key (arrows, function keys, ...)
    Other,
}

/// Display and keyboard capability the classifier depends on
///
/// The terminal implementation lives in [`crate::terminal`]; tests supply
/// scripted key sequences.
pub trait Console {
    /// Show a record and the key prompt
    fn render(&mut self, view: &RecordView) -> Result<()>;

    /// Block until one key is pressed
    fn read_key(&mut self) -> Result<KeyEvent>;

    /// Called after a key was rejected, before reading the next one
    fn reprompt(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn render(&mut self, view: &RecordView) -> Result<()> {
        (**self).render(view)
    }

    fn read_key(&mut self) -> Result<KeyEvent> {
        (**self).read_key()
    }

    fn reprompt(&mut self) -> Result<()> {
        (**self).reprompt()
    }
}

/// What a valid key means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Label the record with this category
    Accept(&'static Category),
    /// Move on without writing the record
    Skip,
    /// Stop the session at this record
    Quit,
}

/// Map a key to a decision; `None` for keys outside the valid set
pub fn interpret_key(key: KeyEvent) -> Option<Decision> {
    let KeyEvent::Char(c) = key else {
        return None;
    };
    let c = c.to_ascii_uppercase();

    if let Some(category) = categories::for_digit(c) {
        Some(Decision::Accept(category))
    } else if SKIP_KEYS.contains(&c) {
        Some(Decision::Skip)
    } else if c == QUIT_KEY {
        Some(Decision::Quit)
    } else {
        None
    }
}

/// Presents records and collects validated decisions
pub struct InteractiveClassifier<C> {
    console: C,
}

impl<C: Console> InteractiveClassifier<C> {
    pub fn new(console: C) -> Self {
        Self { console }
    }

    /// Show `view` and wait for a valid key
    pub fn decide(&mut self, view: &RecordView) -> Result<Decision> {
        self.console.render(view)?;
        loop {
            let key = self.console.read_key()?;
            match interpret_key(key) {
                Some(decision) => return Ok(decision),
                None => {
                    trace!(?key, record = view.index, "Ignoring invalid key");
                    self.console.reprompt()?;
                }
            }
        }
    }

    pub fn into_console(self) -> C {
        self.console
    }
}
