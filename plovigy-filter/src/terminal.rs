//! Raw-mode terminal console
//!
//! Uses the alternate screen so the operator's shell scrollback is left
//! intact. Raw mode and the alternate screen are undone on drop, which also
//! covers early returns on fatal errors.

use crate::classifier::{Console, KeyEvent};
use crate::error::{Error, Result};
use crate::view::{clip_line, RecordView, PROMPT};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use std::io::{self, Stdout, Write};
use tracing::warn;

/// Left margin of the coding window
const LEFT_MARGIN: u16 = 2;

/// Top margin of the coding window
const TOP_MARGIN: u16 = 1;

/// Blank row plus prompt row below the view
const PROMPT_ROWS: u16 = 2;

fn terminal_error(e: io::Error) -> Error {
    Error::Terminal(e.to_string())
}

/// Console backed by the process's terminal
pub struct TerminalConsole {
    out: Stdout,
    prompt_row: u16,
    active: bool,
}

impl TerminalConsole {
    /// Switch the terminal into raw mode on the alternate screen
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().map_err(terminal_error)?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, terminal::EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(terminal_error(e));
        }
        Ok(Self {
            out,
            prompt_row: 0,
            active: true,
        })
    }

    /// Restore the terminal; safe to call more than once
    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, terminal::LeaveAlternateScreen).map_err(terminal_error)?;
        terminal::disable_raw_mode().map_err(terminal_error)
    }

    fn draw_prompt(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(LEFT_MARGIN, self.prompt_row),
            terminal::Clear(ClearType::UntilNewLine),
            Print(PROMPT)
        )?;
        self.out.flush()
    }
}

impl Console for TerminalConsole {
    fn render(&mut self, view: &RecordView) -> Result<()> {
        let (cols, rows) = terminal::size().map_err(terminal_error)?;
        let width = cols.saturating_sub(LEFT_MARGIN * 2) as usize;
        let height = rows.saturating_sub(TOP_MARGIN + PROMPT_ROWS) as usize;
        let lines = view.fit_to(width, height).render_lines();

        queue!(self.out, terminal::Clear(ClearType::All)).map_err(terminal_error)?;
        let mut row = TOP_MARGIN;
        for line in &lines {
            if row + 1 >= rows {
                break;
            }
            queue!(self.out, cursor::MoveTo(LEFT_MARGIN, row), Print(clip_line(line, width)))
                .map_err(terminal_error)?;
            row += 1;
        }

        self.prompt_row = (row + 1).min(rows.saturating_sub(1));
        self.draw_prompt().map_err(terminal_error)
    }

    fn read_key(&mut self) -> Result<KeyEvent> {
        loop {
            match event::read().map_err(terminal_error)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(match key.code {
                        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            KeyEvent::Other
                        }
                        KeyCode::Char(c) => KeyEvent::Char(c),
                        _ => KeyEvent::Other,
                    });
                }
                _ => continue,
            }
        }
    }

    fn reprompt(&mut self) -> Result<()> {
        self.draw_prompt().map_err(terminal_error)
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}
