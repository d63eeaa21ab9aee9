//! Screen layout for one record
//!
//! Pure text layout: the console implementation only paints the lines.
//! Long stories are cut off with a visible marker; the record written to
//! the output always keeps its full text.

use crate::categories::CATEGORIES;
use crate::corpus::Record;
use crate::ledger::SessionCounters;

/// Replaces the tail of the last visible story line
pub const TRUNCATION_MARKER: &str = " ...---TRUNCATED---";

/// Characters dropped from the last visible line before the marker
const TRUNCATION_CUT: usize = 20;

/// Key help shown under the categories
pub const OPTIONS_LINE: &str = "Options: [0-9] write mode     +/space skip     Q quit";

/// Prompt shown while waiting for a key
pub const PROMPT: &str = "Enter option: ";

/// Lines of `render_lines` that are not story text
pub const RESERVED_LINES: usize = 13;

/// Width of the first two category columns
const CATEGORY_COLUMN: usize = 26;

/// Story area dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub wrap_width: usize,
    pub max_story_lines: usize,
}

impl ScreenLayout {
    /// Shrink to a display area of `cols` by `rows` character cells
    ///
    /// Never grows past the configured size and always leaves at least one
    /// story line.
    pub fn fit(&self, cols: usize, rows: usize) -> Self {
        Self {
            wrap_width: self.wrap_width.min(cols).max(1),
            max_story_lines: self
                .max_story_lines
                .min(rows.saturating_sub(RESERVED_LINES))
                .max(1),
        }
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            wrap_width: 128,
            max_story_lines: 33,
        }
    }
}

/// Everything the operator sees for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub index: usize,
    pub date: String,
    pub title: String,
    pub story_lines: Vec<String>,
    pub counters: SessionCounters,
    /// Full story text, kept so the view can be laid out again
    pub story: String,
    pub layout: ScreenLayout,
}

impl RecordView {
    pub fn new(index: usize, record: &Record, counters: SessionCounters, layout: &ScreenLayout) -> Self {
        let story = record.story_text();
        Self {
            index,
            date: record.date().to_string(),
            title: record.title().to_string(),
            story_lines: story_lines(&story, layout),
            counters,
            story,
            layout: *layout,
        }
    }

    /// The same view laid out for a display of `cols` by `rows` cells
    pub fn fit_to(&self, cols: usize, rows: usize) -> Self {
        let layout = self.layout.fit(cols, rows);
        Self {
            story_lines: story_lines(&self.story, &layout),
            layout,
            ..self.clone()
        }
    }

    /// Full screen as text lines, top to bottom
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{}: {}", self.index, self.date),
            String::new(),
            self.title.clone(),
            String::new(),
        ];
        lines.extend(self.story_lines.iter().cloned());
        lines.push(String::new());
        lines.extend(category_block());
        lines.push(String::new());
        lines.push(OPTIONS_LINE.to_string());

        let c = &self.counters;
        lines.push(format!(
            "accept:{:3}   skip:{:3}   auto:{:3}   total:{:3}",
            c.accepted,
            c.skipped,
            c.autocoded,
            c.total()
        ));
        lines
    }
}

fn story_lines(story: &str, layout: &ScreenLayout) -> Vec<String> {
    truncate_lines(wrap_text(story, layout.wrap_width), layout.max_story_lines)
}

/// Greedy word wrap on character counts
///
/// Runs of whitespace collapse to one space. Words longer than `width` are
/// split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Keep at most `max` lines, marking the last one when anything is cut
pub fn truncate_lines(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() <= max || max == 0 {
        return lines;
    }
    lines.truncate(max);
    if let Some(last) = lines.last_mut() {
        let keep = last.chars().count().saturating_sub(TRUNCATION_CUT);
        let mut cut: String = last.chars().take(keep).collect();
        cut.push_str(TRUNCATION_MARKER);
        *last = cut;
    }
    lines
}

/// Cut a line to `width` characters, ending it with the marker when cut
pub fn clip_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    let keep = width.saturating_sub(TRUNCATION_MARKER.chars().count());
    line.chars()
        .take(keep)
        .chain(TRUNCATION_MARKER.chars())
        .take(width)
        .collect()
}

/// Category table in three columns: 0-3, 4-6, 7-9
pub fn category_block() -> Vec<String> {
    let columns: [&[_]; 3] = [&CATEGORIES[0..4], &CATEGORIES[4..7], &CATEGORIES[7..10]];
    let mut lines = vec!["Categories".to_string()];

    for row in 0..4 {
        let mut line = String::new();
        for (col, entries) in columns.iter().enumerate() {
            let cell = entries
                .get(row)
                .map(|c| format!("{}: {}", c.digit, c.label))
                .unwrap_or_default();
            if col + 1 < columns.len() {
                line.push_str(&format!("{:<width$}", cell, width = CATEGORY_COLUMN));
            } else {
                line.push_str(&cell);
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusReader;
    use std::io::Cursor;

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_text(text, 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("ab abcdefghijkl", 5);
        assert_eq!(lines, vec!["ab", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_truncate_marks_last_visible_line() {
        let lines: Vec<String> = (0..5).map(|i| format!("{}{}", i, "x".repeat(29))).collect();
        let cut = truncate_lines(lines, 3);
        assert_eq!(cut.len(), 3);
        assert_eq!(cut[0], format!("0{}", "x".repeat(29)));
        assert!(cut[2].ends_with(TRUNCATION_MARKER));
        assert_eq!(cut[2], format!("2{}{}", "x".repeat(9), TRUNCATION_MARKER));
    }

    #[test]
    fn test_short_story_not_truncated() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(truncate_lines(lines.clone(), 2), lines);
    }

    #[test]
    fn test_category_block_columns() {
        let block = category_block();
        assert_eq!(block.len(), 5);
        assert!(block[1].starts_with("0: codeable"));
        assert!(block[1].contains("4: opinion"));
        assert!(block[1].contains("7: natural disaster"));
        assert!(block[4].starts_with("3: business/finance"));
        assert!(!block[4].contains("7:"));
    }

    #[test]
    fn test_render_contains_header_and_counters() {
        let text = "{\n\"id\": \"r\", \"date\": \"2020-03-01\", \"citeInfo\": {\"title\": \"Headline\"},\n\"textInfo\": {\"textStory\": [\"Some story.\"]}\n}\n";
        let record = CorpusReader::new(Cursor::new(text)).next().unwrap().unwrap();
        let counters = SessionCounters {
            accepted: 2,
            skipped: 1,
            autocoded: 0,
        };
        let view = RecordView::new(4, &record, counters, &ScreenLayout::default());
        let lines = view.render_lines();

        assert_eq!(lines[0], "4: 2020-03-01");
        assert_eq!(lines[2], "Headline");
        assert_eq!(lines[4], "Some story.");
        assert_eq!(lines.len(), RESERVED_LINES + view.story_lines.len());
        assert_eq!(lines[lines.len() - 2], OPTIONS_LINE);
        let last = lines.last().unwrap();
        assert!(last.contains("accept:  2"));
        assert!(last.contains("total:  3"));
    }

    fn long_story_view() -> RecordView {
        let words = vec!["word"; 2000].join(" ");
        let text = format!(
            "{{\n\"id\": \"r\", \"date\": \"2020-03-01\", \"citeInfo\": {{\"title\": \"Headline\"}},\n\"textInfo\": {{\"textStory\": [\"{}\"]}}\n}}\n",
            words
        );
        let record = CorpusReader::new(Cursor::new(text)).next().unwrap().unwrap();
        RecordView::new(0, &record, SessionCounters::default(), &ScreenLayout::default())
    }

    #[test]
    fn test_fit_to_small_terminal_keeps_categories_and_counters() {
        let view = long_story_view();
        assert_eq!(view.story_lines.len(), 33);

        // 80x24 terminal less margins and prompt rows
        let fitted = view.fit_to(76, 21);
        let lines = fitted.render_lines();

        assert_eq!(lines.len(), 21);
        assert_eq!(fitted.story_lines.len(), 21 - RESERVED_LINES);
        assert!(fitted.story_lines.last().unwrap().ends_with(TRUNCATION_MARKER));
        assert!(lines.iter().all(|l| l.chars().count() <= 76));
        assert!(lines.iter().any(|l| l.starts_with("Categories")));
        assert!(lines.iter().any(|l| l.contains("9: no codeable content")));
        assert_eq!(lines[lines.len() - 2], OPTIONS_LINE);
        assert!(lines.last().unwrap().starts_with("accept:"));
    }

    #[test]
    fn test_fit_never_grows_layout() {
        let layout = ScreenLayout::default();
        assert_eq!(layout.fit(300, 200), layout);
        assert_eq!(layout.fit(76, 5).max_story_lines, 1);
    }

    #[test]
    fn test_clip_line_marks_cut() {
        assert_eq!(clip_line("short", 10), "short");
        let clipped = clip_line(&"x".repeat(50), 30);
        assert_eq!(clipped.chars().count(), 30);
        assert!(clipped.ends_with(TRUNCATION_MARKER));
    }
}
