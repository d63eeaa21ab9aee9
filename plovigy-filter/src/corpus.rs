//! Record source for PLOVIGY line-delimited JSON corpora
//!
//! A logical record may span several physical lines and is closed by a
//! line that begins with `}`. Each physical line is trimmed and the pieces
//! are concatenated before decoding, so pretty-printed output files read
//! back the same way as the input story files.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One story record
///
/// Wraps the full JSON object so fields this tool does not know about
/// survive unchanged into the labelled output.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Validate a decoded JSON value as a record
    ///
    /// Required: `id`, `date`, `citeInfo.title` (strings) and
    /// `textInfo.textStory` (array of strings).
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(format!("expected a JSON object, found {}", kind(&other))),
        };

        for key in ["id", "date"] {
            match fields.get(key) {
                Some(Value::String(_)) => {}
                Some(other) => return Err(format!("'{}' must be a string, found {}", key, kind(other))),
                None => return Err(format!("missing required field '{}'", key)),
            }
        }

        match fields.get("citeInfo").and_then(|c| c.get("title")) {
            Some(Value::String(_)) => {}
            _ => return Err("missing required string field 'citeInfo.title'".to_string()),
        }

        match fields.get("textInfo").and_then(|t| t.get("textStory")) {
            Some(Value::Array(parts)) if parts.iter().all(Value::is_string) => {}
            Some(_) => return Err("'textInfo.textStory' must be an array of strings".to_string()),
            None => return Err("missing required field 'textInfo.textStory'".to_string()),
        }

        Ok(Self { fields })
    }

    pub fn id(&self) -> &str {
        self.str_field("id")
    }

    pub fn date(&self) -> &str {
        self.str_field("date")
    }

    pub fn title(&self) -> &str {
        self.fields
            .get("citeInfo")
            .and_then(|c| c.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Story fragments joined with single spaces
    pub fn story_text(&self) -> String {
        self.fields
            .get("textInfo")
            .and_then(|t| t.get("textStory"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// Current `mode` label, if one has been assigned
    pub fn mode(&self) -> Option<&str> {
        self.fields.get("mode").and_then(Value::as_str)
    }

    /// Stamp the coding decision onto the record
    ///
    /// Overwrites `mode`, `citeInfo.parser`, `coder`, `codedDate` and
    /// `codedTime`; everything else is left as read.
    pub fn stamp(&mut self, mode: &str, parser: &str, coder: &str, coded_date: &str, coded_time: &str) {
        self.fields.insert("mode".to_string(), Value::from(mode));
        if let Some(Value::Object(cite)) = self.fields.get_mut("citeInfo") {
            cite.insert("parser".to_string(), Value::from(parser));
        }
        self.fields.insert("coder".to_string(), Value::from(coder));
        self.fields.insert("codedDate".to_string(), Value::from(coded_date));
        self.fields.insert("codedTime".to_string(), Value::from(coded_time));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn str_field(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lazy iterator over the records of a corpus
///
/// Yields `Err(CorpusFormat)` for the first record that fails to decode and
/// then stops: records are never skipped, so yielded positions always
/// match the record count.
pub struct CorpusReader<R> {
    lines: std::io::Lines<R>,
    index: usize,
    finished: bool,
}

impl CorpusReader<BufReader<File>> {
    /// Open a corpus file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::StartupConfig(format!("Cannot open corpus {}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            index: 0,
            finished: false,
        }
    }

    fn format_error(&mut self, message: String) -> Error {
        self.finished = true;
        Error::CorpusFormat {
            index: self.index,
            message,
        }
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buffer = String::new();
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    let message = format!("read failed: {}", e);
                    return Some(Err(self.format_error(message)));
                }
                None => {
                    self.finished = true;
                    if buffer.trim().is_empty() {
                        return None;
                    }
                    let message = "unterminated record at end of file".to_string();
                    return Some(Err(self.format_error(message)));
                }
            };

            if line.starts_with('}') {
                buffer.push('}');
                break;
            }

            // Literal tabs are not legal inside JSON strings
            let line = line.replace('\t', "\\t");
            buffer.push_str(line.trim());
        }

        let decoded = serde_json::from_str::<Value>(&buffer)
            .map_err(|e| e.to_string())
            .and_then(Record::from_value);

        match decoded {
            Ok(record) => {
                self.index += 1;
                Some(Ok(record))
            }
            Err(message) => Some(Err(self.format_error(message))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_RECORDS: &str = r#"{
  "id": "a1",
  "date": "2020-03-01",
  "citeInfo": {"title": "First"},
  "textInfo": {"textStory": ["One.", "Two."]}
}
{
  "id": "a2",
  "date": "2020-03-02",
  "citeInfo": {"title": "Second"},
  "textInfo": {"textStory": []},
  "extra": 7
}
"#;

    fn read_all(text: &str) -> Vec<Result<Record>> {
        CorpusReader::new(Cursor::new(text.to_string())).collect()
    }

    #[test]
    fn test_reads_multiline_records() {
        let records: Vec<Record> = read_all(TWO_RECORDS)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "a1");
        assert_eq!(records[0].title(), "First");
        assert_eq!(records[0].story_text(), "One. Two.");
        assert_eq!(records[1].story_text(), "");
        assert_eq!(records[1].get("extra"), Some(&Value::from(7)));
    }

    #[test]
    fn test_literal_tab_is_escaped() {
        let text = "{\n\"id\": \"t\", \"date\": \"d\", \"citeInfo\": {\"title\": \"a\tb\"},\n\"textInfo\": {\"textStory\": [\"x\"]}\n}\n";
        let records = read_all(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().title(), "a\tb");
    }

    #[test]
    fn test_malformed_record_stops_iteration() {
        let text = format!("{}{{\n\"id\": \"bad\",,\n}}\n{}", TWO_RECORDS, TWO_RECORDS);
        let results = read_all(&text);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        match &results[2] {
            Err(Error::CorpusFormat { index, .. }) => assert_eq!(*index, 2),
            other => panic!("expected CorpusFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field_is_format_error() {
        let text = "{\n\"id\": \"x\", \"date\": \"d\", \"citeInfo\": {}, \"textInfo\": {\"textStory\": []}\n}\n";
        let results = read_all(text);
        assert!(matches!(results[0], Err(Error::CorpusFormat { index: 0, .. })));
    }

    #[test]
    fn test_unterminated_tail_is_format_error() {
        let text = format!("{}{{\n\"id\": \"x\"\n", TWO_RECORDS);
        let results = read_all(&text);
        assert_eq!(results.len(), 3);
        assert!(matches!(results[2], Err(Error::CorpusFormat { index: 2, .. })));
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let text = format!("{}\n\n   \n", TWO_RECORDS);
        assert_eq!(read_all(&text).len(), 2);
    }

    #[test]
    fn test_stamp_overwrites_coding_fields() {
        let mut record = read_all(TWO_RECORDS).remove(0).unwrap();
        record.stamp("3-business/finance", "parser note", "coder x", "2020-03-09", "10:11:12");
        assert_eq!(record.mode(), Some("3-business/finance"));
        assert_eq!(record.get("coder"), Some(&Value::from("coder x")));
        assert_eq!(
            record.get("citeInfo").and_then(|c| c.get("parser")),
            Some(&Value::from("parser note"))
        );
        assert_eq!(record.title(), "First");
    }
}
