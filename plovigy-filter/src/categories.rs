//! Discard-mode category table
//!
//! Ten fixed categories, one per digit key. A mode label is the digit and
//! the category text joined by a single hyphen, e.g. `"3-business/finance"`.

/// One row of the category table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub digit: char,
    pub label: &'static str,
}

impl Category {
    /// Mode string written into the record, `<digit>-<label>`
    pub fn mode(&self) -> String {
        format!("{}-{}", self.digit, self.label)
    }
}

/// The category table, indexed by digit
pub const CATEGORIES: [Category; 10] = [
    Category { digit: '0', label: "codeable" },
    Category { digit: '1', label: "sports" },
    Category { digit: '2', label: "culture/entertainment" },
    Category { digit: '3', label: "business/finance" },
    Category { digit: '4', label: "opinion" },
    Category { digit: '5', label: "crime" },
    Category { digit: '6', label: "accidents" },
    Category { digit: '7', label: "natural disaster" },
    Category { digit: '8', label: "[open]" },
    Category { digit: '9', label: "no codeable content" },
];

/// Category selected by a digit key
pub fn for_digit(digit: char) -> Option<&'static Category> {
    digit
        .to_digit(10)
        .and_then(|d| CATEGORIES.get(d as usize))
}

/// True when `mode` begins with a category digit followed by a hyphen
pub fn is_valid_mode(mode: &str) -> bool {
    let mut chars = mode.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(d), Some('-')) if d.is_ascii_digit()
    ) && mode.len() > 2
}
