//! Record extraction from registration listing pages
//!
//! Each registration renders as one table row of eleven cells in a fixed
//! order, the columns being identified only by their inline `width` style:
//!
//! | # | width | content |
//! |---|-------|---------|
//! | 1 | 20px  | row number |
//! | 2 | 40px  | student id |
//! | 3 | 100px | student name |
//! | 4 | 60px  | date of birth |
//! | 5 | 100px | administrative class |
//! | 6 | 50px  | section code |
//! | 7 | 160px | course name |
//! | 8 | 15px  | group label |
//! | 9 | 15px  | credits |
//! | 10 | 60px | notes |
//! | 11 | 140px, hidden | internal key |
//!
//! A column added or moved upstream makes every row fail to match, so a
//! changed layout yields an empty record stream rather than an error.
//!
//! The page also announces its position in the result set with a sentence of
//! the form `Kết quả từ 1 tới 25000 trên 60000.` which drives pagination.

use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Number of cells in a registration row
const RECORD_CELLS: usize = 11;

const RECORD_PATTERN: &str = concat!(
    r#"<td style="width: 20px">([^<]*)</td>\s*"#,
    r#"<td style="width: 40px">([^<]*)</td>\s*"#,
    r#"<td style="width: 100px">[^<]*</td>\s*"#,
    r#"<td style="width: 60px">[^<]*</td>\s*"#,
    r#"<td style="width: 100px">[^<]*</td>\s*"#,
    r#"<td style="width: 50px">([^<]*)</td>\s*"#,
    r#"<td style="width: 160px">([^<]*)</td>\s*"#,
    r#"<td style="width: 15px">([^<]*)</td>\s*"#,
    r#"<td style="width: 15px">([^<]*)</td>\s*"#,
    r#"<td style="width: 60px">[^<]*</td>\s*"#,
    r#"<td style="width: 140px; display:none">[^<]*</td>"#,
);

const COUNT_PATTERN: &str = r"Kết quả từ (\d+) tới (\d+) trên (\d+)";

fn record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(RECORD_PATTERN).expect("record pattern is valid"))
}

fn count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COUNT_PATTERN).expect("count pattern is valid"))
}

/// One registration row as it appears on the page, before any normalization
///
/// All fields are the trimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub row_index: String,
    pub student_id: String,
    pub section_code: String,
    pub course_name: String,
    pub group_label: String,
    pub credits: String,
}

/// Extracts registration rows from one page body
pub trait RecordParser {
    /// Returns the rows of `body` in page order
    fn parse<'a>(&'a self, body: &'a str) -> Box<dyn Iterator<Item = RawRecord> + 'a>;
}

/// Matches a single regular expression per row against the raw markup
///
/// Rows are produced lazily while the page is scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecordParser;

impl PatternRecordParser {
    pub fn new() -> Self {
        Self
    }
}

/// Trimmed cell text with character references decoded
fn decode_cell(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.contains('&') {
        return raw.to_string();
    }

    Html::parse_fragment(raw)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

fn capture(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| decode_cell(m.as_str()))
        .unwrap_or_default()
}

impl RecordParser for PatternRecordParser {
    fn parse<'a>(&'a self, body: &'a str) -> Box<dyn Iterator<Item = RawRecord> + 'a> {
        Box::new(
            record_pattern()
                .captures_iter(body)
                .map(|caps| RawRecord {
                    row_index: capture(&caps, 1),
                    student_id: capture(&caps, 2),
                    section_code: capture(&caps, 3),
                    course_name: capture(&caps, 4),
                    group_label: capture(&caps, 5),
                    credits: capture(&caps, 6),
                }),
        )
    }
}

/// Walks the parsed HTML table instead of the raw markup
///
/// A row is a registration when it has exactly eleven cells and the first one
/// is styled `width: 20px`. Entities in cell text are decoded.
pub struct TableRecordParser {
    row_selector: Selector,
    cell_selector: Selector,
}

impl TableRecordParser {
    pub fn new() -> Self {
        Self {
            row_selector: Selector::parse("tr").expect("row selector is valid"),
            cell_selector: Selector::parse("td").expect("cell selector is valid"),
        }
    }

    fn record_from_cells(cells: &[ElementRef<'_>]) -> Option<RawRecord> {
        if cells.len() != RECORD_CELLS {
            return None;
        }

        let first_style = cells[0].value().attr("style")?;
        if first_style.replace(' ', "") != "width:20px" {
            return None;
        }

        let text = |i: usize| cells[i].text().collect::<String>().trim().to_string();

        Some(RawRecord {
            row_index: text(0),
            student_id: text(1),
            section_code: text(5),
            course_name: text(6),
            group_label: text(7),
            credits: text(8),
        })
    }
}

impl Default for TableRecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for TableRecordParser {
    fn parse<'a>(&'a self, body: &'a str) -> Box<dyn Iterator<Item = RawRecord> + 'a> {
        let document = Html::parse_document(body);

        let records: Vec<RawRecord> = document
            .select(&self.row_selector)
            .filter_map(|row| {
                let cells: Vec<ElementRef<'_>> = row.select(&self.cell_selector).collect();
                Self::record_from_cells(&cells)
            })
            .collect();

        Box::new(records.into_iter())
    }
}

/// Result-set position announced by a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// "results `first` to `last` of `total`"
    Found { first: u64, last: u64, total: u64 },
    /// The announcement is missing or unreadable
    NotFound,
}

impl PageCount {
    /// Scans a page body for the result count announcement
    pub fn scan(body: &str) -> Self {
        let Some(caps) = count_pattern().captures(body) else {
            return Self::NotFound;
        };

        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

        match (number(1), number(2), number(3)) {
            (Some(first), Some(last), Some(total)) => Self::Found { first, last, total },
            _ => Self::NotFound,
        }
    }
}
