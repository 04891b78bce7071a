use crate::domain::model::{Record, Roster};
use crate::utils::error::{CertError, Result};

/// Header synonyms, checked by substring against the lowercased header. The
/// first header that matches wins; later candidates for the same concept are
/// ignored even when they would match more precisely.
const NAME_PATTERNS: [&str; 2] = ["name", "student"];
const COURSE_PATTERNS: [&str; 2] = ["course", "subject"];
const DATE_PATTERNS: [&str; 2] = ["date", "completion"];

fn find_column(headers: &[String], patterns: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| patterns.iter().any(|p| h.contains(p)))
}

/// Parse raw CSV text into a roster.
///
/// Lines are split on commas with no quoting support; an embedded comma in a
/// field shifts the columns of that row. That matches the upload format this
/// tool accepts and is left as-is on purpose.
///
/// Rows missing any of the three required values after trimming are dropped
/// rather than failing the parse. Zero surviving rows is a valid roster; the
/// render stage rejects it before any network traffic.
pub fn parse(text: &str) -> Result<Roster> {
    let mut lines = text.trim().split('\n');

    let headers: Vec<String> = lines
        .next()
        .unwrap_or("")
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    let name_idx = find_column(&headers, &NAME_PATTERNS);
    let course_idx = find_column(&headers, &COURSE_PATTERNS);
    let date_idx = find_column(&headers, &DATE_PATTERNS);

    let (Some(name_idx), Some(course_idx), Some(date_idx)) = (name_idx, course_idx, date_idx)
    else {
        return Err(CertError::SchemaError);
    };

    let mut records = Vec::new();
    for line in lines {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        // 缺少的尾端欄位視為空字串
        let field = |idx: usize| values.get(idx).copied().unwrap_or("");

        let student_name = field(name_idx);
        let course_name = field(course_idx);
        let date = field(date_idx);

        if student_name.is_empty() || course_name.is_empty() || date.is_empty() {
            continue;
        }

        records.push(Record {
            student_name: student_name.to_string(),
            course_name: course_name.to_string(),
            date: date.to_string(),
        });
    }

    Ok(Roster::new(records))
}
