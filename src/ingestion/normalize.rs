//! Row width repair.

use crate::types::NormalizedRow;

/// Resize a raw row to `header_count` fields and append the source-file tag.
///
/// Short rows are right-padded with empty text and long rows are right-truncated, so the result
/// always has `header_count + 1` fields. Malformed rows are repaired rather than rejected.
///
/// ```rust
/// use instrument_csv_import::ingestion::normalize_row;
///
/// assert_eq!(normalize_row(["5"], 2, "run.csv"), vec!["5", "", "run.csv"]);
/// assert_eq!(normalize_row(["1", "2", "3"], 2, "run.csv"), vec!["1", "2", "run.csv"]);
/// ```
pub fn normalize_row<I>(raw: I, header_count: usize, source_tag: &str) -> NormalizedRow
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut row: NormalizedRow = Vec::with_capacity(header_count + 1);
    row.extend(
        raw.into_iter()
            .take(header_count)
            .map(|field| field.as_ref().to_owned()),
    );
    row.resize(header_count, String::new());
    row.push(source_tag.to_owned());
    row
}

/// `true` when no field of the row has any content.
///
/// Whitespace counts as content; only zero-length fields are blank.
pub fn is_blank_row<I>(raw: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    raw.into_iter().all(|field| field.as_ref().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{is_blank_row, normalize_row};

    #[test]
    fn pads_short_rows() {
        assert_eq!(normalize_row(["5"], 2, "a.csv"), vec!["5", "", "a.csv"]);
        assert_eq!(
            normalize_row(Vec::<String>::new(), 3, "a.csv"),
            vec!["", "", "", "a.csv"]
        );
    }

    #[test]
    fn truncates_long_rows() {
        assert_eq!(
            normalize_row(["1", "2", "3", "4"], 2, "a.csv"),
            vec!["1", "2", "a.csv"]
        );
    }

    #[test]
    fn exact_rows_only_gain_the_tag() {
        assert_eq!(
            normalize_row(["x", ""], 2, "b.csv"),
            vec!["x", "", "b.csv"]
        );
    }

    #[test]
    fn works_on_csv_records() {
        let record = csv::StringRecord::from(vec!["001", "12.3", "extra"]);
        assert_eq!(
            normalize_row(&record, 2, "plate.csv"),
            vec!["001", "12.3", "plate.csv"]
        );
    }

    #[test]
    fn blank_rows() {
        assert!(is_blank_row(["", "", ""]));
        assert!(is_blank_row(Vec::<&str>::new()));
        assert!(!is_blank_row(["", "x"]));
        assert!(!is_blank_row([" ", ""]));
    }
}
