//! Column type inference from a single sample value.

use crate::types::ColumnType;

/// Infer a column's storage type from one representative value.
///
/// Rules, in order:
///
/// - empty or whitespace-only: [`ColumnType::Text`]
/// - an integer literal (optional sign, ASCII digits of any magnitude, single `_` allowed between
///   digits as in `1_000`): [`ColumnType::Integer`]
/// - a floating point literal (`12.3`, `1e-5`, `inf`, `NaN`): [`ColumnType::Real`]
/// - anything else: [`ColumnType::Text`]
///
/// Surrounding whitespace is ignored. Values with leading zeros such as `"007"` are classified
/// as integers even though the zeros are lost once the store renders them as numbers. Only ASCII
/// digits count: numerals from other scripts (`٣`) are `TEXT`.
///
/// Only the first data row of a file is consulted; later rows are not checked against the
/// inferred type.
pub fn infer_column_type(sample: &str) -> ColumnType {
    let value = sample.trim();
    if value.is_empty() {
        return ColumnType::Text;
    }
    if is_integer_literal(value) {
        return ColumnType::Integer;
    }
    if value.parse::<f64>().is_ok() {
        return ColumnType::Real;
    }
    ColumnType::Text
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    // Groups of digits joined by single underscores: no leading, trailing or doubled `_`.
    digits
        .split('_')
        .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()))
}
