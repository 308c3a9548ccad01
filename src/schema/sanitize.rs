//! Identifier sanitization for table and column names.

/// Prefix added to identifiers that would otherwise start with an ASCII digit.
pub const DIGIT_PREFIX: &str = "col_";

/// Normalize arbitrary text into a storage-safe identifier.
///
/// Surrounding whitespace is trimmed, every character that is not alphanumeric or `_` becomes
/// `_`, a leading ASCII digit gets the [`DIGIT_PREFIX`], and the result is lower-case. Other
/// numeric characters (`½`, `٣`) are kept as they are and never trigger the prefix.
///
/// The function is total and idempotent. An empty (or whitespace-only) input yields an empty
/// identifier; callers decide whether that is acceptable. Distinct inputs may map to the same
/// identifier (`"Run #"` and `"Run %"` both give `run__`); no deduplication happens here.
///
/// ```rust
/// use instrument_csv_import::schema::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier(" Sample ID "), "sample_id");
/// assert_eq!(sanitize_identifier("pH-value (25°C)"), "ph_value__25_c_");
/// assert_eq!(sanitize_identifier("2nd Reading"), "col_2nd_reading");
/// ```
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            // Lower-casing may expand to non-alphanumeric marks (e.g. 'İ' -> "i\u{307}").
            for lower in c.to_lowercase() {
                out.push(if lower.is_alphanumeric() { lower } else { '_' });
            }
        } else {
            out.push('_');
        }
    }

    match out.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("{DIGIT_PREFIX}{out}"),
        _ => out,
    }
}
