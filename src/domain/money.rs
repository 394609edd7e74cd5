//! Monetary value normalization.
//!
//! Catalog cells arrive in whatever shape the spreadsheet left them in:
//! `"€12,50"`, `"13.51"`, a bare number, or nothing at all. Every consumer
//! goes through this module so the coercion semantics are identical
//! everywhere: absent or unparseable input degrades to `0.0` and never
//! raises. A single malformed cell must not abort a batch computation.

/// Parses a textual monetary value into a euro amount.
///
/// Strips the `€` symbol and stray quote characters, converts a comma
/// decimal separator to a dot, trims whitespace, then attempts numeric
/// conversion. Empty input and non-numeric residue both yield `0.0`.
///
/// Negative amounts pass through unchanged; the engine treats them as
/// correction entries.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned = raw.replace('€', "").replace('"', "").replace(',', ".");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Strict variant used by the import boundary: an empty cell is fine
/// (`Some(0.0)`), but non-numeric residue declines with `None` so the row
/// can be rejected instead of silently zeroed.
pub fn parse_amount_strict(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('€', "").replace('"', "").replace(',', ".");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok()
}

/// Total coercion for loosely-typed JSON cells (hosted-table rows store
/// amounts as either strings or numbers). Same fail-open contract as
/// [`parse_amount`].
pub fn parse_value(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_symbol_and_comma_decimal() {
        assert_eq!(parse_amount("€12,50"), 12.50);
        assert_eq!(parse_amount("€5.25"), 5.25);
        assert_eq!(parse_amount("  13.51  "), 13.51);
        assert_eq!(parse_amount("\"€3,10\""), 3.10);
    }

    #[test]
    fn test_parse_malformed_input_degrades_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("€abc"), 0.0);
        // thousands separator plus decimal comma leaves two dots; fails open
        assert_eq!(parse_amount("€1.234,56"), 0.0);
    }

    #[test]
    fn test_parse_negative_passes_through() {
        assert_eq!(parse_amount("-2,50"), -2.50);
    }

    #[test]
    fn test_strict_parse_declines_on_garbage() {
        assert_eq!(parse_amount_strict("€12,50"), Some(12.50));
        assert_eq!(parse_amount_strict(""), Some(0.0));
        assert_eq!(parse_amount_strict("abc"), None);
    }

    #[test]
    fn test_parse_value_handles_json_variants() {
        assert_eq!(parse_value(&serde_json::json!(12.5)), 12.5);
        assert_eq!(parse_value(&serde_json::json!("€12,50")), 12.5);
        assert_eq!(parse_value(&serde_json::json!(null)), 0.0);
        assert_eq!(parse_value(&serde_json::json!(["x"])), 0.0);
    }
}
