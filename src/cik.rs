//! Central Index Key (CIK) normalization.
//!
//! EDGAR's JSON APIs address filers by a ten digit, zero-padded CIK
//! (`CIK0000320193.json`), while the document archive uses the bare number
//! (`/Archives/edgar/data/320193/...`). Everything in this crate carries the
//! padded form and converts to the bare form only when building archive URLs.

/// Width of a canonical CIK.
pub const CIK_WIDTH: usize = 10;

/// Returns true when `input` is a non-empty run of ASCII digits.
pub fn is_numeric_id(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// Converts a user-supplied identifier into canonical form.
///
/// All-digit input is left-padded with zeros to ten characters. Anything else
/// (tickers, names) is returned trimmed and otherwise untouched, so the result
/// can still be compared against canonical ids without ever matching one by
/// accident.
///
/// ```rust
/// use edgar10k::cik::normalize;
/// assert_eq!(normalize("320193"), "0000320193");
/// assert_eq!(normalize(" AAPL "), "AAPL");
/// ```
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if is_numeric_id(trimmed) {
        format!("{:0>width$}", trimmed, width = CIK_WIDTH)
    } else {
        trimmed.to_string()
    }
}

/// Strips the zero padding from a canonical CIK for use in archive paths.
///
/// An identifier made only of zeros collapses to `"0"` rather than an empty
/// path segment.
///
/// ```rust
/// use edgar10k::cik::to_url_form;
/// assert_eq!(to_url_form("0000320193"), "320193");
/// assert_eq!(to_url_form("0000000000"), "0");
/// ```
pub fn to_url_form(canonical: &str) -> String {
    let canonical = canonical.trim();
    let stripped = canonical.trim_start_matches('0');
    if stripped.is_empty() && !canonical.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_numeric_input_to_ten_digits() {
        assert_eq!(normalize("320193"), "0000320193");
        assert_eq!(normalize("0000320193"), "0000320193");
        assert_eq!(normalize("1"), "0000000001");
        assert_eq!(normalize("  789019\n"), "0000789019");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["320193", "0", "1018724", "AAPL", "Apple Inc.", "", "12345678901"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn numeric_input_always_yields_ten_digits() {
        for input in ["0", "7", "51143", "1652044", "0000019617"] {
            let id = normalize(input);
            assert_eq!(id.len(), CIK_WIDTH);
            assert!(is_numeric_id(&id));
        }
    }

    #[test]
    fn non_numeric_input_is_left_alone() {
        assert_eq!(normalize("msft"), "msft");
        assert_eq!(normalize("320193A"), "320193A");
        assert_eq!(normalize("-320193"), "-320193");
    }

    #[test]
    fn overlong_numbers_are_not_truncated() {
        assert_eq!(normalize("12345678901"), "12345678901");
    }

    #[test]
    fn url_form_strips_padding() {
        assert_eq!(to_url_form(&normalize("320193")), "320193");
        assert_eq!(to_url_form("0000320193"), "320193");
        assert_eq!(to_url_form("320193"), "320193");
    }

    #[test]
    fn url_form_never_leads_with_zero() {
        for input in ["0000320193", "0000000001", "1000000000", "0000051143"] {
            let url_form = to_url_form(&normalize(input));
            assert!(!url_form.starts_with('0'), "{url_form}");
            assert_eq!(to_url_form(&url_form), url_form);
        }
    }

    #[test]
    fn all_zero_identifier_keeps_a_single_zero() {
        assert_eq!(to_url_form("0000000000"), "0");
        assert_eq!(to_url_form(&normalize("0")), "0");
        assert_eq!(to_url_form(""), "");
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric_id("0320193"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("32 0193"));
        assert!(!is_numeric_id("３２０")); // full-width digits
    }
}
