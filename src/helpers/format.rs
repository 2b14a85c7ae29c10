//! # Formatting Helpers
//!
//! Value-to-text transforms used by report templates.
//!
//! ## Helpers Provided
//!
//! - **`cleanid`**: Sanitizes text for use as an HTML id or anchor.
//! - **`duration`**: Formats elapsed nanoseconds as seconds and milliseconds.
//! - **`embedmime`**: Decodes a base64 attachment into inline markup.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::helpers::FormatHelperFn;
use crate::value::ValueExt;

static NON_ID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]+").expect("identifier pattern is valid"));

/// Decodes unpadded input and ignores stray bits in the final symbol.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Removes every character that is not an ASCII letter, digit, `_` or `-`.
///
/// Usage: {{cleanid <text>}}
///
/// Example:
///   {{cleanid "Scenario: Login/Logout #1"}} => ScenarioLoginLogout1
pub const HELPER_CLEANID: FormatHelperFn = |value| {
    let text = value.expect_str("cleanid")?;
    Ok(NON_ID_CHARS.replace_all(text, "").into_owned())
};

/// Formats a nanosecond count as `"<seconds>s <milliseconds>ms"`.
///
/// Usage: {{duration <nanos>}}
///
/// The count is rounded to the nearest nanosecond first; the millisecond part
/// is what remains after whole seconds, truncated.
///
/// Example:
///   {{duration 1500000000}} => 1s 500ms
pub const HELPER_DURATION: FormatHelperFn = |value| {
    let nanos = value.expect_number("duration")?.round() as i64;
    let seconds = nanos.div_euclid(NANOS_PER_SECOND);
    let millis = nanos.rem_euclid(NANOS_PER_SECOND) / NANOS_PER_MILLI;
    Ok(format!("{seconds}s {millis}ms"))
};

/// Decodes base64 content and wraps it in a `<span>` for inline embedding.
///
/// Usage: {{{embedmime <base64>}}}
///
/// Characters outside the base64 alphabet are discarded, the first `=` ends
/// the payload, and a dangling final character is dropped, so any text
/// decodes to something. Bytes that are not valid UTF-8 are replaced rather
/// than rejected. Use the triple-stash form, otherwise the engine escapes the
/// markup.
pub const HELPER_EMBEDMIME: FormatHelperFn = |value| {
    let encoded = value.expect_str("embedmime")?;
    let mut symbols: Vec<u8> = encoded
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/' || *b == b'=')
        .take_while(|b| *b != b'=')
        .collect();
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }
    // The filtered symbols always form valid unpadded base64.
    let bytes = LENIENT_BASE64.decode(&symbols).unwrap_or_default();
    Ok(format!("<span>{}</span>", String::from_utf8_lossy(&bytes)))
};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::diagnostics::HelperError;

    #[test]
    fn cleanid_keeps_only_id_characters() {
        assert_eq!(
            HELPER_CLEANID(&json!("Scenario: Login/Logout #1")).unwrap(),
            "ScenarioLoginLogout1"
        );
        assert_eq!(
            HELPER_CLEANID(&json!("my-feature_v2 (draft)")).unwrap(),
            "my-feature_v2draft"
        );
        assert_eq!(HELPER_CLEANID(&json!("")).unwrap(), "");
    }

    #[test]
    fn cleanid_rejects_non_text() {
        assert_eq!(
            HELPER_CLEANID(&json!(7)),
            Err(HelperError::TypeMismatch {
                helper: "cleanid",
                expected: "String",
                found: "Number",
            })
        );
    }

    #[test]
    fn duration_splits_seconds_and_milliseconds() {
        assert_eq!(HELPER_DURATION(&json!(0)).unwrap(), "0s 0ms");
        assert_eq!(HELPER_DURATION(&json!(1_500_000_000u64)).unwrap(), "1s 500ms");
        assert_eq!(HELPER_DURATION(&json!(999_999)).unwrap(), "0s 0ms");
        assert_eq!(HELPER_DURATION(&json!(62_345_678_901u64)).unwrap(), "62s 345ms");
    }

    #[test]
    fn duration_rounds_fractional_nanoseconds() {
        assert_eq!(HELPER_DURATION(&json!(999_999.6)).unwrap(), "0s 1ms");
        assert_eq!(HELPER_DURATION(&json!(-1)).unwrap(), "-1s 999ms");
    }

    #[test]
    fn duration_rejects_text() {
        assert!(matches!(
            HELPER_DURATION(&json!("12")),
            Err(HelperError::TypeMismatch { helper: "duration", .. })
        ));
    }

    #[test]
    fn embedmime_wraps_decoded_markup() {
        // "<b>hi</b>"
        let wrapped = HELPER_EMBEDMIME(&json!("PGI+aGk8L2I+")).unwrap();
        assert_eq!(wrapped, "<span><b>hi</b></span>");
    }

    #[test]
    fn embedmime_ignores_line_breaks_and_missing_padding() {
        assert_eq!(HELPER_EMBEDMIME(&json!("aGVs\nbG8")).unwrap(), "<span>hello</span>");
    }

    #[test]
    fn embedmime_discards_characters_outside_the_alphabet() {
        assert_eq!(
            HELPER_EMBEDMIME(&json!("PGI+aGk8L2I+!")).unwrap(),
            "<span><b>hi</b></span>"
        );
        assert_eq!(HELPER_EMBEDMIME(&json!("aG*Vs-bG8=")).unwrap(), "<span>hello</span>");
        assert_eq!(HELPER_EMBEDMIME(&json!("@@@")).unwrap(), "<span></span>");
    }

    #[test]
    fn embedmime_stops_at_padding_and_drops_a_dangling_symbol() {
        assert_eq!(HELPER_EMBEDMIME(&json!("aGk=PGI+")).unwrap(), "<span>hi</span>");
        assert_eq!(HELPER_EMBEDMIME(&json!("aGVsbA")).unwrap(), "<span>hell</span>");
        assert_eq!(HELPER_EMBEDMIME(&json!("aGVsb")).unwrap(), "<span>hel</span>");
    }
}
