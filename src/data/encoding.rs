use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;

use encoding_rs::{Encoding, EUC_KR, UTF_8};
use serde::{Deserialize, Serialize};

use super::error::AttemptError;

// ---------------------------------------------------------------------------
// Encoding candidates
// ---------------------------------------------------------------------------

/// What to do with a leading byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomHandling {
    /// Drop a BOM matching the candidate's own encoding before decoding.
    Strip,
    /// Decode the BOM like any other bytes (it ends up as U+FEFF).
    Keep,
}

/// One decoding hypothesis tried by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingCandidate {
    pub name: &'static str,
    encoding: &'static Encoding,
    bom: BomHandling,
}

impl EncodingCandidate {
    pub fn new(name: &'static str, encoding: &'static Encoding, bom: BomHandling) -> Self {
        Self {
            name,
            encoding,
            bom,
        }
    }

    /// Decode the complete input. Any malformed sequence fails the whole
    /// candidate; nothing is ever replaced with U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, AttemptError> {
        let body = match self.bom {
            BomHandling::Strip => match Encoding::for_bom(bytes) {
                Some((found, len)) if found == self.encoding => &bytes[len..],
                _ => bytes,
            },
            BomHandling::Keep => bytes,
        };
        self.encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or(AttemptError::Malformed {
                encoding: self.name,
            })
    }
}

/// Candidates in priority order. Earlier entries win ties.
///
/// `EUC_KR` in encoding_rs is the windows-949 superset, so it covers the
/// Unified Hangul Code extension as well.
pub fn default_candidates() -> Vec<EncodingCandidate> {
    vec![
        EncodingCandidate::new("utf-8-sig", UTF_8, BomHandling::Strip),
        EncodingCandidate::new("cp949", EUC_KR, BomHandling::Keep),
        EncodingCandidate::new("utf-8", UTF_8, BomHandling::Keep),
    ]
}

// ---------------------------------------------------------------------------
// Script ratio scoring
// ---------------------------------------------------------------------------

/// The block of rows × columns inspected when scoring a decoded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleWindow {
    pub rows: usize,
    pub columns: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            rows: 100,
            columns: 5,
        }
    }
}

/// Code point ranges of the writing system the dataset is expected to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRange {
    ranges: Vec<RangeInclusive<char>>,
}

impl ScriptRange {
    pub fn new(ranges: Vec<RangeInclusive<char>>) -> Self {
        Self { ranges }
    }

    /// Precomposed Hangul syllables.
    pub fn hangul() -> Self {
        Self::new(vec!['\u{AC00}'..='\u{D7A3}'])
    }

    pub fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.contains(&c))
    }

    /// Fraction of characters in `text` that belong to this script.
    /// Always within [0, 1]; an empty sample scores 0.
    pub fn ratio(&self, text: &str) -> f64 {
        let (hits, total) = text.chars().fold((0usize, 0usize), |(hits, total), c| {
            (hits + usize::from(self.contains(c)), total + 1)
        });
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl Default for ScriptRange {
    fn default() -> Self {
        Self::hangul()
    }
}

// ---------------------------------------------------------------------------
// Misdecoding heuristic
// ---------------------------------------------------------------------------

/// Signs that the winning decoding is still wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MisdecodeHint {
    /// U+FFFD appears in the decoded sample.
    ReplacementCharacter,
    /// UTF-8 lead bytes read as Latin-1 followed by continuation bytes,
    /// e.g. `ë¶€ì„œ` for `부서`.
    Latin1Mojibake,
}

impl fmt::Display for MisdecodeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MisdecodeHint::ReplacementCharacter => {
                write!(f, "decoded text contains replacement characters (U+FFFD)")
            }
            MisdecodeHint::Latin1Mojibake => {
                write!(f, "decoded text looks like UTF-8 read as Latin-1")
            }
        }
    }
}

/// Best-effort check of a decoded sample. Not a general mojibake detector.
pub fn detect_misdecoding(sample: &str) -> Option<MisdecodeHint> {
    if sample.contains('\u{FFFD}') {
        return Some(MisdecodeHint::ReplacementCharacter);
    }
    let mut chars = sample.chars().peekable();
    while let Some(c) = chars.next() {
        let lead = ('\u{C2}'..='\u{F4}').contains(&c);
        if lead && chars.peek().is_some_and(|n| ('\u{80}'..='\u{BF}').contains(n)) {
            return Some(MisdecodeHint::Latin1Mojibake);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp949_bytes(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = EUC_KR.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn utf8_sig_strips_bom_but_plain_utf8_keeps_it() {
        let bytes = b"\xEF\xBB\xBFdept";
        let candidates = default_candidates();
        let (sig, plain) = (candidates[0], candidates[2]);
        assert_eq!(sig.decode(bytes).unwrap(), "dept");
        assert_eq!(plain.decode(bytes).unwrap(), "\u{FEFF}dept");
    }

    #[test]
    fn legacy_bytes_fail_strict_utf8() {
        let bytes = cp949_bytes("부서,업무만족도");
        let candidates = default_candidates();
        assert!(matches!(
            candidates[0].decode(&bytes),
            Err(AttemptError::Malformed { encoding: "utf-8-sig" })
        ));
        assert_eq!(candidates[1].decode(&bytes).unwrap(), "부서,업무만족도");
        assert!(candidates[2].decode(&bytes).is_err());
    }

    #[test]
    fn ratio_counts_hangul_share() {
        let script = ScriptRange::hangul();
        assert_eq!(script.ratio(""), 0.0);
        assert_eq!(script.ratio("부서ab"), 0.5);
        assert_eq!(script.ratio("영업"), 1.0);
        assert_eq!(script.ratio("Sales 42"), 0.0);
    }

    #[test]
    fn ratio_stays_in_unit_interval() {
        let script = ScriptRange::hangul();
        for text in ["", "a", "가", "가a\u{FFFD}", "ë¶€ì„œ", "\u{FEFF}"] {
            let r = script.ratio(text);
            assert!((0.0..=1.0).contains(&r), "{text:?} scored {r}");
        }
    }

    #[test]
    fn detects_replacement_and_latin1_patterns() {
        assert_eq!(
            detect_misdecoding("부\u{FFFD}서"),
            Some(MisdecodeHint::ReplacementCharacter)
        );
        assert_eq!(
            detect_misdecoding("ë¶€ì„œ"),
            Some(MisdecodeHint::Latin1Mojibake)
        );
        assert_eq!(detect_misdecoding("Ã©quipe"), Some(MisdecodeHint::Latin1Mojibake));
        assert_eq!(detect_misdecoding("부서 café"), None);
        assert_eq!(detect_misdecoding(""), None);
    }
}
