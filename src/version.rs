// Version utilities for release tags and installed package versions

use std::cmp::Ordering;

/// Strip a single leading `v` from a release tag.
///
/// Examples:
/// - "v2.3.0" -> "2.3.0"
/// - "2.3.0" -> "2.3.0"
/// - "vv1" -> "v1"
pub fn normalize_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Split "1.2.3-beta.1+build.5" into its dotted release part and optional
/// pre-release suffix. Build metadata after `+` is dropped.
fn split_prerelease(version: &str) -> (&str, Option<&str>) {
    let version = version.split_once('+').map_or(version, |(head, _)| head);
    match version.split_once('-') {
        Some((release, suffix)) => (release, Some(suffix)),
        None => (version, None),
    }
}

/// Split an identifier such as "rc10" into runs of digits and non-digits
fn chunks(identifier: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;
    for (i, c) in identifier.char_indices() {
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            out.push(&identifier[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    if start < identifier.len() {
        out.push(&identifier[start..]);
    }
    out
}

/// Compare one pre-release identifier. Digit runs compare numerically and
/// sort before letters, so "rc2" < "rc10" and "1" < "alpha".
fn compare_identifier(a: &str, b: &str) -> Ordering {
    let (a_chunks, b_chunks) = (chunks(a), chunks(b));
    for (x, y) in a_chunks.iter().zip(&b_chunks) {
        let x_num = x.parse::<u64>().ok();
        let y_num = y.parse::<u64>().ok();
        let ord = match (x_num, y_num) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

/// Compare dot-separated pre-release suffixes identifier by identifier
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_identifier(x, y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// Numeric value of a dotted segment; trailing garbage such as "3rc" reads as 3
fn segment_value(segment: &str) -> u64 {
    let digits: String = segment
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Compare two dotted version strings segment by segment.
///
/// Missing trailing segments count as zero, so "1.2" equals "1.2.0".
/// A pre-release suffix sorts before the plain release ("1.2.0-rc1" < "1.2.0")
/// and build metadata ("1.2.0+build.5") is ignored.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_release, a_pre) = split_prerelease(a.trim());
    let (b_release, b_pre) = split_prerelease(b.trim());

    let a_parts: Vec<u64> = a_release.split('.').map(segment_value).collect();
    let b_parts: Vec<u64> = b_release.split('.').map(segment_value).collect();

    let len = a_parts.len().max(b_parts.len());
    for i in 0..len {
        let left = a_parts.get(i).copied().unwrap_or(0);
        let right = b_parts.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(x), Some(y)) => compare_prerelease(x, y),
    }
}

/// True when `candidate` is strictly newer than `current`
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare_versions(candidate, current) == Ordering::Greater
}
