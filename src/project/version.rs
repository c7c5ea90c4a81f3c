//! Lenient semantic version comparison
//!
//! package.json holds range specs (`^16.8.0`, `~4.0`, `>=1`), not versions,
//! so they are reduced to the lowest version they name before comparing.

use semver::Version;

/// Parse a version or range spec into a concrete version.
///
/// Returns `None` for specs that name no version at all (`latest`,
/// `file:../x`, git URLs).
pub fn parse_loose(spec: &str) -> Option<Version> {
    let first = spec.split("||").next()?.trim();
    let trimmed = first.trim_start_matches(|c: char| "^~=<>v ".contains(c));
    let token = trimmed.split_whitespace().next()?;

    if let Ok(version) = Version::parse(token) {
        return Some(version);
    }

    // "16", "4.x", "1.0" and friends
    let core = token.split(['-', '+']).next()?;
    let mut parts = [0u64; 3];
    let mut seen = 0;
    for (i, part) in core.split('.').enumerate() {
        if i >= 3 {
            return None;
        }
        match part {
            "x" | "X" | "*" => {}
            _ => parts[i] = part.parse().ok()?,
        }
        seen += 1;
    }
    if seen == 0 {
        return None;
    }

    Some(Version::new(parts[0], parts[1], parts[2]))
}

/// Whether `spec` names a version greater than or equal to `min`.
///
/// Unparseable input on either side compares as `false`.
pub fn at_least(spec: &str, min: &str) -> bool {
    match (parse_loose(spec), parse_loose(min)) {
        (Some(v), Some(m)) => v >= m,
        _ => false,
    }
}
