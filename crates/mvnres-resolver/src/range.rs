//! Version parsing, comparison, and range matching.
//!
//! Versions are parsed as PEP 440-compatible versions, not semver and not
//! Maven's own `ComparableVersion` scheme — `epoch!release[pre][post][dev]`
//! with `+local` ignored for satisfaction checks but still a comparison
//! tiebreak, matching `packaging.version.Version`, which is what the
//! proof-of-concept this was ported from uses for every version string it
//! touches (dependency versions, range bounds, and JDK versions alike).
//!
//! Maven-only qualifier words that aren't part of PEP 440's vocabulary
//! (`milestone`, `sp`, `SNAPSHOT`, ...) don't match the grammar below, so
//! they fall back to a trailing "legacy" text segment that compares after
//! the equivalent bare release — e.g. `1.0-milestone1` sorts after `1.0`,
//! not between `beta` and `rc` as Maven's own ordering would place it. This
//! is a real divergence from Maven's native ordering, and is the point:
//! following PEP 440 here means tokens outside its vocabulary are priced
//! differently than Maven itself would price them.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// A parsed version with comparable segments, following PEP 440.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    pub original: String,
    epoch: u64,
    release: Vec<u64>,
    pre: PreKey,
    post: PostKey,
    dev: DevKey,
    /// Trailing qualifier text that didn't match any recognized PEP 440
    /// segment (pre/post/dev/local keyword) — a Maven-only token like
    /// `milestone1` or `SNAPSHOT`. Compared lexicographically, and always
    /// sorts after the same version with no such trailer.
    legacy: Option<String>,
    local: Option<String>,
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

/// Pre-release ordering key. `NegInf` is the implicit pre-release of a
/// pure dev release with no explicit pre segment; `PosInf` is "no
/// pre-release at all" (a final or post release), which sorts after
/// every real pre-release.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
enum PreKey {
    NegInf,
    Pre(u8, u64),
    PosInf,
}

/// Post-release ordering key. Absence sorts before any post release,
/// since a post release is strictly newer than the release it modifies.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
enum PostKey {
    NegInf,
    Post(u64),
}

/// Dev-release ordering key. Presence sorts before absence: a dev
/// release always precedes its corresponding final release.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    PosInf,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        parse_pep440(version.trim())
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.ends_with("-SNAPSHOT")
    }

    pub fn base_version(&self) -> &str {
        self.original
            .strip_suffix("-SNAPSHOT")
            .unwrap_or(&self.original)
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| self.pre.cmp(&other.pre))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev.cmp(&other.dev))
            .then_with(|| self.legacy.cmp(&other.legacy))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let ord = a.get(i).copied().unwrap_or(0).cmp(&b.get(i).copied().unwrap_or(0));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

const PRE_KEYWORDS: &[(&str, u8)] = &[
    ("alpha", 0),
    ("beta", 1),
    ("preview", 2),
    ("pre", 2),
    ("rc", 2),
    ("a", 0),
    ("b", 1),
    ("c", 2),
];

const POST_KEYWORDS: &[&str] = &["post", "rev", "r"];

fn parse_pep440(version: &str) -> MavenVersion {
    let lower = version.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut idx = 0;

    let epoch = parse_epoch(bytes, &mut idx);
    let release = parse_release(bytes, &mut idx);

    let mut pre = PreKey::PosInf;
    if let Some((letter, num, next)) = try_parse_keyword_with_number(bytes, idx, PRE_KEYWORDS) {
        pre = PreKey::Pre(letter, num);
        idx = next;
    }

    let mut post = PostKey::NegInf;
    if idx < bytes.len() && bytes[idx] == b'-' && idx + 1 < bytes.len() && bytes[idx + 1].is_ascii_digit() {
        let mut end = idx + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        post = PostKey::Post(lower[idx + 1..end].parse().unwrap_or(0));
        idx = end;
    } else if let Some((_, num, next)) = try_parse_keyword_with_number(
        bytes,
        idx,
        &POST_KEYWORDS.iter().map(|k| (*k, 0u8)).collect::<Vec<_>>(),
    ) {
        post = PostKey::Post(num);
        idx = next;
    }

    let mut dev = DevKey::PosInf;
    if let Some((_, num, next)) = try_parse_keyword_with_number(bytes, idx, &[("dev", 0)]) {
        dev = DevKey::Dev(num);
        idx = next;
    }

    let mut local = None;
    if idx < bytes.len() && bytes[idx] == b'+' {
        local = Some(lower[idx + 1..].to_string());
        idx = bytes.len();
    }

    let legacy = if idx < bytes.len() {
        let rest = lower[idx..].trim_start_matches(|c| c == '.' || c == '-' || c == '_');
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    } else {
        None
    };

    MavenVersion {
        original: version.to_string(),
        epoch,
        release,
        pre,
        post,
        dev,
        legacy,
        local,
    }
}

fn parse_epoch(bytes: &[u8], idx: &mut usize) -> u64 {
    let start = *idx;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end > start && end < bytes.len() && bytes[end] == b'!' {
        let epoch = std::str::from_utf8(&bytes[start..end]).unwrap().parse().unwrap_or(0);
        *idx = end + 1;
        epoch
    } else {
        0
    }
}

fn parse_release(bytes: &[u8], idx: &mut usize) -> Vec<u64> {
    let mut release = Vec::new();
    loop {
        let start = *idx;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == start {
            break;
        }
        release.push(std::str::from_utf8(&bytes[start..end]).unwrap().parse().unwrap_or(0));
        *idx = end;
        if end < bytes.len() && bytes[end] == b'.' && end + 1 < bytes.len() && bytes[end + 1].is_ascii_digit() {
            *idx = end + 1;
        } else {
            break;
        }
    }
    release
}

/// Try to match, at `idx`, an optional separator (`.`/`-`/`_`) followed by
/// the longest matching keyword from `keywords`, followed by an optional
/// separator and an optional digit run (defaulting to `0`). Returns the
/// keyword's tag, the parsed number, and the index just past the match.
/// Matching is tentative: on failure `idx` is left untouched by the caller.
fn try_parse_keyword_with_number(bytes: &[u8], idx: usize, keywords: &[(&str, u8)]) -> Option<(u8, u64, usize)> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut pos = idx;
    if pos < bytes.len() && matches!(bytes[pos], b'.' | b'-' | b'_') {
        pos += 1;
    }

    let mut sorted: Vec<(&str, u8)> = keywords.to_vec();
    sorted.sort_by_key(|(k, _)| std::cmp::Reverse(k.len()));

    for (keyword, tag) in sorted {
        if text[pos..].starts_with(keyword) {
            let mut after = pos + keyword.len();
            if after < bytes.len() && matches!(bytes[after], b'.' | b'-' | b'_') {
                after += 1;
            }
            let start = after;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            let num = if end > start { text[start..end].parse().unwrap_or(0) } else { 0 };
            return Some((tag, num, end));
        }
    }
    None
}

/// A Maven version range expression: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]`.
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone)]
pub struct Bound {
    pub version: MavenVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a Maven version range string. Returns `None` for bare
    /// versions (not a range) — the caller should treat those literally.
    pub fn parse(spec: &str) -> Option<Self> {
        let s = spec.trim();
        if !s.starts_with('[') && !s.starts_with('(') {
            return None;
        }

        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        if let Some((lower, upper)) = inner.split_once(',') {
            let lower = lower.trim();
            let upper = upper.trim();
            Some(VersionRange {
                lower: if lower.is_empty() {
                    None
                } else {
                    Some(Bound {
                        version: MavenVersion::parse(lower),
                        inclusive: open_inclusive,
                    })
                },
                upper: if upper.is_empty() {
                    None
                } else {
                    Some(Bound {
                        version: MavenVersion::parse(upper),
                        inclusive: close_inclusive,
                    })
                },
            })
        } else {
            let v = MavenVersion::parse(inner.trim());
            Some(VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version: v,
                    inclusive: true,
                }),
            })
        }
    }

    /// Parse a profile's `<jdk>` criterion. A bare version (no bracket)
    /// means "this version or newer", i.e. `[version,)`.
    pub fn parse_jdk(spec: &str) -> VersionRange {
        if let Some(range) = VersionRange::parse(spec) {
            return range;
        }
        VersionRange {
            lower: Some(Bound {
                version: MavenVersion::parse(spec.trim()),
                inclusive: true,
            }),
            upper: None,
        }
    }

    pub fn contains(&self, version: &MavenVersion) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }
}

/// Resolve a version range against the versions present on disk under
/// `<m2_home>/<g>/<a>/`. Returns the highest satisfying version, or
/// `None` if the artifact directory doesn't exist or nothing satisfies.
pub fn resolve_range(artifact_dir: &Path, range: &VersionRange) -> Option<MavenVersion> {
    if !artifact_dir.is_dir() {
        return None;
    }
    std::fs::read_dir(artifact_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .map(|name| MavenVersion::parse(&name))
        .filter(|version| range.contains(version))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_ordering() {
        let v1 = MavenVersion::parse("1.0");
        let v2 = MavenVersion::parse("2.0");
        assert!(v1 < v2);
    }

    #[test]
    fn three_part_ordering() {
        let v1 = MavenVersion::parse("1.0.0");
        let v2 = MavenVersion::parse("1.0.1");
        let v3 = MavenVersion::parse("1.1.0");
        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn pre_release_ordering() {
        let alpha = MavenVersion::parse("1.0a1");
        let beta = MavenVersion::parse("1.0b1");
        let rc = MavenVersion::parse("1.0rc1");
        let release = MavenVersion::parse("1.0");

        assert!(alpha < beta);
        assert!(beta < rc);
        assert!(rc < release);
    }

    #[test]
    fn maven_only_qualifier_sorts_after_bare_release() {
        // "sp" isn't PEP 440 vocabulary, so it's a legacy trailer that
        // sorts after the equivalent bare release rather than between
        // `rc` and release the way Maven's native ordering would place it.
        let release = MavenVersion::parse("1.0");
        let sp = MavenVersion::parse("1.0-sp");
        assert!(release < sp);
    }

    #[test]
    fn dev_release_sorts_before_final() {
        let dev = MavenVersion::parse("1.0.dev1");
        let release = MavenVersion::parse("1.0");
        assert!(dev < release);
    }

    #[test]
    fn post_release_sorts_after_final() {
        let release = MavenVersion::parse("1.0");
        let post = MavenVersion::parse("1.0.post1");
        let implicit_post = MavenVersion::parse("1.0-1");
        assert!(release < post);
        assert!(release < implicit_post);
    }

    #[test]
    fn maven_snapshot_is_not_pep440_vocabulary() {
        // Unlike Maven's native ordering (where SNAPSHOT sorts before its
        // release), "SNAPSHOT" has no PEP 440 meaning, so it's a legacy
        // trailer and sorts *after* the bare release, not before it.
        let snap = MavenVersion::parse("1.0-SNAPSHOT");
        let rel = MavenVersion::parse("1.0");
        assert!(rel < snap);
    }

    #[test]
    fn trailing_zeros_equal() {
        let v1 = MavenVersion::parse("1.0");
        let v2 = MavenVersion::parse("1.0.0");
        assert_eq!(v1, v2);
    }

    #[test]
    fn version_range_exclusive_upper() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(range.contains(&MavenVersion::parse("1.0")));
        assert!(range.contains(&MavenVersion::parse("1.9.9")));
        assert!(!range.contains(&MavenVersion::parse("2.0")));
    }

    #[test]
    fn version_range_open_lower() {
        let range = VersionRange::parse("(,2.0)").unwrap();
        assert!(range.contains(&MavenVersion::parse("1.0")));
        assert!(!range.contains(&MavenVersion::parse("2.0")));
    }

    #[test]
    fn version_range_exact() {
        let range = VersionRange::parse("[1.5]").unwrap();
        assert!(range.contains(&MavenVersion::parse("1.5")));
        assert!(!range.contains(&MavenVersion::parse("1.4")));
    }

    #[test]
    fn bare_version_not_a_range() {
        assert!(VersionRange::parse("1.0").is_none());
    }

    #[test]
    fn jdk_bare_version_means_at_least() {
        let range = VersionRange::parse_jdk("17");
        assert!(range.contains(&MavenVersion::parse("17")));
        assert!(range.contains(&MavenVersion::parse("21.0.2")));
        assert!(!range.contains(&MavenVersion::parse("11")));
    }

    #[test]
    fn jdk_explicit_range_is_used_as_is() {
        let range = VersionRange::parse_jdk("[11,17)");
        assert!(range.contains(&MavenVersion::parse("11")));
        assert!(!range.contains(&MavenVersion::parse("17")));
    }

    #[test]
    fn resolve_range_picks_highest_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        for v in ["1.2", "1.5", "1.9", "2.0", "2.1"] {
            std::fs::create_dir_all(tmp.path().join(v)).unwrap();
        }
        let range = VersionRange::parse("[1.2,2.0)").unwrap();
        let chosen = resolve_range(tmp.path(), &range).unwrap();
        assert_eq!(chosen.original, "1.9");
    }

    #[test]
    fn resolve_range_missing_dir_returns_none() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(resolve_range(Path::new("/does/not/exist"), &range).is_none());
    }
}
