//! Version parsing for the two shapes this domain cares about: the legacy four-part
//! assembly version (`1.2.3.4`) and NuGet-style package versions, which are not
//! strict SemVer (`1.0`, `1.0.*`, `[1.0,2.0)`).

use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssemblyVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl AssemblyVersion {
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let mut parts = raw.trim().split('.');
        let mut next = || -> Result<u32, VersionError> {
            parts
                .next()
                .ok_or_else(|| VersionError::Malformed(raw.to_string()))?
                .parse()
                .map_err(|_| VersionError::Malformed(raw.to_string()))
        };
        let major = next()?;
        let minor = next().unwrap_or(0);
        let build = next().unwrap_or(0);
        let revision = next().unwrap_or(0);
        Ok(Self { major, minor, build, revision })
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionCore {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: Option<String>,
}

impl fmt::Display for PackageVersionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl PartialOrd for PackageVersionCore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersionCore {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

/// A NuGet-style version requirement as declared in a legacy reference or manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageVersion {
    Exact(PackageVersionCore),
    /// `1.2.*` — matches any version with the given prefix.
    Wildcard(Vec<u32>),
    /// `[1.0,2.0)`, `[1.0,)`, etc. Bounds are inclusive unless the bracket says otherwise.
    Range {
        min: Option<(PackageVersionCore, bool)>,
        max: Option<(PackageVersionCore, bool)>,
    },
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{v}"),
            Self::Wildcard(prefix) => {
                let joined = prefix.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
                write!(f, "{joined}.*")
            }
            Self::Range { min, max } => {
                let lo = min.as_ref().map(|(v, _)| v.to_string()).unwrap_or_default();
                let hi = max.as_ref().map(|(v, _)| v.to_string()).unwrap_or_default();
                let open = min.as_ref().map(|(_, inc)| !*inc).unwrap_or(false);
                let close = max.as_ref().map(|(_, inc)| !*inc).unwrap_or(false);
                write!(
                    f,
                    "{}{lo},{hi}{}",
                    if open { "(" } else { "[" },
                    if close { ")" } else { "]" }
                )
            }
        }
    }
}

impl PackageVersion {
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(VersionError::Malformed(raw.to_string()));
        }
        if raw.starts_with('[') || raw.starts_with('(') {
            return RangeParser::new(raw).parse();
        }
        if raw.ends_with(".*") || raw == "*" {
            let prefix_str = raw.trim_end_matches(".*").trim_end_matches('*');
            let prefix = if prefix_str.is_empty() {
                Vec::new()
            } else {
                prefix_str
                    .split('.')
                    .map(|p| p.parse::<u32>().map_err(|_| VersionError::Malformed(raw.to_string())))
                    .collect::<Result<Vec<_>, _>>()?
            };
            return Ok(Self::Wildcard(prefix));
        }
        Ok(Self::Exact(parse_core(raw)?))
    }

    /// True if `candidate` satisfies this requirement.
    pub fn matches(&self, candidate: &PackageVersionCore) -> bool {
        match self {
            Self::Exact(v) => v == candidate,
            Self::Wildcard(prefix) => {
                let fields = [candidate.major, candidate.minor, candidate.patch];
                prefix.iter().zip(fields.iter()).all(|(p, f)| p == f)
            }
            Self::Range { min, max } => {
                let min_ok = match min {
                    None => true,
                    Some((v, true)) => candidate >= v,
                    Some((v, false)) => candidate > v,
                };
                let max_ok = match max {
                    None => true,
                    Some((v, true)) => candidate <= v,
                    Some((v, false)) => candidate < v,
                };
                min_ok && max_ok
            }
        }
    }
}

fn parse_core(raw: &str) -> Result<PackageVersionCore, VersionError> {
    let (numeric, pre_release) = match raw.split_once('-') {
        Some((n, p)) => (n, Some(p.to_string())),
        None => (raw, None),
    };
    let mut parts = numeric.split('.');
    let mut next = || -> Result<u32, VersionError> {
        parts
            .next()
            .ok_or_else(|| VersionError::Malformed(raw.to_string()))?
            .parse()
            .map_err(|_| VersionError::Malformed(raw.to_string()))
    };
    let major = next()?;
    let minor = next().unwrap_or(0);
    let patch = next().unwrap_or(0);
    Ok(PackageVersionCore { major, minor, patch, pre_release })
}

struct RangeParser<'a> {
    chars: Peekable<Chars<'a>>,
    raw: &'a str,
}

impl<'a> RangeParser<'a> {
    fn new(raw: &'a str) -> Self {
        Self { chars: raw.chars().peekable(), raw }
    }

    fn parse(mut self) -> Result<PackageVersion, VersionError> {
        let open = self.chars.next().ok_or_else(|| VersionError::Malformed(self.raw.to_string()))?;
        let min_inclusive = open == '[';
        let body: String = self.chars.by_ref().take_while(|&c| c != ')' && c != ']').collect();
        let close_inclusive = self.raw.trim_end().ends_with(']');

        let (lo, hi) = body.split_once(',').unwrap_or((body.as_str(), ""));
        let min = if lo.trim().is_empty() {
            None
        } else {
            Some((parse_core(lo.trim())?, min_inclusive))
        };
        let max = if hi.trim().is_empty() {
            None
        } else {
            Some((parse_core(hi.trim())?, close_inclusive))
        };
        Ok(PackageVersion::Range { min, max })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    Malformed(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(raw) => write!(f, "malformed version string: {raw}"),
        }
    }
}

impl std::error::Error for VersionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_part_assembly_version() {
        let v = AssemblyVersion::parse("4.7.2.0").unwrap();
        assert_eq!(v, AssemblyVersion { major: 4, minor: 7, build: 2, revision: 0 });
    }

    #[test]
    fn parses_exact_package_version() {
        let v = PackageVersion::parse("12.0.3").unwrap();
        assert_eq!(v, PackageVersion::Exact(PackageVersionCore { major: 12, minor: 0, patch: 3, pre_release: None }));
    }

    #[test]
    fn wildcard_matches_prefix() {
        let req = PackageVersion::parse("1.2.*").unwrap();
        let candidate = PackageVersionCore { major: 1, minor: 2, patch: 9, pre_release: None };
        assert!(req.matches(&candidate));
        let other = PackageVersionCore { major: 1, minor: 3, patch: 0, pre_release: None };
        assert!(!req.matches(&other));
    }

    #[test]
    fn range_bounds_are_respected() {
        let req = PackageVersion::parse("[1.0,2.0)").unwrap();
        assert!(req.matches(&PackageVersionCore { major: 1, minor: 0, patch: 0, pre_release: None }));
        assert!(req.matches(&PackageVersionCore { major: 1, minor: 9, patch: 9, pre_release: None }));
        assert!(!req.matches(&PackageVersionCore { major: 2, minor: 0, patch: 0, pre_release: None }));
    }
}
