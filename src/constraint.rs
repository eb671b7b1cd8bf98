//! Constraint language used by the matcher (§4.2, step 3).
//!
//! The `semver` crate already implements most of what the spec asks for —
//! `=`, `<`, `<=`, `>`, `>=`, `^`, and `x`/`X`/`*` wildcards, plus comma-joined
//! AND groups — so each AND group is mostly handed straight to
//! `semver::VersionReq`. Three things it doesn't do are layered on top here:
//! `!=` (no such comparator exists in the crate), the Bundler-style
//! pessimistic `~>`/`~` operators (the crate's own `~` floats the minor
//! version, not the major one the spec wants), and `||` for OR across groups.

use semver::{Version, VersionReq};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConstraintError {
    #[error("invalid constraint syntax: '{0}'")]
    InvalidSyntax(String),

    #[error("invalid version bound in constraint: '{0}'")]
    InvalidBound(String),

    #[error("invalid constraint: {0}")]
    Semver(#[from] semver::Error),
}

/// One comma-separated AND group, compiled into a `semver::VersionReq` plus
/// any `!=` exclusions the crate can't express.
#[derive(Debug, Clone)]
struct AndGroup {
    req: Option<VersionReq>,
    not_eq: Vec<Version>,
}

impl AndGroup {
    fn matches(&self, version: &Version) -> bool {
        let req_ok = self.req.as_ref().map_or(true, |r| r.matches(version));
        req_ok && self.not_eq.iter().all(|excluded| excluded != version)
    }
}

/// A parsed effective constraint string: OR of AND groups.
#[derive(Debug, Clone)]
pub struct Constraint {
    groups: Vec<AndGroup>,
}

impl Constraint {
    pub fn parse(raw: &str) -> Result<Self, ConstraintError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConstraintError::InvalidSyntax(raw.to_string()));
        }

        let mut groups = Vec::new();
        for or_part in raw.split("||") {
            groups.push(parse_and_group(or_part)?);
        }

        Ok(Constraint { groups })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.groups.iter().any(|g| g.matches(version))
    }
}

fn parse_and_group(raw: &str) -> Result<AndGroup, ConstraintError> {
    let mut semver_segments: Vec<String> = Vec::new();
    let mut not_eq = Vec::new();

    let mut any_segment = false;
    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        any_segment = true;

        if let Some(rest) = segment.strip_prefix("!=") {
            not_eq.push(parse_loose_version(rest.trim())?);
        } else if let Some(rest) = segment.strip_prefix("~>") {
            let (lower, upper) = pessimistic_bounds(rest.trim())?;
            semver_segments.push(lower);
            semver_segments.push(upper);
        } else if let Some(rest) = segment.strip_prefix('~') {
            let (lower, upper) = pessimistic_bounds(rest.trim())?;
            semver_segments.push(lower);
            semver_segments.push(upper);
        } else if is_bare_numeric(segment) {
            // No comparator and no wildcard marker: the spec only defines
            // `=` for exact matches, so treat a bare version the same way.
            semver_segments.push(format!("={segment}"));
        } else {
            semver_segments.push(segment.to_string());
        }
    }

    if !any_segment {
        return Err(ConstraintError::InvalidSyntax(raw.to_string()));
    }

    let req = if semver_segments.is_empty() {
        None
    } else {
        Some(VersionReq::parse(&semver_segments.join(","))?)
    };

    Ok(AndGroup { req, not_eq })
}

fn is_bare_numeric(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse `major[.minor[.patch]]`, rejecting anything else.
fn parse_partial(segment: &str) -> Result<(u64, Option<u64>, Option<u64>), ConstraintError> {
    let parts: Vec<&str> = segment.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(ConstraintError::InvalidBound(segment.to_string()));
    }

    let mut nums = Vec::with_capacity(parts.len());
    for part in &parts {
        let n: u64 = part
            .parse()
            .map_err(|_| ConstraintError::InvalidBound(segment.to_string()))?;
        nums.push(n);
    }

    Ok(match nums.len() {
        1 => (nums[0], None, None),
        2 => (nums[0], Some(nums[1]), None),
        3 => (nums[0], Some(nums[1]), Some(nums[2])),
        _ => unreachable!("length checked above"),
    })
}

fn parse_loose_version(segment: &str) -> Result<Version, ConstraintError> {
    let (major, minor, patch) = parse_partial(segment)?;
    Ok(Version::new(major, minor.unwrap_or(0), patch.unwrap_or(0)))
}

/// Compute `(lower, upper)` VersionReq-comparator strings for a pessimistic
/// (`~`/`~>`) bound, per §4.2: the rightmost specified component floats, the
/// component to its left is pinned, anything coarser bumps by one.
fn pessimistic_bounds(segment: &str) -> Result<(String, String), ConstraintError> {
    let (major, minor, patch) = parse_partial(segment)?;
    Ok(match (minor, patch) {
        (Some(mi), Some(pa)) => (
            format!(">={major}.{mi}.{pa}"),
            format!("<{major}.{}.0", mi + 1),
        ),
        (Some(mi), None) => (
            format!(">={major}.{mi}.0"),
            format!("<{}.0.0", major + 1),
        ),
        (None, _) => (format!(">={major}.0.0"), format!("<{}.0.0", major + 1)),
    })
}
