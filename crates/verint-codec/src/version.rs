use std::borrow::Borrow;
use std::cmp::{Ordering, max};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::iter;
use std::str::FromStr;

use crate::ParseError;

/// Optional prerelease modifier (alpha, beta or release candidate) appended to version
///
/// The variant order is the precedence order.
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy, Ord, PartialOrd)]
pub enum PrereleaseKind {
    /// alpha prerelease
    Alpha,
    /// beta prerelease
    Beta,
    /// release candidate prerelease
    Rc,
}

impl PrereleaseKind {
    /// The two-bit symbol stored in the packed layout. `0b00` is left free for the markers.
    pub(crate) const fn code(self) -> u64 {
        match self {
            Self::Alpha => 0b01,
            Self::Beta => 0b10,
            Self::Rc => 0b11,
        }
    }

    pub(crate) const fn from_code(code: u64) -> Option<Self> {
        match code {
            0b01 => Some(Self::Alpha),
            0b10 => Some(Self::Beta),
            0b11 => Some(Self::Rc),
            _ => None,
        }
    }
}

impl Display for PrereleaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => write!(f, "a"),
            Self::Beta => write!(f, "b"),
            Self::Rc => write!(f, "rc"),
        }
    }
}

/// A pre-release marker such as `a1` or `rc0`.
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy, Ord, PartialOrd)]
pub struct Prerelease {
    pub kind: PrereleaseKind,
    pub number: u64,
}

impl Display for Prerelease {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.number)
    }
}

/// A parsed version such as `1.2.3` or `4!5.6.7a8.dev9`, before or after validation.
///
/// Parse with [`VersionKey::from_str`], check the bit budget with [`VersionKey::validate`], and
/// pack with [`PackedVersion::pack`](crate::PackedVersion::pack).
///
/// The [`Ord`] implementation is the version precedence that the packed integer reproduces.
/// Equality follows the ordering, so `1.2` and `1.2.0.0` are equal.
#[derive(Debug, Clone)]
pub struct VersionKey {
    /// Normally just 0, but you can increment it if you switched the versioning scheme.
    epoch: u64,
    /// The release segments exactly as given, e.g. `[1, 2]` for `1.2`.
    release: Vec<u64>,
    pre: Option<Prerelease>,
    /// Post releases are preferred over the plain release and over lower post releases.
    post: Option<u64>,
    dev: Option<u64>,
}

impl VersionKey {
    /// Create a version that is just a release, such as `3.8`.
    pub fn new<I, R>(release_numbers: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Borrow<u64>,
    {
        Self {
            epoch: 0,
            release: release_numbers.into_iter().map(|r| *r.borrow()).collect(),
            pre: None,
            post: None,
            dev: None,
        }
    }

    #[must_use]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub fn with_pre(mut self, pre: Option<Prerelease>) -> Self {
        self.pre = pre;
        self
    }

    #[must_use]
    pub fn with_post(mut self, post: Option<u64>) -> Self {
        self.post = post;
        self
    }

    #[must_use]
    pub fn with_dev(mut self, dev: Option<u64>) -> Self {
        self.dev = dev;
        self
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release segments as they were given.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The first release segment, or 0 if absent.
    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    /// The second release segment, or 0 if absent.
    pub fn minor(&self) -> u64 {
        self.segment(1)
    }

    /// The third release segment, or 0 if absent.
    pub fn patch(&self) -> u64 {
        self.segment(2)
    }

    /// The fourth release segment, or 0 if absent.
    pub fn extra(&self) -> u64 {
        self.segment(3)
    }

    fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or_default()
    }

    pub fn pre(&self) -> Option<Prerelease> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The form the decoder produces: the release padded to three segments, with zero segments
    /// beyond the third removed.
    ///
    /// `1.2` becomes `1.2.0` and `1.0.0.0.0` becomes `1.0.0`, while `1.2.3.4` is unchanged.
    #[must_use]
    pub fn canonicalize(&self) -> Self {
        let mut release = self.release.clone();
        release.resize(max(release.len(), 3), 0);
        while release.len() > 3 && release.last() == Some(&0) {
            release.pop();
        }
        Self {
            release,
            ..self.clone()
        }
    }
}

/// Shows the normalized version
impl Display for VersionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release = self
            .release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(".");
        // A key built without release segments has the precedence of `0`.
        if release.is_empty() {
            write!(f, "0")?;
        } else {
            write!(f, "{release}")?;
        }
        if let Some(pre) = self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionKey {
    type Err = ParseError;

    /// Parses a version such as `1.19`, `1.0a1`, `1.0.post2` or `1!2012.2`.
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        crate::parse::parse(version)
    }
}

/// Compare the release parts of two versions, e.g. `4.3.1` > `4.2`, `1.1.0` == `1.1` and
/// `1.16` < `1.19`
pub(crate) fn compare_release(this: &[u64], other: &[u64]) -> Ordering {
    // "When comparing release segments with different numbers of components, the shorter segment
    // is padded out with additional zeros as necessary"
    let len = max(this.len(), other.len());
    this.iter()
        .chain(iter::repeat(&0))
        .zip(other.iter().chain(iter::repeat(&0)))
        .take(len)
        .map(|(this, other)| this.cmp(other))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Compare the parts attached after the release, given equal release
///
/// The order of pre/post-releases is:
/// .devN, aN, bN, rcN, <no suffix (final)>, .postN
/// but you can also have dev/post releases on pre-releases and dev releases on post releases, so
/// we make a four stage ordering:
/// ({dev: 0, a: 1, b: 2, rc: 3, (): 4, post: 5}, <preN>, <postN or None as smallest>, <devN or Max
/// as largest>)
///
/// For post, any number is better than none (so None defaults to None<0), but for dev, no number
/// is better (so None default to the maximum). A dev release only lands in the first tier if it
/// has neither pre nor post release.
fn sortable_tuple(version: &VersionKey) -> (u64, u64, Option<u64>, u64) {
    match (version.pre, version.post, version.dev) {
        // dev release
        (None, None, Some(n)) => (0, 0, None, n),
        // alpha, beta or release candidate
        (Some(Prerelease { kind, number }), post, dev) => {
            let tier = match kind {
                PrereleaseKind::Alpha => 1,
                PrereleaseKind::Beta => 2,
                PrereleaseKind::Rc => 3,
            };
            (tier, number, post, dev.unwrap_or(u64::MAX))
        }
        // final release
        (None, None, None) => (4, 0, None, 0),
        // post release
        (None, Some(post), dev) => (5, 0, Some(post), dev.unwrap_or(u64::MAX)),
    }
}

impl PartialEq<Self> for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl Hash for VersionKey {
    /// Custom implementation to ignoring trailing zero because `PartialEq` zero pads
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        let significant = self
            .release
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |last| last + 1);
        self.release[..significant].hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
    }
}

impl PartialOrd<Self> for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    /// 1.0.dev456 < 1.0a1 < 1.0a2.dev456 < 1.0a12.dev456 < 1.0a12 < 1.0b1.dev456 < 1.0b2
    /// < 1.0b2.post345.dev456 < 1.0b2.post345 < 1.0c1.dev456 < 1.0c1 < 1.0rc2 < 1.0c3
    /// < 1.0 < 1.0.post456.dev34 < 1.0.post456
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| sortable_tuple(self).cmp(&sortable_tuple(other)))
    }
}

/// <https://github.com/serde-rs/serde/issues/1316#issue-332908452>
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// <https://github.com/serde-rs/serde/issues/1316#issue-332908452>
#[cfg(feature = "serde")]
impl serde::Serialize for VersionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
