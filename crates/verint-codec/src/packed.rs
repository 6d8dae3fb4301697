//! The 64-bit layout, most significant field first:
//!
//! ```text
//! | epoch:4 | major:12 | minor:8 | patch:16 | extra:8 | pre:8 | post:4 | dev:4 |
//! ```
//!
//! `pre` is a two-bit symbol (`a` = 01, `b` = 10, `rc` = 11) followed by a six-bit number, or one
//! of two markers: [`PRE_NONE`] (all ones) sorts above every pre-release and is used whenever
//! there is no pre-release, except for a dev release with neither pre nor post release, which
//! uses [`PRE_DEV_ONLY`] (all zeros) so that it sorts below every pre-release. `post` is a
//! presence flag followed by a three-bit number. `dev` is the number, or [`DEV_NONE`] when
//! absent so that `1.0a1.dev0 < 1.0a1`.
//!
//! With the fields in precedence order and every marker placed where its precedence is, plain
//! `u64` comparison is version comparison.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{
    DecodeError, DecodeErrorKind, EncodeError, OverflowError, Prerelease, PrereleaseKind,
    VersionKey,
};

const EPOCH_SHIFT: u32 = 60;
const MAJOR_SHIFT: u32 = 48;
const MINOR_SHIFT: u32 = 40;
const PATCH_SHIFT: u32 = 24;
const EXTRA_SHIFT: u32 = 16;
const PRE_SHIFT: u32 = 8;
const POST_SHIFT: u32 = 4;
const DEV_SHIFT: u32 = 0;

/// The pre-release byte of a version without pre-release, unless [`PRE_DEV_ONLY`] applies.
const PRE_NONE: u64 = 0xFF;
/// The pre-release byte of a dev release without pre- and post-release.
const PRE_DEV_ONLY: u64 = 0x00;
const PRE_KIND_SHIFT: u32 = 6;
const PRE_NUMBER_MASK: u64 = 0x3F;
const POST_FLAG: u64 = 0b1000;
const POST_NUMBER_MASK: u64 = 0b0111;
const DEV_NONE: u64 = 0xF;

const SIGN_BIT: u64 = 1 << 63;

/// A version packed into a `u64` whose ordering is the version precedence.
///
/// Obtain one with [`PackedVersion::pack`], with [`str::parse`], or, for integers read back from
/// storage, with [`PackedVersion::from_u64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PackedVersion(u64);

impl PackedVersion {
    /// The packed form of `0.0.0.0.dev0`, the lowest version.
    pub const MIN: Self = Self(0);
    /// The packed form of `15!4095.255.65535.255.post7`, the highest version.
    pub const MAX: Self = Self(u64::MAX);

    /// Validate and pack a version.
    pub fn pack(version: &VersionKey) -> Result<Self, OverflowError> {
        version.check()?;
        let release = (version.epoch() << EPOCH_SHIFT)
            | (version.major() << MAJOR_SHIFT)
            | (version.minor() << MINOR_SHIFT)
            | (version.patch() << PATCH_SHIFT)
            | (version.extra() << EXTRA_SHIFT);
        Ok(Self(release | suffix(version)))
    }

    /// Reconstruct the version from its packed form.
    ///
    /// The release always has three segments, plus the fourth if it is non-zero, i.e. the result
    /// is [canonical](VersionKey::canonicalize). Every integer returned by [`PackedVersion::pack`]
    /// decodes; other integers may fail with a [`DecodeError`].
    pub fn unpack(self) -> Result<VersionKey, DecodeError> {
        let field = |shift: u32, width: u32| (self.0 >> shift) & ((1 << width) - 1);
        let error = |kind| DecodeError {
            value: self.0,
            kind,
        };

        let pre_byte = field(PRE_SHIFT, 8);
        let post_nibble = field(POST_SHIFT, 4);
        let dev_nibble = field(DEV_SHIFT, 4);

        let post = if post_nibble & POST_FLAG != 0 {
            Some(post_nibble & POST_NUMBER_MASK)
        } else if post_nibble != 0 {
            return Err(error(DecodeErrorKind::PostNumberWithoutFlag));
        } else {
            None
        };
        let dev = (dev_nibble != DEV_NONE).then_some(dev_nibble);

        let pre = match pre_byte {
            PRE_DEV_ONLY => {
                if dev.is_none() {
                    return Err(error(DecodeErrorKind::DevMarkerWithoutDev));
                }
                if post.is_some() {
                    return Err(error(DecodeErrorKind::DevMarkerWithPost));
                }
                None
            }
            PRE_NONE => {
                if post.is_none() && dev.is_some() {
                    return Err(error(DecodeErrorKind::UnmarkedDevRelease));
                }
                None
            }
            byte => {
                let kind = PrereleaseKind::from_code(byte >> PRE_KIND_SHIFT)
                    .ok_or_else(|| error(DecodeErrorKind::MissingPrereleaseSymbol))?;
                Some(Prerelease {
                    kind,
                    number: byte & PRE_NUMBER_MASK,
                })
            }
        };

        let mut release = vec![
            field(MAJOR_SHIFT, 12),
            field(MINOR_SHIFT, 8),
            field(PATCH_SHIFT, 16),
        ];
        let extra = field(EXTRA_SHIFT, 8);
        if extra != 0 {
            release.push(extra);
        }

        Ok(VersionKey::new(release)
            .with_epoch(field(EPOCH_SHIFT, 4))
            .with_pre(pre)
            .with_post(post)
            .with_dev(dev))
    }

    /// Wrap an integer that was previously produced by [`PackedVersion::pack`], e.g. one read
    /// back from storage. Nothing is checked until [`PackedVersion::unpack`].
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The value for a signed 64-bit storage cell, such as an SQL `BIGINT`.
    ///
    /// Flipping the top bit maps `0..=u64::MAX` onto `i64::MIN..=i64::MAX` monotonically, so
    /// signed comparison of the cells is still version comparison.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_ordered_i64(self) -> i64 {
        (self.0 ^ SIGN_BIT) as i64
    }

    /// The inverse of [`PackedVersion::to_ordered_i64`].
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_ordered_i64(value: i64) -> Self {
        Self((value as u64) ^ SIGN_BIT)
    }
}

/// The low 16 bits: pre byte, post nibble and dev nibble.
fn suffix(version: &VersionKey) -> u64 {
    let pre = match (version.pre(), version.post(), version.dev()) {
        (Some(Prerelease { kind, number }), _, _) => (kind.code() << PRE_KIND_SHIFT) | number,
        // Below every pre-release: `1.0.dev1 < 1.0a0`.
        (None, None, Some(_)) => PRE_DEV_ONLY,
        (None, _, _) => PRE_NONE,
    };
    let post = version.post().map_or(0, |post| POST_FLAG | post);
    let dev = version.dev().unwrap_or(DEV_NONE);
    (pre << PRE_SHIFT) | (post << POST_SHIFT) | (dev << DEV_SHIFT)
}

/// The packed integer as fixed-width hex, so the fields line up: `0x000110000000ff0f` is `1.16`.
impl Display for PackedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<PackedVersion> for u64 {
    fn from(packed: PackedVersion) -> Self {
        packed.0
    }
}

impl TryFrom<&VersionKey> for PackedVersion {
    type Error = OverflowError;

    fn try_from(version: &VersionKey) -> Result<Self, Self::Error> {
        Self::pack(version)
    }
}

impl TryFrom<PackedVersion> for VersionKey {
    type Error = DecodeError;

    fn try_from(packed: PackedVersion) -> Result<Self, Self::Error> {
        packed.unpack()
    }
}

impl FromStr for PackedVersion {
    type Err = EncodeError;

    /// Parse, validate and pack in one step.
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let key = VersionKey::from_str(version)?;
        Ok(Self::pack(&key)?)
    }
}

#[cfg(test)]
mod tests;
