//! Order-preserving packing of versions into 64-bit integers.
//!
//! A version such as `1!2.3.4rc1.post2.dev3` is parsed into a [`VersionKey`], checked against the
//! field widths of the packed layout and packed into a [`PackedVersion`], a `u64` whose numeric
//! order is the version precedence. Databases and key-value stores can then sort, index and
//! range-scan versions as plain integers.
//!
//! ```rust
//! use std::str::FromStr;
//! use verint_codec::{PackedVersion, VersionSpecifiers};
//!
//! let packed = PackedVersion::from_str("1.19").unwrap();
//! assert!(packed < PackedVersion::from_str("1.19.post1").unwrap());
//!
//! let ranges = VersionSpecifiers::from_str(">=1.16, <2.0").unwrap().to_ranges().unwrap();
//! assert!(ranges.contains(&packed));
//! ```
//!
//! Local version labels (`1.0+ubuntu1`) have no place in the layout and are rejected.

use std::str::FromStr;

pub use crate::error::{
    DecodeError, DecodeErrorKind, EncodeError, Field, LocalVersionRejected, OverflowError,
    ParseError, SyntaxError, SyntaxErrorKind,
};
pub use crate::packed::PackedVersion;
pub use crate::specifier::{
    Operator, OperatorParseError, VersionSpecifier, VersionSpecifierParseError,
    VersionSpecifiers, VersionSpecifiersParseError,
};
pub use crate::version::{Prerelease, PrereleaseKind, VersionKey};

mod error;
mod packed;
mod parse;
mod specifier;
mod validate;
mod version;

/// Parse, validate and pack a version string.
///
/// Equivalent to `PackedVersion::from_str(version).map(u64::from)`.
pub fn encode(version: &str) -> Result<u64, EncodeError> {
    let key = VersionKey::from_str(version)?;
    let packed = PackedVersion::pack(&key).inspect_err(|_err| {
        #[cfg(feature = "tracing")]
        tracing::debug!("Can't pack `{version}`: {_err}");
    })?;
    Ok(packed.as_u64())
}

/// Decode an integer produced by [`encode`] into its canonical version string.
///
/// The release is always shown with at least three segments, so `encode("1.2")` decodes to
/// `1.2.0`.
pub fn decode(packed: u64) -> Result<String, DecodeError> {
    let version = PackedVersion::from_u64(packed).unpack()?;
    Ok(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::EncodeError;

    #[test]
    fn encode_decode() {
        let packed = encode("1.19rc2").unwrap();
        assert_eq!(packed, 0x0001_1300_0000_C20F);
        assert_eq!(decode(packed).unwrap(), "1.19.0rc2");
        assert_eq!(decode(encode("1.0.0.0.0").unwrap()).unwrap(), "1.0.0");
    }

    #[test]
    fn encode_errors() {
        assert!(matches!(encode(""), Err(EncodeError::Syntax(_))));
        assert!(matches!(encode("1.0+abc"), Err(EncodeError::LocalVersion(_))));
        assert!(matches!(encode("1.0a64"), Err(EncodeError::Overflow(_))));
    }

    #[test]
    fn decode_rejects_foreign_integers() {
        assert!(decode(0xFF00).is_err());
    }
}
