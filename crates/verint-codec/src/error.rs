use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::PrereleaseKind;

/// A version string that doesn't match the accepted grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxError {
    input: String,
    // We box to shrink the error type's size. This in turn keeps Result<T, E>
    // smaller and should lead to overall better codegen.
    kind: Box<SyntaxErrorKind>,
}

/// The specific reason a version string was rejected by the parser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxErrorKind {
    /// The input was empty or only whitespace.
    Empty,
    /// Parsing stopped at the given remainder of the input.
    Unexpected {
        /// The unparsed rest of the input, starting at the offending character.
        remainder: String,
    },
    /// The input ended where a number was required, e.g. `1!` or `1.`.
    UnexpectedEnd,
    /// A `+` was followed by something that isn't a local version label.
    InvalidLocal {
        /// Everything after the `+`.
        local: String,
    },
}

impl SyntaxError {
    pub(crate) fn new(input: &str, kind: SyntaxErrorKind) -> Self {
        Self {
            input: input.to_string(),
            kind: Box::new(kind),
        }
    }

    /// The version string as it was passed in.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Why the input was rejected.
    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// The part of the input that caused the rejection.
    pub fn offending(&self) -> &str {
        match &*self.kind {
            SyntaxErrorKind::Empty | SyntaxErrorKind::UnexpectedEnd => "",
            SyntaxErrorKind::Unexpected { remainder } => remainder,
            SyntaxErrorKind::InvalidLocal { local } => local,
        }
    }
}

impl std::error::Error for SyntaxError {}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let input = &self.input;
        match &*self.kind {
            SyntaxErrorKind::Empty => write!(f, "Version string is empty"),
            SyntaxErrorKind::Unexpected { remainder } => write!(
                f,
                "Version `{input}` doesn't match the version grammar at `{remainder}`"
            ),
            SyntaxErrorKind::UnexpectedEnd => {
                write!(f, "Version `{input}` ends where a number was expected")
            }
            SyntaxErrorKind::InvalidLocal { local } => write!(
                f,
                "Version `{input}` has an invalid local version label: `+{local}`"
            ),
        }
    }
}

/// A syntactically valid version that carries a local version label (`+...`).
///
/// Local labels don't participate in precedence and have no place in the packed layout, so they
/// are rejected instead of being dropped.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("Version `{input}` has a local version label `+{local}`, which can't be encoded")]
pub struct LocalVersionRejected {
    /// The version string as it was passed in.
    pub input: String,
    /// The local label, without the leading `+`.
    pub local: String,
}

/// An error from [`VersionKey::from_str`](std::str::FromStr::from_str).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    LocalVersion(#[from] LocalVersionRejected),
}

/// A field of a [`VersionKey`](crate::VersionKey) with a bounded width in the packed layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Field {
    Epoch,
    Major,
    Minor,
    Patch,
    /// The fourth release segment.
    ExtraRelease,
    /// A release segment beyond the fourth, by 1-based position. These must be zero.
    ReleaseSegment(usize),
    PreNumber(PrereleaseKind),
    Post,
    Dev,
}

impl Field {
    /// The largest value the packed layout can hold for this field.
    pub const fn maximum(self) -> u64 {
        match self {
            Self::Epoch => 15,
            Self::Major => 4095,
            Self::Minor => 255,
            Self::Patch => 65535,
            Self::ExtraRelease => 255,
            Self::ReleaseSegment(_) => 0,
            // `rc63` would be all ones, which is the "no pre-release" byte.
            Self::PreNumber(PrereleaseKind::Rc) => 62,
            Self::PreNumber(PrereleaseKind::Alpha | PrereleaseKind::Beta) => 63,
            Self::Post => 7,
            // 15 means "no dev-release".
            Self::Dev => 14,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Epoch => write!(f, "Epoch"),
            Self::Major => write!(f, "Major release number"),
            Self::Minor => write!(f, "Minor release number"),
            Self::Patch => write!(f, "Patch release number"),
            Self::ExtraRelease => write!(f, "Fourth release segment"),
            Self::ReleaseSegment(position) => write!(f, "Release segment {position}"),
            Self::PreNumber(kind) => write!(f, "Pre-release number (`{kind}`)"),
            Self::Post => write!(f, "Post-release number"),
            Self::Dev => write!(f, "Dev-release number"),
        }
    }
}

/// A version whose field doesn't fit its share of the 64-bit word.
///
/// The codec never clamps or wraps; the whole version is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OverflowError {
    field: Field,
    value: u64,
}

impl OverflowError {
    pub(crate) fn new(field: Field, value: u64) -> Self {
        Self { field, value }
    }

    /// The field that didn't fit.
    pub fn field(&self) -> Field {
        self.field
    }

    /// The rejected value.
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl std::error::Error for OverflowError {}

impl Display for OverflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Digit runs beyond 64 bits are saturated by the parser.
        let too_large = self.value == u64::MAX;
        match self.field {
            Field::ReleaseSegment(_) if too_large => write!(
                f,
                "{} is too large, and release segments beyond the fourth must be zero",
                self.field
            ),
            Field::ReleaseSegment(_) => write!(
                f,
                "{} is `{}`, but release segments beyond the fourth must be zero",
                self.field, self.value
            ),
            field if too_large => write!(
                f,
                "{field} is too large, the maximum is {}",
                field.maximum()
            ),
            field => write!(
                f,
                "{field} `{}` exceeds the maximum of {}",
                self.value,
                field.maximum()
            ),
        }
    }
}

/// Any failure of the string-to-integer direction, see [`crate::encode`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    LocalVersion(#[from] LocalVersionRejected),
    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

impl From<ParseError> for EncodeError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax(err) => Self::Syntax(err),
            ParseError::LocalVersion(err) => Self::LocalVersion(err),
        }
    }
}

/// An integer that the packer never emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("`{value}` (`{value:#018x}`) is not a packed version: {kind}")]
pub struct DecodeError {
    pub(crate) value: u64,
    pub(crate) kind: DecodeErrorKind,
}

impl DecodeError {
    /// The integer that failed to decode.
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }
}

/// The inconsistency found in the suffix block of a [`DecodeError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum DecodeErrorKind {
    #[error("the pre-release byte has no symbol but a non-zero number")]
    MissingPrereleaseSymbol,
    #[error("the post-release number is set without the post-release flag")]
    PostNumberWithoutFlag,
    #[error("the dev-only marker is set but there is no dev-release number")]
    DevMarkerWithoutDev,
    #[error("the dev-only marker is set together with a post-release")]
    DevMarkerWithPost,
    #[error("a dev-release without pre- or post-release must use the dev-only marker")]
    UnmarkedDevRelease,
}
