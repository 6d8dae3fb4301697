//! Comparison specifiers such as `>=1.16, <2.0`, and their translation into ranges over packed
//! integers.
//!
//! A storage layer holding [`PackedVersion`]s can answer a specifier with native integer range
//! queries over the bounds of [`VersionSpecifiers::to_ranges`]. Specifiers compare by plain
//! precedence: unlike PEP 440 specifiers, `<2.0` includes `2.0a1`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;
use version_ranges::Ranges;

use crate::{OverflowError, PackedVersion, ParseError, VersionKey};

/// One of `==` `!=` `<` `<=` `>` `>=`
#[derive(Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum Operator {
    /// `== 1.2.3`
    Equal,
    /// `!= 1.2.3`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
}

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s {
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanEqual,
            other => {
                return Err(OperatorParseError {
                    got: other.to_string(),
                });
            }
        };
        Ok(operator)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        };
        write!(f, "{operator}")
    }
}

/// An error that occurs when parsing an invalid version specifier operator.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("No such comparison operator `{got}`, must be one of == != <= >= < >")]
pub struct OperatorParseError {
    pub(crate) got: String,
}

/// A version with a comparison operator, such as `>= 1.19`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VersionSpecifier {
    operator: Operator,
    version: VersionKey,
}

impl VersionSpecifier {
    pub fn new(operator: Operator, version: VersionKey) -> Self {
        Self { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &VersionKey {
        &self.version
    }

    /// Whether the given version satisfies this specifier, by precedence.
    pub fn contains(&self, version: &VersionKey) -> bool {
        match self.operator {
            Operator::Equal => *version == self.version,
            Operator::NotEqual => *version != self.version,
            Operator::LessThan => *version < self.version,
            Operator::LessThanEqual => *version <= self.version,
            Operator::GreaterThan => *version > self.version,
            Operator::GreaterThanEqual => *version >= self.version,
        }
    }

    /// The packed integers satisfying this specifier.
    ///
    /// Fails if the specifier's own version can't be packed.
    pub fn to_ranges(&self) -> Result<Ranges<PackedVersion>, OverflowError> {
        let packed = PackedVersion::pack(&self.version)?;
        Ok(match self.operator {
            Operator::Equal => Ranges::singleton(packed),
            Operator::NotEqual => Ranges::singleton(packed).complement(),
            Operator::LessThan => Ranges::strictly_lower_than(packed),
            Operator::LessThanEqual => Ranges::lower_than(packed),
            Operator::GreaterThan => Ranges::strictly_higher_than(packed),
            Operator::GreaterThanEqual => Ranges::higher_than(packed),
        })
    }
}

impl FromStr for VersionSpecifier {
    type Err = VersionSpecifierParseError;

    /// Parses a specifier such as `>= 1.19`, `!=1.1.post1` or `<=1!2012.2`
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut s = unscanny::Scanner::new(spec);
        s.eat_while(|c: char| c.is_whitespace());
        let operator = s.eat_while(['=', '!', '~', '<', '>']);
        if operator.is_empty() {
            return Err(ParseErrorKind::MissingOperator.into());
        }
        let operator = Operator::from_str(operator).map_err(ParseErrorKind::InvalidOperator)?;
        s.eat_while(|c: char| c.is_whitespace());
        let version = s.eat_while(|c: char| !c.is_whitespace());
        if version.is_empty() {
            return Err(ParseErrorKind::MissingVersion.into());
        }
        let version = VersionKey::from_str(version).map_err(ParseErrorKind::InvalidVersion)?;
        s.eat_while(|c: char| c.is_whitespace());
        if !s.done() {
            return Err(ParseErrorKind::InvalidTrailing(s.after().to_string()).into());
        }
        Ok(Self { operator, version })
    }
}

impl Display for VersionSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// An error that can occur when parsing a version specifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionSpecifierParseError {
    // We box to shrink the error type's size. This in turn keeps Result<T, E>
    // smaller and should lead to overall better codegen.
    kind: Box<ParseErrorKind>,
}

impl std::error::Error for VersionSpecifierParseError {}

impl Display for VersionSpecifierParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self.kind {
            ParseErrorKind::InvalidOperator(ref err) => err.fmt(f),
            ParseErrorKind::InvalidVersion(ref err) => err.fmt(f),
            ParseErrorKind::MissingOperator => {
                write!(f, "Unexpected end of version specifier, expected operator")
            }
            ParseErrorKind::MissingVersion => {
                write!(f, "Unexpected end of version specifier, expected version")
            }
            ParseErrorKind::InvalidTrailing(ref trail) => {
                write!(f, "Trailing `{trail}` is not allowed")
            }
        }
    }
}

/// The specific kind of error that can occur when parsing a version specifier from a string.
#[derive(Clone, Debug, Eq, PartialEq)]
enum ParseErrorKind {
    InvalidOperator(OperatorParseError),
    InvalidVersion(ParseError),
    MissingOperator,
    MissingVersion,
    InvalidTrailing(String),
}

impl From<ParseErrorKind> for VersionSpecifierParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

/// Comma-separated specifiers that must all hold, such as `>=1.16, <2.0, !=1.18`.
///
/// An empty string means no constraint.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct VersionSpecifiers(Vec<VersionSpecifier>);

impl VersionSpecifiers {
    pub fn iter(&self) -> std::slice::Iter<'_, VersionSpecifier> {
        self.0.iter()
    }

    /// Whether the version satisfies every specifier.
    pub fn contains(&self, version: &VersionKey) -> bool {
        self.iter().all(|specifier| specifier.contains(version))
    }

    /// The intersection of the ranges of all specifiers.
    pub fn to_ranges(&self) -> Result<Ranges<PackedVersion>, OverflowError> {
        let mut range = Ranges::full();
        for specifier in self {
            range = range.intersection(&specifier.to_ranges()?);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("Translated `{self}` into {range}");
        Ok(range)
    }
}

impl FromIterator<VersionSpecifier> for VersionSpecifiers {
    fn from_iter<T: IntoIterator<Item = VersionSpecifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VersionSpecifiers {
    type Item = &'a VersionSpecifier;
    type IntoIter = std::slice::Iter<'a, VersionSpecifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for VersionSpecifiers {
    type Err = VersionSpecifiersParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(|specifier| {
                VersionSpecifier::from_str(specifier).map_err(|err| VersionSpecifiersParseError {
                    specifier: specifier.trim().to_string(),
                    err,
                })
            })
            .collect()
    }
}

impl Display for VersionSpecifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, version_specifier) in self.0.iter().enumerate() {
            // Separate version specifiers by comma, but we need one comma less than there are
            // specifiers
            if idx == 0 {
                write!(f, "{version_specifier}")?;
            } else {
                write!(f, ", {version_specifier}")?;
            }
        }
        Ok(())
    }
}

/// An error for one of the comma-separated parts of [`VersionSpecifiers`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("Failed to parse version specifier `{specifier}`")]
pub struct VersionSpecifiersParseError {
    specifier: String,
    #[source]
    err: VersionSpecifierParseError,
}

#[cfg(test)]
mod tests {
    use std::ops::Bound;
    use std::str::FromStr;

    use insta::assert_snapshot;

    use super::*;

    fn packed(version: &str) -> PackedVersion {
        PackedVersion::from_str(version).unwrap()
    }

    #[test]
    fn operators() {
        for operator in ["==", "!=", "<", "<=", ">", ">="] {
            assert_eq!(Operator::from_str(operator).unwrap().to_string(), operator);
        }
        assert_snapshot!(
            Operator::from_str("~=").unwrap_err(),
            @"No such comparison operator `~=`, must be one of == != <= >= < >"
        );
    }

    #[test]
    fn parse_specifier() {
        let specifier = VersionSpecifier::from_str("  >= 1.0A1  ").unwrap();
        assert_eq!(specifier.operator(), Operator::GreaterThanEqual);
        assert_eq!(specifier.to_string(), ">=1.0a1");
    }

    #[test]
    fn specifier_errors() {
        assert_snapshot!(
            VersionSpecifier::from_str("1.0").unwrap_err(),
            @"Unexpected end of version specifier, expected operator"
        );
        assert_snapshot!(
            VersionSpecifier::from_str(">=").unwrap_err(),
            @"Unexpected end of version specifier, expected version"
        );
        assert_snapshot!(
            VersionSpecifier::from_str(">= 1.0 extra").unwrap_err(),
            @"Trailing `extra` is not allowed"
        );
        assert_snapshot!(
            VersionSpecifier::from_str("== 1.0+local").unwrap_err(),
            @"Version `1.0+local` has a local version label `+local`, which can't be encoded"
        );
        let err = VersionSpecifiers::from_str(">=1.0, <<2").unwrap_err();
        assert_snapshot!(err, @"Failed to parse version specifier `<<2`");
        assert_snapshot!(
            std::error::Error::source(&err).unwrap(),
            @"No such comparison operator `<<`, must be one of == != <= >= < >"
        );
    }

    #[test]
    fn empty_specifiers_are_unconstrained() {
        let specifiers = VersionSpecifiers::from_str(" ").unwrap();
        assert_eq!(specifiers.to_ranges().unwrap(), Ranges::full());
        assert!(specifiers.contains(&VersionKey::from_str("1.0").unwrap()));
    }

    #[test]
    fn single_interval() {
        let specifiers = VersionSpecifiers::from_str(">=1.16, <2.0").unwrap();
        assert_eq!(specifiers.to_string(), ">=1.16, <2.0");
        let ranges = specifiers.to_ranges().unwrap();
        let bounds: Vec<_> = ranges.iter().collect();
        assert_eq!(
            bounds,
            [(
                &Bound::Included(packed("1.16")),
                &Bound::Excluded(packed("2.0"))
            )]
        );
        assert!(ranges.contains(&packed("1.19")));
        assert!(ranges.contains(&packed("2.0a1")));
        assert!(!ranges.contains(&packed("2.0")));
        assert!(!ranges.contains(&packed("1.16.dev0")));
        assert_snapshot!(packed("1.16"), @"0x000110000000ff0f");
        let rendered = ranges.to_string();
        assert!(rendered.contains(&packed("1.16").to_string()), "{rendered}");
        assert!(rendered.contains(&packed("2.0").to_string()), "{rendered}");
    }

    #[test]
    fn not_equal_splits_the_range() {
        let ranges = VersionSpecifiers::from_str("!=1.5").unwrap().to_ranges().unwrap();
        assert_eq!(ranges.iter().count(), 2);
        assert!(!ranges.contains(&packed("1.5.0.0")));
        assert!(ranges.contains(&packed("1.5.post0")));
        assert!(ranges.contains(&packed("1.5rc1")));
    }

    #[test]
    fn unpackable_bound() {
        let err = VersionSpecifiers::from_str("<4096").unwrap().to_ranges().unwrap_err();
        assert_snapshot!(err, @"Major release number `4096` exceeds the maximum of 4095");
    }

    /// The range over packed integers agrees with comparing the versions.
    #[test]
    fn ranges_agree_with_precedence() {
        let versions = [
            "0.9", "1.0.dev3", "1.0a1", "1.0a1.post1", "1.0b2.dev1", "1.0rc1", "1.0", "1.0.0.1",
            "1.0.post1.dev2", "1.0.post1", "1.1", "1!0.1",
        ];
        let specifiers = [
            "==1.0", "!=1.0", "<1.0", "<=1.0a1.post1", ">1.0rc1", ">=1.0.dev3", ">=1.0a1, <1.1",
            "!=1.0, !=1.1, >0.9",
        ];
        for specifiers in specifiers {
            let specifiers = VersionSpecifiers::from_str(specifiers).unwrap();
            let ranges = specifiers.to_ranges().unwrap();
            for version in versions {
                let key = VersionKey::from_str(version).unwrap();
                assert_eq!(
                    ranges.contains(&packed(version)),
                    specifiers.contains(&key),
                    "{version} in {specifiers}"
                );
            }
        }
    }
}
