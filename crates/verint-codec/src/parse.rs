//! A hand-written parser for the accepted version grammar:
//!
//! ```text
//! [v] [N!] N ("." N)* [{a|b|rc} [N]] [".post" [N]] [".dev" [N]] ["+" local]
//! ```
//!
//! plus the alternative spellings that PEP 440 normalizes onto it (`alpha`, `beta`, `c`, `pre`,
//! `preview`, `rev`, `r`, the implicit post release `1.0-1`, and `-`/`_`/`.` separators).

use unscanny::Scanner;

use crate::{
    LocalVersionRejected, ParseError, Prerelease, PrereleaseKind, SyntaxError, SyntaxErrorKind,
    VersionKey,
};

/// Separators that may appear before and inside the pre, post and dev qualifiers.
const SEPARATORS: [char; 3] = ['.', '-', '_'];

pub(crate) fn parse(input: &str) -> Result<VersionKey, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SyntaxError::new(input, SyntaxErrorKind::Empty).into());
    }
    // Lowercasing ASCII doesn't move any byte offsets, so positions in `lowered` are valid
    // positions in `trimmed` as well.
    let lowered = trimmed.to_ascii_lowercase();
    let parser = Parser {
        input,
        source: trimmed,
        s: Scanner::new(&lowered),
    };
    parser.version()
}

struct Parser<'a> {
    /// The untouched input, for error messages.
    input: &'a str,
    /// The trimmed input in its original case, for the offending substrings.
    source: &'a str,
    s: Scanner<'a>,
}

impl Parser<'_> {
    fn version(mut self) -> Result<VersionKey, ParseError> {
        self.s.eat_if('v');

        let first = self.required_number()?;
        let (epoch, major) = if self.s.eat_if('!') {
            (first, self.required_number()?)
        } else {
            (0, first)
        };

        let mut release = vec![major];
        while self.at_release_segment() {
            self.s.eat_if('.');
            release.push(self.required_number()?);
        }

        let pre = self.pre();
        let post = self.post();
        let dev = self.dev();

        if self.s.eat_if('+') {
            return Err(self.local());
        }
        if !self.s.done() {
            return Err(self.unexpected().into());
        }

        Ok(VersionKey::new(release)
            .with_epoch(epoch)
            .with_pre(pre)
            .with_post(post)
            .with_dev(dev))
    }

    /// Whether the scanner is at `.` followed by a digit, i.e. another release segment rather
    /// than a `.post` or `.dev` qualifier.
    fn at_release_segment(&self) -> bool {
        self.s
            .after()
            .strip_prefix('.')
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    }

    /// `[sep] (a|alpha|b|beta|c|rc|pre|preview) [sep] [N]`
    fn pre(&mut self) -> Option<Prerelease> {
        let start = self.s.cursor();
        self.s.eat_if(SEPARATORS);
        // Longer spellings first, so `alpha` isn't read as `a` followed by garbage.
        let kind = if self.s.eat_if("alpha") || self.s.eat_if('a') {
            PrereleaseKind::Alpha
        } else if self.s.eat_if("beta") || self.s.eat_if('b') {
            PrereleaseKind::Beta
        } else if self.s.eat_if("preview")
            || self.s.eat_if("pre")
            || self.s.eat_if("rc")
            || self.s.eat_if('c')
        {
            PrereleaseKind::Rc
        } else {
            self.s.jump(start);
            return None;
        };
        // "If the pre-release number is omitted, it is implicitly 0"
        let number = self.qualifier_number().unwrap_or_default();
        Some(Prerelease { kind, number })
    }

    /// `-N` or `[sep] (post|rev|r) [sep] [N]`
    fn post(&mut self) -> Option<u64> {
        let start = self.s.cursor();
        // `1.0-1` is an implicit post release.
        if self.s.eat_if('-') {
            if let Some(number) = self.number() {
                return Some(number);
            }
            self.s.jump(start);
        }
        self.s.eat_if(SEPARATORS);
        if self.s.eat_if("post") || self.s.eat_if("rev") || self.s.eat_if('r') {
            return Some(self.qualifier_number().unwrap_or_default());
        }
        self.s.jump(start);
        None
    }

    /// `[sep] dev [sep] [N]`
    fn dev(&mut self) -> Option<u64> {
        let start = self.s.cursor();
        self.s.eat_if(SEPARATORS);
        if self.s.eat_if("dev") {
            return Some(self.qualifier_number().unwrap_or_default());
        }
        self.s.jump(start);
        None
    }

    /// The optional number after a qualifier name, which may be preceded by a separator.
    ///
    /// A separator without a number after it is left unconsumed, it may start the next
    /// qualifier.
    fn qualifier_number(&mut self) -> Option<u64> {
        let start = self.s.cursor();
        self.s.eat_if(SEPARATORS);
        let number = self.number();
        if number.is_none() {
            self.s.jump(start);
        }
        number
    }

    fn required_number(&mut self) -> Result<u64, SyntaxError> {
        match self.number() {
            Some(number) => Ok(number),
            None if self.s.done() => Err(SyntaxError::new(
                self.input,
                SyntaxErrorKind::UnexpectedEnd,
            )),
            None => Err(self.unexpected()),
        }
    }

    /// A digit run that doesn't fit in 64 bits saturates to [`u64::MAX`], which exceeds every
    /// field of the packed layout and is reported by the validator.
    fn number(&mut self) -> Option<u64> {
        let digits = self.s.eat_while(|c: char| c.is_ascii_digit());
        if digits.is_empty() {
            return None;
        }
        // Leading zeros are fine: `1.01` is `1.1`.
        Some(digits.parse::<u64>().unwrap_or_else(|_| {
            #[cfg(feature = "tracing")]
            tracing::trace!("Saturating `{digits}` in `{}`", self.input);
            u64::MAX
        }))
    }

    /// Called after the `+`. A well-formed label is a [`LocalVersionRejected`], anything else
    /// is a syntax error.
    fn local(&self) -> ParseError {
        let local = &self.source[self.s.cursor()..];
        let well_formed = local.split(SEPARATORS).all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
        });
        if well_formed {
            #[cfg(feature = "tracing")]
            tracing::trace!("Found local version label `+{local}` in `{}`", self.input);
            LocalVersionRejected {
                input: self.input.to_string(),
                local: local.to_string(),
            }
            .into()
        } else {
            SyntaxError::new(
                self.input,
                SyntaxErrorKind::InvalidLocal {
                    local: local.to_string(),
                },
            )
            .into()
        }
    }

    fn unexpected(&self) -> SyntaxError {
        SyntaxError::new(
            self.input,
            SyntaxErrorKind::Unexpected {
                remainder: self.source[self.s.cursor()..].to_string(),
            },
        )
    }
}
