use crate::{Field, OverflowError, VersionKey};

impl VersionKey {
    /// Check every field against its width in the packed layout.
    ///
    /// Returns the key unchanged, so validating twice is a no-op. Release segments beyond the
    /// fourth are accepted only if they are zero, since dropping them doesn't change the value.
    pub fn validate(self) -> Result<Self, OverflowError> {
        self.check()?;
        Ok(self)
    }

    pub(crate) fn check(&self) -> Result<(), OverflowError> {
        let fields = [
            (Field::Epoch, self.epoch()),
            (Field::Major, self.major()),
            (Field::Minor, self.minor()),
            (Field::Patch, self.patch()),
            (Field::ExtraRelease, self.extra()),
        ];
        for (field, value) in fields {
            within(field, value)?;
        }

        if let Some((index, segment)) = self
            .release()
            .iter()
            .enumerate()
            .skip(4)
            .find(|(_, segment)| **segment != 0)
        {
            return Err(OverflowError::new(
                Field::ReleaseSegment(index + 1),
                *segment,
            ));
        }

        if let Some(pre) = self.pre() {
            within(Field::PreNumber(pre.kind), pre.number)?;
        }
        if let Some(post) = self.post() {
            within(Field::Post, post)?;
        }
        if let Some(dev) = self.dev() {
            within(Field::Dev, dev)?;
        }
        Ok(())
    }
}

fn within(field: Field, value: u64) -> Result<(), OverflowError> {
    if value > field.maximum() {
        #[cfg(feature = "tracing")]
        tracing::debug!("{field} `{value}` doesn't fit in the packed layout");
        return Err(OverflowError::new(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use insta::assert_snapshot;

    use crate::{Field, OverflowError, PrereleaseKind, VersionKey};

    fn overflow(version: &str) -> OverflowError {
        VersionKey::from_str(version)
            .unwrap()
            .validate()
            .unwrap_err()
    }

    #[test]
    fn limits_are_inclusive() {
        let versions = [
            "15!4095.255.65535.255",
            "1.0a63",
            "1.0b63",
            "1.0rc62",
            "1.0.post7",
            "1.0.dev14",
            "1.0.0.0.0.0.0",
        ];
        for version in versions {
            let key = VersionKey::from_str(version).unwrap();
            assert_eq!(key.clone().validate(), Ok(key), "{version}");
        }
    }

    #[test]
    fn fields_over_budget() {
        let cases = [
            ("16!1.0", Field::Epoch, 16),
            ("4096.0", Field::Major, 4096),
            ("1.256", Field::Minor, 256),
            ("1.0.65536", Field::Patch, 65536),
            ("1.0.0.256", Field::ExtraRelease, 256),
            ("1.0.0.0.1", Field::ReleaseSegment(5), 1),
            ("1.0.0.0.0.0.3", Field::ReleaseSegment(7), 3),
            ("1.0a64", Field::PreNumber(PrereleaseKind::Alpha), 64),
            ("1.0b64", Field::PreNumber(PrereleaseKind::Beta), 64),
            ("1.0rc63", Field::PreNumber(PrereleaseKind::Rc), 63),
            ("1.0.post8", Field::Post, 8),
            ("1.0.dev15", Field::Dev, 15),
            ("1.0a1.dev15", Field::Dev, 15),
        ];
        for (version, field, value) in cases {
            let err = overflow(version);
            assert_eq!((err.field(), err.value()), (field, value), "{version}");
        }
    }

    /// The first field in layout order is reported.
    #[test]
    fn first_offending_field_wins() {
        let err = overflow("16!4096.256");
        assert_eq!(err.field(), Field::Epoch);
    }

    #[test]
    fn validate_is_idempotent() {
        let key = VersionKey::from_str("2!1.2.3.4rc5.dev6").unwrap();
        let once = key.clone().validate().unwrap();
        let twice = once.clone().validate().unwrap();
        assert_eq!(once, key);
        assert_eq!(twice.to_string(), key.to_string());
    }

    #[test]
    fn messages() {
        assert_snapshot!(overflow("4096.0"), @"Major release number `4096` exceeds the maximum of 4095");
        assert_snapshot!(
            overflow("1.0.0.0.1"),
            @"Release segment 5 is `1`, but release segments beyond the fourth must be zero"
        );
        assert_snapshot!(
            overflow("1.0rc63"),
            @"Pre-release number (`rc`) `63` exceeds the maximum of 62"
        );
        assert_snapshot!(overflow("1.0.dev15"), @"Dev-release number `15` exceeds the maximum of 14");
        assert_snapshot!(
            overflow("1.99999999999999999999"),
            @"Minor release number is too large, the maximum is 255"
        );
        assert_snapshot!(
            overflow("1.0.0.0.99999999999999999999"),
            @"Release segment 5 is too large, and release segments beyond the fourth must be zero"
        );
    }

    /// Digit runs beyond 64 bits are overflows of the field they were written in.
    #[test]
    fn huge_numbers_overflow() {
        let cases = [
            ("99999999999999999999!1.0", Field::Epoch),
            ("99999999999999999999.0", Field::Major),
            ("1.0.0.0.99999999999999999999", Field::ReleaseSegment(5)),
            ("1.0a99999999999999999999", Field::PreNumber(PrereleaseKind::Alpha)),
            ("1.0.post99999999999999999999", Field::Post),
            ("1.0-99999999999999999999", Field::Post),
            ("1.0.dev99999999999999999999", Field::Dev),
        ];
        for (version, field) in cases {
            let err = overflow(version);
            assert_eq!((err.field(), err.value()), (field, u64::MAX), "{version}");
        }
    }
}
