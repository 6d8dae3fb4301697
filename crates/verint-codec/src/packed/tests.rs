use std::str::FromStr;

use insta::assert_snapshot;

use crate::{DecodeErrorKind, EncodeError, Field, PackedVersion, VersionKey};

fn packed(version: &str) -> PackedVersion {
    PackedVersion::from_str(version).unwrap()
}

fn key(version: &str) -> VersionKey {
    VersionKey::from_str(version).unwrap()
}

#[test]
fn scenarios() {
    assert!(packed("5.2") > packed("4.9.12"));
    assert!(packed("1.1post0") > packed("1.1"));
    assert!(packed("1.1a3") < packed("1.1"));
    assert!(packed("1.2a3") > packed("1.1post0"));
    assert!(packed("1.1dev5") < packed("1.1"));
    assert!(packed("1.1dev5") < packed("1.1a5"));
    assert!(packed("1.1a5dev5") < packed("1.1a5"));
    assert!(packed("1!1.0") > packed("999.0"));
    assert_eq!(packed("1.0.0.0.0"), packed("1.0.0.0"));
    assert_eq!(packed("1.0"), packed("1"));
    assert_eq!(packed("v1.0-rc.1"), packed("1.0rc1"));
}

#[test]
fn encode_rejections() {
    assert!(matches!(
        PackedVersion::from_str("1.0.0.0.1"),
        Err(EncodeError::Overflow(err)) if err.field() == Field::ReleaseSegment(5)
    ));
    assert!(matches!(
        PackedVersion::from_str("1.0+build.5"),
        Err(EncodeError::LocalVersion(_))
    ));
    assert!(matches!(
        PackedVersion::from_str("4096"),
        Err(EncodeError::Overflow(err)) if err.field() == Field::Major
    ));
    assert!(matches!(
        PackedVersion::from_str("1.0-"),
        Err(EncodeError::Syntax(_))
    ));
    assert!(matches!(
        PackedVersion::from_str("1.0.0.0.99999999999999999999"),
        Err(EncodeError::Overflow(err)) if err.field() == Field::ReleaseSegment(5)
    ));
    assert!(matches!(
        PackedVersion::from_str("18446744073709551616.0"),
        Err(EncodeError::Overflow(err)) if err.field() == Field::Major
    ));
}

/// The ordering from the packaging test suite, scaled down to fit the field widths.
#[test]
fn packed_order_is_precedence() {
    let versions = [
        "0.0.0.dev0",
        "1.0.dev4",
        "1.0a1",
        "1.0a2.dev4",
        "1.0a12.dev4",
        "1.0a12",
        "1.0b1.dev4",
        "1.0b2",
        "1.0b2.post3.dev4",
        "1.0b2.post3",
        "1.0rc1.dev4",
        "1.0rc1",
        "1.0rc62",
        "1.0",
        "1.0.post0.dev0",
        "1.0.post4.dev3",
        "1.0.post4",
        "1.0.0.1.dev2",
        "1.0.0.1",
        "1.1.dev1",
        "1.1",
        "1.2.3",
        "4095.255.65535.255.post7",
        "1!0.0",
        "15!4095.255.65535.255.post7",
    ];
    for window in versions.windows(2) {
        let (lower, higher) = (window[0], window[1]);
        assert!(key(lower) < key(higher), "{lower} < {higher}");
        assert!(packed(lower) < packed(higher), "{lower} < {higher}");
    }
}

#[test]
fn layout() {
    assert_eq!(packed("1.0").as_u64(), 0x0001_0000_0000_FF0F);
    assert_eq!(packed("1.0a1").as_u64(), 0x0001_0000_0000_410F);
    assert_eq!(packed("1.0.dev0").as_u64(), 0x0001_0000_0000_0000);
    assert_eq!(packed("1.0.post2").as_u64(), 0x0001_0000_0000_FFAF);
    assert_eq!(
        packed("2!1.2.3.4rc5.post6.dev7").as_u64(),
        0x2001_0200_0304_C5E7
    );
}

#[test]
fn extremes() {
    assert_eq!(packed("0.0.0.0.dev0"), PackedVersion::MIN);
    assert_eq!(packed("15!4095.255.65535.255.post7"), PackedVersion::MAX);
    assert_snapshot!(PackedVersion::MIN.unpack().unwrap(), @"0.0.0.dev0");
    assert_snapshot!(PackedVersion::MAX.unpack().unwrap(), @"15!4095.255.65535.255.post7");
    assert_snapshot!(PackedVersion::MIN, @"0x0000000000000000");
    assert_snapshot!(PackedVersion::MAX, @"0xffffffffffffffff");
}

#[test]
fn unpack_is_canonical() {
    let versions = [
        ("1.2", "1.2.0"),
        ("1.0.0.0.0", "1.0.0"),
        ("1.2.3.4", "1.2.3.4"),
        ("7!1.0a0", "7!1.0.0a0"),
        ("1.0b3.post1.dev2", "1.0.0b3.post1.dev2"),
        ("1.0.post5.dev0", "1.0.0.post5.dev0"),
        ("1.0-5", "1.0.0.post5"),
        ("1.0.dev", "1.0.0.dev0"),
    ];
    for (version, canonical) in versions {
        let unpacked = packed(version).unpack().unwrap();
        assert_eq!(unpacked.to_string(), canonical, "{version}");
        assert_eq!(unpacked.to_string(), key(version).canonicalize().to_string());
        assert_eq!(PackedVersion::pack(&unpacked), Ok(packed(version)));
    }
}

#[test]
fn decode_errors() {
    let cases = [
        (0x050F, DecodeErrorKind::MissingPrereleaseSymbol),
        (0xFF3F, DecodeErrorKind::PostNumberWithoutFlag),
        (0x000F, DecodeErrorKind::DevMarkerWithoutDev),
        (0x0080, DecodeErrorKind::DevMarkerWithPost),
        (0xFF00, DecodeErrorKind::UnmarkedDevRelease),
    ];
    for (value, kind) in cases {
        let err = PackedVersion::from_u64(value).unpack().unwrap_err();
        assert_eq!((err.value(), err.kind()), (value, kind), "{value:#x}");
    }
    assert_snapshot!(
        PackedVersion::from_u64(0xFF00).unpack().unwrap_err(),
        @"`65280` (`0x000000000000ff00`) is not a packed version: a dev-release without pre- or post-release must use the dev-only marker"
    );
}

#[test]
fn signed_cells() {
    assert_eq!(PackedVersion::MIN.to_ordered_i64(), i64::MIN);
    assert_eq!(PackedVersion::MAX.to_ordered_i64(), i64::MAX);

    // The sign bit is the top bit of the epoch.
    let versions = ["0.1", "7!4095.255", "8!0.0.dev0", "8!1.0", "15!1.0"];
    for window in versions.windows(2) {
        let (lower, higher) = (packed(window[0]), packed(window[1]));
        assert!(lower.to_ordered_i64() < higher.to_ordered_i64());
    }
    for version in versions {
        let cell = packed(version).to_ordered_i64();
        assert_eq!(PackedVersion::from_ordered_i64(cell), packed(version));
    }
}

#[test]
fn conversions() {
    let version = key("3.1.4rc2");
    let packed = PackedVersion::try_from(&version).unwrap();
    assert_eq!(u64::from(packed), packed.as_u64());
    assert_eq!(PackedVersion::from_u64(packed.as_u64()), packed);
    assert_eq!(VersionKey::try_from(packed).unwrap(), version);
}

#[cfg(feature = "serde")]
#[test]
fn serde_transparent() {
    let packed = packed("1.0");
    let json = serde_json::to_string(&packed).unwrap();
    assert_eq!(json, packed.as_u64().to_string());
    assert_eq!(serde_json::from_str::<PackedVersion>(&json).unwrap(), packed);
}
