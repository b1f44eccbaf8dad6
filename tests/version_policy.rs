// tests/version_policy.rs

use proptest::prelude::*;
use redshift_tray::version::{satisfies, Version, VersionRequirement, MIN_REDSHIFT_VERSION};

proptest! {
    // Lexicographic (major, minor) ordering, regardless of any trailing
    // components.
    #[test]
    fn requirement_matches_lexicographic_order(
        major in 0u32..50,
        minor in 0u32..50,
        min_major in 0u32..50,
        min_minor in 0u32..50,
        patch in proptest::option::of(0u32..100),
    ) {
        let token = match patch {
            Some(p) => format!("{major}.{minor}.{p}"),
            None => format!("{major}.{minor}"),
        };
        let required = VersionRequirement::new(min_major, min_minor);
        let expected = (major, minor) >= (min_major, min_minor);

        prop_assert_eq!(required.accepts(&token), expected);
        let parsed = Version::parse(&token).unwrap();
        prop_assert_eq!(satisfies(parsed, required), expected);
    }

    #[test]
    fn single_component_tokens_are_rejected(major in 0u32..1000) {
        prop_assert!(Version::parse(&major.to_string()).is_err());
        prop_assert!(!MIN_REDSHIFT_VERSION.accepts(&major.to_string()));
    }
}

#[test]
fn minimum_is_one_ten() {
    assert!(!MIN_REDSHIFT_VERSION.accepts("1.9"));
    assert!(MIN_REDSHIFT_VERSION.accepts("1.10"));
    assert!(MIN_REDSHIFT_VERSION.accepts("1.12"));
    assert!(MIN_REDSHIFT_VERSION.accepts("2.0"));
    assert!(!MIN_REDSHIFT_VERSION.accepts("1.x"));
}
