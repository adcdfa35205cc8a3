//! バケット名の検証.
use std::net::Ipv4Addr;

use crate::{ErrorKind, Result};

/// バケット名として使用可能かどうかを検証する.
///
/// `strict`が`true`の場合は、英小文字・数字・`.`・`-`のみを許可する.
/// `false`の場合は、それに加えて英大文字・`_`・`:`も許可する.
///
/// 不正な場合は`ErrorKind::BucketNameInvalid`を返す.
pub fn check_bucket_name(name: &str, strict: bool) -> Result<()> {
    track_assert!(!name.is_empty(), ErrorKind::BucketNameInvalid, "empty name");
    track_assert!(
        name.len() >= 3 && name.len() <= 63,
        ErrorKind::BucketNameInvalid,
        "name={:?}",
        name
    );
    track_assert!(
        name.parse::<Ipv4Addr>().is_err(),
        ErrorKind::BucketNameInvalid,
        "IP address: name={:?}",
        name
    );
    for pattern in &["..", ".-", "-."] {
        track_assert!(
            !name.contains(pattern),
            ErrorKind::BucketNameInvalid,
            "name={:?}",
            name
        );
    }

    let bytes = name.as_bytes();
    let edge_ok = |c: u8| {
        if strict {
            c.is_ascii_lowercase() || c.is_ascii_digit()
        } else {
            c.is_ascii_alphanumeric()
        }
    };
    let inner_ok = |c: u8| edge_ok(c) || c == b'.' || c == b'-' || (!strict && (c == b'_' || c == b':'));
    track_assert!(
        edge_ok(bytes[0]) && edge_ok(bytes[bytes.len() - 1]),
        ErrorKind::BucketNameInvalid,
        "name={:?}",
        name
    );
    track_assert!(
        bytes[1..bytes.len() - 1].iter().all(|&c| inner_ok(c)),
        ErrorKind::BucketNameInvalid,
        "name={:?}",
        name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(name: &str, strict: bool) -> bool {
        check_bucket_name(name, strict).is_ok()
    }

    #[test]
    fn strict_names_work() {
        let longest = "x".repeat(63);
        let too_long = "x".repeat(64);
        for name in &["foo", "my-bucket", "bucket.2024", "a1b", longest.as_str()] {
            assert!(is_valid(name, true), "name={:?}", name);
        }
        for name in &[
            "",
            "ab",
            too_long.as_str(),
            "192.168.1.1",
            "foo..bar",
            "foo.-bar",
            "foo-.bar",
            "-foo",
            "foo-",
            ".foo",
            "Foo",
            "foo_bar",
            "foo bar",
        ] {
            assert!(!is_valid(name, true), "name={:?}", name);
        }
    }

    #[test]
    fn relaxed_names_work() {
        for name in &["Foo", "foo_bar", "foo:bar", "FOO"] {
            assert!(is_valid(name, false), "name={:?}", name);
        }
        for name in &["_foo", "foo:", "foo..bar", "a b"] {
            assert!(!is_valid(name, false), "name={:?}", name);
        }
    }

    #[test]
    fn invalid_names_have_a_dedicated_kind() {
        let e = check_bucket_name("ab", true).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::BucketNameInvalid);
    }
}
