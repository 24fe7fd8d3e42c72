//! Mapping of directory paths to identity keys.

use std::path::{Component, Path};

use compact_str::CompactString;

use sdsusage_core::IdentityKey;

/// Classify a directory, given relative to its root.
///
/// The path must start with `prefix` and continue with at least
/// `project/version/ident`. Anything below the ident directory belongs to
/// the same identity.
pub fn classify(relative_dir: &Path, prefix: &[String]) -> Option<IdentityKey> {
    let mut parts = relative_dir.components().map(|component| match component {
        Component::Normal(part) => Some(CompactString::new(part.to_string_lossy())),
        _ => None,
    });

    for expected in prefix {
        match parts.next() {
            Some(Some(part)) if part == expected.as_str() => {}
            _ => return None,
        }
    }

    let project = parts.next()??;
    let version = parts.next()??;
    let ident = parts.next()??;
    Some(IdentityKey {
        project,
        version,
        ident,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> Vec<String> {
        vec!["SDS".to_string(), "data".to_string()]
    }

    #[test]
    fn test_classify_identity_directory() {
        let key = classify(Path::new("SDS/data/apollo/v3/cam01"), &prefix()).unwrap();
        assert_eq!(key, IdentityKey::new("apollo", "v3", "cam01"));
    }

    #[test]
    fn test_deeper_directories_belong_to_ident() {
        let key = classify(Path::new("SDS/data/apollo/v3/cam01/2024/01"), &prefix()).unwrap();
        assert_eq!(key, IdentityKey::new("apollo", "v3", "cam01"));
    }

    #[test]
    fn test_too_shallow_is_rejected() {
        assert!(classify(Path::new("SDS/data/apollo/v3"), &prefix()).is_none());
        assert!(classify(Path::new("SDS/data"), &prefix()).is_none());
        assert!(classify(Path::new(""), &prefix()).is_none());
    }

    #[test]
    fn test_wrong_prefix_is_rejected() {
        assert!(classify(Path::new("SDS/other/apollo/v3/cam01"), &prefix()).is_none());
        assert!(classify(Path::new("sds/data/apollo/v3/cam01"), &prefix()).is_none());
        assert!(classify(Path::new("data/apollo/v3/cam01/x"), &prefix()).is_none());
    }

    #[test]
    fn test_custom_prefix() {
        let prefix = vec!["archive".to_string()];
        let key = classify(Path::new("archive/p/v/i"), &prefix).unwrap();
        assert_eq!(key, IdentityKey::new("p", "v", "i"));
    }
}
