// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Resolution of the directory chain leading to a target path.

use std::path::Path;

use crate::error::Error;

/// Returns the chain of paths leading to `path`, outermost first.
///
/// The chain consists of every non-empty ancestor of the target, ending with
/// the target itself. No filesystem access happens here, the decomposition is
/// purely lexical.
pub fn chain(path: &Path) -> Vec<&Path> {
    let mut chain = path.ancestors()
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .collect::<Vec<_>>();
    chain.reverse();

    chain
}

/// Returns the number of leading entries of `chain` that exist as directories.
///
/// The chain is inspected top-down. Symlinks are followed, so a link pointing
/// at a directory counts as that directory. Entries past the first missing
/// one are not inspected, as they cannot exist without their parent.
///
/// This function only inspects the filesystem and never mutates it.
///
/// # Errors
///
/// Fails with [`Error::PathConflict`] if an entry of the chain exists but is
/// not a directory. Any other failure to inspect an entry is reported as an
/// access or input-output error for that entry.
pub fn existing_prefix(chain: &[&Path]) -> Result<usize, Error> {
    for (idx, prefix) in chain.iter().enumerate() {
        match std::fs::metadata(prefix) {
            Ok(metadata) if metadata.is_dir() => (),
            Ok(_) => return Err(Error::PathConflict(prefix.to_path_buf())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(idx);
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotADirectory => {
                return Err(Error::PathConflict(prefix.to_path_buf()));
            }
            Err(error) => return Err(Error::io(prefix, error)),
        }
    }

    Ok(chain.len())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn chain_of_single_component() {
        assert_eq!(chain(Path::new("foo")), vec![Path::new("foo")]);
    }

    #[test]
    fn chain_of_nested_path() {
        assert_eq! {
            chain(Path::new("foo/bar/baz")),
            vec! {
                Path::new("foo"),
                Path::new("foo/bar"),
                Path::new("foo/bar/baz"),
            }
        };
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn chain_of_absolute_path() {
        assert_eq! {
            chain(Path::new("/foo/bar")),
            vec! {
                Path::new("/"),
                Path::new("/foo"),
                Path::new("/foo/bar"),
            }
        };
    }

    #[test]
    fn chain_of_empty_path() {
        assert!(chain(Path::new("")).is_empty());
    }

    #[test]
    fn existing_prefix_of_complete_chain() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        let target = tempdir.path().join("foo").join("bar");
        std::fs::create_dir_all(&target)
            .unwrap();

        let chain = chain(&target);
        assert_eq!(existing_prefix(&chain).unwrap(), chain.len());
    }

    #[test]
    fn existing_prefix_of_partially_existing_chain() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        std::fs::create_dir(tempdir.path().join("foo"))
            .unwrap();

        let target = tempdir.path().join("foo").join("bar").join("baz");
        let chain = chain(&target);

        let existing = existing_prefix(&chain)
            .unwrap();
        assert_eq!(chain[existing], tempdir.path().join("foo").join("bar"));
    }

    #[test]
    fn existing_prefix_with_conflicting_component() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        std::fs::write(tempdir.path().join("occupied"), b"")
            .unwrap();

        let target = tempdir.path().join("occupied").join("leaf");
        let chain = chain(&target);

        match existing_prefix(&chain).unwrap_err() {
            Error::PathConflict(path) => {
                assert_eq!(path, tempdir.path().join("occupied"));
            }
            error => panic!("unexpected error: {}", error),
        }
    }
}
