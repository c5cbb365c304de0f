// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Creation of the missing directories of a resolved chain.

use std::path::Path;

use crate::error::Error;

/// Creates every missing directory of the resolved chain, shallowest first.
///
/// `existing` is the length of the leading part of the chain that is already
/// present on disk (as determined by [`crate::walk::existing_prefix`]), so
/// each creation step runs with its parent in place. The returned list names
/// the directories that this call actually created.
///
/// Directories that spring into existence between resolution and creation are
/// tolerated and treated like any other pre-existing entry, as long as they
/// really are directories.
///
/// # Errors
///
/// Fails with an access error if the system refuses to create an entry and
/// with an input-output error for any other creation failure. Entries created
/// before the failure are left on disk, so a retried call finds them
/// pre-existing and continues from where this one stopped.
pub fn create_missing<'p>(
    chain: &[&'p Path],
    existing: usize,
    mode: u32,
) -> Result<Vec<&'p Path>, Error> {
    let mut created = Vec::with_capacity(chain.len() - existing);

    for &dir in &chain[existing..] {
        log::debug!("creating directory '{}'", dir.display());

        match create_dir(dir, mode) {
            Ok(()) => created.push(dir),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                if !dir.is_dir() {
                    return Err(Error::PathConflict(dir.to_path_buf()));
                }
            }
            Err(error) => return Err(Error::io(dir, error)),
        }
    }

    Ok(created)
}

/// Creates a single directory, requesting `mode` already at creation time.
///
/// With the process creation mask neutralized, a directory created this way
/// never passes through a state wider than the requested one. The final bits
/// are still asserted separately afterwards: creation-time modes are not
/// honored on every platform, nor atomic with creation on those that honor
/// them.
fn create_dir(path: &Path, mode: u32) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();

    #[cfg(target_family = "unix")]
    {
        use std::os::unix::fs::DirBuilderExt as _;
        builder.mode(mode);
    }
    #[cfg(not(target_family = "unix"))]
    let _ = mode;

    builder.create(path)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn create_missing_builds_whole_chain() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        let target = tempdir.path().join("foo").join("bar");

        let chain = crate::walk::chain(&target);
        let existing = crate::walk::existing_prefix(&chain)
            .unwrap();

        let created = create_missing(&chain, existing, 0o755)
            .unwrap();
        assert_eq!(created.len(), 2);
        assert!(target.is_dir());
    }

    #[test]
    fn create_missing_with_nothing_missing() {
        let tempdir = tempfile::tempdir()
            .unwrap();

        let chain = crate::walk::chain(tempdir.path());
        let created = create_missing(&chain, chain.len(), 0o755)
            .unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn create_missing_with_raced_directory() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        let raced = tempdir.path().join("raced");
        std::fs::create_dir(&raced)
            .unwrap();

        // The chain claims that `raced` is missing even though it is there,
        // as if somebody else created it after resolution.
        let chain = crate::walk::chain(&raced);
        let created = create_missing(&chain, chain.len() - 1, 0o755)
            .unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn create_missing_with_raced_file() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        let raced = tempdir.path().join("raced");
        std::fs::write(&raced, b"")
            .unwrap();

        let chain = crate::walk::chain(&raced);
        let error = create_missing(&chain, chain.len() - 1, 0o755)
            .unwrap_err();
        assert!(matches!(error, Error::PathConflict(_)));
    }

    #[test]
    fn create_missing_with_missing_parent() {
        let tempdir = tempfile::tempdir()
            .unwrap();
        let target = tempdir.path().join("foo").join("bar");

        let chain = [target.as_path()];
        let error = create_missing(&chain[..], 0, 0o755)
            .unwrap_err();
        assert!(matches!(error, Error::Io(..)));
    }
}
