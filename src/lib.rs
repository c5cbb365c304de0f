// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Creation of directories with exact access permissions.
//!
//! Standard directory-creation calls subtract the process file-creation mask
//! from whatever mode they are asked for, so what ends up on disk depends on
//! ambient process state. For folders that hold sensitive material (private
//! keys, credentials, configuration state) the result has to be exactly what
//! the caller asked for, no more and no less.
//!
//! [`ensure_directory`] creates the target directory along with all of its
//! missing ancestors and guarantees that every directory it created, and the
//! target itself, carries exactly the requested permission mode, independent
//! of the mask in effect at the call site. The mask is neutralized only for
//! the duration of the call and put back on every exit path.

mod create;
mod mode;
mod umask;
mod walk;

pub mod error;

pub use crate::error::Error;

use std::path::Path;

/// Ensures that the given directory exists with exactly the given mode.
///
/// Missing ancestors of the target are created along the way, shallowest
/// first. Once the call returns successfully, the target and every directory
/// created by this call have access permissions equal to `mode`, regardless
/// of the process file-creation mask. Ancestors that existed before the call
/// are left untouched, and the mask itself ends up as it was at the call
/// site, also when the call fails.
///
/// Calling the function again for the same path is safe: directories that
/// are already there are not recreated, and only the target has its mode
/// asserted anew. A call that failed partway leaves the directories it did
/// create on disk, so a retry picks up where the failed call stopped.
///
/// # Errors
///
/// The call fails with [`Error::InvalidMode`] for modes with bits outside of
/// the permission range (before anything is touched), [`Error::PathConflict`]
/// if a component of the path exists but is not a directory, and with
/// [`Error::PermissionDenied`] or [`Error::Io`] if the system refuses one of
/// the creation or mode-change steps.
///
/// # Examples
///
/// ```no_run
/// sealdir::ensure_directory("/var/lib/agent/keys", 0o700)
///     .unwrap();
/// ```
pub fn ensure_directory<P>(path: P, mode: u32) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if mode & !mode::PERM_BITS != 0 {
        return Err(Error::InvalidMode(mode));
    }
    if path.as_os_str().is_empty() {
        let error = std::io::ErrorKind::InvalidInput.into();
        return Err(Error::Io(path.to_path_buf(), error));
    }

    // The mask stays neutralized for the whole call, so modes requested at
    // creation time reach the system unmodified.
    let _mask = umask::UmaskGuard::new();

    let chain = walk::chain(path);
    let existing = walk::existing_prefix(&chain)?;

    let created = create::create_missing(&chain, existing, mode)?;

    for &dir in &created {
        mode::apply(dir, mode)
            .map_err(|error| Error::io(dir, error))?;
    }

    if created.last() != chain.last() {
        // The chain cannot be empty since the empty path was rejected above.
        let leaf = chain[chain.len() - 1];

        log::debug!("asserting mode {:o} on existing directory '{}'", mode, leaf.display());
        mode::apply(leaf, mode)
            .map_err(|error| Error::io(leaf, error))?;
    }

    Ok(())
}
