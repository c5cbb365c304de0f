// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Exact application of access modes to directories.

use std::path::Path;

#[cfg(target_family = "unix")]
pub mod unix;

#[cfg(target_os = "windows")]
pub mod windows;

mod sys {
    #[cfg(target_family = "unix")]
    pub use crate::mode::unix::*;

    #[cfg(target_os = "windows")]
    pub use crate::mode::windows::*;
}

/// Bits of a mode value that carry access permissions.
pub const PERM_BITS: u32 = 0o777;

/// Sets the access permissions of `path` to exactly `mode`.
///
/// The exact behaviour is system-specific:
///
///   * On Unix-like systems the permission bits are applied verbatim with the
///     [`chmod`] call.
///   * On Windows the bits are rewritten into an equivalent discretionary
///     access control list that replaces the existing one, including entries
///     inherited from parent directories.
///
/// Unlike modes requested at creation time, the outcome does not depend on
/// the process file-creation mask in either case.
///
/// [`chmod`]: https://man7.org/linux/man-pages/man2/chmod.2.html
///
/// # Errors
///
/// This function will fail if the specified path does not exist or the
/// process is not allowed to change its permissions.
pub fn apply<P>(path: P, mode: u32) -> std::io::Result<()>
where
    P: AsRef<Path>,
{
    self::sys::apply(path, mode)
}
