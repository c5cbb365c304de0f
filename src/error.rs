// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Errors raised when provisioning a directory.

use std::path::Path;
use std::path::PathBuf;

/// An error type for failures that can occur when provisioning a directory.
///
/// Each variant names the part of the operation that failed, so callers can
/// react to a conflicting path component differently than to a plain access
/// error. The underlying system error (if there is one) is preserved and
/// exposed through [`std::error::Error::source`].
#[derive(Debug)]
pub enum Error {
    /// The requested mode has bits outside of the permission range.
    InvalidMode(u32),
    /// A component of the path exists but is not a directory.
    PathConflict(PathBuf),
    /// The system refused to create a directory or to change its mode.
    PermissionDenied(PathBuf, std::io::Error),
    /// An input-output failure occurred for the given path.
    Io(PathBuf, std::io::Error),
}

impl Error {

    /// Converts an I/O error raised when operating on `path`.
    ///
    /// Access errors are lifted to [`Error::PermissionDenied`] so that they
    /// stay distinguishable from transient system failures.
    pub(crate) fn io(path: &Path, error: std::io::Error) -> Error {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Error::PermissionDenied(path.to_path_buf(), error)
            }
            _ => Error::Io(path.to_path_buf(), error),
        }
    }
}

impl std::fmt::Display for Error {

    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;

        match *self {
            InvalidMode(mode) => {
                write!(fmt, "mode {:#o} is outside of the permission range", mode)
            }
            PathConflict(ref path) => {
                write!(fmt, "path component '{}' is not a directory", path.display())
            }
            PermissionDenied(ref path, ref error) => {
                write!(fmt, "access denied for '{}': {}", path.display(), error)
            }
            Io(ref path, ref error) => {
                write!(fmt, "system failure for '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for Error {

    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use Error::*;

        match *self {
            InvalidMode(_) => None,
            PathConflict(_) => None,
            PermissionDenied(_, ref error) => Some(error),
            Io(_, ref error) => Some(error),
        }
    }
}
