// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Unix-specific application of directory access modes.

use std::path::Path;

/// Sets the permission bits of `path` to exactly `mode`.
pub fn apply<P>(path: P, mode: u32) -> std::io::Result<()>
where
    P: AsRef<Path>,
{
    use std::os::unix::fs::PermissionsExt as _;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}
