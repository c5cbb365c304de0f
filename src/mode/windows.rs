// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Windows-specific application of directory access modes.

use std::path::Path;

/// Sets the access permissions of `path` to exactly `mode`.
///
/// Windows has no Unix-style permission bits, so the mode is rewritten into a
/// discretionary access control list with one access-allowed entry per
/// principal: the owner of the file gets the owner bits, its primary group
/// the group bits and the `Everyone` alias the remaining ones. The rewritten
/// list replaces the existing one and is marked as protected, so entries
/// inherited from parent directories cannot widen the granted access.
pub fn apply<P>(path: P, mode: u32) -> std::io::Result<()>
where
    P: AsRef<Path>,
{
    use std::os::windows::ffi::OsStrExt as _;

    let mut path_wide = path.as_ref().as_os_str()
        .encode_wide()
        .collect::<Vec<u16>>();
    path_wide.push(0);

    let mut owner_sid: windows_sys::Win32::Foundation::PSID = std::ptr::null_mut();
    let mut group_sid: windows_sys::Win32::Foundation::PSID = std::ptr::null_mut();
    let mut sec_desc: windows_sys::Win32::Security::PSECURITY_DESCRIPTOR = std::ptr::null_mut();

    // SAFETY: This is just a call to the unsafe function as described in the
    // documentation [1]. We ask only for the owner and primary group of the
    // file and verify the result of the call below.
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/aclapi/nf-aclapi-getnamedsecurityinfow
    let code = unsafe {
        windows_sys::Win32::Security::Authorization::GetNamedSecurityInfoW(
            path_wide.as_ptr(),
            windows_sys::Win32::Security::Authorization::SE_FILE_OBJECT,
            windows_sys::Win32::Security::OWNER_SECURITY_INFORMATION |
            windows_sys::Win32::Security::GROUP_SECURITY_INFORMATION,
            &mut owner_sid,
            &mut group_sid,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            &mut sec_desc,
        )
    };
    if code != windows_sys::Win32::Foundation::ERROR_SUCCESS {
        return Err(std::io::Error::from_raw_os_error(code as i32));
    }

    let result = replace_dacl(&path_wide, owner_sid, group_sid, mode);

    // SAFETY: The security descriptor was allocated by the system on our
    // behalf and has to be returned with `LocalFree` [1]. The owner and group
    // identifiers point into this buffer and are not used past this point.
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/aclapi/nf-aclapi-getnamedsecurityinfow
    unsafe {
        windows_sys::Win32::Foundation::LocalFree(sec_desc);
    }

    result
}

/// Replaces the discretionary ACL of the file behind `path_wide`.
///
/// The new list contains an access-allowed entry for each of the given
/// identifiers with rights equivalent to the matching 3-bit group of `mode`.
fn replace_dacl(
    path_wide: &[u16],
    owner_sid: windows_sys::Win32::Foundation::PSID,
    group_sid: windows_sys::Win32::Foundation::PSID,
    mode: u32,
) -> std::io::Result<()> {
    let mut world_sid = [0u8; windows_sys::Win32::Security::SECURITY_MAX_SID_SIZE as usize];
    let mut world_sid_len = world_sid.len() as u32;

    // SAFETY: This is just a call to the unsafe function as described in the
    // documentation [1]. We pass a buffer of the documented maximum size for
    // an identifier along with its length and verify the result below.
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/securitybaseapi/nf-securitybaseapi-createwellknownsid
    let status = unsafe {
        windows_sys::Win32::Security::CreateWellKnownSid(
            windows_sys::Win32::Security::WinWorldSid,
            std::ptr::null_mut(),
            world_sid.as_mut_ptr() as windows_sys::Win32::Foundation::PSID,
            &mut world_sid_len,
        )
    };
    if status == 0 {
        return Err(std::io::Error::last_os_error());
    }

    let entries = [
        (owner_sid, (mode >> 6) & 0o7),
        (group_sid, (mode >> 3) & 0o7),
        (world_sid.as_mut_ptr() as windows_sys::Win32::Foundation::PSID, mode & 0o7),
    ];

    // SAFETY: All three identifiers are valid at this point (the owner and
    // the group come from the file's security descriptor, the world alias
    // was initialized above), so their lengths can be collected [1].
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/securitybaseapi/nf-securitybaseapi-getlengthsid
    let sids_len = entries.iter()
        .map(|&(sid, _)| unsafe {
            windows_sys::Win32::Security::GetLengthSid(sid)
        } as usize)
        .sum::<usize>();

    // Each entry embeds its identifier in place of the trailing `SidStart`
    // field. The total length must be DWORD-aligned per the documentation of
    // `InitializeAcl`.
    let acl_len = std::mem::size_of::<windows_sys::Win32::Security::ACL>()
        + 3 * (std::mem::size_of::<windows_sys::Win32::Security::ACCESS_ALLOWED_ACE>()
            - std::mem::size_of::<u32>())
        + sids_len;
    let acl_len = (acl_len + 3) & !3;

    // A `u32` buffer keeps the list DWORD-aligned.
    let mut acl_buf = vec![0u32; acl_len / 4];
    let acl = acl_buf.as_mut_ptr() as *mut windows_sys::Win32::Security::ACL;

    // SAFETY: The buffer is writable, aligned and `acl_len` bytes long, as
    // the function requires [1]. We verify the result of the call below.
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/securitybaseapi/nf-securitybaseapi-initializeacl
    let status = unsafe {
        windows_sys::Win32::Security::InitializeAcl(
            acl,
            acl_len as u32,
            windows_sys::Win32::Security::ACL_REVISION,
        )
    };
    if status == 0 {
        return Err(std::io::Error::last_os_error());
    }

    for (sid, bits) in entries {
        // An access-allowed entry with no rights grants nothing, there is no
        // point in encoding it.
        if bits == 0 {
            continue;
        }

        // SAFETY: The list was initialized above and sized to hold an entry
        // for every identifier, so this call cannot run out of space [1]. We
        // still verify its result below.
        //
        // [1]: https://learn.microsoft.com/en-us/windows/win32/api/securitybaseapi/nf-securitybaseapi-addaccessallowedace
        let status = unsafe {
            windows_sys::Win32::Security::AddAccessAllowedAce(
                acl,
                windows_sys::Win32::Security::ACL_REVISION,
                access_mask(bits),
                sid,
            )
        };
        if status == 0 {
            return Err(std::io::Error::last_os_error());
        }
    }

    // SAFETY: This is just a call to the unsafe function as described in the
    // documentation [1]. Marking the new list as protected discards entries
    // that would otherwise be inherited from parent directories.
    //
    // [1]: https://learn.microsoft.com/en-us/windows/win32/api/aclapi/nf-aclapi-setnamedsecurityinfow
    let code = unsafe {
        windows_sys::Win32::Security::Authorization::SetNamedSecurityInfoW(
            path_wide.as_ptr(),
            windows_sys::Win32::Security::Authorization::SE_FILE_OBJECT,
            windows_sys::Win32::Security::DACL_SECURITY_INFORMATION |
            windows_sys::Win32::Security::PROTECTED_DACL_SECURITY_INFORMATION,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            acl,
            std::ptr::null(),
        )
    };
    if code != windows_sys::Win32::Foundation::ERROR_SUCCESS {
        return Err(std::io::Error::from_raw_os_error(code as i32));
    }

    Ok(())
}

/// Rewrites a 3-bit permission group into the equivalent file access rights.
fn access_mask(bits: u32) -> u32 {
    let mut mask = 0;

    if bits & 0o4 != 0 {
        mask |= windows_sys::Win32::Storage::FileSystem::FILE_GENERIC_READ;
    }
    if bits & 0o2 != 0 {
        mask |= windows_sys::Win32::Storage::FileSystem::FILE_GENERIC_WRITE
            | windows_sys::Win32::Storage::FileSystem::DELETE;
    }
    if bits & 0o1 != 0 {
        mask |= windows_sys::Win32::Storage::FileSystem::FILE_GENERIC_EXECUTE;
    }

    mask
}
