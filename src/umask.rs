// Copyright 2023 Google LLC
//
// Use of this source code is governed by an MIT-style license that can be found
// in the LICENSE file or at https://opensource.org/licenses/MIT.

//! Scoped neutralization of the process file-creation mask.

use std::sync::Mutex;
use std::sync::MutexGuard;

/// Serializes sections of code that swap the process-wide creation mask.
static MASK_LOCK: Mutex<()> = Mutex::new(());

/// A guard that keeps the process file-creation mask neutralized.
///
/// While an instance is alive, the mask of the process is zero and creation
/// calls are handed their requested modes unmodified. The mask value found at
/// construction time is put back when the guard is dropped, also when the
/// guarded code returns early with an error or unwinds.
///
/// The mask is shared by the whole process, so guards are mutually exclusive:
/// constructing one blocks until no other thread holds one. This keeps the
/// neutralized window of one caller from leaking into the creation calls of
/// another and makes save-restore pairs strictly nested.
///
/// On platforms without a creation mask (Windows), the guard only provides
/// the mutual exclusion.
pub struct UmaskGuard {
    /// The mask value to put back at the end of the guarded section.
    #[cfg(target_family = "unix")]
    prev: libc::mode_t,
    /// Exclusive hold over the process-wide mask.
    _lock: MutexGuard<'static, ()>,
}

impl UmaskGuard {

    /// Neutralizes the process creation mask until the guard is dropped.
    pub fn new() -> UmaskGuard {
        let lock = MASK_LOCK.lock()
            // A holder that panicked has already put its mask back while
            // unwinding, so the state behind a poisoned lock is sound.
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        UmaskGuard {
            #[cfg(target_family = "unix")]
            prev: swap(0),
            _lock: lock,
        }
    }
}

impl Drop for UmaskGuard {

    fn drop(&mut self) {
        // The mask has to be back in place before `_lock` is released, which
        // is guaranteed by field drop order: `drop` runs first.
        #[cfg(target_family = "unix")]
        swap(self.prev);
    }
}

/// Swaps the process file-creation mask, returning the previous value.
#[cfg(target_family = "unix")]
pub(crate) fn swap(mask: libc::mode_t) -> libc::mode_t {
    // SAFETY: `umask` always succeeds and does nothing beyond replacing the
    // process-wide creation mask with the given value [1].
    //
    // [1]: https://pubs.opengroup.org/onlinepubs/9699919799/functions/umask.html
    unsafe { libc::umask(mask) }
}

/// Acquires the lock serializing tests that touch the process creation mask.
///
/// The mask is global to the test binary, so every test that sets, reads or
/// neutralizes it has to hold this lock to not observe the windows of other
/// tests running in parallel.
#[cfg(test)]
pub(crate) fn test_lock() -> MutexGuard<'static, ()> {
    static TEST_MASK_LOCK: Mutex<()> = Mutex::new(());

    TEST_MASK_LOCK.lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[cfg(target_family = "unix")]
    #[test]
    fn guard_neutralizes_the_mask() {
        let _lock = test_lock();
        let prev = swap(0o027);

        {
            let _guard = UmaskGuard::new();
            assert_eq!(swap(0), 0);
        }

        assert_eq!(swap(prev), 0o027);
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn guard_restores_the_mask_on_unwind() {
        let _lock = test_lock();
        let prev = swap(0o022);

        let result = std::panic::catch_unwind(|| {
            let _guard = UmaskGuard::new();
            panic!("boom");
        });
        assert!(result.is_err());

        assert_eq!(swap(prev), 0o022);
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn guards_nest_across_threads() {
        let _lock = test_lock();
        let prev = swap(0o077);

        let handles = (0..4).map(|_| std::thread::spawn(|| {
            for _ in 0..16 {
                let _guard = UmaskGuard::new();
                assert_eq!(swap(0), 0);
            }
        })).collect::<Vec<_>>();

        for handle in handles {
            handle.join()
                .unwrap();
        }

        assert_eq!(swap(prev), 0o077);
    }
}
