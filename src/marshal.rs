//! Boundary conversions between managed and native representations
//!
//! Strings are marshaled as `CString` values scoped to the duration of
//! one native call; arrays coming back from the native side are copied
//! into owned vectors. The zero-copy escape hatches live on the typed
//! proxies, not here.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

use crate::error::{CoinError, Result};

/// Marshal a managed string for one native call.
pub(crate) fn to_c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| CoinError::InvalidString(s.to_string()))
}

/// Marshal a file path for one native call. The native I/O routines take
/// plain byte strings, so the path must be valid UTF-8.
pub(crate) fn path_to_c_string(path: &Path) -> Result<CString> {
    let s = path
        .to_str()
        .ok_or_else(|| CoinError::InvalidString(path.display().to_string()))?;
    to_c_string(s)
}

/// Fail with `ArgumentShape` unless a slice has the length the native
/// call requires.
pub(crate) fn check_len(argument: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CoinError::ArgumentShape {
            argument,
            expected,
            actual,
        })
    }
}

/// Fail with `IndexOutOfRange` unless `index` addresses an existing
/// row/column.
pub(crate) fn check_index(argument: &'static str, limit: usize, index: usize) -> Result<()> {
    if index < limit {
        Ok(())
    } else {
        Err(CoinError::IndexOutOfRange {
            argument,
            index,
            limit,
        })
    }
}

/// Copy a native double array into managed storage. A null pointer
/// (model has no such array yet) yields an empty vector.
///
/// # Safety
/// If non-null, `ptr` must point to at least `len` readable doubles.
pub(crate) unsafe fn copy_f64(ptr: *const f64, len: usize) -> Vec<f64> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}

/// Copy a native int array into managed storage.
///
/// # Safety
/// If non-null, `ptr` must point to at least `len` readable ints.
pub(crate) unsafe fn copy_i32(ptr: *const c_int, len: usize) -> Vec<i32> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}

/// Copy a native `char **` string table into managed strings. Null
/// entries become empty strings.
///
/// # Safety
/// If non-null, `table` must point to at least `len` entries, each
/// either null or a NUL-terminated string.
pub(crate) unsafe fn copy_strings(table: *mut *mut c_char, len: usize) -> Vec<String> {
    if table.is_null() || len == 0 {
        return Vec::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(table, len) };
    entries
        .iter()
        .map(|&entry| {
            if entry.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(entry) }
                    .to_string_lossy()
                    .into_owned()
            }
        })
        .collect()
}

/// Read a NUL-terminated string out of a caller-provided fixed buffer
/// the native side filled in.
pub(crate) fn string_from_buffer(buffer: &[c_char]) -> String {
    let bytes: &[u8] =
        unsafe { std::slice::from_raw_parts(buffer.as_ptr() as *const u8, buffer.len()) };
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_nul_is_rejected() {
        let err = to_c_string("bad\0string").unwrap_err();
        assert!(matches!(err, CoinError::InvalidString(_)));
    }

    #[test]
    fn test_check_len_mismatch() {
        assert!(check_len("obj", 3, 3).is_ok());
        let err = check_len("obj", 3, 2).unwrap_err();
        assert!(matches!(
            err,
            CoinError::ArgumentShape {
                argument: "obj",
                expected: 3,
                actual: 2,
            }
        ));
    }

    #[test]
    fn test_copy_f64_round_trip() {
        let source = vec![1.0, -2.5, 3.25];
        let copied = unsafe { copy_f64(source.as_ptr(), source.len()) };
        assert_eq!(copied, source);
    }

    #[test]
    fn test_copy_f64_null_is_empty() {
        assert!(unsafe { copy_f64(std::ptr::null(), 5) }.is_empty());
    }

    #[test]
    fn test_copy_strings_handles_null_entries() {
        let a = CString::new("first").unwrap();
        let mut table = [a.as_ptr() as *mut c_char, std::ptr::null_mut()];
        let strings = unsafe { copy_strings(table.as_mut_ptr(), table.len()) };
        assert_eq!(strings, vec!["first".to_string(), String::new()]);
    }

    #[test]
    fn test_string_from_buffer_stops_at_nul() {
        let raw = b"name\0garbage";
        let buffer: Vec<c_char> = raw.iter().map(|&b| b as c_char).collect();
        assert_eq!(string_from_buffer(&buffer), "name");
    }
}
