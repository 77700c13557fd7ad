//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using html2zpl from other
//! languages such as C#, Python, and Node.js. Configuration is passed as a
//! JSON object with the same keys as [`LabelConfig`]; null means defaults.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::render::{JsonFormat, LabelConfig};
use crate::{convert, convert_file, repair, validate};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct Html2ZplResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `html2zpl_free_string`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `html2zpl_free_string`.
    pub error: *mut c_char,
}

impl Html2ZplResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

impl From<crate::Result<String>> for Html2ZplResult {
    fn from(result: crate::Result<String>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Borrow a required UTF-8 string argument.
unsafe fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, Html2ZplResult> {
    if ptr.is_null() {
        return Err(Html2ZplResult::error(format!("{} cannot be null", name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| Html2ZplResult::error(format!("Invalid UTF-8 {}", name)))
}

/// Parse an optional JSON configuration.
unsafe fn config_arg(ptr: *const c_char) -> Result<LabelConfig, Html2ZplResult> {
    if ptr.is_null() {
        return Ok(LabelConfig::default());
    }
    let json = required_str(ptr, "config")?;
    LabelConfig::from_json_str(json).map_err(|e| Html2ZplResult::error(e.to_string()))
}

/// Convert an HTML string to a ZPL label.
///
/// # Safety
///
/// `html` must be a valid null-terminated UTF-8 string. `config_json` must
/// be null or a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2zpl_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_convert(
    html: *const c_char,
    config_json: *const c_char,
) -> Html2ZplResult {
    let html = match required_str(html, "HTML") {
        Ok(s) => s,
        Err(e) => return e,
    };
    let config = match config_arg(config_json) {
        Ok(c) => c,
        Err(e) => return e,
    };

    convert(html, &config).into()
}

/// Convert an HTML file to a ZPL label.
///
/// # Safety
///
/// `path` must be a valid null-terminated UTF-8 string. `config_json` must
/// be null or a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2zpl_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_convert_file(
    path: *const c_char,
    config_json: *const c_char,
) -> Html2ZplResult {
    let path = match required_str(path, "Path") {
        Ok(s) => s,
        Err(e) => return e,
    };
    let config = match config_arg(config_json) {
        Ok(c) => c,
        Err(e) => return e,
    };

    convert_file(Path::new(path), &config).into()
}

/// Validate a ZPL stream. The data is the JSON report; `success` reports
/// whether the call itself worked, not whether the stream is valid.
///
/// # Safety
///
/// `zpl` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2zpl_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_validate(zpl: *const c_char, pretty: bool) -> Html2ZplResult {
    let zpl = match required_str(zpl, "ZPL") {
        Ok(s) => s,
        Err(e) => return e,
    };
    let format = if pretty {
        JsonFormat::Pretty
    } else {
        JsonFormat::Compact
    };

    validate(zpl).to_json(format).into()
}

/// Repair a ZPL stream. The data is the repaired stream.
///
/// # Safety
///
/// `zpl` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2zpl_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_repair(zpl: *const c_char) -> Html2ZplResult {
    match required_str(zpl, "ZPL") {
        Ok(s) => Html2ZplResult::success(repair(s).content),
        Err(e) => e,
    }
}

/// Free a result returned by any html2zpl function.
///
/// # Safety
///
/// The result must have been returned by an html2zpl function and not freed
/// before.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_free_result(result: Html2ZplResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string returned by an html2zpl function.
///
/// # Safety
///
/// The pointer must have been returned by an html2zpl function and not
/// freed before.
#[no_mangle]
pub unsafe extern "C" fn html2zpl_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the html2zpl library.
///
/// # Safety
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn html2zpl_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_of(result: &Html2ZplResult) -> String {
        unsafe { CStr::from_ptr(result.data).to_string_lossy().into_owned() }
    }

    #[test]
    fn test_version() {
        let version = html2zpl_version();
        assert!(!version.is_null());
    }

    #[test]
    fn test_null_html() {
        unsafe {
            let result = html2zpl_convert(ptr::null(), ptr::null());
            assert!(!result.success);
            assert!(!result.error.is_null());
            html2zpl_free_result(result);
        }
    }

    #[test]
    fn test_convert_with_default_config() {
        let html = CString::new("<p>Hello</p>").unwrap();
        unsafe {
            let result = html2zpl_convert(html.as_ptr(), ptr::null());
            assert!(result.success);
            assert!(data_of(&result).contains("^FDHello^FS"));
            html2zpl_free_result(result);
        }
    }

    #[test]
    fn test_convert_with_json_config() {
        let html = CString::new("<p>Hello</p>").unwrap();
        let config = CString::new(r#"{"dpi": 300, "label_width_in": 2.0}"#).unwrap();
        unsafe {
            let result = html2zpl_convert(html.as_ptr(), config.as_ptr());
            assert!(result.success);
            assert!(data_of(&result).contains("^PW600"));
            html2zpl_free_result(result);
        }
    }

    #[test]
    fn test_invalid_config() {
        let html = CString::new("<p>Hello</p>").unwrap();
        let config = CString::new(r#"{"dpi": 0}"#).unwrap();
        unsafe {
            let result = html2zpl_convert(html.as_ptr(), config.as_ptr());
            assert!(!result.success);
            html2zpl_free_result(result);
        }
    }

    #[test]
    fn test_validate_and_repair() {
        let zpl = CString::new("^FO1,1^FDx^FS").unwrap();
        unsafe {
            let report = html2zpl_validate(zpl.as_ptr(), false);
            assert!(report.success);
            assert!(data_of(&report).contains("\"success\":false"));
            html2zpl_free_result(report);

            let repaired = html2zpl_repair(zpl.as_ptr());
            assert!(repaired.success);
            assert!(data_of(&repaired).starts_with("^XA"));
            html2zpl_free_result(repaired);
        }
    }
}
