// ABOUTME: C FFI bindings for the ReadX extraction core.
// ABOUTME: Exposes arena-allocated extraction and rendering results to bookmarklet and mobile hosts.

use std::cell::RefCell;
use std::panic;
use std::ptr;

use bumpalo::Bump;
use readx_core::{
    ErrorCode, ExtractError, NormalizedContent, OutputFormat, Reader, ReaderSettings,
};
use url::Url;

/// FFI version constant for ABI compatibility checking.
pub const READX_FFI_VERSION: u32 = 1;

/// Returns the FFI ABI version number.
/// Consumers should check this matches their expected version.
#[no_mangle]
pub extern "C" fn readx_ffi_version() -> u32 {
    READX_FFI_VERSION
}

// ----------------------------------------------------------------------------
// Error handling
// ----------------------------------------------------------------------------

/// Error codes matching the C ABI DErrorCode enum.
#[repr(u32)]
pub enum DErrorCode {
    Ok = 0,
    ContainerNotFound = 1,
    NotInitialized = 2,
    TextNotFound = 3,
    Invalid = 4,
    Section = 5,
    Settings = 6,
    Internal = 255,
}

/// UTF-8 string slice for FFI. Not null-terminated.
/// Consumer must not mutate or free; memory owned by arena.
#[derive(Copy, Clone)]
#[repr(C)]
pub struct DString {
    pub data: *const u8,
    pub len: usize,
}

impl DString {
    /// Creates an empty DString with null pointer and zero length.
    pub const fn empty() -> Self {
        DString {
            data: ptr::null(),
            len: 0,
        }
    }
}

impl Default for DString {
    fn default() -> Self {
        Self::empty()
    }
}

/// FFI error struct matching C ABI DError.
#[repr(C)]
pub struct DError {
    pub code: u32,
    pub message: DString,
}

impl DError {
    /// Creates a success (D_OK) error with empty message.
    pub const fn ok() -> Self {
        DError {
            code: DErrorCode::Ok as u32,
            message: DString::empty(),
        }
    }
}

// ----------------------------------------------------------------------------
// DReadxView - matches C ABI struct
// ----------------------------------------------------------------------------

/// Absent engagement metrics are reported as -1, distinct from a real 0.
pub const D_METRIC_ABSENT: i64 = -1;

#[repr(C)]
pub struct DReadxView {
    /// `"tweet"` or `"article"`.
    pub kind: DString,
    /// Article title; empty for tweets.
    pub title: DString,
    pub author_name: DString,
    pub author_handle: DString,
    pub author_verified: bool,
    pub avatar_url: DString,
    pub timestamp_iso: DString,
    /// Milliseconds since the Unix epoch, 0 when absent or before 1970.
    pub published_ms: u64,
    /// Tweet text, or the plain-text rendition of an article.
    pub text: DString,
    /// Sanitized reading-view fragment.
    pub html: DString,
    /// Complete reading-mode document styled with the supplied settings.
    pub page: DString,
    /// The normalized record as JSON.
    pub json: DString,
    pub block_count: u32,
    pub media_count: u32,
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub bookmarks: i64,
}

// ----------------------------------------------------------------------------
// Arena types
// ----------------------------------------------------------------------------

/// Arena holding one extraction result.
/// All allocations for the view live in the bump allocator.
pub struct DReadxArena {
    #[allow(dead_code)]
    bump: Bump,
    view: *const DReadxView,
}

// ----------------------------------------------------------------------------
// Helper functions
// ----------------------------------------------------------------------------

/// Copies a string into the arena and returns a DString pointing to it.
fn copy_str_to_arena(bump: &Bump, s: &str) -> DString {
    if s.is_empty() {
        return DString::empty();
    }
    let bytes = bump.alloc_slice_copy(s.as_bytes());
    DString {
        data: bytes.as_ptr(),
        len: bytes.len(),
    }
}

fn metric(value: Option<u64>) -> i64 {
    value
        .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
        .unwrap_or(D_METRIC_ABSENT)
}

/// Everything the view needs, rendered before the arena is built.
struct Rendered {
    html: String,
    page: String,
    text: String,
    json: String,
}

/// Creates a DReadxView in the arena from extracted content.
fn make_view(bump: &Bump, content: &NormalizedContent, rendered: &Rendered) -> *const DReadxView {
    let author = content.author();
    let timestamp = content.timestamp();
    let published_ms = timestamp
        .and_then(|t| t.parsed())
        .map(|dt| u64::try_from(dt.timestamp_millis()).unwrap_or(0))
        .unwrap_or(0);

    let (title, block_count, media_count, engagement) = match content {
        NormalizedContent::Tweet(t) => ("", 0, t.media.len(), Some(t.engagement)),
        NormalizedContent::Article(a) => (a.title.as_str(), a.blocks.len(), 0, None),
    };
    let engagement = engagement.unwrap_or_default();

    let view = bump.alloc(DReadxView {
        kind: copy_str_to_arena(bump, content.kind()),
        title: copy_str_to_arena(bump, title),
        author_name: copy_str_to_arena(
            bump,
            author.map(|a| a.display_name.as_str()).unwrap_or(""),
        ),
        author_handle: copy_str_to_arena(bump, author.map(|a| a.handle.as_str()).unwrap_or("")),
        author_verified: author.is_some_and(|a| a.verified),
        avatar_url: copy_str_to_arena(
            bump,
            author.and_then(|a| a.avatar_url.as_deref()).unwrap_or(""),
        ),
        timestamp_iso: copy_str_to_arena(
            bump,
            timestamp.map(|t| t.iso_datetime.as_str()).unwrap_or(""),
        ),
        published_ms,
        text: copy_str_to_arena(bump, &rendered.text),
        html: copy_str_to_arena(bump, &rendered.html),
        page: copy_str_to_arena(bump, &rendered.page),
        json: copy_str_to_arena(bump, &rendered.json),
        block_count: u32::try_from(block_count).unwrap_or(u32::MAX),
        media_count: u32::try_from(media_count).unwrap_or(u32::MAX),
        likes: metric(engagement.likes),
        retweets: metric(engagement.retweets),
        replies: metric(engagement.replies),
        bookmarks: metric(engagement.bookmarks),
    });
    view as *const DReadxView
}

/// Maps an ExtractError code to a DErrorCode.
fn map_error_code(code: ErrorCode) -> u32 {
    match code {
        ErrorCode::ContainerNotFound => DErrorCode::ContainerNotFound as u32,
        ErrorCode::EditorRootNotFound => DErrorCode::NotInitialized as u32,
        ErrorCode::TextNotFound => DErrorCode::TextNotFound as u32,
        ErrorCode::SectionMissing | ErrorCode::MalformedAttribute => DErrorCode::Section as u32,
        ErrorCode::Settings => DErrorCode::Settings as u32,
    }
}

thread_local! {
    /// Backing store for error messages. A message stays valid until the next
    /// failing call on the same thread.
    static ERROR_ARENA: RefCell<Bump> = RefCell::new(Bump::new());
}

/// Sets the out_err with the given code and message.
/// The message is allocated in the thread-local error arena.
/// If out_err is null, this is a no-op.
unsafe fn set_error(out_err: *mut DError, code: u32, message: &str) {
    if out_err.is_null() {
        return;
    }
    ERROR_ARENA.with(|cell| {
        let mut bump = cell.borrow_mut();
        bump.reset();
        (*out_err).code = code;
        (*out_err).message = copy_str_to_arena(&bump, message);
    });
}

/// Sets out_err to success (D_OK with empty message).
/// If out_err is null, this is a no-op.
unsafe fn set_success(out_err: *mut DError) {
    if !out_err.is_null() {
        (*out_err).code = DErrorCode::Ok as u32;
        (*out_err).message = DString::empty();
    }
}

/// Reads an optional UTF-8 argument. Null or zero length is `Ok(None)`.
unsafe fn optional_str<'a>(data: *const u8, len: usize) -> Result<Option<&'a str>, ()> {
    if data.is_null() || len == 0 {
        return Ok(None);
    }
    let slice = std::slice::from_raw_parts(data, len);
    std::str::from_utf8(slice).map(Some).map_err(|_| ())
}

enum Failure {
    Extract(ExtractError),
    Settings(String),
    Internal(String),
}

fn extract_and_render(
    html: &str,
    base_url: Option<Url>,
    settings_json: Option<&str>,
) -> Result<(NormalizedContent, Rendered), Failure> {
    let settings = match settings_json {
        Some(raw) => serde_json::from_str::<ReaderSettings>(raw)
            .map_err(|e| Failure::Settings(format!("invalid settings: {}", e)))?,
        None => ReaderSettings::default(),
    };

    let mut builder = Reader::builder().settings(settings);
    if let Some(url) = base_url {
        builder = builder.base_url(url);
    }
    let reader = builder.build();

    let content = reader.extract_html(html).map_err(Failure::Extract)?;
    let json = serde_json::to_string(&content)
        .map_err(|e| Failure::Internal(format!("serializing content: {}", e)))?;
    let rendered = Rendered {
        html: reader.render(&content),
        page: reader.render_page(&content),
        text: match &content {
            NormalizedContent::Tweet(t) => t.text.text.clone(),
            NormalizedContent::Article(_) => reader
                .format(&content, OutputFormat::Text)
                .map_err(|e| Failure::Internal(format!("rendering text: {}", e)))?,
        },
        json,
    };
    Ok((content, rendered))
}

// ----------------------------------------------------------------------------
// Extraction FFI functions
// ----------------------------------------------------------------------------

/// Extracts the tweet or article in an HTML document. Returns an arena-allocated view.
///
/// # Arguments
/// * `html` - HTML content bytes (UTF-8)
/// * `html_len` - Length of HTML in bytes
/// * `base_url` - Base URL bytes for relative links (UTF-8); null uses the default origin
/// * `base_url_len` - Length of base URL in bytes
/// * `settings_json` - Reader settings JSON (UTF-8); null uses defaults
/// * `settings_json_len` - Length of settings JSON in bytes
/// * `out_err` - Output error struct (may be null)
///
/// # Returns
/// Pointer to DReadxArena on success, null on failure.
/// On failure, out_err (if non-null) contains error details.
///
/// # Safety
/// Pointers must reference at least the given number of readable bytes.
/// Caller must free the returned arena via readx_free.
#[no_mangle]
pub unsafe extern "C" fn readx_extract(
    html: *const u8,
    html_len: usize,
    base_url: *const u8,
    base_url_len: usize,
    settings_json: *const u8,
    settings_json_len: usize,
    out_err: *mut DError,
) -> *mut DReadxArena {
    let html_str = match optional_str(html, html_len) {
        Ok(Some(s)) => s,
        Ok(None) => {
            set_error(out_err, DErrorCode::Invalid as u32, "html is null or empty");
            return ptr::null_mut();
        }
        Err(()) => {
            set_error(out_err, DErrorCode::Invalid as u32, "html is not valid UTF-8");
            return ptr::null_mut();
        }
    };

    let base = match optional_str(base_url, base_url_len) {
        Ok(None) => None,
        Ok(Some(raw)) => match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                let msg = format!("invalid base url: {}", e);
                set_error(out_err, DErrorCode::Invalid as u32, &msg);
                return ptr::null_mut();
            }
        },
        Err(()) => {
            set_error(out_err, DErrorCode::Invalid as u32, "base url is not valid UTF-8");
            return ptr::null_mut();
        }
    };

    let settings = match optional_str(settings_json, settings_json_len) {
        Ok(s) => s,
        Err(()) => {
            set_error(out_err, DErrorCode::Invalid as u32, "settings are not valid UTF-8");
            return ptr::null_mut();
        }
    };

    // Catch panics to avoid unwinding across FFI boundary
    let result = panic::catch_unwind(|| extract_and_render(html_str, base, settings));

    match result {
        Ok(Ok((content, rendered))) => {
            let bump = Bump::new();
            let view = make_view(&bump, &content, &rendered);
            let arena = Box::new(DReadxArena { bump, view });
            set_success(out_err);
            Box::into_raw(arena)
        }
        Ok(Err(Failure::Extract(err))) => {
            let code = map_error_code(err.code);
            let msg = format!("{} ({})", err.user_message(), err.reason());
            set_error(out_err, code, &msg);
            ptr::null_mut()
        }
        Ok(Err(Failure::Settings(msg))) => {
            set_error(out_err, DErrorCode::Settings as u32, &msg);
            ptr::null_mut()
        }
        Ok(Err(Failure::Internal(msg))) => {
            set_error(out_err, DErrorCode::Internal as u32, &msg);
            ptr::null_mut()
        }
        Err(_) => {
            set_error(out_err, DErrorCode::Internal as u32, "internal panic during extraction");
            ptr::null_mut()
        }
    }
}

/// Returns a pointer to the DReadxView inside the arena.
///
/// # Safety
/// The arena pointer must be valid and non-null.
/// The returned pointer is valid until readx_free is called.
#[no_mangle]
pub unsafe extern "C" fn readx_result(arena: *const DReadxArena) -> *const DReadxView {
    if arena.is_null() {
        return ptr::null();
    }
    (*arena).view
}

/// Frees the arena and all associated allocations.
///
/// # Safety
/// The arena pointer must be valid and must have been returned by readx_extract.
/// After this call, the arena pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn readx_free(arena: *mut DReadxArena) {
    if !arena.is_null() {
        drop(Box::from_raw(arena));
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_version() {
        assert_eq!(readx_ffi_version(), 1);
    }

    #[test]
    fn test_dstring_empty() {
        let s = DString::empty();
        assert!(s.data.is_null());
        assert_eq!(s.len, 0);
    }

    #[test]
    fn test_copy_str_to_arena() {
        let bump = Bump::new();
        let ds = copy_str_to_arena(&bump, "hello world");
        assert!(!ds.data.is_null());
        assert_eq!(ds.len, 11);
        unsafe {
            let slice = std::slice::from_raw_parts(ds.data, ds.len);
            assert_eq!(std::str::from_utf8(slice).unwrap(), "hello world");
        }
    }

    #[test]
    fn test_metric_absent_versus_zero() {
        assert_eq!(metric(None), D_METRIC_ABSENT);
        assert_eq!(metric(Some(0)), 0);
        assert_eq!(metric(Some(u64::MAX)), i64::MAX);
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            map_error_code(ErrorCode::EditorRootNotFound),
            DErrorCode::NotInitialized as u32
        );
        assert_eq!(
            map_error_code(ErrorCode::MalformedAttribute),
            DErrorCode::Section as u32
        );
    }
}
