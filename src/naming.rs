//! Filename templating engine
//!
//! Generates output file names from a template plus per-output substitution
//! values. Template tokens:
//!
//! - `[BASENAME]` — original source name, extension stripped
//! - `[CURRENTPAGE]` / `[CURRENTPAGE###]` — page number; a run of `#` sets the
//!   zero-padding width equal to the run length
//! - `[FILENUMBER]` / `[FILENUMBER###]` — sequence counter, same padding rule
//! - `[TEXT]` — free text
//!
//! Unknown bracketed tokens (and tokens whose value was not supplied) are left
//! verbatim. Generated names are sanitized for common file systems and clamped
//! so the full `name.ext` stays under 256 characters and under 256 UTF-8
//! bytes; the extension always survives the clamp.
//!
//! The generator does not enforce cross-call uniqueness; callers must supply a
//! distinguishing page or file number.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

/// Upper bound (inclusive) on generated name length, in characters and in
/// UTF-8 bytes.
const MAX_FILENAME_LENGTH: usize = 255;

// Patterns are compile-time constants, construction cannot fail.
#[allow(clippy::expect_used)]
static CURRENT_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[CURRENTPAGE(#*)\]").expect("valid page token pattern"));
#[allow(clippy::expect_used)]
static FILE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[FILENUMBER(#*)\]").expect("valid file number token pattern"));

const TEXT_TOKEN: &str = "[TEXT]";
const BASENAME_TOKEN: &str = "[BASENAME]";

/// Substitution values for one generated name
///
/// Built with a consuming builder:
///
/// ```
/// use docmill::naming::NameRequest;
///
/// let request = NameRequest::new().original_name("report").page(2);
/// ```
///
/// The output extension defaults to `pdf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRequest {
    original_name: Option<String>,
    page: Option<usize>,
    file_number: Option<usize>,
    text: Option<String>,
    extension: String,
}

impl NameRequest {
    /// Request with the default `pdf` output extension
    pub fn new() -> Self {
        Self::with_extension("pdf")
    }

    /// Request with an explicit output extension (no leading dot)
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            original_name: None,
            page: None,
            file_number: None,
            text: None,
            extension: extension.into(),
        }
    }

    /// Original source name feeding `[BASENAME]`
    #[must_use]
    pub fn original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    /// 1-based page number feeding `[CURRENTPAGE...]`
    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// 1-based file sequence number feeding `[FILENUMBER...]`
    #[must_use]
    pub fn file_number(mut self, file_number: usize) -> Self {
        self.file_number = Some(file_number);
        self
    }

    /// Free text feeding `[TEXT]`
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl Default for NameRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure templating engine turning a template plus a [`NameRequest`] into a
/// sanitized, length-bounded file name
#[derive(Clone, Debug)]
pub struct NameGenerator {
    template: String,
}

impl NameGenerator {
    /// Create a generator for the given template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Generate a file name for the given request
    ///
    /// Post-substitution rules, in order: an unconsumed page number (or,
    /// failing that, an unconsumed file number) is prefixed as `"<n>_"`; when
    /// the template carries no `[BASENAME]` token the base name is appended
    /// after the substituted template; illegal file system characters are
    /// stripped; the name is clamped under the length bound with the
    /// extension kept intact.
    pub fn generate(&self, request: &NameRequest) -> String {
        let mut name = self.template.clone();
        let mut page_consumed = false;
        let mut file_number_consumed = false;

        if let Some(page) = request.page {
            if CURRENT_PAGE.is_match(&name) {
                page_consumed = true;
                name = CURRENT_PAGE
                    .replace_all(&name, |caps: &Captures<'_>| {
                        format!("{:0width$}", page, width = caps[1].len())
                    })
                    .into_owned();
            }
        }

        if let Some(file_number) = request.file_number {
            if FILE_NUMBER.is_match(&name) {
                file_number_consumed = true;
                name = FILE_NUMBER
                    .replace_all(&name, |caps: &Captures<'_>| {
                        format!("{:0width$}", file_number, width = caps[1].len())
                    })
                    .into_owned();
            }
        }

        if let Some(text) = request.text.as_deref() {
            name = name.replace(TEXT_TOKEN, text);
        }

        if let Some(original) = request.original_name.as_deref() {
            let base = base_name(original);
            if self.template.contains(BASENAME_TOKEN) {
                name = name.replace(BASENAME_TOKEN, &base);
            } else {
                // Templates without a basename token just append the name.
                name.push_str(&base);
            }
        }

        // An unconsumed page (or file) number is what keeps plain-prefix
        // templates unique across calls.
        if let Some(page) = request.page.filter(|_| !page_consumed) {
            name = format!("{page}_{name}");
        } else if let Some(n) = request.file_number.filter(|_| !file_number_consumed) {
            name = format!("{n}_{name}");
        }

        clamp_with_extension(&sanitize(&name), &request.extension)
    }
}

/// Original name with directories and the final extension stripped
/// (`dir/file.tar.gz` becomes `file.tar`)
fn base_name(original: &str) -> String {
    Path::new(original)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Strip characters illegal on common file systems, plus control characters
fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| {
            !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control()
        })
        .collect()
}

/// Clamp the stem so `stem.ext` fits the length bound in both characters and
/// UTF-8 bytes, truncating from the end without splitting a code point
fn clamp_with_extension(stem: &str, extension: &str) -> String {
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };
    let max_chars = MAX_FILENAME_LENGTH.saturating_sub(suffix.chars().count());
    let max_bytes = MAX_FILENAME_LENGTH.saturating_sub(suffix.len());

    let mut clamped = String::with_capacity(stem.len().min(max_bytes));
    let mut chars = 0usize;
    for c in stem.chars() {
        if chars == max_chars || clamped.len() + c.len_utf8() > max_bytes {
            break;
        }
        clamped.push(c);
        chars += 1;
    }
    format!("{clamped}{suffix}")
}
