//! Image URL rewriting and file name derivation.
//!
//! Everything here is a pure function of its inputs; no network or
//! filesystem access.

use url::Url;

use crate::catalog::RecordId;

/// Path segment of full-resolution image URLs.
pub const ORIGINAL_SEGMENT: &str = "/original/";

/// Path segment of the display-resolution rendition.
pub const DISPLAY_SEGMENT: &str = "/web-large/";

/// Extension used when neither the response nor the URL names an image type.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Rewrites a full-resolution image URL to its display-resolution rendition.
///
/// URLs without the full-resolution segment are returned unchanged.
///
/// # Examples
///
/// ```
/// use harvester_core::download::display_image_url;
///
/// assert_eq!(
///     display_image_url("https://images.example.org/CRDImages/ep/original/DT1567.jpg"),
///     "https://images.example.org/CRDImages/ep/web-large/DT1567.jpg"
/// );
/// assert_eq!(display_image_url(""), "");
/// ```
#[must_use]
pub fn display_image_url(original_url: &str) -> String {
    original_url.replace(ORIGINAL_SEGMENT, DISPLAY_SEGMENT)
}

/// Guesses an image extension from a `Content-Type` header value.
pub(crate) fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/gif" => Some(".gif"),
        "image/webp" => Some(".webp"),
        "image/tiff" => Some(".tif"),
        _ => None,
    }
}

/// Guesses an image extension from the last path segment of a URL.
pub(crate) fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;

    match last_segment[dot_index..].to_lowercase().as_str() {
        ".jpg" | ".jpeg" => Some(".jpg"),
        ".png" => Some(".png"),
        ".gif" => Some(".gif"),
        ".webp" => Some(".webp"),
        ".tif" | ".tiff" => Some(".tif"),
        _ => None,
    }
}

/// Picks the extension for a downloaded image.
///
/// The declared content type wins, then the URL's extension, then
/// [`DEFAULT_EXTENSION`]. This never fails.
#[must_use]
pub fn choose_extension(content_type: Option<&str>, url: &str) -> &'static str {
    content_type
        .and_then(extension_from_content_type)
        .or_else(|| extension_from_url(url))
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Returns the deterministic file name for a record's image.
#[must_use]
pub fn image_filename(id: RecordId, extension: &str) -> String {
    format!("{id}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_image_url_rewrites_original_segment() {
        assert_eq!(
            display_image_url("https://images.example.org/CRDImages/as/original/DP251139.jpg"),
            "https://images.example.org/CRDImages/as/web-large/DP251139.jpg"
        );
    }

    #[test]
    fn test_display_image_url_leaves_other_urls_alone() {
        let url = "https://images.example.org/CRDImages/as/web-large/DP251139.jpg";
        assert_eq!(display_image_url(url), url);
    }

    #[test]
    fn test_extension_from_content_type_with_parameters() {
        assert_eq!(
            extension_from_content_type("image/png; charset=binary"),
            Some(".png")
        );
        assert_eq!(extension_from_content_type("IMAGE/JPEG"), Some(".jpg"));
        assert_eq!(extension_from_content_type("application/octet-stream"), None);
    }

    #[test]
    fn test_extension_from_url_normalizes_jpeg() {
        assert_eq!(
            extension_from_url("https://images.example.org/web-large/a.JPEG"),
            Some(".jpg")
        );
        assert_eq!(
            extension_from_url("https://images.example.org/web-large/a.tiff"),
            Some(".tif")
        );
    }

    #[test]
    fn test_extension_from_url_ignores_query_and_unknown() {
        assert_eq!(
            extension_from_url("https://images.example.org/a.png?size=large"),
            Some(".png")
        );
        assert_eq!(extension_from_url("https://images.example.org/a.bin"), None);
        assert_eq!(extension_from_url("https://images.example.org/image"), None);
        assert_eq!(extension_from_url("not a url"), None);
    }

    #[test]
    fn test_choose_extension_prefers_content_type() {
        assert_eq!(
            choose_extension(Some("image/png"), "https://images.example.org/a.jpg"),
            ".png"
        );
    }

    #[test]
    fn test_choose_extension_falls_back_to_url() {
        assert_eq!(
            choose_extension(
                Some("application/octet-stream"),
                "https://images.example.org/a.gif"
            ),
            ".gif"
        );
        assert_eq!(
            choose_extension(None, "https://images.example.org/a.png"),
            ".png"
        );
    }

    #[test]
    fn test_choose_extension_defaults_to_jpg() {
        assert_eq!(
            choose_extension(Some("text/html"), "https://images.example.org/image"),
            DEFAULT_EXTENSION
        );
        assert_eq!(choose_extension(None, ""), DEFAULT_EXTENSION);
    }

    #[test]
    fn test_image_filename_uses_id_and_extension() {
        assert_eq!(image_filename(436_535, ".png"), "436535.png");
    }
}
