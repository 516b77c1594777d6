//! Path utilities for extensions, folders, and style variants.
//!
//! These helpers work on plain strings because attachment paths are stored as
//! record attribute values. Both `/` and `\` count as separators.

/// Extension of the final path segment: the text after its last dot.
///
/// Returns an empty string when the segment has no dot.
///
/// # Examples
///
/// ```
/// use attachforge_common::paths::extension;
///
/// assert_eq!(extension("photo.JPG"), "JPG");
/// assert_eq!(extension("archive.tar.gz"), "gz");
/// assert_eq!(extension("uploads.v2/README"), "");
/// ```
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => "",
    }
}

/// Everything up to and including the final separator.
///
/// # Examples
///
/// ```
/// use attachforge_common::paths::parent_folder;
///
/// assert_eq!(parent_folder("uploads/Post/5.jpg"), "uploads/Post/");
/// assert_eq!(parent_folder("5.jpg"), "");
/// ```
pub fn parent_folder(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(sep) => &path[..=sep],
        None => "",
    }
}

/// Path of a style variant: `-<style>` inserted before the extension.
///
/// Paths without an extension get the suffix appended.
///
/// # Examples
///
/// ```
/// use attachforge_common::paths::variant_path;
///
/// assert_eq!(variant_path("uploads/Model/5.jpg", "thumb"), "uploads/Model/5-thumb.jpg");
/// assert_eq!(variant_path("uploads/Model/5", "thumb"), "uploads/Model/5-thumb");
/// ```
pub fn variant_path(base: &str, style: &str) -> String {
    let folder_len = parent_folder(base).len();
    match base[folder_len..].rfind('.') {
        Some(dot) => {
            let split = folder_len + dot;
            format!("{}-{}{}", &base[..split], style, &base[split..])
        }
        None => format!("{}-{}", base, style),
    }
}

fn file_name(path: &str) -> &str {
    &path[parent_folder(path).len()..]
}
