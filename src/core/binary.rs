//! Extension-based binary detection
//!
//! No content sniffing: a file is binary when its lowercased extension is in
//! a fixed set. Growing the set is a data change only.

use std::path::Path;

const BINARY_EXTENSIONS: &[&str] = &[
    // Compiled
    "so", "o", "a", "dll", "exe",
    // Archives
    "zip", "gz", "tar", "bz2", "7z", "rar", "ar",
    // Images
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "ico", "webp",
    // Audio/Video
    "mp3", "wav", "flac", "ogg", "mp4", "avi", "mov", "mkv", "webm",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // Fonts
    "woff", "woff2", "eot", "ttf", "otf",
    // Generic binary / databases
    "bin", "dat", "iso", "img", "dmg", "db",
];

/// True when the file name carries a known binary extension
pub fn is_binary_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
