// image-compressor/src/utils/mod.rs
use image::ImageFormat;
use std::path::Path;

const SUPPORTED_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp",
];

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn is_supported_format(path: &Path) -> bool {
    get_file_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// Format implied by a file extension, case-insensitive.
pub fn format_from_extension(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension.to_lowercase())
}

/// Format implied by a MIME type; parameters after `;` are ignored.
pub fn format_from_mime(mime_type: &str) -> Option<ImageFormat> {
    let parsed: mime::Mime = mime_type.trim().parse().ok()?;
    if parsed.type_() != mime::IMAGE {
        return None;
    }
    ImageFormat::from_mime_type(parsed.essence_str())
}

/// Builds a `file://` URI, percent-encoding every path segment.
pub fn path_to_file_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let raw = absolute.to_string_lossy().replace('\\', "/");
    let encoded: Vec<String> = raw
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let joined = encoded.join("/");

    if joined.starts_with('/') {
        format!("file://{}", joined)
    } else {
        format!("file:///{}", joined)
    }
}
