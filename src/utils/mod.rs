// pixeltune/src/utils/mod.rs
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::Path;
use std::time::SystemTime;

pub const DOWNLOAD_PREFIX: &str = "pixeltune";

/// `pixeltune-<millis>.<ext>`
pub fn download_file_name(unix_millis: u128, extension: &str) -> String {
    format!("{}-{}.{}", DOWNLOAD_PREFIX, unix_millis, extension)
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as i32).clamp(0, 5);
    let size = bytes_f64 / base.powi(exponent);

    format!("{:.2} {}", size, UNITS[exponent as usize])
}

/// Whole-percent reduction from `before` to `after`.
pub fn savings_percent(before: u64, after: u64) -> Option<i64> {
    if before == 0 {
        return None;
    }
    Some(((1.0 - after as f64 / before as f64) * 100.0).round() as i64)
}

pub fn calculate_aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        0.0
    } else {
        width as f32 / height as f32
    }
}

/// Inline `data:` URL for showing or saving encoded bytes.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// Media type a file picker would declare for `path`, judged by extension.
/// Empty when the extension is unknown.
pub fn declared_media_type(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if let Some(format) = image::ImageFormat::from_extension(&extension) {
        return format.to_mime_type().to_string();
    }

    match extension.as_str() {
        "txt" | "md" | "log" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => "",
    }
    .to_string()
}
