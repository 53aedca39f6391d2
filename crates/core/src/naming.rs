//! Local file names for downloaded videos.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Extensions accepted as-is; anything else gets `.mp4` appended.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "webm", "avi", "mpg", "mpeg"];

const DEFAULT_EXTENSION: &str = "mp4";
const DEFAULT_STEM: &str = "video";

/// Reduce a remote file name to a safe local one.
///
/// Keeps alphanumerics plus `.`, `_` and `-`, trims trailing dots, and
/// appends `.mp4` unless the result already ends in a known video
/// extension.
pub fn sanitize_file_name(name: &str) -> String {
    let mut clean: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    while clean.ends_with('.') {
        clean.pop();
    }

    if clean.is_empty() {
        clean.push_str(DEFAULT_STEM);
    }

    if !has_video_extension(&clean) {
        clean.push('.');
        clean.push_str(DEFAULT_EXTENSION);
    }

    clean
}

fn has_video_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => VIDEO_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

/// Staging path `<dir>/<prefix>_<YYYYmmdd_HHMMSS>_<sanitized name>`.
pub fn staging_path(dir: &Path, prefix: &str, now: NaiveDateTime, name: &str) -> PathBuf {
    dir.join(format!(
        "{}_{}_{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        sanitize_file_name(name)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sanitize_strips_punctuation_and_spaces() {
        assert_eq!(
            sanitize_file_name("My Farm Video!! (final).mp4"),
            "MyFarmVideofinal.mp4"
        );
    }

    #[test]
    fn test_sanitize_keeps_allowed_symbols() {
        assert_eq!(sanitize_file_name("clip_01-b.mov"), "clip_01-b.mov");
    }

    #[test]
    fn test_sanitize_appends_extension() {
        assert_eq!(sanitize_file_name("harvest day"), "harvestday.mp4");
        assert_eq!(sanitize_file_name("notes.txt"), "notes.txt.mp4");
        assert_eq!(sanitize_file_name("trailing..."), "trailing.mp4");
    }

    #[test]
    fn test_sanitize_extension_case_insensitive() {
        assert_eq!(sanitize_file_name("BIG.MP4"), "BIG.MP4");
    }

    #[test]
    fn test_sanitize_empty_or_symbol_only() {
        assert_eq!(sanitize_file_name(""), "video.mp4");
        assert_eq!(sanitize_file_name("!!! ???"), "video.mp4");
        assert_eq!(sanitize_file_name(".mp4"), ".mp4.mp4");
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_file_name("Traktör 2.mp4"), "Traktör2.mp4");
    }

    #[test]
    fn test_sanitize_always_ends_in_video_extension() {
        for name in ["a", "b.", "c.mp4", "d e f", "(x)", "y.tar.gz", "z.MKV"] {
            let clean = sanitize_file_name(name);
            assert!(has_video_extension(&clean), "{} -> {}", name, clean);
            assert!(clean
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-')));
        }
    }

    #[test]
    fn test_staging_path() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap();
        let path = staging_path(Path::new("/tmp"), "drivetube", now, "v1 (1).mp4");
        assert_eq!(
            path,
            PathBuf::from("/tmp/drivetube_20240502_140309_v11.mp4")
        );
    }
}
