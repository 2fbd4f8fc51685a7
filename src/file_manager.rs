//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file video.
//!
//! ## Responsabilità:
//! - Riconoscimento dei formati video supportati
//! - Discovery dei video in una directory (per la selezione interattiva)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Video**: MP4, MOV, AVI, MKV, WebM, M4V

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Check if a file is a video
    pub fn is_video(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext_lower.as_str())
        } else {
            false
        }
    }

    /// Video files directly inside `dir`, sorted by name
    pub fn find_video_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_video(path))
            .collect();

        files.sort();
        files
    }

    /// Size of a file on disk, if readable
    pub fn file_size(path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
