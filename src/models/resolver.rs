//! On-disk model resolution.
//!
//! Maps a requested model name ("base", "small.en") to an actual file in the
//! models directory. Users download models out of band and the files on disk
//! rarely match the requested name exactly: quantized variants and
//! English-only builds are common, so resolution tries a fixed ladder of
//! filename variations before falling back to a prefix scan.

use crate::error::{Result, SubgenError};
use std::fs;
use std::path::{Path, PathBuf};

/// Filename variations tried in order for a requested model `m`.
fn candidate_names(model: &str) -> Vec<String> {
    vec![
        format!("{model}.bin"),
        format!("{model}.en.bin"),
        format!("{model}-q5_0.bin"),
        format!("{model}-q5_1.bin"),
        format!("{model}.en-q5_0.bin"),
        format!("{model}.en-q5_1.bin"),
    ]
}

/// Partially-downloaded files must never resolve.
fn is_temp_artifact(name: &str) -> bool {
    name.ends_with(".tmp") || name.ends_with(".part") || name.contains(".$$")
}

/// Resolve a requested model name to a model file path.
///
/// Tries exact filename variations first, then any `.bin` file whose name
/// starts with the requested model, preferring the shortest match (so "base"
/// prefers `base-q5_1.bin` over `base-whatever-longer.bin` but never steals
/// an exact hit from the ladder). A trailing `.bin` on the request is
/// tolerated.
pub fn resolve_model(models_dir: &Path, requested: &str) -> Result<PathBuf> {
    let model = requested.strip_suffix(".bin").unwrap_or(requested);

    for name in candidate_names(model) {
        let path = models_dir.join(&name);
        if path.is_file() {
            return Ok(path);
        }
    }

    // Prefix scan over whatever is actually in the directory
    let mut fallback: Option<(String, PathBuf)> = None;
    for name in bin_files(models_dir) {
        if !name.starts_with(model) || is_temp_artifact(&name) {
            continue;
        }
        let path = models_dir.join(&name);
        match &fallback {
            Some((best, _)) if best.len() <= name.len() => {}
            _ => fallback = Some((name, path)),
        }
    }
    if let Some((_, path)) = fallback {
        return Ok(path);
    }

    Err(SubgenError::ModelNotFound {
        requested: requested.to_string(),
        available: available_models(models_dir),
    })
}

/// Model names present on disk (stems of non-temp `.bin` files), sorted.
pub fn available_models(models_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = bin_files(models_dir)
        .into_iter()
        .filter(|name| !is_temp_artifact(name))
        .filter_map(|name| name.strip_suffix(".bin").map(str::to_string))
        .collect();
    names.sort();
    names
}

fn bin_files(models_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.ends_with(".bin"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn models_dir(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            File::create(dir.path().join(file)).unwrap();
        }
        dir
    }

    #[test]
    fn test_exact_match() {
        let dir = models_dir(&["base.bin", "small.bin"]);
        let path = resolve_model(dir.path(), "base").unwrap();
        assert_eq!(path.file_name().unwrap(), "base.bin");
    }

    #[test]
    fn test_english_variant_fallback() {
        let dir = models_dir(&["base.en.bin"]);
        let path = resolve_model(dir.path(), "base").unwrap();
        assert_eq!(path.file_name().unwrap(), "base.en.bin");
    }

    #[test]
    fn test_quantized_variant_fallback() {
        let dir = models_dir(&["small-q5_1.bin"]);
        let path = resolve_model(dir.path(), "small").unwrap();
        assert_eq!(path.file_name().unwrap(), "small-q5_1.bin");
    }

    #[test]
    fn test_ladder_order_prefers_plain_over_quantized() {
        let dir = models_dir(&["base-q5_0.bin", "base.en.bin", "base.bin"]);
        let path = resolve_model(dir.path(), "base").unwrap();
        assert_eq!(path.file_name().unwrap(), "base.bin");
    }

    #[test]
    fn test_prefix_scan_prefers_shortest() {
        let dir = models_dir(&["large-v3-turbo.bin", "large-v3.bin"]);
        let path = resolve_model(dir.path(), "large").unwrap();
        assert_eq!(path.file_name().unwrap(), "large-v3.bin");
    }

    #[test]
    fn test_trailing_bin_suffix_tolerated() {
        let dir = models_dir(&["base.bin"]);
        let path = resolve_model(dir.path(), "base.bin").unwrap();
        assert_eq!(path.file_name().unwrap(), "base.bin");
    }

    #[test]
    fn test_temp_artifacts_never_resolve() {
        let dir = models_dir(&["base-v1.bin.tmp", "base-v1.bin.part"]);
        assert!(resolve_model(dir.path(), "base").is_err());
    }

    #[test]
    fn test_not_found_lists_available() {
        let dir = models_dir(&["tiny.bin", "small.en.bin", "partial.bin.tmp"]);
        match resolve_model(dir.path(), "large") {
            Err(SubgenError::ModelNotFound {
                requested,
                available,
            }) => {
                assert_eq!(requested, "large");
                assert_eq!(available, vec!["small.en".to_string(), "tiny".to_string()]);
            }
            other => panic!("expected ModelNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_dir_is_not_found_with_empty_available() {
        match resolve_model(Path::new("/nonexistent/models"), "base") {
            Err(SubgenError::ModelNotFound { available, .. }) => {
                assert!(available.is_empty());
            }
            other => panic!("expected ModelNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_non_bin_files_ignored() {
        let dir = models_dir(&["base.txt", "README.md"]);
        assert!(resolve_model(dir.path(), "base").is_err());
    }
}
