// ============================================================
// Layer 6 — Config Store
// ============================================================
// Saves and loads model configurations and vocabularies as
// pretty-printed JSON.
//
// Burn's #[derive(Config)] already provides Serialize and
// Deserialize, so any model config round-trips through
// serde_json without extra glue.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::vocabulary::Vocabulary;

/// Write any serialisable config to `path`, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

    tracing::debug!("Saved JSON to '{}'", path.display());
    Ok(())
}

/// Read a JSON config from `path`.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed JSON in '{}'", path.display()))
}

/// Load `path` when given, otherwise fall back to `default`.
pub fn load_or_default<T, F>(path: Option<&PathBuf>, default: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match path {
        Some(p) => {
            tracing::info!("Loading config from '{}'", p.display());
            load_json(p)
        }
        None => {
            tracing::info!("No config given, using built-in defaults");
            Ok(default())
        }
    }
}

/// Load a vocabulary; the special tokens and uniqueness are checked on parse.
pub fn load_vocabulary(path: impl AsRef<Path>) -> Result<Vocabulary> {
    load_json(path)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::SentenceDecoder;
    use crate::ml::caption::CaptionConfig;
    use crate::ml::keypoints::KeypointNetConfig;

    #[test]
    fn test_keypoint_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/keypoints.json");
        let cfg  = KeypointNetConfig::standard().with_batch_norm(true);

        save_json(&cfg, &path).unwrap();
        let back: KeypointNetConfig = load_json(&path).unwrap();
        assert_eq!(back.channels, vec![1, 32, 64]);
        assert!(back.batch_norm);
        assert_eq!(back.flattened_size().unwrap(), 28224);
    }

    #[test]
    fn test_caption_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("caption.json");
        save_json(&CaptionConfig::standard(500), &path).unwrap();
        let back: CaptionConfig = load_json(&path).unwrap();
        assert_eq!(back.decoder.vocab_size, 500);
        assert_eq!(back.encoder.backbone.layers, [3, 4, 6, 3]);
    }

    #[test]
    fn test_load_or_default_without_path() {
        let cfg: KeypointNetConfig =
            load_or_default(None, KeypointNetConfig::standard).unwrap();
        assert_eq!(cfg.num_keypoints, 68);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_json::<KeypointNetConfig>(&missing).is_err());
    }

    #[test]
    fn test_vocabulary_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        save_json(&Vocabulary::from_words(["a", "man", "riding"]), &path).unwrap();

        let vocab = load_vocabulary(&path).unwrap();
        assert_eq!(vocab.id("man"), 4);
        assert_eq!(vocab.decode(&[0, 3, 4, 5, 1]), "a man riding");
    }

    #[test]
    fn test_malformed_vocabulary_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, r#"["a", "<start>", "<end>", "<unk>"]"#).unwrap();
        assert!(load_vocabulary(&path).is_err());
    }
}
