use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exif::ExifRecord;
use crate::ucs2;

const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level configuration for the round-trip checker.
///
/// Controls which comment values are embedded and where the fixture and
/// output artifacts live.
///
/// # Loading
///
/// ```rust,no_run
/// use comment_roundtrip::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.comments.user_comment = "Checked by CI".into();
/// config.files.root = "/tmp/work".into();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values written into the image and expected back.
    pub comments: CommentSet,
    /// Fixture and artifact locations.
    pub files: FileConfig,
}

/// The three comment fields exercised by every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSet {
    /// IFD0 ImageDescription (ASCII).
    pub image_description: String,
    /// Exif UserComment.
    pub user_comment: String,
    /// IFD0 XPComment, stored as null-terminated UCS-2.
    pub xp_comment: String,
}

impl Default for CommentSet {
    fn default() -> Self {
        Self {
            image_description: "My Image Description".to_string(),
            user_comment: "My User Comment".to_string(),
            xp_comment: "My XP Comment".to_string(),
        }
    }
}

impl CommentSet {
    /// Build the EXIF record carrying these comments.
    pub fn to_record(&self) -> ExifRecord {
        let mut record = ExifRecord::default();
        record.zeroth.image_description = Some(self.image_description.clone());
        record.zeroth.xp_comment = Some(ucs2::encode(&self.xp_comment));
        record.exif.user_comment = Some(self.user_comment.clone());
        record
    }
}

/// File locations. Relative paths are resolved against `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub root: PathBuf,
    /// Metadata-free JPEG used as the JPEG base image.
    pub jpeg_fixture: PathBuf,
    pub png_output: PathBuf,
    pub jpeg_output: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            jpeg_fixture: PathBuf::from("tests/files/noexif.jpg"),
            png_output: PathBuf::from("tests/files/out_comments.png"),
            jpeg_output: PathBuf::from("tests/files/out_comments.jpg"),
        }
    }
}

impl FileConfig {
    /// Join `path` onto `root` unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Config {
    /// `config.json` in the directory holding the running binary.
    pub fn config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Cannot locate the running executable")?;
        Ok(exe.with_file_name(CONFIG_FILE_NAME))
    }

    fn target(path: Option<&Path>) -> Result<PathBuf> {
        path.map_or_else(Self::config_path, |p| Ok(p.to_path_buf()))
    }

    /// Read the config at `path` (or [`Config::config_path`]). A missing file
    /// yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::target(path)?;
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {}, running with default comments", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read {}", path.display()));
            }
        };
        serde_json::from_slice(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Write the config as pretty JSON, creating the parent directory.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::target(path)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, json).with_context(|| format!("Cannot write {}", path.display()))?;
        log::info!("Wrote config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_comments() {
        let config = Config::default();
        assert_eq!(config.comments.image_description, "My Image Description");
        assert_eq!(config.comments.user_comment, "My User Comment");
        assert_eq!(config.comments.xp_comment, "My XP Comment");
    }

    #[test]
    fn to_record_places_fields_in_their_ifds() {
        let record = CommentSet::default().to_record();
        assert_eq!(record.zeroth.image_description.as_deref(), Some("My Image Description"));
        assert_eq!(record.exif.user_comment.as_deref(), Some("My User Comment"));
        assert_eq!(record.zeroth.xp_comment, Some(ucs2::encode("My XP Comment")));
        assert!(record.zeroth.software.is_none());
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let mut files = FileConfig::default();
        files.root = PathBuf::from("/work");
        assert_eq!(
            files.resolve(&files.png_output),
            PathBuf::from("/work/tests/files/out_comments.png")
        );
        assert_eq!(files.resolve(Path::new("/abs/x.jpg")), PathBuf::from("/abs/x.jpg"));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.comments.xp_comment = "Überprüft".into();
        config.files.root = dir.path().to_path_buf();

        config.save(Some(&path)).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper").join(CONFIG_FILE_NAME);
        Config::default().save(Some(&path)).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn config_path_is_next_to_binary() {
        let path = Config::config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
        assert_eq!(path.parent(), std::env::current_exe().unwrap().parent());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"comments": {"user_comment": "custom"}}"#).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.comments.user_comment, "custom");
        assert_eq!(loaded.comments.image_description, "My Image Description");
        assert_eq!(loaded.files, FileConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
