//! JSON document load and save with atomic replacement.

use crate::Result;
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     store";

/// Load a document from a file
pub fn load<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let file = File::open(path).into_app_err_with(|| format!("unable to open file '{}'", path.display()))?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader).into_app_err_with(|| format!("unable to parse file '{}'", path.display()))?;

    log::debug!(target: LOG_TARGET, "Loaded '{}'", path.display());
    Ok(data)
}

/// Load a document, or the default value when the file does not exist yet
pub fn load_or_default<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(_) => load(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!(target: LOG_TARGET, "No document at '{}', starting empty", path.display());
            Ok(T::default())
        }
        Err(e) => Err(e).into_app_err_with(|| format!("unable to access file '{}'", path.display())),
    }
}

/// Save a document to a file.
///
/// The document is written next to its destination and renamed over it, so readers only ever see
/// the previous or the new complete document.
pub fn save<T>(data: &T, path: impl AsRef<Path>) -> Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{}'", parent.display()))?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path).into_app_err_with(|| format!("unable to create file '{}'", temp_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data).into_app_err_with(|| format!("unable to write file '{}'", temp_path.display()))?;
    writer
        .flush()
        .into_app_err_with(|| format!("unable to flush file '{}'", temp_path.display()))?;
    writer
        .get_ref()
        .sync_all()
        .into_app_err_with(|| format!("unable to sync file '{}'", temp_path.display()))?;

    fs::rename(&temp_path, path).into_app_err_with(|| format!("unable to replace file '{}'", path.display()))?;

    log::debug!(target: LOG_TARGET, "Saved '{}'", path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: u64,
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_and_load_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("nested").join("doc.json");

        let original = TestData {
            name: "test".to_string(),
            value: 42,
        };

        save(&original, &file_path).unwrap();
        assert!(file_path.exists());
        assert!(!temp_path_for(&file_path).exists());

        let loaded: TestData = load(&file_path).unwrap();
        assert_eq!(original, loaded);

        let text = fs::read_to_string(&file_path).unwrap();
        assert!(text.contains("\n  \"name\""));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_replaces_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("doc.json");
        fs::write(&file_path, "stale").unwrap();

        save(&TestData { name: "fresh".to_string(), value: 1 }, &file_path).unwrap();
        let loaded: TestData = load(&file_path).unwrap();
        assert_eq!(loaded.name, "fresh");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result: Result<TestData> = load("/nonexistent/path/file.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unable to open"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_or_default_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loaded: TestData = load_or_default(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, TestData::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.json");
        fs::write(&file_path, "not valid json").unwrap();

        let result: Result<TestData> = load_or_default(&file_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unable to parse"));
    }
}
