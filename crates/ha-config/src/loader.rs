//! YAML document loading and writing
//!
//! A [`YamlDocument`] keeps the raw source next to the parsed value so that
//! callers can either re-serialize the value or edit the text in place.

use crate::error::{ConfigError, ConfigResult};
use crate::outline::Outline;
use glob::Pattern;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// File-name pattern that is always scanned in directory mode
const YML_PATTERN: &str = "*.yml";

/// Infix marking files written by a previous conversion
const OUTPUT_INFIX: &str = ".new";

/// A parsed YAML file together with its original text
#[derive(Debug, Clone)]
pub struct YamlDocument {
    /// Where the document came from (a file path or a placeholder name)
    path: PathBuf,
    /// Source text exactly as read
    source: String,
    /// Parsed document
    value: Value,
}

impl YamlDocument {
    /// Read and parse a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading YAML file: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let source = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(source, path)
    }

    /// Parse YAML from a string, naming it `source_name` in errors
    pub fn parse(source: impl Into<String>, source_name: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = source.into();
        let path = source_name.as_ref().to_path_buf();

        let value: Value = serde_yaml::from_str(&source).map_err(|e| ConfigError::ParseYaml {
            path: path.clone(),
            source: e,
        })?;
        trace!("Parsed {:?}: {:?}", path, value);

        Ok(Self {
            path,
            source,
            value,
        })
    }

    /// Build the outline of the source text
    pub fn outline(&self) -> ConfigResult<Outline> {
        Outline::parse(&self.source)
    }

    /// Path or name the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Serialize a value as block-style YAML
pub fn to_yaml_string(value: &Value) -> ConfigResult<String> {
    serde_yaml::to_string(value).map_err(ConfigError::SerializeYaml)
}

/// Write `contents` to `path` through a temporary file and a rename
pub fn write_atomic(path: impl AsRef<Path>, contents: &str) -> ConfigResult<()> {
    let path = path.as_ref();
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, contents).map_err(|e| ConfigError::WriteFile {
        path: temp.clone(),
        source: e,
    })?;

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        ConfigError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Default output path for a converted file: `name.yaml` becomes `name.new.yaml`
///
/// A `.yml` extension is kept; anything else gets `.yaml`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let ext = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yml") => ext,
        _ => "yaml",
    };
    input.with_extension(format!("new.{}", ext))
}

/// Whether a file looks like the output of an earlier conversion
pub fn is_output_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(OUTPUT_INFIX))
        .unwrap_or(false)
}

/// List the YAML files of a directory whose names match `pattern`, sorted by name
///
/// `*.yml` files are always included. The scan is not recursive and skips
/// files produced by a previous conversion.
pub fn find_yaml_files(dir: &Path, pattern: &str) -> ConfigResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConfigError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let pattern = Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source: e,
    })?;
    let yml = Pattern::new(YML_PATTERN).map_err(|e| ConfigError::InvalidPattern {
        pattern: YML_PATTERN.to_string(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ConfigError::ReadFile {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| pattern.matches(name) || yml.matches(name))
                .unwrap_or(false)
        })
        .filter(|path| {
            let skip = is_output_file(path);
            if skip {
                trace!("Skipping previous output {:?}", path);
            }
            !skip
        })
        .collect();

    files.sort();
    debug!("Found {} YAML files in {:?}", files.len(), dir);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_keeps_source() {
        let dir = TempDir::new().unwrap();
        let text = "# lights\n- alias: Test\n  trigger: []\n";
        write_file(dir.path(), "automations.yaml", text);

        let doc = YamlDocument::load(dir.path().join("automations.yaml")).unwrap();
        assert_eq!(doc.source(), text);
        assert!(doc.value().is_sequence());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = YamlDocument::load(dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = YamlDocument::parse("key: [unclosed", "broken.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_parse_keeps_unknown_tags() {
        let doc = YamlDocument::parse("automation: !include automations.yaml\n", "c.yaml").unwrap();
        let section = doc.value().get("automation").unwrap();
        assert!(matches!(section, Value::Tagged(_)));
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/config/automations.yaml")),
            PathBuf::from("/config/automations.new.yaml")
        );
        assert_eq!(
            output_path_for(Path::new("lights.yml")),
            PathBuf::from("lights.new.yml")
        );
        assert_eq!(
            output_path_for(Path::new("automations")),
            PathBuf::from("automations.new.yaml")
        );
    }

    #[test]
    fn test_is_output_file() {
        assert!(is_output_file(Path::new("a.new.yaml")));
        assert!(is_output_file(Path::new("a.new.yml")));
        assert!(!is_output_file(Path::new("a.yaml")));
        assert!(!is_output_file(Path::new("renew.yaml")));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.yaml");
        write_file(dir.path(), "out.yaml", "old: 1\n");

        write_atomic(&path, "new: 2\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new: 2\n");
        assert!(!dir.path().join("out.yaml.tmp").exists());
    }

    #[test]
    fn test_find_yaml_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.yaml", "");
        write_file(dir.path(), "a.yaml", "");
        write_file(dir.path(), "c.yml", "");
        write_file(dir.path(), "a.new.yaml", "");
        write_file(dir.path(), "notes.txt", "");
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let files = find_yaml_files(dir.path(), "*.yaml").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml", "c.yml"]);
    }

    #[test]
    fn test_find_yaml_files_with_pattern() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "auto_lights.yaml", "");
        write_file(dir.path(), "scripts.yaml", "");

        let files = find_yaml_files(dir.path(), "auto_*.yaml").unwrap();
        assert_eq!(files, vec![dir.path().join("auto_lights.yaml")]);
    }

    #[test]
    fn test_find_yaml_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = find_yaml_files(&dir.path().join("nope"), "*.yaml");
        assert!(matches!(result, Err(ConfigError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_find_yaml_files_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let result = find_yaml_files(dir.path(), "[");
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
