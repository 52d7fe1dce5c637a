use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vellum_model::{CORE_OWNER, MarkKind, MarkRegistry, MarkSpec};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid mark {name:?} in config: {reason}")]
    InvalidMark { name: String, reason: &'static str },
}

/// A mark declared in the config file, or an override of a built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkConfig {
    pub name: String,
    /// Nesting priority; higher is written further out. Defaults to the
    /// kind's own priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Element the mark is written as, instead of `<span data-mark>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Actor recorded on steps and owner given to marks set from the CLI.
    #[serde(default = "default_owner")]
    pub default_owner: String,
    /// `env_logger` filter, e.g. `"vellum_model=debug"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Directory that relative document paths are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
    #[serde(default)]
    pub marks: Vec<MarkConfig>,
}

fn default_owner() -> String {
    CORE_OWNER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_owner: default_owner(),
            log_filter: None,
            documents_path: None,
            marks: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        // Expand shell variables and tilde in the documents directory
        config.documents_path = config
            .documents_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/vellum");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for mark in &self.marks {
            let invalid = |reason| ConfigError::InvalidMark {
                name: mark.name.clone(),
                reason,
            };
            if mark.name.trim().is_empty() {
                return Err(invalid("name is empty"));
            }
            if mark.name.contains([',', '@']) {
                return Err(invalid("name may not contain ',' or '@'"));
            }
            if mark.tag.as_deref().is_some_and(|tag| tag.trim().is_empty()) {
                return Err(invalid("tag is empty"));
            }
        }
        Ok(())
    }

    /// The built-in marks plus the ones declared here. A declared mark with
    /// a built-in name overrides that mark's priority.
    pub fn registry(&self) -> MarkRegistry {
        let mut registry = MarkRegistry::default();
        for mark in &self.marks {
            let kind = MarkKind::from_name(&mark.name);
            let spec = match mark.priority {
                Some(priority) => MarkSpec::with_priority(kind, priority),
                None => MarkSpec::new(kind),
            };
            registry.register(spec);
        }
        registry
    }

    /// `(mark name, tag)` for every declared mark with its own element.
    pub fn mark_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.marks
            .iter()
            .filter_map(|mark| Some((mark.name.as_str(), mark.tag.as_deref()?)))
    }

    /// Resolve a document path against `documents_path` when relative.
    pub fn resolve_document(&self, path: &Path) -> PathBuf {
        match &self.documents_path {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config {
            default_owner: "cli".to_string(),
            log_filter: Some("vellum_model=debug".to_string()),
            documents_path: Some(PathBuf::from("/tmp/docs")),
            marks: vec![
                MarkConfig {
                    name: "comment".to_string(),
                    priority: Some(600),
                    tag: Some("mark".to_string()),
                },
                MarkConfig {
                    name: "bold".to_string(),
                    priority: Some(900),
                    tag: None,
                },
            ],
        }
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/vellum/config.toml"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_owner, CORE_OWNER);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = sample();

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_marks_table_syntax() {
        let config: Config = toml::from_str(
            r#"
default_owner = "me"

[[marks]]
name = "comment"
tag = "mark"

[[marks]]
name = "italic"
priority = 50
"#,
        )
        .unwrap();

        assert_eq!(config.default_owner, "me");
        assert_eq!(config.mark_tags().collect::<Vec<_>>(), vec![("comment", "mark")]);
        let registry = config.registry();
        assert_eq!(registry.resolve("italic").priority, 50);
        assert_eq!(registry.resolve("comment").kind, MarkKind::Custom("comment".into()));
        assert!(registry.names().contains(&"comment"));
    }

    #[test]
    fn test_registry_keeps_builtins() {
        let registry = sample().registry();
        assert_eq!(registry.resolve("bold").priority, 900);
        assert_eq!(registry.resolve("underline"), MarkSpec::underline());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_documents_path_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        unsafe {
            env::set_var("VELLUM_TEST_DOCS", "/custom/docs");
        }
        std::fs::write(&config_file, "documents_path = \"$VELLUM_TEST_DOCS/mine\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.documents_path, Some(PathBuf::from("/custom/docs/mine")));
        assert_eq!(
            config.resolve_document(Path::new("a.html")),
            PathBuf::from("/custom/docs/mine/a.html")
        );
        assert_eq!(
            config.resolve_document(Path::new("/abs/b.html")),
            PathBuf::from("/abs/b.html")
        );
        unsafe {
            env::remove_var("VELLUM_TEST_DOCS");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = sample();

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_invalid_mark_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[[marks]]\nname = \"a,b\"\n").unwrap();

        let error = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(error, ConfigError::InvalidMark { ref name, .. } if name == "a,b"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "marks = 3\n").unwrap();

        let error = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(error, ConfigError::ConfigParseError { .. }));
        assert!(error.to_string().contains("config.toml"));
    }
}
