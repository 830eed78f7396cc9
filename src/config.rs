use crate::error::{FlatPagesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Name of the configuration file searched for by [`FlatPagesConfig::load`].
pub const CONFIG_FILE: &str = ".flatpages.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatPagesConfig {
    /// Directory holding the pages. Relative paths resolve against the
    /// directory containing the config file.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default)]
    pub extension: ExtensionSetting,

    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_renderer")]
    pub renderer: String,

    #[serde(default)]
    pub auto_reload: AutoReload,

    #[serde(default)]
    pub case_insensitive: bool,

    #[serde(default)]
    pub legacy_meta_parser: bool,

    #[serde(default)]
    pub meta_parser: MetaFormat,

    /// Metadata syntax per extension, overriding `meta_parser`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta_parsers: BTreeMap<String, MetaFormat>,

    #[serde(default)]
    pub markdown: MarkdownSettings,
}

fn default_root() -> PathBuf {
    PathBuf::from("pages")
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_renderer() -> String {
    "markdown".to_string()
}

impl Default for FlatPagesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: ExtensionSetting::default(),
            encoding: default_encoding(),
            renderer: default_renderer(),
            auto_reload: AutoReload::default(),
            case_insensitive: false,
            legacy_meta_parser: false,
            meta_parser: MetaFormat::default(),
            meta_parsers: BTreeMap::new(),
            markdown: MarkdownSettings::default(),
        }
    }
}

/// Accepted page extensions, as written in the config file.
///
/// A single string may hold several extensions separated by commas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionSetting {
    One(String),
    Many(Vec<String>),
}

impl Default for ExtensionSetting {
    fn default() -> Self {
        ExtensionSetting::One(".html".to_string())
    }
}

impl ExtensionSetting {
    /// Normalize to an ordered list of extensions. Earlier entries win when
    /// a file name ends with more than one of them.
    pub fn normalize(&self) -> Result<Vec<String>> {
        let extensions: Vec<String> = match self {
            ExtensionSetting::One(value) if value.contains(',') => {
                value.split(',').map(|s| s.trim().to_string()).collect()
            }
            ExtensionSetting::One(value) => vec![value.clone()],
            ExtensionSetting::Many(values) => {
                let mut seen = Vec::with_capacity(values.len());
                for value in values {
                    if !seen.contains(value) {
                        seen.push(value.clone());
                    }
                }
                seen
            }
        };

        if extensions.is_empty() {
            return Err(FlatPagesError::Config(
                "Invalid value for extension: expected at least one extension".to_string(),
            ));
        }
        if extensions.iter().any(|ext| ext.is_empty()) {
            return Err(FlatPagesError::Config(format!(
                "Invalid value for extension: empty entry in {:?}",
                self
            )));
        }
        Ok(extensions)
    }
}

impl From<&str> for ExtensionSetting {
    fn from(value: &str) -> Self {
        ExtensionSetting::One(value.to_string())
    }
}

impl From<Vec<&str>> for ExtensionSetting {
    fn from(values: Vec<&str>) -> Self {
        ExtensionSetting::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// When the page table forgets its snapshot before a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "AutoReloadSetting")]
pub enum AutoReload {
    Always,
    Never,
    #[default]
    IfDebug,
}

impl AutoReload {
    pub fn should_reload(self, debug: bool) -> bool {
        match self {
            AutoReload::Always => true,
            AutoReload::Never => false,
            AutoReload::IfDebug => debug,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AutoReloadSetting {
    Flag(bool),
    Name(String),
}

impl TryFrom<AutoReloadSetting> for AutoReload {
    type Error = FlatPagesError;

    fn try_from(setting: AutoReloadSetting) -> Result<Self> {
        match setting {
            AutoReloadSetting::Flag(true) => Ok(AutoReload::Always),
            AutoReloadSetting::Flag(false) => Ok(AutoReload::Never),
            AutoReloadSetting::Name(name) => name.parse(),
        }
    }
}

impl fmt::Display for AutoReload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoReload::Always => write!(f, "always"),
            AutoReload::Never => write!(f, "never"),
            AutoReload::IfDebug => write!(f, "if-debug"),
        }
    }
}

impl FromStr for AutoReload {
    type Err = FlatPagesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "always" | "true" => Ok(AutoReload::Always),
            "never" | "false" => Ok(AutoReload::Never),
            "if-debug" | "if debug" | "if_debug" => Ok(AutoReload::IfDebug),
            _ => Err(FlatPagesError::Config(format!(
                "Invalid auto_reload policy: {}",
                s
            ))),
        }
    }
}

/// Metadata syntax of a page file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaFormat {
    /// Leading YAML block, ended by a blank line or a document marker.
    #[default]
    Yaml,
    /// TOML block fenced by `+++` lines.
    Toml,
}

impl fmt::Display for MetaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaFormat::Yaml => write!(f, "yaml"),
            MetaFormat::Toml => write!(f, "toml"),
        }
    }
}

impl FromStr for MetaFormat {
    type Err = FlatPagesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(MetaFormat::Yaml),
            "toml" => Ok(MetaFormat::Toml),
            _ => Err(FlatPagesError::Config(format!(
                "Invalid metadata parser: {}",
                s
            ))),
        }
    }
}

/// Switches for the built-in markdown renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownSettings {
    #[serde(default = "default_true")]
    pub tables: bool,

    #[serde(default = "default_true")]
    pub footnotes: bool,

    #[serde(default = "default_true")]
    pub strikethrough: bool,

    #[serde(default)]
    pub tasklists: bool,

    #[serde(default)]
    pub smart_punctuation: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: false,
            smart_punctuation: false,
        }
    }
}

impl FlatPagesConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn extensions(&self) -> Result<Vec<String>> {
        self.extension.normalize()
    }

    /// Metadata syntax used for files carrying `extension`.
    pub fn meta_format_for(&self, extension: &str) -> MetaFormat {
        self.meta_parsers
            .get(extension)
            .copied()
            .unwrap_or(self.meta_parser)
    }

    pub fn root_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.root)
    }

    /// Search upward from `start_path` for a config file and load it.
    ///
    /// Returns the config and the directory that holds it.
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = Self::find_config_file(start_path)?;
        Self::load_file(&config_path)
    }

    pub fn load_file(config_path: &Path) -> Result<(Self, PathBuf)> {
        let content = std::fs::read_to_string(config_path)?;
        let config: FlatPagesConfig = if content.trim().is_empty() {
            FlatPagesConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                FlatPagesError::Config(format!("{}: {}", config_path.display(), e))
            })?
        };
        let project_root = config_path
            .parent()
            .ok_or_else(|| FlatPagesError::Config("Config file has no parent directory".to_string()))?
            .to_path_buf();
        Ok((config, project_root))
    }

    pub fn find_config_file(start_path: &Path) -> Result<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(config_path);
            }
            if !current.pop() {
                return Err(FlatPagesError::NotInitialized);
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
