use richpad_engine::{CommandId, EditorConfig, MentionCandidate, MentionSource, Preset, Template};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

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

    #[error("Failed to read template {name} from {path}: {source}")]
    TemplateReadError {
        name: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template {0} needs either markup or a path")]
    TemplateMissingContent(String),
}

/// A person offered by the mention picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A template given inline or as a path to a markup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// On-disk editor settings. Everything except `preset` is an override of
/// the preset's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbar: Option<Vec<CommandId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_menu: Option<Vec<CommandId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_assist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofocus: Option<bool>,
    /// Use the host's async lookup instead of `mentions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_mentions: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<MentionEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateEntry>,
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

        // Expand shell variables and tilde in template paths
        for template in &mut config.templates {
            if let Some(path) = template.path.take() {
                template.path = Some(Self::expand_path(&path).unwrap_or(path));
            }
        }

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
        let config_dir = shellexpand::tilde("~/.config/richpad");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// The preset's editor configuration with this file's overrides applied.
    /// Template files are read here.
    pub fn to_editor_config(&self) -> Result<EditorConfig, ConfigError> {
        let preset = self.preset.unwrap_or(Preset::TaskDescription);
        let mut editor = preset.config();
        log::debug!("building editor config from preset {}", preset.as_str());

        if let Some(placeholder) = &self.placeholder {
            editor.placeholder = placeholder.clone();
        }
        if let Some(toolbar) = &self.toolbar {
            editor.toolbar = toolbar.clone();
        }
        if let Some(insert_menu) = &self.insert_menu {
            editor.insert_menu = insert_menu.clone();
        }
        editor.ai_assist = self.ai_assist.unwrap_or(editor.ai_assist);
        editor.templates_enabled = self.templates_enabled.unwrap_or(editor.templates_enabled);
        editor.read_only = self.read_only.unwrap_or(editor.read_only);
        editor.autofocus = self.autofocus.unwrap_or(editor.autofocus);

        editor.mention_source = if self.async_mentions.unwrap_or(false) {
            MentionSource::Async
        } else {
            MentionSource::Static {
                candidates: self
                    .mentions
                    .iter()
                    .map(|entry| MentionCandidate {
                        id: entry.id.clone(),
                        display_name: entry.name.clone(),
                        secondary_label: entry.label.clone(),
                    })
                    .collect(),
            }
        };

        editor.templates = self
            .templates
            .iter()
            .map(Self::load_template)
            .collect::<Result<_, _>>()?;
        Ok(editor)
    }

    fn load_template(entry: &TemplateEntry) -> Result<Template, ConfigError> {
        let markup = match (&entry.markup, &entry.path) {
            (Some(markup), _) => markup.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|source| {
                ConfigError::TemplateReadError {
                    name: entry.name.clone(),
                    path: path.clone(),
                    source,
                }
            })?,
            (None, None) => return Err(ConfigError::TemplateMissingContent(entry.name.clone())),
        };
        Ok(Template {
            name: entry.name.clone(),
            markup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/richpad/config.toml"));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from_path(temp_dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/dir/config.toml");
        let original = Config {
            preset: Some(Preset::Notepad),
            placeholder: Some("Jot it down".into()),
            toolbar: Some(vec![CommandId::Bold, CommandId::BulletList]),
            mentions: vec![MentionEntry {
                id: "u1".into(),
                name: "Ada".into(),
                label: Some("Engineering".into()),
            }],
            ..Config::default()
        };

        original.save_to_path(&config_path).unwrap();
        let loaded = Config::load_from_path(&config_path).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "preset = \"spreadsheet\"").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let config: Config = toml::from_str(
            r#"
            preset = "form-description"
            placeholder = "What is this form for?"
            insert_menu = ["table", "divider"]
            read_only = true

            [[mentions]]
            id = "u7"
            name = "Grace"
            "#,
        )
        .unwrap();

        let editor = config.to_editor_config().unwrap();
        let form = Preset::FormDescription.config();
        assert_eq!(editor.toolbar, form.toolbar);
        assert_eq!(editor.insert_menu, vec![CommandId::Table, CommandId::Divider]);
        assert_eq!(editor.placeholder, "What is this form for?");
        assert!(editor.read_only);
        assert_eq!(
            editor.mention_source,
            MentionSource::Static {
                candidates: vec![MentionCandidate::new("u7", "Grace")],
            }
        );
    }

    #[test]
    fn test_default_preset_is_task_description() {
        let editor = Config::default().to_editor_config().unwrap();
        assert_eq!(editor, Preset::TaskDescription.config());
    }

    #[test]
    fn test_template_path_is_expanded_and_read() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bug.html"), "<h2>Steps</h2>").unwrap();
        unsafe {
            env::set_var("RICHPAD_TEST_TEMPLATES", temp_dir.path());
        }

        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[[templates]]\nname = \"bug\"\npath = \"$RICHPAD_TEST_TEMPLATES/bug.html\"\n",
        )
        .unwrap();
        let config = Config::load_from_path(&config_path).unwrap().unwrap();
        let editor = config.to_editor_config().unwrap();

        assert_eq!(
            editor.templates,
            vec![Template {
                name: "bug".into(),
                markup: "<h2>Steps</h2>".into(),
            }]
        );
        unsafe {
            env::remove_var("RICHPAD_TEST_TEMPLATES");
        }
    }

    #[test]
    fn test_template_without_content_is_an_error() {
        let config = Config {
            templates: vec![TemplateEntry {
                name: "empty".into(),
                markup: None,
                path: None,
            }],
            ..Config::default()
        };
        let err = config.to_editor_config().unwrap_err();
        assert_eq!(err.to_string(), "Template empty needs either markup or a path");
    }

    #[test]
    fn test_async_mentions_switch_the_source() {
        let config = Config {
            async_mentions: Some(true),
            ..Config::default()
        };
        assert_eq!(
            config.to_editor_config().unwrap().mention_source,
            MentionSource::Async
        );
    }
}
