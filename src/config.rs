use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_OPENAI_API: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_FETCH_DEADLINE_SECS: u64 = 120;
const DEFAULT_LOG_FILE: &str = "cvgen.log";
const DEFAULT_README_DIR: &str = "readmes";

/// Runtime settings. Credentials come from the environment and are required;
/// everything else has defaults that an optional `~/.cvgen/config.toml` may
/// override.
#[derive(Debug, Clone)]
pub struct Settings {
    pub github_token: String,
    pub openai_api_key: String,
    pub github_api: String,
    pub openai_api: String,
    pub model: String,
    pub fetch_deadline: Duration,
    pub readme_dir: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    cvgen: Option<CvgenSection>,
}

#[derive(Deserialize, Default)]
struct CvgenSection {
    github_api: Option<String>,
    openai_api: Option<String>,
    model: Option<String>,
    fetch_deadline_secs: Option<u64>,
    readme_dir: Option<String>,
    log_file: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let github_token = require_env("GITHUB_TOKEN")?;
        let openai_api_key = require_env("OPENAI_API_KEY")?;

        let section = read_config_file().unwrap_or_default();
        Ok(Self::from_parts(github_token, openai_api_key, section))
    }

    fn from_parts(github_token: String, openai_api_key: String, section: CvgenSection) -> Self {
        Self {
            github_token,
            openai_api_key,
            github_api: section
                .github_api
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            openai_api: section
                .openai_api
                .unwrap_or_else(|| DEFAULT_OPENAI_API.to_string()),
            model: section.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fetch_deadline: Duration::from_secs(
                section
                    .fetch_deadline_secs
                    .unwrap_or(DEFAULT_FETCH_DEADLINE_SECS),
            ),
            readme_dir: PathBuf::from(
                section
                    .readme_dir
                    .unwrap_or_else(|| DEFAULT_README_DIR.to_string()),
            ),
            log_file: PathBuf::from(
                section
                    .log_file
                    .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            ),
        }
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => bail!("{} environment variable is not set", name),
    }
}

fn read_config_file() -> Option<CvgenSection> {
    let path = config_path()?;
    let content = std::fs::read_to_string(path).ok()?;
    let file: ConfigFile = toml::from_str(&content).ok()?;
    file.cvgen
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cvgen").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with(".cvgen/config.toml"));
    }

    #[test]
    fn test_defaults_when_section_empty() {
        let s = Settings::from_parts("gh".into(), "oa".into(), CvgenSection::default());
        assert_eq!(s.github_api, DEFAULT_GITHUB_API);
        assert_eq!(s.openai_api, DEFAULT_OPENAI_API);
        assert_eq!(s.model, "gpt-4");
        assert_eq!(s.fetch_deadline, Duration::from_secs(120));
        assert_eq!(s.readme_dir, PathBuf::from("readmes"));
    }

    #[test]
    fn test_file_overrides() {
        let content = r#"
            [cvgen]
            model = "gpt-4o"
            fetch_deadline_secs = 30
            readme_dir = "cache/readmes"
        "#;
        let file: ConfigFile = toml::from_str(content).unwrap();
        let s = Settings::from_parts("gh".into(), "oa".into(), file.cvgen.unwrap());
        assert_eq!(s.model, "gpt-4o");
        assert_eq!(s.fetch_deadline, Duration::from_secs(30));
        assert_eq!(s.readme_dir, PathBuf::from("cache/readmes"));
        assert_eq!(s.github_api, DEFAULT_GITHUB_API);
    }
}
