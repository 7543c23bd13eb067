use serde::Deserialize;
use std::time::Duration;

use super::fetcher::ReadmeSource;
use super::FetchError;
use crate::config::Settings;
use crate::log::LogSink;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const REPOS_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
}

pub struct GithubClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    log: LogSink,
}

impl GithubClient {
    pub fn new(settings: &Settings, log: LogSink) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            agent,
            base_url: settings.github_api.trim_end_matches('/').to_string(),
            token: settings.github_token.clone(),
            log,
        }
    }

    fn get(&self, url: &str, accept: &str) -> Result<String, FetchError> {
        let resp = self
            .agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("User-Agent", "cvgen/0.1")
            .header("Accept", accept)
            .call()
            .map_err(|e| FetchError::Api(format!("request failed: {}", e)))?;

        let status = resp.status();
        if status == 404 {
            return Err(FetchError::NotFound);
        }
        if status != 200 {
            let body = resp
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            self.log.error(format!("GitHub HTTP {}: {}", status, body.trim()));
            return Err(FetchError::Api(format!("HTTP {}", status)));
        }

        resp.into_body()
            .read_to_string()
            .map_err(|e| FetchError::Api(format!("read body failed: {}", e)))
    }
}

impl ReadmeSource for GithubClient {
    /// Public repositories owned by the authenticated user.
    fn list_repos(&self) -> Result<Vec<Repo>, FetchError> {
        let url = format!(
            "{}/user/repos?visibility=public&affiliation=owner&per_page={}",
            self.base_url, REPOS_PER_PAGE
        );
        let body = self.get(&url, "application/vnd.github+json")?;
        let repos: Vec<Repo> = serde_json::from_str(&body)
            .map_err(|e| FetchError::Api(format!("repo list parse error: {}", e)))?;
        self.log.info(format!("Listed {} repositories.", repos.len()));
        Ok(repos)
    }

    fn fetch_readme(&self, repo: &Repo) -> Result<String, FetchError> {
        let url = format!("{}/repos/{}/readme", self.base_url, repo.full_name);
        // The raw media type returns the README body directly, no base64 step.
        self.get(&url, "application/vnd.github.raw+json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_list_parses() {
        let body = r#"[
            {"name": "proj1", "full_name": "me/proj1", "private": false},
            {"name": "proj2", "full_name": "me/proj2", "private": false}
        ]"#;
        let repos: Vec<Repo> = serde_json::from_str(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "proj1");
        assert_eq!(repos[1].full_name, "me/proj2");
    }
}
