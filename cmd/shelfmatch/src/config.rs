//! Configuration loading.
//!
//! Settings are read from an optional YAML file whose string values may
//! reference environment variables, then overridden by well-known
//! environment variables.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shelfmatch_matcher::MatcherSettings;

/// Placeholder prefix used by config templates for unset secrets.
const PLACEHOLDER_PREFIX: &str = "YOUR_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOpenAI {
    pub endpoint: String,
    pub api_key: String,
    /// Chat model deployment.
    pub deployment: String,
    pub embedding_deployment: String,
    pub api_version: String,
}

impl Default for AzureOpenAI {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: "gpt-4o".to_string(),
            embedding_deployment: "text-embedding-3-small".to_string(),
            api_version: "2024-08-01-preview".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSearch {
    pub endpoint: String,
    pub api_key: String,
    pub index_name: String,
}

impl Default for AzureSearch {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index_name: "products-index".to_string(),
        }
    }
}

/// Configuration file format.
///
/// ```yaml
/// azure_openai:
///   endpoint: https://my-resource.openai.azure.com
///   api_key: ${AZURE_OPENAI_API_KEY}
/// azure_search:
///   endpoint: https://my-search.search.windows.net
///   api_key: $AZURE_SEARCH_API_KEY
/// matcher:
///   top_k: 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub azure_openai: AzureOpenAI,
    pub azure_search: AzureSearch,
    pub log_level: String,
    pub embedding_dimensions: usize,
    pub matcher: MatcherSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            azure_openai: AzureOpenAI::default(),
            azure_search: AzureSearch::default(),
            log_level: "info".to_string(),
            embedding_dimensions: 1536,
            matcher: MatcherSettings::default(),
        }
    }
}

impl Config {
    /// Load from `path` (if any) and the process environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content, |key| std::env::var(key).ok())
            .with_context(|| format!("invalid config {}", path.display()))
    }

    fn from_yaml(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        expand_strings(&mut value, &lookup);
        Ok(serde_yaml::from_value(value)?)
    }

    /// Override fields from environment variables. Unset or empty
    /// variables leave the current value alone.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let strings: [(&str, &mut String); 9] = [
            ("AZURE_OPENAI_ENDPOINT", &mut self.azure_openai.endpoint),
            ("AZURE_OPENAI_API_KEY", &mut self.azure_openai.api_key),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", &mut self.azure_openai.deployment),
            (
                "AZURE_OPENAI_EMBEDDING_DEPLOYMENT",
                &mut self.azure_openai.embedding_deployment,
            ),
            ("AZURE_OPENAI_API_VERSION", &mut self.azure_openai.api_version),
            ("AZURE_SEARCH_ENDPOINT", &mut self.azure_search.endpoint),
            ("AZURE_SEARCH_API_KEY", &mut self.azure_search.api_key),
            ("AZURE_SEARCH_INDEX_NAME", &mut self.azure_search.index_name),
            ("LOG_LEVEL", &mut self.log_level),
        ];
        for (key, field) in strings {
            if let Some(v) = get(key) {
                *field = v;
            }
        }

        if let Some(v) = get("VECTOR_SEARCH_TOP_K") {
            self.matcher.top_k = v
                .trim()
                .parse()
                .with_context(|| format!("VECTOR_SEARCH_TOP_K: invalid integer {v:?}"))?;
        }
        if let Some(v) = get("CONFIDENCE_THRESHOLD") {
            self.matcher.confidence_threshold = v
                .trim()
                .parse()
                .with_context(|| format!("CONFIDENCE_THRESHOLD: invalid number {v:?}"))?;
        }
        Ok(())
    }

    /// Fail on the first required setting that is empty or still a
    /// `YOUR_...` placeholder.
    pub fn validate(&self) -> Result<()> {
        self.validate_openai()?;
        require(&[
            ("AZURE_SEARCH_ENDPOINT", &self.azure_search.endpoint),
            ("AZURE_SEARCH_API_KEY", &self.azure_search.api_key),
        ])
    }

    /// Like [`validate`](Self::validate) but only for the Azure OpenAI
    /// settings, for runs against a local catalog.
    pub fn validate_openai(&self) -> Result<()> {
        require(&[
            ("AZURE_OPENAI_ENDPOINT", &self.azure_openai.endpoint),
            ("AZURE_OPENAI_API_KEY", &self.azure_openai.api_key),
        ])
    }
}

fn require(settings: &[(&str, &String)]) -> Result<()> {
    for (key, value) in settings {
        if value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX) {
            bail!(
                "Configuration error: {key} is not set. \
                 Set the environment variable or pass --config."
            );
        }
    }
    Ok(())
}

fn expand_strings(value: &mut serde_yaml::Value, lookup: &impl Fn(&str) -> Option<String>) {
    match value {
        serde_yaml::Value::String(s) => *s = expand_env(s, lookup),
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                expand_strings(item, lookup);
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                expand_strings(v, lookup);
            }
        }
        _ => {}
    }
}

/// Expand `$VAR` and `${VAR}` references. `$$` is a literal `$`; unknown
/// variables expand to the empty string.
fn expand_env(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                out.push_str(&lookup(&name).unwrap_or_default());
            }
            Some(&c) if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '_' || c.is_ascii_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&lookup(&name).unwrap_or_default());
            }
            _ => out.push('$'),
        }
    }
    out
}

/// Masks a secret for display.
pub fn mask_api_key(key: &str) -> String {
    let n = key.chars().count();
    if n <= 8 {
        return "*".repeat(n);
    }
    let head: String = key.chars().take(4).collect();
    let tail: String = key.chars().skip(n - 4).collect();
    format!("{head}{}{tail}", "*".repeat(n - 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.azure_openai.deployment, "gpt-4o");
        assert_eq!(cfg.azure_openai.embedding_deployment, "text-embedding-3-small");
        assert_eq!(cfg.azure_openai.api_version, "2024-08-01-preview");
        assert_eq!(cfg.azure_search.index_name, "products-index");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.embedding_dimensions, 1536);
        assert_eq!(cfg.matcher.top_k, 3);
        assert_eq!(cfg.matcher.confidence_threshold, 0.7);
    }

    #[test]
    fn test_expand_env() {
        let lookup = env(&[("KEY", "sk-123"), ("HOST", "example.com")]);
        assert_eq!(expand_env("${KEY}", &lookup), "sk-123");
        assert_eq!(expand_env("https://$HOST/x", &lookup), "https://example.com/x");
        assert_eq!(expand_env("cena: $$5", &lookup), "cena: $5");
        assert_eq!(expand_env("$MISSING!", &lookup), "!");
        assert_eq!(expand_env("end $", &lookup), "end $");
        assert_eq!(expand_env("$1", &lookup), "$1");
        assert_eq!(expand_env("plain", &lookup), "plain");
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
azure_openai:
  endpoint: https://res.openai.azure.com
  api_key: ${OPENAI_KEY}
azure_search:
  endpoint: https://shop.search.windows.net
  api_key: $SEARCH_KEY
  index_name: katalog
matcher:
  top_k: 5
"#;
        let cfg =
            Config::from_yaml(yaml, env(&[("OPENAI_KEY", "a1"), ("SEARCH_KEY", "b2")])).unwrap();
        assert_eq!(cfg.azure_openai.api_key, "a1");
        assert_eq!(cfg.azure_openai.deployment, "gpt-4o");
        assert_eq!(cfg.azure_search.api_key, "b2");
        assert_eq!(cfg.azure_search.index_name, "katalog");
        assert_eq!(cfg.matcher.top_k, 5);
        assert_eq!(cfg.matcher.max_iterations, 10);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("", env(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = Config::default();
        cfg.azure_search.index_name = "from-file".into();
        cfg.apply_env(env(&[
            ("AZURE_OPENAI_ENDPOINT", "https://env.openai.azure.com"),
            ("AZURE_SEARCH_INDEX_NAME", "from-env"),
            ("AZURE_OPENAI_API_KEY", ""),
            ("VECTOR_SEARCH_TOP_K", "7"),
            ("CONFIDENCE_THRESHOLD", "0.65"),
            ("LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();
        assert_eq!(cfg.azure_openai.endpoint, "https://env.openai.azure.com");
        assert_eq!(cfg.azure_search.index_name, "from-env");
        assert_eq!(cfg.azure_openai.api_key, "");
        assert_eq!(cfg.matcher.top_k, 7);
        assert_eq!(cfg.matcher.confidence_threshold, 0.65);
        assert_eq!(cfg.log_level, "DEBUG");
    }

    #[test]
    fn test_env_bad_number() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env(env(&[("VECTOR_SEARCH_TOP_K", "tři")]))
            .unwrap_err();
        assert!(err.to_string().contains("VECTOR_SEARCH_TOP_K"));
    }

    #[test]
    fn test_validate() {
        let mut cfg = Config::default();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("AZURE_OPENAI_ENDPOINT"));

        cfg.azure_openai.endpoint = "https://res.openai.azure.com".into();
        cfg.azure_openai.api_key = "YOUR_AZURE_OPENAI_API_KEY".into();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("AZURE_OPENAI_API_KEY"));

        cfg.azure_openai.api_key = "key".into();
        assert!(cfg.validate_openai().is_ok());
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("AZURE_SEARCH_ENDPOINT"));

        cfg.azure_search.endpoint = "https://shop.search.windows.net".into();
        cfg.azure_search.api_key = "key".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelfmatch.yaml");
        std::fs::write(&path, "log_level: warn\nembedding_dimensions: 256\n").unwrap();
        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.embedding_dimensions, 256);
        assert!(Config::from_file(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("sk-1234567890"), "sk-1*****7890");
    }
}
