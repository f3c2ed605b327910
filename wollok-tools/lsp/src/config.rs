//! Server Configuration
//!
//! Command-line arguments pick the analyzer the server starts with; client
//! settings (section `wollokLSP`) can override it and tune the features at
//! runtime.

use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use wollok_model::{Analyzer, ExternalAnalyzer};

use crate::highlight::ReferenceStrategy;

/// Settings section the client sends.
pub const SETTINGS_SECTION: &str = "wollokLSP";

/// Default cap on diagnostics per document.
pub const DEFAULT_MAX_PROBLEMS: usize = 1000;

/// Command-line arguments of `wollok-lsp`.
#[derive(Debug, Clone, Parser)]
#[command(name = "wollok-lsp")]
#[command(about = "Language server for Wollok")]
#[command(version)]
pub struct Args {
    /// Program that parses, links and validates Wollok files
    #[arg(long, env = "WOLLOK_ANALYZER", default_value = "wollok-analyzer")]
    pub analyzer: String,

    /// Extra argument for the analyzer (repeatable)
    #[arg(long = "analyzer-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn analyzer(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            command: self.analyzer.clone(),
            args: self.analyzer_args.clone(),
        }
    }
}

/// How to run the external analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyzerSettings {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AnalyzerSettings {
    pub fn build(&self) -> Arc<dyn Analyzer> {
        Arc::new(ExternalAnalyzer::new(self.command.clone()).with_args(self.args.clone()))
    }
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub max_number_of_problems: usize,
    pub reference_resolution: ReferenceStrategy,
    pub analyzer: Option<AnalyzerSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_number_of_problems: DEFAULT_MAX_PROBLEMS,
            reference_resolution: ReferenceStrategy::default(),
            analyzer: None,
        }
    }
}

impl Settings {
    /// Parses settings sent either as `{"wollokLSP": {...}}` or as the bare
    /// section.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        Settings::deserialize(section)
    }

    /// Applies client settings; malformed input keeps the current values.
    ///
    /// Returns whether anything changed.
    pub fn update(&mut self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }

        match Settings::from_value(value) {
            Ok(settings) => {
                let changed = settings != *self;
                if changed {
                    debug!("Settings updated: {:?}", settings);
                }
                *self = settings;
                changed
            }
            Err(err) => {
                warn!("Ignoring malformed {} settings: {}", SETTINGS_SECTION, err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_value(&json!({})).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_number_of_problems, 1000);
        assert_eq!(settings.reference_resolution, ReferenceStrategy::FirstMatch);
    }

    #[test]
    fn test_section_and_bare_forms() {
        let bare = json!({ "maxNumberOfProblems": 10, "referenceResolution": "mostRecent" });
        let wrapped = json!({ "wollokLSP": bare.clone() });

        let expected = Settings {
            max_number_of_problems: 10,
            reference_resolution: ReferenceStrategy::MostRecent,
            analyzer: None,
        };
        assert_eq!(Settings::from_value(&bare).unwrap(), expected);
        assert_eq!(Settings::from_value(&wrapped).unwrap(), expected);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let settings = Settings::from_value(&json!({
            "language": "es",
            "analyzer": { "command": "node", "args": ["analyzer.js"] }
        }))
        .unwrap();

        assert_eq!(
            settings.analyzer,
            Some(AnalyzerSettings {
                command: "node".to_string(),
                args: vec!["analyzer.js".to_string()],
            })
        );
    }

    #[test]
    fn test_malformed_settings_keep_previous() {
        let mut settings = Settings {
            max_number_of_problems: 5,
            ..Settings::default()
        };

        assert!(!settings.update(&json!({ "maxNumberOfProblems": "many" })));
        assert_eq!(settings.max_number_of_problems, 5);

        assert!(settings.update(&json!({ "maxNumberOfProblems": 7 })));
        assert_eq!(settings.max_number_of_problems, 7);
        assert!(!settings.update(&Value::Null));
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from([
            "wollok-lsp",
            "--analyzer",
            "node",
            "--analyzer-arg",
            "dist/analyzer.js",
            "--analyzer-arg",
            "--json",
            "-v",
        ]);

        assert!(args.verbose);
        assert_eq!(
            args.analyzer(),
            AnalyzerSettings {
                command: "node".to_string(),
                args: vec!["dist/analyzer.js".to_string(), "--json".to_string()],
            }
        );
    }
}
