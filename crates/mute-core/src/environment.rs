//! Non-production environment detection.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::ConfigError;

/// Built-in patterns for development, testing, QA and staging tiers.
pub const BUILTIN_PATTERNS: [&str; 4] = [
    r"dev(el)?(opment)?",
    r"test(ing)?",
    r"qa",
    r"stag(ei)?(ng)?",
];

fn builtin_regexes() -> &'static [Regex] {
    static INSTANCE: OnceLock<Vec<Regex>> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        BUILTIN_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("built-in environment pattern"))
            .collect()
    })
}

/// Classifies a node's declared environment as muted or not.
///
/// Patterns are unanchored and case-sensitive: `web-staging-1` is muted,
/// `Staging` is not. The classifier is immutable once built and cheap to clone.
#[derive(Debug, Clone)]
pub struct EnvironmentClassifier {
    patterns: Vec<Regex>,
}

impl EnvironmentClassifier {
    /// Creates a classifier with only the built-in patterns.
    pub fn new() -> Self {
        Self {
            patterns: builtin_regexes().to_vec(),
        }
    }

    /// Creates a classifier with the built-in patterns followed by `extra`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRegex` for the first pattern that does not
    /// compile.
    pub fn with_extra_patterns<I, S>(extra: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classifier = Self::new();
        for pattern in extra {
            let pattern = pattern.as_ref();
            let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            classifier.patterns.push(re);
        }
        Ok(classifier)
    }

    /// Returns true if any pattern matches anywhere in `environment`.
    ///
    /// An absent environment never matches.
    pub fn is_muted_environment(&self, environment: Option<&str>) -> bool {
        match environment {
            Some(env) => self.patterns.iter().any(|re| re.is_match(env)),
            None => false,
        }
    }

    /// Returns the pattern sources in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Default for EnvironmentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
