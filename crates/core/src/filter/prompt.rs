use regex::Regex;

use crate::config::{DEFAULT_PROMPT_PATTERNS, FilterId};
use crate::detect::OverflowCandidate;

use super::{DropReason, Filter, FilterError, FilterVerdict};

/// Drops console transcript prompt and continuation lines.
///
/// PowerShell echoes the full working directory in its prompt, which often
/// runs past the column in captured sessions.
#[derive(Debug, Clone)]
pub struct PowerShellPromptFilter {
    patterns: Vec<Regex>,
}

impl PowerShellPromptFilter {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn from_patterns(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    pub fn matches(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.patterns.iter().any(|re| re.is_match(line))
    }
}

impl Default for PowerShellPromptFilter {
    fn default() -> Self {
        Self::from_patterns(&DEFAULT_PROMPT_PATTERNS).unwrap()
    }
}

impl Filter for PowerShellPromptFilter {
    fn id(&self) -> FilterId {
        FilterId::PowershellPrompt
    }

    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError> {
        Ok(FilterVerdict::drop_if(
            self.matches(&candidate.line_text()),
            DropReason::ShellPrompt,
        ))
    }
}
