//! Prompt sources.

use fanout_error::{ConfigError, ConfigErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const BENCHMARK_PROMPTS: &str = include_str!("../data/prompts.txt");

/// The bundled benchmark prompt set.
pub fn benchmark_prompts() -> Vec<String> {
    parse_prompt_lines(BENCHMARK_PROMPTS)
}

/// One prompt per line; blank lines and `#` comments are skipped.
pub fn parse_prompt_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read prompts from a file.
///
/// Files ending in `.json` must hold an array of strings; anything else is
/// read with [`parse_prompt_lines`].
///
/// # Errors
///
/// Returns [`ConfigErrorKind::Prompts`] if the file cannot be read or parsed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_prompts(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::new(ConfigErrorKind::Prompts(format!("{}: {e}", path.display())))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let prompts = if is_json {
        serde_json::from_str::<Vec<String>>(&text).map_err(|e| {
            ConfigError::new(ConfigErrorKind::Prompts(format!("{}: {e}", path.display())))
        })?
    } else {
        parse_prompt_lines(&text)
    };

    debug!(count = prompts.len(), "Loaded prompts");
    Ok(prompts)
}

/// Where the prompts of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// Prompts given inline
    Inline(Vec<String>),
    /// A prompt file
    File(PathBuf),
    /// The bundled benchmark set
    Benchmark,
}

impl PromptSource {
    /// Inline prompts win over a file; with neither, the benchmark set.
    pub fn select(inline: Vec<String>, file: Option<PathBuf>) -> Self {
        match (inline.is_empty(), file) {
            (false, _) => PromptSource::Inline(inline),
            (true, Some(path)) => PromptSource::File(path),
            (true, None) => PromptSource::Benchmark,
        }
    }

    /// Resolve the source, keeping at most `limit` prompts.
    ///
    /// # Errors
    ///
    /// Propagates file errors from [`load_prompts`].
    pub fn resolve(self, limit: Option<usize>) -> Result<Vec<String>, ConfigError> {
        let mut prompts = match self {
            PromptSource::Inline(prompts) => prompts,
            PromptSource::File(path) => load_prompts(&path)?,
            PromptSource::Benchmark => benchmark_prompts(),
        };
        if let Some(limit) = limit {
            prompts.truncate(limit);
        }
        Ok(prompts)
    }
}
