//! Choice resolution
//!
//! Some translations have no single right answer (which GPU SKU, what to do
//! with an `emptyDir` volume). The mapper asks a [`ChoiceResolver`] and
//! blocks until it answers. Front ends supply the implementation: a
//! terminal prompt, a fixed preference list, or a script in tests.

use std::collections::VecDeque;

use crate::error::{ConvertError, Result};

/// Skip option offered with the GPU SKU choice
pub const GPU_SKIP: &str = "Skip GPU (run on CPU only)";

/// Volume handling options, in the order they are offered
pub const VOLUME_SKIP: &str = "Skip";
pub const VOLUME_AZURE_FILE: &str = "Map as AzureFile";
pub const VOLUME_AZURE_BLOB: &str = "Map as AzureBlob";

/// Picks one of an ordered list of options
pub trait ChoiceResolver {
    /// Return the selected option; it must be one of `options`
    fn resolve(&mut self, prompt: &str, options: &[&str]) -> Result<String>;
}

impl<F> ChoiceResolver for F
where
    F: FnMut(&str, &[&str]) -> Result<String>,
{
    fn resolve(&mut self, prompt: &str, options: &[&str]) -> Result<String> {
        self(prompt, options)
    }
}

/// Ask the resolver and reject answers outside the offered options
pub(crate) fn choose(
    resolver: &mut dyn ChoiceResolver,
    prompt: &str,
    options: &[&str],
) -> Result<String> {
    let answer = resolver.resolve(prompt, options)?;
    if !options.contains(&answer.as_str()) {
        return Err(ConvertError::InvalidChoice {
            prompt: prompt.to_string(),
            answer,
        });
    }
    tracing::debug!(prompt, answer = answer.as_str(), "choice resolved");
    Ok(answer)
}

/// Non-interactive resolver driven by a preference list
///
/// Returns the first preference present among the options, otherwise the
/// option starting with `Skip`, otherwise the first option.
#[derive(Debug, Clone, Default)]
pub struct PreferenceResolver {
    preferences: Vec<String>,
}

impl PreferenceResolver {
    pub fn new<I, S>(preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferences: preferences.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolver that always skips
    pub fn skip_all() -> Self {
        Self::default()
    }
}

impl ChoiceResolver for PreferenceResolver {
    fn resolve(&mut self, prompt: &str, options: &[&str]) -> Result<String> {
        self.preferences
            .iter()
            .find(|p| options.contains(&p.as_str()))
            .map(|p| p.to_string())
            .or_else(|| {
                options
                    .iter()
                    .find(|o| o.starts_with("Skip"))
                    .map(|o| o.to_string())
            })
            .or_else(|| options.first().map(|o| o.to_string()))
            .ok_or_else(|| ConvertError::resolve(prompt, "no options offered"))
    }
}

/// Resolver that replays fixed answers in order
///
/// Records every prompt it was asked, which tests use to check that a
/// choice was (or was not) requested.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedResolver {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ChoiceResolver for ScriptedResolver {
    fn resolve(&mut self, prompt: &str, _options: &[&str]) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ConvertError::resolve(prompt, "scripted answers exhausted"))
    }
}
