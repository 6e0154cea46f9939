//! Terminal choice resolution
//!
//! Preferences given on the command line answer matching choices; the
//! rest are asked on the terminal, or fall back to skipping when the run
//! is non-interactive.

use clap::ValueEnum;
use console::style;
use k8s2aca_convert::{
    ChoiceResolver, ConvertError, GPU_SKIP, PreferenceResolver, Result, VOLUME_AZURE_BLOB,
    VOLUME_AZURE_FILE, VOLUME_SKIP,
};
use std::io::{self, BufRead, IsTerminal, Write};

/// GPU SKU preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GpuChoice {
    #[value(name = "A100")]
    A100,
    #[value(name = "T4")]
    T4,
    Skip,
}

impl GpuChoice {
    pub fn option(&self) -> &'static str {
        match self {
            Self::A100 => "A100",
            Self::T4 => "T4",
            Self::Skip => GPU_SKIP,
        }
    }
}

/// Handling for volumes without a direct ACA equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VolumeStrategy {
    Skip,
    AzureFile,
    AzureBlob,
}

impl VolumeStrategy {
    pub fn option(&self) -> &'static str {
        match self {
            Self::Skip => VOLUME_SKIP,
            Self::AzureFile => VOLUME_AZURE_FILE,
            Self::AzureBlob => VOLUME_AZURE_BLOB,
        }
    }
}

/// Preference list built from the command line
pub fn preferences(gpu: Option<GpuChoice>, volume: Option<VolumeStrategy>) -> Vec<String> {
    gpu.map(|g| g.option())
        .into_iter()
        .chain(volume.map(|v| v.option()))
        .map(str::to_string)
        .collect()
}

/// Build the resolver for a convert run
pub fn build(non_interactive: bool, preferences: Vec<String>) -> Box<dyn ChoiceResolver> {
    if non_interactive || !io::stdin().is_terminal() {
        tracing::debug!("resolving choices non-interactively");
        Box::new(PreferenceResolver::new(preferences))
    } else {
        Box::new(TerminalResolver::new(
            io::stdin().lock(),
            io::stderr(),
            preferences,
        ))
    }
}

/// Asks on a terminal, one numbered option per line
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
    preferences: Vec<String>,
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W, preferences: Vec<String>) -> Self {
        Self {
            input,
            output,
            preferences,
        }
    }

    fn ask(&mut self, prompt: &str, options: &[&str]) -> io::Result<Option<String>> {
        writeln!(self.output)?;
        writeln!(self.output, "{} {}", style("?").cyan().bold(), prompt)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }

        loop {
            write!(self.output, "Select [1-{}]: ", options.len())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let answer = line.trim();
            let selected = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i))
                .or_else(|| options.iter().find(|o| **o == answer));

            match selected {
                Some(option) => return Ok(Some(option.to_string())),
                None => writeln!(
                    self.output,
                    "{} Enter a number between 1 and {}",
                    style("⚠").yellow(),
                    options.len()
                )?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ChoiceResolver for TerminalResolver<R, W> {
    fn resolve(&mut self, prompt: &str, options: &[&str]) -> Result<String> {
        if let Some(preferred) = self
            .preferences
            .iter()
            .find(|p| options.contains(&p.as_str()))
        {
            return Ok(preferred.clone());
        }
        if options.is_empty() {
            return Err(ConvertError::resolve(prompt, "no options offered"));
        }

        match self.ask(prompt, options) {
            Ok(Some(answer)) => Ok(answer),
            Ok(None) => Err(ConvertError::resolve(prompt, "input closed")),
            Err(e) => Err(ConvertError::resolve(prompt, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GPU_OPTIONS: &[&str] = &["A100", "T4", GPU_SKIP];

    fn terminal(input: &str) -> TerminalResolver<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalResolver::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), vec![])
    }

    #[test]
    fn test_select_by_number() {
        let mut resolver = terminal("2\n");
        assert_eq!(resolver.resolve("Pick a SKU", GPU_OPTIONS).unwrap(), "T4");

        let shown = String::from_utf8(resolver.output).unwrap();
        assert!(shown.contains("Pick a SKU"));
        assert!(shown.contains("1) A100"));
        assert!(shown.contains("3) Skip GPU (run on CPU only)"));
    }

    #[test]
    fn test_reprompts_on_invalid_input() {
        let mut resolver = terminal("9\nH100\nA100\n");
        assert_eq!(resolver.resolve("Pick a SKU", GPU_OPTIONS).unwrap(), "A100");

        let shown = String::from_utf8(resolver.output).unwrap();
        assert_eq!(shown.matches("Enter a number between 1 and 3").count(), 2);
    }

    #[test]
    fn test_end_of_input_fails() {
        let mut resolver = terminal("");
        let err = resolver.resolve("Pick a SKU", GPU_OPTIONS).unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn test_preferences_answer_without_asking() {
        let prefs = preferences(Some(GpuChoice::T4), Some(VolumeStrategy::AzureFile));
        let mut resolver = TerminalResolver::new(Cursor::new(Vec::new()), Vec::new(), prefs);

        assert_eq!(resolver.resolve("gpu", GPU_OPTIONS).unwrap(), "T4");
        assert_eq!(
            resolver
                .resolve("volume", &[VOLUME_SKIP, VOLUME_AZURE_FILE, VOLUME_AZURE_BLOB])
                .unwrap(),
            VOLUME_AZURE_FILE
        );
        assert!(resolver.output.is_empty());
    }

    #[test]
    fn test_preferences() {
        assert_eq!(
            preferences(Some(GpuChoice::Skip), None),
            vec![GPU_SKIP.to_string()]
        );
        assert!(preferences(None, None).is_empty());
    }
}
