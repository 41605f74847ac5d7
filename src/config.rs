use std::{path::PathBuf, str::FromStr};

use crate::error::ConfigError;

/// How arithmetic builtins treat results that do not fit in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Two's complement wraparound, like native machine arithmetic.
    Wrapping,
    /// Out of range results are an `Overflow` error.
    Checked,
    /// Results are clamped to `i64::MIN..=i64::MAX`.
    Saturating,
}

impl Default for Overflow {
    fn default() -> Self {
        Overflow::Wrapping
    }
}

impl FromStr for Overflow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wrapping" | "wrap" => Ok(Overflow::Wrapping),
            "checked" => Ok(Overflow::Checked),
            "saturating" | "saturate" => Ok(Overflow::Saturating),
            other => Err(ConfigError::UnknownOverflow(other.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub overflow: Overflow,
    pub prompt: String,
    pub banner: bool,
    pub files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overflow: Overflow::default(),
            prompt: "lispy> ".into(),
            banner: true,
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Parses `[--overflow=POLICY] [--prompt=TEXT] [--quiet] [FILE...]`.
    /// `args` must not include the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();

        for arg in args.into_iter().map(Into::into) {
            if let Some(policy) = arg.strip_prefix("--overflow=") {
                config.overflow = policy.parse()?;
            } else if let Some(prompt) = arg.strip_prefix("--prompt=") {
                config.prompt = prompt.into();
            } else if arg == "--quiet" || arg == "-q" {
                config.banner = false;
            } else if arg.starts_with('-') {
                return Err(ConfigError::UnknownOption(arg));
            } else {
                config.files.push(arg.into());
            }
        }

        Ok(config)
    }
}
