use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

/// Which introduction program to run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RunMode {
    /// Empty window; Escape closes it.
    Window,
    /// The orange quad.
    #[default]
    Geometry,
}

impl RunMode {
    /// Parses the optional single mode argument (program name excluded).
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mode = match args.next() {
            Some(arg) => arg.parse()?,
            None => RunMode::default(),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument {extra:?}; usage: tessera-intro [window|geometry]");
        }

        Ok(mode)
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "window" => Ok(RunMode::Window),
            "geometry" => Ok(RunMode::Geometry),
            other => bail!("unknown run mode {other:?}; expected \"window\" or \"geometry\""),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Window => f.write_str("window"),
            RunMode::Geometry => f.write_str("geometry"),
        }
    }
}
