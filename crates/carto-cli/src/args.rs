//! Command-line argument parsing.
//!
//! ```text
//! carto [--progress=none|normal|percent|detailed] [--intermediate]
//!       [--max-h=H] [--blur=B] xsize ysize inputfile outputfile
//! ```
//!
//! Options take their value either attached (`--max-h=0.1`) or as the next
//! argument (`--max-h 0.1`, `-m 0.1`). `--` ends option parsing.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use carto::types::{CartogramConfig, ProgressMode};

/// One-line usage summary, without the program name.
pub const USAGE: &str = "[--progress=none|normal|percent|detailed] [--intermediate] \
                         [--max-h=H] [--blur=B] xsize ysize inputfile outputfile";

/// Parsed command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Args {
    /// Grid width in cells.
    pub xsize: u32,
    /// Grid height in cells.
    pub ysize: u32,
    /// Density file to read.
    pub input: PathBuf,
    /// Point file to write.
    pub output: PathBuf,
    /// How much progress to print.
    pub progress: ProgressMode,
    /// Write the density after every accepted step next to the output.
    pub intermediate: bool,
    /// Cap on the integrator step, if given.
    pub max_step: Option<f64>,
    /// Pre-smoothing width in grid units.
    pub blur: f64,
}

impl Args {
    /// The transform configuration these arguments describe.
    pub fn config(&self) -> CartogramConfig {
        let mut config = CartogramConfig::default()
            .with_progress(self.progress)
            .with_blur(self.blur);
        config.intermediate = self.intermediate;
        if let Some(h) = self.max_step {
            config = config.with_max_step(h);
        }
        config
    }
}

/// Why the command line was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgsError {
    /// `-h` or `--help` was given.
    HelpRequested,
    /// An option this program does not know.
    UnknownOption(String),
    /// An option that needs a value was last on the line.
    MissingValue(&'static str),
    /// An option value could not be parsed.
    InvalidValue {
        /// Long name of the option.
        option: &'static str,
        /// The offending value.
        value: String,
    },
    /// Not exactly four positional arguments.
    WrongArgumentCount(usize),
    /// A grid dimension is not a positive integer.
    InvalidSize {
        /// `xsize` or `ysize`.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HelpRequested => write!(f, "help requested"),
            Self::UnknownOption(opt) => write!(f, "unrecognised option {opt}"),
            Self::MissingValue(opt) => write!(f, "option --{opt} needs a value"),
            Self::InvalidValue { option, value } => {
                write!(f, "failed to parse --{option}={value}")
            }
            Self::WrongArgumentCount(n) => {
                write!(f, "expected 4 positional arguments, got {n}")
            }
            Self::InvalidSize { name, value } => {
                write!(f, "{name} must be a positive integer, got '{value}'")
            }
        }
    }
}

impl Error for ArgsError {}

/// The options that take a value, by long name and short letter.
const VALUED: [(&str, char); 3] = [("progress", 'p'), ("max-h", 'm'), ("blur", 'b')];

fn valued_option(arg: &str) -> Option<&'static str> {
    VALUED.iter().find_map(|&(long, short)| {
        let short_form = format!("-{short}");
        (arg == short_form || arg.strip_prefix("--") == Some(long)).then_some(long)
    })
}

fn parse_f64(option: &'static str, value: &str) -> Result<f64, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidValue {
        option,
        value: value.to_string(),
    })
}

fn parse_size(name: &'static str, value: &str) -> Result<u32, ArgsError> {
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ArgsError::InvalidSize {
            name,
            value: value.to_string(),
        }),
    }
}

/// Parse the arguments after the program name.
pub fn parse<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut progress = ProgressMode::default();
    let mut intermediate = false;
    let mut max_step = None;
    let mut blur = 0.0;
    let mut positional = Vec::new();

    let mut iter = args.into_iter().map(Into::into);
    let mut options_done = false;
    while let Some(arg) = iter.next() {
        if options_done || !arg.starts_with('-') || arg == "-" {
            positional.push(arg);
            continue;
        }
        if arg == "--" {
            options_done = true;
            continue;
        }
        if arg == "-h" || arg == "--help" {
            return Err(ArgsError::HelpRequested);
        }
        if arg == "-i" || arg == "--intermediate" {
            intermediate = true;
            continue;
        }

        let (option, value) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => {
                let option = valued_option(name)
                    .ok_or_else(|| ArgsError::UnknownOption(arg.clone()))?;
                (option, value.to_string())
            }
            _ => {
                let option =
                    valued_option(&arg).ok_or_else(|| ArgsError::UnknownOption(arg.clone()))?;
                (option, iter.next().ok_or(ArgsError::MissingValue(option))?)
            }
        };

        match option {
            "progress" => {
                progress = value.parse().map_err(|_| ArgsError::InvalidValue {
                    option,
                    value: value.clone(),
                })?;
            }
            "max-h" => max_step = Some(parse_f64(option, &value)?),
            _ => blur = parse_f64(option, &value)?,
        }
    }

    let [xsize, ysize, input, output]: [String; 4] = positional
        .try_into()
        .map_err(|rest: Vec<String>| ArgsError::WrongArgumentCount(rest.len()))?;

    Ok(Args {
        xsize: parse_size("xsize", &xsize)?,
        ysize: parse_size("ysize", &ysize)?,
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        progress,
        intermediate,
        max_step,
        blur,
    })
}
