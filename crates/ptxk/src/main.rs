#![forbid(unsafe_code)]
#![allow(clippy::match_bool)]

use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::{fmt, fs};

use ptxk_kernel::{BuildError, Kernel, WriteOptions};
use tracing::level_filters::LevelFilter;

mod cli;

use cli::Config;

enum Error {
    Io(io::Error),
    Parse(usize),
    Build(BuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Parse(count) => write!(f, "failed to tokenize kernel ({count} error(s))"),
            Self::Build(e) => write!(f, "invalid kernel: {e}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<BuildError> for Error {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

fn read_source(path: &str) -> io::Result<String> {
    match path {
        "-" => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        _ => fs::read_to_string(path),
    }
}

fn process(
    config: &Config,
    options: &WriteOptions,
    path: &str,
    kernel_id: u32,
    out: &mut impl Write,
) -> Result<(), Error> {
    let source = read_source(path)?;

    let output = ptxk_asm::tokenize(&source);
    if !output.errors.is_empty() {
        for error in &output.errors {
            tracing::error!("{error}");
        }

        return Err(Error::Parse(output.errors.len()));
    }

    let mut kernel = Kernel::from_statements(&output.statements)?;

    tracing::info!(
        kernel = %kernel.name,
        blocks = kernel.cfg().len(),
        registers = kernel.registers().len(),
        "built kernel"
    );

    if config.dfg {
        let _ = kernel.dfg();
    }

    if config.canonical {
        kernel.canonical_block_labels(kernel_id);
    }

    kernel.write(out, options)?;

    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    let level = match config.verbose {
        true => LevelFilter::DEBUG,
        false => LevelFilter::WARN,
    };

    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    let options = WriteOptions { banner: config.banner.clone() };
    let mut out = io::stdout().lock();
    let mut failed = false;

    for (path, kernel_id) in config.files.iter().zip(0..) {
        let _span = tracing::info_span!("file", path = %path).entered();

        if let Err(e) = process(&config, &options, path, kernel_id, &mut out) {
            tracing::error!("{e}");
            failed = true;
        }
    }

    match failed {
        true => ExitCode::FAILURE,
        false => ExitCode::SUCCESS,
    }
}
