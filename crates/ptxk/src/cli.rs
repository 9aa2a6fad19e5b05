use std::env;

pub const USAGE: &str = "\
Usage: ptxk [options] <file>...

Options:
    --canonical       rename blocks to `$BB_<file index>_<block id>`
    --dfg             build the dataflow graph before printing declarations
    --banner <text>   print `/* <text> */` above each kernel
    -v, --verbose     log each stage (also enabled by `PTXK_VERBOSE`)";

/// Configuration for one run of the driver.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub files: Vec<String>,
    pub canonical: bool,
    pub dfg: bool,
    pub banner: Option<String>,
    pub verbose: bool,
}

impl Config {
    /// Parse command line arguments and environment variables
    pub fn from_args() -> Result<Self, String> {
        Self::parse(env::args().skip(1), env::var_os("PTXK_VERBOSE").is_some())
    }

    fn parse(args: impl IntoIterator<Item = String>, verbose: bool) -> Result<Self, String> {
        let mut config = Self { verbose, ..Self::default() };
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--canonical" => config.canonical = true,
                "--dfg" => config.dfg = true,
                "-v" | "--verbose" => config.verbose = true,
                "--banner" => {
                    config.banner = Some(args.next().ok_or("`--banner` expects a value")?);
                }
                _ if arg.starts_with('-') && arg != "-" => {
                    return Err(format!("unknown option `{arg}`"));
                }
                _ => config.files.push(arg),
            }
        }

        if config.files.is_empty() {
            return Err("no input files".to_owned());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    fn parse(args: &[&str]) -> Result<Config, String> {
        Config::parse(args.iter().map(|it| (*it).to_owned()), false)
    }

    #[test]
    fn flags_and_files() {
        let config = parse(&["a.ptx", "--canonical", "--banner", "ptxk 0.1", "b.ptx", "-v"]).unwrap();

        assert_eq!(
            config,
            Config {
                files: vec!["a.ptx".to_owned(), "b.ptx".to_owned()],
                canonical: true,
                dfg: false,
                banner: Some("ptxk 0.1".to_owned()),
                verbose: true,
            }
        );
    }

    #[test]
    fn environment_enables_verbose() {
        let config = Config::parse(["-".to_owned()], true).unwrap();
        assert!(config.verbose);
        assert_eq!(config.files, ["-"]);
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(parse(&[]).unwrap_err(), "no input files");
        assert_eq!(parse(&["--banner"]).unwrap_err(), "`--banner` expects a value");
        assert_eq!(parse(&["--frob", "a.ptx"]).unwrap_err(), "unknown option `--frob`");
    }
}
