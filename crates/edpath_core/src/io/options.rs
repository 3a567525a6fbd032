use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use edpath_derive::{CliOptions, CliValue, KvDisplay};
use log::LevelFilter;

use crate::{Error, Result, constants::DEFAULT_CACHE_DIR, memo::MemoBand};

/// Runtime options for route solving.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Waypoint list files, solved as consecutive legs. Empty means stdin.
    #[cli(long = "input", value = "path,...")]
    #[kv(fmt = "list")]
    pub input: Vec<String>,
    /// JSON coordinate table used instead of the network lookup.
    #[cli(long = "coords", value = "path")]
    pub coords: String,
    /// Root of the file cache for coordinates and solved sub-problems.
    #[cli(long = "cache-dir", value = "path")]
    #[kv(fmt = "path")]
    pub cache_dir: PathBuf,
    /// Interior size above which the route is split in two halves.
    #[cli(long = "split-threshold")]
    pub split_threshold: usize,
    /// Cut positions tried on either side of the split midpoint (max 3).
    #[cli(long = "split-window")]
    pub split_window: usize,
    /// Smallest interior size looked up in the memo store.
    #[cli(long = "memo-min")]
    pub memo_min: usize,
    /// Largest interior size looked up in the memo store.
    #[cli(long = "memo-max")]
    pub memo_max: usize,
    /// Seed of the initial interior shuffle.
    #[cli(long = "seed")]
    pub seed: u64,
    /// Branch-and-bound flavour: `recursive` or `cursor`.
    #[cli(long = "search", parse_with = "SearchMode::parse", value = "recursive|cursor")]
    pub search: SearchMode,
    /// Persist solved sub-problems to the file cache.
    #[cli(long = "persist")]
    pub persist: bool,
    /// Solve split halves on parallel workers.
    #[cli(long = "parallel")]
    pub parallel: bool,
    /// Optimize major waypoints only, then insert minor ones.
    #[cli(long = "skip-minor")]
    pub skip_minor: bool,
    /// Delay after each network lookup, in milliseconds.
    #[cli(long = "request-delay-ms")]
    pub request_delay_ms: u64,
    /// Structured logging level.
    #[cli(
        long = "log-level",
        parse_with = "LogLevel::parse",
        value = "error|warn|info|debug|trace|off"
    )]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse", value = "compact|pretty")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp")]
    pub log_timestamp: bool,
    /// Optional output file for logs. Empty means stderr.
    #[cli(long = "log-output", value = "path")]
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, CliValue)]
#[cli_value(option = "search")]
pub enum SearchMode {
    #[default]
    #[cli(alias = "bnb")]
    Recursive,
    #[cli(alias = "permutations")]
    Cursor,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            coords: String::new(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            split_threshold: 10,
            split_window: 3,
            memo_min: 4,
            memo_max: 9,
            seed: 12345,
            search: SearchMode::Recursive,
            persist: true,
            parallel: true,
            skip_minor: false,
            request_delay_ms: 3_000,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.split_threshold == 0 {
            return Err(Error::invalid_input("--split-threshold must be at least 1"));
        }
        if self.memo_min > self.memo_max {
            return Err(Error::invalid_input(format!(
                "--memo-min ({}) must not exceed --memo-max ({})",
                self.memo_min, self.memo_max
            )));
        }
        Ok(())
    }

    pub fn usage() -> String {
        format!(
            concat!(
                "Usage:\n",
                "  edpath [options] --input route.txt[,next-leg.txt]\n",
                "  edpath [options] < route.txt\n\n",
                "Options:\n",
                "{}",
                "  --help\n",
                "\n",
                "Examples:\n",
                "  edpath --input route.txt --log-level info\n",
                "  edpath --coords systems.json --no-persist < route.txt\n",
                "  edpath --split-threshold 8 --skip-minor --input a.txt,b.txt\n",
            ),
            Self::cli_usage()
        )
    }

    pub fn memo_band(&self) -> MemoBand {
        MemoBand::new(self.memo_min, self.memo_max)
    }

    pub fn input_paths(&self) -> Vec<&Path> {
        self.input
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty() && *p != "-")
            .map(Path::new)
            .collect()
    }

    pub fn coords_path(&self) -> Option<&Path> {
        non_empty_path(&self.coords)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_empty_path(&self.log_output)
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_dir
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn non_empty_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use log::LevelFilter;

    use super::{LogFormat, LogLevel, SearchMode, SolverOptions};

    #[test]
    fn defaults_match_documented_values() {
        let options = SolverOptions::default();
        assert_eq!(options.split_threshold, 10);
        assert_eq!(options.split_window, 3);
        assert_eq!((options.memo_min, options.memo_max), (4, 9));
        assert_eq!(options.seed, 12345);
        assert_eq!(options.search, SearchMode::Recursive);
        assert!(options.persist);
        assert!(options.parallel);
        assert!(!options.skip_minor);
        assert_eq!(options.cache_root(), Path::new(".edpathcache"));
        assert_eq!(options.request_delay().as_secs(), 3);
    }

    #[test]
    fn parse_from_iter_applies_known_cli_options() {
        let options = SolverOptions::parse_from_iter([
            "--input=leg1.txt,leg2.txt",
            "--coords",
            "systems.json",
            "--cache-dir=/tmp/cache",
            "--split-threshold=8",
            "--split-window=2",
            "--memo-min=3",
            "--memo-max=7",
            "--seed=9",
            "--search=cursor",
            "--no-persist",
            "--parallel=false",
            "--skip-minor",
            "--request-delay-ms=0",
            "--log-level=debug",
            "--log-format=pretty",
            "--log-timestamp=off",
            "--log-output=run.log",
        ])
        .expect("parse options");

        assert_eq!(
            options.input_paths(),
            vec![Path::new("leg1.txt"), Path::new("leg2.txt")]
        );
        assert_eq!(options.coords_path(), Some(Path::new("systems.json")));
        assert_eq!(options.cache_root(), Path::new("/tmp/cache"));
        assert_eq!(options.split_threshold, 8);
        assert_eq!(options.split_window, 2);
        assert_eq!(options.memo_band().min, 3);
        assert_eq!(options.memo_band().max, 7);
        assert_eq!(options.seed, 9);
        assert_eq!(options.search, SearchMode::Cursor);
        assert!(!options.persist);
        assert!(!options.parallel);
        assert!(options.skip_minor);
        assert_eq!(options.request_delay_ms, 0);
        assert_eq!(options.log_level, LogLevel::Debug);
        assert_eq!(options.log_format, LogFormat::Pretty);
        assert!(!options.log_timestamp);
        assert_eq!(options.log_output_path(), Some(Path::new("run.log")));
    }

    #[test]
    fn search_mode_accepts_aliases_case_insensitively() {
        assert_eq!(SearchMode::parse("BnB").expect("parse"), SearchMode::Recursive);
        assert_eq!(
            SearchMode::parse("Permutations").expect("parse"),
            SearchMode::Cursor
        );
        let err = SearchMode::parse("greedy").expect_err("unknown mode");
        assert!(err.to_string().contains("recursive|cursor"));
    }

    #[test]
    fn rejects_flag_values_on_negated_flags() {
        let err = SolverOptions::parse_from_iter(["--no-parallel=true"])
            .expect_err("expected flag value rejection");
        assert!(err.to_string().contains("does not take a value"));
    }

    #[test]
    fn rejects_unknown_option() {
        let err = SolverOptions::parse_from_iter(["--tour-file=out.txt"])
            .expect_err("expected unknown option error");
        assert!(err.to_string().contains("Unknown option: --tour-file"));
    }

    #[test]
    fn rejects_unexpected_positional_argument() {
        let err =
            SolverOptions::parse_from_iter(["route.txt"]).expect_err("expected positional error");
        assert!(err.to_string().contains("Unexpected argument: route.txt"));
    }

    #[test]
    fn requires_a_value_for_valued_options() {
        let err = SolverOptions::parse_from_iter(["--seed"]).expect_err("missing value");
        assert!(err.to_string().contains("Missing value for --seed"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err =
            SolverOptions::parse_from_iter(["--split-threshold=many"]).expect_err("bad number");
        assert!(err.to_string().contains("Invalid value for --split-threshold"));
    }

    #[test]
    fn validate_rejects_inverted_memo_band() {
        let err = SolverOptions::parse_from_iter(["--memo-min=8", "--memo-max=5"])
            .expect_err("inverted band");
        assert!(err.to_string().contains("--memo-min (8)"));
    }

    #[test]
    fn validate_rejects_zero_split_threshold() {
        let err =
            SolverOptions::parse_from_iter(["--split-threshold=0"]).expect_err("zero threshold");
        assert!(err.to_string().contains("--split-threshold"));
    }

    #[test]
    fn help_returns_usage_error() {
        let err = SolverOptions::parse_from_iter(["--help"]).expect_err("help short-circuits");
        let msg = err.to_string();
        assert!(msg.contains("Usage:"));
        assert!(msg.contains("--split-threshold <usize>"));
        assert!(msg.contains("--no-persist"));
    }

    #[test]
    fn dash_and_empty_paths_mean_standard_streams() {
        let options = SolverOptions {
            input: vec!["-".to_string()],
            log_output: " ".to_string(),
            ..SolverOptions::default()
        };
        assert!(options.input_paths().is_empty());
        assert!(options.log_output_path().is_none());
        assert!(options.coords_path().is_none());
    }

    #[test]
    fn log_level_maps_to_expected_filter() {
        assert_eq!(LogLevel::Error.to_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warn.to_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::Trace);
        assert_eq!(LogLevel::Off.to_filter(), LevelFilter::Off);
    }

    #[test]
    fn kv_display_lists_every_option() {
        let rendered = SolverOptions::default().to_string();
        assert!(rendered.contains("split_threshold"));
        assert!(rendered.contains("cache_dir"));
        assert!(rendered.contains("input"));
    }
}
