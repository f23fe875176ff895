use crate::error::{Result, StormError};
use crate::normalize::InvalidScalePolicy;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for storm_report
#[derive(Parser, Debug, Clone)]
#[command(name = "storm_report")]
#[command(about = "Rank storm event types by casualties and economic damage")]
#[command(version)]
pub struct Args {
    /// Local storm export (.csv or .csv.bz2)
    #[arg(short, long, env = "STORM_INPUT")]
    pub input: Option<PathBuf>,

    /// Remote storm export, fetched through the download cache
    #[arg(short, long, env = "STORM_SOURCE_URL")]
    pub url: Option<String>,

    #[arg(long, default_value = ".storm-cache", env = "STORM_CACHE_DIR")]
    pub cache_dir: PathBuf,

    /// Re-download cached files older than this many hours
    #[arg(long, env = "STORM_CACHE_TTL_HOURS")]
    pub cache_ttl_hours: Option<u64>,

    /// Rule table CSV with a `pattern,event_type` header
    #[arg(short, long, env = "STORM_RULES")]
    pub rules: Option<PathBuf>,

    #[arg(short = 'n', long, default_value_t = 5)]
    pub top_n: usize,

    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// fail | skip
    #[arg(long, default_value = "fail")]
    pub on_invalid_scale: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub cache_dir: PathBuf,
    pub cache_ttl: Option<Duration>,
    pub rules: Option<PathBuf>,
    pub top_n: usize,
    pub out_dir: PathBuf,
    pub invalid_scale: InvalidScalePolicy,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let source = match (args.input, args.url) {
            (Some(path), None) => Source::File(path),
            (None, Some(url)) => Source::Url(url),
            (Some(_), Some(_)) => {
                return Err(StormError::Config(
                    "give either --input or --url, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(StormError::Config(
                    "no data source: pass --input or --url".to_string(),
                ))
            }
        };
        if args.top_n == 0 {
            return Err(StormError::Config("--top-n must be at least 1".to_string()));
        }
        Ok(Config {
            source,
            cache_dir: args.cache_dir,
            cache_ttl: args.cache_ttl_hours.map(|h| Duration::from_secs(h * 3600)),
            rules: args.rules,
            top_n: args.top_n,
            out_dir: args.out_dir,
            invalid_scale: args.on_invalid_scale.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Config> {
        let mut full = vec!["storm_report"];
        full.extend_from_slice(argv);
        Config::from_args(Args::parse_from(full))
    }

    #[test]
    fn defaults() {
        let cfg = parse(&["--input", "StormData.csv.bz2"]).unwrap();
        assert_eq!(cfg.source, Source::File(PathBuf::from("StormData.csv.bz2")));
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.invalid_scale, InvalidScalePolicy::Fail);
        assert_eq!(cfg.cache_ttl, None);
    }

    #[test]
    fn url_with_ttl_and_skip_policy() {
        let cfg = parse(&[
            "--url",
            "https://example.org/StormData.csv.bz2",
            "--cache-ttl-hours",
            "2",
            "--on-invalid-scale",
            "skip",
            "-n",
            "10",
        ])
        .unwrap();
        assert!(matches!(cfg.source, Source::Url(_)));
        assert_eq!(cfg.cache_ttl, Some(Duration::from_secs(7200)));
        assert_eq!(cfg.invalid_scale, InvalidScalePolicy::Skip);
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn rejects_bad_combinations() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--input", "a.csv", "--url", "https://x/a.csv"]).is_err());
        assert!(parse(&["--input", "a.csv", "-n", "0"]).is_err());
        assert!(parse(&["--input", "a.csv", "--on-invalid-scale", "zero"]).is_err());
    }
}
