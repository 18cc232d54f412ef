use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::warn;

use crate::error::AppError;
use crate::models::{Category, Language, SplitMode};
use crate::services::generator::DEFAULT_MAX_RESULTS;

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Serve,
    Query {
        words: Vec<String>,
        mode: SplitMode,
        language: Option<Language>,
        categories: BTreeSet<Category>,
        include_nsfw: bool,
    },
    MissingPhonetics {
        language: Language,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_host: String,
    pub share_dir: PathBuf,
    pub langs: Vec<Language>,
    pub log_file: Option<String>,
    pub rhyme_api: Option<String>,
    pub max_results: usize,
    pub action: Action,
}

pub fn build_cli() -> Command {
    Command::new("pungent")
        .version("0.1")
        .about("Pun generator service and web form")
        .subcommand(Command::new("serve").about("Serve the web form and query API (default)"))
        .subcommand(
            Command::new("query")
                .about("Print puns for the given words")
                .arg(Arg::new("input").required(true).num_args(1..).help("Words to find puns for"))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .num_args(1)
                        .value_parser(["word", "wordblob"])
                        .default_value("word")
                        .help("word: each item is a word; wordblob: each item is split into words"),
                )
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .num_args(1)
                        .value_parser(["en", "es", "fr"])
                        .help("Language of the phrases to use (defaults to en)"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .num_args(1)
                        .action(ArgAction::Append)
                        .value_parser(["lyrics", "phrases", "urban", "jokes", "proverbs", "quotes"])
                        .help("Only use phrases from this category (repeatable)"),
                )
                .arg(
                    Arg::new("nsfw")
                        .long("nsfw")
                        .action(ArgAction::SetTrue)
                        .help("Include NSFW phrases"),
                ),
        )
        .subcommand(
            Command::new("missing-phonetics")
                .about("List dictionary words without a phonetic entry")
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .num_args(1)
                        .value_parser(["en", "es", "fr"])
                        .default_value("en")
                        .help("Language to inspect"),
                ),
        )
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .global(true)
                .num_args(1)
                .default_value("0.0.0.0:2345")
                .help("Specify the listen address (e.g., 0.0.0.0:2345)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("share-dir")
                .long("share-dir")
                .global(true)
                .num_args(1)
                .default_value("./share")
                .help("Directory containing the corpus files"),
        )
        .arg(
            Arg::new("langs")
                .long("langs")
                .global(true)
                .num_args(1)
                .default_value("en,es,fr")
                .help("Comma-separated list of languages to load"),
        )
        .arg(
            Arg::new("rhyme-api")
                .long("rhyme-api")
                .global(true)
                .num_args(1)
                .help("Base URL of a Datamuse-compatible rhyme service (e.g., https://api.datamuse.com)"),
        )
        .arg(
            Arg::new("max-results")
                .long("max-results")
                .global(true)
                .num_args(1)
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .help("Maximum number of puns per query"),
        )
}

fn parse_langs(langs: &str) -> Vec<Language> {
    let mut parsed = Vec::new();
    for lang in langs.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        match lang.parse::<Language>() {
            Ok(language) if !parsed.contains(&language) => parsed.push(language),
            Ok(_) => {}
            Err(e) => warn!("Skipping language: {}", e),
        }
    }
    parsed
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, AppError> {
        let action = match matches.subcommand() {
            Some(("query", sub)) => Action::Query {
                words: sub
                    .get_many::<String>("input")
                    .map(|vals| vals.cloned().collect())
                    .unwrap_or_default(),
                mode: sub
                    .get_one::<String>("mode")
                    .map(|m| m.parse::<SplitMode>())
                    .transpose()?
                    .unwrap_or(SplitMode::Word),
                language: sub.get_one::<String>("lang").map(|l| l.parse::<Language>()).transpose()?,
                categories: sub
                    .get_many::<String>("category")
                    .map(|vals| vals.map(|c| c.parse()).collect::<Result<BTreeSet<Category>, AppError>>())
                    .transpose()?
                    .unwrap_or_default(),
                include_nsfw: sub.get_flag("nsfw"),
            },
            Some(("missing-phonetics", sub)) => Action::MissingPhonetics {
                language: sub
                    .get_one::<String>("lang")
                    .map(|l| l.parse::<Language>())
                    .transpose()?
                    .unwrap_or_default(),
            },
            _ => Action::Serve,
        };

        let mut langs = matches
            .get_one::<String>("langs")
            .map(|l| parse_langs(l))
            .unwrap_or_default();
        if langs.is_empty() {
            warn!("No usable languages given, loading English");
            langs.push(Language::English);
        }

        Ok(Config {
            listen_host: matches
                .get_one::<String>("listen-host")
                .cloned()
                .unwrap_or_else(|| "0.0.0.0:2345".to_string()),
            share_dir: matches
                .get_one::<String>("share-dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./share")),
            langs,
            log_file: matches.get_one::<String>("log-file").cloned(),
            rhyme_api: matches.get_one::<String>("rhyme-api").cloned(),
            max_results: matches
                .get_one::<usize>("max-results")
                .copied()
                .unwrap_or(DEFAULT_MAX_RESULTS),
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let matches = build_cli().try_get_matches_from(args).unwrap();
        Config::from_matches(&matches).unwrap()
    }

    #[test]
    fn test_defaults_serve() {
        let config = parse(&["pungent"]);
        assert_eq!(config.action, Action::Serve);
        assert_eq!(config.listen_host, "0.0.0.0:2345");
        assert_eq!(config.share_dir, PathBuf::from("./share"));
        assert_eq!(config.langs, vec![Language::English, Language::Spanish, Language::French]);
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.rhyme_api.is_none());
    }

    #[test]
    fn test_langs_are_filtered() {
        let config = parse(&["pungent", "serve", "--langs", "fr, de,fr"]);
        assert_eq!(config.langs, vec![Language::French]);

        let config = parse(&["pungent", "--langs", "xx"]);
        assert_eq!(config.langs, vec![Language::English]);
    }

    #[test]
    fn test_query_subcommand() {
        let config = parse(&[
            "pungent", "query", "rye", "bread", "--mode", "wordblob", "--lang", "es",
            "--category", "lyrics", "--category", "jokes", "--nsfw", "--max-results", "5",
        ]);
        assert_eq!(config.max_results, 5);
        assert_eq!(
            config.action,
            Action::Query {
                words: vec!["rye".into(), "bread".into()],
                mode: SplitMode::WordBlob,
                language: Some(Language::Spanish),
                categories: BTreeSet::from([Category::Lyrics, Category::Jokes]),
                include_nsfw: true,
            }
        );
    }

    #[test]
    fn test_missing_phonetics_subcommand() {
        let config = parse(&["pungent", "missing-phonetics", "--lang", "fr"]);
        assert_eq!(config.action, Action::MissingPhonetics { language: Language::French });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(build_cli().try_get_matches_from(["pungent", "query", "rye", "--lang", "de"]).is_err());
        assert!(build_cli().try_get_matches_from(["pungent", "query"]).is_err());
        assert!(build_cli().try_get_matches_from(["pungent", "--max-results", "0"]).is_err());
    }
}
