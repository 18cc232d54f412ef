use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::CorpusError;
use crate::models::{Category, Language, Phrase, Source, WordAssoc, WordEntry};
use crate::services::corpus::{Corpus, CorpusBatch};

/// Used when an association has no `type`
const DEFAULT_ASSOC_TYPE: &str = "generic";

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize)]
struct RawWord {
    #[serde(alias = "spelling")]
    spellings: Option<OneOrMany<String>>,
    #[serde(alias = "phonetic")]
    phonetics: Option<OneOrMany<String>>,
    source: Option<Value>,
}

#[derive(Deserialize)]
struct RawPhrase {
    #[serde(alias = "phrase")]
    phrases: Option<OneOrMany<String>>,
    source: Option<Value>,
    #[serde(default)]
    nsfw: bool,
    category: Option<String>,
}

#[derive(Deserialize)]
struct RawAssocPair {
    word1: Option<String>,
    word2: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct RawAssoc {
    #[serde(alias = "assoc")]
    assocs: Option<OneOrMany<RawAssocPair>>,
    source: Option<Value>,
}

fn normalize(items: Option<OneOrMany<String>>) -> Vec<String> {
    items
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse JSON-lines corpus items into `batch`.
/// Malformed lines and unknown item types are logged and skipped.
pub fn parse_items<R: BufRead>(
    reader: R,
    origin: &str,
    default_category: Option<Category>,
    batch: &mut CorpusBatch,
) -> Result<(), CorpusError> {
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let item: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(source) => {
                let err = CorpusError::Json { line: i + 1, source };
                warn!("Skipping item in {}: {}", origin, err);
                continue;
            }
        };

        let kind = item.get("type").and_then(Value::as_str).map(str::to_string);
        let result = match kind.as_deref() {
            None => {
                warn!("Item with no type field in {} line {}", origin, i + 1);
                Ok(())
            }
            Some("word" | "words") => serde_json::from_value(item).map(|raw| push_word(raw, batch)),
            Some("assoc" | "word_assoc") => serde_json::from_value(item).map(|raw| push_assocs(raw, batch)),
            Some("phrase" | "phrases") => serde_json::from_value(item)
                .map(|raw| push_phrases(raw, default_category, origin, batch)),
            Some("paragraph") => {
                debug!("Ignoring paragraph item in {} line {}", origin, i + 1);
                Ok(())
            }
            Some(other) => {
                warn!("Unrecognized item type '{}' in {} line {}", other, origin, i + 1);
                Ok(())
            }
        };

        if let Err(source) = result {
            let err = CorpusError::Json { line: i + 1, source };
            warn!("Skipping item in {}: {}", origin, err);
        }
    }

    Ok(())
}

fn push_word(raw: RawWord, batch: &mut CorpusBatch) {
    let mut spellings: Vec<String> = normalize(raw.spellings)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    if spellings.is_empty() {
        return;
    }
    spellings.sort();
    spellings.dedup();

    batch.words.push(WordEntry {
        spellings,
        phonetics: normalize(raw.phonetics),
        source: Arc::new(Source::from_value(raw.source)),
    });
}

fn push_assocs(raw: RawAssoc, batch: &mut CorpusBatch) {
    let source = Arc::new(Source::from_value(raw.source));
    let pairs = raw.assocs.map(OneOrMany::into_vec).unwrap_or_default();

    for pair in pairs {
        let (Some(word1), Some(word2)) = (pair.word1, pair.word2) else {
            continue;
        };
        batch.assocs.push(WordAssoc {
            word1: word1.trim().to_lowercase(),
            word2: word2.trim().to_lowercase(),
            kind: pair.kind.unwrap_or_else(|| DEFAULT_ASSOC_TYPE.to_string()),
            source: Arc::clone(&source),
        });
    }
}

fn push_phrases(
    raw: RawPhrase,
    default_category: Option<Category>,
    origin: &str,
    batch: &mut CorpusBatch,
) {
    let category = match raw.category.as_deref().map(str::parse::<Category>) {
        Some(Ok(category)) => category,
        Some(Err(e)) => {
            warn!("{} in {}, using file category", e, origin);
            default_category.unwrap_or(Category::Phrases)
        }
        None => default_category.unwrap_or(Category::Phrases),
    };
    let source = Arc::new(Source::from_value(raw.source));

    for text in normalize(raw.phrases) {
        batch.phrases.push(Phrase {
            text,
            category,
            nsfw: raw.nsfw,
            source: Arc::clone(&source),
        });
    }
}

/// Load a plain text word list (one word per line), lowercased
pub fn load_word_list(file_path: &Path) -> io::Result<HashSet<String>> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    let mut words = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_lowercase());
        }
    }

    Ok(words)
}

fn load_jsonl(path: &Path, default_category: Option<Category>, batch: &mut CorpusBatch) {
    let origin = path.display().to_string();
    let result = File::open(path)
        .map_err(CorpusError::from)
        .and_then(|file| parse_items(BufReader::new(file), &origin, default_category, batch));

    if let Err(e) = result {
        warn!("Failed to load corpus file {}: {}", origin, e);
    }
}

/// Load the corpus for a language from `<share>/corpus/<lang>/` and
/// `<share>/nsfw/<lang>.txt`. Missing files are treated as empty.
pub fn load_corpus(share_dir: &Path, lang: Language) -> Corpus {
    let lang_dir = share_dir.join("corpus").join(lang.code());
    let mut batch = CorpusBatch::default();

    load_jsonl(&lang_dir.join("words.jsonl"), None, &mut batch);
    for category in Category::ALL {
        let path = lang_dir.join(format!("{}.jsonl", category.name()));
        if path.exists() {
            load_jsonl(&path, Some(category), &mut batch);
        } else {
            debug!("No {} corpus for {} at {}", category, lang, path.display());
        }
    }

    let nsfw_path = share_dir.join("nsfw").join(format!("{}.txt", lang.code()));
    let nsfw_words = load_word_list(&nsfw_path).unwrap_or_else(|_| {
        warn!("Failed to load NSFW word list for {} at {}.", lang, nsfw_path.display());
        HashSet::new()
    });

    let corpus = Corpus::new(lang, batch, &nsfw_words);
    info!(
        "Loaded {} corpus: {} words, {} associations, {} phrases ({} NSFW), {} rhymable words",
        lang,
        corpus.words.len(),
        corpus.assocs.len(),
        corpus.phrases.len(),
        corpus.phrases.iter().filter(|p| p.nsfw).count(),
        corpus.rhymes.len()
    );
    corpus
}
