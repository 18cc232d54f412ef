use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::services::corpus::Corpus;
use crate::services::datamuse::RhymeApi;

/// Application state shared across all handlers
pub struct AppState {
    pub corpora: HashMap<Language, Corpus>,
    pub rhyme_api: Option<RhymeApi>,
    pub max_results: usize,
}

impl AppState {
    /// Corpus for the requested language, English when unset
    pub fn corpus(&self, language: Option<Language>) -> Result<&Corpus, AppError> {
        let language = language.unwrap_or_default();
        self.corpora
            .get(&language)
            .ok_or_else(|| AppError::UnsupportedLanguage(language.code().to_string()))
    }
}

/// Pun source type a user may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lyrics,
    Phrases,
    Urban,
    Jokes,
    Proverbs,
    Quotes,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Lyrics,
        Category::Phrases,
        Category::Urban,
        Category::Jokes,
        Category::Proverbs,
        Category::Quotes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Lyrics => "lyrics",
            Category::Phrases => "phrases",
            Category::Urban => "urban",
            Category::Jokes => "jokes",
            Category::Proverbs => "proverbs",
            Category::Quotes => "quotes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Lyrics => "Lyrics",
            Category::Phrases => "Phrases",
            Category::Urban => "Urban",
            Category::Jokes => "Jokes",
            Category::Proverbs => "Proverbs",
            Category::Quotes => "Anime Quotes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lyrics" | "lyric" => Ok(Category::Lyrics),
            "phrases" | "phrase" => Ok(Category::Phrases),
            "urban" => Ok(Category::Urban),
            "jokes" | "joke" => Ok(Category::Jokes),
            "proverbs" | "proverb" => Ok(Category::Proverbs),
            "quotes" | "quote" => Ok(Category::Quotes),
            _ => Err(AppError::UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Spanish, Language::French];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "es" | "spanish" => Ok(Language::Spanish),
            "fr" | "french" => Ok(Language::French),
            _ => Err(AppError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// How query text is broken into input words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitMode {
    /// Each whitespace-separated item is taken as-is
    Word,
    /// Items are split into words with punctuation removed
    #[default]
    WordBlob,
}

impl FromStr for SplitMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" => Ok(SplitMode::Word),
            "wordblob" => Ok(SplitMode::WordBlob),
            _ => Err(AppError::InvalidMode(s.to_string())),
        }
    }
}

/// Tagged metadata describing where a word or phrase came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub tags: BTreeMap<String, Vec<String>>,
}

impl Source {
    pub fn from_value(value: Option<Value>) -> Self {
        let mut tags = BTreeMap::new();
        if let Some(Value::Object(map)) = value {
            for (tag, val) in map {
                let vals = match val {
                    Value::Null => continue,
                    Value::String(s) => vec![s],
                    Value::Array(items) => items.into_iter().map(value_to_string).collect(),
                    other => vec![other.to_string()],
                };
                tags.insert(tag, vals);
            }
        }
        Source { tags }
    }

    pub fn display_name(&self) -> &str {
        ["name", "site_name"]
            .iter()
            .find_map(|tag| self.tags.get(*tag).and_then(|v| v.first()))
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct WordEntry {
    /// Sorted, lowercased; the first entry is the canonical spelling
    pub spellings: Vec<String>,
    pub phonetics: Vec<String>,
    pub source: Arc<Source>,
}

impl WordEntry {
    pub fn canonical(&self) -> &str {
        &self.spellings[0]
    }
}

#[derive(Debug, Clone)]
pub struct WordAssoc {
    pub word1: String,
    pub word2: String,
    pub kind: String,
    pub source: Arc<Source>,
}

#[derive(Debug, Clone)]
pub struct Phrase {
    pub text: String,
    pub category: Category,
    pub nsfw: bool,
    pub source: Arc<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pun {
    pub source: String,
    pub category: Category,
    pub original_phrase: String,
    pub rhymed_phrase: String,
    pub rhyme: String,
}

/// A packaged form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunRequest {
    pub input: String,
    pub categories: BTreeSet<Category>,
    pub language: Option<Language>,
    pub include_nsfw: bool,
    pub mode: SplitMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub output: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub input: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct QueryParams {
    pub input: String,
    /// Comma-separated category names
    pub categories: Option<String>,
    pub language: Option<String>,
    pub nsfw: Option<bool>,
    pub mode: Option<String>,
}

impl From<QueryParams> for QueryRequest {
    fn from(params: QueryParams) -> Self {
        QueryRequest {
            input: params.input,
            categories: params
                .categories
                .map(|c| c.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            language: params.language,
            nsfw: params.nsfw.unwrap_or(false),
            mode: params.mode,
        }
    }
}

impl TryFrom<QueryRequest> for PunRequest {
    type Error = AppError;

    fn try_from(req: QueryRequest) -> Result<Self, Self::Error> {
        let categories = req
            .categories
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.parse())
            .collect::<Result<BTreeSet<Category>, _>>()?;
        let language = match req.language.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(lang) => Some(lang.parse()?),
        };
        let mode = match req.mode.as_deref() {
            None => SplitMode::default(),
            Some(mode) => mode.parse()?,
        };

        Ok(PunRequest {
            input: req.input,
            categories,
            language,
            include_nsfw: req.nsfw,
            mode,
        })
    }
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub output: String,
    pub puns: Vec<Pun>,
}

#[derive(Serialize)]
pub struct LangInfo {
    pub name: String,
    pub code: String,
    pub words: usize,
    pub phrases: usize,
}

#[derive(Serialize)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub label: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_parsing() {
        assert_eq!("Lyrics".parse::<Category>().unwrap(), Category::Lyrics);
        assert_eq!("quote".parse::<Category>().unwrap(), Category::Quotes);
        assert!("memes".parse::<Category>().is_err());
        assert_eq!(Category::Quotes.label(), "Anime Quotes");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("French".parse::<Language>().unwrap(), Language::French);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_source_from_value() {
        let source = Source::from_value(Some(json!({
            "name": "Genius",
            "author": ["A", "B"],
            "year": 1967,
            "missing": null
        })));
        assert_eq!(source.display_name(), "Genius");
        assert_eq!(source.tags["author"], vec!["A", "B"]);
        assert_eq!(source.tags["year"], vec!["1967"]);
        assert!(!source.tags.contains_key("missing"));

        let site = Source::from_value(Some(json!({"site_name": "Dictionary.com"})));
        assert_eq!(site.display_name(), "Dictionary.com");
        assert_eq!(Source::from_value(None).display_name(), "unknown");
    }

    #[test]
    fn test_query_request_into_pun_request() {
        let req = QueryRequest {
            input: "rye".into(),
            categories: vec!["lyrics".into(), "jokes".into(), "".into()],
            language: Some("".into()),
            nsfw: true,
            mode: Some("word".into()),
        };
        let pun_req = PunRequest::try_from(req).unwrap();
        assert_eq!(pun_req.categories.len(), 2);
        assert_eq!(pun_req.language, None);
        assert!(pun_req.include_nsfw);
        assert_eq!(pun_req.mode, SplitMode::Word);
    }

    #[test]
    fn test_query_request_rejects_bad_values() {
        let req = QueryRequest {
            input: "rye".into(),
            categories: vec!["memes".into()],
            language: None,
            nsfw: false,
            mode: None,
        };
        assert!(matches!(
            PunRequest::try_from(req),
            Err(AppError::UnknownCategory(_))
        ));

        let params = QueryParams {
            input: "rye".into(),
            categories: Some("lyrics,quotes".into()),
            language: Some("de".into()),
            nsfw: None,
            mode: None,
        };
        let req = QueryRequest::from(params);
        assert_eq!(req.categories, vec!["lyrics", "quotes"]);
        assert!(matches!(
            PunRequest::try_from(req),
            Err(AppError::UnsupportedLanguage(_))
        ));
    }
}
