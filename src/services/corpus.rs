use std::collections::{HashMap, HashSet};

use crate::models::{Language, Phrase, WordAssoc, WordEntry};
use crate::services::rhyme_index::RhymeIndex;
use crate::utils::phrase_to_words;

/// Parsed corpus items before indexing
#[derive(Debug, Default)]
pub struct CorpusBatch {
    pub words: Vec<WordEntry>,
    pub assocs: Vec<WordAssoc>,
    pub phrases: Vec<Phrase>,
}

/// Words, phrases, and rhyme data for one language. Immutable once built.
#[derive(Debug)]
pub struct Corpus {
    pub language: Language,
    pub words: Vec<WordEntry>,
    pub assocs: Vec<WordAssoc>,
    pub phrases: Vec<Phrase>,
    pub rhymes: RhymeIndex,
    phrase_index: HashMap<String, Vec<usize>>,
}

impl Corpus {
    pub fn new(language: Language, batch: CorpusBatch, nsfw_words: &HashSet<String>) -> Self {
        let CorpusBatch { words, assocs, mut phrases } = batch;

        let mut phrase_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, phrase) in phrases.iter_mut().enumerate() {
            let mut seen = HashSet::new();
            for word in phrase_to_words(&phrase.text) {
                if nsfw_words.contains(&word) {
                    phrase.nsfw = true;
                }
                if seen.insert(word.clone()) {
                    phrase_index.entry(word).or_default().push(i);
                }
            }
        }

        let rhymes = RhymeIndex::build(&words, &assocs, phrase_index.keys().map(String::as_str));

        Corpus {
            language,
            words,
            assocs,
            phrases,
            rhymes,
            phrase_index,
        }
    }

    /// Phrases containing `word` as a whole word, in corpus order
    pub fn phrases_with_word<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a Phrase> + 'a {
        self.phrase_index
            .get(&word.to_lowercase())
            .into_iter()
            .flatten()
            .map(move |&i| &self.phrases[i])
    }

    /// Dictionary words without a phonetic entry, by canonical spelling
    pub fn missing_phonetics(&self) -> Vec<&WordEntry> {
        let mut missing: Vec<&WordEntry> =
            self.words.iter().filter(|w| w.phonetics.is_empty()).collect();
        missing.sort_unstable_by(|a, b| a.canonical().cmp(b.canonical()));
        missing
    }
}
