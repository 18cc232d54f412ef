use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::models::{WordAssoc, WordEntry};
use crate::utils::{rhyme_key, spelling_rhyme_key};

/// Association type that marks two words as rhyming
pub const RHYME_ASSOC: &str = "rhyme";

/// Marks orthographic keys so they never share a bucket with phonetic ones
const SPELLING_KEY_PREFIX: &str = "o:";

fn spelling_key(word: &str) -> Option<String> {
    spelling_rhyme_key(word).map(|key| format!("{}{}", SPELLING_KEY_PREFIX, key))
}

/// Groups known words by rhyme key.
#[derive(Debug, Default)]
pub struct RhymeIndex {
    by_key: HashMap<String, BTreeSet<String>>,
    keys_by_word: HashMap<String, Vec<String>>,
    explicit: HashMap<String, BTreeSet<String>>,
}

impl RhymeIndex {
    /// Index dictionary words by their phonetic keys, `rhyme` associations
    /// as explicit pairs, and any `extra_words` not in the dictionary by
    /// their spelling.
    pub fn build<'a>(
        words: &[WordEntry],
        assocs: &[WordAssoc],
        extra_words: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut index = RhymeIndex::default();

        for entry in words {
            let mut keys: Vec<String> = entry.phonetics.iter().filter_map(|p| rhyme_key(p)).collect();
            if keys.is_empty() {
                keys.extend(spelling_key(entry.canonical()));
            }
            keys.sort();
            keys.dedup();

            for spelling in &entry.spellings {
                index.insert(spelling, &keys);
            }
        }

        for word in extra_words {
            if index.keys_by_word.contains_key(word) {
                continue;
            }
            if let Some(key) = spelling_key(word) {
                index.insert(word, &[key]);
            }
        }

        for assoc in assocs.iter().filter(|a| a.kind.eq_ignore_ascii_case(RHYME_ASSOC)) {
            debug!(
                "Rhyme pair '{}' / '{}' from {}",
                assoc.word1,
                assoc.word2,
                assoc.source.display_name()
            );
            index.explicit.entry(assoc.word1.clone()).or_default().insert(assoc.word2.clone());
            index.explicit.entry(assoc.word2.clone()).or_default().insert(assoc.word1.clone());
        }

        index
    }

    fn insert(&mut self, word: &str, keys: &[String]) {
        let entry = self.keys_by_word.entry(word.to_string()).or_default();
        for key in keys {
            if !entry.contains(key) {
                entry.push(key.clone());
            }
            self.by_key.entry(key.clone()).or_default().insert(word.to_string());
        }
    }

    /// Rhyme keys for a word, falling back to its spelling when unknown
    pub fn keys_for(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        match self.keys_by_word.get(&word) {
            Some(keys) if !keys.is_empty() => keys.clone(),
            _ => spelling_key(&word).into_iter().collect(),
        }
    }

    /// All known words rhyming with `word`, excluding the word itself
    pub fn rhymes(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        let mut found = BTreeSet::new();

        for key in self.keys_for(&word) {
            if let Some(words) = self.by_key.get(&key) {
                found.extend(words.iter().cloned());
            }
        }
        if let Some(words) = self.explicit.get(&word) {
            found.extend(words.iter().cloned());
        }

        found.remove(&word);
        found.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.keys_by_word.len()
    }
}
