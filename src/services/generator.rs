use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, info};

use crate::error::AppError;
use crate::models::{AppState, Category, Phrase, Pun, PunRequest, SplitMode};
use crate::services::corpus::Corpus;
use crate::utils::{phrase_to_words, replace_word};

/// Phrases used per rhyming word
pub const PHRASES_PER_RHYME: usize = 20;
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Break query text into the words to find rhymes for
pub fn input_words(input: &str, mode: SplitMode) -> Vec<String> {
    let mut words: Vec<String> = match mode {
        SplitMode::Word => input.split_whitespace().map(str::to_lowercase).collect(),
        SplitMode::WordBlob => phrase_to_words(input),
    };

    let mut seen = HashSet::new();
    words.retain(|w| seen.insert(w.clone()));
    words
}

struct PhraseFilter<'a> {
    categories: &'a BTreeSet<Category>,
    include_nsfw: bool,
}

impl PhraseFilter<'_> {
    fn accepts(&self, phrase: &Phrase) -> bool {
        (self.categories.is_empty() || self.categories.contains(&phrase.category))
            && (self.include_nsfw || !phrase.nsfw)
    }
}

/// Substitute each input word into phrases containing one of its rhymes.
/// `remote` holds extra rhymes per input word.
pub fn generate(
    corpus: &Corpus,
    words: &[String],
    request: &PunRequest,
    remote: &HashMap<String, Vec<String>>,
    max_results: usize,
) -> Vec<Pun> {
    let filter = PhraseFilter {
        categories: &request.categories,
        include_nsfw: request.include_nsfw,
    };
    let mut seen = HashSet::new();
    let mut puns = Vec::new();
    if max_results == 0 {
        return puns;
    }

    for word in words {
        let mut rhymes: BTreeSet<String> = corpus.rhymes.rhymes(word).into_iter().collect();
        if let Some(extra) = remote.get(word) {
            rhymes.extend(extra.iter().map(|w| w.to_lowercase()));
        }
        rhymes.remove(word);
        debug!("Found {} rhymes for '{}'", rhymes.len(), word);

        for rhyme in &rhymes {
            let mut taken = 0;
            for phrase in corpus.phrases_with_word(rhyme).filter(|p| filter.accepts(p)) {
                if taken >= PHRASES_PER_RHYME {
                    break;
                }
                let Some(rhymed) = replace_word(&phrase.text, rhyme, word) else {
                    continue;
                };
                if rhymed == phrase.text {
                    continue;
                }
                taken += 1;

                if seen.insert((phrase.text.clone(), rhymed.clone())) {
                    puns.push(Pun {
                        source: phrase.source.display_name().to_string(),
                        category: phrase.category,
                        original_phrase: phrase.text.clone(),
                        rhymed_phrase: rhymed,
                        rhyme: rhyme.clone(),
                    });
                    if puns.len() >= max_results {
                        return puns;
                    }
                }
            }
        }
    }

    puns
}

/// Text shown in the form's output area
pub fn render_output(puns: &[Pun]) -> String {
    puns.iter()
        .map(|pun| {
            format!(
                "original phrase: {}\nrhymed phrase: {}\n",
                pun.original_phrase, pun.rhymed_phrase
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run a request against the shared state, consulting the remote rhyme
/// service when one is configured.
pub async fn generate_puns(state: &AppState, request: &PunRequest) -> Result<Vec<Pun>, AppError> {
    let words = input_words(&request.input, request.mode);
    if words.is_empty() {
        return Err(AppError::EmptyQuery);
    }
    let corpus = state.corpus(request.language)?;

    let remote = match &state.rhyme_api {
        Some(api) => api.rhymes_for_all(&words).await,
        None => HashMap::new(),
    };

    let puns = generate(corpus, &words, request, &remote, state.max_results);
    info!(
        "Generated {} puns for {:?} ({}, {} categories, nsfw: {})",
        puns.len(),
        words,
        corpus.language,
        request.categories.len(),
        request.include_nsfw
    );
    Ok(puns)
}
