/// Punctuation stripped from the edges of a word
fn is_edge_punct(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '¡' | '¿' | '“' | '”' | '‘' | '’' | '«' | '»' | '…')
}

fn is_vowel(c: char) -> bool {
    matches!(
        c,
        'a' | 'e' | 'i' | 'o' | 'u' | 'y'
            | 'á' | 'é' | 'í' | 'ó' | 'ú'
            | 'à' | 'â' | 'æ' | 'è' | 'ê' | 'ë' | 'î' | 'ï' | 'ô' | 'œ' | 'ù' | 'û' | 'ü' | 'ÿ'
    )
}

/// Split a phrase into lowercase words.
/// Contractions and hyphenated words are kept whole ("shouldn't", "dog-eat-dog").
pub fn phrase_to_words(phrase: &str) -> Vec<String> {
    phrase
        .split_whitespace()
        .map(|token| token.trim_matches(is_edge_punct).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Rhyme key for a phonetic respelling such as "rahy" or "roo-bee":
/// the last syllable from its first vowel onward.
pub fn rhyme_key(phonetic: &str) -> Option<String> {
    let last = phonetic.trim().rsplit('-').next()?;
    let syllable: Vec<char> = last
        .chars()
        .filter(|c| c.is_alphabetic() && !matches!(c, 'ˈ' | 'ˌ'))
        .flat_map(char::to_lowercase)
        .collect();
    if syllable.is_empty() {
        return None;
    }

    // a leading 'y' is a consonant
    let start = syllable
        .iter()
        .enumerate()
        .position(|(i, &c)| is_vowel(c) && !(i == 0 && c == 'y'))
        .unwrap_or(0);
    Some(syllable[start..].iter().collect())
}

/// Orthographic rhyme key for words without a phonetic entry:
/// the spelling from its last vowel group onward, skipping a silent final 'e'.
pub fn spelling_rhyme_key(spelling: &str) -> Option<String> {
    let letters: Vec<char> = spelling
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return None;
    }

    let is_v = |i: usize| is_vowel(letters[i]) && !(i == 0 && letters[i] == 'y');

    let mut end = letters.len();
    if end > 2 && letters[end - 1] == 'e' && !is_v(end - 2) {
        end -= 1;
    }

    let mut i = end;
    while i > 0 && !is_v(i - 1) {
        i -= 1;
    }
    if i == 0 {
        return Some(letters.iter().collect());
    }
    while i > 0 && is_v(i - 1) {
        i -= 1;
    }

    Some(letters[i..].iter().collect())
}

/// Carry the capitalization of `original` over to `replacement`
fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }

    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(o), Some(first)) if o.is_uppercase() => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}

/// Replace every whole-word occurrence of `target` (case-insensitive) in `phrase`.
/// Edge punctuation and whitespace are preserved.
/// Returns None if `target` does not occur.
pub fn replace_word(phrase: &str, target: &str, replacement: &str) -> Option<String> {
    let target = target.to_lowercase();
    let mut out = String::with_capacity(phrase.len() + replacement.len());
    let mut replaced = false;

    for piece in phrase.split_inclusive(char::is_whitespace) {
        let token = piece.trim_end_matches(char::is_whitespace);
        let trailing = &piece[token.len()..];
        let core = token.trim_matches(is_edge_punct);

        if !core.is_empty() && core.to_lowercase() == target {
            let start = token.len() - token.trim_start_matches(is_edge_punct).len();
            let end = start + core.len();
            out.push_str(&token[..start]);
            out.push_str(&match_case(core, replacement));
            out.push_str(&token[end..]);
            replaced = true;
        } else {
            out.push_str(token);
        }
        out.push_str(trailing);
    }

    replaced.then_some(out)
}
