//! Body text extraction and readability metrics

use scraper::node::Node;
use scraper::ElementRef;

/// Elements whose text never counts as body content
pub(crate) const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "template", "svg",
];

/// Score returned for text without any countable sentence or word
const NEUTRAL_READING_EASE: f64 = 60.0;

/// Collects the visible text below `root`, skipping non-content subtrees
///
/// Whitespace runs are collapsed to single spaces.
pub fn visible_text(root: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(root, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if !NON_CONTENT_TAGS.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Iterates the words of a text: maximal runs of alphanumerics and `_`
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

pub fn word_count(text: &str) -> usize {
    words(text).count()
}

/// Splits text into sentences on `.`, `!` and `?`
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(&['.', '!', '?'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Heuristic syllable count: vowel groups, minus a trailing silent `e`, at least one
pub fn syllables(word: &str) -> usize {
    const VOWELS: &str = "aeiouy";
    let lower = word.to_lowercase();
    let mut count: isize = 0;
    let mut previous_vowel = false;

    for c in lower.chars() {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = is_vowel;
    }

    if lower.ends_with('e') {
        count -= 1;
    }

    count.max(1) as usize
}

/// Flesch reading ease, clamped to 0..=100
///
/// `206.835 - 1.015 × words/sentences - 84.6 × syllables/words`
pub fn flesch_reading_ease(text: &str) -> f64 {
    let sentence_count = sentences(text).count();
    let word_list: Vec<&str> = words(text).collect();

    if sentence_count == 0 || word_list.is_empty() {
        return NEUTRAL_READING_EASE;
    }

    let syllable_count: usize = word_list.iter().map(|w| syllables(w)).sum();
    let words_per_sentence = word_list.len() as f64 / sentence_count as f64;
    let syllables_per_word = syllable_count as f64 / word_list.len() as f64;

    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    score.clamp(0.0, 100.0)
}
