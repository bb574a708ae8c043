//! Sentence chunking with neighbor overlap.
//!
//! Every sentence yields one chunk made of the previous sentence, the sentence
//! itself and the next sentence, concatenated without a separator. Sentences
//! keep their trailing whitespace, so the concatenation reads like the source.

use unicode_segmentation::UnicodeSegmentation;

/// Titles, honorifics and other short forms that end in a period without
/// ending the sentence. Compared lowercased, final period removed.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "hon", "gen", "col", "capt", "lt", "sgt",
    "gov", "sen", "pres", "vs", "etc", "inc", "ltd", "co", "corp", "dept", "univ", "assn", "bros", "fig", "vol",
    "approx", "jan", "feb", "apr", "aug", "sept", "oct", "nov", "dec", "ave", "blvd",
];

/// Split `text` into English sentences.
///
/// Unicode (UAX #29) sentence boundaries are refined so that a boundary right
/// after a known abbreviation ("Mr.", "Dr.", "etc."), a single initial ("J.")
/// or a dotted short form ("U.S.", "p.m.") is not a sentence end. Segments
/// without any alphabetic or numeric character are dropped, so empty and
/// whitespace-only input produce no sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start: Option<usize> = None;
    let mut segments = text.split_sentence_bound_indices().peekable();

    while let Some((offset, segment)) = segments.next() {
        let begin = *start.get_or_insert(offset);
        if segments.peek().is_some() && ends_with_abbreviation(segment) {
            continue;
        }
        let sentence = &text[begin..offset + segment.len()];
        if sentence.chars().any(char::is_alphanumeric) {
            sentences.push(sentence);
        }
        start = None;
    }
    sentences
}

fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(word) = segment.split_whitespace().next_back() else {
        return false;
    };
    let Some(stem) = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .strip_suffix('.')
    else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    let lower = stem.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }
    // Initials and dotted short forms: every piece is a single letter.
    stem.split('.').all(|piece| {
        let mut chars = piece.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
    })
}

/// Build one window per sentence: `s[i-1] + s[i] + s[i+1]`, bounds-aware.
pub fn window<S: AsRef<str>>(sentences: &[S]) -> Vec<String> {
    (0..sentences.len())
        .map(|i| {
            let start = i.saturating_sub(1);
            let end = (i + 2).min(sentences.len());
            let mut chunk = String::new();
            for sentence in &sentences[start..end] {
                chunk.push_str(sentence.as_ref());
            }
            chunk
        })
        .collect()
}

/// Chunk a document. The chunk count always equals the sentence count.
pub fn chunk(text: &str) -> Vec<String> {
    window(split_sentences(text).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_three() {
        let chunks = window(&["a ", "b ", "c"]);
        assert_eq!(chunks, vec!["a b ", "a b c", "b c"]);
    }

    #[test]
    fn window_of_two_has_one_neighbor_each() {
        assert_eq!(window(&["x", "y"]), vec!["xy", "xy"]);
    }

    #[test]
    fn abbreviations_do_not_end_sentences() {
        let text = "Mr. Smith went to Washington. He arrived at 3 p.m. on Monday. Dr. Jones met him.";
        assert_eq!(
            split_sentences(text),
            vec!["Mr. Smith went to Washington. ", "He arrived at 3 p.m. on Monday. ", "Dr. Jones met him."]
        );
        assert_eq!(chunk(text).len(), 3);
    }

    #[test]
    fn initials_and_dotted_forms_stay_inside_the_sentence() {
        let text = "J. R. Tolkien lived in the U.K. for years. It rained.";
        assert_eq!(split_sentences(text), vec!["J. R. Tolkien lived in the U.K. for years. ", "It rained."]);
    }

    #[test]
    fn ordinary_words_before_a_period_still_end_sentences() {
        assert_eq!(split_sentences("Today is Saturday. Tomorrow is Sunday."), vec!["Today is Saturday. ", "Tomorrow is Sunday."]);
        assert!(!ends_with_abbreviation("It is 5. "));
        assert!(ends_with_abbreviation("(see Fig. "));
    }

    #[test]
    fn abbreviation_at_end_of_text_is_kept() {
        assert_eq!(split_sentences("Bring pens, paper, etc."), vec!["Bring pens, paper, etc."]);
    }

    #[test]
    fn empty_inputs() {
        assert!(window::<&str>(&[]).is_empty());
        assert!(chunk("").is_empty());
        assert!(chunk("  \n\t ").is_empty());
    }
}
