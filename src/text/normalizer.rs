use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::{StopwordSet, TextError};
use crate::config::TextSettings;

/// Default pattern for runs of non-word characters.
pub const DEFAULT_NON_WORD_PATTERN: &str = r"[\W]+";

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static html tag pattern"));
static EMOTICON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?::|;|=)(?:-)?(?:\)|\(|D|P)").expect("static emoticon pattern")
});

/// Turns raw review text into the token sequence fed to the vectorizer.
///
/// Markup is removed, emoticons survive as tokens (`:-)` becomes `:)`), everything else
/// is lowercased with non-word runs collapsed to a space, stopwords are dropped and the
/// remaining tokens are reduced to their Snowball English stems.
pub struct Normalizer {
    non_word: Regex,
    stopwords: StopwordSet,
    stemmer: Stemmer,
    remove_stopwords: bool,
    stem: bool,
}

impl Normalizer {
    /// Normalizer with the default pattern that removes `stopwords` and stems.
    pub fn new(stopwords: StopwordSet) -> Self {
        Self {
            non_word: Regex::new(DEFAULT_NON_WORD_PATTERN).expect("default non-word pattern"),
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
            remove_stopwords: true,
            stem: true,
        }
    }

    /// Build a normalizer from configuration, validating the non-word pattern.
    pub fn from_settings(settings: &TextSettings, stopwords: StopwordSet) -> Result<Self, TextError> {
        let non_word = Regex::new(&settings.non_word_pattern).map_err(|source| {
            TextError::InvalidPattern {
                pattern: settings.non_word_pattern.clone(),
                source,
            }
        })?;
        Ok(Self {
            non_word,
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
            remove_stopwords: settings.remove_stopwords,
            stem: settings.stem,
        })
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Strip markup, keep emoticons, lowercase and collapse non-word runs.
    pub fn clean(&self, text: &str) -> String {
        let stripped = HTML_TAG_REGEX.replace_all(text, "");
        let emoticons: Vec<String> = EMOTICON_REGEX
            .find_iter(&stripped)
            .map(|m| m.as_str().replace('-', ""))
            .collect();
        let lowered = stripped.to_lowercase();
        let mut cleaned = self.non_word.replace_all(&lowered, " ").into_owned();
        if !emoticons.is_empty() {
            cleaned.push(' ');
            cleaned.push_str(&emoticons.join(" "));
        }
        cleaned
    }

    /// Full pipeline: clean, split, drop stopwords, stem.
    ///
    /// A stem that is itself a stopword (`ons` -> `on`) is dropped as well, so the output
    /// never contains stopwords. Stemming is not a fixed point (`agreed` -> `agre` -> `agr`),
    /// so feeding the output back in can shorten such stems further.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        cleaned
            .split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .map(|token| self.stem_token(token))
            .filter(|stem| !self.is_stopword(stem))
            .map(Cow::into_owned)
            .collect()
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.remove_stopwords && self.stopwords.contains(token)
    }

    /// Stem every whitespace token without removing stopwords.
    pub fn stemmed_tokens(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect()
    }

    fn stem_token<'a>(&self, token: &'a str) -> Cow<'a, str> {
        if self.stem {
            self.stemmer.stem(token)
        } else {
            Cow::Borrowed(token)
        }
    }
}

/// Split on whitespace only.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(StopwordSet::english())
    }
}

impl Clone for Normalizer {
    fn clone(&self) -> Self {
        Self {
            non_word: self.non_word.clone(),
            stopwords: self.stopwords.clone(),
            stemmer: Stemmer::create(Algorithm::English),
            remove_stopwords: self.remove_stopwords,
            stem: self.stem,
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("non_word", &self.non_word.as_str())
            .field("stopwords", &self.stopwords.len())
            .field("remove_stopwords", &self.remove_stopwords)
            .field("stem", &self.stem)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_stopwords_and_stems() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("I love this movie"), vec!["love", "movi"]);
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let normalizer = Normalizer::default();
        for text in [
            "I love this movie, but the runners were running late :-)",
            "Great acting.<br /><br />Terrible plot.",
            "They were not at all what I had expected :(",
        ] {
            let once = normalizer.normalize(text);
            let twice = normalizer.normalize(&once.join(" "));
            assert_eq!(once, twice, "{text:?}");
        }
    }

    #[test]
    fn stems_that_are_stopwords_are_dropped() {
        let normalizer = Normalizer::default();
        assert!(normalizer.normalize("ons").is_empty());
        let stopwords = StopwordSet::english();
        for token in normalizer.normalize("ons and offs, the universities agreed on it") {
            assert!(!stopwords.contains(&token), "{token}");
        }
    }

    #[test]
    fn stems_are_not_always_fixed_points() {
        let normalizer = Normalizer::default();
        for (word, once, twice) in [("agreed", "agre", "agr"), ("universities", "univers", "univ")] {
            let first = normalizer.normalize(word);
            assert_eq!(first, vec![once]);
            assert_eq!(normalizer.normalize(&first.join(" ")), vec![twice]);
        }
    }

    #[test]
    fn keeps_emoticons_and_drops_markup() {
        let normalizer = Normalizer::default();
        let cleaned = normalizer.clean("</a>This :) is :( a test :-)!");
        assert_eq!(cleaned, "this is a test  :) :( :)");
        let tokens = normalizer.normalize("</a>This :) is :( a test :-)!");
        assert_eq!(tokens, vec!["test", ":)", ":(", ":)"]);
    }

    #[test]
    fn html_line_breaks_do_not_leak_into_tokens() {
        let normalizer = Normalizer::default();
        let tokens = normalizer.normalize("Great acting.<br /><br />Terrible plot.");
        assert_eq!(tokens, vec!["great", "act", "terribl", "plot"]);
    }

    #[test]
    fn stemmed_tokens_keep_stopwords() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.stemmed_tokens("runners like running and thus they run"),
            vec!["runner", "like", "run", "and", "thus", "they", "run"]
        );
        assert_eq!(tokenize("  a  b "), vec!["a", "b"]);
    }

    #[test]
    fn configured_pattern_is_validated() {
        let settings = TextSettings {
            non_word_pattern: "[".to_string(),
            ..TextSettings::default()
        };
        let result = Normalizer::from_settings(&settings, StopwordSet::english());
        assert!(matches!(result, Err(TextError::InvalidPattern { .. })));
    }

    #[test]
    fn stemming_and_stopwords_can_be_disabled() {
        let settings = TextSettings {
            remove_stopwords: false,
            stem: false,
            ..TextSettings::default()
        };
        let normalizer = Normalizer::from_settings(&settings, StopwordSet::english()).unwrap();
        assert_eq!(normalizer.normalize("I love this movie"), vec!["i", "love", "this", "movie"]);
    }
}
