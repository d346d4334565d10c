//! English stopword list used by the normalizer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The English stopword list shipped with the NLTK corpora (179 words).
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Fixed set of tokens dropped before stemming.
///
/// Serialized as a plain list so the persisted blob stays readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StopwordSet {
    words: BTreeSet<String>,
}

impl StopwordSet {
    /// Stopword set built from [`ENGLISH_STOPWORDS`].
    pub fn english() -> Self {
        ENGLISH_STOPWORDS.iter().copied().collect()
    }

    pub fn empty() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate the words in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::english()
    }
}

impl<'a> FromIterator<&'a str> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

impl From<Vec<String>> for StopwordSet {
    fn from(words: Vec<String>) -> Self {
        Self {
            words: words.into_iter().collect(),
        }
    }
}

impl From<StopwordSet> for Vec<String> {
    fn from(set: StopwordSet) -> Self {
        set.words.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_list_has_no_duplicates() {
        assert_eq!(StopwordSet::english().len(), ENGLISH_STOPWORDS.len());
    }

    #[test]
    fn serializes_as_sorted_list() {
        let set: StopwordSet = ["the", "a", "movie"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["a","movie","the"]"#);
        let back: StopwordSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
