//! The query engine: loads a byte image and answers `exists`, `predictions`,
//! `corrections` and `completions` against it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::Result;
use crate::variations;
use crate::walk;

/// Per-reader configuration. The only process-wide knob the original
/// exposes is whether the lookup caches are active at all.
#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    pub cache: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { cache: true }
    }
}

/// The shape `corrections` returns: either a mapping of known candidate
/// words to their stored weight, or a signal that nothing is known and the
/// input word is echoed back unweighted.
///
/// An enum keeps this exhaustive for callers (no runtime shape check needed
/// to tell "known candidates" from "nothing known") instead of overloading a
/// single map type for both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corrections {
    Known(BTreeMap<String, u8>),
    Unknown(String),
}

impl Corrections {
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Corrections::Known(map) => map.keys().map(String::as_str).collect(),
            Corrections::Unknown(word) => vec![word.as_str()],
        }
    }
}

enum Image {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl std::ops::Deref for Image {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            Image::Owned(bytes) => bytes,
            Image::Mapped(mmap) => mmap,
        }
    }
}

/// Owns an immutable byte image and answers lookups against it.
///
/// Not `Sync`: both caches are `RefCell`s, mutated on every query. Sharing a
/// `Reader` across threads would need either a mutex around the caches or
/// thread-local caches, neither of which this implementation provides. The
/// type system enforces that by making `Reader` `!Sync`, rather than leaving
/// it as a documentation-only warning.
pub struct Reader {
    data: Image,
    config: ReaderConfig,
    word_cache: RefCell<HashMap<String, u32>>,
    ngram_cache: RefCell<HashMap<Vec<u32>, u32>>,
}

impl Reader {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::with_config(bytes, ReaderConfig::default())
    }

    pub fn with_config(bytes: Vec<u8>, config: ReaderConfig) -> Self {
        Self {
            data: Image::Owned(bytes),
            config,
            word_cache: RefCell::new(HashMap::new()),
            ngram_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Memory-map a dictionary image from disk.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> std::io::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the image is treated as read-only for the reader's whole
        // lifetime; nothing else is expected to truncate or write to it
        // concurrently.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            data: Image::Mapped(mmap),
            config,
            word_cache: RefCell::new(HashMap::new()),
            ngram_cache: RefCell::new(HashMap::new()),
        })
    }

    fn find_unigram(&self, word: &str) -> Result<u32> {
        if self.config.cache {
            if let Some(&addr) = self.word_cache.borrow().get(word) {
                return Ok(addr);
            }
        }
        let addr = walk::find_unigram(&self.data, word)?;
        if self.config.cache && addr != 0 {
            self.word_cache.borrow_mut().insert(word.to_string(), addr);
        }
        Ok(addr)
    }

    fn find_ngram(&self, addresses: &[u32]) -> Result<u32> {
        if self.config.cache {
            if let Some(&addr) = self.ngram_cache.borrow().get(addresses) {
                return Ok(addr);
            }
        }
        let addr = walk::find_ngram(&self.data, addresses)?;
        if self.config.cache && addr != 0 {
            self.ngram_cache
                .borrow_mut()
                .insert(addresses.to_vec(), addr);
        }
        Ok(addr)
    }

    fn known(&self, words: &[String]) -> Result<BTreeMap<String, u8>> {
        let mut out = BTreeMap::new();
        for word in words {
            let addr = self.find_unigram(word)?;
            if addr == 0 {
                continue;
            }
            let weight = walk::unigram_weight(&self.data, addr)?;
            if weight > 0 {
                out.insert(word.clone(), weight);
            }
        }
        Ok(out)
    }

    fn known_variations(&self, word: &str) -> Result<BTreeMap<String, u8>> {
        let mut out = BTreeMap::new();
        for v1 in variations::variations(word) {
            for v2 in variations::variations(&v1) {
                if out.contains_key(&v2) {
                    continue;
                }
                let addr = self.find_unigram(&v2)?;
                if addr == 0 {
                    continue;
                }
                let weight = walk::unigram_weight(&self.data, addr)?;
                if weight > 0 {
                    out.insert(v2, weight);
                }
            }
        }
        Ok(out)
    }

    fn descendants(&self, node: u32, depth: u32) -> Result<HashSet<u32>> {
        if depth == 0 {
            return Ok(if walk::unigram_weight(&self.data, node)? > 0 {
                HashSet::from([node])
            } else {
                HashSet::new()
            });
        }
        let mut out = HashSet::new();
        for (child, weight) in walk::unigram_children(&self.data, node)? {
            if weight > 0 {
                out.insert(child);
            }
            out.extend(self.descendants(child, depth - 1)?);
        }
        Ok(out)
    }

    /// Fallible form of `exists`: surfaces a corrupt image instead of
    /// collapsing it to `false`.
    pub fn try_exists(&self, word: &str) -> Result<bool> {
        let addr = self.find_unigram(word)?;
        if addr == 0 {
            return Ok(false);
        }
        Ok(walk::unigram_weight(&self.data, addr)? > 0)
    }

    /// Whether `word` is a final unigram node in the trie.
    pub fn exists(&self, word: &str) -> bool {
        self.try_exists(word).unwrap_or_else(|err| {
            tracing::warn!(word, %err, "exists: treating corrupt image as not found");
            false
        })
    }

    pub fn try_predictions(&self, phrase: &[&str]) -> Result<Vec<(String, u8)>> {
        let mut addresses = Vec::with_capacity(phrase.len());
        for word in phrase {
            addresses.push(self.find_unigram(word)?);
        }
        let ngram = self.find_ngram(&addresses)?;
        if ngram == 0 {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for (child, weight) in walk::ngram_children(&self.data, ngram)? {
            let unigram_tail = walk::unigram_of_ngram(&self.data, child)?;
            if unigram_tail == 0 {
                // Unresolved word at encode time: skip, same as the encoder
                // treating a missing unigram as "unknown".
                continue;
            }
            let chain = walk::ancestors(&self.data, unigram_tail)?;
            let word = walk::construct_word(&self.data, &chain)?;
            out.push((word, weight));
        }
        Ok(out)
    }

    /// Next-word predictions for `phrase`, ordered by decreasing weight
    /// (stable tie-break on insertion order).
    pub fn predictions(&self, phrase: &[&str]) -> Vec<(String, u8)> {
        self.try_predictions(phrase).unwrap_or_else(|err| {
            tracing::warn!(?phrase, %err, "predictions: treating corrupt image as empty");
            Vec::new()
        })
    }

    pub fn try_corrections(&self, word: &str) -> Result<Corrections> {
        let exact = self.known(&[word.to_string()])?;
        if !exact.is_empty() {
            return Ok(Corrections::Known(exact));
        }
        let distance_one: Vec<String> = variations::variations(word).into_iter().collect();
        let near = self.known(&distance_one)?;
        if !near.is_empty() {
            return Ok(Corrections::Known(near));
        }
        let far = self.known_variations(word)?;
        if !far.is_empty() {
            return Ok(Corrections::Known(far));
        }
        Ok(Corrections::Unknown(word.to_string()))
    }

    /// Spelling corrections for `word`: the word itself if known, else
    /// edit-distance-1 matches, else edit-distance-2 matches, else the word
    /// unweighted signalling no correction is available.
    pub fn corrections(&self, word: &str) -> Corrections {
        self.try_corrections(word).unwrap_or_else(|err| {
            tracing::warn!(word, %err, "corrections: treating corrupt image as unknown");
            Corrections::Unknown(word.to_string())
        })
    }

    pub fn try_completions(&self, prefix: &str, depth: u32) -> Result<Vec<String>> {
        let node = self.find_unigram(prefix)?;
        if node == 0 {
            return Ok(Vec::new());
        }
        let mut words = Vec::new();
        for descendant in self.descendants(node, depth)? {
            let chain = walk::ancestors(&self.data, descendant)?;
            words.push(walk::construct_word(&self.data, &chain)?);
        }
        words.sort();
        Ok(words)
    }

    /// Completions of `prefix` reachable within `depth` additional
    /// characters.
    pub fn completions(&self, prefix: &str, depth: u32) -> Vec<String> {
        self.try_completions(prefix, depth).unwrap_or_else(|err| {
            tracing::warn!(prefix, depth, %err, "completions: treating corrupt image as empty");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Trie;
    use crate::encoder::Encoder;

    /// The reference dictionary used throughout the unit tests below: eight
    /// unigrams and five n-grams covering exact matches, predictions,
    /// corrections and completions.
    fn scenario_reader() -> Reader {
        let mut unigrams: Trie<char> = Trie::new();
        for (word, weight) in [
            ("a", 200.0),
            ("hi", 130.0),
            ("hello", 120.0),
            ("there", 140.0),
            ("how", 150.0),
            ("are", 80.0),
            ("you", 200.0),
            ("your", 100.0),
        ] {
            unigrams.insert(word.chars(), weight);
        }

        let mut ngrams: Trie<String> = Trie::new();
        let phrases: [(&[&str], f64); 5] = [
            (&["hello", "there"], 20.0),
            (&["hello", "you"], 25.0),
            (&["how", "are", "you"], 80.0),
            (&["you", "are", "there"], 30.0),
            (&["are", "you", "there"], 60.0),
        ];
        for (phrase, weight) in phrases {
            ngrams.insert(phrase.iter().map(|w| w.to_string()), weight);
        }

        let mut encoder = Encoder::new();
        encoder.encode_unigrams(unigrams.root()).unwrap();
        encoder.encode_ngrams(ngrams.root()).unwrap();
        Reader::from_bytes(encoder.finish())
    }

    #[test]
    fn exists_matches_scenario() {
        let r = scenario_reader();
        assert!(r.exists("hello"));
        assert!(!r.exists("hellos"));
        assert!(!r.exists("h"));
        assert!(r.exists("a"));
    }

    #[test]
    fn predictions_after_hello() {
        let r = scenario_reader();
        let words: Vec<&str> = r.predictions(&["hello"]).iter().map(|(w, _)| w.as_str()).collect();
        assert!(words.contains(&"there"));
        assert!(words.contains(&"you"));
    }

    #[test]
    fn predictions_after_how_are() {
        let r = scenario_reader();
        let words: Vec<&str> = r
            .predictions(&["how", "are"])
            .iter()
            .map(|(w, _)| w.as_str())
            .collect();
        assert!(words.contains(&"you"));
    }

    #[test]
    fn predictions_are_sorted_by_decreasing_weight() {
        let r = scenario_reader();
        let weights: Vec<u8> = r
            .predictions(&["are"])
            .into_iter()
            .map(|(_, w)| w)
            .collect();
        let mut sorted = weights.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(weights, sorted);
    }

    #[test]
    fn predictions_for_unknown_word_is_empty() {
        let r = scenario_reader();
        assert!(r.predictions(&["nonexistent"]).is_empty());
    }

    #[test]
    fn corrections_prefer_exact_then_distance_one() {
        let r = scenario_reader();
        assert_eq!(
            r.corrections("you").keys(),
            vec!["you"]
        );
        assert!(r.corrections("yuu").keys().contains(&"you"));
        assert!(r.corrections("yuur").keys().contains(&"your"));
    }

    #[test]
    fn corrections_fall_through_to_unknown() {
        let r = scenario_reader();
        assert_eq!(
            r.corrections("zzzzzzzzzz"),
            Corrections::Unknown("zzzzzzzzzz".to_string())
        );
    }

    #[test]
    fn completions_respect_depth() {
        let r = scenario_reader();
        assert!(r.completions("yo", 1).contains(&"you".to_string()));
        assert!(!r.completions("yo", 1).contains(&"your".to_string()));
        assert!(r.completions("yo", 2).contains(&"your".to_string()));
        assert!(!r.completions("y", 1).contains(&"yo".to_string()));
    }

    #[test]
    fn completions_of_unknown_prefix_is_empty() {
        let r = scenario_reader();
        assert!(r.completions("zz", 3).is_empty());
    }

    fn scenario_image() -> Vec<u8> {
        let mut unigrams: Trie<char> = Trie::new();
        for (word, weight) in [("a", 200.0), ("you", 200.0), ("your", 100.0)] {
            unigrams.insert(word.chars(), weight);
        }
        let mut encoder = Encoder::new();
        encoder.encode_unigrams(unigrams.root()).unwrap();
        encoder
            .encode_ngrams(Trie::<String>::new().root())
            .unwrap();
        encoder.finish()
    }

    #[test]
    fn cache_transparency() {
        let image = scenario_image();
        let cached = Reader::with_config(image.clone(), ReaderConfig { cache: true });
        let uncached = Reader::with_config(image, ReaderConfig { cache: false });

        for word in ["you", "your", "missing"] {
            assert_eq!(cached.exists(word), uncached.exists(word));
        }
        assert_eq!(cached.completions("yo", 2), uncached.completions("yo", 2));
    }
}
