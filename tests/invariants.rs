//! Property tests over the encode/decode round trip: every word inserted
//! into a unigram trie should be found by `exists`, and every unigram node's
//! parent chain should reconstruct back to a prefix of its own word.

use proptest::prelude::*;

use ngramdict::builder::Trie;
use ngramdict::encoder::Encoder;
use ngramdict::reader::Reader;

fn lowercase_word() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

proptest! {
    #[test]
    fn every_inserted_word_exists(words in prop::collection::hash_set(lowercase_word(), 1..30)) {
        let mut trie: Trie<char> = Trie::new();
        for word in &words {
            trie.insert(word.chars(), 1.0);
        }
        let mut encoder = Encoder::new();
        encoder.encode_unigrams(trie.root()).unwrap();
        encoder.encode_ngrams(Trie::<String>::new().root()).unwrap();
        let reader = Reader::from_bytes(encoder.finish());

        for word in &words {
            prop_assert!(reader.exists(word));
        }
    }

    #[test]
    fn completions_reconstruct_the_word_they_were_built_from(
        words in prop::collection::hash_set(lowercase_word(), 1..20)
    ) {
        let mut trie: Trie<char> = Trie::new();
        for word in &words {
            trie.insert(word.chars(), 1.0);
        }
        let mut encoder = Encoder::new();
        encoder.encode_unigrams(trie.root()).unwrap();
        encoder.encode_ngrams(Trie::<String>::new().root()).unwrap();
        let reader = Reader::from_bytes(encoder.finish());

        // Every word's own first character is a valid prefix of itself, and
        // a depth of the word's remaining length must surface it again.
        for word in &words {
            let prefix = &word[..1];
            let depth = word.chars().count() as u32 - 1;
            let found = reader.completions(prefix, depth);
            prop_assert!(found.contains(word));
        }
    }
}
