//! Pre-order, address-reserving encoder from a builder trie to the packed
//! byte image (see `reader` for the matching layout).

use crate::builder::BuilderNode;
use crate::error::{DictError, Result};
use crate::codec::write_u24;
use crate::walk::find_unigram;

/// Node offsets are 24-bit; the image may never grow past this.
const MAX_ADDRESS: usize = (1 << 24) - 1;

/// Encodes a unigram trie followed by an n-gram trie into a single byte
/// image. `encode_unigrams` must be called exactly once before
/// `encode_ngrams`, because the n-gram encoder resolves each word on its
/// incoming edge to a unigram tail address by querying the already-written
/// unigram bytes.
pub struct Encoder {
    buf: Vec<u8>,
    encoded_unigrams: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; 6],
            encoded_unigrams: false,
        }
    }

    /// Serialise the unigram trie rooted at `root`. `root`'s own label is
    /// the synthetic root character 0 and is never written as a real edge.
    pub fn encode_unigrams<N>(&mut self, root: &N) -> Result<()>
    where
        N: BuilderNode<Label = char>,
    {
        write_u24(&mut self.buf, 0, root.subtree_len() as u32);
        let root_offset = self.add_unigram_node(root, 0, 0)?;
        debug_assert_eq!(root_offset, crate::walk::UNIGRAM_ROOT_OFFSET);
        self.encoded_unigrams = true;
        Ok(())
    }

    /// Serialise the n-gram trie rooted at `root`. Must run after
    /// `encode_unigrams`.
    pub fn encode_ngrams<N>(&mut self, root: &N) -> Result<()>
    where
        N: BuilderNode<Label = String>,
    {
        debug_assert!(
            self.encoded_unigrams,
            "encode_ngrams called before encode_unigrams"
        );
        let ngrams_offset = self.buf.len();
        self.check_overflow(ngrams_offset)?;
        write_u24(&mut self.buf, 3, ngrams_offset as u32);
        self.buf.extend_from_slice(&[0, 0, 0]);
        write_u24(&mut self.buf, ngrams_offset, root.subtree_len() as u32);
        self.add_ngram_node(root, None)?;
        Ok(())
    }

    /// Consume the encoder, returning the finished image.
    ///
    /// The working buffer is a plain growable `Vec<u8>` that is always
    /// exactly as long as the write cursor, so there is nothing to trim
    /// before handing the bytes back.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn check_overflow(&self, cursor: usize) -> Result<()> {
        if cursor > MAX_ADDRESS {
            return Err(DictError::EncodeOverflow {
                cursor,
                limit: MAX_ADDRESS,
            });
        }
        Ok(())
    }

    fn add_unigram_node<N>(&mut self, node: &N, value: u8, parent: u32) -> Result<u32>
    where
        N: BuilderNode<Label = char>,
    {
        let children = node.children();
        let offset = self.buf.len();
        self.check_overflow(offset + 6 + 3 * children.len())?;

        // Unigram child count is unclamped: more than 255 children wraps
        // around a single byte rather than erroring, matching the format's
        // single-byte field width.
        let child_count_byte = (children.len() % 256) as u8;
        if children.len() > 255 {
            tracing::warn!(
                offset,
                count = children.len(),
                "unigram node has more than 255 children; header byte wraps"
            );
        }

        self.buf.push(value);
        self.buf.push(clamp_weight(node.weight()));
        self.buf.push(child_count_byte);
        self.buf.extend_from_slice(&[0, 0, 0]);
        write_u24(&mut self.buf, offset + 3, parent);

        let offset_children = offset + 6;
        self.buf.resize(offset_children + 3 * children.len(), 0);
        for (i, (label, child)) in children.iter().enumerate() {
            let child_offset = self.add_unigram_node(child, *label as u8, offset as u32)?;
            write_u24(&mut self.buf, offset_children + 3 * i, child_offset);
        }
        Ok(offset as u32)
    }

    fn add_ngram_node<N>(&mut self, node: &N, word: Option<&str>) -> Result<u32>
    where
        N: BuilderNode<Label = String>,
    {
        let children = node.children();
        let offset = self.buf.len();
        self.check_overflow(offset + 5 + 3 * children.len())?;

        let unigram_tail = match word {
            Some(w) => find_unigram(&self.buf, w)?,
            None => 0,
        };

        self.buf.extend_from_slice(&[0, 0, 0]);
        write_u24(&mut self.buf, offset, unigram_tail);
        self.buf.push(clamp_weight(node.weight()));
        self.buf.push(children.len().min(255) as u8);

        let offset_children = offset + 5;
        self.buf.resize(offset_children + 3 * children.len(), 0);
        for (i, (label, child)) in children.iter().enumerate() {
            let child_offset = self.add_ngram_node(child, Some(label.as_str()))?;
            write_u24(&mut self.buf, offset_children + 3 * i, child_offset);
        }
        Ok(offset as u32)
    }
}

/// Floor the weight to an integer and clamp to 0..255. A weight that floors
/// to 0 but was genuinely positive is rounded up to 1, since 0 is reserved
/// to mean "not a final node".
fn clamp_weight(weight: Option<f64>) -> u8 {
    match weight {
        None => 0,
        Some(w) if w <= 0.0 => 0,
        Some(w) => {
            let floored = w.floor().max(1.0);
            floored.min(255.0) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Trie;

    fn test_dictionary() -> Vec<u8> {
        let mut unigrams: Trie<char> = Trie::new();
        unigrams.insert("a".chars(), 200.0);
        unigrams.insert("hi".chars(), 130.0);
        unigrams.insert("hello".chars(), 120.0);
        unigrams.insert("there".chars(), 140.0);
        unigrams.insert("how".chars(), 150.0);
        unigrams.insert("are".chars(), 80.0);
        unigrams.insert("you".chars(), 200.0);
        unigrams.insert("your".chars(), 100.0);

        let mut ngrams: Trie<String> = Trie::new();
        ngrams.insert(vec!["hello".into(), "there".into()], 20.0);
        ngrams.insert(vec!["hello".into(), "you".into()], 25.0);
        ngrams.insert(vec!["how".into(), "are".into(), "you".into()], 80.0);
        ngrams.insert(vec!["you".into(), "are".into(), "there".into()], 30.0);
        ngrams.insert(vec!["are".into(), "you".into(), "there".into()], 60.0);

        let mut encoder = Encoder::new();
        encoder.encode_unigrams(unigrams.root()).unwrap();
        encoder.encode_ngrams(ngrams.root()).unwrap();
        encoder.finish()
    }

    #[test]
    fn header_counts_are_written() {
        let image = test_dictionary();
        let unigram_count = crate::codec::read_u24(&image, 0).unwrap();
        // root + a, h,i, e,l,l,o, t,h,e,r,e, o,w, a,r,e, y,o,u, r = 21 nodes
        assert_eq!(unigram_count, 21);
    }

    #[test]
    fn clamps_weight_to_byte_and_rounds_up_fractional() {
        assert_eq!(clamp_weight(Some(300.0)), 255);
        assert_eq!(clamp_weight(Some(0.3)), 1);
        assert_eq!(clamp_weight(Some(0.0)), 0);
        assert_eq!(clamp_weight(None), 0);
    }

    #[test]
    fn ngram_nodes_resolve_unigram_tails() {
        let image = test_dictionary();
        let tail = find_unigram(&image, "hello").unwrap();
        assert_ne!(tail, 0);
        assert_eq!(crate::walk::unigram_weight(&image, tail).unwrap(), 120);
    }
}
