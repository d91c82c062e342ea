//! In-memory builder trie: the encoder's input contract.
//!
//! This is deliberately outside the core format: the encoder only needs
//! ordered child iteration, a per-node optional weight, and a subtree node
//! count. `Trie` is a straightforward reference implementation of that
//! contract, generic over the edge label (`char` for the unigram trie,
//! `String` for the n-gram trie), mirroring the original `Trie` class that
//! served both roles via a single `path` dict.

/// What the encoder needs from a builder-trie node.
pub trait BuilderNode: Sized {
    type Label: Clone;

    /// The node's own weight, if it terminates a word/phrase.
    fn weight(&self) -> Option<f64>;

    /// Children in deterministic (insertion) order.
    fn children(&self) -> &[(Self::Label, Self)];

    /// Total node count of the subtree rooted here, including self.
    fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|(_, child)| child.subtree_len())
            .sum::<usize>()
    }
}

/// A rooted tree node whose children are kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TrieNode<L> {
    weight: Option<f64>,
    children: Vec<(L, TrieNode<L>)>,
}

impl<L: PartialEq> TrieNode<L> {
    fn new() -> Self {
        Self {
            weight: None,
            children: Vec::new(),
        }
    }

    fn child_index(&self, label: &L) -> Option<usize> {
        self.children.iter().position(|(l, _)| l == label)
    }

    fn child_or_insert(&mut self, label: L) -> &mut TrieNode<L> {
        let idx = match self.child_index(&label) {
            Some(idx) => idx,
            None => {
                self.children.push((label, TrieNode::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }
}

impl<L: Clone> BuilderNode for TrieNode<L> {
    type Label = L;

    fn weight(&self) -> Option<f64> {
        self.weight
    }

    fn children(&self) -> &[(L, TrieNode<L>)] {
        &self.children
    }
}

/// A builder trie: insert paths with a terminal weight, hand the root to
/// the encoder.
#[derive(Debug, Clone, Default)]
pub struct Trie<L> {
    root: TrieNode<L>,
}

impl<L: PartialEq> Trie<L> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
        }
    }

    /// Insert `path` (a word's characters, or an n-gram's words) with the
    /// given weight at the terminal node. Re-inserting the same path
    /// overwrites its weight.
    pub fn insert(&mut self, path: impl IntoIterator<Item = L>, weight: f64) {
        let mut node = &mut self.root;
        for label in path {
            node = node.child_or_insert(label);
        }
        node.weight = Some(weight);
    }

    pub fn root(&self) -> &TrieNode<L> {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unigram_trie_inserts_and_reports_subtree_len() {
        let mut t: Trie<char> = Trie::new();
        t.insert("hi".chars(), 130.0);
        t.insert("hello".chars(), 120.0);
        // root + h + i + e + l + l + o = 7 nodes
        assert_eq!(t.root().subtree_len(), 7);
    }

    #[test]
    fn ngram_trie_shares_common_prefix() {
        let mut t: Trie<String> = Trie::new();
        t.insert(
            vec!["hello".to_string(), "there".to_string()],
            20.0,
        );
        t.insert(vec!["hello".to_string(), "you".to_string()], 25.0);
        // root + "hello" + "there" + "you" = 4 nodes
        assert_eq!(t.root().subtree_len(), 4);
    }

    #[test]
    fn reinsert_overwrites_weight() {
        let mut t: Trie<char> = Trie::new();
        t.insert("a".chars(), 1.0);
        t.insert("a".chars(), 2.0);
        assert_eq!(t.root().children()[0].1.weight(), Some(2.0));
    }
}
