//! Address-based trie traversal over a raw byte image.
//!
//! These are free functions, not methods on `Reader`: the encoder needs the
//! exact same unigram-resolution logic to link n-gram nodes to their word
//! (see `encoder::Encoder::add_ngram_node`), and neither direction should
//! carry the reader's caches along for the ride.

use crate::codec::{read_u24, read_u8};
use crate::error::Result;

/// Unigram nodes start right after the 6-byte unigram header.
pub(crate) const UNIGRAM_ROOT_OFFSET: u32 = 6;

/// Walk the unigram trie for `word`, returning its tail node offset, or 0
/// if `word` is not a path in the trie (including the empty string).
pub(crate) fn find_unigram(data: &[u8], word: &str) -> Result<u32> {
    let mut offset = UNIGRAM_ROOT_OFFSET;
    let mut consumed = 0usize;
    for &byte in word.as_bytes() {
        let num_children = read_u8(data, offset as usize + 2)? as usize;
        if num_children == 0 {
            return Ok(0);
        }
        let mut next = None;
        for i in 0..num_children {
            let child_offset = read_u24(data, offset as usize + 6 + 3 * i)?;
            if read_u8(data, child_offset as usize)? == byte {
                next = Some(child_offset);
                break;
            }
        }
        match next {
            Some(child_offset) => {
                offset = child_offset;
                consumed += 1;
            }
            None => return Ok(0),
        }
    }
    Ok(if consumed > 0 { offset } else { 0 })
}

/// Walk the n-gram trie for a phrase already mapped to unigram tail
/// addresses, returning the n-gram node offset for the full phrase, or 0.
pub(crate) fn find_ngram(data: &[u8], addresses: &[u32]) -> Result<u32> {
    if addresses.is_empty() {
        return Ok(0);
    }
    let ngrams_offset = read_u24(data, 3)?;
    let mut offset = ngrams_offset + 3;
    for &addr in addresses {
        let num_children = read_u8(data, offset as usize + 4)? as usize;
        if num_children == 0 {
            return Ok(0);
        }
        let mut next = None;
        for i in 0..num_children {
            let child_offset = read_u24(data, offset as usize + 5 + 3 * i)?;
            let child_unigram = read_u24(data, child_offset as usize)?;
            if child_unigram == addr {
                next = Some(child_offset);
                break;
            }
        }
        match next {
            Some(child_offset) => offset = child_offset,
            None => return Ok(0),
        }
    }
    Ok(offset)
}

pub(crate) fn unigram_weight(data: &[u8], node: u32) -> Result<u8> {
    read_u8(data, node as usize + 1)
}

pub(crate) fn ngram_weight(data: &[u8], node: u32) -> Result<u8> {
    read_u8(data, node as usize + 3)
}

pub(crate) fn get_parent(data: &[u8], node: u32) -> Result<u32> {
    let ngrams_offset = read_u24(data, 3)?;
    if node == 0 || node >= ngrams_offset {
        return Ok(0);
    }
    read_u24(data, node as usize + 3)
}

/// Root-child-down-to-`node` chain of unigram offsets, used to reconstruct a
/// word from a tail address. The synthetic root (offset 6) is never included.
pub(crate) fn ancestors(data: &[u8], node: u32) -> Result<Vec<u32>> {
    let mut chain = vec![node];
    let mut parent = get_parent(data, node)?;
    while parent > UNIGRAM_ROOT_OFFSET {
        chain.insert(0, parent);
        parent = get_parent(data, parent)?;
    }
    Ok(chain)
}

/// Reconstruct a word from an ancestor chain, skipping the zero-byte carried
/// by the (never-included, but checked defensively) root node.
pub(crate) fn construct_word(data: &[u8], chain: &[u32]) -> Result<String> {
    let mut word = String::with_capacity(chain.len());
    for &node in chain {
        let ch = read_u8(data, node as usize)?;
        if ch != 0 {
            word.push(ch as char);
        }
    }
    Ok(word)
}

/// Children of a unigram node as `(child_offset, weight)`, sorted by
/// decreasing weight with a stable tie-break on insertion (child) order.
pub(crate) fn unigram_children(data: &[u8], node: u32) -> Result<Vec<(u32, u8)>> {
    let num_children = read_u8(data, node as usize + 2)? as usize;
    let mut out = Vec::with_capacity(num_children);
    for i in 0..num_children {
        let child_offset = read_u24(data, node as usize + 6 + 3 * i)?;
        let weight = unigram_weight(data, child_offset)?;
        out.push((child_offset, weight));
    }
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(out)
}

/// Children of an n-gram node as `(child_offset, weight)`, sorted the same
/// way as `unigram_children`.
pub(crate) fn ngram_children(data: &[u8], node: u32) -> Result<Vec<(u32, u8)>> {
    let num_children = read_u8(data, node as usize + 4)? as usize;
    let mut out = Vec::with_capacity(num_children);
    for i in 0..num_children {
        let child_offset = read_u24(data, node as usize + 5 + 3 * i)?;
        let weight = ngram_weight(data, child_offset)?;
        out.push((child_offset, weight));
    }
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(out)
}

/// The unigram tail address a given n-gram node points at.
pub(crate) fn unigram_of_ngram(data: &[u8], node: u32) -> Result<u32> {
    read_u24(data, node as usize)
}
