//! Edit-distance-1 string variation generator, used by spelling correction.
//!
//! Ported from the original `corrector.variations`: every string reachable
//! from `word` by exactly one deletion, adjacent transposition, single-letter
//! replacement or single-letter insertion over the lowercase Latin alphabet.

use std::collections::HashSet;

const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Return the set of edit-distance-1 variations of `word`.
///
/// `word` is treated as a sequence of `char`s; the alphabet used for
/// replacement and insertion is always the 26 lowercase Latin letters,
/// regardless of the case of `word` itself.
pub fn variations(word: &str) -> HashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    let mut out = HashSet::with_capacity(n * (26 * 2 + 2) + 26);

    // Deletes: remove the character at i.
    for i in 0..n {
        let mut v = chars.clone();
        v.remove(i);
        out.insert(v.into_iter().collect());
    }

    // Transposes: swap adjacent characters at i, i+1.
    for i in 0..n.saturating_sub(1) {
        let mut v = chars.clone();
        v.swap(i, i + 1);
        out.insert(v.into_iter().collect());
    }

    // Replaces: change the character at i to every letter of the alphabet.
    for i in 0..n {
        for &c in &ALPHABET {
            let mut v = chars.clone();
            v[i] = c;
            out.insert(v.into_iter().collect());
        }
    }

    // Inserts: insert every letter of the alphabet at every gap, including
    // before the first and after the last character.
    for i in 0..=n {
        for &c in &ALPHABET {
            let mut v = chars.clone();
            v.insert(i, c);
            out.insert(v.into_iter().collect());
        }
    }

    out
}

/// Edit-distance-2 variations: the image of `variations` composed with
/// itself, i.e. every known variation of every variation of `word`.
pub fn variations2(word: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    for v1 in variations(word) {
        out.extend(variations(&v1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_word_yields_only_single_letter_inserts() {
        let v = variations("");
        assert_eq!(v.len(), 26);
        assert!(v.contains("a"));
        assert!(v.contains("z"));
    }

    #[test]
    fn single_char_has_no_transposes() {
        let v = variations("a");
        // deletes: "" (1), replaces: 26, inserts: 2 gaps * 26 = 52
        assert_eq!(v.len(), 1 + 26 + 52);
        assert!(v.contains(""));
    }

    #[test]
    fn contains_expected_delete_and_transpose() {
        let v = variations("you");
        assert!(v.contains("ou")); // delete 'y'
        assert!(v.contains("oyu")); // transpose 'y','o'
        assert!(v.contains("your")); // insert 'r'
        assert!(v.contains("yuu")); // replace 'o' with 'u'
    }

    #[test]
    fn distance_two_reaches_further() {
        let v2 = variations2("yuu");
        assert!(v2.contains("your"));
    }
}
