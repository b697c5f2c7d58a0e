//! Bijective cipher-letter to plain-letter mapping

use std::fmt;
use std::str::FromStr;

use crate::english::FREQUENCY_ORDER;
use crate::error::{AnalysisError, Result};
use crate::frequency::{letter_index, LetterStats, ALPHABET_LEN};

/// A permutation of the alphabet: position `i` holds the plain letter that
/// cipher letter `i` decodes to.
///
/// Every constructor and mutator keeps the table a permutation; assigning a
/// plain letter that another cipher letter already holds swaps the two.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubstitutionMapping {
    plain: [u8; ALPHABET_LEN],
}

fn cipher_position(c: char) -> Result<usize> {
    letter_index(c).ok_or_else(|| AnalysisError::InvalidMapping(format!("{c:?} is not a letter")))
}

impl SubstitutionMapping {
    /// Every letter maps to itself.
    pub fn identity() -> Self {
        Self {
            plain: core::array::from_fn(|i| i as u8),
        }
    }

    /// Builds a mapping from a table of alphabet positions, rejecting
    /// anything that is not a permutation of `0..26`.
    pub fn from_table(plain: [u8; ALPHABET_LEN]) -> Result<Self> {
        let mut seen = [false; ALPHABET_LEN];
        for &p in &plain {
            let slot = seen
                .get_mut(p as usize)
                .ok_or_else(|| AnalysisError::InvalidMapping(format!("position {p} is out of range")))?;
            if *slot {
                return Err(AnalysisError::InvalidMapping(format!(
                    "plain letter '{}' is assigned twice",
                    (b'a' + p) as char
                )));
            }
            *slot = true;
        }
        Ok(Self { plain })
    }

    /// Builds a mapping from the 26 plain letters for cipher letters a..z.
    pub fn from_letters<I: IntoIterator<Item = char>>(letters: I) -> Result<Self> {
        let mut plain = [0u8; ALPHABET_LEN];
        let mut len = 0;
        for c in letters {
            let slot = plain
                .get_mut(len)
                .ok_or_else(|| AnalysisError::InvalidMapping("more than 26 entries".to_string()))?;
            *slot = cipher_position(c)? as u8;
            len += 1;
        }
        if len != ALPHABET_LEN {
            return Err(AnalysisError::InvalidMapping(format!("{len} entries, expected 26")));
        }
        Self::from_table(plain)
    }

    /// Builds a mapping from explicit `cipher -> plain` pairs. Every cipher
    /// letter must appear exactly once.
    pub fn from_pairs<I: IntoIterator<Item = (char, char)>>(pairs: I) -> Result<Self> {
        let mut plain = [None; ALPHABET_LEN];
        for (cipher, p) in pairs {
            let slot = &mut plain[cipher_position(cipher)?];
            if slot.is_some() {
                return Err(AnalysisError::InvalidMapping(format!(
                    "cipher letter '{}' is mapped twice",
                    cipher.to_ascii_lowercase()
                )));
            }
            *slot = Some(cipher_position(p)? as u8);
        }

        let mut table = [0u8; ALPHABET_LEN];
        for (i, entry) in plain.iter().enumerate() {
            table[i] = entry.ok_or_else(|| {
                AnalysisError::InvalidMapping(format!("cipher letter '{}' is not mapped", (b'a' + i as u8) as char))
            })?;
        }
        Self::from_table(table)
    }

    /// Initial guess from letter frequencies: the most frequent cipher
    /// letter decodes to `e`, the next to `t`, and so on down
    /// `etaoinshrdlcumwfgypbvkjxqz`. Ties and absent letters are ranked
    /// alphabetically.
    pub fn frequency_seeded(ciphertext: &str) -> Self {
        let ranked = LetterStats::from_text(ciphertext).ranked();
        let mut plain = [0u8; ALPHABET_LEN];
        for (rank, cipher) in ranked.into_iter().enumerate() {
            plain[cipher] = FREQUENCY_ORDER[rank] - b'a';
        }
        Self { plain }
    }

    /// The plain letter (lowercase) that `cipher` decodes to.
    pub fn get(&self, cipher: char) -> Option<char> {
        letter_index(cipher).map(|i| (b'a' + self.plain[i]) as char)
    }

    /// Reassigns `cipher` to decode to `plain`. The cipher letter that held
    /// `plain` before takes over the old value of `cipher`.
    pub fn set_letter(&mut self, cipher: char, plain: char) -> Result<()> {
        let cipher = cipher_position(cipher)?;
        let plain = cipher_position(plain)? as u8;

        if let Some(holder) = self.plain.iter().position(|&p| p == plain) {
            self.plain.swap(cipher, holder);
        }
        Ok(())
    }

    /// Exchanges the plain letters of two cipher letters.
    pub fn swap(&mut self, a: char, b: char) -> Result<()> {
        let a = cipher_position(a)?;
        let b = cipher_position(b)?;
        self.swap_positions(a, b);
        Ok(())
    }

    pub(crate) fn swap_positions(&mut self, a: usize, b: usize) {
        self.plain.swap(a, b);
    }

    /// Plain-letter alphabet positions indexed by cipher position.
    pub fn table(&self) -> &[u8; ALPHABET_LEN] {
        &self.plain
    }

    /// The 26 plain letters for cipher letters a..z.
    pub fn plain_letters(&self) -> [char; ALPHABET_LEN] {
        self.plain.map(|p| (b'a' + p) as char)
    }

    /// `(cipher, plain)` pairs in cipher-letter order.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.plain
            .iter()
            .enumerate()
            .map(|(i, &p)| ((b'a' + i as u8) as char, (b'a' + p) as char))
    }

    /// Decodes `text`, preserving case and leaving non-letters untouched.
    pub fn apply(&self, text: &str) -> String {
        text.chars()
            .map(|c| match letter_index(c) {
                Some(i) => {
                    let p = (b'a' + self.plain[i]) as char;
                    if c.is_ascii_uppercase() {
                        p.to_ascii_uppercase()
                    } else {
                        p
                    }
                }
                None => c,
            })
            .collect()
    }

    /// Encodes `plaintext` with the inverse mapping, so that `apply` undoes it.
    pub fn encode(&self, plaintext: &str) -> String {
        let mut inverse = [0u8; ALPHABET_LEN];
        for (cipher, &p) in self.plain.iter().enumerate() {
            inverse[p as usize] = cipher as u8;
        }
        Self { plain: inverse }.apply(plaintext)
    }

    pub fn is_permutation(&self) -> bool {
        Self::from_table(self.plain).is_ok()
    }
}

impl Default for SubstitutionMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for SubstitutionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.plain_letters().iter().try_for_each(|c| write!(f, "{c}"))
    }
}

impl fmt::Debug for SubstitutionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubstitutionMapping({self})")
    }
}

/// Parses the 26-letter form produced by `Display`.
impl FromStr for SubstitutionMapping {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_letters(s.trim().chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REVERSED: &str = "zyxwvutsrqponmlkjihgfedcba";

    #[test]
    fn test_identity_and_display() {
        let mapping = SubstitutionMapping::identity();
        assert_eq!(mapping.to_string(), "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(mapping.apply("Hello, World!"), "Hello, World!");
        assert_eq!(SubstitutionMapping::default(), mapping);
    }

    #[test]
    fn test_apply_preserves_case() {
        let mapping: SubstitutionMapping = REVERSED.parse().unwrap();
        assert_eq!(mapping.apply("Abc, XYZ!"), "Zyx, CBA!");
        assert_eq!(mapping.get('B'), Some('y'));
        assert_eq!(mapping.get('3'), None);
    }

    #[test]
    fn test_encode_is_inverse_of_apply() {
        let mapping: SubstitutionMapping = "qwertyuiopasdfghjklzxcvbnm".parse().unwrap();
        let ciphertext = mapping.encode("Meet me at the Old Mill.");
        assert_ne!(ciphertext, "Meet me at the Old Mill.");
        assert_eq!(mapping.apply(&ciphertext), "Meet me at the Old Mill.");
    }

    #[test]
    fn test_rejects_non_permutations() {
        assert!(matches!(
            "aacdefghijklmnopqrstuvwxyz".parse::<SubstitutionMapping>(),
            Err(AnalysisError::InvalidMapping(_))
        ));
        assert!(matches!(
            "abc".parse::<SubstitutionMapping>(),
            Err(AnalysisError::InvalidMapping(_))
        ));
        assert!(matches!(
            "abcdefghijklmnopqrstuvwxyza".parse::<SubstitutionMapping>(),
            Err(AnalysisError::InvalidMapping(_))
        ));
        assert!(matches!(
            "abcdefghijklmnopqrstuvwxy1".parse::<SubstitutionMapping>(),
            Err(AnalysisError::InvalidMapping(_))
        ));

        let mut table = *SubstitutionMapping::identity().table();
        table[3] = 40;
        assert!(SubstitutionMapping::from_table(table).is_err());
    }

    #[test]
    fn test_from_pairs() {
        let pairs: Vec<(char, char)> = SubstitutionMapping::identity().pairs().collect();
        assert_eq!(SubstitutionMapping::from_pairs(pairs.clone()).unwrap(), SubstitutionMapping::identity());

        // missing cipher letter
        assert!(SubstitutionMapping::from_pairs(pairs[1..].to_vec()).is_err());

        // duplicated plain letter
        let mut dup = pairs.clone();
        dup[1] = ('b', 'a');
        assert!(SubstitutionMapping::from_pairs(dup).is_err());

        // uppercase keys are accepted
        let upper: Vec<(char, char)> = pairs.iter().map(|&(c, p)| (c.to_ascii_uppercase(), p)).collect();
        assert!(SubstitutionMapping::from_pairs(upper).is_ok());
    }

    #[test]
    fn test_set_letter_swaps_previous_holder() {
        let mut mapping = SubstitutionMapping::identity();
        mapping.set_letter('a', 'q').unwrap();
        assert_eq!(mapping.get('a'), Some('q'));
        assert_eq!(mapping.get('q'), Some('a'));
        assert!(mapping.is_permutation());

        // reassigning the same value is a no-op
        mapping.set_letter('a', 'q').unwrap();
        assert_eq!(mapping.get('a'), Some('q'));

        assert!(mapping.set_letter('a', '?').is_err());
        assert!(mapping.is_permutation());
    }

    #[test]
    fn test_swap() {
        let mut mapping = SubstitutionMapping::identity();
        mapping.swap('x', 'y').unwrap();
        assert_eq!(mapping.apply("xyz"), "yxz");
        assert!(mapping.swap('x', ' ').is_err());
    }

    #[test]
    fn test_frequency_seeded() {
        // b is most frequent, then c, then a
        let mapping = SubstitutionMapping::frequency_seeded("bbbb ccc aa");
        assert_eq!(mapping.get('b'), Some('e'));
        assert_eq!(mapping.get('c'), Some('t'));
        assert_eq!(mapping.get('a'), Some('a'));
        // d is the first unseen letter and gets the fourth English letter
        assert_eq!(mapping.get('d'), Some('o'));
        assert!(mapping.is_permutation());

        let empty = SubstitutionMapping::frequency_seeded("");
        assert!(empty.is_permutation());
        assert_eq!(empty.get('a'), Some('e'));
    }

    proptest! {
        #[test]
        fn edits_keep_a_permutation(
            edits in prop::collection::vec((0u8..26, 0u8..26, any::<bool>()), 0..60),
        ) {
            let mut mapping = SubstitutionMapping::identity();
            for (a, b, is_swap) in edits {
                let a = (b'a' + a) as char;
                let b = (b'A' + b) as char;
                if is_swap {
                    mapping.swap(a, b).unwrap();
                } else {
                    mapping.set_letter(a, b).unwrap();
                    prop_assert_eq!(mapping.get(a), Some(b.to_ascii_lowercase()));
                }
                prop_assert!(mapping.is_permutation());
            }
        }

        #[test]
        fn seeded_mapping_is_a_permutation(text in ".{0,200}") {
            prop_assert!(SubstitutionMapping::frequency_seeded(&text).is_permutation());
        }
    }
}
