//! AES key expansion (FIPS-197 section 5.2)

use crate::tables::{RCON, SBOX};

fn sub_word(word: [u8; 4]) -> [u8; 4] {
    word.map(|b| SBOX[b as usize])
}

fn rot_word(word: [u8; 4]) -> [u8; 4] {
    [word[1], word[2], word[3], word[0]]
}

/// Expands a 16, 24 or 32 byte key into `rounds + 1` round keys.
///
/// The caller guarantees the key length; `Nk = key.len() / 4` and
/// `rounds = Nk + 6`.
pub(crate) fn expand_key(key: &[u8]) -> Vec<[u8; 16]> {
    let nk = key.len() / 4;
    let rounds = nk + 6;
    let total_words = 4 * (rounds + 1);

    let mut words: Vec<[u8; 4]> = key
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();

    for i in nk..total_words {
        let mut temp = words[i - 1];

        if i % nk == 0 {
            temp = sub_word(rot_word(temp));
            temp[0] ^= RCON[i / nk];
        } else if nk > 6 && i % nk == 4 {
            // AES-256 only: extra substitution halfway through each key block
            temp = sub_word(temp);
        }

        let prev = words[i - nk];
        words.push([prev[0] ^ temp[0], prev[1] ^ temp[1], prev[2] ^ temp[2], prev[3] ^ temp[3]]);
    }

    words
        .chunks_exact(4)
        .map(|w| {
            let mut round_key = [0u8; 16];
            for (dst, word) in round_key.chunks_exact_mut(4).zip(w) {
                dst.copy_from_slice(word);
            }
            round_key
        })
        .collect()
}
