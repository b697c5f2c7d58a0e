//! DES implementation in Rust
//!
//! Implements single DES encryption and decryption of 64-bit blocks
//! as specified in FIPS 46-3. Bits are numbered 1..=64 from the most
//! significant bit, matching the permutation tables of the standard.

use cipher_modes::{BlockCipher, CipherModeError, Result};
use rand::{CryptoRng, RngCore};

/// Block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// Key size in bytes (56 effective bits plus 8 parity bits)
pub const KEY_SIZE: usize = 8;

const ROUNDS: usize = 16;

// Initial permutation IP
const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10, 2, 60, 52, 44, 36, 28, 20, 12, 4,
    62, 54, 46, 38, 30, 22, 14, 6, 64, 56, 48, 40, 32, 24, 16, 8,
    57, 49, 41, 33, 25, 17, 9, 1, 59, 51, 43, 35, 27, 19, 11, 3,
    61, 53, 45, 37, 29, 21, 13, 5, 63, 55, 47, 39, 31, 23, 15, 7,
];

// Final permutation IP^-1
const FP: [u8; 64] = [
    40, 8, 48, 16, 56, 24, 64, 32, 39, 7, 47, 15, 55, 23, 63, 31,
    38, 6, 46, 14, 54, 22, 62, 30, 37, 5, 45, 13, 53, 21, 61, 29,
    36, 4, 44, 12, 52, 20, 60, 28, 35, 3, 43, 11, 51, 19, 59, 27,
    34, 2, 42, 10, 50, 18, 58, 26, 33, 1, 41, 9, 49, 17, 57, 25,
];

// Expansion E: 32 -> 48 bits
const E: [u8; 48] = [
    32, 1, 2, 3, 4, 5, 4, 5, 6, 7, 8, 9,
    8, 9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21, 20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32, 1,
];

// Round function output permutation P
const P: [u8; 32] = [
    16, 7, 20, 21, 29, 12, 28, 17, 1, 15, 23, 26, 5, 18, 31, 10,
    2, 8, 24, 14, 32, 27, 3, 9, 19, 13, 30, 6, 22, 11, 4, 25,
];

// Permuted choice 1: 64 -> 56 bits, drops the parity bits 8, 16, ..., 64
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17, 9, 1, 58, 50, 42, 34, 26, 18,
    10, 2, 59, 51, 43, 35, 27, 19, 11, 3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15, 7, 62, 54, 46, 38, 30, 22,
    14, 6, 61, 53, 45, 37, 29, 21, 13, 5, 28, 20, 12, 4,
];

// Permuted choice 2: 56 -> 48 bits
const PC2: [u8; 48] = [
    14, 17, 11, 24, 1, 5, 3, 28, 15, 6, 21, 10,
    23, 19, 12, 4, 26, 8, 16, 7, 27, 20, 13, 2,
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

// Left rotations applied to C and D before each round
const SHIFTS: [u32; ROUNDS] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

// S-boxes, each 4 rows x 16 columns
const SBOXES: [[u8; 64]; 8] = [
    [
        14, 4, 13, 1, 2, 15, 11, 8, 3, 10, 6, 12, 5, 9, 0, 7,
        0, 15, 7, 4, 14, 2, 13, 1, 10, 6, 12, 11, 9, 5, 3, 8,
        4, 1, 14, 8, 13, 6, 2, 11, 15, 12, 9, 7, 3, 10, 5, 0,
        15, 12, 8, 2, 4, 9, 1, 7, 5, 11, 3, 14, 10, 0, 6, 13,
    ],
    [
        15, 1, 8, 14, 6, 11, 3, 4, 9, 7, 2, 13, 12, 0, 5, 10,
        3, 13, 4, 7, 15, 2, 8, 14, 12, 0, 1, 10, 6, 9, 11, 5,
        0, 14, 7, 11, 10, 4, 13, 1, 5, 8, 12, 6, 9, 3, 2, 15,
        13, 8, 10, 1, 3, 15, 4, 2, 11, 6, 7, 12, 0, 5, 14, 9,
    ],
    [
        10, 0, 9, 14, 6, 3, 15, 5, 1, 13, 12, 7, 11, 4, 2, 8,
        13, 7, 0, 9, 3, 4, 6, 10, 2, 8, 5, 14, 12, 11, 15, 1,
        13, 6, 4, 9, 8, 15, 3, 0, 11, 1, 2, 12, 5, 10, 14, 7,
        1, 10, 13, 0, 6, 9, 8, 7, 4, 15, 14, 3, 11, 5, 2, 12,
    ],
    [
        7, 13, 14, 3, 0, 6, 9, 10, 1, 2, 8, 5, 11, 12, 4, 15,
        13, 8, 11, 5, 6, 15, 0, 3, 4, 7, 2, 12, 1, 10, 14, 9,
        10, 6, 9, 0, 12, 11, 7, 13, 15, 1, 3, 14, 5, 2, 8, 4,
        3, 15, 0, 6, 10, 1, 13, 8, 9, 4, 5, 11, 12, 7, 2, 14,
    ],
    [
        2, 12, 4, 1, 7, 10, 11, 6, 8, 5, 3, 15, 13, 0, 14, 9,
        14, 11, 2, 12, 4, 7, 13, 1, 5, 0, 15, 10, 3, 9, 8, 6,
        4, 2, 1, 11, 10, 13, 7, 8, 15, 9, 12, 5, 6, 3, 0, 14,
        11, 8, 12, 7, 1, 14, 2, 13, 6, 15, 0, 9, 10, 4, 5, 3,
    ],
    [
        12, 1, 10, 15, 9, 2, 6, 8, 0, 13, 3, 4, 14, 7, 5, 11,
        10, 15, 4, 2, 7, 12, 9, 5, 6, 1, 13, 14, 0, 11, 3, 8,
        9, 14, 15, 5, 2, 8, 12, 3, 7, 0, 4, 10, 1, 13, 11, 6,
        4, 3, 2, 12, 9, 5, 15, 10, 11, 14, 1, 7, 6, 0, 8, 13,
    ],
    [
        4, 11, 2, 14, 15, 0, 8, 13, 3, 12, 9, 7, 5, 10, 6, 1,
        13, 0, 11, 7, 4, 9, 1, 10, 14, 3, 5, 12, 2, 15, 8, 6,
        1, 4, 11, 13, 12, 3, 7, 14, 10, 15, 6, 8, 0, 5, 9, 2,
        6, 11, 13, 8, 1, 4, 10, 7, 9, 5, 0, 15, 14, 2, 3, 12,
    ],
    [
        13, 2, 8, 4, 6, 15, 11, 1, 10, 9, 3, 14, 5, 0, 12, 7,
        1, 15, 13, 8, 10, 3, 7, 4, 12, 5, 6, 11, 0, 14, 9, 2,
        7, 11, 4, 1, 9, 12, 14, 2, 0, 6, 10, 13, 15, 3, 5, 8,
        2, 1, 14, 7, 4, 10, 8, 13, 15, 12, 9, 0, 3, 5, 6, 11,
    ],
];

/// Applies a permutation table to the low `width` bits of `input`.
///
/// Table entries are 1-based positions counted from the most significant
/// of those `width` bits; the output has `table.len()` bits.
fn permute(input: u64, width: u32, table: &[u8]) -> u64 {
    table.iter().fold(0u64, |out, &pos| {
        let bit = (input >> (width - pos as u32)) & 1;
        (out << 1) | bit
    })
}

/// Rotates a 28-bit half-key left by `n` positions.
fn rotate_28(half: u32, n: u32) -> u32 {
    ((half << n) | (half >> (28 - n))) & 0x0FFF_FFFF
}

/// Derives the 16 round subkeys (48 bits each) from the 64-bit key.
fn key_schedule(key: u64) -> [u64; ROUNDS] {
    let permuted = permute(key, 64, &PC1);
    let mut c = ((permuted >> 28) & 0x0FFF_FFFF) as u32;
    let mut d = (permuted & 0x0FFF_FFFF) as u32;

    let mut subkeys = [0u64; ROUNDS];
    for (subkey, &shift) in subkeys.iter_mut().zip(SHIFTS.iter()) {
        c = rotate_28(c, shift);
        d = rotate_28(d, shift);
        let cd = ((c as u64) << 28) | d as u64;
        *subkey = permute(cd, 56, &PC2);
    }
    subkeys
}

/// Round function f(R, K): expansion, key mixing, S-box substitution, permutation.
fn feistel(right: u32, subkey: u64) -> u32 {
    let expanded = permute(right as u64, 32, &E) ^ subkey;

    let mut substituted: u64 = 0;
    for (i, sbox) in SBOXES.iter().enumerate() {
        let chunk = ((expanded >> (42 - 6 * i)) & 0x3F) as usize;
        // Outer bits pick the row, inner four bits the column
        let row = ((chunk & 0x20) >> 4) | (chunk & 0x01);
        let col = (chunk >> 1) & 0x0F;
        substituted = (substituted << 4) | sbox[row * 16 + col] as u64;
    }

    permute(substituted, 32, &P) as u32
}

/// Runs IP, the 16 Feistel rounds with the given subkey order, and IP^-1.
fn crypt_block<'a>(block: u64, subkeys: impl Iterator<Item = &'a u64>) -> u64 {
    let permuted = permute(block, 64, &IP);
    let mut left = (permuted >> 32) as u32;
    let mut right = permuted as u32;

    for &subkey in subkeys {
        let next_right = left ^ feistel(right, subkey);
        left = right;
        right = next_right;
    }

    // The final swap: R16 L16 goes into IP^-1
    let preoutput = ((right as u64) << 32) | left as u64;
    permute(preoutput, 64, &FP)
}

fn block_to_u64(block: &[u8]) -> Result<u64> {
    let bytes: [u8; BLOCK_SIZE] = block
        .try_into()
        .map_err(|_| CipherModeError::InvalidBlockSize)?;
    Ok(u64::from_be_bytes(bytes))
}

/// A DES instance with its expanded key schedule.
#[derive(Clone)]
pub struct Des {
    subkeys: [u64; ROUNDS],
}

impl Des {
    /// Creates a DES cipher from an 8-byte key. Parity bits are ignored.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key.try_into().map_err(|_| CipherModeError::InvalidKeyLength {
            expected: "8",
            actual: key.len(),
        })?;

        Ok(Self {
            subkeys: key_schedule(u64::from_be_bytes(key)),
        })
    }

    /// Draws a fresh 8-byte key from a cryptographically secure source.
    pub fn generate_key<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        key
    }

    pub fn encrypt_block(&self, block: [u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        crypt_block(u64::from_be_bytes(block), self.subkeys.iter()).to_be_bytes()
    }

    /// Decryption is the same network with the subkeys reversed.
    pub fn decrypt_block(&self, block: [u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        crypt_block(u64::from_be_bytes(block), self.subkeys.iter().rev()).to_be_bytes()
    }
}

impl std::fmt::Debug for Des {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Des").finish_non_exhaustive()
    }
}

impl BlockCipher for Des {
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        let value = block_to_u64(block)?;
        Ok(crypt_block(value, self.subkeys.iter()).to_be_bytes().to_vec())
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        let value = block_to_u64(block)?;
        Ok(crypt_block(value, self.subkeys.iter().rev()).to_be_bytes().to_vec())
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}
