//! The AES state and its round transformations

use crate::tables::{INV_SBOX, SBOX};

/// Represents an AES block as a 4x4 byte matrix.
/// Bytes fill the matrix column by column, as in FIPS-197.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AesBlock {
    data: [[u8; 4]; 4],
}

impl AesBlock {
    /// Creates a new AES block from 16 bytes
    pub(crate) fn new(bytes: &[u8; 16]) -> Self {
        let mut data = [[0u8; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                data[row][col] = bytes[col * 4 + row];
            }
        }
        AesBlock { data }
    }

    /// Converts the block back to 16 bytes
    pub(crate) fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for col in 0..4 {
            for row in 0..4 {
                bytes[col * 4 + row] = self.data[row][col];
            }
        }
        bytes
    }

    /// SubBytes: replace every byte with its S-box value
    pub(crate) fn sub_bytes(&mut self) {
        for row in self.data.iter_mut() {
            for byte in row.iter_mut() {
                *byte = SBOX[*byte as usize];
            }
        }
    }

    /// Inverse SubBytes for decryption
    pub(crate) fn inv_sub_bytes(&mut self) {
        for row in self.data.iter_mut() {
            for byte in row.iter_mut() {
                *byte = INV_SBOX[*byte as usize];
            }
        }
    }

    /// ShiftRows: row `r` rotates left by `r` positions
    pub(crate) fn shift_rows(&mut self) {
        for row in 1..4 {
            self.data[row].rotate_left(row);
        }
    }

    /// Inverse ShiftRows: row `r` rotates right by `r` positions
    pub(crate) fn inv_shift_rows(&mut self) {
        for row in 1..4 {
            self.data[row].rotate_right(row);
        }
    }

    /// MixColumns: multiply each column by the fixed matrix over GF(2^8)
    ///
    /// ```text
    /// [2 3 1 1]
    /// [1 2 3 1]
    /// [1 1 2 3]
    /// [3 1 1 2]
    /// ```
    pub(crate) fn mix_columns(&mut self) {
        for col in 0..4 {
            let t = self.column(col);

            self.data[0][col] = gf_mult(2, t[0]) ^ gf_mult(3, t[1]) ^ t[2] ^ t[3];
            self.data[1][col] = t[0] ^ gf_mult(2, t[1]) ^ gf_mult(3, t[2]) ^ t[3];
            self.data[2][col] = t[0] ^ t[1] ^ gf_mult(2, t[2]) ^ gf_mult(3, t[3]);
            self.data[3][col] = gf_mult(3, t[0]) ^ t[1] ^ t[2] ^ gf_mult(2, t[3]);
        }
    }

    /// Inverse MixColumns for decryption
    ///
    /// ```text
    /// [0xE 0xB 0xD 0x9]
    /// [0x9 0xE 0xB 0xD]
    /// [0xD 0x9 0xE 0xB]
    /// [0xB 0xD 0x9 0xE]
    /// ```
    pub(crate) fn inv_mix_columns(&mut self) {
        for col in 0..4 {
            let t = self.column(col);

            self.data[0][col] = gf_mult(0x0e, t[0]) ^ gf_mult(0x0b, t[1]) ^ gf_mult(0x0d, t[2]) ^ gf_mult(0x09, t[3]);
            self.data[1][col] = gf_mult(0x09, t[0]) ^ gf_mult(0x0e, t[1]) ^ gf_mult(0x0b, t[2]) ^ gf_mult(0x0d, t[3]);
            self.data[2][col] = gf_mult(0x0d, t[0]) ^ gf_mult(0x09, t[1]) ^ gf_mult(0x0e, t[2]) ^ gf_mult(0x0b, t[3]);
            self.data[3][col] = gf_mult(0x0b, t[0]) ^ gf_mult(0x0d, t[1]) ^ gf_mult(0x09, t[2]) ^ gf_mult(0x0e, t[3]);
        }
    }

    /// AddRoundKey: XOR with the round key
    pub(crate) fn add_round_key(&mut self, round_key: &[u8; 16]) {
        for col in 0..4 {
            for row in 0..4 {
                self.data[row][col] ^= round_key[col * 4 + row];
            }
        }
    }

    fn column(&self, col: usize) -> [u8; 4] {
        [self.data[0][col], self.data[1][col], self.data[2][col], self.data[3][col]]
    }
}

/// Multiplication in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1
pub(crate) fn gf_mult(a: u8, b: u8) -> u8 {
    let mut result = 0;
    let mut a = a;
    let mut b = b;

    for _ in 0..8 {
        if b & 1 != 0 {
            result ^= a;
        }
        let high_bit = a & 0x80;
        a <<= 1;
        if high_bit != 0 {
            a ^= 0x1b; // 0x11b without the x^8 term
        }
        b >>= 1;
    }
    result
}
