//! Letter frequency statistics shared by every analyzer

/// Number of letters in the Latin alphabet handled by the analyzers.
pub const ALPHABET_LEN: usize = 26;

/// Maps an ASCII letter of either case to its alphabet position (a=0, b=1, etc.).
pub fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_alphabetic() {
        Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
    } else {
        None
    }
}

/// The alphabet positions of all ASCII letters in `text`, in order.
pub fn letter_indices(text: &str) -> Vec<u8> {
    text.chars().filter_map(letter_index).map(|i| i as u8).collect()
}

/// Shifts a single character by `shift` positions, wrapping within its case.
/// Non-letters are returned unchanged.
pub fn shift_char(c: char, shift: u8) -> char {
    let base = if c.is_ascii_lowercase() {
        b'a'
    } else if c.is_ascii_uppercase() {
        b'A'
    } else {
        return c;
    };
    ((c as u8 - base + shift % 26) % 26 + base) as char
}

/// One row of the per-letter statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterStat {
    pub letter: char,
    pub count: u32,
    /// Share of all counted letters, in `[0, 1]`
    pub frequency: f64,
}

impl LetterStat {
    /// Frequency rendered as a percentage with two decimals, e.g. `"12.34%"`.
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.frequency * 100.0)
    }
}

/// Case-insensitive letter counts over a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterStats {
    counts: [u32; ALPHABET_LEN],
    total: u32,
}

impl Default for LetterStats {
    fn default() -> Self {
        Self {
            counts: [0; ALPHABET_LEN],
            total: 0,
        }
    }
}

impl LetterStats {
    /// Counts the letters a-z in `text`, ignoring case and every non-letter.
    pub fn from_text(text: &str) -> Self {
        Self::from_indices(text.chars().filter_map(letter_index))
    }

    /// Counts already-converted alphabet positions.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<usize>,
    {
        let mut stats = Self::default();
        for index in indices {
            stats.counts[index.into() % ALPHABET_LEN] += 1;
            stats.total += 1;
        }
        stats
    }

    pub fn counts(&self) -> &[u32; ALPHABET_LEN] {
        &self.counts
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Normalized frequencies; all zero for a text without letters.
    pub fn frequencies(&self) -> [f64; ALPHABET_LEN] {
        if self.total == 0 {
            return [0.0; ALPHABET_LEN];
        }
        let total = self.total as f64;
        self.counts.map(|count| count as f64 / total)
    }

    /// Index of Coincidence: the probability that two letters drawn without
    /// replacement are equal. 0.0 when fewer than two letters were counted.
    pub fn index_of_coincidence(&self) -> f64 {
        if self.total < 2 {
            return 0.0;
        }

        let numerator: f64 = self
            .counts
            .iter()
            .map(|&count| count as f64 * count.saturating_sub(1) as f64)
            .sum();
        let total = self.total as f64;
        numerator / (total * (total - 1.0))
    }

    /// Chi-squared statistic of the observed counts against `expected`
    /// letter probabilities. Letters with zero expected probability are skipped.
    pub fn chi_squared(&self, expected: &[f64; ALPHABET_LEN]) -> f64 {
        let total = self.total as f64;
        self.chi_squared_shifted(expected, 0, total)
    }

    /// Chi-squared of the counts after undoing a Caesar shift of `shift`:
    /// observed letter `i` is compared with the expectation for `i - shift`.
    pub fn chi_squared_shifted(&self, expected: &[f64; ALPHABET_LEN], shift: usize, total: f64) -> f64 {
        let mut chi_squared = 0.0;

        for (plain, &probability) in expected.iter().enumerate() {
            let expected_count = probability * total;
            if expected_count > 0.0 {
                let observed = self.counts[(plain + shift) % ALPHABET_LEN] as f64;
                chi_squared += (observed - expected_count).powi(2) / expected_count;
            }
        }

        chi_squared
    }

    /// Alphabet positions ordered by count descending, ties alphabetical.
    /// Letters that never occur come last, still alphabetical.
    pub fn ranked(&self) -> [usize; ALPHABET_LEN] {
        let mut order: [usize; ALPHABET_LEN] = core::array::from_fn(|i| i);
        order.sort_by(|&a, &b| self.counts[b].cmp(&self.counts[a]).then(a.cmp(&b)));
        order
    }

    /// Per-letter table sorted like [`LetterStats::ranked`].
    pub fn table(&self) -> Vec<LetterStat> {
        let frequencies = self.frequencies();
        self.ranked()
            .into_iter()
            .map(|i| LetterStat {
                letter: (b'a' + i as u8) as char,
                count: self.counts[i],
                frequency: frequencies[i],
            })
            .collect()
    }
}
