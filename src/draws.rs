//! Draw records and the sequences derived from a draw history.
//!
//! Every analysis in this crate reads the history through one of the
//! derivations here: the flattened number sequence, its parity sequence, or a
//! bit stream under one of the [`BitEncoding`] modes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};
use crate::{BALLS_PER_DRAW, TOTAL_BALLS};

/// One lottery drawing: six distinct winning numbers plus a bonus number.
///
/// Fields are private so a `Draw` can only exist in a validated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DrawRecord")]
pub struct Draw {
    draw_no: u32,
    draw_date: NaiveDate,
    numbers: [u8; BALLS_PER_DRAW],
    bonus: u8,
}

/// Unvalidated wire shape of a draw, as stored by the draw collector.
#[derive(Debug, Deserialize)]
struct DrawRecord {
    draw_no: u32,
    draw_date: NaiveDate,
    numbers: Vec<u8>,
    bonus: u8,
}

impl TryFrom<DrawRecord> for Draw {
    type Error = AnalysisError;

    fn try_from(record: DrawRecord) -> Result<Self> {
        let count = record.numbers.len();
        let numbers: [u8; BALLS_PER_DRAW] =
            record
                .numbers
                .try_into()
                .map_err(|_| AnalysisError::InvalidDraw {
                    draw_no: record.draw_no,
                    reason: format!("expected {} numbers, got {}", BALLS_PER_DRAW, count),
                })?;
        Draw::new(record.draw_no, record.draw_date, numbers, record.bonus)
    }
}

fn in_ball_range(number: u8) -> bool {
    (1..=TOTAL_BALLS as u8).contains(&number)
}

impl Draw {
    /// Build a validated draw.
    ///
    /// The six numbers must be distinct and within 1..=45. The bonus must be
    /// in range too but may repeat one of the numbers.
    pub fn new(
        draw_no: u32,
        draw_date: NaiveDate,
        numbers: [u8; BALLS_PER_DRAW],
        bonus: u8,
    ) -> Result<Self> {
        let invalid = |reason: String| AnalysisError::InvalidDraw { draw_no, reason };

        if draw_no == 0 {
            return Err(invalid("draw number must be positive".to_string()));
        }
        if let Some(&bad) = numbers.iter().find(|&&n| !in_ball_range(n)) {
            return Err(invalid(format!("number {} outside 1..={}", bad, TOTAL_BALLS)));
        }
        let mut sorted = numbers;
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(invalid(format!("numbers {:?} are not distinct", numbers)));
        }
        if !in_ball_range(bonus) {
            return Err(invalid(format!("bonus {} outside 1..={}", bonus, TOTAL_BALLS)));
        }

        Ok(Draw {
            draw_no,
            draw_date,
            numbers,
            bonus,
        })
    }

    pub fn draw_no(&self) -> u32 {
        self.draw_no
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_date
    }

    /// Winning numbers in the order they were recorded.
    pub fn numbers(&self) -> &[u8; BALLS_PER_DRAW] {
        &self.numbers
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }

    /// Differences between consecutive numbers after sorting ascending.
    pub fn gaps(&self) -> [u32; BALLS_PER_DRAW - 1] {
        let mut sorted = self.numbers;
        sorted.sort_unstable();
        let mut gaps = [0u32; BALLS_PER_DRAW - 1];
        for (gap, pair) in gaps.iter_mut().zip(sorted.windows(2)) {
            *gap = (pair[1] - pair[0]) as u32;
        }
        gaps
    }
}

/// Parse a JSON array of draws.
///
/// The result is sorted ascending by `draw_no`. Duplicate draw numbers are
/// collapsed, keeping the entry that appears last in the input.
pub fn parse_draws_json(input: &str) -> Result<Vec<Draw>> {
    let parsed: Vec<Draw> = serde_json::from_str(input)?;
    let total = parsed.len();

    let mut by_number = BTreeMap::new();
    for draw in parsed {
        by_number.insert(draw.draw_no, draw);
    }
    if by_number.len() != total {
        warn!(
            "Dropped {} duplicate draw records",
            total - by_number.len()
        );
    }

    debug!("Parsed {} draws", by_number.len());
    Ok(by_number.into_values().collect())
}

/// Read a draw history file written by the draw collector.
pub fn load_draws(path: impl AsRef<Path>) -> Result<Vec<Draw>> {
    let path = path.as_ref();
    debug!("Loading draw history from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_draws_json(&content)
}

/// All drawn numbers, draw order preserved.
pub fn flatten_numbers(draws: &[Draw]) -> Vec<u8> {
    draws
        .iter()
        .flat_map(|draw| draw.numbers.iter().copied())
        .collect()
}

/// 1 for odd, 0 for even, one entry per drawn number.
pub fn parity_sequence(draws: &[Draw]) -> Vec<u8> {
    draws
        .iter()
        .flat_map(|draw| draw.numbers.iter().map(|&n| n % 2))
        .collect()
}

/// Rule for turning a draw history into a bit stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitEncoding {
    /// 45 bits per draw, one membership flag per number.
    #[default]
    Presence,
    /// One bit per drawn number, 1 if odd.
    Parity,
    /// Six bits per drawn number, MSB first.
    Binary,
}

impl BitEncoding {
    pub const ALL: [BitEncoding; 3] = [
        BitEncoding::Presence,
        BitEncoding::Parity,
        BitEncoding::Binary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BitEncoding::Presence => "presence",
            BitEncoding::Parity => "parity",
            BitEncoding::Binary => "binary",
        }
    }

    fn encoder(self) -> fn(&[Draw]) -> Vec<u8> {
        match self {
            BitEncoding::Presence => presence_bits,
            BitEncoding::Parity => parity_sequence,
            BitEncoding::Binary => binary_bits,
        }
    }
}

impl fmt::Display for BitEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitEncoding {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        BitEncoding::ALL
            .into_iter()
            .find(|encoding| encoding.as_str() == s)
            .ok_or_else(|| AnalysisError::InvalidEncoding(s.to_string()))
    }
}

fn presence_bits(draws: &[Draw]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(draws.len() * TOTAL_BALLS);
    for draw in draws {
        for number in 1..=TOTAL_BALLS as u8 {
            bits.push(draw.contains(number) as u8);
        }
    }
    bits
}

fn binary_bits(draws: &[Draw]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(draws.len() * BALLS_PER_DRAW * 6);
    for &number in draws.iter().flat_map(|draw| draw.numbers.iter()) {
        for shift in (0..6).rev() {
            bits.push((number >> shift) & 1);
        }
    }
    bits
}

/// Derive the bit stream for `encoding`.
pub fn bit_sequence(draws: &[Draw], encoding: BitEncoding) -> Vec<u8> {
    let bits = (encoding.encoder())(draws);
    debug!(
        "Derived {} bits from {} draws using {} encoding",
        bits.len(),
        draws.len(),
        encoding
    );
    bits
}

/// Same as [`bit_sequence`] but takes the encoding by name.
pub fn bit_sequence_named(draws: &[Draw], encoding: &str) -> Result<Vec<u8>> {
    let encoding = encoding.parse::<BitEncoding>().map_err(|e| {
        warn!("Rejected bit encoding: {}", encoding);
        e
    })?;
    Ok(bit_sequence(draws, encoding))
}
