/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Mul},
    str::FromStr,
};

use anyhow::{anyhow, bail, Result};

use super::Color;

/// A column on the chess board, `a` through `h`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct File(u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    /// Number of files on the board.
    pub const COUNT: usize = 8;

    /// Parses a [`File`] from a char in `a..=h`.
    pub fn from_char(c: char) -> Result<Self> {
        if !('a'..='h').contains(&c) {
            bail!("Invalid file char: expected one of a..h. Got {c:?}");
        }
        Ok(Self(c as u8 - b'a'))
    }

    /// Zero-based column index of this file.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (b'a' + self.0) as char
    }

    /// Iterates all files, `a` through `h`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A row on the chess board, `1` through `8`, counted from White's side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Rank(u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    /// Number of ranks on the board.
    pub const COUNT: usize = 8;

    /// Parses a [`Rank`] from a char in `1..=8`.
    pub fn from_char(c: char) -> Result<Self> {
        if !('1'..='8').contains(&c) {
            bail!("Invalid rank char: expected one of 1..8. Got {c:?}");
        }
        Ok(Self(c as u8 - b'1'))
    }

    /// Zero-based index of this rank, where rank one is `0`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (b'1' + self.0) as char
    }

    /// The rank that `color`'s Pawns start on.
    #[inline(always)]
    pub const fn second(color: Color) -> Self {
        match color {
            Color::White => Self::TWO,
            Color::Black => Self::SEVEN,
        }
    }

    /// The rank on which `color`'s Pawns promote.
    #[inline(always)]
    pub const fn eighth(color: Color) -> Self {
        match color {
            Color::White => Self::EIGHT,
            Color::Black => Self::ONE,
        }
    }

    /// Iterates all ranks, one through eight.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A single square on the board, addressed as a (row, column) pair.
///
/// Row `0` is rank eight (Black's back rank) and row `7` is rank one,
/// so squares are stored in the order they are read from a FEN string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Square(u8);

impl Square {
    pub const A8: Self = Self::new(File::A, Rank::EIGHT);
    pub const B8: Self = Self::new(File::B, Rank::EIGHT);
    pub const C8: Self = Self::new(File::C, Rank::EIGHT);
    pub const D8: Self = Self::new(File::D, Rank::EIGHT);
    pub const E8: Self = Self::new(File::E, Rank::EIGHT);
    pub const F8: Self = Self::new(File::F, Rank::EIGHT);
    pub const G8: Self = Self::new(File::G, Rank::EIGHT);
    pub const H8: Self = Self::new(File::H, Rank::EIGHT);
    pub const A7: Self = Self::new(File::A, Rank::SEVEN);
    pub const B7: Self = Self::new(File::B, Rank::SEVEN);
    pub const C7: Self = Self::new(File::C, Rank::SEVEN);
    pub const D7: Self = Self::new(File::D, Rank::SEVEN);
    pub const E7: Self = Self::new(File::E, Rank::SEVEN);
    pub const F7: Self = Self::new(File::F, Rank::SEVEN);
    pub const G7: Self = Self::new(File::G, Rank::SEVEN);
    pub const H7: Self = Self::new(File::H, Rank::SEVEN);
    pub const A6: Self = Self::new(File::A, Rank::SIX);
    pub const B6: Self = Self::new(File::B, Rank::SIX);
    pub const C6: Self = Self::new(File::C, Rank::SIX);
    pub const D6: Self = Self::new(File::D, Rank::SIX);
    pub const E6: Self = Self::new(File::E, Rank::SIX);
    pub const F6: Self = Self::new(File::F, Rank::SIX);
    pub const G6: Self = Self::new(File::G, Rank::SIX);
    pub const H6: Self = Self::new(File::H, Rank::SIX);
    pub const A5: Self = Self::new(File::A, Rank::FIVE);
    pub const B5: Self = Self::new(File::B, Rank::FIVE);
    pub const C5: Self = Self::new(File::C, Rank::FIVE);
    pub const D5: Self = Self::new(File::D, Rank::FIVE);
    pub const E5: Self = Self::new(File::E, Rank::FIVE);
    pub const F5: Self = Self::new(File::F, Rank::FIVE);
    pub const G5: Self = Self::new(File::G, Rank::FIVE);
    pub const H5: Self = Self::new(File::H, Rank::FIVE);
    pub const A4: Self = Self::new(File::A, Rank::FOUR);
    pub const B4: Self = Self::new(File::B, Rank::FOUR);
    pub const C4: Self = Self::new(File::C, Rank::FOUR);
    pub const D4: Self = Self::new(File::D, Rank::FOUR);
    pub const E4: Self = Self::new(File::E, Rank::FOUR);
    pub const F4: Self = Self::new(File::F, Rank::FOUR);
    pub const G4: Self = Self::new(File::G, Rank::FOUR);
    pub const H4: Self = Self::new(File::H, Rank::FOUR);
    pub const A3: Self = Self::new(File::A, Rank::THREE);
    pub const B3: Self = Self::new(File::B, Rank::THREE);
    pub const C3: Self = Self::new(File::C, Rank::THREE);
    pub const D3: Self = Self::new(File::D, Rank::THREE);
    pub const E3: Self = Self::new(File::E, Rank::THREE);
    pub const F3: Self = Self::new(File::F, Rank::THREE);
    pub const G3: Self = Self::new(File::G, Rank::THREE);
    pub const H3: Self = Self::new(File::H, Rank::THREE);
    pub const A2: Self = Self::new(File::A, Rank::TWO);
    pub const B2: Self = Self::new(File::B, Rank::TWO);
    pub const C2: Self = Self::new(File::C, Rank::TWO);
    pub const D2: Self = Self::new(File::D, Rank::TWO);
    pub const E2: Self = Self::new(File::E, Rank::TWO);
    pub const F2: Self = Self::new(File::F, Rank::TWO);
    pub const G2: Self = Self::new(File::G, Rank::TWO);
    pub const H2: Self = Self::new(File::H, Rank::TWO);
    pub const A1: Self = Self::new(File::A, Rank::ONE);
    pub const B1: Self = Self::new(File::B, Rank::ONE);
    pub const C1: Self = Self::new(File::C, Rank::ONE);
    pub const D1: Self = Self::new(File::D, Rank::ONE);
    pub const E1: Self = Self::new(File::E, Rank::ONE);
    pub const F1: Self = Self::new(File::F, Rank::ONE);
    pub const G1: Self = Self::new(File::G, Rank::ONE);
    pub const H1: Self = Self::new(File::H, Rank::ONE);

    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a [`Square`] from a [`File`] and [`Rank`].
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self((7 - rank.0) * 8 + file.0)
    }

    /// Creates a [`Square`] from a row (`0` is rank eight) and column (`0` is file `a`).
    ///
    /// # Example
    /// ```
    /// # use rookie_types::Square;
    /// assert_eq!(Square::from_coords(6, 4), Some(Square::E2));
    /// assert_eq!(Square::from_coords(8, 0), None);
    /// ```
    #[inline(always)]
    pub const fn from_coords(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self(row * 8 + col))
        } else {
            None
        }
    }

    /// Creates a [`Square`] from an index in `0..64`, in row-major order starting at `a8`.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Parses a [`Square`] from a coordinate string like `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use rookie_types::Square;
    /// assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<Self> {
        let mut chars = uci.chars();
        let file = chars
            .next()
            .ok_or(anyhow!("Invalid square: empty string"))?;
        let rank = chars
            .next()
            .ok_or(anyhow!("Invalid square {uci:?}: missing rank"))?;

        if chars.next().is_some() {
            bail!("Invalid square {uci:?}: expected exactly two characters");
        }

        Ok(Self::new(File::from_char(file)?, Rank::from_char(rank)?))
    }

    /// Converts this [`Square`] to its coordinate string, like `"e4"`.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Zero-based row, where `0` is rank eight.
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.0 / 8
    }

    /// Zero-based column, where `0` is file `a`.
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.0 % 8
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.col())
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(7 - self.row())
    }

    /// Shifts this square by the provided number of rows and columns, returning `None` if it leaves the board.
    #[inline(always)]
    pub const fn offset(&self, rows: i8, cols: i8) -> Option<Self> {
        let row = self.row() as i8 + rows;
        let col = self.col() as i8 + cols;

        if row >= 0 && row < 8 && col >= 0 && col < 8 {
            Some(Self((row * 8 + col) as u8))
        } else {
            None
        }
    }

    /// Moves this square `n` ranks towards `color`'s promotion rank.
    ///
    /// # Example
    /// ```
    /// # use rookie_types::{Color, Square};
    /// assert_eq!(Square::E2.forward_by(Color::White, 2), Some(Square::E4));
    /// assert_eq!(Square::E7.forward_by(Color::Black, 1), Some(Square::E6));
    /// assert_eq!(Square::E8.forward_by(Color::White, 1), None);
    /// ```
    #[inline(always)]
    pub const fn forward_by(&self, color: Color, n: i8) -> Option<Self> {
        match color {
            Color::White => self.offset(-n, 0),
            Color::Black => self.offset(n, 0),
        }
    }

    /// Moves this square `n` ranks towards `color`'s back rank.
    #[inline(always)]
    pub const fn backward_by(&self, color: Color, n: i8) -> Option<Self> {
        self.forward_by(color, -n)
    }

    /// Mirrors this square vertically if `color` is Black.
    ///
    /// Handy for naming squares from either side's perspective, like `Square::E1.rank_relative_to(color)`.
    #[inline(always)]
    pub const fn rank_relative_to(&self, color: Color) -> Self {
        match color {
            Color::White => *self,
            Color::Black => Self((7 - self.row()) * 8 + self.col()),
        }
    }

    /// Iterates all 64 squares, starting at `a8` and ending at `h1`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl Mul<Rank> for File {
    type Output = Square;
    #[inline(always)]
    fn mul(self, rhs: Rank) -> Self::Output {
        Square::new(self, rhs)
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}, {})", self.row(), self.col())
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_mapping() {
        // File a..h maps to column 0..7, rank 1..8 maps to row 7..0
        assert_eq!(Square::A8.row(), 0);
        assert_eq!(Square::A8.col(), 0);
        assert_eq!(Square::H1.row(), 7);
        assert_eq!(Square::H1.col(), 7);
        assert_eq!(Square::E2.row(), 6);
        assert_eq!(Square::E2.col(), 4);
        assert_eq!(Square::A8.index(), 0);
        assert_eq!(Square::H1.index(), 63);
    }

    #[test]
    fn test_uci_roundtrip() {
        for square in Square::iter() {
            assert_eq!(Square::from_uci(&square.to_uci()).unwrap(), square);
        }
    }

    #[test]
    fn test_malformed_squares() {
        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("e").is_err());
        assert!(Square::from_uci("e9").is_err());
        assert!(Square::from_uci("z1").is_err());
        assert!(Square::from_uci("e44").is_err());
    }

    #[test]
    fn test_offsets_stay_on_board() {
        assert_eq!(Square::A1.offset(0, -1), None);
        assert_eq!(Square::A1.offset(-1, 1), Some(Square::B2));
        assert_eq!(Square::H8.offset(-1, 0), None);
        assert_eq!(Square::G1.offset(-2, -1), Some(Square::F3));
    }

    #[test]
    fn test_rank_relative_to() {
        assert_eq!(Square::E1.rank_relative_to(Color::White), Square::E1);
        assert_eq!(Square::E1.rank_relative_to(Color::Black), Square::E8);
        assert_eq!(Square::H1.rank_relative_to(Color::Black), Square::H8);
    }
}
