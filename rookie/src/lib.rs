/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![doc = include_str!("../README.md")]

pub use rookie_types::*;

/// High-level abstraction of the game of chess: legal moves, check, checkmate and stalemate.
mod game;
/// Pseudo-legal move generation for every piece kind, and square attack queries.
mod movegen;
/// Enums and structs for modeling the movement of a piece on a chessboard.
mod moves;
/// Utility functions for counting the nodes of the legal move tree.
mod perft;
/// Strategies for choosing one move out of a list of legal moves.
mod picker;
/// A chessboard, complete with piece placements, side to move, castling rights and en passant.
mod position;

pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use picker::*;
pub use position::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::game::*;
    pub use crate::movegen::*;
    pub use crate::moves::*;
    pub use crate::perft::*;
    pub use crate::picker::*;
    pub use crate::position::*;
    pub use rookie_types::*;
}
