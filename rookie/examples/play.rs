/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use log::info;

use rookie::{pick_move, Color, Game, GameState, Move, RandomPicker, Square};

/// Play chess in the terminal against an opponent that moves at random.
#[derive(Debug, Parser)]
struct Cli {
    /// FEN string of the position to start from. Defaults to the starting position.
    #[arg(long)]
    fen: Option<String>,

    /// Seed for the random opponent, for reproducible games.
    #[arg(long)]
    seed: Option<u64>,

    /// The side you play.
    #[arg(long, default_value = "white")]
    color: Color,

    /// Let the random opponent play both sides.
    #[arg(long, default_value = "false")]
    auto: bool,

    /// Stop after this many plies. Only applies with `--auto`.
    #[arg(long, default_value = "500")]
    max_plies: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut game = match &args.fen {
        Some(fen) => Game::from_fen(fen).context("Failed to set up the starting position")?,
        None => Game::default(),
    };

    let mut picker = match args.seed {
        Some(seed) => RandomPicker::seeded(seed),
        None => RandomPicker::default(),
    };
    info!("Starting from {game}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut plies = 0;

    loop {
        print_board(&game);

        let state = game.state();
        if state.is_over() {
            report(state);
            break;
        }

        let color = game.side_to_move();
        if game.is_in_check(color) {
            println!("{}", format!("{color} is in check").yellow());
        }

        if args.auto && plies >= args.max_plies {
            println!("Stopping after {plies} plies");
            break;
        }

        let mv = if !args.auto && color == args.color {
            print!("{color} to move. Enter your move (e2e4): ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                println!();
                break;
            };
            let line = line?;

            match line.trim() {
                "quit" | "exit" => break,
                "moves" => {
                    let moves = game.legal_moves();
                    let moves = moves.iter().map(Move::to_uci).collect::<Vec<_>>();
                    println!("{}", moves.join(" "));
                    continue;
                }
                input => match Move::from_uci(&game, input) {
                    Ok(mv) => mv,
                    Err(err) => {
                        println!("{}", err.to_string().red());
                        continue;
                    }
                },
            }
        } else {
            let Some(mv) = pick_move(&game, &mut picker) else {
                break;
            };
            println!("{color} plays {}", mv.to_string().bold());
            mv
        };

        game.make_move(mv);
        plies += 1;
    }

    println!("Final position: {game}");
    Ok(())
}

fn report(state: GameState) {
    match state {
        GameState::Checkmate { winner } => {
            println!("{}", format!("Checkmate! {winner} wins").green().bold())
        }
        GameState::Stalemate => println!("{}", "Stalemate!".cyan().bold()),
        GameState::Ongoing => {}
    }
}

/// Prints the board with Unicode pieces on a checkered background, rank eight at the top.
fn print_board(game: &Game) {
    println!("   a  b  c  d  e  f  g  h");
    for row in 0..8 {
        print!("{} ", 8 - row);
        for col in 0..8 {
            let Some(square) = Square::from_coords(row, col) else {
                continue;
            };

            let glyph = game
                .piece_at(square)
                .map(|piece| piece.glyph())
                .unwrap_or(' ');
            let cell = format!(" {glyph} ").black();

            // a8 is a light square
            if (row + col) % 2 == 0 {
                print!("{}", cell.on_truecolor(240, 217, 181));
            } else {
                print!("{}", cell.on_truecolor(181, 136, 99));
            }
        }
        println!(" {}", 8 - row);
    }
    println!("   a  b  c  d  e  f  g  h");
}
