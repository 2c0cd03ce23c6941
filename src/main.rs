use std::env;
use std::error::Error;

use minesweeper_kb::util::{play, Board, Outcome};
use minesweeper_kb::Agent;

/// Positional `[height] [width] [mines]`, defaulting to an 8x8 board with 8
/// mines
fn parse_args() -> Result<(usize, usize, usize), Box<dyn Error>> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let arg = |i: usize, default: usize| -> Result<usize, Box<dyn Error>> {
        match args.get(i) {
            Some(value) => {
                value
                    .parse()
                    .map_err(|e| format!("Invalid argument '{value}': {e}").into())
            },
            None => Ok(default),
        }
    };
    Ok((arg(0, 8)?, arg(1, 8)?, arg(2, 8)?))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let (height, width, mines) = parse_args()?;
    let mut rng = rand::rng();
    let mut board = Board::random(height, width, mines, &mut rng)?;
    let mut agent = Agent::new(board.info());

    println!("{board}");
    let outcome = play(&mut board, &mut agent, &mut rng)?;
    match outcome {
        Outcome::Won => println!("Won after {} moves", agent.moves_made().len()),
        Outcome::Lost((row, col)) => {
            println!(
                "Hit a mine at ({row}, {col}) after {} moves, {} of {} mines found",
                agent.moves_made().len(),
                agent.mines().len(),
                board.total_mines()
            );
        },
        Outcome::Stuck => println!("No moves left"),
    }
    Ok(())
}
