use clap::Parser;
use minesweeper_kb::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

/// Watch the knowledge-base agent play one game of minesweeper.
#[derive(Parser, Debug)]
#[command(name = "autoplay", version)]
struct Cli {
    #[arg(long, default_value_t = 8)]
    height: usize,

    #[arg(long, default_value_t = 8)]
    width: usize,

    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for mine placement and guesses. Random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // --- 1. Initialization ---
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut game = Game::new(cli.height, cli.width, cli.mines, &mut rng)?;
    let delay = Duration::from_millis(cli.delay_ms);

    println!("--- Knowledge-Base Minesweeper Agent ---");
    println!("Strategy: reveal proven-safe cells, guess randomly otherwise.");
    println!("{game}");

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match game.step(&mut rng)? {
            Turn::Revealed {
                mv,
                count,
                inference,
            } => {
                let how = match mv.kind {
                    MoveKind::Safe => "Safe move",
                    MoveKind::Random => "Random guess",
                };
                println!("{how}: {} shows {count}.", mv.cell);
                if !inference.is_empty() {
                    println!(
                        "Learned {} safe cell(s) and {} mine(s).",
                        inference.safes.len(),
                        inference.mines.len()
                    );
                }
            }
            Turn::Exploded(mv) => {
                println!("Guessed {} and hit a mine.", mv.cell);
            }
            Turn::Exhausted => {
                println!("No valid moves left for the agent to make.");
                break;
            }
        }

        println!("{game}");

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!("Mines:\n{}", game.board);

    match game.game_state {
        GameState::Won => println!("Result: The agent flagged every mine and won!"),
        GameState::Lost => println!("Result: The agent hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    Ok(())
}
