use minesweeper_kb as ms;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u16, seed: u64) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = StdRng::seed_from_u64(seed);
    let game = ms::Game::new(height as usize, width as usize, mines as usize, &mut rng)
        .map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game.game_state == ms::GameState::Won)
}

/// Lets the agent play one turn. The trailing byte of the result is 0 for a
/// safe reveal, 1 for a mine and 2 when no move was left.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>, seed: u64) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let turn = game.step(&mut rng).map_err(|e| e.to_string())?;
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(match turn {
        ms::Turn::Revealed { .. } => 0,
        ms::Turn::Exploded(_) => 1,
        ms::Turn::Exhausted => 2,
    });
    Ok(xs)
}

/// Row-major tiles: -1 hidden, -2 flagged, otherwise the revealed number.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game
        .tiles()
        .into_iter()
        .flatten()
        .map(|tile| match tile {
            ms::Tile::Hidden => -1,
            ms::Tile::Flagged => -2,
            ms::Tile::Revealed(n) => n as i8,
        })
        .collect())
}
