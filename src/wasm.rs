//! WebAssembly bindings for the browser front end

use crate::game::{Action, Battle, Direction, Position};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmBattle {
    battle: Battle,
}

#[wasm_bindgen]
impl WasmBattle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            battle: Battle::new(),
        }
    }

    /// Play a move given in board notation, e.g. `play("a1", "down")`
    pub fn play(&mut self, from: &str, direction: &str) -> Result<(), JsValue> {
        let from: Position = from.parse().map_err(to_js_error)?;
        let direction: Direction = direction.parse().map_err(to_js_error)?;
        self.battle
            .accept(&Action::new(from, direction))
            .map_err(to_js_error)
    }

    pub fn undo(&mut self) -> bool {
        self.battle.undo()
    }

    pub fn display_board(&self) -> String {
        self.battle.display_board()
    }

    pub fn current_player(&self) -> String {
        self.battle.current_player().to_string()
    }

    pub fn winner(&self) -> Option<String> {
        self.battle.winner().map(|player| player.to_string())
    }

    pub fn turn(&self) -> usize {
        self.battle.turn()
    }
}

impl Default for WasmBattle {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
