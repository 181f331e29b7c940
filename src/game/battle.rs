//! A game session with move history

use crate::game::{
    error::Result,
    game::{Action, Game},
    player::Player,
};

/// Keeps every game state reached so far so moves can be taken back
#[derive(Debug, Clone)]
pub struct Battle {
    game: Game,
    history: Vec<Game>,
}

impl Battle {
    pub fn new() -> Self {
        let game = Game::new();
        let history = vec![game.clone()];
        Self { game, history }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Number of moves played so far
    pub fn turn(&self) -> usize {
        self.history.len() - 1
    }

    pub fn current_player(&self) -> Player {
        self.game.current_player()
    }

    pub fn winner(&self) -> Option<Player> {
        self.game.winner()
    }

    /// Play a move; the state is left untouched if it is rejected
    pub fn accept(&mut self, action: &Action) -> Result<()> {
        let next = self.game.accept(action)?;
        self.history.push(next.clone());
        self.game = next;
        Ok(())
    }

    /// Take back the last move. Returns `false` at the initial state.
    pub fn undo(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        if let Some(previous) = self.history.last() {
            self.game = previous.clone();
        }
        true
    }

    pub fn display_board(&self) -> String {
        let mut out = self.game.board.render();
        match self.game.winner() {
            Some(winner) => out.push_str(&format!("winner: {}\n", winner)),
            None => out.push_str(&format!(
                "turn {}: {} to move\n",
                self.turn() + 1,
                self.game.current_player()
            )),
        }
        out
    }
}

impl Default for Battle {
    fn default() -> Self {
        Self::new()
    }
}
