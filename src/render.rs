/// Drawing interface consumed by the simulation.  Nothing returned here feeds
/// back into game state.

use std::io;

use crate::entities::{Entity, GameState, PlayerSlot, Tint};
use crate::settings::Playfield;

pub trait Renderer {
    fn begin_frame(&mut self, playfield: Playfield) -> io::Result<()>;

    fn draw_entity(&mut self, entity: &Entity, x: i32, y: i32) -> io::Result<()>;

    fn draw_score(&mut self, slot: PlayerSlot, score: u32) -> io::Result<()>;

    fn draw_lives(&mut self, slot: PlayerSlot, lives: u32, tint: Tint) -> io::Result<()>;

    fn draw_horizontal_line(&mut self, y: i32) -> io::Result<()>;

    /// Pre-level overlay: level number, whole seconds left, and whether a
    /// bonus life was granted.
    fn draw_countdown(&mut self, level: u32, seconds: u64, bonus_life: bool) -> io::Result<()>;

    /// End-of-game summary, one state per player.
    fn draw_results(&mut self, states: &[GameState], is_new_record: bool) -> io::Result<()>;

    fn finish_frame(&mut self) -> io::Result<()>;
}
