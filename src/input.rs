/// Keyboard abstraction.  The simulation only ever asks whether a key is
/// currently held; the terminal front end decides what "held" means.

use std::collections::HashSet;

use crate::entities::PlayerSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    Space,
    Enter,
    Escape,
    Delete,
}

pub trait InputSource {
    fn is_key_down(&self, key: Key) -> bool;
}

/// A snapshot of held keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeldKeys {
    keys: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        HeldKeys::default()
    }

    pub fn with(keys: &[Key]) -> Self {
        HeldKeys { keys: keys.iter().copied().collect() }
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }
}

impl InputSource for HeldKeys {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

/// Key bindings for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerControls {
    pub left: Key,
    pub right: Key,
    pub shoot: Key,
}

impl PlayerControls {
    pub fn for_slot(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::One => PlayerControls { left: Key::Left, right: Key::Right, shoot: Key::Up },
            PlayerSlot::Two => PlayerControls { left: Key::A, right: Key::D, shoot: Key::W },
        }
    }
}
