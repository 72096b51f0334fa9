/// Live bullet storage.
///
/// Bullets live in generation-tagged slots.  Removing a bullet only queues
/// it; the slot is released by `flush_removals` at the end of the tick, so
/// collision passes can iterate and remove in the same sweep.  Released
/// slots are reused by later shots, which keeps firing allocation-free once
/// the arena has warmed up.

use crate::entities::{Bullet, BulletOwner};

/// Stable handle to a bullet.  A handle whose bullet has been removed never
/// resolves again, even after its slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BulletId {
    index: usize,
    generation: u32,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    bullet: Option<Bullet>,
}

#[derive(Clone, Debug, Default)]
pub struct BulletArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    pending: Vec<BulletId>,
    live: usize,
}

impl BulletArena {
    pub fn new() -> Self {
        BulletArena::default()
    }

    pub fn insert(&mut self, bullet: Bullet) -> BulletId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.bullet = Some(bullet);
            return BulletId { index, generation: slot.generation };
        }
        self.slots.push(Slot { generation: 0, bullet: Some(bullet) });
        BulletId { index: self.slots.len() - 1, generation: 0 }
    }

    pub fn get(&self, id: BulletId) -> Option<&Bullet> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.bullet.as_ref())
    }

    pub fn contains(&self, id: BulletId) -> bool {
        self.get(id).is_some()
    }

    /// Queue a bullet for removal at the next `flush_removals`.
    /// Queuing the same bullet twice is harmless.
    pub fn remove_later(&mut self, id: BulletId) {
        if self.contains(id) && !self.pending.contains(&id) {
            self.pending.push(id);
        }
    }

    pub fn is_pending_removal(&self, id: BulletId) -> bool {
        self.pending.contains(&id)
    }

    /// Release every queued bullet.  Returns how many were removed.
    pub fn flush_removals(&mut self) -> usize {
        let mut removed = 0;
        for id in self.pending.drain(..) {
            let slot = &mut self.slots[id.index];
            if slot.generation == id.generation && slot.bullet.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                removed += 1;
            }
        }
        self.live -= removed;
        removed
    }

    /// Handles of every live bullet, in slot order.
    pub fn ids(&self) -> Vec<BulletId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BulletId, &Bullet)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.bullet
                .as_ref()
                .map(|b| (BulletId { index, generation: slot.generation }, b))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bullet> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.bullet.as_mut())
    }

    /// Live bullets fired by `owner`, including those queued for removal.
    pub fn count_owned_by(&self, owner: BulletOwner) -> usize {
        self.iter().filter(|(_, b)| b.owner == owner).count()
    }

    /// Immediately drop every bullet for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&Bullet) -> bool) {
        let doomed: Vec<BulletId> = self
            .iter()
            .filter(|(_, b)| !keep(b))
            .map(|(id, _)| id)
            .collect();
        for id in doomed {
            self.remove_later(id);
        }
        self.flush_removals();
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated; grows only when no freed slot exists.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
