//! Fixed-capacity pools of reusable visual slots.
//!
//! Trails, flashes, links and jets are all short-lived. Rather than
//! allocating a handle per spawn, a simulation pre-allocates a [`Pool`] at
//! initialize time and claims slots from it during `advance`.
//!
//! Two claim policies exist:
//!
//! | Mode | When every slot is live |
//! |------|-------------------------|
//! | [`ClaimMode::Cyclic`] | the slot under the cursor is recycled (oldest first) |
//! | [`ClaimMode::FirstFree`] | the claim is dropped and `None` is returned |
//!
//! Either way the number of live slots never exceeds the capacity.
//!
//! ```ignore
//! let mut trails = Pool::new(600, ClaimMode::Cyclic, |_| Sprite::default());
//! if let Some((_, slot)) = trails.claim(0.1) {
//!     slot.item.position = photon.position;
//! }
//! trails.tick(dt);
//! ```

/// How [`Pool::claim`] picks the next slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    /// Advance a cursor, overwriting whatever is there.
    Cyclic,
    /// Scan from the start for a dead slot.
    FirstFree,
}

/// One reusable entry in a [`Pool`].
#[derive(Debug, Clone)]
pub struct Slot<T> {
    pub live: bool,
    /// Seconds until the slot expires.
    pub life: f32,
    pub item: T,
}

/// Fixed-capacity slot storage.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    cursor: usize,
    mode: ClaimMode,
}

impl<T> Pool<T> {
    /// Allocate `capacity` dead slots, building each item with `make(index)`.
    pub fn new(capacity: usize, mode: ClaimMode, mut make: impl FnMut(usize) -> T) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot {
                live: false,
                life: 0.0,
                item: make(i),
            })
            .collect();
        Self {
            slots,
            cursor: 0,
            mode,
        }
    }

    /// Claim a slot and mark it live with `life` seconds remaining.
    ///
    /// Returns the slot index alongside the slot. `None` when the pool has no
    /// capacity, or when a first-free pool is full.
    pub fn claim(&mut self, life: f32) -> Option<(usize, &mut Slot<T>)> {
        let index = match self.mode {
            ClaimMode::Cyclic => {
                if self.slots.is_empty() {
                    return None;
                }
                let i = self.cursor;
                self.cursor = (self.cursor + 1) % self.slots.len();
                i
            }
            ClaimMode::FirstFree => self.slots.iter().position(|s| !s.live)?,
        };
        let slot = &mut self.slots[index];
        slot.live = true;
        slot.life = life;
        Some((index, slot))
    }

    /// Count down every live slot; slots reaching zero go dead.
    ///
    /// Returns how many slots expired this tick.
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut expired = 0;
        for slot in self.slots.iter_mut().filter(|s| s.live) {
            slot.life -= dt;
            if slot.life <= 0.0 {
                slot.live = false;
                expired += 1;
            }
        }
        expired
    }

    /// Mark the slot dead without waiting for its life to run out.
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.live = false;
            slot.life = 0.0;
        }
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn mode(&self) -> ClaimMode {
        self.mode
    }

    pub fn get(&self, index: usize) -> Option<&Slot<T>> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot<T>> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot<T>> {
        self.slots.iter_mut()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Slot<T>> {
        self.slots.iter().filter(|s| s.live)
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Slot<T>> {
        self.slots.iter_mut().filter(|s| s.live)
    }

    /// Drop every slot. Capacity becomes zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_recycles_oldest() {
        let mut pool = Pool::new(4, ClaimMode::Cyclic, |i| i);
        let claimed: Vec<usize> = (0..5).map(|_| pool.claim(1.0).map(|(i, _)| i).unwrap()).collect();
        assert_eq!(claimed, vec![0, 1, 2, 3, 0]);
        assert_eq!(pool.live_count(), 4);
    }

    #[test]
    fn test_first_free_drops_when_full() {
        let mut pool = Pool::new(2, ClaimMode::FirstFree, |_| ());
        assert!(pool.claim(1.0).is_some());
        assert!(pool.claim(1.0).is_some());
        assert!(pool.claim(1.0).is_none());
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn test_first_free_reuses_expired() {
        let mut pool = Pool::new(2, ClaimMode::FirstFree, |_| ());
        pool.claim(0.1);
        pool.claim(1.0);
        assert_eq!(pool.tick(0.2), 1);
        let (index, _) = pool.claim(1.0).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_empty_pool() {
        let mut pool: Pool<()> = Pool::new(0, ClaimMode::Cyclic, |_| ());
        assert!(pool.claim(1.0).is_none());
    }

    #[test]
    fn test_release_and_clear() {
        let mut pool = Pool::new(3, ClaimMode::Cyclic, |_| 0u8);
        pool.claim(5.0);
        pool.release(0);
        assert_eq!(pool.live_count(), 0);
        pool.clear();
        assert_eq!(pool.capacity(), 0);
    }
}
