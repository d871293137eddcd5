//! Double buffer with an explicit active index
//!
//! Swapping flips the index; nothing is copied. Anything else that has one
//! resource per buffer (bind groups, for instance) is indexed by the same
//! [`Slot`] so it can never disagree about which side is current.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Front,
    Back,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::Front => Slot::Back,
            Slot::Back => Slot::Front,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::Front => 0,
            Slot::Back => 1,
        }
    }
}

/// Two values of the same kind, one readable (`read`) and one being
/// produced (`write`).
#[derive(Debug)]
pub struct BufferPair<T> {
    slots: [T; 2],
    active: Slot,
}

impl<T> BufferPair<T> {
    /// `front` starts out as the read side.
    pub fn new(front: T, back: T) -> Self {
        Self {
            slots: [front, back],
            active: Slot::Front,
        }
    }

    pub fn read_slot(&self) -> Slot {
        self.active
    }

    pub fn write_slot(&self) -> Slot {
        self.active.other()
    }

    pub fn read(&self) -> &T {
        &self.slots[self.active.index()]
    }

    pub fn write(&self) -> &T {
        &self.slots[self.active.other().index()]
    }

    pub fn write_mut(&mut self) -> &mut T {
        &mut self.slots[self.active.other().index()]
    }

    pub fn get(&self, slot: Slot) -> &T {
        &self.slots[slot.index()]
    }

    pub fn swap(&mut self) {
        self.active = self.active.other();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

/// One value per slot, looked up by a [`BufferPair`]'s slot.
#[derive(Debug)]
pub struct PerSlot<T>([T; 2]);

impl<T> PerSlot<T> {
    pub fn new(mut build: impl FnMut(Slot) -> T) -> Self {
        Self([build(Slot::Front), build(Slot::Back)])
    }

    pub fn get(&self, slot: Slot) -> &T {
        &self.0[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_write_are_distinct() {
        let mut pair = BufferPair::new("a", "b");
        for _ in 0..5 {
            assert_ne!(pair.read_slot(), pair.write_slot());
            assert_ne!(pair.read(), pair.write());
            pair.swap();
        }
    }

    #[test]
    fn test_swap_promotes_write_to_read() {
        let mut pair = BufferPair::new(0, 1);
        for _ in 0..7 {
            let written = *pair.write();
            pair.swap();
            assert_eq!(*pair.read(), written);
        }
    }

    #[test]
    fn test_double_swap_is_identity() {
        let mut pair = BufferPair::new('x', 'y');
        let (read, write) = (pair.read_slot(), pair.write_slot());
        pair.swap();
        pair.swap();
        assert_eq!(pair.read_slot(), read);
        assert_eq!(pair.write_slot(), write);
        assert_eq!(*pair.read(), 'x');
    }

    #[test]
    fn test_write_mut_only_touches_write_side() {
        let mut pair = BufferPair::new(vec![0], vec![0]);
        pair.write_mut().push(9);
        assert_eq!(pair.read(), &vec![0]);
        assert_eq!(pair.write(), &vec![0, 9]);
    }

    #[test]
    fn test_per_slot_follows_pair() {
        let mut pair = BufferPair::new(10, 20);
        let labels = PerSlot::new(|slot| format!("{:?}", slot));

        assert_eq!(labels.get(pair.read_slot()), "Front");
        pair.swap();
        assert_eq!(labels.get(pair.read_slot()), "Back");
        assert_eq!(*pair.get(Slot::Back), 20);
    }
}
