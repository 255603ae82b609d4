/// Fixed-capacity FIFO buffer. Once full, every push evicts the oldest
/// element; iteration always runs oldest to newest.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    // Grows on push up to `capacity`, then overwrites in place.
    slots: Vec<T>,
    capacity: usize,
    head: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            slots: Vec::new(),
            capacity,
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn push(&mut self, value: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn get(&self, index_from_oldest: usize) -> Option<&T> {
        let len = self.slots.len();
        if index_from_oldest >= len {
            return None;
        }
        self.slots.get((self.head + index_from_oldest) % len)
    }

    pub fn latest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.len().saturating_sub(n);
        self.iter().skip(skip)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
