/// RingBuffer provides a buffer with a user-defined capacity. As soon as the capacity is reached,
/// the buffer overwrites the oldest values when new values are pushed to it.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    vals: Vec<T>,
    cap: usize,
    idx: usize, // index of the oldest value once the buffer is full
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        if capacity == 0 {
            panic!("RingBuffer capacity must be at least one!")
        }

        RingBuffer {
            vals: Vec::with_capacity(capacity),
            cap: capacity,
            idx: 0,
        }
    }

    pub fn push(&mut self, val: T) {
        if self.vals.len() < self.cap {
            self.vals.push(val);
        } else {
            self.vals[self.idx] = val;
            self.idx = (self.idx + 1) % self.cap;
        }
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// iter_oldest_first returns the stored values in the order they were pushed.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &T> {
        self.vals[self.idx..].iter().chain(self.vals[..self.idx].iter())
    }

    /// iter_newest_first returns the stored values starting with the most recently pushed one.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &T> {
        self.vals[..self.idx]
            .iter()
            .rev()
            .chain(self.vals[self.idx..].iter().rev())
    }

    pub fn newest(&self) -> Option<&T> {
        self.iter_newest_first().next()
    }
}

impl<T: Into<f64> + std::marker::Copy> RingBuffer<T> {
    pub fn get_avg(&self) -> Option<f64> {
        if self.vals.is_empty() {
            return None;
        }
        Some(self.get_sum() / self.vals.len() as f64)
    }
    fn get_sum(&self) -> f64 {
        let mut sum = 0.0;
        for val in self.vals.iter() {
            sum += (*val).into()
        }
        sum
    }
}
