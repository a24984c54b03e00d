// Rolling window of recently delivered event ids.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub(crate) struct DedupWindow {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl DedupWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Remember `id`, evicting the oldest entry when full. Returns `false`
    /// if it was already present.
    pub(crate) fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(id.to_owned());
        self.seen.insert(id.to_owned());
        true
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_inside_the_window_are_rejected() {
        let mut window = DedupWindow::new(4);
        assert!(window.insert("a"));
        assert!(window.insert("b"));
        assert!(!window.insert("a"));
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn oldest_ids_are_evicted() {
        let mut window = DedupWindow::new(2);
        window.insert("a");
        window.insert("b");
        window.insert("c");
        assert!(!window.contains("a"));
        assert!(window.contains("b"));
        assert!(window.contains("c"));
        assert!(window.insert("a"));
    }
}
