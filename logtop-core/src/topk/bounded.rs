use crate::topk::{Item, TopKError};
use ahash::AHashMap;

/// What a single `incr_by` did to the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrOutcome {
    /// The key was already tracked and its score grew in place.
    Incremented,
    /// The key was inserted into a free slot.
    Inserted,
    /// The key displaced the lowest-ranked entry, which is returned.
    Evicted(Item),
    /// The structure is full and the key could not beat the current minimum.
    Discarded,
}

/// Bounded top-K frequency counter.
///
/// Holds at most `k` keys. The lowest-ranked entry sits at the root of an
/// indexed binary heap, so inserts, updates and evictions are `O(log k)`
/// and the memory footprint never depends on the cardinality of the key
/// space.
///
/// This is an *approximate* counter. Once full, a key that is not tracked
/// only gets in if its increment alone is strictly greater than the
/// current minimum score; otherwise the increment is discarded. Evicted
/// keys lose their history, so scores are exact only for keys that stayed
/// resident since the last `reset`.
///
/// Ranking is by descending score, ties broken by ascending key.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    k: usize,
    // heap[0] ranks last among tracked keys
    heap: Vec<Item>,
    index: AHashMap<String, usize>,
}

impl BoundedTopK {
    pub fn new(k: usize) -> Result<Self, TopKError> {
        if k == 0 {
            return Err(TopKError::InvalidCapacity);
        }

        Ok(Self {
            k,
            heap: Vec::with_capacity(k),
            index: AHashMap::with_capacity(k),
        })
    }

    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current score of a tracked key.
    pub fn score(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&pos| self.heap[pos].score)
    }

    /// The entry that would be evicted next.
    pub fn min(&self) -> Option<&Item> {
        self.heap.first()
    }

    pub fn incr_by(&mut self, key: &str, amount: u64) -> Result<IncrOutcome, TopKError> {
        if amount == 0 {
            return Err(TopKError::NonPositiveAmount {
                key: key.to_string(),
            });
        }

        if let Some(&pos) = self.index.get(key) {
            let entry = &mut self.heap[pos];
            entry.score = entry
                .score
                .checked_add(amount)
                .ok_or_else(|| TopKError::ScoreOverflow {
                    key: key.to_string(),
                })?;
            // A higher score only ever moves an entry away from the root.
            self.sift_down(pos);
            return Ok(IncrOutcome::Incremented);
        }

        if self.heap.len() < self.k {
            self.heap.push(Item::new(key, amount));
            let pos = self.heap.len() - 1;
            self.index.insert(key.to_string(), pos);
            self.sift_up(pos);
            return Ok(IncrOutcome::Inserted);
        }

        if amount <= self.heap[0].score {
            return Ok(IncrOutcome::Discarded);
        }

        let evicted = std::mem::replace(&mut self.heap[0], Item::new(key, amount));
        self.index.remove(&evicted.key);
        self.index.insert(key.to_string(), 0);
        self.sift_down(0);

        Ok(IncrOutcome::Evicted(evicted))
    }

    /// Snapshot of the tracked entries, best first. Does not mutate.
    pub fn top_k(&self) -> Vec<Item> {
        let mut items = self.heap.clone();
        items.sort_unstable_by(Item::rank_cmp);
        items
    }

    pub fn reset(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    //-------------------------------------------------------------------------
    // Heap maintenance
    //-------------------------------------------------------------------------

    /// `a` ranks strictly after `b`.
    fn worse(a: &Item, b: &Item) -> bool {
        a.rank_cmp(b).is_gt()
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !Self::worse(&self.heap[pos], &self.heap[parent]) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut worst = pos;

            if left < len && Self::worse(&self.heap[left], &self.heap[worst]) {
                worst = left;
            }
            if right < len && Self::worse(&self.heap[right], &self.heap[worst]) {
                worst = right;
            }
            if worst == pos {
                break;
            }

            self.swap(pos, worst);
            pos = worst;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        if let Some(slot) = self.index.get_mut(&self.heap[a].key) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.heap[b].key) {
            *slot = b;
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert!(self.heap.len() <= self.k);
        assert_eq!(self.heap.len(), self.index.len());
        for (pos, item) in self.heap.iter().enumerate() {
            assert_eq!(self.index.get(&item.key), Some(&pos));
            if pos > 0 {
                let parent = (pos - 1) / 2;
                assert!(!Self::worse(item, &self.heap[parent]));
            }
        }
    }
}
