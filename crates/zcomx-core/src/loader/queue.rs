use std::collections::VecDeque;

/// Per-page progress through the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoadState {
    Idle,
    Queued,
    Fetching,
    Loaded,
    /// Gave up after the last retry; never queued again
    Abandoned,
}

/// FIFO of page indices waiting for their image
///
/// An index is held at most once, counting the one being fetched, and at most
/// one fetch is active at a time.
#[derive(Debug, Clone)]
pub struct LoadQueue {
    pending: VecDeque<usize>,
    states: Vec<PageLoadState>,
    in_flight: Option<usize>,
}

impl LoadQueue {
    pub fn new(len: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(len),
            states: vec![PageLoadState::Idle; len],
            in_flight: None,
        }
    }

    pub fn state(&self, index: usize) -> Option<PageLoadState> {
        self.states.get(index).copied()
    }

    /// Enqueue `index` unless it is loaded, queued, being fetched or abandoned
    pub fn ensure(&mut self, index: usize) -> bool {
        match self.states.get(index) {
            Some(PageLoadState::Idle) => {
                self.states[index] = PageLoadState::Queued;
                self.pending.push_back(index);
                true
            }
            _ => false,
        }
    }

    /// Enqueue every page in warm-up order around `start`. Returns how many were added.
    pub fn warm_up(&mut self, start: usize) -> usize {
        warm_up_order(start, self.states.len())
            .into_iter()
            .filter(|&index| self.ensure(index))
            .count()
    }

    /// Take the next index to fetch, unless a fetch is already running
    pub fn start_next(&mut self) -> Option<usize> {
        if self.in_flight.is_some() {
            return None;
        }
        let index = self.pending.pop_front()?;
        self.states[index] = PageLoadState::Fetching;
        self.in_flight = Some(index);
        Some(index)
    }

    /// Record the outcome of the running fetch
    pub fn finish(&mut self, index: usize, loaded: bool) {
        if self.in_flight == Some(index) {
            self.in_flight = None;
        }
        if let Some(state) = self.states.get_mut(index) {
            *state = if loaded {
                PageLoadState::Loaded
            } else {
                PageLoadState::Abandoned
            };
        }
    }

    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight
    }

    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    /// Nothing queued and nothing being fetched
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }
}

/// Fetch order used when a book is mounted at `start`
///
/// The start page and its neighbours come first, then the first and last
/// pages, then every page walking forward from `start` and wrapping around.
pub fn warm_up_order(start: usize, len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = start.min(len - 1);

    let priority = [
        Some(start),
        start.checked_add(1),
        start.checked_sub(1),
        Some(0),
        Some(len - 1),
    ];
    let rotated = (0..len).map(|offset| Some((start + offset) % len));

    let mut seen = vec![false; len];
    priority
        .into_iter()
        .chain(rotated)
        .flatten()
        .filter(|&index| index < len && !std::mem::replace(&mut seen[index], true))
        .collect()
}
