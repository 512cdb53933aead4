/// Current-page tracking for a book of fixed length
///
/// `current` is always inside `[0, len - 1]`. Out-of-range targets are clamped,
/// never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    current: usize,
    len: usize,
}

impl NavigationState {
    /// `len` is the page count; a zero length is treated as a single page
    pub fn new(len: usize) -> Self {
        Self {
            current: 0,
            len: len.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a book has at least one page
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn last_index(&self) -> usize {
        self.len - 1
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current == self.last_index()
    }

    /// Jump to `index`, clamped into range
    pub fn goto(&mut self, index: i64) -> usize {
        let last = self.last_index() as i64;
        self.current = index.clamp(0, last) as usize;
        self.current
    }

    pub fn first(&mut self) -> usize {
        self.current = 0;
        self.current
    }

    pub fn last(&mut self) -> usize {
        self.current = self.last_index();
        self.current
    }

    /// Step forward; past the last page either wraps to 0 or stays put
    pub fn next(&mut self, rotate: bool) -> usize {
        if self.is_last() {
            if rotate {
                self.current = 0;
            }
        } else {
            self.current += 1;
        }
        self.current
    }

    /// Step back; before the first page either wraps to the last or stays put
    pub fn prev(&mut self, rotate: bool) -> usize {
        if self.is_first() {
            if rotate {
                self.current = self.last_index();
            }
        } else {
            self.current -= 1;
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_clamps_any_integer() {
        let mut nav = NavigationState::new(10);
        for target in [-1_000, -1, 0, 3, 9, 10, 11, i64::MAX, i64::MIN] {
            nav.goto(target);
            assert!(nav.current() <= 9, "goto({}) left {}", target, nav.current());
        }
        assert_eq!(nav.goto(-5), 0);
        assert_eq!(nav.goto(42), 9);
        assert_eq!(nav.goto(4), 4);
    }

    #[test]
    fn test_goto_current_is_idempotent() {
        let mut nav = NavigationState::new(10);
        for k in 0..10 {
            nav.goto(k);
            let before = nav.current();
            nav.goto(nav.current() as i64);
            assert_eq!(nav.current(), before);
        }
    }

    #[test]
    fn test_next_at_last_page() {
        let mut nav = NavigationState::new(10);
        nav.last();
        assert_eq!(nav.next(false), 9);
        assert_eq!(nav.next(true), 0);
    }

    #[test]
    fn test_prev_at_first_page() {
        let mut nav = NavigationState::new(10);
        assert_eq!(nav.current(), 0);
        assert_eq!(nav.prev(false), 0);
        assert_eq!(nav.prev(true), 9);
    }

    #[test]
    fn test_stepping_inside_range() {
        let mut nav = NavigationState::new(3);
        assert_eq!(nav.next(false), 1);
        assert_eq!(nav.next(false), 2);
        assert!(nav.is_last());
        assert_eq!(nav.prev(false), 1);
        assert_eq!(nav.first(), 0);
        assert!(nav.is_first());
    }

    #[test]
    fn test_single_page_book() {
        let mut nav = NavigationState::new(1);
        assert_eq!(nav.next(true), 0);
        assert_eq!(nav.prev(true), 0);
        assert!(nav.is_first() && nav.is_last());
    }
}
