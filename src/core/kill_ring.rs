//! Bounded ring of killed text fragments with yank / yank-pop.

use std::collections::VecDeque;

const CAPACITY: usize = 10;

/// What the previous dispatcher action was, as far as the ring cares.
/// Any non-kill, non-yank action resets this to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillAction {
    Other,
    Kill,
    Yank,
}

#[derive(Debug)]
pub struct KillRing {
    ring: VecDeque<Vec<char>>,
    pub last_action: KillAction,
    pub last_yank_size: usize,
    last_forward: bool,
}

impl KillRing {
    pub fn new() -> Self {
        Self {
            ring: VecDeque::with_capacity(CAPACITY),
            last_action: KillAction::Other,
            last_yank_size: 0,
            last_forward: true,
        }
    }

    /// Record killed text. Consecutive kills in the same direction merge into
    /// the top entry: forward kills append, backward kills prepend. Anything
    /// else pushes a new entry, evicting the oldest when the ring is full.
    pub fn kill(&mut self, text: &[char], forward: bool) {
        if text.is_empty() {
            return;
        }
        if self.last_action == KillAction::Kill && self.last_forward == forward {
            if let Some(top) = self.ring.front_mut() {
                if forward {
                    top.extend_from_slice(text);
                } else {
                    top.splice(0..0, text.iter().copied());
                }
                self.last_forward = forward;
                return;
            }
        }
        if self.ring.len() == CAPACITY {
            self.ring.pop_back();
        }
        self.ring.push_front(text.to_vec());
        self.last_forward = forward;
    }

    /// Most recent kill, if any. The caller records the yank state.
    pub fn yank(&self) -> Option<Vec<char>> {
        self.ring.front().cloned()
    }

    /// Rotate the ring (top moves to the bottom) and return the new top.
    /// Only meaningful while the last action was a yank; the caller checks.
    pub fn yank_pop(&mut self) -> Option<Vec<char>> {
        let top = self.ring.pop_front()?;
        self.ring.push_back(top);
        self.ring.front().cloned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ring.len()
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{KillAction, KillRing, CAPACITY};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn consecutive_kills_merge_by_direction() {
        let mut ring = KillRing::new();
        ring.kill(&chars("foo"), true);
        ring.last_action = KillAction::Kill;
        ring.kill(&chars("bar"), true);
        assert_eq!(ring.yank(), Some(chars("foobar")));

        ring.kill(&chars("pre"), false);
        ring.last_action = KillAction::Kill;
        ring.kill(&chars("fix"), false);
        assert_eq!(ring.yank(), Some(chars("fixpre")));
    }

    #[test]
    fn direction_change_starts_a_new_entry() {
        let mut ring = KillRing::new();
        ring.kill(&chars("left"), false);
        ring.last_action = KillAction::Kill;
        ring.kill(&chars("right"), true);
        assert_eq!(ring.yank(), Some(chars("right")));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn intervening_action_starts_a_new_entry() {
        let mut ring = KillRing::new();
        ring.kill(&chars("one"), true);
        ring.last_action = KillAction::Other;
        ring.kill(&chars("two"), true);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.yank(), Some(chars("two")));
    }

    #[test]
    fn full_ring_evicts_the_oldest() {
        let mut ring = KillRing::new();
        for i in 0..=CAPACITY {
            ring.last_action = KillAction::Other;
            ring.kill(&chars(&format!("k{i}")), true);
        }
        assert_eq!(ring.len(), CAPACITY);
        let mut seen = Vec::new();
        for _ in 0..CAPACITY {
            seen.push(ring.yank_pop());
        }
        assert!(!seen.contains(&Some(chars("k0"))));
    }

    #[test]
    fn yank_pop_rotates() {
        let mut ring = KillRing::new();
        ring.kill(&chars("a"), true);
        ring.last_action = KillAction::Other;
        ring.kill(&chars("b"), true);
        assert_eq!(ring.yank(), Some(chars("b")));
        assert_eq!(ring.yank_pop(), Some(chars("a")));
        assert_eq!(ring.yank_pop(), Some(chars("b")));
    }

    #[test]
    fn empty_ring_yields_nothing() {
        let mut ring = KillRing::new();
        assert_eq!(ring.yank(), None);
        assert_eq!(ring.yank_pop(), None);
    }
}
