//! The single selection cursor shared by keyboard and pointer input.

/// Highlighted index into the current suggestion list.
///
/// `None` is "nothing highlighted" (the `-1` position). Every mutator takes
/// the current list length and clamps, so the cursor can never point past the
/// end of the list it is paired with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor(Option<usize>);

impl SelectionCursor {
    pub const NONE: Self = Self(None);

    pub fn get(self) -> Option<usize> {
        self.0
    }

    /// Signed position, `-1` when nothing is highlighted.
    pub fn position(self) -> isize {
        self.0.map_or(-1, |i| i as isize)
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// `min(cursor + 1, len - 1)`; stays unset on an empty list.
    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            self.0 = None;
            return;
        }
        let next = self.0.map_or(0, |i| i.saturating_add(1));
        self.0 = Some(next.min(len - 1));
    }

    /// `max(cursor - 1, -1)`.
    pub fn move_up(&mut self, len: usize) {
        self.0 = match self.0 {
            Some(0) | None => None,
            Some(i) => Some((i - 1).min(len.saturating_sub(1))),
        };
        if len == 0 {
            self.0 = None;
        }
    }

    /// Pointer hover. Out-of-range indexes leave the cursor untouched.
    pub fn hover(&mut self, index: usize, len: usize) {
        if index < len {
            self.0 = Some(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn down_stops_at_last_item() {
        let mut c = SelectionCursor::default();
        c.move_down(2);
        assert_eq!(c.get(), Some(0));
        c.move_down(2);
        c.move_down(2);
        assert_eq!(c.get(), Some(1));
    }

    #[test]
    fn up_returns_to_unset() {
        let mut c = SelectionCursor::default();
        c.move_down(3);
        c.move_down(3);
        c.move_up(3);
        c.move_up(3);
        assert_eq!(c.position(), -1);
        c.move_up(3);
        assert_eq!(c.position(), -1);
    }

    #[test]
    fn hover_ignores_out_of_range() {
        let mut c = SelectionCursor::default();
        c.hover(5, 3);
        assert_eq!(c.get(), None);
        c.hover(2, 3);
        assert_eq!(c.get(), Some(2));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Down,
        Up,
        Hover(usize),
        Resize(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Down),
            Just(Op::Up),
            (0usize..20).prop_map(Op::Hover),
            (0usize..12).prop_map(Op::Resize),
        ]
    }

    proptest! {
        #[test]
        fn cursor_stays_within_list(start_len in 0usize..12, ops in prop::collection::vec(op(), 0..64)) {
            let mut len = start_len;
            let mut c = SelectionCursor::default();
            for op in ops {
                match op {
                    Op::Down => c.move_down(len),
                    Op::Up => c.move_up(len),
                    Op::Hover(i) => c.hover(i, len),
                    // A new list always starts unhighlighted.
                    Op::Resize(n) => {
                        len = n;
                        c.reset();
                    }
                }
                let pos = c.position();
                prop_assert!(pos >= -1);
                prop_assert!(pos < len as isize);
            }
        }
    }
}
