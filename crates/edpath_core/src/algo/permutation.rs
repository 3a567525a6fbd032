/// Event emitted by [`Permutations::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A new element now occupies position `level`; positions `0..=level`
    /// form the current prefix.
    Placed(usize),
    /// Every position is filled; the full arrangement is a new ordering.
    Complete,
}

/// Lazy, resumable enumeration of every ordering of a slice.
///
/// Orderings are produced in place by exchanging elements: at each level the
/// element at that position is swapped with each later element in turn, and
/// the swap is undone before trying the next one. The caller observes every
/// placement, so it can [`cancel`](Self::cancel) a prefix and skip all
/// orderings that extend it. Once exhausted the items are back in their
/// original order.
#[derive(Clone, Debug)]
pub struct Permutations<T> {
    items: Vec<T>,
    /// `choices[level]` is the index swapped into position `level`.
    choices: Vec<usize>,
    descend: bool,
    done: bool,
}

impl<T> Permutations<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            choices: Vec::new(),
            descend: true,
            done: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of positions currently fixed.
    pub fn depth(&self) -> usize {
        self.choices.len()
    }

    pub fn prefix(&self) -> &[T] {
        &self.items[..self.choices.len()]
    }

    /// Current arrangement of all items.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Abandons the subtree under the most recent placement: the next
    /// [`step`](Self::step) moves on to the next sibling instead of
    /// descending.
    pub fn cancel(&mut self) {
        self.descend = false;
    }

    pub fn step(&mut self) -> Option<Step> {
        if self.done {
            return None;
        }

        if self.descend {
            let level = self.choices.len();
            if level < self.items.len() {
                self.choices.push(level);
                return Some(Step::Placed(level));
            }
            self.descend = false;
            return Some(Step::Complete);
        }

        while let Some(choice) = self.choices.pop() {
            let level = self.choices.len();
            self.items.swap(level, choice);

            let next = choice + 1;
            if next < self.items.len() {
                self.items.swap(level, next);
                self.choices.push(next);
                self.descend = true;
                return Some(Step::Placed(level));
            }
        }

        self.done = true;
        None
    }

    /// Advances to the next complete ordering, ignoring placements.
    pub fn next_ordering(&mut self) -> Option<&[T]> {
        loop {
            match self.step()? {
                Step::Complete => return Some(&self.items),
                Step::Placed(_) => {}
            }
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
