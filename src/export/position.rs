//! Stream position classification
//!
//! The pager classifies whole pages; formatters need to know the role of each
//! individual item in the overall output stream. [`remap`] bridges the two.

/// Role of a single item in the overall output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Opens the output structure; more items follow.
    First,
    /// Neither opens nor closes the output structure.
    Middle,
    /// Closes the output structure; at least one item preceded it.
    Last,
    /// The only item in the stream; opens and closes the structure.
    FirstAndLast,
}

impl Position {
    /// Whether this item opens the output (header row, opening bracket).
    pub fn opens(self) -> bool {
        matches!(self, Position::First | Position::FirstAndLast)
    }

    /// Whether this item closes the output (closing bracket).
    pub fn closes(self) -> bool {
        matches!(self, Position::Last | Position::FirstAndLast)
    }
}

/// Role of a fetched page in the page sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagePosition {
    First,
    Middle,
    Last,
    FirstAndLast,
}

impl PagePosition {
    /// Classify a page from whether it is the first fetch and whether it
    /// exhausts the remaining total.
    pub fn classify(is_first: bool, is_last: bool) -> Self {
        match (is_first, is_last) {
            (true, true) => PagePosition::FirstAndLast,
            (true, false) => PagePosition::First,
            (false, true) => PagePosition::Last,
            (false, false) => PagePosition::Middle,
        }
    }

    /// A terminal page ends the export; the pager must not be polled again.
    pub fn is_terminal(self) -> bool {
        matches!(self, PagePosition::Last | PagePosition::FirstAndLast)
    }
}

/// Position of the item at `index` within a page of `len` items.
///
/// Only the first item of the first page opens the stream, and only the
/// final item of the terminal page closes it.
pub fn remap(page: PagePosition, index: usize, len: usize) -> Position {
    let opens = page == PagePosition::First || page == PagePosition::FirstAndLast;
    let closes = page.is_terminal();
    let is_head = index == 0;
    let is_tail = index + 1 == len;

    match (opens && is_head, closes && is_tail) {
        (true, true) => Position::FirstAndLast,
        (true, false) => Position::First,
        (false, true) => Position::Last,
        (false, false) => Position::Middle,
    }
}

/// Item positions for a whole page, in order.
pub fn remap_page(page: PagePosition, len: usize) -> impl Iterator<Item = Position> {
    (0..len).map(move |index| remap(page, index, len))
}
