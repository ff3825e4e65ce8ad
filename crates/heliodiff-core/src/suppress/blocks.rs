use crate::consts::{BLOCK_EDGE_INSET, BLOCK_INTERIOR_MARGIN};

/// Half-open pixel span along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, i: usize) -> bool {
        i >= self.start && i < self.end
    }
}

/// One tile of the suppression grid: the span of pixels whose star
/// candidates get replaced, and the wider window the background surface is
/// fitted over.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub replace_rows: Span,
    pub replace_cols: Span,
    pub fit_rows: Span,
    pub fit_cols: Span,
}

/// Partition of an image into non-overlapping `res`-sided square blocks.
///
/// The final block along each axis absorbs the remainder. Fitting windows
/// extend `BLOCK_INTERIOR_MARGIN` pixels past the block on sides interior
/// to the image and pull in by `BLOCK_EDGE_INSET` pixels at the true image
/// boundary, so a window never needs data from outside the image.
#[derive(Clone, Debug)]
pub struct BlockGrid {
    height: usize,
    width: usize,
    res: usize,
}

impl BlockGrid {
    pub fn new(height: usize, width: usize, res: usize) -> Self {
        debug_assert!(res > 0 && res <= height && res <= width);
        Self { height, width, res }
    }

    fn blocks_along(&self, dim: usize) -> usize {
        // Remainder pixels fold into the last block rather than forming a
        // short extra one.
        (dim / self.res).max(1)
    }

    pub fn n_rows(&self) -> usize {
        self.blocks_along(self.height)
    }

    pub fn n_cols(&self) -> usize {
        self.blocks_along(self.width)
    }

    fn replace_span(&self, index: usize, count: usize, dim: usize) -> Span {
        let start = index * self.res;
        let end = if index + 1 == count {
            dim
        } else {
            (index + 1) * self.res
        };
        Span { start, end }
    }

    fn fit_span(&self, replace: Span, dim: usize) -> Span {
        let start = if replace.start == 0 {
            BLOCK_EDGE_INSET.min(replace.end.saturating_sub(1))
        } else {
            replace.start.saturating_sub(BLOCK_INTERIOR_MARGIN)
        };
        let end = if replace.end == dim {
            (dim - BLOCK_EDGE_INSET).max(start + 1)
        } else {
            (replace.end + BLOCK_INTERIOR_MARGIN).min(dim)
        };
        Span { start, end }
    }

    pub fn block(&self, row: usize, col: usize) -> Block {
        let replace_rows = self.replace_span(row, self.n_rows(), self.height);
        let replace_cols = self.replace_span(col, self.n_cols(), self.width);
        Block {
            replace_rows,
            replace_cols,
            fit_rows: self.fit_span(replace_rows, self.height),
            fit_cols: self.fit_span(replace_cols, self.width),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.n_rows())
            .flat_map(move |r| (0..self.n_cols()).map(move |c| self.block(r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_covers_whole_image() {
        let grid = BlockGrid::new(64, 64, 64);
        assert_eq!(grid.n_rows(), 1);
        assert_eq!(grid.n_cols(), 1);
        let b = grid.block(0, 0);
        assert_eq!(b.replace_rows, Span { start: 0, end: 64 });
        // Edge inset on both sides: window trimmed to [5, 59)
        assert_eq!(b.fit_rows, Span { start: 5, end: 59 });
    }

    #[test]
    fn remainder_folds_into_last_block() {
        let grid = BlockGrid::new(100, 70, 32);
        assert_eq!(grid.n_rows(), 3);
        assert_eq!(grid.n_cols(), 2);
        let last = grid.block(2, 1);
        assert_eq!(last.replace_rows, Span { start: 64, end: 100 });
        assert_eq!(last.replace_cols, Span { start: 32, end: 70 });
        // Interior start grows by the margin, boundary end pulls in.
        assert_eq!(last.fit_rows, Span { start: 54, end: 95 });
    }

    #[test]
    fn interior_block_padded_both_sides() {
        let grid = BlockGrid::new(96, 96, 32);
        let mid = grid.block(1, 1);
        assert_eq!(mid.fit_rows, Span { start: 22, end: 74 });
        assert_eq!(mid.fit_cols, Span { start: 22, end: 74 });
    }
}
