//! Row windowing for large trade tables.
//!
//! Units are abstract: pixels for a graphical table, terminal lines for the
//! TUI (row height 1). Below the threshold the window is the whole set.

use std::ops::Range;

/// Geometry and activation threshold of a windowed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub row_height: usize,
    pub viewport_height: usize,
    /// Extra rows rendered above and below the visible ones.
    pub buffer: usize,
    /// Row counts at or below this render in full.
    pub threshold: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            row_height: 36,
            viewport_height: 600,
            buffer: 10,
            threshold: 200,
        }
    }
}

impl WindowConfig {
    fn row_height(&self) -> usize {
        self.row_height.max(1)
    }

    /// Rows that fit in the viewport, rounding a partial row up.
    pub fn visible_rows(&self) -> usize {
        self.viewport_height.div_ceil(self.row_height())
    }
}

/// Half-open row range plus the spacer extents that stand in for the rows
/// outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
    pub top_spacer: usize,
    pub bottom_spacer: usize,
}

impl RowWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Window of rows to materialize for `total` rows at `scroll_offset`.
pub fn compute_window(total: usize, config: &WindowConfig, scroll_offset: usize) -> RowWindow {
    if total <= config.threshold {
        return RowWindow {
            start: 0,
            end: total,
            top_spacer: 0,
            bottom_spacer: 0,
        };
    }

    let row_height = config.row_height();
    let first = scroll_offset / row_height;
    let end = first
        .saturating_add(config.visible_rows())
        .saturating_add(config.buffer)
        .min(total);
    let start = first.saturating_sub(config.buffer).min(end);

    RowWindow {
        start,
        end,
        top_spacer: start * row_height,
        bottom_spacer: (total - end) * row_height,
    }
}

/// Scroll state of a windowed table.
///
/// Must be [`reset`](Self::reset) whenever the underlying row set changes;
/// a window into a previous set can point past the end of the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualRows {
    config: WindowConfig,
    total: usize,
    scroll_offset: usize,
    window: RowWindow,
}

impl Default for VirtualRows {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl VirtualRows {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            total: 0,
            scroll_offset: 0,
            window: RowWindow::default(),
        }
    }

    /// Point at a new row set and scroll to the top.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.scroll_offset = 0;
        self.recompute();
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn window(&self) -> RowWindow {
        self.window
    }

    pub fn set_viewport(&mut self, viewport_height: usize) {
        if self.config.viewport_height != viewport_height {
            self.config.viewport_height = viewport_height;
            self.scroll_to(self.scroll_offset);
        }
    }

    /// Largest offset that still fills the viewport.
    pub fn max_offset(&self) -> usize {
        (self.total * self.config.row_height()).saturating_sub(self.config.viewport_height)
    }

    pub fn scroll_to(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_offset());
        self.recompute();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let offset = if delta < 0 {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as usize)
        };
        self.scroll_to(offset);
    }

    /// Scroll the minimum distance that brings `row` fully into view.
    pub fn scroll_to_row(&mut self, row: usize) {
        let row_height = self.config.row_height();
        let top = row.min(self.total.saturating_sub(1)) * row_height;
        let bottom = top + row_height;
        if top < self.scroll_offset {
            self.scroll_to(top);
        } else if bottom > self.scroll_offset + self.config.viewport_height {
            self.scroll_to(bottom.saturating_sub(self.config.viewport_height));
        }
    }

    /// Rows actually inside the viewport, without the buffer.
    pub fn visible_range(&self) -> Range<usize> {
        let first = (self.scroll_offset / self.config.row_height()).min(self.total);
        let end = first.saturating_add(self.config.visible_rows()).min(self.total);
        first..end
    }

    fn recompute(&mut self) {
        self.window = compute_window(self.total, &self.config, self.scroll_offset);
    }
}
