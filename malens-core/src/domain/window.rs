//! Window configuration: the set of SMA window lengths and the per-window
//! display table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("window set is empty")]
    Empty,

    #[error("window length must be >= 1")]
    ZeroWindow,
}

/// Ordered set of distinct SMA window lengths, `W1 < W2 < … < Wk`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct WindowSet {
    windows: Vec<usize>,
}

impl WindowSet {
    /// Sorts and deduplicates. Zero and an empty list are rejected.
    pub fn new(windows: impl IntoIterator<Item = usize>) -> Result<Self, WindowError> {
        let mut windows: Vec<usize> = windows.into_iter().collect();
        if windows.is_empty() {
            return Err(WindowError::Empty);
        }
        if windows.contains(&0) {
            return Err(WindowError::ZeroWindow);
        }
        windows.sort_unstable();
        windows.dedup();
        Ok(Self { windows })
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.windows
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.windows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn longest(&self) -> usize {
        self.windows[self.windows.len() - 1]
    }

    pub fn contains(&self, window: usize) -> bool {
        self.windows.binary_search(&window).is_ok()
    }
}

impl TryFrom<Vec<usize>> for WindowSet {
    type Error = WindowError;

    fn try_from(value: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowSet> for Vec<usize> {
    fn from(value: WindowSet) -> Self {
        value.windows
    }
}

/// Display record for one moving-average line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaLine {
    pub window: usize,
    pub color: String,
    pub label: String,
}

impl MaLine {
    pub fn new(window: usize, color: impl Into<String>) -> Self {
        Self {
            window,
            color: color.into(),
            label: format!("MA{window}"),
        }
    }
}

/// Ordered lookup table of `MaLine` records, one per window, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MaLine>", into = "Vec<MaLine>")]
pub struct MaLineTable {
    lines: Vec<MaLine>,
}

impl MaLineTable {
    /// Later records for the same window replace earlier ones.
    pub fn new(lines: Vec<MaLine>) -> Result<Self, WindowError> {
        if lines.is_empty() {
            return Err(WindowError::Empty);
        }
        let mut table: Vec<MaLine> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.window == 0 {
                return Err(WindowError::ZeroWindow);
            }
            match table.binary_search_by_key(&line.window, |l| l.window) {
                Ok(pos) => table[pos] = line,
                Err(pos) => table.insert(pos, line),
            }
        }
        Ok(Self { lines: table })
    }

    pub fn lines(&self) -> &[MaLine] {
        &self.lines
    }

    pub fn get(&self, window: usize) -> Option<&MaLine> {
        self.lines
            .binary_search_by_key(&window, |l| l.window)
            .ok()
            .map(|pos| &self.lines[pos])
    }

    /// Label for a window, falling back to `MA<window>` when unlisted.
    pub fn label(&self, window: usize) -> String {
        self.get(window)
            .map(|l| l.label.clone())
            .unwrap_or_else(|| format!("MA{window}"))
    }

    pub fn windows(&self) -> WindowSet {
        WindowSet {
            windows: self.lines.iter().map(|l| l.window).collect(),
        }
    }
}

impl Default for MaLineTable {
    fn default() -> Self {
        Self {
            lines: vec![
                MaLine::new(50, "#FF6B6B"),
                MaLine::new(200, "#4ECDC4"),
                MaLine::new(350, "#45B7D1"),
                MaLine::new(700, "#FFA07A"),
                MaLine::new(1000, "#98D8C8"),
                MaLine::new(1400, "#B794F4"),
            ],
        }
    }
}

impl TryFrom<Vec<MaLine>> for MaLineTable {
    type Error = WindowError;

    fn try_from(value: Vec<MaLine>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaLineTable> for Vec<MaLine> {
    fn from(value: MaLineTable) -> Self {
        value.lines
    }
}
