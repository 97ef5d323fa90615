/// Percolation on an n-by-n grid of sites
///
/// Sites are opened one at a time. Every site maps onto one element of a shared
/// [`UnionFind`], together with two virtual sites: one joined to every open
/// top-row site and one joined to every open bottom-row site. The grid
/// percolates once the two virtual sites share a set.
///
/// Because a single structure answers both "is this site full" and "does the
/// grid percolate", a site attached only to the bottom row reports full once
/// the grid percolates (backwash).
use std::fmt;
use std::mem;

use log::{debug, trace};

use crate::error::{PercolationError, Result};
use crate::union_find::{try_filled, UnionFind};

/// Union-find element of the virtual site above the top row
const TOP: usize = 0;

/// State of one grid site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Blocked,
    /// Open, not yet seen connected to the top
    Open,
    /// Open and connected to the top
    Full,
}

impl CellState {
    /// Numeric code used by the text dump: 0 blocked, 1 open, 2 full
    pub fn code(self) -> u8 {
        match self {
            CellState::Blocked => 0,
            CellState::Open => 1,
            CellState::Full => 2,
        }
    }

    /// Character used when drawing the grid in a terminal
    pub fn symbol(self) -> char {
        match self {
            CellState::Blocked => '#',
            CellState::Open => '.',
            CellState::Full => '~',
        }
    }

    pub fn is_open(self) -> bool {
        self != CellState::Blocked
    }
}

/// Row-major index of a 1-indexed site on a `side`-by-`side` grid
fn site_index(side: usize, row: usize, col: usize) -> Result<usize> {
    if row < 1 || row > side || col < 1 || col > side {
        return Err(PercolationError::OutOfBounds { row, col, side });
    }
    Ok((row - 1) * side + (col - 1))
}

fn write_grid(f: &mut fmt::Formatter<'_>, side: usize, cells: &[CellState]) -> fmt::Result {
    for row in cells.chunks(side) {
        for cell in row {
            write!(f, "{},", cell.code())?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// The percolation model
#[derive(Debug, Clone)]
pub struct Percolation {
    side: usize,
    /// Row-major site states
    cells: Vec<CellState>,
    open_count: usize,
    uf: UnionFind,
    /// Open sites (grid indices) not yet marked full
    pending_full: Vec<usize>,
}

impl Percolation {
    /// Create an `n`-by-`n` grid with every site blocked
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(PercolationError::InvalidSize(n));
        }
        // The union-find needs `sites + 2` words of parents and of sizes
        let sites = n
            .checked_mul(n)
            .filter(|sites| {
                sites
                    .checked_add(2)
                    .and_then(|elements| elements.checked_mul(2 * mem::size_of::<usize>()))
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(PercolationError::InvalidSize(n))?;

        let cells = try_filled(sites, CellState::Blocked, n)?;
        let uf = UnionFind::new(sites + 2).map_err(|_| PercolationError::InvalidSize(n))?;

        Ok(Percolation {
            side: n,
            cells,
            open_count: 0,
            uf,
            pending_full: Vec::new(),
        })
    }

    /// Grid dimension
    pub fn side(&self) -> usize {
        self.side
    }

    fn bottom(&self) -> usize {
        self.side * self.side + 1
    }

    /// Grid index of a 1-indexed site, or `OutOfBounds`
    fn site(&self, row: usize, col: usize) -> Result<usize> {
        site_index(self.side, row, col)
    }

    /// Union-find element of a grid index; element 0 is the top virtual site
    fn element(site: usize) -> usize {
        site + 1
    }

    /// Grid indices of the sites above, below, left and right of `(row, col)`
    fn neighbours(&self, row: usize, col: usize) -> [Option<usize>; 4] {
        let n = self.side;
        let site = (row - 1) * n + (col - 1);
        [
            (row > 1).then(|| site - n),
            (row < n).then(|| site + n),
            (col > 1).then(|| site - 1),
            (col < n).then(|| site + 1),
        ]
    }

    /// Open the site at `(row, col)`, 1-indexed.
    ///
    /// Opening an already open site runs the unions again, which changes
    /// nothing, and does not count it twice.
    pub fn open(&mut self, row: usize, col: usize) -> Result<()> {
        let site = self.site(row, col)?;
        let element = Self::element(site);
        let was_percolating = self.percolates();

        if self.cells[site] == CellState::Blocked {
            self.open_count += 1;
            self.cells[site] = CellState::Open;
            self.pending_full.push(site);
            trace!("Opened site ({row}, {col}), {} open", self.open_count);
        }

        if row == 1 {
            self.uf.union(element, TOP)?;
            self.cells[site] = CellState::Full;
        }
        // Not an else-branch: on a 1x1 grid the only site touches both sides
        if row == self.side {
            let bottom = self.bottom();
            self.uf.union(element, bottom)?;
        }

        for neighbour in self.neighbours(row, col).into_iter().flatten() {
            if self.cells[neighbour].is_open() {
                self.uf.union(element, Self::element(neighbour))?;
            }
        }

        self.refresh_full_sites();

        if !was_percolating && self.percolates() {
            debug!(
                "{n}x{n} grid percolates after {} open sites",
                self.open_count,
                n = self.side
            );
        }
        Ok(())
    }

    /// Mark every pending open site that is now connected to the top as full.
    ///
    /// Returns how many sites were promoted. `open` already calls this, so a
    /// second call right after it promotes nothing.
    pub fn refresh_full_sites(&mut self) -> usize {
        let uf = &self.uf;
        let cells = &mut self.cells;
        let top = uf.root(TOP);
        let before = self.pending_full.len();

        self.pending_full.retain(|&site| {
            if uf.root(Self::element(site)) == top {
                cells[site] = CellState::Full;
                false
            } else {
                true
            }
        });
        before - self.pending_full.len()
    }

    /// Is the site at `(row, col)` open?
    pub fn is_open(&self, row: usize, col: usize) -> Result<bool> {
        let site = self.site(row, col)?;
        Ok(self.cells[site].is_open())
    }

    /// Is the site at `(row, col)` connected to the top?
    ///
    /// Answered from the union-find structure on every call, not from the cached
    /// site state, so it is never stale.
    pub fn is_full(&self, row: usize, col: usize) -> Result<bool> {
        let site = self.site(row, col)?;
        self.uf.connected(Self::element(site), TOP)
    }

    pub fn number_of_open_sites(&self) -> usize {
        self.open_count
    }

    /// Does an open path join the top row to the bottom row?
    pub fn percolates(&self) -> bool {
        self.uf.root(TOP) == self.uf.root(self.bottom())
    }

    /// Copy of the current site states
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            side: self.side,
            cells: self.cells.clone(),
        }
    }
}

impl fmt::Display for Percolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, self.side, &self.cells)
    }
}

/// Read-only copy of a grid's site states, for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    side: usize,
    cells: Vec<CellState>,
}

impl Snapshot {
    pub fn side(&self) -> usize {
        self.side
    }

    /// State of the site at `(row, col)`, 1-indexed
    pub fn get(&self, row: usize, col: usize) -> Result<CellState> {
        Ok(self.cells[site_index(self.side, row, col)?])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> std::slice::Chunks<'_, CellState> {
        self.cells.chunks(self.side)
    }

    /// Number of sites in `state`
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&cell| cell == state).count()
    }

    /// Draw the grid with one symbol per site and a newline per row
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.side);
        for row in self.rows() {
            out.extend(row.iter().map(|cell| cell.symbol()));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, self.side, &self.cells)
    }
}
