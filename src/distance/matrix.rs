//! Dense distance matrix.

use serde::Deserialize;

/// A dense n×n matrix stored in row-major order.
///
/// Used for both travel distance and travel time. Rows and columns are node
/// *positions* (see [`NodeIndex`](super::NodeIndex)), not node IDs.
///
/// # Examples
///
/// ```
/// use pdp_routing::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 3.0],
///     vec![2.0, 0.0, 4.0],
///     vec![3.0, 4.0, 0.0],
/// ])
/// .unwrap();
/// assert_eq!(dm.get(1, 2), 4.0);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>")]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a distance matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a distance matrix from a list of rows.
    ///
    /// Returns `None` if the rows do not form a square grid.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Self::from_data(size, rows.into_iter().flatten().collect())
    }

    /// Returns the distance from position `from` to position `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from position `from` to position `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the first off-diagonal `(row, col)` holding a negative or
    /// non-finite value.
    ///
    /// The diagonal is never read by the solver and is not checked.
    pub(crate) fn first_invalid(&self) -> Option<(usize, usize)> {
        (0..self.size)
            .flat_map(|i| (0..self.size).map(move |j| (i, j)))
            .find(|&(i, j)| {
                let v = self.get(i, j);
                i != j && !(v.is_finite() && v >= 0.0)
            })
    }
}

impl TryFrom<Vec<Vec<f64>>> for DistanceMatrix {
    type Error = &'static str;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows).ok_or("matrix rows do not form a square grid")
    }
}
