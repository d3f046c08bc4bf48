use crate::domain::types::LocationId;
use crate::error::{DispatchError, DispatchResult};

/// Symmetric mileage grid; index 0 is the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    cells: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build from a square table. Half-filled tables are mirrored and the diagonal is zeroed.
    pub fn from_rows(mut rows: Vec<Vec<f64>>) -> DispatchResult<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(DispatchError::MalformedMatrix(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                n
            )));
        }
        if let Some(bad) = rows.iter().flatten().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(DispatchError::MalformedMatrix(format!(
                "distance {} is not a non-negative number",
                bad
            )));
        }

        for i in 0..n {
            rows[i][i] = 0.0;
            for j in (i + 1)..n {
                let (a, b) = (rows[i][j], rows[j][i]);
                if a == 0.0 && b != 0.0 {
                    rows[i][j] = b;
                } else if b == 0.0 && a != 0.0 {
                    rows[j][i] = a;
                }
            }
        }

        Ok(Self { cells: rows })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mileage between two locations. Unknown cells count as zero.
    pub fn distance(&self, from: LocationId, to: LocationId) -> f64 {
        self.cells
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Off-diagonal pairs with no distance in either direction.
    pub fn missing_cells(&self) -> Vec<(LocationId, LocationId)> {
        let n = self.len();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.cells[i][j] == 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_lower_triangle() {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0.0, 0.0, 0.0],
            vec![7.2, 0.0, 0.0],
            vec![3.8, 7.1, 0.0],
        ])
        .unwrap();

        assert_eq!(dm.distance(0, 1), 7.2);
        assert_eq!(dm.distance(1, 0), 7.2);
        assert_eq!(dm.distance(1, 2), 7.1);
        assert_eq!(dm.distance(2, 0), 3.8);
        assert!(dm.missing_cells().is_empty());
    }

    #[test]
    fn zeroes_diagonal_and_reports_missing_cells() {
        let dm = DistanceMatrix::from_rows(vec![
            vec![5.0, 1.0, 0.0],
            vec![1.0, 5.0, 2.0],
            vec![0.0, 2.0, 5.0],
        ])
        .unwrap();

        assert_eq!(dm.distance(1, 1), 0.0);
        assert_eq!(dm.missing_cells(), vec![(0, 2)]);
        assert_eq!(dm.distance(0, 2), 0.0);
    }

    #[test]
    fn out_of_range_lookups_are_zero() {
        let dm = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(dm.distance(0, 9), 0.0);
    }

    #[test]
    fn rejects_ragged_and_negative_tables() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]).is_err());
    }
}
