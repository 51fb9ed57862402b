//! 2-D projection of the encoded population.
//!
//! Projects every encoded record onto the first two principal components
//! of the population, giving the presentation layer a plottable map where
//! nearby points are similar experiences. Power iteration with a fixed
//! start vector and deflation; no randomness, so repeated projections of
//! the same snapshot are identical.

use serde::Serialize;

use reflectx_core::RecordId;

use crate::snapshot::Snapshot;

const POWER_ITERATIONS: usize = 128;
const NORM_EPS: f64 = 1e-12;

/// One record's position on the 2-D map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub id: RecordId,
    pub x: f64,
    pub y: f64,
}

impl Snapshot {
    /// Project the population onto its first two principal components.
    ///
    /// Degenerate populations (fewer than two records, or zero variance)
    /// collapse onto the origin instead of erroring.
    #[must_use]
    pub fn project_2d(&self) -> Vec<ProjectedPoint> {
        let dim = self.schema().len();
        let mut rows: Vec<Vec<f64>> = self
            .entries
            .iter()
            .map(|entry| entry.vector.components().to_vec())
            .collect();

        center_columns(&mut rows, dim);

        let xs = match principal_component(&rows, dim) {
            Some(axis) => {
                let xs: Vec<f64> = rows.iter().map(|row| dot(row, &axis)).collect();
                deflate(&mut rows, &axis);
                xs
            }
            None => vec![0.0; rows.len()],
        };
        let ys = match principal_component(&rows, dim) {
            Some(axis) => rows.iter().map(|row| dot(row, &axis)).collect(),
            None => vec![0.0; rows.len()],
        };

        self.entries
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(entry, (x, y))| ProjectedPoint {
                id: entry.id.clone(),
                x,
                y,
            })
            .collect()
    }
}

fn center_columns(rows: &mut [Vec<f64>], dim: usize) {
    if rows.is_empty() {
        return;
    }
    let count = rows.len() as f64;
    let mut means = vec![0.0; dim];
    for row in rows.iter() {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }
    for mean in &mut means {
        *mean /= count;
    }
    for row in rows.iter_mut() {
        for (value, mean) in row.iter_mut().zip(&means) {
            *value -= mean;
        }
    }
}

/// Dominant eigenvector of the (implicit) covariance matrix, or `None`
/// when the data carries no variance in any remaining direction.
fn principal_component(rows: &[Vec<f64>], dim: usize) -> Option<Vec<f64>> {
    if rows.len() < 2 || dim == 0 {
        return None;
    }
    // Fixed start vector keeps the projection reproducible.
    let mut axis = vec![1.0 / (dim as f64).sqrt(); dim];
    for _ in 0..POWER_ITERATIONS {
        let mut next = vec![0.0; dim];
        for row in rows {
            let along = dot(row, &axis);
            for (component, value) in next.iter_mut().zip(row) {
                *component += along * value;
            }
        }
        let norm = dot(&next, &next).sqrt();
        if norm < NORM_EPS {
            return None;
        }
        let mut shift = 0.0;
        for (component, value) in axis.iter_mut().zip(&next) {
            let updated = value / norm;
            shift += (updated - *component).abs();
            *component = updated;
        }
        if shift < NORM_EPS {
            break;
        }
    }
    Some(axis)
}

/// Remove the variance along `axis` from every row.
fn deflate(rows: &mut [Vec<f64>], axis: &[f64]) {
    for row in rows.iter_mut() {
        let along = dot(row, axis);
        for (value, component) in row.iter_mut().zip(axis) {
            *value -= along * component;
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
