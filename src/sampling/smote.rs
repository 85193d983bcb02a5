//! SMOTE: synthetic minority oversampling
//!
//! Each synthetic row is drawn on the segment between a minority sample and
//! one of its `k` nearest minority neighbours. Only ever applied to training
//! data.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::data::Dataset;
use crate::error::{PipelineError, PipelineResult};

/// Synthetic minority oversampler
#[derive(Debug, Clone)]
pub struct Smote {
    k_neighbors: usize,
    seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self {
            k_neighbors: k_neighbors.max(1),
            seed,
        }
    }

    /// Return the input rows followed by enough synthetic minority rows to
    /// balance both classes.
    pub fn fit_resample(&self, dataset: &Dataset) -> PipelineResult<Dataset> {
        let counts = dataset.class_counts();
        if counts.legitimate == counts.fraud {
            return Ok(dataset.clone());
        }

        let minority_is_fraud = counts.fraud < counts.legitimate;
        let minority_label = if minority_is_fraud { 1.0 } else { 0.0 };
        let minority_idx: Vec<usize> = (0..dataset.len())
            .filter(|&i| (dataset.labels[i] >= 0.5) == minority_is_fraud)
            .collect();

        if minority_idx.len() < 2 {
            return Err(PipelineError::InsufficientMinority(minority_idx.len()));
        }

        let minority = dataset.features.select(Axis(0), &minority_idx);
        let k = self.k_neighbors.min(minority_idx.len() - 1);
        let neighbors = nearest_neighbors(&minority, k);

        let n_synthetic = counts.legitimate.max(counts.fraud) - minority_idx.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut synthetic = Array2::zeros((n_synthetic, dataset.n_features()));

        for mut row in synthetic.rows_mut() {
            let pick = rng.gen_range(0..minority_idx.len() * k);
            let base = pick / k;
            let neighbor = neighbors[base][pick % k];
            let gap: f64 = rng.gen();

            let x = minority.row(base);
            let diff = &minority.row(neighbor) - &x;
            row.assign(&(&x + &(diff * gap)));
        }

        info!(
            minority = minority_idx.len(),
            synthetic = n_synthetic,
            k_neighbors = k,
            "Generated synthetic minority samples"
        );

        let synthetic = Dataset::new(synthetic, Array1::from_elem(n_synthetic, minority_label))?;
        dataset.concat(&synthetic)
    }
}

/// Indices of the `k` nearest rows (Euclidean, excluding self) for each row.
fn nearest_neighbors(points: &Array2<f64>, k: usize) -> Vec<Vec<usize>> {
    let n = points.nrows();
    (0..n)
        .map(|i| {
            let xi = points.row(i);
            let mut dists: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, squared_distance(xi, points.row(j))))
                .collect();
            dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            dists.into_iter().take(k).map(|(j, _)| j).collect()
        })
        .collect()
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
