use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

const POWER_MAX_ITERS: usize = 10_000;
const POWER_TOL: f64 = 1e-13;
const NORM_EPSILON: f64 = 1e-12;

/// Per-feature standardization learned at fit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalerParams {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl ScalerParams {
    /// Population standard deviation; a constant feature keeps scale 1.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = check_matrix(rows, 1)?;
        let n = rows.len() as f64;
        let mut means = vec![0.0; dim];
        for row in rows {
            for (m, x) in means.iter_mut().zip(row) {
                *m += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut scales = vec![0.0; dim];
        for row in rows {
            for ((s, x), m) in scales.iter_mut().zip(row).zip(&means) {
                *s += (x - m).powi(2);
            }
        }
        for s in scales.iter_mut() {
            let sd = (*s / n).sqrt();
            *s = if sd < NORM_EPSILON { 1.0 } else { sd };
        }
        Ok(Self { means, scales })
    }

    pub fn dim(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// Linear projection onto the leading principal axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PcaParams {
    pub mean: Vec<f64>,
    /// `n_components` rows of unit length, each `dim` wide.
    pub components: Vec<Vec<f64>>,
    pub explained_variance: Vec<f64>,
    pub explained_variance_ratio: Vec<f64>,
}

impl PcaParams {
    pub fn fit(rows: &[Vec<f64>], n_components: usize, seed: u64) -> Result<Self> {
        let dim = check_matrix(rows, 2)?;
        let max_k = dim.min(rows.len());
        if n_components == 0 || n_components > max_k {
            return Err(ScoutError::Fit(format!(
                "n_components must be in 1..={max_k}, got {n_components}"
            )));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; dim];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut cov = vec![vec![0.0; dim]; dim];
        for row in rows {
            let centered: Vec<f64> = row.iter().zip(&mean).map(|(x, m)| x - m).collect();
            for i in 0..dim {
                for j in i..dim {
                    cov[i][j] += centered[i] * centered[j];
                }
            }
        }
        for i in 0..dim {
            for j in i..dim {
                cov[i][j] /= n - 1.0;
                cov[j][i] = cov[i][j];
            }
        }
        let total_variance: f64 = (0..dim).map(|i| cov[i][i]).sum();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut components: Vec<Vec<f64>> = Vec::with_capacity(n_components);
        let mut explained_variance = Vec::with_capacity(n_components);
        for _ in 0..n_components {
            let v = leading_eigenvector(&cov, &components, &mut rng);
            let lambda = dot(&v, &mat_vec(&cov, &v)).max(0.0);
            for i in 0..dim {
                for j in 0..dim {
                    cov[i][j] -= lambda * v[i] * v[j];
                }
            }
            explained_variance.push(lambda);
            components.push(v);
        }

        let explained_variance_ratio = explained_variance
            .iter()
            .map(|l| {
                if total_variance > 0.0 {
                    l / total_variance
                } else {
                    0.0
                }
            })
            .collect();

        Ok(Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let centered: Vec<f64> = z.iter().zip(&self.mean).map(|(x, m)| x - m).collect();
        self.components.iter().map(|c| dot(c, &centered)).collect()
    }
}

fn check_matrix(rows: &[Vec<f64>], min_rows: usize) -> Result<usize> {
    if rows.len() < min_rows {
        return Err(ScoutError::Fit(format!(
            "need at least {min_rows} rows, got {}",
            rows.len()
        )));
    }
    let dim = rows[0].len();
    if dim == 0 {
        return Err(ScoutError::Fit("rows have no features".to_string()));
    }
    if rows.iter().any(|r| r.len() != dim) {
        return Err(ScoutError::Fit("rows have inconsistent widths".to_string()));
    }
    Ok(dim)
}

fn leading_eigenvector(a: &[Vec<f64>], found: &[Vec<f64>], rng: &mut StdRng) -> Vec<f64> {
    let dim = a.len();
    let mut v: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
    orthogonalize(&mut v, found);
    normalize(&mut v);

    for _ in 0..POWER_MAX_ITERS {
        let mut w = mat_vec(a, &v);
        orthogonalize(&mut w, found);
        if norm(&w) < NORM_EPSILON {
            // Remaining spectrum is zero; any unit vector orthogonal to `found` will do.
            break;
        }
        normalize(&mut w);
        let converged = 1.0 - dot(&w, &v).abs() < POWER_TOL;
        v = w;
        if converged {
            break;
        }
    }
    fix_sign(&mut v);
    v
}

/// Largest-magnitude loading positive, so refits do not flip axes.
fn fix_sign(v: &mut [f64]) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.iter_mut().for_each(|x| *x = -*x);
    }
}

fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let p = dot(v, b);
        v.iter_mut().zip(b).for_each(|(x, bi)| *x -= p * bi);
    }
}

fn mat_vec(a: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    a.iter().map(|row| dot(row, v)).collect()
}

fn normalize(v: &mut [f64]) {
    let n = norm(v);
    if n > NORM_EPSILON {
        v.iter_mut().for_each(|x| *x /= n);
    }
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
