//! Full-covariance Gaussian mixture fitting for speaker clustering.
//!
//! Expectation-Maximization with a fixed iteration cap and deterministic
//! initialization: identical inputs always reproduce identical labels.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Full-covariance Gaussian mixture model fitted with EM.
#[derive(Debug, Clone)]
pub struct GaussianMixture {
    components: usize,
    max_iterations: usize,
    tolerance: f64,
    covariance_floor: f64,
}

impl GaussianMixture {
    /// Create a mixture with `components` speakers and default EM settings.
    pub fn new(components: usize) -> Self {
        Self {
            components,
            max_iterations: defaults::EM_MAX_ITERATIONS,
            tolerance: defaults::EM_TOLERANCE,
            covariance_floor: defaults::COVARIANCE_FLOOR,
        }
    }

    /// Override the EM iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Fit the mixture to `features` (rows = frames) and return the
    /// most-probable component index per frame.
    ///
    /// # Errors
    /// `MeetscribeError::Clustering` when the requested component count
    /// exceeds the frame count, or a covariance stays singular after
    /// regularization.
    pub fn fit_predict(&self, features: &Array2<f32>) -> Result<Vec<usize>> {
        let n = features.nrows();
        let d = features.ncols();
        let k = self.components;

        if k == 0 {
            return Err(MeetscribeError::Clustering {
                message: "at least one component is required".to_string(),
            });
        }
        if k > n {
            return Err(MeetscribeError::Clustering {
                message: format!("{} frames but {} speakers requested", n, k),
            });
        }

        let data = features.mapv(|v| v as f64);

        // Deterministic initialization: means from evenly spaced frames,
        // pooled covariance, uniform weights.
        let mut means = Array2::<f64>::zeros((k, d));
        for j in 0..k {
            let idx = if k == 1 { n / 2 } else { j * (n - 1) / (k - 1) };
            means.row_mut(j).assign(&data.row(idx));
        }
        let pooled = regularized_covariance(&data, self.covariance_floor);
        let mut covariances: Vec<Array2<f64>> = vec![pooled; k];
        let mut weights = Array1::<f64>::from_elem(k, 1.0 / k as f64);

        let mut log_resp = Array2::<f64>::zeros((n, k));
        let mut previous_ll = f64::NEG_INFINITY;

        for _ in 0..self.max_iterations {
            let log_likelihood =
                self.expectation(&data, &means, &covariances, &weights, &mut log_resp)?;

            // M-step
            let resp = log_resp.mapv(f64::exp);
            let component_mass = resp.sum_axis(Axis(0));
            for j in 0..k {
                let mass = component_mass[j];
                if mass < 1e-12 {
                    return Err(MeetscribeError::Clustering {
                        message: format!("component {} collapsed to zero weight", j),
                    });
                }

                let mut mean = Array1::<f64>::zeros(d);
                for i in 0..n {
                    mean.scaled_add(resp[[i, j]], &data.row(i));
                }
                mean /= mass;

                let mut cov = Array2::<f64>::zeros((d, d));
                for i in 0..n {
                    let centered = &data.row(i) - &mean;
                    let r = resp[[i, j]];
                    for a in 0..d {
                        for b in 0..d {
                            cov[[a, b]] += r * centered[a] * centered[b];
                        }
                    }
                }
                cov /= mass;
                for a in 0..d {
                    cov[[a, a]] += self.covariance_floor;
                }

                means.row_mut(j).assign(&mean);
                covariances[j] = cov;
                weights[j] = mass / n as f64;
            }

            if (log_likelihood - previous_ll).abs() < self.tolerance * n as f64 {
                previous_ll = log_likelihood;
                break;
            }
            previous_ll = log_likelihood;
        }

        // Final E-step so labels reflect the last parameter update
        self.expectation(&data, &means, &covariances, &weights, &mut log_resp)?;

        let labels = log_resp
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(j, _)| j)
                    .unwrap_or(0)
            })
            .collect();

        Ok(labels)
    }

    /// E-step: fill `log_resp` with log responsibilities and return the
    /// total log-likelihood.
    fn expectation(
        &self,
        data: &Array2<f64>,
        means: &Array2<f64>,
        covariances: &[Array2<f64>],
        weights: &Array1<f64>,
        log_resp: &mut Array2<f64>,
    ) -> Result<f64> {
        let n = data.nrows();
        let k = means.nrows();

        let gaussians: Vec<MultivariateNormal> = (0..k)
            .map(|j| MultivariateNormal::new(means.row(j), &covariances[j]))
            .collect::<Result<_>>()?;

        let mut log_likelihood = 0.0;
        for i in 0..n {
            let x = data.row(i);
            for j in 0..k {
                log_resp[[i, j]] = weights[j].ln() + gaussians[j].log_pdf(x);
            }

            let row_max = log_resp
                .row(i)
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let log_norm =
                row_max + log_resp.row(i).mapv(|v| (v - row_max).exp()).sum().ln();
            log_likelihood += log_norm;
            log_resp.row_mut(i).mapv_inplace(|v| v - log_norm);
        }

        Ok(log_likelihood)
    }
}

/// A Gaussian density prefactored for repeated log-pdf evaluation.
struct MultivariateNormal {
    mean: Array1<f64>,
    cholesky: Array2<f64>,
    log_norm_constant: f64,
}

impl MultivariateNormal {
    fn new(mean: ArrayView1<'_, f64>, covariance: &Array2<f64>) -> Result<Self> {
        let d = mean.len();
        let cholesky = cholesky_lower(covariance).ok_or_else(|| MeetscribeError::Clustering {
            message: "covariance matrix is singular after regularization".to_string(),
        })?;

        let log_det: f64 = (0..d).map(|i| cholesky[[i, i]].ln()).sum::<f64>() * 2.0;
        let log_norm_constant =
            -0.5 * (d as f64 * (2.0 * std::f64::consts::PI).ln() + log_det);

        Ok(Self {
            mean: mean.to_owned(),
            cholesky,
            log_norm_constant,
        })
    }

    fn log_pdf(&self, x: ArrayView1<'_, f64>) -> f64 {
        let centered = &x - &self.mean;
        let y = forward_substitute(&self.cholesky, &centered);
        let mahalanobis: f64 = y.iter().map(|v| v * v).sum();
        self.log_norm_constant - 0.5 * mahalanobis
    }
}

/// Lower-triangular Cholesky factor, or `None` if the matrix is not
/// positive-definite.
fn cholesky_lower(a: &Array2<f64>) -> Option<Array2<f64>> {
    let d = a.nrows();
    let mut l = Array2::<f64>::zeros((d, d));

    for i in 0..d {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for p in 0..j {
                sum -= l[[i, p]] * l[[j, p]];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve `L y = b` for lower-triangular `L`.
fn forward_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let d = b.len();
    let mut y = Array1::<f64>::zeros(d);
    for i in 0..d {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[[i, j]] * y[j];
        }
        y[i] = sum / l[[i, i]];
    }
    y
}

/// Sample covariance of `data` rows (ML normalization) with a diagonal floor.
pub(crate) fn regularized_covariance(data: &Array2<f64>, floor: f64) -> Array2<f64> {
    let n = data.nrows();
    let d = data.ncols();
    let mean = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));

    let mut cov = Array2::<f64>::zeros((d, d));
    for i in 0..n {
        let centered = &data.row(i) - &mean;
        for a in 0..d {
            for b in 0..d {
                cov[[a, b]] += centered[a] * centered[b];
            }
        }
    }
    if n > 0 {
        cov /= n as f64;
    }
    for a in 0..d {
        cov[[a, a]] += floor;
    }
    cov
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Two tight, well-separated 2D blobs laid out deterministically.
    fn two_blobs(per_cluster: usize) -> Array2<f32> {
        let mut data = Array2::<f32>::zeros((per_cluster * 2, 2));
        for i in 0..per_cluster {
            // jitter from a fixed pattern, no RNG
            let dx = (i % 5) as f32 * 0.1;
            let dy = (i % 3) as f32 * 0.1;
            data[[i, 0]] = dx;
            data[[i, 1]] = dy;
            data[[per_cluster + i, 0]] = 10.0 + dx;
            data[[per_cluster + i, 1]] = 10.0 + dy;
        }
        data
    }

    #[test]
    fn cholesky_of_identity_is_identity() {
        let eye = array![[1.0, 0.0], [0.0, 1.0]];
        let l = cholesky_lower(&eye).unwrap();
        assert_eq!(l, eye);
    }

    #[test]
    fn cholesky_rejects_non_positive_definite() {
        let bad = array![[0.0, 0.0], [0.0, 0.0]];
        assert!(cholesky_lower(&bad).is_none());
    }

    #[test]
    fn forward_substitution_solves_lower_system() {
        let l = array![[2.0, 0.0], [1.0, 3.0]];
        let b = Array1::from(vec![4.0, 11.0]);
        let y = forward_substitute(&l, &b);
        assert!((y[0] - 2.0).abs() < 1e-12);
        assert!((y[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn fit_separates_two_clusters() {
        let data = two_blobs(20);
        let labels = GaussianMixture::new(2).fit_predict(&data).unwrap();

        assert_eq!(labels.len(), 40);
        // Within-cluster labels agree, across-cluster labels differ
        assert!(labels[..20].iter().all(|&l| l == labels[0]));
        assert!(labels[20..].iter().all(|&l| l == labels[20]));
        assert_ne!(labels[0], labels[20]);
        assert!(labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn fit_single_component_labels_everything_zero() {
        let data = two_blobs(5);
        let labels = GaussianMixture::new(1).fit_predict(&data).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn fit_is_deterministic_across_runs() {
        let data = two_blobs(15);
        let first = GaussianMixture::new(2).fit_predict(&data).unwrap();
        let second = GaussianMixture::new(2).fit_predict(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn capped_iterations_still_separate_clean_clusters() {
        // The blobs are far enough apart that a single EM pass suffices.
        let data = two_blobs(20);
        let labels = GaussianMixture::new(2)
            .with_max_iterations(1)
            .fit_predict(&data)
            .unwrap();
        assert!(labels[..20].iter().all(|&l| l == labels[0]));
        assert!(labels[20..].iter().all(|&l| l == labels[20]));
        assert_ne!(labels[0], labels[20]);
    }

    #[test]
    fn fit_rejects_more_components_than_frames() {
        let data = two_blobs(1); // 2 frames total
        let result = GaussianMixture::new(4).fit_predict(&data);
        match result {
            Err(MeetscribeError::Clustering { message }) => {
                assert!(message.contains("4 speakers"));
            }
            other => panic!("Expected Clustering error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn fit_rejects_zero_components() {
        let data = two_blobs(3);
        assert!(GaussianMixture::new(0).fit_predict(&data).is_err());
    }

    #[test]
    fn regularized_covariance_has_floored_diagonal() {
        // Constant data: covariance is all zeros before the floor
        let data = Array2::<f64>::ones((10, 3));
        let cov = regularized_covariance(&data, 1e-6);
        for i in 0..3 {
            assert!(cov[[i, i]] >= 1e-6);
        }
        assert!(cov[[0, 1]].abs() < 1e-12);
    }
}
