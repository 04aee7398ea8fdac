//! Bayesian Information Criterion delta between two feature blocks.
//!
//! Optional refinement hook for deciding whether two adjacent diarization
//! segments describe the same speaker. The default pipeline does not call
//! this; it is exposed for callers that post-process segment boundaries.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use ndarray::{Array2, concatenate, Axis};

/// BIC difference between modeling `first` and `second` (rows = frames) as
/// one Gaussian versus one Gaussian each.
///
/// Positive values indicate the joint model fits worse, i.e. evidence that
/// the two blocks come from different speakers and should stay split.
///
/// # Errors
/// `MeetscribeError::Clustering` when either block is empty or a covariance
/// cannot be factorized even after regularization.
pub fn bic_delta(first: &Array2<f32>, second: &Array2<f32>) -> Result<f64> {
    let n1 = first.nrows();
    let n2 = second.nrows();
    if n1 == 0 || n2 == 0 {
        return Err(MeetscribeError::Clustering {
            message: "BIC comparison requires non-empty segments".to_string(),
        });
    }
    if first.ncols() != second.ncols() {
        return Err(MeetscribeError::Clustering {
            message: format!(
                "feature dimensions differ: {} vs {}",
                first.ncols(),
                second.ncols()
            ),
        });
    }

    let d = first.ncols() as f64;
    let a = first.mapv(|v| v as f64);
    let b = second.mapv(|v| v as f64);
    let combined = concatenate(Axis(0), &[a.view(), b.view()]).map_err(|e| {
        MeetscribeError::Clustering {
            message: format!("failed to stack feature blocks: {}", e),
        }
    })?;

    let log_det_a = log_det_covariance(&a)?;
    let log_det_b = log_det_covariance(&b)?;
    let log_det_combined = log_det_covariance(&combined)?;

    let n1 = n1 as f64;
    let n2 = n2 as f64;
    let penalty = 0.5 * (d + 0.5 * d * (d + 1.0)) * (n1 + n2).ln();

    Ok((n1 + n2) * log_det_combined - n1 * log_det_a - n2 * log_det_b - penalty)
}

/// Log-determinant of the regularized covariance of `data` rows.
fn log_det_covariance(data: &Array2<f64>) -> Result<f64> {
    let cov = super::gmm::regularized_covariance(data, defaults::COVARIANCE_FLOOR);
    cholesky_log_det(&cov).ok_or_else(|| MeetscribeError::Clustering {
        message: "segment covariance is singular after regularization".to_string(),
    })
}

/// Log-determinant via Cholesky, `None` when not positive-definite.
fn cholesky_log_det(a: &Array2<f64>) -> Option<f64> {
    let d = a.nrows();
    let mut l = Array2::<f64>::zeros((d, d));
    let mut log_det = 0.0;

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
                log_det += l[[i, j]].ln();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    Some(2.0 * log_det)
}
