//! Unsupervised speaker diarization.
//!
//! Feature extraction → Gaussian mixture clustering → hop-granular speaker
//! segments. Labels are run-local: nothing ties "Speaker_0" in one file to
//! "Speaker_0" in another.

pub mod bic;
pub mod features;
pub mod gmm;
pub mod segments;

pub use bic::bic_delta;
pub use features::{FeatureConfig, extract_features};
pub use gmm::GaussianMixture;
pub use segments::{DiarizationSegment, build_segments, speaker_at};

use crate::audio::wav::pcm_to_f32;
use crate::error::Result;

/// Run the full diarization chain on mono 16 kHz PCM.
pub fn diarize(samples: &[i16], speakers: usize, config: &FeatureConfig) -> Result<Vec<DiarizationSegment>> {
    let audio = pcm_to_f32(samples);
    let features = extract_features(&audio, config);

    if features.nrows() == 0 {
        return Ok(Vec::new());
    }

    let labels = GaussianMixture::new(speakers).fit_predict(&features)?;
    Ok(build_segments(&labels, config.hop_sec))
}
