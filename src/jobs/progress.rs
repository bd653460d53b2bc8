//! Progress computation.
//!
//! Pure functions mapping pipeline stages to a 0-100 percentage. The
//! schedule is strictly increasing across the stage order; monotonicity of
//! the observable value is enforced where the registry writes it, so a late
//! or out-of-order hint can never lower what a caller sees.

use crate::jobs::JobStatus;

/// Progress shown right after translation finishes, before completion.
pub const TRANSLATED: u8 = 95;

/// Progress a job shows on entering a stage.
///
/// `Failed` has no floor of its own: progress freezes at its last value.
pub fn stage_floor(status: JobStatus) -> u8 {
    match status {
        JobStatus::Queued => 0,
        JobStatus::ExtractingAudio => 10,
        JobStatus::Transcribing => 30,
        JobStatus::PostProcessing => 80,
        JobStatus::Translating => 90,
        JobStatus::Completed => 100,
        JobStatus::Failed => 0,
    }
}

/// Floor of the stage after `status`, bounding in-stage interpolation.
fn next_floor(status: JobStatus) -> u8 {
    match status {
        JobStatus::Queued => stage_floor(JobStatus::ExtractingAudio),
        JobStatus::ExtractingAudio => stage_floor(JobStatus::Transcribing),
        JobStatus::Transcribing => stage_floor(JobStatus::PostProcessing),
        JobStatus::PostProcessing => stage_floor(JobStatus::Translating),
        JobStatus::Translating => TRANSLATED,
        JobStatus::Completed | JobStatus::Failed => 100,
    }
}

/// Interpolate within a stage from an engine-supplied fraction (0.0-1.0).
///
/// Best-effort: garbage fractions clamp to the stage's own band, so a bad
/// hint can never report a later stage's progress.
pub fn stage_progress(status: JobStatus, fraction: f64) -> u8 {
    let floor = stage_floor(status);
    let ceiling = next_floor(status);
    if ceiling <= floor {
        return floor;
    }
    let fraction = fraction.clamp(0.0, 1.0);
    let span = (ceiling - floor) as f64;
    floor + (span * fraction) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::*;

    #[test]
    fn test_schedule_is_strictly_increasing() {
        let order = [Queued, ExtractingAudio, Transcribing, PostProcessing, Translating, Completed];
        for pair in order.windows(2) {
            assert!(
                stage_floor(pair[0]) < stage_floor(pair[1]),
                "{} floor not below {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_known_floors() {
        assert_eq!(stage_floor(Queued), 0);
        assert_eq!(stage_floor(Transcribing), 30);
        assert_eq!(stage_floor(PostProcessing), 80);
        assert_eq!(stage_floor(Translating), 90);
        assert_eq!(stage_floor(Completed), 100);
    }

    #[test]
    fn test_transcription_band_interpolation() {
        assert_eq!(stage_progress(Transcribing, 0.0), 30);
        assert_eq!(stage_progress(Transcribing, 0.5), 55);
        assert_eq!(stage_progress(Transcribing, 1.0), 80);
    }

    #[test]
    fn test_interpolation_never_reaches_next_stage_floor_early() {
        // Even a full fraction stays at the band ceiling, not beyond
        assert_eq!(stage_progress(Transcribing, 5.0), 80);
        assert_eq!(stage_progress(ExtractingAudio, 2.0), 30);
    }

    #[test]
    fn test_garbage_fraction_clamps_to_band() {
        assert_eq!(stage_progress(Transcribing, -1.0), 30);
        assert_eq!(stage_progress(Transcribing, f64::NAN), 30);
    }

    #[test]
    fn test_translating_band_tops_out_below_completion() {
        assert_eq!(stage_progress(Translating, 1.0), TRANSLATED);
        assert!(TRANSLATED < stage_floor(Completed));
    }

    #[test]
    fn test_completed_is_always_full() {
        assert_eq!(stage_progress(Completed, 0.0), 100);
        assert_eq!(stage_progress(Completed, 1.0), 100);
    }
}
