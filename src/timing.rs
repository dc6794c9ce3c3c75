use crate::error::{SlidecastError, SlidecastResult};

/// Per-slide display durations for one run.
///
/// The split is strictly uniform regardless of each slide's narration length;
/// this matches the documented behavior and keeps timing independent of
/// content weighting.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingPlan {
    per_slide: Vec<f64>,
}

impl TimingPlan {
    pub fn uniform(slide_count: usize, total_seconds: f64) -> SlidecastResult<Self> {
        if slide_count == 0 {
            return Err(SlidecastError::validation(
                "timing plan requires at least one slide",
            ));
        }
        if !total_seconds.is_finite() || total_seconds <= 0.0 {
            return Err(SlidecastError::validation(
                "timing plan requires a positive narration duration",
            ));
        }

        let per = total_seconds / slide_count as f64;
        Ok(Self {
            per_slide: vec![per; slide_count],
        })
    }

    pub fn per_slide(&self) -> &[f64] {
        &self.per_slide
    }

    pub fn len(&self) -> usize {
        self.per_slide.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_slide.is_empty()
    }

    pub fn total_seconds(&self) -> f64 {
        self.per_slide.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_split_covers_total_duration() {
        let plan = TimingPlan::uniform(3, 10.0).unwrap();
        assert_eq!(plan.len(), 3);
        for d in plan.per_slide() {
            assert!((d - 10.0 / 3.0).abs() < 1e-12);
        }
        assert!((plan.total_seconds() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_slide_takes_everything() {
        let plan = TimingPlan::uniform(1, 12.0).unwrap();
        assert_eq!(plan.per_slide(), &[12.0]);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(TimingPlan::uniform(0, 10.0).is_err());
        assert!(TimingPlan::uniform(3, 0.0).is_err());
        assert!(TimingPlan::uniform(3, -1.0).is_err());
        assert!(TimingPlan::uniform(3, f64::NAN).is_err());
    }
}
