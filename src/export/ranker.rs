// Clipforge - Clip Ranking
// Orders finished clips by importance and reduces them into one combined
// artifact. Media handles are passed through untouched.

use std::cmp::Ordering;

use serde::Serialize;

use crate::segment::{ClipSegment, ClipSet};

/// Ordered media handles making up one combined output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedArtifact<H> {
    parts: Vec<H>,
}

impl<H> CombinedArtifact<H> {
    pub fn parts(&self) -> &[H] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<H> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Concatenated payload, for in-memory byte handles
    pub fn concat_bytes(&self) -> Vec<u8>
    where
        H: AsRef<[u8]>,
    {
        let total = self.parts.iter().map(|p| p.as_ref().len()).sum();
        let mut out = Vec::with_capacity(total);
        for part in &self.parts {
            out.extend_from_slice(part.as_ref());
        }
        out
    }
}

/// Highest peak importance first; ties go to the earlier clip. Returns a new
/// vector and leaves the input as it was.
pub fn rank<H: Clone>(clips: &[ClipSegment<H>]) -> ClipSet<H> {
    let mut ranked = clips.to_vec();
    // sort_by is stable, so equal keys keep their input order
    ranked.sort_by(rank_order);
    ranked
}

fn rank_order<H>(a: &ClipSegment<H>, b: &ClipSegment<H>) -> Ordering {
    b.peak_importance
        .total_cmp(&a.peak_importance)
        .then_with(|| a.start_time.total_cmp(&b.start_time))
}

/// Concatenate each clip's media in the given order
pub fn combine<H: Clone>(ranked: &[ClipSegment<H>]) -> CombinedArtifact<H> {
    CombinedArtifact {
        parts: ranked.iter().map(|clip| clip.media.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::CloseReason;
    use uuid::Uuid;

    fn clip(start_time: f64, peak: f64, media: &str) -> ClipSegment<String> {
        ClipSegment {
            id: Uuid::new_v4(),
            start_time,
            duration: 4.0,
            peak_importance: peak,
            close_reason: CloseReason::Settled,
            media: media.to_string(),
        }
    }

    #[test]
    fn test_rank_orders_by_peak_descending() {
        let clips = vec![clip(0.0, 30.0, "a"), clip(10.0, 80.0, "b"), clip(20.0, 55.0, "c")];
        let ranked = rank(&clips);
        let order: Vec<&str> = ranked.iter().map(|c| c.media.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        // Input is untouched
        assert_eq!(clips[0].media, "a");
    }

    #[test]
    fn test_rank_breaks_ties_by_start_time() {
        let clips = vec![clip(40.0, 50.0, "late"), clip(5.0, 50.0, "early"), clip(20.0, 50.0, "middle")];
        let ranked = rank(&clips);
        let order: Vec<&str> = ranked.iter().map(|c| c.media.as_str()).collect();
        assert_eq!(order, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let clips = vec![
            clip(0.0, 25.0, "a"),
            clip(6.0, 90.0, "b"),
            clip(12.0, 25.0, "c"),
            clip(18.0, 61.5, "d"),
        ];
        let once = rank(&clips);
        let twice = rank(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rank_empty() {
        let clips: Vec<ClipSegment<String>> = Vec::new();
        assert!(rank(&clips).is_empty());
    }

    #[test]
    fn test_combine_empty_is_empty_artifact() {
        let artifact = combine::<Vec<u8>>(&[]);
        assert!(artifact.is_empty());
        assert!(artifact.concat_bytes().is_empty());
    }

    #[test]
    fn test_combine_singleton_is_unchanged() {
        let single = vec![ClipSegment {
            id: Uuid::new_v4(),
            start_time: 0.0,
            duration: 4.0,
            peak_importance: 40.0,
            close_reason: CloseReason::EndOfStream,
            media: vec![1u8, 2, 3, 4],
        }];
        let artifact = combine(&single);
        assert_eq!(artifact.parts(), &[vec![1u8, 2, 3, 4]]);
        assert_eq!(artifact.concat_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_combine_follows_ranked_order() {
        let clips = vec![clip(0.0, 10.0, "low"), clip(5.0, 99.0, "high")];
        let artifact = combine(&rank(&clips));
        assert_eq!(artifact.into_parts(), vec!["high".to_string(), "low".to_string()]);
    }
}
