//! Segment boundary planning.
//!
//! Times are carried as whole milliseconds so that the iterative walk and the
//! closed-form segment count agree exactly. Whether an offset lies inside the
//! source is decided on the seconds as given; an offset that only rounds onto
//! the end is pulled back by one millisecond.

use crate::error::{JobError, JobResult};

const MILLIS_PER_SECOND: f64 = 1000.0;

/// One `[start, end)` slice of the source, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    start_ms: u64,
    end_ms: u64,
}

impl Boundary {
    pub fn start(&self) -> f64 {
        self.start_ms as f64 / MILLIS_PER_SECOND
    }

    pub fn end(&self) -> f64 {
        self.end_ms as f64 / MILLIS_PER_SECOND
    }

    pub fn length(&self) -> f64 {
        (self.end_ms - self.start_ms) as f64 / MILLIS_PER_SECOND
    }
}

/// Ordered, contiguous boundaries a job will cut. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    boundaries: Vec<Boundary>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.iter()
    }

    /// `(start, end)` pairs in seconds.
    pub fn as_pairs(&self) -> Vec<(f64, f64)> {
        self.boundaries.iter().map(|b| (b.start(), b.end())).collect()
    }
}

pub(crate) fn to_millis(seconds: f64, what: &str) -> JobResult<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(JobError::invalid(format!(
            "{} must be a finite, non-negative number of seconds (got {})",
            what, seconds
        )));
    }
    Ok((seconds * MILLIS_PER_SECOND).round() as u64)
}

pub(crate) fn positive_millis(seconds: f64, what: &str) -> JobResult<u64> {
    let ms = to_millis(seconds, what)?;
    if ms == 0 {
        return Err(JobError::invalid(format!(
            "{} must be greater than zero (got {})",
            what, seconds
        )));
    }
    Ok(ms)
}

/// Closed-form number of segments for a span, `ceil((duration - offset) / length)`.
pub fn segment_count(duration: f64, start_offset: f64, segment_length: f64) -> JobResult<usize> {
    let (duration_ms, offset_ms, length_ms) = checked_inputs(duration, start_offset, segment_length)?;
    Ok(count_millis(duration_ms, offset_ms, length_ms))
}

fn count_millis(duration_ms: u64, offset_ms: u64, length_ms: u64) -> usize {
    (duration_ms - offset_ms).div_ceil(length_ms) as usize
}

fn checked_inputs(duration: f64, start_offset: f64, segment_length: f64) -> JobResult<(u64, u64, u64)> {
    let duration_ms = positive_millis(duration, "duration")?;
    let length_ms = positive_millis(segment_length, "segment length")?;
    let offset_ms = to_millis(start_offset, "start offset")?;
    if start_offset >= duration {
        return Err(JobError::invalid(format!(
            "start offset {}s must be before the end of a {}s source",
            start_offset, duration
        )));
    }
    Ok((duration_ms, inside(offset_ms, duration_ms), length_ms))
}

/// Millisecond offset of a start known to lie before the end.
fn inside(offset_ms: u64, duration_ms: u64) -> u64 {
    offset_ms.min(duration_ms - 1)
}

/// Split `[start_offset, duration)` into `segment_length` pieces. The final
/// piece is clamped to `duration` and kept however short it is.
pub fn plan(duration: f64, start_offset: f64, segment_length: f64) -> JobResult<SegmentPlan> {
    let (duration_ms, offset_ms, length_ms) = checked_inputs(duration, start_offset, segment_length)?;
    let total = count_millis(duration_ms, offset_ms, length_ms);

    let mut boundaries = Vec::with_capacity(total);
    let mut cursor = offset_ms;
    while cursor < duration_ms {
        let end_ms = cursor.saturating_add(length_ms).min(duration_ms);
        boundaries.push(Boundary {
            start_ms: cursor,
            end_ms,
        });
        cursor = cursor.saturating_add(length_ms);
    }
    debug_assert_eq!(boundaries.len(), total);

    Ok(SegmentPlan { boundaries })
}

/// One cut of at most `segment_length` starting at `start_offset`.
pub fn plan_single(duration: f64, start_offset: f64, segment_length: f64) -> JobResult<SegmentPlan> {
    let duration_ms = positive_millis(duration, "duration")?;
    let length_ms = positive_millis(segment_length, "segment length")?;
    let offset_ms = to_millis(start_offset, "start offset")?;
    if start_offset >= duration {
        return Err(JobError::EmptyCut {
            start: start_offset,
            duration,
        });
    }

    let offset_ms = inside(offset_ms, duration_ms);
    let end_ms = offset_ms.saturating_add(length_ms).min(duration_ms);

    Ok(SegmentPlan {
        boundaries: vec![Boundary {
            start_ms: offset_ms,
            end_ms,
        }],
    })
}
