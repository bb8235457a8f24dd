//! Alert-pattern compiler.
//!
//! Turns a semantic beep request ("three short beeps") into the ordered
//! sequence of timed on/off segments the [`PulseSequencer`] plays back.
//!
//! [`PulseSequencer`]: super::sequencer::PulseSequencer

use std::time::Duration;

/// One timed interval on a binary output.  Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseSegment {
    /// `true` = output energized for `duration`, `false` = silence.
    pub level: bool,
    pub duration: Duration,
}

impl PulseSegment {
    pub const fn on(duration: Duration) -> Self {
        Self {
            level: true,
            duration,
        }
    }

    pub const fn off(duration: Duration) -> Self {
        Self {
            level: false,
            duration,
        }
    }
}

/// Compile a beep request into an ordered segment sequence.
///
/// - `count == 0` → empty sequence (no-op).
/// - `count == 1` → a single segment of `on + off`; a lone pulse needs no
///   trailing gap, so the on/off intervals collapse into one.
/// - `count > 1` → `2·count + 1` alternating segments, starting and ending
///   with a gap, giving `count` energized pulses separated and bracketed
///   by `off`-length silences.
///
/// Durations are non-negative by construction; callers reject negative
/// wire values before reaching this function.
pub fn compile(count: u32, on: Duration, off: Duration) -> Vec<PulseSegment> {
    match count {
        0 => Vec::new(),
        1 => vec![PulseSegment {
            level: !on.is_zero(),
            duration: on + off,
        }],
        n => {
            let mut segments = Vec::with_capacity(2 * n as usize + 1);
            segments.push(PulseSegment::off(off));
            for _ in 0..n {
                segments.push(PulseSegment::on(on));
                segments.push(PulseSegment::off(off));
            }
            segments
        }
    }
}

/// A silent pause, for spacing independently-issued patterns.
pub fn delay(period: Duration) -> Vec<PulseSegment> {
    vec![PulseSegment::off(period)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn zero_count_is_empty() {
        assert!(compile(0, 200 * MS, 100 * MS).is_empty());
    }

    #[test]
    fn single_beep_collapses_on_and_off() {
        let segs = compile(1, 200 * MS, 100 * MS);
        assert_eq!(segs, vec![PulseSegment::on(300 * MS)]);
    }

    #[test]
    fn single_silent_beep_stays_off() {
        let segs = compile(1, Duration::ZERO, 100 * MS);
        assert_eq!(segs, vec![PulseSegment::off(100 * MS)]);
    }

    #[test]
    fn multi_beep_alternates_and_is_gap_bracketed() {
        let segs = compile(3, 200 * MS, 100 * MS);
        assert_eq!(segs.len(), 7);
        assert!(!segs[0].level);
        assert!(!segs[6].level);
        for (i, seg) in segs.iter().enumerate() {
            assert_eq!(seg.level, i % 2 == 1);
            let expected = if seg.level { 200 * MS } else { 100 * MS };
            assert_eq!(seg.duration, expected);
        }
    }

    #[test]
    fn delay_is_one_silent_segment() {
        assert_eq!(delay(50 * MS), vec![PulseSegment::off(50 * MS)]);
    }
}
