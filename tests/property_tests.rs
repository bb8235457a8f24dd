//! Property tests for the pattern compiler and the MQTT router.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use std::time::Duration;

use proptest::prelude::*;

use touchpanel::adapters::mqtt::{parse_command, RouteError};
use touchpanel::app::commands::PanelCommand;
use touchpanel::config::PanelConfig;
use touchpanel::control::pattern::compile;
use touchpanel::error::PatternError;

// ── Pattern compiler invariants ───────────────────────────────

proptest! {
    /// For any count > 1 the compiled sequence is gap-bracketed, strictly
    /// alternating, and carries exactly `count` energized pulses of the
    /// requested width.
    #[test]
    fn multi_beep_shape(
        count in 2u32..=50,
        on_ms in 1u64..=500,
        off_ms in 0u64..=500,
    ) {
        let on = Duration::from_millis(on_ms);
        let off = Duration::from_millis(off_ms);
        let segs = compile(count, on, off);

        prop_assert_eq!(segs.len(), 2 * count as usize + 1);
        prop_assert!(!segs[0].level);
        prop_assert!(!segs.last().unwrap().level);
        for (i, seg) in segs.iter().enumerate() {
            prop_assert_eq!(seg.level, i % 2 == 1);
            prop_assert_eq!(seg.duration, if seg.level { on } else { off });
        }
        prop_assert_eq!(segs.iter().filter(|s| s.level).count(), count as usize);
    }

    /// A lone pulse collapses into one segment whose duration is the sum of
    /// the on and off intervals, energized iff the on interval is non-zero.
    #[test]
    fn single_beep_collapses(on_ms in 0u64..=500, off_ms in 0u64..=500) {
        let on = Duration::from_millis(on_ms);
        let off = Duration::from_millis(off_ms);
        let segs = compile(1, on, off);

        prop_assert_eq!(segs.len(), 1);
        prop_assert_eq!(segs[0].duration, on + off);
        prop_assert_eq!(segs[0].level, on_ms > 0);
    }

    #[test]
    fn zero_count_is_always_empty(on_ms in 0u64..=500, off_ms in 0u64..=500) {
        let segs = compile(0, Duration::from_millis(on_ms), Duration::from_millis(off_ms));
        prop_assert!(segs.is_empty());
    }

    /// Total energized time scales linearly with count for multi-pulse
    /// patterns.
    #[test]
    fn energized_time_is_count_times_on(count in 2u32..=50, on_ms in 1u64..=500) {
        let on = Duration::from_millis(on_ms);
        let segs = compile(count, on, Duration::from_millis(100));
        let energized: Duration = segs.iter().filter(|s| s.level).map(|s| s.duration).sum();
        prop_assert_eq!(energized, on * count);
    }
}

// ── MQTT router invariants ────────────────────────────────────

proptest! {
    /// Any finite float payload routes to a brightness command truncated
    /// toward zero; range enforcement is deferred to the controller.
    #[test]
    fn brightness_truncates_toward_zero(value in -5000.0f64..5000.0) {
        let payload = format!("{value}");
        let cmd = parse_command(
            "touchpanel",
            "touchpanel/brightness",
            payload.as_bytes(),
            &PanelConfig::default(),
        )
        .unwrap();
        prop_assert_eq!(cmd, PanelCommand::SetBrightness(value as i32));
    }

    /// A bare non-negative integer always routes to a beep with config
    /// defaults and cancellation enabled.
    #[test]
    fn bare_count_uses_defaults(count in 0i64..=100_000) {
        let config = PanelConfig::default();
        let payload = format!("{count}");
        let cmd = parse_command(
            "touchpanel",
            "touchpanel/beep",
            payload.as_bytes(),
            &config,
        )
        .unwrap();
        prop_assert_eq!(
            cmd,
            PanelCommand::Beep {
                count: count as u32,
                on_ms: config.beep_on_ms,
                off_ms: config.beep_off_ms,
                cancel_previous: true,
            }
        );
    }

    /// Negative counts are rejected before they can reach the compiler.
    #[test]
    fn negative_counts_never_route(count in i64::MIN..0) {
        let payload = format!("{count}");
        let err = parse_command(
            "touchpanel",
            "touchpanel/beep",
            payload.as_bytes(),
            &PanelConfig::default(),
        );
        prop_assert_eq!(err, Err(RouteError::Pattern(PatternError::NegativeCount)));
    }

    /// Topics outside the configured prefix never produce a command.
    #[test]
    fn foreign_prefixes_never_route(prefix in "[a-z]{1,12}") {
        prop_assume!(prefix != "touchpanel");
        let topic = format!("{prefix}/brightness");
        let err = parse_command(
            "touchpanel",
            &topic,
            b"128",
            &PanelConfig::default(),
        );
        prop_assert_eq!(err, Err(RouteError::UnknownTopic));
    }
}
