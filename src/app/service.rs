//! Panel service — owns both actuator controllers and interprets commands.
//!
//! The service is the single entry point for the outside world: the MQTT
//! adapter (or a test) hands it a [`PanelCommand`], it drives the
//! [`PulseSequencer`] / [`RampController`] accordingly and reports what it
//! did through the [`EventSink`] port.
//!
//! [`PulseSequencer`]: crate::control::sequencer::PulseSequencer
//! [`RampController`]: crate::control::ramp::RampController

use std::time::Duration;

use log::warn;

use crate::app::commands::PanelCommand;
use crate::app::events::PanelEvent;
use crate::app::ports::{EventSink, IntensitySink, SwitchSink};
use crate::config::PanelConfig;
use crate::control::ramp::RampController;
use crate::control::sequencer::PulseSequencer;
use crate::error::Result;

pub struct PanelService<B, L>
where
    B: SwitchSink + Send + 'static,
    L: IntensitySink + Send + 'static,
{
    beeper: PulseSequencer<B>,
    backlight: RampController<L>,
}

impl<B, L> PanelService<B, L>
where
    B: SwitchSink + Send + 'static,
    L: IntensitySink + Send + 'static,
{
    /// Construct both controllers and start the sequencer worker.  The
    /// backlight comes up at the midpoint of its configured range.
    pub fn start(
        beeper_sink: B,
        backlight_sink: L,
        config: &PanelConfig,
        events: &mut impl EventSink,
    ) -> Result<Self> {
        let backlight = RampController::new(
            backlight_sink,
            config.min_brightness,
            config.max_brightness,
            Duration::from_millis(u64::from(config.transition_ms)),
        )?;
        let beeper = PulseSequencer::start(beeper_sink);

        events.emit(&PanelEvent::Started {
            brightness: backlight.current(),
        });

        Ok(Self { beeper, backlight })
    }

    /// Interpret one inbound command.
    ///
    /// Only immediate writes can fail (range rejection); everything else
    /// is fire-and-forget into a controller.
    pub fn handle_command(
        &mut self,
        command: PanelCommand,
        events: &mut impl EventSink,
    ) -> Result<()> {
        match command {
            PanelCommand::SetBrightness(target) => {
                self.backlight.set_target_smooth(target);
                events.emit(&PanelEvent::BrightnessTargeted { target });
                Ok(())
            }

            PanelCommand::SetBrightnessImmediate(value) => {
                self.backlight.set_immediate(value)?;
                events.emit(&PanelEvent::BrightnessSet { value });
                Ok(())
            }

            PanelCommand::Beep {
                count,
                on_ms,
                off_ms,
                cancel_previous,
            } => {
                self.beeper.beep(
                    count,
                    Duration::from_millis(on_ms),
                    Duration::from_millis(off_ms),
                    cancel_previous,
                );
                events.emit(&PanelEvent::BeepQueued {
                    count,
                    cancelled_previous: cancel_previous,
                });
                Ok(())
            }

            PanelCommand::BeepDelay(ms) => {
                self.beeper.delay(Duration::from_millis(ms));
                Ok(())
            }

            PanelCommand::FlushBeeps => {
                self.beeper.flush();
                events.emit(&PanelEvent::BeepsFlushed);
                Ok(())
            }
        }
    }

    pub fn backlight(&self) -> &RampController<L> {
        &self.backlight
    }

    pub fn beeper(&self) -> &PulseSequencer<B> {
        &self.beeper
    }

    /// Graceful teardown: stop the sequencer worker and park any active
    /// ramp at its current position.
    pub fn shutdown(mut self) {
        self.backlight.set_target_smooth(self.backlight.current());
        self.beeper.stop();
        if self.backlight.is_ramping() {
            warn!("shutdown: backlight worker still settling");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::Arc;

    struct NullSwitch;
    impl SwitchSink for NullSwitch {
        fn set(&mut self, _energized: bool) {}
    }

    struct SharedIntensity(Arc<AtomicI32>);
    impl IntensitySink for SharedIntensity {
        fn write(&mut self, value: i32) {
            self.0.store(value, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingEvents {
        started: Arc<AtomicBool>,
        emitted: usize,
    }
    impl EventSink for CountingEvents {
        fn emit(&mut self, event: &PanelEvent) {
            if matches!(event, PanelEvent::Started { .. }) {
                self.started.store(true, Ordering::SeqCst);
            }
            self.emitted += 1;
        }
    }

    fn service(
        events: &mut CountingEvents,
    ) -> (PanelService<NullSwitch, SharedIntensity>, Arc<AtomicI32>) {
        let written = Arc::new(AtomicI32::new(-1));
        let svc = PanelService::start(
            NullSwitch,
            SharedIntensity(Arc::clone(&written)),
            &PanelConfig::default(),
            events,
        )
        .unwrap();
        (svc, written)
    }

    #[test]
    fn start_emits_started_with_midpoint() {
        let mut events = CountingEvents::default();
        let (svc, written) = service(&mut events);
        assert!(events.started.load(Ordering::SeqCst));
        assert_eq!(written.load(Ordering::SeqCst), 127);
        svc.shutdown();
    }

    #[test]
    fn immediate_out_of_range_surfaces_error() {
        let mut events = CountingEvents::default();
        let (mut svc, _) = service(&mut events);
        let result = svc.handle_command(PanelCommand::SetBrightnessImmediate(999), &mut events);
        assert!(result.is_err());
        assert_eq!(svc.backlight().current(), 127);
        svc.shutdown();
    }

    #[test]
    fn flush_command_empties_queue() {
        let mut events = CountingEvents::default();
        let (mut svc, _) = service(&mut events);
        svc.handle_command(
            PanelCommand::Beep {
                count: 10,
                on_ms: 1_000,
                off_ms: 1_000,
                cancel_previous: false,
            },
            &mut events,
        )
        .unwrap();
        svc.handle_command(PanelCommand::FlushBeeps, &mut events)
            .unwrap();
        assert_eq!(svc.beeper().queued_len(), 0);
        svc.shutdown();
    }
}
