//! Beeper pulse sequencer.
//!
//! A FIFO queue of [`PulseSegment`]s with a single dedicated consumer
//! thread that plays them onto a [`SwitchSink`].  Producers (the command
//! dispatch context) append whole patterns atomically; the worker pops one
//! segment at a time and executes its blocking timed wait *outside* the
//! queue lock.
//!
//! ## Cancellation contract
//!
//! `flush()` discards only segments that have not started playing and
//! forces the output off immediately.  A segment already mid-playback is
//! not shortened — its wait completes, and if it was energized the worker's
//! trailing off-write lands after the flush's, so the output turns off
//! promptly on flush and stays off once the in-flight timer elapses.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::app::ports::SwitchSink;
use crate::control::pattern::{self, PulseSegment};
use crate::control::lock;
use crate::drivers::task_pin::{self, Core};

/// Upper bound on one idle wait, so the worker observes a stop request
/// even when no segment ever arrives.
const IDLE_WAIT: Duration = Duration::from_millis(100);

struct SegmentQueue {
    segments: VecDeque<PulseSegment>,
    stop: bool,
}

struct Shared<S> {
    queue: Mutex<SegmentQueue>,
    wake: Condvar,
    /// Separate lock so a `flush()` off-write never waits on queue traffic,
    /// and the worker never holds the queue lock while touching hardware.
    sink: Mutex<S>,
}

/// Single-consumer playback controller for the beeper output.
pub struct PulseSequencer<S: SwitchSink + Send + 'static> {
    shared: Arc<Shared<S>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: SwitchSink + Send + 'static> PulseSequencer<S> {
    /// Take ownership of the sink and start the worker thread.  The worker
    /// runs until [`stop`](Self::stop) and is never restarted.
    pub fn start(sink: S) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(SegmentQueue {
                segments: VecDeque::new(),
                stop: false,
            }),
            wake: Condvar::new(),
            sink: Mutex::new(sink),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = task_pin::spawn_on_core(Core::App, 5, 8, "beep-seq\0", move || {
            worker_loop(&worker_shared);
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Append a pattern atomically to the tail of the queue, waking the
    /// worker if it was idle.  No-op on an empty batch; never blocks the
    /// caller beyond lock acquisition.
    pub fn enqueue(&self, segments: Vec<PulseSegment>) {
        if segments.is_empty() {
            return;
        }
        let mut q = lock(&self.shared.queue);
        let was_empty = q.segments.is_empty();
        q.segments.extend(segments);
        drop(q);
        if was_empty {
            self.shared.wake.notify_one();
        }
    }

    /// Discard all not-yet-started segments and force the output off.
    pub fn flush(&self) {
        lock(&self.shared.queue).segments.clear();
        lock(&self.shared.sink).set(false);
    }

    /// Compile and queue an alert pattern.  With `cancel_previous`, pending
    /// segments are flushed first; otherwise the pattern plays after
    /// whatever is already queued, composing across calls.
    pub fn beep(&self, count: u32, on: Duration, off: Duration, cancel_previous: bool) {
        let segments = pattern::compile(count, on, off);
        if cancel_previous {
            self.flush();
        }
        self.enqueue(segments);
    }

    /// Queue a silent pause.
    pub fn delay(&self, period: Duration) {
        self.enqueue(pattern::delay(period));
    }

    /// Number of segments not yet started.
    pub fn queued_len(&self) -> usize {
        lock(&self.shared.queue).segments.len()
    }

    /// Request worker termination after its current wait, and join it.
    /// The output is left de-energized.
    pub fn stop(&mut self) {
        lock(&self.shared.queue).stop = true;
        self.shared.wake.notify_one();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("beep-seq: worker panicked before shutdown");
                lock(&self.shared.sink).set(false);
            }
        }
    }
}

impl<S: SwitchSink + Send + 'static> Drop for PulseSequencer<S> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

fn worker_loop<S: SwitchSink>(shared: &Shared<S>) {
    loop {
        let segment = {
            let mut q = lock(&shared.queue);
            if q.stop {
                break;
            }
            match q.segments.pop_front() {
                Some(seg) => Some(seg),
                None => {
                    // Bounded wait: wakes on enqueue, or times out so a
                    // stop request is observed within IDLE_WAIT.
                    let (mut q, _timeout) = shared
                        .wake
                        .wait_timeout(q, IDLE_WAIT)
                        .unwrap_or_else(|poisoned| {
                            log::error!("beep-seq: queue lock poisoned; recovering");
                            poisoned.into_inner()
                        });
                    if q.stop {
                        break;
                    }
                    q.segments.pop_front()
                }
            }
        };

        // Timed waits happen outside the lock, so producers never block on
        // a segment in flight.
        if let Some(seg) = segment {
            if seg.level {
                lock(&shared.sink).set(true);
                std::thread::sleep(seg.duration);
                lock(&shared.sink).set(false);
            } else {
                std::thread::sleep(seg.duration);
            }
        }
    }

    lock(&shared.sink).set(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Minimal fake: records the last commanded level.
    struct FakeSwitch(Arc<AtomicBool>);

    impl SwitchSink for FakeSwitch {
        fn set(&mut self, energized: bool) {
            self.0.store(energized, Ordering::SeqCst);
        }
    }

    fn sequencer() -> (PulseSequencer<FakeSwitch>, Arc<AtomicBool>) {
        let level = Arc::new(AtomicBool::new(false));
        (PulseSequencer::start(FakeSwitch(Arc::clone(&level))), level)
    }

    /// Poll until the queue drains to `len` (i.e. the worker has picked up
    /// everything above it), so assertions don't race the worker thread.
    fn wait_for_queued(seq: &PulseSequencer<FakeSwitch>, len: usize) {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while seq.queued_len() != len {
            assert!(
                std::time::Instant::now() < deadline,
                "queue never drained to {len} (at {})",
                seq.queued_len()
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn empty_enqueue_is_noop() {
        let (seq, _) = sequencer();
        seq.enqueue(Vec::new());
        assert_eq!(seq.queued_len(), 0);
    }

    #[test]
    fn composed_beeps_accumulate_in_order() {
        let (seq, _) = sequencer();
        // Long leading gap keeps the worker busy on segment one while we
        // inspect the tail of the queue.
        seq.delay(Duration::from_secs(5));
        seq.beep(2, Duration::from_millis(10), Duration::from_millis(10), false);
        seq.beep(1, Duration::from_millis(10), Duration::ZERO, false);
        // 5 segments for count=2 plus 1 for count=1 remain once the worker
        // has taken the leading delay in flight.
        wait_for_queued(&seq, 6);
    }

    #[test]
    fn flush_clears_pending_and_deenergizes() {
        let (seq, level) = sequencer();
        seq.delay(Duration::from_secs(5));
        seq.beep(4, Duration::from_millis(10), Duration::from_millis(10), false);
        wait_for_queued(&seq, 9);
        seq.flush();
        assert_eq!(seq.queued_len(), 0);
        assert!(!level.load(Ordering::SeqCst));
    }

    #[test]
    fn cancel_previous_replaces_pending() {
        let (seq, _) = sequencer();
        seq.delay(Duration::from_secs(5));
        seq.beep(4, Duration::from_millis(10), Duration::from_millis(10), false);
        wait_for_queued(&seq, 9);
        seq.beep(1, Duration::from_millis(10), Duration::ZERO, true);
        assert_eq!(seq.queued_len(), 1);
    }

    #[test]
    fn stop_joins_worker_and_leaves_output_off() {
        let (mut seq, level) = sequencer();
        seq.beep(1, Duration::from_millis(5), Duration::ZERO, true);
        seq.stop();
        assert!(!level.load(Ordering::SeqCst));
    }
}
