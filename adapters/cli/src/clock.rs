//! Frame time sources.

use std::time::{Duration, Instant};

/// Supplies the simulated duration of each frame.
#[derive(Debug)]
pub(crate) enum Clock {
    /// Every frame lasts exactly `1 / fps` seconds.
    Fixed(Duration),
    /// Frames last as long as the wall clock says, capped to avoid huge jumps.
    Realtime { last: Instant, step: Duration },
}

const MAX_FRAME: Duration = Duration::from_millis(250);

impl Clock {
    pub(crate) fn new(fps: u32, realtime: bool) -> Self {
        let step = Duration::from_secs(1) / fps.max(1);
        if realtime {
            Self::Realtime {
                last: Instant::now(),
                step,
            }
        } else {
            Self::Fixed(step)
        }
    }

    /// Returns the length of the next frame, sleeping first in realtime mode.
    pub(crate) fn next_frame(&mut self) -> Duration {
        match self {
            Self::Fixed(step) => *step,
            Self::Realtime { last, step } => {
                let elapsed = last.elapsed();
                if elapsed < *step {
                    std::thread::sleep(*step - elapsed);
                }
                let now = Instant::now();
                let dt = now.duration_since(*last).min(MAX_FRAME);
                *last = now;
                dt
            }
        }
    }
}
