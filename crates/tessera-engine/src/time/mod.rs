//! Frame timing.
//!
//! The runtime keeps one `FrameClock` and ticks it once per loop iteration;
//! the resulting `FrameTime` goes to `App::on_update` and `FrameCtx`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
