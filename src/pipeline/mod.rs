//! Frame loop controller.
//!
//! Drives one cycle per frame: acquire, preprocess, seed or update the
//! background, select the focus, track, classify, and emit. All state that
//! survives a cycle lives in [`RetinaContext`].

mod context;
mod frame_loop;
mod stop;

pub use context::RetinaContext;
pub use frame_loop::{
    Cycle, CycleOutcome, FrameLoop, LoopStats, PipelineError, RunSummary, Termination,
};
pub use stop::{StopFlag, StopSignal};
