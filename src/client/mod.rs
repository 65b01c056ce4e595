//! Workload Client Module
//!
//! A randomized client that keeps exercising the values API.
//!
//! ## Pipeline
//! `WorkloadDriver` loops forever (until cancelled):
//! 1. **Schedule**: `CommandScheduler` draws the next command among the ones that
//!    are currently legal.
//! 2. **Build**: `build_request` turns it into method, URL and JSON body.
//! 3. **Send**: the request goes out with a bounded timeout; the response is traced.
//! 4. **Pace**: the loop sleeps a random duration below the configured maximum.
//!
//! Responses never feed back into scheduling. The only client-side state is the
//! scheduler's known id.

pub mod driver;
pub mod error;
pub mod request;
pub mod scheduler;

pub use driver::{StepOutcome, WorkloadDriver, WorkloadStats};
pub use error::{ClientError, render_error_chain};
pub use request::{RequestDescriptor, build_request, try_build_request};
pub use scheduler::{Command, CommandScheduler, ScheduledCommand, SchedulerState};

#[cfg(test)]
mod tests;
