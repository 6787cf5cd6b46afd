//! Monitor pipeline.
//!
//! - `scheduler`: the fetch -> extract -> diff -> apply loop
//! - `diff`: pure change detection against the seen map
//! - `history`: bounded alert history and monitored cache
//! - `state`: single-writer state publication
//! - `query`: the read-only view served to clients

pub mod clock;
pub mod diff;
pub mod history;
pub mod query;
pub mod scheduler;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use diff::{DiffResult, SeenSet, calculate_diff};
pub use history::{ALERT_CAPACITY, AlertHistory, MONITORED_CAPACITY, MonitoredCache};
pub use query::DashboardView;
pub use scheduler::{CycleReport, Pacing, RunSummary, Scheduler};
pub use state::{MonitorState, Phase, StatePublisher, StateReader, state_channel};
