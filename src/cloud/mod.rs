pub mod poll;
pub mod provider;
pub mod task_run;
pub mod types;

pub use poll::{wait_for_address, PollPolicy};
pub use provider::CloudProvider;
pub use task_run::{validate_task_run_id, TaskRunId};
pub use types::{CloudVmInstance, InstanceIdentifier, VmState};
