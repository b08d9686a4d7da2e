pub mod pnr;
pub mod search;
pub mod workflow;

pub use pnr::RandomPnrGenerator;
pub use search::{SearchError, SearchService};
pub use workflow::{BookingError, BookingWorkflow, WorkflowLimits};
