//! L3 Vitals HTTP API
//! Chain health snapshots, alert delivery and service stats over REST.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
