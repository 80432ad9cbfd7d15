//! Content daemon: a single writer queue for content changes plus a Unix
//! socket server that answers reads and serves cached pages.

mod error;
pub mod paths;
pub mod protocol;
mod runtime;

pub use error::DaemonError;
pub use protocol::{
    request, request_status, request_stop, send_request, DaemonRequest, DaemonResponse,
};
pub use runtime::{run, start_blocking, WriteStats};
