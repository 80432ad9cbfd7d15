use std::path::{Path, PathBuf};

use folio_core::config::folio_root;

pub const DAEMON_SOCKET: &str = "daemon.sock";

/// `<home>/.folio/daemon.sock`
pub fn socket_path(home: &Path) -> PathBuf {
    folio_root(home).join(DAEMON_SOCKET)
}
