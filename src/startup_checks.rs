//! Startup requirement validation for memtop.
//!
//! Without root (or CAP_SYS_PTRACE) the smaps files of other users'
//! processes are unreadable and those processes silently drop out of the
//! table. These checks make that visible in the log.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    info!("Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(proc_root)?;

    info!("All runtime requirements validated");
    Ok(())
}

/// Check if running with sufficient privileges
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("Not running as root - processes of other users will not be shown");
    } else {
        info!("Running as root (uid=0)");
    }
}

/// Check that the process root can be listed and that init's smaps is
/// readable.
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    if let Err(e) = fs::read_dir(proc_root) {
        return Err(ValidationError::ProcRootUnreadable(format!(
            "{}: {}",
            proc_root.display(),
            e
        )));
    }

    // Opening is enough to hit the ptrace access check
    let init_smaps = proc_root.join("1").join("smaps");
    match fs::File::open(&init_smaps) {
        Ok(_) => {
            info!("/proc access: can read all processes");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            warn!(
                "Cannot read {} - only processes you own will be shown",
                init_smaps.display()
            );
            Err(ValidationError::InsufficientPermissions(e.to_string()))
        }
        Err(e) => {
            warn!("Could not test /proc access: {}", e);
            Ok(())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Process root not readable: {0}")]
    ProcRootUnreadable(String),
}
