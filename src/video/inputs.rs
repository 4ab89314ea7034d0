use std::path::Path;

use tracing::debug;

use crate::error::{InputError, Result};

/// Make sure every input exists, checking in order.
///
/// The first missing path is reported and the rest are not looked at.
pub fn ensure_inputs_exist(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.exists() {
            return Err(InputError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        debug!("Found input {}", path.display());
    }
    Ok(())
}
