/// `mount` and `list`: thin wrappers over the filesystem driver.
use alloc::vec;
use log::debug;

use super::error::{ShellError, ShellResult};
use super::Session;
use crate::fs::listing;
use crate::param::DIR_BUFFER_LEN;

/// Mount `unit` and make its root the session's root directory.
/// A previously mounted root is replaced, not unmounted.
pub fn mount(session: &mut Session<'_>, unit: u32) -> ShellResult<()> {
    let root = session.fs.mount(unit)?;
    if let Some(old) = session.root.replace(root) {
        debug!("root {:?} replaced by {:?}", old, root);
    }
    outln!(session, "unit {} mounted", unit);
    Ok(())
}

/// Print the names in the root directory, one per line.
pub fn list(session: &mut Session<'_>) -> ShellResult<()> {
    let root = session.root.ok_or(ShellError::NoRootDirectory)?;

    let mut buf = vec![0u8; DIR_BUFFER_LEN];
    let len = session.fs.read_dir(root, &mut buf)?;
    debug!("read_dir {:?}: {} bytes", root, len);

    for entry in listing::entries(&buf, len) {
        let name = entry?;
        outln!(session, "{}", name);
    }
    Ok(())
}
