//! Archive entry path sanitizing.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Turn an entry name from an archive into a path relative to the
/// extraction root.
///
/// `.` segments and leading `/` are dropped, so absolute entries land under
/// the root. `..` may only pop segments that were pushed before it. Windows
/// drive or UNC prefixes, null bytes and names that normalize to nothing are
/// rejected with [`InvalidEntryPath`](ErrorKind::InvalidEntryPath).
pub(crate) fn entry_path(name: &str) -> Result<PathBuf> {
    let invalid = || ErrorKind::InvalidEntryPath(PathBuf::from(name));
    if name.contains('\0') {
        exn::bail!(invalid());
    }
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if !relative.pop() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match relative.as_os_str().is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(relative),
    }
}
