use std::str::FromStr;
use serde::Deserialize;

/// How a destination path is compared against mount points in the live
/// mount table.
///
/// - `Exact`: byte-for-byte equality. `/mnt/usb/` does not match `/mnt/usb`,
///   and a symlink to a mount point does not match the mount point.
/// - `Normalized`: the destination is canonicalized (symlinks resolved) and
///   each mount point is normalized lexically (`.` and trailing slashes
///   dropped). A destination that cannot be canonicalized is normalized
///   lexically instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountMatch {
    Exact,
    Normalized,
}

impl Default for MountMatch {
    fn default() -> Self {
        MountMatch::Exact
    }
}

impl FromStr for MountMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MountMatch::Exact),
            "normalized" | "normalised" => Ok(MountMatch::Normalized),
            other => Err(format!(
                "invalid mount matching mode: {other} (expected \"exact\" or \"normalized\")"
            )),
        }
    }
}
