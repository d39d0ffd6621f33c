// src/mount/table.rs

//! Parser for the fstab-style mount table format used by `/proc/self/mounts`
//! and `/etc/mtab`.
//!
//! The kernel writes paths as raw bytes and escapes only whitespace and
//! backslashes, so the table is parsed as bytes and mount points are never
//! assumed to be UTF-8.

use std::ffi::OsString;
use std::path::PathBuf;

/// One row of the mount table. Only the fields the prober needs are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    /// Device or pseudo-filesystem name, lossily decoded for display.
    pub source: String,
    pub mount_point: PathBuf,
    pub fs_type: Option<String>,
}

/// Parse a whole mount table, in file order.
///
/// Blank lines, `#` comments and rows with fewer than two fields are skipped.
pub fn parse_mount_table(contents: &[u8]) -> Vec<MountEntry> {
    contents
        .split(|&b| b == b'\n')
        .filter_map(parse_mount_line)
        .collect()
}

fn parse_mount_line(line: &[u8]) -> Option<MountEntry> {
    let line = line.trim_ascii_start();
    if line.is_empty() || line.starts_with(b"#") {
        return None;
    }

    let mut fields = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|field| !field.is_empty());
    let source = fields.next()?;
    let mount_point = fields.next()?;
    let fs_type = fields.next().map(|f| lossy(&unescape_mount_field(f)));

    Some(MountEntry {
        source: lossy(&unescape_mount_field(source)),
        mount_point: path_from_bytes(unescape_mount_field(mount_point)),
        fs_type,
    })
}

/// Decode the octal escapes the kernel writes for whitespace and backslashes.
///
/// Only `\040`, `\011`, `\012`, `\134` and `\\` are decoded; any other
/// backslash sequence and every non-ASCII byte is kept verbatim.
pub fn unescape_mount_field(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    let mut i = 0;

    while i < field.len() {
        if field[i] == b'\\' {
            let decoded = match &field[i + 1..] {
                [b'0', b'4', b'0', ..] => Some((b' ', 4)),
                [b'0', b'1', b'1', ..] => Some((b'\t', 4)),
                [b'0', b'1', b'2', ..] => Some((b'\n', 4)),
                [b'1', b'3', b'4', ..] => Some((b'\\', 4)),
                [b'\\', ..] => Some((b'\\', 2)),
                _ => None,
            };
            if let Some((byte, width)) = decoded {
                out.push(byte);
                i += width;
                continue;
            }
        }
        out.push(field[i]);
        i += 1;
    }

    out
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(OsString::from(lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_space_and_backslash_escapes() {
        assert_eq!(unescape_mount_field(br"/media/My\040Disk"), b"/media/My Disk");
        assert_eq!(unescape_mount_field(br"/mnt/a\134b"), br"/mnt/a\b");
        assert_eq!(unescape_mount_field(br"/mnt/tab\011x"), b"/mnt/tab\tx");
    }

    #[test]
    fn keeps_unknown_escapes_verbatim() {
        assert_eq!(unescape_mount_field(br"/mnt/odd\07"), br"/mnt/odd\07");
        assert_eq!(unescape_mount_field(br"/mnt/end\"), br"/mnt/end\");
    }

    #[test]
    fn keeps_non_utf8_bytes() {
        assert_eq!(unescape_mount_field(b"/media/caf\xe9"), b"/media/caf\xe9");
    }

    #[test]
    fn skips_comments_and_short_rows() {
        let table = b"# comment\n\nproc\n/dev/sdb1 /mnt/e vfat rw 0 0\n";
        let entries = parse_mount_table(table);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mount_point, PathBuf::from("/mnt/e"));
        assert_eq!(entries[0].fs_type.as_deref(), Some("vfat"));
    }
}
