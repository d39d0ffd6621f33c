// src/sync/command.rs

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::config::SyncSection;

/// The external mirroring command: `program args... <source>/ <destination>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl MirrorCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(section: &SyncSection) -> Self {
        Self::new(section.program.clone(), section.args.clone())
    }

    /// Arguments passed to `program` for one source/destination pair.
    ///
    /// The source always ends in `/` so the tool copies the directory's
    /// contents into the destination instead of nesting it one level down.
    pub fn argv(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        argv.push(contents_of(source));
        argv.push(destination.as_os_str().to_owned());
        argv
    }

    /// Human-readable command line, for logs and `--dry-run`.
    pub fn display<'a>(&'a self, source: &'a Path, destination: &'a Path) -> DisplayCommand<'a> {
        DisplayCommand {
            command: self,
            source,
            destination,
        }
    }
}

impl Default for MirrorCommand {
    fn default() -> Self {
        Self::from_config(&SyncSection::default())
    }
}

fn contents_of(source: &Path) -> OsString {
    let mut arg = source.as_os_str().to_owned();
    if arg.as_encoded_bytes().last() != Some(&b'/') {
        arg.push("/");
    }
    arg
}

pub struct DisplayCommand<'a> {
    command: &'a MirrorCommand,
    source: &'a Path,
    destination: &'a Path,
}

impl fmt::Display for DisplayCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command.program)?;
        for arg in self.command.argv(self.source, self.destination) {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
