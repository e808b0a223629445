//! Plugin installer
//!
//! Resolves a binary, asks it for its metadata, checks the reported names
//! against built-ins and installed plugins, then copies and registers it.

pub mod conflict;
pub mod install;
pub mod launcher;
pub mod resolve;

pub use conflict::{Conflict, NameKind, check_reserved, find_conflict};
pub use install::{InstalledPlugin, MetadataSource, PluginInstaller, ProcessMetadataSource};
pub use launcher::query_metadata;
pub use resolve::{BinaryDownloader, HttpDownloader, ResolvedBinary, resolve_binary};
