#![forbid(unsafe_code)]

//! StreamDb: a paged, optionally-compressed, content-addressed single-file
//! container. Ingest a directory tree with [`ingest::pack_directory`], or
//! drive a container directly through [`container::Container`] and
//! [`container::ReadContainer`].

pub mod cli;
pub mod codec;
pub mod container;
pub mod document;
pub mod error;
pub mod fsutil;
pub mod index;
pub mod ingest;
pub mod logger;
pub mod page;
pub mod trie;

pub use container::{Container, ContainerOptions, ReadContainer};
pub use error::{Error, Result};
pub use ingest::{pack_directory, IngestOptions};
