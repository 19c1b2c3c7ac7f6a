//! Foundation types for LiteVCS.
//!
//! Every other LiteVCS crate depends on `lvcs-types`. It defines the keys the
//! store hands out and the records it persists; none of these types perform
//! I/O.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- 32-byte BLAKE3 key of a blob or record
//! - [`ContentHasher`] -- domain-separated hashing that produces keys
//! - [`ContentDescriptor`] -- immutable path → blob snapshot
//! - [`Stage`] -- pending additions and removals
//! - [`Commit`] -- snapshot key plus message, author and time
//! - [`VersionNode`] -- a commit's place in the version tree, with its
//!   binary-lifting [`Ancestor`] table
//! - [`Branch`], [`Header`] -- mutable references

pub mod commit;
pub mod descriptor;
pub mod error;
pub mod hasher;
pub mod object;
pub mod refs;
pub mod stage;
pub mod version;

pub use commit::Commit;
pub use descriptor::{ContentDescriptor, DescriptorBuilder};
pub use error::TypeError;
pub use hasher::ContentHasher;
pub use object::ObjectId;
pub use refs::{Branch, Header};
pub use stage::Stage;
pub use version::{Ancestor, VersionNode, ANCESTOR_TABLE_SIZE};
