use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// A recorded version: which snapshot, by whom, when, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Key of the [`ContentDescriptor`](crate::ContentDescriptor) snapshot.
    pub descriptor: ObjectId,
    /// Free-form commit message.
    pub message: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Author name taken from the repository header.
    pub author: String,
}

impl Commit {
    /// Create a commit stamped with the current time.
    pub fn new(descriptor: ObjectId, message: impl Into<String>, author: impl Into<String>) -> Self {
        Self::at(descriptor, message, author, Utc::now())
    }

    /// Create a commit with an explicit timestamp.
    pub fn at(
        descriptor: ObjectId,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            descriptor,
            message: message.into(),
            timestamp,
            author: author.into(),
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "\"{}\" by {} ({})",
            self.message,
            self.author,
            self.descriptor.short_hex()
        )
    }
}
