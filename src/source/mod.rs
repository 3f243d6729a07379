//! Concrete collaborators for the export pipeline
//!
//! - [`MongoPageSource`] / [`MongoUserLookup`]: live data from MongoDB
//! - [`MemoryPageSource`] / [`MemoryUserLookup`]: fixed documents, used for
//!   replaying JSON files and in tests

pub mod convert;
pub mod memory;
pub mod mongo;

pub use memory::{MemoryPageSource, MemoryUserLookup};
pub use mongo::{MongoPageSource, MongoUserLookup, connect};
