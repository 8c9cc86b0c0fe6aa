//! messylib commons - file, archive, config and memory helpers.
//!
//! Every function here is a standalone convenience; nothing keeps state between
//! calls. Progress that used to be printed is emitted through `tracing`.

pub mod archive;
pub mod configs;
pub mod error;
pub mod files;
pub mod memory;
pub mod natsort;

pub use error::{CommonsError, Result};
