//! Typed method registry and message-shape contract for a language server
//! protocol carried over JSON-RPC.
//!
//! The crate associates each wire method name with exactly one direction
//! (request or notification) and one set of payload shapes, and provides the
//! value model needed for fields whose legal shape is a closed union of
//! alternatives. It performs no I/O: a transport hands whole message payloads
//! in and takes validated [`Envelope`]s out.
//!
//! ```
//! use lspwire::catalog::Profile;
//! use serde_json::json;
//!
//! # fn main() -> lspwire::Result<()> {
//! let registry = Profile::Standard.registry()?;
//! let envelope = registry.build_request(
//!     "textDocument/hover",
//!     json!({
//!         "textDocument": {"uri": "file:///a.txt"},
//!         "position": {"line": 2, "character": 4},
//!     }),
//! )?;
//! assert_eq!(envelope.method, "textDocument/hover");
//! # Ok(())
//! # }
//! ```

mod error;
mod registry;
mod shape;
mod types;

pub mod catalog;

pub use error::*;
pub use registry::*;
pub use shape::*;
pub use types::*;
