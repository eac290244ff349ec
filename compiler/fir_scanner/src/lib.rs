//! Demand-driven, layout-aware scanner for Fir.
//!
//! Fir is indentation-significant. This crate turns source text into
//! tokens one at a time for an incremental parser that says, at every
//! position, which token kinds it can accept:
//!
//! ```text
//! SourceBuffer ──► Cursor ──► Scanner::scan(cursor, requested) ──► Token
//!                               │
//!                               └── frame stack + flags ◄──► serialize / deserialize
//! ```
//!
//! Layout is synthesized from whitespace: block opens after `:`, statement
//! separators at line breaks, and block closes on dedent or before a
//! closing delimiter. The scanner also lexes strings with interpolation,
//! nested block comments, labels and character literals, identifiers,
//! keywords, integers and operators.
//!
//! The scanner's state is a small value that the host snapshots after every
//! token; [`Scanner::serialize`] and [`Scanner::deserialize`] move it through
//! a byte buffer of at most [`SERIALIZATION_BUFFER_SIZE`] bytes.
//!
//! Without a parser, [`Driver`] runs the scanner under a [`RequestPolicy`]
//! that chooses the requested kinds.

mod config;
mod cursor;
mod driver;
mod error;
mod frame;
mod scanner;
mod source_buffer;
mod state;
mod token;
mod token_set;

pub use config::{DelimiterPolicy, OverflowPolicy, ScannerConfig};
pub use cursor::Cursor;
pub use driver::{Driver, PermissivePolicy, RequestPolicy};
pub use error::{ScanError, StateError};
pub use frame::{Frame, FrameKind, FrameStack, StackFull, MAX_DEPTH};
pub use scanner::Scanner;
pub use source_buffer::{EncodingIssue, EncodingIssueKind, SourceBuffer};
pub use state::{ScannerState, SERIALIZATION_BUFFER_SIZE};
pub use token::{Span, Token, TokenKind};
pub use token_set::{TokenSet, TokenSetIterator};
