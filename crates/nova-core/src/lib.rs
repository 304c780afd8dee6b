//! Shared infrastructure for the header compiler: interned names, text
//! positions, diagnostics, path handling, and source discovery.
//!
//! This crate is intentionally small: it holds only cross-cutting types that
//! every stage of the compiler touches, never binding or lowering logic.

mod diagnostic;
mod fs;
mod id;
mod name;
mod panic_util;
mod path;
mod text;

pub use diagnostic::{Diagnostic, Location, RelatedDiagnostic, Severity};
pub use fs::collect_files_with_extension;
pub use id::{Arena, FileId, Idx};
pub use name::{InternedName, Name, NameInterner, SymbolName};
pub use panic_util::{panic_payload_to_str, panic_payload_to_string, NON_STRING_PANIC_PAYLOAD};
pub use path::{AbsPathBuf, AbsPathError};
pub use text::{LineCol, LineIndex, TextRange, TextSize};

