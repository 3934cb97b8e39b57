//! Render adapters.
//!
//! Each adapter turns a [`StyledCell`](crate::types::StyledCell) into what
//! one kind of surface needs:
//! - [`label`]: single-line grid cells with alignment and inline CSS
//! - [`wrapped`]: multi-line cells and per-row heights
//! - [`spreadsheet`]: export cells referring to interned cell formats
//!
//! All adapters go through [`StyleEngine::compute_style`](crate::StyleEngine::compute_style),
//! so a cell looks the same on every surface.

pub mod cache;
pub mod label;
pub mod spreadsheet;
pub mod wrapped;

pub use cache::StyleCache;
pub use label::{render_label, LabelCell};
pub use spreadsheet::{ExportCell, SpreadsheetStyler, StyleKey};
pub use wrapped::{render_wrapped, wrap_text, RowHeights, WrappedCell};
