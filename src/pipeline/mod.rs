//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each is testable alone and
//! the external collaborators (HTTP, PDF engine, viewer) sit behind traits.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ fetch ──▶ render ──▶ export ──▶ preview
//!  (URL)      (HTTP)    (comrak)   (engine)    (viewer)
//! ```
//!
//! 1. [`classify`] : recognise a GitHub Markdown URL, derive the raw URL
//! 2. [`fetch`]    : one GET for the Markdown text; non-200 is fatal
//! 3. [`render`]   : Markdown → self-contained HTML ([`template`] holds the
//!    fixed stylesheet)
//! 4. [`export`]   : scratch HTML file + [`engine`] run → PDF on disk
//! 5. [`preview`]  : open the PDF; failures are logged, never fatal

pub mod classify;
pub mod engine;
pub mod export;
pub mod fetch;
pub mod preview;
pub mod render;
pub mod template;
