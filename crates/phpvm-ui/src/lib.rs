//! Terminal UI helpers for phpvm.
//!
//! Consistent status lines, warnings, structured error display and
//! download progress for the phpvm CLI.

pub mod output;
pub mod spinner;
pub mod style;

pub use output::{Output, Verbosity};
pub use spinner::{Progress, Spinner};
pub use style::{Style, configure_colors};
