//! Text-panel output: number formatting, the artificial horizon and the
//! paged printer. Pure formatting; nothing here affects control.

pub mod format;
pub mod horizon;
pub mod printer;

pub use horizon::Horizon;
pub use printer::{transpose_status, Page, Printer};
