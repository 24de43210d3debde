//! Report rendering.
//!
//! Two independent views over the same outcome list: a delimited permission
//! matrix for at-a-glance reading (`matrix`) and a grouped YAML log that
//! preserves full error detail as the audit trail (`detail`). Both are pure
//! functions of the outcomes plus ordering inputs; neither touches the
//! network or mutates anything.

pub mod detail;
pub mod matrix;
