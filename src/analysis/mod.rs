//! Analysis modules.
//!
//! Collection turns milestones into assignment groups; aggregation turns
//! those groups into a name registry and a symmetric count matrix.

pub mod aggregator;
pub mod collect;
pub mod registry;

pub use aggregator::*;
pub use collect::collect_assignments;
pub use registry::Tally;
