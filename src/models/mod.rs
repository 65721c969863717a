//! Process-local data model: transaction shapes, relay outcomes, and the
//! top-level error taxonomy.

mod error;
pub use error::*;

mod relay;
pub use relay::*;

mod transaction;
pub use transaction::*;
