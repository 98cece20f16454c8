//! Service-provider-interface crate for the external word-pattern oracle: the [`Oracle`]
//! trait, its budget accounting, and the [`OracleAdapter`] the solver calls through.
//! Concrete backends live in `crossgen-oracle-stub` and `crossgen-oracle-http`.

pub mod adapter;
pub mod budget;
pub mod error;
pub mod kinds;
pub mod oracle;

pub use adapter::OracleAdapter;
pub use budget::{CallBudget, CallRecord};
pub use error::OracleError;
pub use oracle::{Clue, Oracle, Word};
