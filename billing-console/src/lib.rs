//! Customer balance ledger workspace
//!
//! Everything an operator does on one customer's billing screen:
//! - Renewal period arithmetic
//! - Payment, balance adjustment and add-on forms with their projections
//! - Bill drafts staged from plans, subscriptions or a fixed amount
//! - Transaction history with the single-entry deletion rule
//! - `CustomerWorkspace`, which runs the remote round trips and reloads

pub mod addon;
pub mod adjustment;
pub mod context;
pub mod draft;
pub mod error;
pub mod form;
pub mod history;
pub mod input;
pub mod payment;
pub mod plans;
pub mod projection;
pub mod renewal;
pub mod section;
pub mod workspace;

pub use addon::*;
pub use adjustment::*;
pub use context::*;
pub use draft::*;
pub use error::*;
pub use form::*;
pub use history::*;
pub use payment::*;
pub use plans::*;
pub use projection::*;
pub use renewal::*;
pub use section::*;
pub use workspace::*;
