//! Sales aggregation.
//!
//! Responsibilities:
//!
//! - coerce text rows into typed records (`normalize`)
//! - restrict to one branch (`filter`)
//! - per-product metrics (`products`)
//! - monthly units series (`monthly`) and its linear trend (`trend`)

pub mod filter;
pub mod monthly;
pub mod normalize;
pub mod products;
pub mod trend;

pub use filter::*;
pub use monthly::*;
pub use normalize::*;
pub use products::*;
pub use trend::*;
