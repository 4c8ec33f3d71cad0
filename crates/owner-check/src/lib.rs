//! The ownership check pipeline: derive the token account, query it through
//! the proxy, submit the signed response to the verifier and compare what the
//! verifier recorded with what was derived locally.

mod errors;
mod flow;
mod params;

pub use errors::FlowError;
pub use flow::{compare, decode, derive, query, run, submit, FlowOutcome};
pub use params::OwnerCheckParams;
