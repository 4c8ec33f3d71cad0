//! Query proxy: turns a query request into a guardian-signed response.
//!
//! The proxy only depends on an [`AccountSource`] for chain state. The mock
//! implementation serves state from memory and signs with locally held
//! guardian keys, the same shape a real proxy hands to its clients.

mod errors;
mod mock;
mod signed;
mod source;

pub use errors::ProxyError;
pub use mock::{MockQueryProxy, QueryProxy, MOCK_REQUEST_ID};
pub use signed::SignedQueryResponse;
pub use source::{AccountSource, AccountState, InMemoryAccountSource, SlotInfo, Snapshot};
