//! Exchange descriptors
//!
//! - `types` - the descriptor model (`ExchangeDescriptor`, endpoint table, fees)
//! - `inherit` - deep merge of a partial fragment over a parent descriptor
//! - `registry` - descriptor documents by id, parent resolution

mod inherit;
mod registry;
mod types;

pub use inherit::{deep_merge, merge, PartialDescriptor};
pub use registry::DescriptorRegistry;
pub use types::{
    AccessClass, Capabilities, EndpointTable, ExchangeDescriptor, Fees, HttpMethod, TradingFees,
    Urls,
};
