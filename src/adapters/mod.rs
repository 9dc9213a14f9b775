//! Exchange adapters for the Liqui API family (Liqui, WEX)
//!
//! Descriptors say what an exchange offers; the dispatcher turns a logical
//! endpoint into a signed HTTP call; the classifier and normalisers turn
//! responses into typed failures or canonical records.

pub mod classifier;
pub mod descriptor;
pub mod dispatcher;
pub mod errors;
pub mod factory;
pub mod liqui;
pub mod signing;
pub mod traits;
pub mod transport;
pub mod types;
pub mod wex;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types for convenience
pub use classifier::{ApiFailure, FailureKind, ResponseClassifier, SuccessFlagClassifier, Verdict};
pub use descriptor::{AccessClass, DescriptorRegistry, ExchangeDescriptor, HttpMethod, PartialDescriptor};
pub use dispatcher::{Dispatcher, Params};
pub use errors::{ErrorKind, ExchangeError, ExchangeResult};
pub use factory::{create_client, create_client_with};
pub use liqui::LiquiAdapter;
pub use signing::{Credentials, HmacSigner, NonceSource, RequestSigner};
pub use traits::ExchangeClient;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    Balances, MarketInfo, Order, OrderRequest, OrderSide, OrderStatus, OrderType, Ticker,
};
