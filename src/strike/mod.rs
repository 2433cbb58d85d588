pub mod executor;
pub mod jupiter;
pub mod rpc;
pub mod simulator;
pub mod wallet;

pub use executor::SnipeExecutor;
pub use jupiter::JupiterClient;
pub use rpc::ChainClient;
pub use simulator::TransactionSimulator;
