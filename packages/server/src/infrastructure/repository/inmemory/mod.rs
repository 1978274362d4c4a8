//! インメモリ Repository 実装

mod relay;

pub use relay::InMemoryRelayRepository;
