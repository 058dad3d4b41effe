// leaflink-api: Async clients for the Leaflink backend, broker, and weather services

pub mod broker;
pub mod error;
pub mod rest;
pub mod weather;

pub use broker::{BrokerConfig, BrokerEvent, BrokerLink, SensorReport, TopicSet};
pub use error::Error;
pub use rest::RestClient;
pub use weather::WeatherClient;
