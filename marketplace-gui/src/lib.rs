//! Desktop client for the SimpleMarketplace NFT program on Aptos.
//!
//! The egui front end ([`app`], [`view`]) talks to a single background task
//! ([`service`]) through the enums in [`events`]. The service drives a
//! [`wallet::WalletProvider`] for identity and signing, and a
//! [`aptos_client::ChainClient`] for reads and confirmation.

pub mod app;
pub mod aptos_client;
pub mod config;
pub mod errors;
pub mod events;
pub mod marketplace;
pub mod service;
pub mod state;
pub mod view;
pub mod wallet;
