//! # Configuration
//!
//! A single [`Config`] struct carrying the recognized configuration options
//! and injected collaborators, passed by shared reference into
//! [`crate::did::DidManager`], [`crate::lifecycle::LifecycleManager`] and
//! [`crate::migration::MigrationManager`] constructors rather than read from
//! a global.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::provider::{FeeOracle, HttpFetch, OrdinalsClient, StorageAdapter};
use originals_keyring::Algorithm;

/// The Bitcoin-like network an asset's `btco` layer is anchored to.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network; DIDs use the bare `did:btco:` prefix.
    #[default]
    Mainnet,
    /// Regression-test network; DIDs use `did:btco:reg:`.
    Regtest,
    /// Signet; DIDs use `did:btco:sig:`.
    Signet,
}

impl Network {
    /// The `did:btco` prefix segment for this network (empty for mainnet).
    #[must_use]
    pub const fn did_prefix(self) -> &'static str {
        match self {
            Self::Mainnet => "did:btco:",
            Self::Regtest => "did:btco:reg:",
            Self::Signet => "did:btco:sig:",
        }
    }
}

/// Named webvh network, used to pick a default webvh domain and the
/// corresponding Bitcoin network for a later `btco` migration.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum WebvhNetwork {
    /// Maps to [`Network::Mainnet`].
    #[default]
    Mainnet,
    /// Maps to [`Network::Regtest`].
    Regtest,
    /// Maps to [`Network::Signet`].
    Signet,
}

impl WebvhNetwork {
    /// The Bitcoin network this webvh network maps to.
    #[must_use]
    pub const fn bitcoin_network(self) -> Network {
        match self {
            Self::Mainnet => Network::Mainnet,
            Self::Regtest => Network::Regtest,
            Self::Signet => Network::Signet,
        }
    }
}

/// SDK-wide configuration and injected collaborators.
///
/// Cloning a `Config` is cheap: collaborators are stored behind `Arc`.
#[derive(Clone, Default)]
pub struct Config {
    /// Bitcoin network for address parsing and BTCO prefix selection.
    /// Overrides the network implied by `webvh_network` when set.
    pub network: Option<Network>,

    /// Algorithm used by peer DID creation when none is specified.
    pub default_key_type: Algorithm,

    /// Named network determining the default webvh domain and the mapped
    /// Bitcoin network.
    pub webvh_network: WebvhNetwork,

    /// Base URL for the `OrdinalsClient`'s underlying RPC, if applicable to
    /// the concrete adapter in use.
    pub bitcoin_rpc_url: Option<String>,

    /// Injected fee-rate oracle, consulted by cost estimation ahead of the
    /// ordinals provider's own estimate.
    pub fee_oracle: Option<Arc<dyn FeeOracle>>,

    /// Injected Bitcoin ordinals collaborator (§6 `OrdinalsClient`).
    pub ordinals_provider: Option<Arc<dyn OrdinalsClient>>,

    /// Injected object storage collaborator (§6 `StorageAdapter`).
    pub storage_adapter: Option<Arc<dyn StorageAdapter>>,

    /// Injected HTTP fetch function, used by the `DocumentLoader` (§4.C) and
    /// `BtcoDidResolver` (§4.G) to dereference non-DID IRIs and inscription
    /// content.
    pub http_fetcher: Option<Arc<dyn HttpFetch>>,

    /// Gates `info`/`debug` level `tracing` output; `warn`/`error` are always
    /// emitted regardless of this flag.
    pub enable_logging: bool,
}

impl Config {
    /// The effective Bitcoin network: the explicit override if set, else the
    /// network implied by `webvh_network`.
    #[must_use]
    pub fn bitcoin_network(&self) -> Network {
        self.network.unwrap_or_else(|| self.webvh_network.bitcoin_network())
    }
}
