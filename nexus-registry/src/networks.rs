//! Static chain table for every network Nexus is deployed to.
//!
//! The table is the single source of truth for the mapping between EIP-155
//! chain IDs and the canonical names used as keys in the shared registry
//! document. It is immutable for the lifetime of the process.

use std::collections::BTreeSet;
use std::fmt;

use crate::Error;

/// Environment prefixes accepted in front of a qualified chain name
/// (`main-base`, `staging-op`, ...).
const QUALIFIED_PREFIXES: &[&str] = &["main-", "demo-", "staging-"];

/// Short names that resolve to a canonical chain name.
const ALIASES: &[(&str, &str)] = &[("op", "optimism")];

/// A chain Nexus is deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Chain {
    /// Ethereum Mainnet (chain ID 1).
    Ethereum,
    /// Optimism Mainnet (chain ID 10).
    Optimism,
    /// BNB Smart Chain (chain ID 56).
    Bsc,
    /// Gnosis Chain (chain ID 100).
    Gnosis,
    /// Polygon PoS (chain ID 137).
    Polygon,
    /// Base Mainnet (chain ID 8453).
    Base,
    /// Arbitrum One (chain ID 42161).
    Arbitrum,
    /// Avalanche C-Chain (chain ID 43114).
    Avalanche,
    /// Polygon Amoy testnet (chain ID 80002).
    Amoy,
    /// Base Sepolia testnet (chain ID 84532).
    BaseSepolia,
    /// Arbitrum Sepolia testnet (chain ID 421614).
    ArbitrumSepolia,
    /// Ethereum Sepolia testnet (chain ID 11155111).
    Sepolia,
    /// Optimism Sepolia testnet (chain ID 11155420).
    OptimismSepolia,
}

impl Chain {
    /// All configured chains.
    pub const ALL: &[Self] = &[
        Self::Ethereum,
        Self::Optimism,
        Self::Bsc,
        Self::Gnosis,
        Self::Polygon,
        Self::Base,
        Self::Arbitrum,
        Self::Avalanche,
        Self::Amoy,
        Self::BaseSepolia,
        Self::ArbitrumSepolia,
        Self::Sepolia,
        Self::OptimismSepolia,
    ];

    /// Returns the EIP-155 chain ID.
    #[must_use]
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Optimism => 10,
            Self::Bsc => 56,
            Self::Gnosis => 100,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Arbitrum => 42161,
            Self::Avalanche => 43114,
            Self::Amoy => 80002,
            Self::BaseSepolia => 84532,
            Self::ArbitrumSepolia => 421_614,
            Self::Sepolia => 11_155_111,
            Self::OptimismSepolia => 11_155_420,
        }
    }

    /// Returns the canonical name, which doubles as the network key in the
    /// registry document and as the artifact file stem.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Optimism => "Optimism",
            Self::Bsc => "BSC",
            Self::Gnosis => "Gnosis",
            Self::Polygon => "Polygon",
            Self::Base => "Base",
            Self::Arbitrum => "Arbitrum",
            Self::Avalanche => "Avalanche",
            Self::Amoy => "Amoy",
            Self::BaseSepolia => "BaseSepolia",
            Self::ArbitrumSepolia => "ArbitrumSepolia",
            Self::Sepolia => "Sepolia",
            Self::OptimismSepolia => "OptimismSepolia",
        }
    }

    /// Whether this chain is a testnet.
    #[must_use]
    pub const fn is_testnet(self) -> bool {
        matches!(
            self,
            Self::Amoy
                | Self::BaseSepolia
                | Self::ArbitrumSepolia
                | Self::Sepolia
                | Self::OptimismSepolia
        )
    }

    /// Look up a [`Chain`] by its EIP-155 chain ID.
    ///
    /// Returns [`None`] if the chain ID is not configured.
    #[must_use]
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.iter().find(|c| c.chain_id() == chain_id).copied()
    }

    /// Resolve an environment-qualified chain name such as `main-base` or
    /// `staging-op` back to a [`Chain`].
    ///
    /// A leading `main-`, `demo-` or `staging-` prefix is stripped, the
    /// `op` alias is expanded, and the remainder is compared against the
    /// canonical names ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChainNotFound`] if nothing matches.
    pub fn from_qualified_name(qualified: &str) -> Result<Self, Error> {
        let lowered = qualified.trim().to_ascii_lowercase();
        let bare = QUALIFIED_PREFIXES
            .iter()
            .find_map(|prefix| lowered.strip_prefix(*prefix))
            .unwrap_or(lowered.as_str());
        let resolved = ALIASES
            .iter()
            .find(|(alias, _)| *alias == bare)
            .map_or(bare, |(_, name)| *name);

        Self::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(resolved))
            .copied()
            .ok_or_else(|| Error::ChainNotFound(qualified.to_owned()))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the canonical name for `chain_id`.
///
/// # Errors
///
/// Returns [`Error::UnknownChain`] if the chain ID is not configured.
pub fn name_for(chain_id: u64) -> Result<&'static str, Error> {
    Chain::from_chain_id(chain_id)
        .map(Chain::name)
        .ok_or(Error::UnknownChain(chain_id))
}

/// Returns every configured chain ID.
#[must_use]
pub fn all_chain_ids() -> BTreeSet<u64> {
    Chain::ALL.iter().map(|c| c.chain_id()).collect()
}

/// Resolve an environment-qualified chain name to its chain ID.
///
/// # Errors
///
/// Returns [`Error::ChainNotFound`] if the name does not match any chain.
pub fn chain_id_from_qualified_name(qualified: &str) -> Result<u64, Error> {
    Chain::from_qualified_name(qualified).map(Chain::chain_id)
}
