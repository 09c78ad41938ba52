use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// Embedded registry of well-known chains, parsed once on first access.
static CHAINS: LazyLock<Vec<ChainInfo>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("chains.json")).expect("embedded chain data is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainExplorer {
    pub name: String,
    pub url: String,
    pub standard: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub name: String,
    pub chain: String,
    pub short_name: String,
    pub chain_id: u64,
    pub network_id: u64,
    pub rpc: Vec<String>,
    pub native_currency: ChainCurrency,
    #[serde(default)]
    pub explorers: Vec<ChainExplorer>,
    #[serde(default)]
    pub info_url: String,
}

impl ChainInfo {
    pub fn explorer_url(&self) -> Option<&str> {
        self.explorers.first().map(|e| e.url.as_str())
    }

    pub fn transaction_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url().map(|base| format!("{base}/tx/{tx_hash}"))
    }
}

/// Looks up a chain by its chain id. The registry is static and read-only.
pub fn lookup(chain_id: u64) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}
