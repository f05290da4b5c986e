use std::collections::HashMap;

use anyhow::{Context, Result};
use url::Url;

/// Resolves a peer service name to the base URL it is reachable at.
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, service: &str) -> Option<Url>;
}

/// Resolver backed by a fixed name → address table, usually the `peers`
/// section of the configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    peers: HashMap<String, Url>,
}

impl StaticResolver {
    pub fn new(peers: &HashMap<String, String>) -> Result<Self> {
        let mut resolver = Self::default();
        for (name, address) in peers {
            resolver = resolver.with_peer(name, address)?;
        }
        Ok(resolver)
    }

    pub fn with_peer(mut self, name: &str, address: &str) -> Result<Self> {
        let url = Url::parse(address)
            .with_context(|| format!("Invalid address for peer {}: {}", name, address))?;
        self.peers.insert(normalize(name), url);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl ServiceResolver for StaticResolver {
    fn resolve(&self, service: &str) -> Option<Url> {
        self.peers.get(&normalize(service)).cloned()
    }
}

/// `QUIZ_SERVICE`, `quiz_service` and `quiz-service` all name the same peer.
fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}
