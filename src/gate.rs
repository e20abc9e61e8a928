//! Token-gated octave range
//!
//! Holding a non-zero balance of a fixed token on a fixed chain unlocks a wider
//! keyboard. The wallet itself is an external collaborator behind [`TokenGate`];
//! any failure along the way leaves the keyboard at its default range.

use crate::error::KeyglowError;
use serde::{Deserialize, Serialize};

/// Wallet and chain access
pub trait TokenGate {
    /// Ask the wallet for an account; returns its address
    fn connect(&mut self) -> Result<String, KeyglowError>;

    fn switch_chain(&mut self, chain_id: u64) -> Result<(), KeyglowError>;

    /// Read-only `balanceOf(address)` on `contract`
    fn balance_of(&self, contract: &str, address: &str) -> Result<u128, KeyglowError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GateConfig {
    pub chain_id: u64,
    pub token_contract: String,
    /// Octave count once unlocked
    pub extended_octaves: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            chain_id: 8453,
            token_contract: String::new(),
            extended_octaves: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OctaveAccess {
    #[default]
    Default,
    Extended,
}

impl OctaveAccess {
    pub fn from_balance(balance: u128) -> Self {
        if balance > 0 {
            OctaveAccess::Extended
        } else {
            OctaveAccess::Default
        }
    }

    pub fn octave_count(self, default_octaves: usize, extended_octaves: usize) -> usize {
        match self {
            OctaveAccess::Default => default_octaves,
            OctaveAccess::Extended => extended_octaves.max(default_octaves),
        }
    }
}

fn query_balance(gate: &mut dyn TokenGate, config: &GateConfig) -> Result<u128, KeyglowError> {
    if config.token_contract.trim().is_empty() {
        return Err(KeyglowError::Gate("no token contract configured".to_string()));
    }
    let address = gate.connect()?;
    gate.switch_chain(config.chain_id)?;
    gate.balance_of(&config.token_contract, &address)
}

/// Connect, switch chain, read the balance. Every failure degrades to `Default`.
pub fn check_access(gate: &mut dyn TokenGate, config: &GateConfig) -> OctaveAccess {
    match query_balance(gate, config) {
        Ok(balance) => {
            let access = OctaveAccess::from_balance(balance);
            log::debug!(target: "gate", "balance {} -> {:?}", balance, access);
            access
        }
        Err(e) => {
            log::warn!(target: "gate", "token check failed, using default range: {}", e);
            OctaveAccess::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted wallet: each field is the answer its call gives
    struct ScriptedGate {
        address: Result<String, KeyglowError>,
        chain: Result<(), KeyglowError>,
        balance: Result<u128, KeyglowError>,
        switched_to: Option<u64>,
    }

    impl ScriptedGate {
        fn with_balance(balance: u128) -> Self {
            Self {
                address: Ok("0xabc".to_string()),
                chain: Ok(()),
                balance: Ok(balance),
                switched_to: None,
            }
        }
    }

    impl TokenGate for ScriptedGate {
        fn connect(&mut self) -> Result<String, KeyglowError> {
            self.address.clone()
        }

        fn switch_chain(&mut self, chain_id: u64) -> Result<(), KeyglowError> {
            self.switched_to = Some(chain_id);
            self.chain.clone()
        }

        fn balance_of(&self, contract: &str, address: &str) -> Result<u128, KeyglowError> {
            assert_eq!(contract, "0xtoken");
            assert_eq!(address, "0xabc");
            self.balance.clone()
        }
    }

    fn config() -> GateConfig {
        GateConfig {
            token_contract: "0xtoken".to_string(),
            ..GateConfig::default()
        }
    }

    #[test]
    fn test_non_zero_balance_unlocks() {
        let mut gate = ScriptedGate::with_balance(1);
        assert_eq!(check_access(&mut gate, &config()), OctaveAccess::Extended);
        assert_eq!(gate.switched_to, Some(8453));
    }

    #[test]
    fn test_zero_balance_stays_default() {
        let mut gate = ScriptedGate::with_balance(0);
        assert_eq!(check_access(&mut gate, &config()), OctaveAccess::Default);
    }

    #[test]
    fn test_failures_degrade_to_default() {
        let mut no_wallet = ScriptedGate::with_balance(10);
        no_wallet.address = Err(KeyglowError::Gate("no wallet".to_string()));
        assert_eq!(check_access(&mut no_wallet, &config()), OctaveAccess::Default);

        let mut wrong_chain = ScriptedGate::with_balance(10);
        wrong_chain.chain = Err(KeyglowError::Gate("user rejected".to_string()));
        assert_eq!(check_access(&mut wrong_chain, &config()), OctaveAccess::Default);

        let mut call_failed = ScriptedGate::with_balance(0);
        call_failed.balance = Err(KeyglowError::Gate("execution reverted".to_string()));
        assert_eq!(check_access(&mut call_failed, &config()), OctaveAccess::Default);

        let mut unconfigured = ScriptedGate::with_balance(10);
        assert_eq!(
            check_access(&mut unconfigured, &GateConfig::default()),
            OctaveAccess::Default
        );
    }

    #[test]
    fn test_octave_count() {
        assert_eq!(OctaveAccess::Default.octave_count(2, 4), 2);
        assert_eq!(OctaveAccess::Extended.octave_count(2, 4), 4);
        assert_eq!(OctaveAccess::Extended.octave_count(3, 1), 3);
    }
}
