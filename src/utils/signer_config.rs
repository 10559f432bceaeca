//! Signer Configuration
//!
//! Process-wide settings for signature handling:
//! - Presets (standard, strict)
//! - Runtime updates behind a lock
//! - Validation of setting combinations
//!
//! No setting changes the bytes of any encoding or digest; they only govern
//! which signatures are accepted on recovery and how logs are rendered.

use std::sync::RwLock;

lazy_static::lazy_static! {
    static ref SIGNER_CONFIG: SignerConfig = SignerConfig::new();
}

/// Global signer configuration
pub fn signer_config() -> &'static SignerConfig {
    &SIGNER_CONFIG
}

/// Configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// Accepts every signature shape the recovery functions understand
    Standard,
    /// Refuses compact and malleable (high-s) signatures
    Strict,
    /// User-defined settings
    Custom,
}

/// Signer settings
#[derive(Debug, Clone)]
pub struct SignerSettings {
    /// Preset these settings came from
    pub level: ConfigLevel,
    /// Redact secrets, addresses and digests in log fields
    pub redact_logs: bool,
    /// Accept 64-byte EIP-2098 compact signatures on recovery
    pub accept_compact_signatures: bool,
    /// Refuse signatures whose `s` lies in the upper half of the curve order
    pub reject_high_s: bool,
}

impl Default for SignerSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl SignerSettings {
    /// Standard preset
    pub fn standard() -> Self {
        Self {
            level: ConfigLevel::Standard,
            redact_logs: true,
            accept_compact_signatures: true,
            reject_high_s: false,
        }
    }

    /// Strict preset
    pub fn strict() -> Self {
        Self {
            level: ConfigLevel::Strict,
            redact_logs: true,
            accept_compact_signatures: false,
            reject_high_s: true,
        }
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.redact_logs {
            warnings.push("Warning: Log redaction disabled; digests and addresses will be logged in full".to_string());
        }
        if self.accept_compact_signatures && self.reject_high_s {
            warnings.push(
                "Warning: Compact signatures always encode low-s; high-s rejection only affects 65-byte signatures"
                    .to_string(),
            );
        }

        warnings
    }
}

/// Lock-guarded settings holder
pub struct SignerConfig {
    config: RwLock<SignerSettings>,
}

impl SignerConfig {
    /// Create with default settings
    pub fn new() -> Self {
        Self {
            config: RwLock::new(SignerSettings::default()),
        }
    }

    /// Create with a specific preset
    pub fn with_level(level: ConfigLevel) -> Self {
        Self {
            config: RwLock::new(Self::preset(level)),
        }
    }

    fn preset(level: ConfigLevel) -> SignerSettings {
        match level {
            ConfigLevel::Standard | ConfigLevel::Custom => SignerSettings::standard(),
            ConfigLevel::Strict => SignerSettings::strict(),
        }
    }

    /// Current settings
    pub fn settings(&self) -> SignerSettings {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| SignerSettings::standard())
    }

    /// Apply a preset
    pub fn set_level(&self, level: ConfigLevel) {
        let Ok(mut config) = self.config.write() else { return };
        *config = match level {
            ConfigLevel::Custom => {
                let mut current = config.clone();
                current.level = ConfigLevel::Custom;
                current
            }
            other => Self::preset(other),
        };
    }

    /// Update settings in place; returns consistency warnings
    pub fn update<F>(&self, updater: F) -> Vec<String>
    where
        F: FnOnce(&mut SignerSettings),
    {
        let Ok(mut config) = self.config.write() else {
            return vec!["Failed to acquire config lock".to_string()];
        };
        config.level = ConfigLevel::Custom;
        updater(&mut config);

        let warnings = config.validate();
        for warning in &warnings {
            crate::log_warn!("signer_config", warning.as_str());
        }
        warnings
    }

    /// Whether log fields are redacted
    pub fn redacts_logs(&self) -> bool {
        self.config.read().map(|c| c.redact_logs).unwrap_or(true)
    }

    /// Whether 64-byte compact signatures are accepted
    pub fn accepts_compact_signatures(&self) -> bool {
        self.config
            .read()
            .map(|c| c.accept_compact_signatures)
            .unwrap_or(false)
    }

    /// Whether high-s signatures are refused
    pub fn rejects_high_s(&self) -> bool {
        self.config.read().map(|c| c.reject_high_s).unwrap_or(true)
    }
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self::new()
    }
}
