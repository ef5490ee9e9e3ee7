//! Error types for WalletLens.
//!
//! Structured error model. Every error carries:
//! - **code**: machine-readable error code (e.g. `INVALID_ADDRESS`)
//! - **category**: error class (`validation`, `config`, `network`, `provider`, `system`)
//! - **recoverable**: whether the caller can retry or fix the input
//! - **hints**: actionable suggestions for recovery
//!
//! JSON output format:
//! ```json
//! {
//!   "ok": false,
//!   "error": {
//!     "code": "API_KEY_MISSING",
//!     "message": "API key missing for alchemy",
//!     "category": "config",
//!     "recoverable": true,
//!     "hints": ["Set ALCHEMY_API_KEY or run: walletlens config set-key alchemy <key>"]
//!   }
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Error category — determines exit code and recovery strategy.
///
/// Exit codes:
/// - `0`: success
/// - `1`: user error (validation, config)
/// - `2`: network / upstream provider error
/// - `3`: system error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Config,
    Network,
    Provider,
    System,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Validation => 1,
            ErrorCategory::Config => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::Provider => 2,
            ErrorCategory::System => 3,
        }
    }
}

/// Structured error detail for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// Top-level error type for all WalletLens operations.
#[derive(Debug, Error)]
pub enum LensError {
    // ── Validation (rejected before any network call) ────────────────
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    // ── Config ───────────────────────────────────────────────────────
    #[error("API key missing for {provider}")]
    ApiKeyMissing { provider: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Network ─────────────────────────────────────────────────────
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Provider ─────────────────────────────────────────────────────
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed provider response: {0}")]
    Decode(String),

    #[error("Price source error ({source_name}): {message}")]
    PriceSource { source_name: String, message: String },

    #[error("Failed to fetch {chain} data: {message}")]
    ChainFetch { chain: String, message: String },

    // ── System ───────────────────────────────────────────────────────
    #[error("Balance conversion error: {0}")]
    Conversion(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LensError {
    /// Get the structured error detail for JSON output.
    pub fn detail(&self) -> ErrorDetail {
        match self {
            LensError::InvalidAddress(addr) => ErrorDetail {
                code: "INVALID_ADDRESS".into(),
                message: self.to_string(),
                category: ErrorCategory::Validation,
                recoverable: true,
                hints: vec![format!(
                    "Expected 0x followed by 40 hex digits, got '{addr}'"
                )],
            },
            LensError::UnsupportedChain(_) => ErrorDetail {
                code: "UNSUPPORTED_CHAIN".into(),
                message: self.to_string(),
                category: ErrorCategory::Validation,
                recoverable: true,
                hints: vec!["List supported chains: walletlens chains".into()],
            },
            LensError::ApiKeyMissing { provider } => ErrorDetail {
                code: "API_KEY_MISSING".into(),
                message: self.to_string(),
                category: ErrorCategory::Config,
                recoverable: true,
                hints: vec![format!(
                    "Set {}_API_KEY or run: walletlens config set-key {provider} <key>",
                    provider.to_uppercase()
                )],
            },
            LensError::InvalidConfig(msg) => ErrorDetail {
                code: "INVALID_CONFIG".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                recoverable: true,
                hints: vec!["Check ~/.walletlens/config.toml or run: walletlens config show".into()],
            },
            LensError::RetriesExhausted { .. } => ErrorDetail {
                code: "RETRIES_EXHAUSTED".into(),
                message: self.to_string(),
                category: ErrorCategory::Network,
                recoverable: true,
                hints: vec!["Retry later — the provider may be throttling".into()],
            },
            LensError::Network(msg) => ErrorDetail {
                code: "NETWORK_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::Network,
                recoverable: true,
                hints: vec!["Check network connectivity".into()],
            },
            LensError::Rpc { .. } => ErrorDetail {
                code: "RPC_ERROR".into(),
                message: self.to_string(),
                category: ErrorCategory::Provider,
                recoverable: false,
                hints: vec![],
            },
            LensError::Decode(msg) => ErrorDetail {
                code: "DECODE_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::Provider,
                recoverable: false,
                hints: vec![],
            },
            LensError::PriceSource { .. } => ErrorDetail {
                code: "PRICE_SOURCE_ERROR".into(),
                message: self.to_string(),
                category: ErrorCategory::Provider,
                recoverable: true,
                hints: vec![],
            },
            LensError::ChainFetch { .. } => ErrorDetail {
                code: "CHAIN_FETCH_FAILED".into(),
                message: self.to_string(),
                category: ErrorCategory::Provider,
                recoverable: true,
                hints: vec![
                    "Verify the Alchemy API key and that the chain is enabled for it".into(),
                    "Inspect settings: walletlens config show".into(),
                ],
            },
            LensError::Conversion(msg) => ErrorDetail {
                code: "CONVERSION_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                recoverable: false,
                hints: vec![],
            },
            LensError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                recoverable: false,
                hints: vec![],
            },
        }
    }

    /// True for errors raised before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LensError::InvalidAddress(_)
                | LensError::UnsupportedChain(_)
                | LensError::ApiKeyMissing { .. }
                | LensError::InvalidConfig(_)
        )
    }

    /// Exit code: 0 success, 1 user error, 2 network/provider, 3 system.
    pub fn exit_code(&self) -> i32 {
        self.detail().category.exit_code()
    }

    /// Serialize this error as the JSON error envelope.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ok": false,
            "error": self.detail(),
        })
    }
}

pub type LensResult<T> = Result<T, LensError>;
