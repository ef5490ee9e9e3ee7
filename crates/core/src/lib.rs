// ── Data sources ──
pub mod clients;

// ── Pipeline ──
pub mod analyzer;
pub mod normalize;
pub mod pricing;
pub mod report;
pub mod risk;
pub mod scanner;
pub mod stats;
pub mod throttle;
pub mod valuation;

// ── Support ──
pub mod fmt;
pub mod workspace;

pub use analyzer::{validate_address, Analyzer};
pub use pricing::{PriceBook, PriceEngine, PricingSettings, PricingStage};
pub use report::WalletReport;
pub use scanner::ChainScanResult;
pub use workspace::init_workspace;
