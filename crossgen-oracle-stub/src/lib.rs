//! `Null` and `Stub` [`crossgen_oracle::Oracle`] implementations: no network, no
//! external process, used for tests and for offline (`oracle.enabled = false`) runs.

pub mod null_oracle;
pub mod stub_oracle;

pub use null_oracle::NullOracle;
pub use stub_oracle::StubOracle;
