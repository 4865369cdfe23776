//! Spam protection backed by StopForumSpam.
//!
//! Checks IP addresses, email addresses and usernames against the
//! StopForumSpam database and decides whether they look like spam sources.
//! Spam reports can be submitted to the same service.
//!
//! # Features
//!
//! - **Lookups** - one request per subject, no caching or batching
//! - **Frequency Thresholds** - spam once a subject has enough reports, with
//!   presets from `strict` (1) to `low` (10)
//! - **Confidence Thresholds** - optionally also require the service's own
//!   confidence score to clear a bar
//! - **Tor Exit Nodes** - choose whether Tor exit nodes count as spam sources
//! - **Reports** - submit spammers with evidence (requires an API key)
//!
//! # Example
//!
//! ```no_run
//! use spam_protection::{SpamProtection, ThresholdPreset};
//!
//! # async fn run() -> spam_protection::Result<()> {
//! let client = SpamProtection::builder()
//!     .threshold_preset(ThresholdPreset::High)
//!     .allow_tor_nodes(false)
//!     .build()?;
//!
//! if client.check_email("someone@example.com").await? {
//!     println!("spam");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod query;
pub mod response;
pub mod subject;
pub mod transport;

pub use client::{SpamProtection, SpamProtectionBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use policy::{classify, ClassificationPolicy, ThresholdPreset};
pub use response::ReputationRecord;
pub use subject::{Subject, SubjectType};
pub use transport::{HttpTransport, Transport, TransportError};
