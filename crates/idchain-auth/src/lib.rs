//! # idchain auth
//!
//! The root-action gate evaluated before any mutation of an identity chain.
//!
//! Every root action needs the owner's long phrase plus a number of
//! secondary factors that depends on the declared risk tier:
//!
//! | risk     | long phrase | secondary factors (of email OTP, TOTP, hardware key) |
//! |----------|-------------|------------------------------------------------------|
//! | `normal` | required    | at least 2                                           |
//! | `high`   | required    | all 3                                                |
//!
//! The policy is a pure predicate over an [`AuthContext`]. The chain engine
//! does not depend on it; callers evaluate it first.
//!
//! ```rust
//! use idchain_auth::{validate_root_action, AuthContext, RiskLevel};
//!
//! let ctx = AuthContext {
//!     long_phrase: true,
//!     email_otp: true,
//!     totp: true,
//!     hardware_key: false,
//!     risk: RiskLevel::Normal,
//! };
//! assert!(validate_root_action(&ctx).is_ok());
//! ```

pub mod error;
pub mod policy;

pub use error::{AuthError, Result};
pub use policy::{validate_root_action, AuthContext, RiskLevel};
