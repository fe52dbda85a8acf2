//! Root-action policy: long phrase plus 2FA or 3FA by risk tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, Result};

/// Caller-declared sensitivity of an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Normal,
    High,
}

impl RiskLevel {
    /// Secondary factors required at this tier.
    pub fn required_factors(self) -> usize {
        match self {
            RiskLevel::Normal => 2,
            RiskLevel::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Normal => "normal",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" => Ok(RiskLevel::Normal),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Authentication evidence presented with a root action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthContext {
    pub long_phrase: bool,
    pub email_otp: bool,
    pub totp: bool,
    pub hardware_key: bool,
    pub risk: RiskLevel,
}

impl AuthContext {
    /// Number of secondary factors presented.
    pub fn secondary_factors(&self) -> usize {
        [self.email_otp, self.totp, self.hardware_key]
            .into_iter()
            .filter(|present| *present)
            .count()
    }
}

/// Accept or reject a root action.
pub fn validate_root_action(ctx: &AuthContext) -> Result<()> {
    if !ctx.long_phrase {
        return Err(AuthError::InsufficientFactors(
            "long phrase is required".into(),
        ));
    }

    let have = ctx.secondary_factors();
    let need = ctx.risk.required_factors();
    if have < need {
        return Err(AuthError::InsufficientFactors(format!(
            "{} risk requires {need} secondary factors, got {have}",
            ctx.risk
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(long_phrase: bool, email_otp: bool, totp: bool, hardware_key: bool, risk: RiskLevel) -> AuthContext {
        AuthContext {
            long_phrase,
            email_otp,
            totp,
            hardware_key,
            risk,
        }
    }

    #[test]
    fn test_truth_table() {
        for bits in 0u8..8 {
            let (email, totp, hw) = (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let count = bits.count_ones() as usize;

            for risk in [RiskLevel::Normal, RiskLevel::High] {
                let without_phrase = validate_root_action(&ctx(false, email, totp, hw, risk));
                assert!(without_phrase.is_err(), "bits={bits:03b} risk={risk}");

                let with_phrase = validate_root_action(&ctx(true, email, totp, hw, risk));
                let expected = count >= risk.required_factors();
                assert_eq!(with_phrase.is_ok(), expected, "bits={bits:03b} risk={risk}");
            }
        }
    }

    #[test]
    fn test_two_factors_normal_vs_high() {
        let normal = ctx(true, true, true, false, RiskLevel::Normal);
        assert!(validate_root_action(&normal).is_ok());

        let high = AuthContext {
            risk: RiskLevel::High,
            ..normal
        };
        assert!(matches!(
            validate_root_action(&high),
            Err(AuthError::InsufficientFactors(_))
        ));
    }

    #[test]
    fn test_missing_long_phrase_rejected_regardless_of_risk() {
        for risk in [RiskLevel::Normal, RiskLevel::High] {
            let err = validate_root_action(&ctx(false, true, true, true, risk)).unwrap_err();
            assert_eq!(
                err,
                AuthError::InsufficientFactors("long phrase is required".into())
            );
        }
    }

    #[test]
    fn test_context_json_defaults() {
        let parsed: AuthContext =
            serde_json::from_str(r#"{"long_phrase":true,"totp":true,"risk":"high"}"#).unwrap();
        assert_eq!(parsed, ctx(true, false, true, false, RiskLevel::High));

        let empty: AuthContext = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AuthContext::default());
        assert_eq!(empty.risk, RiskLevel::Normal);
    }

    #[test]
    fn test_risk_parse() {
        assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("extreme".parse::<RiskLevel>().is_err());
    }

    proptest! {
        #[test]
        fn test_adding_a_factor_never_revokes(
            email in any::<bool>(),
            totp in any::<bool>(),
            high in any::<bool>(),
        ) {
            let risk = if high { RiskLevel::High } else { RiskLevel::Normal };
            let before = validate_root_action(&ctx(true, email, totp, false, risk));
            let after = validate_root_action(&ctx(true, email, totp, true, risk));
            prop_assert!(before.is_err() || after.is_ok());
        }
    }
}
