use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Kind of payout a reward grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardType {
    Xp,
    Token,
    Nft,
    Booster,
    MysteryBox,
}

impl RewardType {
    /// Wire/database name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Xp => "XP",
            RewardType::Token => "TOKEN",
            RewardType::Nft => "NFT",
            RewardType::Booster => "BOOSTER",
            RewardType::MysteryBox => "MYSTERY_BOX",
        }
    }
}

impl FromStr for RewardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "XP" => Ok(RewardType::Xp),
            "TOKEN" => Ok(RewardType::Token),
            "NFT" => Ok(RewardType::Nft),
            "BOOSTER" => Ok(RewardType::Booster),
            "MYSTERY_BOX" => Ok(RewardType::MysteryBox),
            other => Err(Error::InvalidArgument(format!(
                "Unknown reward type: {}",
                other
            ))),
        }
    }
}

/// A named, typed payout attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_active: bool,
}

/// Inbound wire shape of a reward on task create/update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardInput {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub amount: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl RewardInput {
    /// Validate the reward, applying the `isActive` default.
    pub fn validate(&self) -> Result<RewardDraft> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Reward title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation(
                "Reward description is required".to_string(),
            ));
        }
        if !(self.amount > 0.0) {
            return Err(Error::Validation(
                "Reward amount must be positive".to_string(),
            ));
        }

        Ok(RewardDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            reward_type: self.reward_type,
            amount: self.amount,
            image: self
                .image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Validated reward payload, ready for persistence.
#[derive(Debug, Clone)]
pub struct RewardDraft {
    pub title: String,
    pub description: String,
    pub reward_type: RewardType,
    pub amount: f64,
    pub image: Option<String>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> RewardInput {
        RewardInput {
            title: "XP".to_string(),
            description: "Experience points".to_string(),
            reward_type: RewardType::Xp,
            amount: 100.0,
            image: None,
            is_active: None,
        }
    }

    #[test]
    fn test_reward_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&RewardType::MysteryBox).unwrap(),
            "\"MYSTERY_BOX\""
        );
        assert_eq!("BOOSTER".parse::<RewardType>().unwrap(), RewardType::Booster);
        assert!("GOLD".parse::<RewardType>().is_err());
    }

    #[test]
    fn test_is_active_defaults_to_true() {
        let draft = sample_input().validate().unwrap();
        assert!(draft.is_active);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut input = sample_input();
        input.amount = 0.0;
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_nan_amount_rejected() {
        let mut input = sample_input();
        input.amount = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut input = sample_input();
        input.title = "   ".to_string();
        assert!(input.validate().is_err());
    }
}
