use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::reward::{Reward, RewardDraft, RewardInput};
use super::task_data::{TaskData, TaskDataInput};
use crate::error::{Error, Result};
use crate::images;

/// Kind of quest a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Visit an external page.
    Visit,
    /// Join or open a Telegram chat/channel.
    Telegram,
    /// Invite friends.
    Referral,
}

impl TaskType {
    /// Wire/database name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Visit => "VISIT",
            TaskType::Telegram => "TELEGRAM",
            TaskType::Referral => "REFERRAL",
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VISIT" => Ok(TaskType::Visit),
            "TELEGRAM" => Ok(TaskType::Telegram),
            "REFERRAL" => Ok(TaskType::Referral),
            other => Err(Error::InvalidArgument(format!(
                "Unknown task type: {}",
                other
            ))),
        }
    }
}

/// A quest definition with its rewards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub points: Option<i64>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub category: String,
    pub image: String,
    pub call_to_action: String,
    pub task_data: TaskData,
    pub is_active: bool,
    pub rewards: Vec<Reward>,
}

/// A task annotated with the calling user's completion state.
///
/// Tasks the user has not started carry a null timestamp and
/// `isCompleted: false`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTask {
    #[serde(flatten)]
    pub task: Task,
    pub task_start_timestamp: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

/// Inbound wire shape of a task on create/update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Present on the body-variant update endpoint.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub category: String,
    pub image: String,
    pub call_to_action: String,
    #[serde(default)]
    pub task_data: TaskDataInput,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub rewards: Option<Vec<RewardInput>>,
}

impl TaskInput {
    /// Validate the full payload, mirroring the admin form's schema:
    /// bounded title/description, non-negative points, catalog image,
    /// non-empty category and call-to-action, type-checked task data, and
    /// a non-empty reward list.
    pub fn validate(&self) -> Result<TaskDraft> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > 100 {
            return Err(Error::Validation(
                "Title is required and must be at most 100 characters".to_string(),
            ));
        }

        let description = self.description.trim();
        if description.is_empty() || description.chars().count() > 200 {
            return Err(Error::Validation(
                "Description is required and must be at most 200 characters".to_string(),
            ));
        }

        if let Some(points) = self.points {
            if points < 0 {
                return Err(Error::Validation(
                    "Points must be a non-negative number".to_string(),
                ));
            }
        }

        if self.category.trim().is_empty() {
            return Err(Error::Validation("Category is required".to_string()));
        }
        if self.call_to_action.trim().is_empty() {
            return Err(Error::Validation("Call to action is required".to_string()));
        }

        let image = self.image.trim();
        if image.is_empty() {
            return Err(Error::Validation("Image is required".to_string()));
        }
        if !images::is_catalog_image(image) {
            return Err(Error::Validation(format!(
                "Unknown image '{}': must reference the image catalog",
                image
            )));
        }

        let task_data = TaskData::from_input(self.task_type, &self.task_data)?;

        let reward_inputs = match self.rewards.as_deref() {
            Some(rewards) if !rewards.is_empty() => rewards,
            _ => {
                return Err(Error::Validation(
                    "rewards must be a non-empty array".to_string(),
                ))
            }
        };
        let rewards = reward_inputs
            .iter()
            .map(RewardInput::validate)
            .collect::<Result<Vec<_>>>()?;

        Ok(TaskDraft {
            title: title.to_string(),
            description: description.to_string(),
            points: self.points,
            task_type: self.task_type,
            category: self.category.trim().to_string(),
            image: image.to_string(),
            call_to_action: self.call_to_action.trim().to_string(),
            task_data,
            is_active: self.is_active.unwrap_or(true),
            rewards,
        })
    }
}

/// Validated task payload, ready for persistence.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub points: Option<i64>,
    pub task_type: TaskType,
    pub category: String,
    pub image: String,
    pub call_to_action: String,
    pub task_data: TaskData,
    pub is_active: bool,
    pub rewards: Vec<RewardDraft>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RewardType;

    fn sample_input() -> TaskInput {
        serde_json::from_value(serde_json::json!({
            "title": "Join channel",
            "description": "Join our Telegram channel",
            "type": "TELEGRAM",
            "category": "social",
            "image": "telegram",
            "callToAction": "Join now",
            "taskData": {"chatId": "news"},
            "rewards": [{
                "title": "XP",
                "description": "Experience points",
                "type": "XP",
                "amount": 100
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_input_defaults_is_active() {
        let draft = sample_input().validate().unwrap();
        assert!(draft.is_active);
        assert_eq!(draft.rewards.len(), 1);
        assert_eq!(draft.rewards[0].reward_type, RewardType::Xp);
        assert_eq!(
            draft.task_data,
            TaskData::Telegram {
                link: None,
                chat_id: Some("news".to_string())
            }
        );
    }

    #[test]
    fn test_missing_rewards_rejected() {
        let mut input = sample_input();
        input.rewards = None;
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_rewards_rejected() {
        let mut input = sample_input();
        input.rewards = Some(vec![]);
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_title_length_bound() {
        let mut input = sample_input();
        input.title = "x".repeat(101);
        assert!(input.validate().is_err());

        input.title = "x".repeat(100);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_negative_points_rejected() {
        let mut input = sample_input();
        input.points = Some(-1);
        assert!(input.validate().is_err());

        input.points = Some(0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_unknown_image_rejected() {
        let mut input = sample_input();
        input.image = "not-in-catalog".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_task_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskType::Referral).unwrap(),
            "\"REFERRAL\""
        );
        assert_eq!("VISIT".parse::<TaskType>().unwrap(), TaskType::Visit);
        assert!("UNKNOWN".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            points: None,
            task_type: TaskType::Visit,
            category: "c".to_string(),
            image: "crystal1".to_string(),
            call_to_action: "go".to_string(),
            task_data: TaskData::Visit { link: None },
            is_active: true,
            rewards: vec![],
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("callToAction").is_some());
        assert!(json.get("isActive").is_some());
        assert_eq!(json["type"], "VISIT");
    }
}
