use serde::{Deserialize, Serialize, Serializer};
use url::Url;

use super::task::TaskType;
use crate::error::{Error, Result};

/// Type-specific task payload, keyed by the task's [`TaskType`].
///
/// The wire format is the loose object `{link?, chatId?, friendsNumber?}`;
/// conversion keeps only the fields meaningful for the task's type and
/// validates them. Fields irrelevant to the type are dropped, not rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskData {
    /// Visit an external page.
    Visit {
        link: Option<Url>,
    },
    /// Join or open a Telegram chat/channel.
    Telegram {
        link: Option<Url>,
        chat_id: Option<String>,
    },
    /// Invite a number of friends.
    Referral {
        friends_number: Option<u32>,
    },
}

/// Inbound (and stored) wire shape of a task payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDataInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friends_number: Option<i64>,
}

impl TaskData {
    /// Convert and validate a wire payload against the task's type.
    pub fn from_input(task_type: TaskType, input: &TaskDataInput) -> Result<Self> {
        let link = match normalize(&input.link) {
            Some(raw) => Some(
                Url::parse(&raw)
                    .map_err(|_| Error::Validation("link must be a valid URL".to_string()))?,
            ),
            None => None,
        };

        match task_type {
            TaskType::Visit => Ok(TaskData::Visit { link }),
            TaskType::Telegram => Ok(TaskData::Telegram {
                link,
                chat_id: normalize(&input.chat_id),
            }),
            TaskType::Referral => {
                let friends_number = match input.friends_number {
                    Some(n) if n >= 1 => Some(n as u32),
                    Some(_) => {
                        return Err(Error::Validation(
                            "friendsNumber must be a positive integer".to_string(),
                        ))
                    }
                    None => None,
                };
                Ok(TaskData::Referral { friends_number })
            }
        }
    }

    /// Wire representation, carrying only the meaningful fields.
    pub fn to_wire(&self) -> TaskDataInput {
        match self {
            TaskData::Visit { link } => TaskDataInput {
                link: link.as_ref().map(|u| u.to_string()),
                ..Default::default()
            },
            TaskData::Telegram { link, chat_id } => TaskDataInput {
                link: link.as_ref().map(|u| u.to_string()),
                chat_id: chat_id.clone(),
                ..Default::default()
            },
            TaskData::Referral { friends_number } => TaskDataInput {
                friends_number: friends_number.map(i64::from),
                ..Default::default()
            },
        }
    }
}

impl Serialize for TaskData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Treat empty strings from the wire as absent.
fn normalize(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_requires_well_formed_link() {
        let input = TaskDataInput {
            link: Some("not a url".to_string()),
            ..Default::default()
        };
        let result = TaskData::from_input(TaskType::Visit, &input);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_telegram_without_link_is_valid() {
        let input = TaskDataInput {
            chat_id: Some("news".to_string()),
            ..Default::default()
        };
        let data = TaskData::from_input(TaskType::Telegram, &input).unwrap();
        assert_eq!(
            data,
            TaskData::Telegram {
                link: None,
                chat_id: Some("news".to_string())
            }
        );
    }

    #[test]
    fn test_irrelevant_fields_are_dropped() {
        // A friendsNumber on a VISIT task is simply unused.
        let input = TaskDataInput {
            link: Some("https://example.com/".to_string()),
            friends_number: Some(42),
            ..Default::default()
        };
        let data = TaskData::from_input(TaskType::Visit, &input).unwrap();
        let wire = data.to_wire();
        assert_eq!(wire.link.as_deref(), Some("https://example.com/"));
        assert!(wire.friends_number.is_none());
    }

    #[test]
    fn test_referral_rejects_non_positive_friends_number() {
        let input = TaskDataInput {
            friends_number: Some(0),
            ..Default::default()
        };
        assert!(TaskData::from_input(TaskType::Referral, &input).is_err());
    }

    #[test]
    fn test_empty_strings_treated_as_absent() {
        let input = TaskDataInput {
            link: Some("".to_string()),
            chat_id: Some("  ".to_string()),
            ..Default::default()
        };
        let data = TaskData::from_input(TaskType::Telegram, &input).unwrap();
        assert_eq!(
            data,
            TaskData::Telegram {
                link: None,
                chat_id: None
            }
        );
    }

    #[test]
    fn test_wire_serialization_skips_absent_fields() {
        let data = TaskData::Referral {
            friends_number: Some(3),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({"friendsNumber": 3}));
    }
}
