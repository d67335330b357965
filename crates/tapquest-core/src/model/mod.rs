//! Domain models and wire types.
//!
//! Full records (`Task`, `Reward`, …) are what the store returns and the
//! API serializes; `*Input` structs are the inbound camelCase wire shapes,
//! and `*Draft` structs are validated payloads ready for persistence.

mod reward;
mod task;
mod task_data;
mod user;

pub use reward::{Reward, RewardDraft, RewardInput, RewardType};
pub use task::{AnnotatedTask, Task, TaskDraft, TaskInput, TaskType};
pub use task_data::{TaskData, TaskDataInput};
pub use user::{User, UserTask};
