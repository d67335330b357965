//! Core domain types for tapquest: task/reward content model, boundary
//! validation, configuration, Telegram WebApp identity verification, and
//! the static game tables.
//!
//! This crate performs no I/O beyond reading environment variables during
//! configuration loading; storage and HTTP live in `tapquest-server`.

pub mod config;
pub mod error;
pub mod images;
pub mod levels;
pub mod model;
pub mod telegram;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use model::{
    AnnotatedTask, Reward, RewardDraft, RewardInput, RewardType, Task, TaskData, TaskDataInput,
    TaskDraft, TaskInput, TaskType, User, UserTask,
};
