//! Application layer - services and execution policy

pub mod retry;
pub mod services;

pub use retry::{ExecutionOutcome, IdempotentExecutor, RetryPolicy};
pub use services::SwapService;
