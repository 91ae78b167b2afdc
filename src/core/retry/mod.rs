mod r#impl;
mod types;
mod utils;

pub use types::{
    BackoffPolicy, CategoryConfig, ErrorRetryCondition,
    RequestRetryCondition, RetryCategory, RetryCondition, RetryConfig, RetryState,
};
