//! HTTP plumbing shared by the webhook listener.

pub mod access_log;
pub mod guards;
