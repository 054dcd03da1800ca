// Career coaching: the resume analyzer and the adaptive interview loop.
// Prompts are built in prompts.rs; every model call goes through llm_client.

pub mod controller;
pub mod format;
pub mod handlers;
pub mod prompts;
pub mod view;
