// Blueprint analysis: documents in, structured SWOT report out.
// The model call goes through llm_client; nothing here talks to the API directly.

pub mod document;
pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
pub mod storage;
