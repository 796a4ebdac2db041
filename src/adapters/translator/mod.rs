//! Script translator adapters.

pub mod llm;
pub mod static_responder;

pub use llm::LlmTranslator;
pub use static_responder::StaticTranslator;
