pub mod llm;
pub mod payments;
pub mod recommendation;

pub use llm::OpenAiClient;
pub use payments::StripeClient;
pub use recommendation::Recommenders;
