pub mod attachment;
pub mod conversation;
pub mod message;
pub mod model_id;

pub use attachment::ImageAttachment;
pub use conversation::ConversationSummary;
pub use message::{Message, Sender};
pub use model_id::ModelId;
