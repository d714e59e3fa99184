pub mod chat;
pub mod database;
pub mod history;
pub mod http;
pub mod inference;
pub mod reveal;
pub mod session;

pub use database::Database;
pub use history::{HistoryApi, HistoryClient};
pub use inference::{InferenceApi, InferenceClient};
pub use session::{Session, SessionService};
