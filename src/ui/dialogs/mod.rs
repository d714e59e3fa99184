pub mod new_chat;
