pub mod chat_view;
pub mod dialogs;
pub mod input_area;
pub mod message_widget;
pub mod model_selector;
pub mod sidebar;
pub mod window;
