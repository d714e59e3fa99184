use adw::prelude::*;

use crate::config;

const STYLE: &str = "
.message-bubble-user {
    background-color: alpha(@accent_bg_color, 0.25);
    border-radius: 18px 18px 4px 18px;
}

.message-bubble-system {
    border-radius: 18px 18px 18px 4px;
}

.input-card {
    border-radius: 24px;
}

.attachment-thumbnail {
    border-radius: 6px;
}
";

pub fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        tracing::warn!("No display available, skipping stylesheet");
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_string(STYLE);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

/// Page shown instead of the chat when no session token is stored.
pub fn create_signed_out_page() -> adw::StatusPage {
    let page = adw::StatusPage::new();
    page.set_title("Sign-in Required");
    page.set_description(Some(&format!(
        "No session token found. Sign in through the web app, or start {} with {} set.",
        config::APP_NAME,
        config::AUTH_TOKEN_VAR
    )));
    page.set_icon_name(Some("system-lock-screen-symbolic"));
    page
}

/// Page shown while no conversation is open.
pub fn create_empty_page(on_new_chat: impl Fn() + 'static) -> adw::StatusPage {
    let page = adw::StatusPage::new();
    page.set_title("Start a New Conversation");
    page.set_description(Some("Pick a chat from the history or create a new one"));
    page.set_icon_name(Some("chat-symbolic"));

    let new_chat_btn = gtk::Button::builder()
        .label("New Chat")
        .halign(gtk::Align::Center)
        .build();
    new_chat_btn.add_css_class("suggested-action");
    new_chat_btn.add_css_class("pill");
    new_chat_btn.connect_clicked(move |_| on_new_chat());
    page.set_child(Some(&new_chat_btn));
    page
}

pub fn create_about_dialog(parent: &adw::ApplicationWindow) {
    let about = adw::AboutDialog::builder()
        .application_name(config::APP_NAME)
        .version(config::VERSION)
        .developer_name("Parley Contributors")
        .license_type(gtk::License::Gpl30)
        .comments("A desktop chat client for LLM querying backends")
        .build();
    about.present(Some(parent));
}
