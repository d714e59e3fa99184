use adw::prelude::*;

/// Ask for the title of a new conversation. `on_title` only runs when the
/// user confirms with a non-blank title.
pub fn prompt_title<F>(parent: &impl IsA<gtk::Widget>, on_title: F)
where
    F: Fn(String) + 'static,
{
    let dialog = adw::AlertDialog::builder()
        .heading("New Chat")
        .body("Enter the title for the new chat:")
        .build();

    let entry = gtk::Entry::builder()
        .placeholder_text("Title")
        .activates_default(true)
        .build();

    dialog.set_extra_child(Some(&entry));
    dialog.add_response("cancel", "Cancel");
    dialog.add_response("create", "Create");
    dialog.set_response_appearance("create", adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("create"));
    dialog.set_close_response("cancel");

    dialog.connect_response(None, move |_dialog, response| {
        if response != "create" {
            return;
        }
        let title = entry.text().trim().to_string();
        if !title.is_empty() {
            on_title(title);
        }
    });

    dialog.present(Some(parent));
}
