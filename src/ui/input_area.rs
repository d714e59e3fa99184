use std::path::PathBuf;

use gtk::prelude::*;
use relm4::prelude::*;

use crate::models::ImageAttachment;

pub struct InputArea {
    buffer: gtk::TextBuffer,
    pending_image: Option<ImageAttachment>,
    thumbnail: gtk::Image,
    has_text: bool,
}

#[derive(Debug)]
pub enum InputAreaMsg {
    SendClicked,
    AttachImage,
    ImageFileSelected(PathBuf),
    RemoveAttachment,
    Clear,
    TextChanged,
}

#[derive(Debug)]
pub enum InputAreaOutput {
    SendMessage {
        text: String,
        image: Option<ImageAttachment>,
    },
}

#[relm4::component(pub)]
impl Component for InputArea {
    type Init = ();
    type Input = InputAreaMsg;
    type Output = InputAreaOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 0,

            // Attached image preview
            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 4,
                set_margin_start: 12,
                set_margin_top: 4,
                #[watch]
                set_visible: model.pending_image.is_some(),

                #[local_ref]
                thumbnail -> gtk::Image {
                    set_pixel_size: 64,
                    add_css_class: "attachment-thumbnail",
                },

                gtk::Button {
                    set_icon_name: "window-close-symbolic",
                    set_tooltip_text: Some("Remove image"),
                    set_valign: gtk::Align::Start,
                    add_css_class: "circular",
                    add_css_class: "flat",
                    connect_clicked => InputAreaMsg::RemoveAttachment,
                },
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 8,
                set_margin_top: 8,
                set_margin_bottom: 8,
                set_margin_start: 12,
                set_margin_end: 12,
                add_css_class: "input-card",

                gtk::Button {
                    set_icon_name: "image-x-generic-symbolic",
                    set_tooltip_text: Some("Attach image"),
                    set_valign: gtk::Align::End,
                    add_css_class: "flat",
                    add_css_class: "circular",
                    connect_clicked => InputAreaMsg::AttachImage,
                },

                gtk::ScrolledWindow {
                    set_hexpand: true,
                    set_max_content_height: 150,
                    set_propagate_natural_height: true,
                    set_min_content_height: 40,

                    #[name = "text_view"]
                    gtk::TextView {
                        set_wrap_mode: gtk::WrapMode::WordChar,
                        set_accepts_tab: false,
                        set_top_margin: 8,
                        set_bottom_margin: 8,
                        set_left_margin: 8,
                        set_right_margin: 8,
                        add_css_class: "input-text-view",

                        set_buffer: Some(&model.buffer),
                    },
                },

                gtk::Button {
                    set_label: "Send",
                    set_tooltip_text: Some("Send message (Enter)"),
                    set_valign: gtk::Align::End,
                    add_css_class: "suggested-action",
                    add_css_class: "pill",
                    #[watch]
                    set_sensitive: model.has_text,
                    connect_clicked => InputAreaMsg::SendClicked,
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let buffer = gtk::TextBuffer::new(None::<&gtk::TextTagTable>);
        let thumbnail = gtk::Image::new();

        let model = Self {
            buffer: buffer.clone(),
            pending_image: None,
            thumbnail: thumbnail.clone(),
            has_text: false,
        };

        let widgets = view_output!();

        // Enter sends, Shift+Enter inserts a newline
        let sender_key = sender.clone();
        let key_controller = gtk::EventControllerKey::new();
        key_controller.connect_key_pressed(move |_, key, _code, modifier| {
            if key == gtk::gdk::Key::Return && !modifier.contains(gtk::gdk::ModifierType::SHIFT_MASK) {
                sender_key.input(InputAreaMsg::SendClicked);
                gtk::glib::Propagation::Stop
            } else {
                gtk::glib::Propagation::Proceed
            }
        });
        widgets.text_view.add_controller(key_controller);

        let sender_buf = sender.clone();
        buffer.connect_changed(move |_| {
            sender_buf.input(InputAreaMsg::TextChanged);
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, root: &Self::Root) {
        match msg {
            InputAreaMsg::SendClicked => {
                let text = self.get_text();
                // Blank input is dropped here and again by the chat state.
                if text.trim().is_empty() {
                    return;
                }
                // The input stays until the send is accepted.
                let _ = sender.output(InputAreaOutput::SendMessage {
                    text,
                    image: self.pending_image.clone(),
                });
            }
            InputAreaMsg::Clear => {
                self.buffer.set_text("");
                self.pending_image = None;
                self.thumbnail.set_paintable(None::<&gtk::gdk::Paintable>);
            }
            InputAreaMsg::AttachImage => {
                let dialog = gtk::FileDialog::builder().title("Attach Image").build();

                let filter = gtk::FileFilter::new();
                filter.set_name(Some("Images"));
                filter.add_mime_type("image/png");
                filter.add_mime_type("image/jpeg");
                filter.add_mime_type("image/gif");
                filter.add_mime_type("image/webp");
                let filters = gio::ListStore::new::<gtk::FileFilter>();
                filters.append(&filter);
                dialog.set_filters(Some(&filters));

                let sender_dlg = sender.input_sender().clone();
                if let Some(window) = root.root().and_then(|r| r.downcast::<gtk::Window>().ok()) {
                    dialog.open(Some(&window), None::<&gio::Cancellable>, move |result| {
                        if let Ok(file) = result {
                            if let Some(path) = file.path() {
                                let _ = sender_dlg.send(InputAreaMsg::ImageFileSelected(path));
                            }
                        }
                    });
                }
            }
            InputAreaMsg::ImageFileSelected(path) => {
                self.attach_image(path);
            }
            InputAreaMsg::RemoveAttachment => {
                self.pending_image = None;
                self.thumbnail.set_paintable(None::<&gtk::gdk::Paintable>);
            }
            InputAreaMsg::TextChanged => {
                self.has_text = !self.get_text().trim().is_empty();
            }
        }
    }
}

impl InputArea {
    fn get_text(&self) -> String {
        let start = self.buffer.start_iter();
        let end = self.buffer.end_iter();
        self.buffer.text(&start, &end, false).to_string()
    }

    /// Replace the pending image; only one image travels with a query.
    fn attach_image(&mut self, path: PathBuf) {
        let Some(mime_type) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageAttachment::mime_for_extension)
        else {
            tracing::warn!("Ignoring unsupported attachment: {}", path.display());
            return;
        };

        let data = match std::fs::read(&path) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!("Failed to read image file: {}", e);
                return;
            }
        };

        let bytes = glib::Bytes::from(&data);
        match gtk::gdk::Texture::from_bytes(&bytes) {
            Ok(texture) => self.thumbnail.set_paintable(Some(&texture)),
            Err(e) => {
                tracing::error!("Failed to decode image: {}", e);
                return;
            }
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        self.pending_image = Some(ImageAttachment {
            filename,
            mime_type: mime_type.to_string(),
            data,
        });
    }
}
