use gtk::prelude::*;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::models::{ImageAttachment, Message};
use crate::ui::input_area::{InputArea, InputAreaMsg, InputAreaOutput};
use crate::ui::message_widget::{MessageWidget, MessageWidgetMsg};

pub struct ChatView {
    messages: FactoryVecDeque<MessageWidget>,
    input_area: Controller<InputArea>,
    typing: bool,
    scrolled_window: gtk::ScrolledWindow,
}

#[derive(Debug)]
pub enum ChatViewMsg {
    LoadMessages(Vec<Message>),
    AddMessage(Message),
    UpdateMessage(String, String), // (message_id, text)
    SetTyping(bool),
    ScrollToBottom,
    ClearInput,
    UserSendMessage(String, Option<ImageAttachment>),
}

#[derive(Debug)]
pub enum ChatViewOutput {
    SendMessage {
        text: String,
        image: Option<ImageAttachment>,
    },
}

#[relm4::component(pub)]
impl Component for ChatView {
    type Init = ();
    type Input = ChatViewMsg;
    type Output = ChatViewOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_vexpand: true,

            #[local_ref]
            scrolled_window -> gtk::ScrolledWindow {
                set_vexpand: true,
                set_hscrollbar_policy: gtk::PolicyType::Never,

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    set_margin_top: 8,
                    set_margin_bottom: 8,
                    set_margin_start: 16,
                    set_margin_end: 16,

                    #[local_ref]
                    message_list -> gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 0,
                    },

                    // Typing indicator
                    gtk::Box {
                        set_halign: gtk::Align::Start,
                        set_margin_top: 4,
                        set_margin_start: 12,
                        add_css_class: "card",
                        add_css_class: "message-bubble-system",
                        #[watch]
                        set_visible: model.typing,

                        gtk::Label {
                            set_label: "Typing...",
                            set_margin_all: 10,
                            add_css_class: "dim-label",
                        },
                    },
                },
            },

            gtk::Separator {
                set_orientation: gtk::Orientation::Horizontal,
            },

            model.input_area.widget().clone(),
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let messages = FactoryVecDeque::builder()
            .launch(gtk::Box::default())
            .detach();

        let input_area = InputArea::builder()
            .launch(())
            .forward(sender.input_sender(), |output| match output {
                InputAreaOutput::SendMessage { text, image } => {
                    ChatViewMsg::UserSendMessage(text, image)
                }
            });

        let scrolled_window = gtk::ScrolledWindow::new();

        let model = Self {
            messages,
            input_area,
            typing: false,
            scrolled_window: scrolled_window.clone(),
        };

        let message_list = model.messages.widget();
        let widgets = view_output!();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            ChatViewMsg::LoadMessages(messages) => {
                let mut guard = self.messages.guard();
                guard.clear();
                for message in messages {
                    guard.push_back(message);
                }
                drop(guard);
                sender.input(ChatViewMsg::ScrollToBottom);
            }
            ChatViewMsg::AddMessage(message) => {
                self.messages.guard().push_back(message);
                sender.input(ChatViewMsg::ScrollToBottom);
            }
            ChatViewMsg::UpdateMessage(message_id, text) => {
                let pos = self
                    .messages
                    .iter()
                    .position(|m| m.message.id == message_id);
                if let Some(idx) = pos {
                    self.messages.send(idx, MessageWidgetMsg::UpdateText(text));
                    sender.input(ChatViewMsg::ScrollToBottom);
                }
            }
            ChatViewMsg::SetTyping(typing) => {
                self.typing = typing;
                sender.input(ChatViewMsg::ScrollToBottom);
            }
            ChatViewMsg::ScrollToBottom => {
                // Wait for the new rows to be measured before jumping.
                let adj = self.scrolled_window.vadjustment();
                glib::idle_add_local_once(move || {
                    adj.set_value(adj.upper());
                });
            }
            ChatViewMsg::ClearInput => {
                self.input_area.emit(InputAreaMsg::Clear);
            }
            ChatViewMsg::UserSendMessage(text, image) => {
                let _ = sender.output(ChatViewOutput::SendMessage { text, image });
            }
        }
    }
}
