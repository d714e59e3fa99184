use gtk::prelude::*;
use relm4::prelude::*;

use crate::models::{Message, Sender};

pub struct MessageWidget {
    pub message: Message,
    text_label: gtk::Label,
}

#[derive(Debug)]
pub enum MessageWidgetMsg {
    UpdateText(String),
}

#[relm4::factory(pub)]
impl FactoryComponent for MessageWidget {
    type Init = Message;
    type Input = MessageWidgetMsg;
    type Output = ();
    type CommandOutput = ();
    type ParentWidget = gtk::Box;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,
            set_margin_top: 4,
            set_margin_bottom: 4,
            set_margin_start: 12,
            set_margin_end: 12,
        }
    }

    fn init_model(message: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        let text_label = gtk::Label::builder()
            .label(&message.text)
            .halign(gtk::Align::Start)
            .xalign(0.0)
            .wrap(true)
            .wrap_mode(gtk::pango::WrapMode::WordChar)
            .selectable(true)
            .margin_start(12)
            .margin_end(12)
            .margin_top(10)
            .margin_bottom(10)
            .build();

        Self {
            message,
            text_label,
        }
    }

    fn init_widgets(
        &mut self,
        _index: &DynamicIndex,
        root: Self::Root,
        _returned_widget: &<Self::ParentWidget as relm4::factory::FactoryView>::ReturnedWidget,
        _sender: FactorySender<Self>,
    ) -> Self::Widgets {
        let is_user = self.message.sender == Sender::User;

        let bubble = gtk::Box::builder()
            .orientation(gtk::Orientation::Vertical)
            .build();
        bubble.add_css_class("card");
        bubble.add_css_class(if is_user {
            "message-bubble-user"
        } else {
            "message-bubble-system"
        });
        bubble.append(&self.text_label);
        let sent_at = self.message.created_at.with_timezone(&chrono::Local);
        bubble.set_tooltip_text(Some(&sent_at.format("%H:%M").to_string()));

        root.set_halign(if is_user {
            gtk::Align::End
        } else {
            gtk::Align::Start
        });
        root.append(&bubble);

        let widgets = view_output!();
        widgets
    }

    fn update(&mut self, msg: Self::Input, _sender: FactorySender<Self>) {
        match msg {
            MessageWidgetMsg::UpdateText(text) => {
                self.text_label.set_label(&text);
                self.message.text = text;
            }
        }
    }
}
