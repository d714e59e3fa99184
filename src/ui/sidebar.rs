use adw::prelude::*;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::models::ConversationSummary;

// --- ConversationRow factory component ---

#[derive(Debug)]
pub struct ConversationRow {
    pub conversation: ConversationSummary,
}

#[relm4::factory(pub)]
impl FactoryComponent for ConversationRow {
    type Init = ConversationSummary;
    type Input = ();
    type Output = ();
    type CommandOutput = ();
    type ParentWidget = gtk::ListBox;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_margin_all: 8,

            gtk::Label {
                set_label: &self.conversation.name,
                set_halign: gtk::Align::Start,
                set_ellipsize: gtk::pango::EllipsizeMode::End,
                set_max_width_chars: 30,
            },
        }
    }

    fn init_model(conversation: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        Self { conversation }
    }
}

// --- Sidebar component ---

pub struct Sidebar {
    conversations: FactoryVecDeque<ConversationRow>,
    active_id: Option<String>,
}

#[derive(Debug)]
pub enum SidebarMsg {
    LoadConversations(Vec<ConversationSummary>),
    SetActive(Option<String>),
    NewChat,
    RowActivated(usize),
}

#[derive(Debug)]
pub enum SidebarOutput {
    NewChat,
    ConversationSelected(String),
}

#[relm4::component(pub)]
impl Component for Sidebar {
    type Init = ();
    type Input = SidebarMsg;
    type Output = SidebarOutput;
    type CommandOutput = ();

    view! {
        adw::ToolbarView {
            add_top_bar = &adw::HeaderBar {
                set_show_end_title_buttons: false,

                #[wrap(Some)]
                set_title_widget = &adw::WindowTitle {
                    set_title: "Chat History",
                },
            },

            #[wrap(Some)]
            set_content = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 0,

                gtk::Button {
                    set_label: "New Chat",
                    set_margin_start: 8,
                    set_margin_end: 8,
                    set_margin_top: 4,
                    set_margin_bottom: 8,
                    add_css_class: "suggested-action",
                    connect_clicked => SidebarMsg::NewChat,
                },

                gtk::ScrolledWindow {
                    set_hscrollbar_policy: gtk::PolicyType::Never,
                    set_vexpand: true,

                    #[local_ref]
                    conversation_list -> gtk::ListBox {
                        set_selection_mode: gtk::SelectionMode::Single,
                        add_css_class: "navigation-sidebar",
                    },
                },
            },
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let conversations = FactoryVecDeque::builder()
            .launch(gtk::ListBox::default())
            .detach();

        let model = Self {
            conversations,
            active_id: None,
        };

        let conversation_list = model.conversations.widget();
        let widgets = view_output!();

        let sender_row = sender.clone();
        model
            .conversations
            .widget()
            .connect_row_activated(move |_, row| {
                sender_row.input(SidebarMsg::RowActivated(row.index() as usize));
            });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            SidebarMsg::LoadConversations(conversations) => {
                let mut guard = self.conversations.guard();
                guard.clear();
                for conv in conversations {
                    guard.push_back(conv);
                }
                drop(guard);
                self.highlight_active();
            }
            SidebarMsg::SetActive(id) => {
                self.active_id = id;
                self.highlight_active();
            }
            SidebarMsg::NewChat => {
                let _ = sender.output(SidebarOutput::NewChat);
            }
            SidebarMsg::RowActivated(index) => {
                let id = self
                    .conversations
                    .get(index)
                    .map(|row| row.conversation.id.clone());
                if let Some(id) = id {
                    let _ = sender.output(SidebarOutput::ConversationSelected(id));
                }
            }
        }
    }
}

impl Sidebar {
    fn highlight_active(&self) {
        let list = self.conversations.widget();
        let index = self.active_id.as_ref().and_then(|id| {
            self.conversations
                .iter()
                .position(|row| &row.conversation.id == id)
        });

        match index.and_then(|i| list.row_at_index(i as i32)) {
            Some(row) => list.select_row(Some(&row)),
            None => list.unselect_all(),
        }
    }
}
