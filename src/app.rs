use std::sync::Arc;

use adw::prelude::*;
use relm4::prelude::*;

use crate::config::{self, Endpoints};
use crate::models::{ConversationSummary, ImageAttachment, Message, ModelId};
use crate::services::chat::{Bootstrap, ChatState, ReplyOutcome, TickOutcome};
use crate::services::http::ClientError;
use crate::services::inference::QueryRequest;
use crate::services::reveal;
use crate::services::{
    Database, HistoryApi, HistoryClient, InferenceApi, InferenceClient, Session, SessionService,
};
use crate::ui::chat_view::{ChatView, ChatViewMsg, ChatViewOutput};
use crate::ui::dialogs::new_chat;
use crate::ui::model_selector::{ModelSelector, ModelSelectorOutput};
use crate::ui::sidebar::{Sidebar, SidebarMsg, SidebarOutput};
use crate::ui::window;

/// Remote services used by the chat view, shared with command tasks.
#[derive(Clone)]
struct Services {
    history: Arc<dyn HistoryApi>,
    inference: Arc<dyn InferenceApi>,
}

impl Services {
    fn connect(endpoints: &Endpoints, session: &Session) -> Self {
        Self {
            history: Arc::new(HistoryClient::new(
                endpoints.backend.clone(),
                session.clone(),
            )),
            inference: Arc::new(InferenceClient::new(
                endpoints.inference.clone(),
                session.clone(),
            )),
        }
    }
}

pub struct App {
    state: ChatState,
    services: Option<Services>,
    session: Session,
    db: Option<Database>,
    sidebar: Controller<Sidebar>,
    chat_view: Controller<ChatView>,
    _model_selector: Controller<ModelSelector>,
    toast_overlay: adw::ToastOverlay,
    content_stack: gtk::Stack,
}

#[derive(Debug)]
pub enum AppMsg {
    NewChat,
    CreateConversation(String),
    ConversationSelected(String),
    SendMessage(String, Option<ImageAttachment>),
    ModelSelected(ModelId),
    ShowAbout,
}

#[derive(Debug)]
pub enum AppCmd {
    Initialized {
        db: Database,
        session: Session,
        endpoints: Endpoints,
        last_conversation: Option<String>,
    },
    InitFailed(String),
    ConversationsLoaded(Result<Vec<ConversationSummary>, ClientError>),
    MessagesLoaded(String, Result<Vec<Message>, ClientError>),
    ConversationCreated(String),
    ReplyReceived {
        conversation_id: String,
        reply: String,
    },
    ReplyFailed,
    RevealTick(String),
}

#[relm4::component(pub, async)]
impl AsyncComponent for App {
    type Init = ();
    type Input = AppMsg;
    type Output = ();
    type CommandOutput = AppCmd;

    view! {
        adw::ApplicationWindow {
            set_title: Some(config::APP_NAME),
            set_default_width: 1000,
            set_default_height: 720,
            set_width_request: 360,
            set_height_request: 400,

            #[local_ref]
            toast_overlay -> adw::ToastOverlay {},
        }
    }

    async fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let sidebar = Sidebar::builder()
            .launch(())
            .forward(sender.input_sender(), |output| match output {
                SidebarOutput::NewChat => AppMsg::NewChat,
                SidebarOutput::ConversationSelected(id) => AppMsg::ConversationSelected(id),
            });

        let chat_view = ChatView::builder()
            .launch(())
            .forward(sender.input_sender(), |output| match output {
                ChatViewOutput::SendMessage { text, image } => AppMsg::SendMessage(text, image),
            });

        let state = ChatState::new();
        let model_selector = ModelSelector::builder().launch(state.model()).forward(
            sender.input_sender(),
            |output| match output {
                ModelSelectorOutput::ModelSelected(model) => AppMsg::ModelSelected(model),
            },
        );

        let toast_overlay = adw::ToastOverlay::new();
        toast_overlay.set_hexpand(true);
        toast_overlay.set_vexpand(true);

        let content_stack = gtk::Stack::new();
        content_stack.set_hexpand(true);
        content_stack.set_vexpand(true);

        content_stack.add_named(&window::create_signed_out_page(), Some("signed-out"));

        let sender_empty = sender.input_sender().clone();
        let empty_page = window::create_empty_page(move || {
            let _ = sender_empty.send(AppMsg::NewChat);
        });
        content_stack.add_named(&empty_page, Some("empty"));
        content_stack.add_named(chat_view.widget(), Some("chat"));
        content_stack.set_visible_child_name("empty");

        let content_header = adw::HeaderBar::new();
        content_header.set_show_start_title_buttons(false);
        content_header.set_title_widget(Some(model_selector.widget()));

        let menu = gio::Menu::new();
        menu.append(Some("New Chat"), Some("app.new-chat"));
        menu.append(Some("About Parley"), Some("app.about"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu)
            .build();
        content_header.pack_end(&menu_button);

        let content_toolbar = adw::ToolbarView::new();
        content_toolbar.add_top_bar(&content_header);
        content_toolbar.set_content(Some(&content_stack));

        let content_page = adw::NavigationPage::builder()
            .title("Chat")
            .tag("content")
            .child(&content_toolbar)
            .build();

        let sidebar_page = adw::NavigationPage::builder()
            .title("Chat History")
            .tag("sidebar")
            .child(sidebar.widget())
            .build();

        let split_view = adw::NavigationSplitView::new();
        split_view.set_hexpand(true);
        split_view.set_vexpand(true);
        split_view.set_min_sidebar_width(200.0);
        split_view.set_max_sidebar_width(300.0);
        split_view.set_sidebar(Some(&sidebar_page));
        split_view.set_content(Some(&content_page));

        match adw::BreakpointCondition::parse("max-width: 600px") {
            Ok(condition) => {
                let breakpoint = adw::Breakpoint::new(condition);
                breakpoint.add_setter(&split_view, "collapsed", Some(&true.to_value()));
                breakpoint.add_setter(
                    &content_header,
                    "show-start-title-buttons",
                    Some(&true.to_value()),
                );
                root.add_breakpoint(breakpoint);
            }
            Err(e) => tracing::warn!("Invalid breakpoint condition: {}", e),
        }

        toast_overlay.set_child(Some(&split_view));

        let model = App {
            state,
            services: None,
            session: Session::logged_out(),
            db: None,
            sidebar,
            chat_view,
            _model_selector: model_selector,
            toast_overlay: toast_overlay.clone(),
            content_stack,
        };

        let widgets = view_output!();

        let app = relm4::main_adw_application();
        let sender_about = sender.input_sender().clone();
        let about_action = gio::SimpleAction::new("about", None);
        about_action.connect_activate(move |_, _| {
            let _ = sender_about.send(AppMsg::ShowAbout);
        });
        app.add_action(&about_action);

        let sender_new = sender.input_sender().clone();
        let new_chat_action = gio::SimpleAction::new("new-chat", None);
        new_chat_action.connect_activate(move |_, _| {
            let _ = sender_new.send(AppMsg::NewChat);
        });
        app.add_action(&new_chat_action);
        app.set_accels_for_action("app.new-chat", &["<Control>n"]);

        sender.command(|out, _| {
            Box::pin(async move {
                match Self::async_init().await {
                    Ok(cmd) => {
                        let _ = out.send(cmd);
                    }
                    Err(e) => {
                        let _ = out.send(AppCmd::InitFailed(format!("{:#}", e)));
                    }
                }
            })
        });

        AsyncComponentParts { model, widgets }
    }

    async fn update(
        &mut self,
        msg: Self::Input,
        sender: AsyncComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            AppMsg::NewChat => {
                if !self.state.is_logged_in() {
                    self.show_toast("Sign in to start a chat");
                    return;
                }
                let input = sender.input_sender().clone();
                new_chat::prompt_title(root, move |title| {
                    let _ = input.send(AppMsg::CreateConversation(title));
                });
            }
            AppMsg::CreateConversation(title) => {
                let Some(services) = self.services.clone() else {
                    return;
                };
                sender.command(move |out, _| {
                    Box::pin(async move {
                        match services.history.create_conversation(&title).await {
                            Ok(id) => {
                                let _ = out.send(AppCmd::ConversationCreated(id));
                            }
                            Err(e) => tracing::error!("Failed to create conversation: {}", e),
                        }
                    })
                });
            }
            AppMsg::ConversationSelected(id) => {
                self.open_conversation(&id, &sender);
            }
            AppMsg::SendMessage(text, image) => {
                self.handle_send_message(&text, image, &sender);
            }
            AppMsg::ModelSelected(model) => {
                tracing::debug!("Model selected: {}", model.as_str());
                self.state.set_model(model);
            }
            AppMsg::ShowAbout => {
                window::create_about_dialog(root);
            }
        }
    }

    async fn update_cmd(
        &mut self,
        msg: Self::CommandOutput,
        sender: AsyncComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            AppCmd::Initialized {
                db,
                session,
                endpoints,
                last_conversation,
            } => {
                tracing::debug!("Initialized with {:?}", session);
                self.services = Some(Services::connect(&endpoints, &session));
                self.session = session;
                self.db = Some(db);

                match last_conversation {
                    Some(id) if self.session.is_logged_in() => {
                        self.open_conversation(&id, &sender);
                    }
                    _ => self.bootstrap(&sender),
                }
            }
            AppCmd::InitFailed(err) => {
                tracing::error!("Initialization failed: {}", err);
                self.show_toast(&format!("Failed to start: {}", err));
                self.content_stack.set_visible_child_name("signed-out");
            }
            AppCmd::ConversationsLoaded(result) => {
                if self.state.conversations_loaded(result) {
                    self.sidebar.emit(SidebarMsg::LoadConversations(
                        self.state.conversations().to_vec(),
                    ));
                }
            }
            AppCmd::MessagesLoaded(conversation_id, result) => {
                if self.state.messages_loaded(&conversation_id, result) {
                    self.chat_view
                        .emit(ChatViewMsg::LoadMessages(self.state.messages().to_vec()));
                }
            }
            AppCmd::ConversationCreated(id) => {
                self.open_conversation(&id, &sender);
            }
            AppCmd::ReplyReceived {
                conversation_id,
                reply,
            } => match self.state.reply_received(&conversation_id, reply) {
                ReplyOutcome::Reveal { message_id, ticks } => {
                    if let Some(placeholder) = self.state.message(&message_id) {
                        self.chat_view
                            .emit(ChatViewMsg::AddMessage(placeholder.clone()));
                    }
                    sender.command(move |out, _| {
                        Box::pin(async move {
                            reveal::run_ticks(ticks, config::REVEAL_TICK, move |_| {
                                let _ = out.send(AppCmd::RevealTick(message_id.clone()));
                            })
                            .await;
                        })
                    });
                    self.sync_typing();
                }
                ReplyOutcome::Finished(message) => {
                    if let Some(shown) = self.state.message(&message.id) {
                        self.chat_view.emit(ChatViewMsg::AddMessage(shown.clone()));
                    }
                    self.persist_message(message, &sender);
                    self.sync_typing();
                }
            },
            AppCmd::ReplyFailed => {
                self.state.reply_failed();
                self.sync_typing();
            }
            AppCmd::RevealTick(message_id) => match self.state.reveal_tick(&message_id) {
                TickOutcome::Revealing => self.show_revealed(&message_id),
                TickOutcome::Finished(message) => {
                    self.show_revealed(&message_id);
                    self.persist_message(message, &sender);
                    self.sync_typing();
                }
                TickOutcome::Unknown => {
                    tracing::debug!("Tick for unknown reveal {}", message_id);
                }
            },
        }
    }
}

impl App {
    async fn async_init() -> anyhow::Result<AppCmd> {
        let db = Database::new().await?;
        let endpoints = Endpoints::from_env()?;
        let override_token = std::env::var(config::AUTH_TOKEN_VAR).ok();
        let session = SessionService::load(&db, override_token).await?;
        let last_conversation = SessionService::last_conversation(&db).await;
        Ok(AppCmd::Initialized {
            db,
            session,
            endpoints,
            last_conversation,
        })
    }

    fn show_toast(&self, message: &str) {
        let toast = adw::Toast::new(message);
        toast.set_timeout(3);
        self.toast_overlay.add_toast(toast);
    }

    fn sync_typing(&self) {
        tracing::debug!("Send phase: {:?}", self.state.phase());
        self.chat_view
            .emit(ChatViewMsg::SetTyping(self.state.typing()));
    }

    fn show_revealed(&self, message_id: &str) {
        if let Some(text) = self.state.message_text(message_id) {
            self.chat_view.emit(ChatViewMsg::UpdateMessage(
                message_id.to_string(),
                text.to_string(),
            ));
        }
    }

    /// Fetch what the view needs for the current session and conversation.
    fn bootstrap(&mut self, sender: &AsyncComponentSender<Self>) {
        let Some(services) = self.services.clone() else {
            return;
        };

        let conversation_id = match self.state.bootstrap(self.session.is_logged_in()) {
            Bootstrap::LoggedOut => {
                self.content_stack.set_visible_child_name("signed-out");
                return;
            }
            Bootstrap::Fetch { conversation_id } => conversation_id,
        };

        let page = if conversation_id.is_some() { "chat" } else { "empty" };
        self.content_stack.set_visible_child_name(page);

        sender.command(move |out, _| {
            Box::pin(async move {
                let messages = async {
                    let Some(id) = conversation_id else {
                        return;
                    };
                    let result = services.history.fetch_messages(&id).await;
                    let _ = out.send(AppCmd::MessagesLoaded(id, result));
                };
                let conversations = async {
                    let result = services.history.list_conversations().await;
                    let _ = out.send(AppCmd::ConversationsLoaded(result));
                };
                futures::join!(messages, conversations);
            })
        });
    }

    fn open_conversation(&mut self, conversation_id: &str, sender: &AsyncComponentSender<Self>) {
        if !self.state.navigate(conversation_id) {
            return;
        }

        self.chat_view.emit(ChatViewMsg::LoadMessages(Vec::new()));
        self.sidebar
            .emit(SidebarMsg::SetActive(Some(conversation_id.to_string())));

        if let Some(db) = self.db.clone() {
            let id = conversation_id.to_string();
            sender.command(move |_out, _| {
                Box::pin(async move {
                    if let Err(e) = SessionService::remember_conversation(&db, &id).await {
                        tracing::warn!("Failed to remember conversation {}: {}", id, e);
                    }
                })
            });
        }

        self.bootstrap(sender);
    }

    fn handle_send_message(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
        sender: &AsyncComponentSender<Self>,
    ) {
        let Some(services) = self.services.clone() else {
            return;
        };
        if self.state.active_conversation().is_none() {
            self.show_toast("Open or create a chat first");
            return;
        }
        let Some(outgoing) = self.state.submit(text) else {
            return;
        };

        self.chat_view.emit(ChatViewMsg::ClearInput);
        self.chat_view
            .emit(ChatViewMsg::AddMessage(outgoing.message.clone()));
        self.sync_typing();

        self.persist_message(outgoing.message.clone(), sender);

        let conversation_id = outgoing.message.conversation_id.clone();
        let request = QueryRequest {
            model: outgoing.model,
            query: outgoing.query,
            image,
        };
        sender.command(move |out, _| {
            Box::pin(async move {
                match services.inference.query(request).await {
                    Ok(reply) => {
                        let _ = out.send(AppCmd::ReplyReceived {
                            conversation_id,
                            reply,
                        });
                    }
                    Err(e) => {
                        tracing::error!("Query failed: {}", e);
                        let _ = out.send(AppCmd::ReplyFailed);
                    }
                }
            })
        });
    }

    /// Store a message in its conversation. Failures are only logged.
    fn persist_message(&self, message: Message, sender: &AsyncComponentSender<Self>) {
        let Some(services) = self.services.clone() else {
            return;
        };
        sender.command(move |_out, _| {
            Box::pin(async move {
                if let Err(e) = services.history.add_message(&message).await {
                    tracing::error!("Failed to save message {}: {}", message.id, e);
                }
            })
        });
    }
}
