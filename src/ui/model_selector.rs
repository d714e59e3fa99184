use gtk::prelude::*;
use relm4::prelude::*;

use crate::models::ModelId;

pub struct ModelSelector {
    selected: ModelId,
}

#[derive(Debug)]
pub enum ModelSelectorMsg {
    ModelChanged(u32),
}

#[derive(Debug)]
pub enum ModelSelectorOutput {
    ModelSelected(ModelId),
}

#[relm4::component(pub)]
impl Component for ModelSelector {
    type Init = ModelId;
    type Input = ModelSelectorMsg;
    type Output = ModelSelectorOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,
            set_spacing: 8,

            gtk::Label {
                add_css_class: "dim-label",
                #[watch]
                set_label: &format!("Current model: {}", model.selected.as_str()),
            },

            #[local_ref]
            model_dropdown -> gtk::DropDown {
                set_tooltip_text: Some("Select model"),
                add_css_class: "flat",
            },
        }
    }

    fn init(
        selected: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let names: Vec<&str> = ModelId::ALL.iter().map(|m| m.display_name()).collect();
        let model_dropdown = gtk::DropDown::from_strings(&names);
        model_dropdown.set_selected(selected.index() as u32);

        let model = Self { selected };
        let widgets = view_output!();

        let sender_model = sender.clone();
        model_dropdown.connect_selected_notify(move |dd| {
            sender_model.input(ModelSelectorMsg::ModelChanged(dd.selected()));
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            ModelSelectorMsg::ModelChanged(index) => {
                let Some(model) = ModelId::ALL.get(index as usize).copied() else {
                    return;
                };
                if model != self.selected {
                    self.selected = model;
                    let _ = sender.output(ModelSelectorOutput::ModelSelected(model));
                }
            }
        }
    }
}
