use serde::{Deserialize, Serialize};

/// Models exposed by the inference service, one endpoint path each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    #[default]
    Llama3,
    Bart,
    Gpt2,
    Gemini,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [ModelId::Llama3, ModelId::Bart, ModelId::Gpt2, ModelId::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Llama3 => "llama3",
            ModelId::Bart => "bart",
            ModelId::Gpt2 => "gpt2",
            ModelId::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Llama3 => "Llama 3",
            ModelId::Bart => "bart",
            ModelId::Gpt2 => "GPT-2",
            ModelId::Gemini => "Gemini",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_llama3() {
        assert_eq!(ModelId::default(), ModelId::Llama3);
    }

    #[test]
    fn test_index_matches_dropdown_order() {
        for (i, model) in ModelId::ALL.iter().enumerate() {
            assert_eq!(model.index(), i);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(ModelId::Gpt2).unwrap(), "gpt2");
        assert_eq!(ModelId::Llama3.as_str(), "llama3");
    }
}
