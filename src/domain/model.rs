use serde::{Deserialize, Serialize};

/// The five pseudo-models of the pool, in pool order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Math,
    ScienceDictionary,
    RandomFacts,
    News,
    Music,
}

impl ModelKind {
    pub const POOL: [ModelKind; 5] = [
        ModelKind::Math,
        ModelKind::ScienceDictionary,
        ModelKind::RandomFacts,
        ModelKind::News,
        ModelKind::Music,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Math => "Model A",
            ModelKind::ScienceDictionary => "Model B",
            ModelKind::RandomFacts => "Model C",
            ModelKind::News => "Model D",
            ModelKind::Music => "Model E",
        }
    }

    pub fn specialty(self) -> &'static str {
        match self {
            ModelKind::Math => "Math",
            ModelKind::ScienceDictionary => "Science Dictionary",
            ModelKind::RandomFacts => "Random Facts",
            ModelKind::News => "News",
            ModelKind::Music => "Music",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::POOL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Per-request copy of a pool entry with the outputs attached so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub name: String,
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<String>,
}

impl From<ModelKind> for ModelRun {
    fn from(kind: ModelKind) -> Self {
        Self {
            name: kind.name().to_string(),
            specialty: kind.specialty().to_string(),
            initial_output: None,
            final_output: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub models: Vec<ModelRun>,
    pub synthesized_insight: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputField {
    InitialOutput,
    FinalOutput,
}

/// One server-push event of the staged run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Timeline {
        title: String,
        note: String,
    },
    ModelUpdate {
        model: String,
        field: OutputField,
        value: String,
    },
    Final {
        models: Vec<ModelRun>,
        synthesized_insight: String,
    },
}

impl StreamEvent {
    pub fn timeline(title: &str, note: impl Into<String>) -> Self {
        StreamEvent::Timeline {
            title: title.to_string(),
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "trackName")]
    pub track: Option<String>,
    #[serde(rename = "artistName")]
    pub artist: Option<String>,
    #[serde(rename = "collectionName")]
    pub album: Option<String>,
    #[serde(rename = "previewUrl")]
    pub preview: Option<String>,
    #[serde(rename = "trackViewUrl")]
    pub store: Option<String>,
}
