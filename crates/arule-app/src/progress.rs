#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    PreparingDirectories,
    GeneratingDefinitions,
    InvokingEngine,
    ResolvingDefinitions,
    ReadingOutput,
    Completed,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::PreparingDirectories => "prepare",
            PipelineStage::GeneratingDefinitions => "generate",
            PipelineStage::InvokingEngine => "engine",
            PipelineStage::ResolvingDefinitions => "resolve",
            PipelineStage::ReadingOutput => "read-output",
            PipelineStage::Completed => "done",
        }
    }
}

/// Position of the node currently being read.
#[derive(Debug, Clone, Default)]
pub struct NodeProgress {
    pub index: usize,
    pub total: usize,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PipelineProgressEvent {
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub node: Option<NodeProgress>,
}
