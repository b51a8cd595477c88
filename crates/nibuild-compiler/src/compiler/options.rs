use crate::compiler::ir::PickValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub cwl_version: String,
    /// Prepended to each tool's `cwlPath` in step `run` fields.
    pub run_prefix: String,
    /// How a terminal output that is both scattered and conditional is collected.
    /// `FirstNonNull` keeps the nullable form every conditional output gets;
    /// `AllNonNull` types it as the array of non-null results instead.
    pub scattered_conditional_pick: PickValue,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            cwl_version: "v1.2".to_string(),
            run_prefix: "../".to_string(),
            scattered_conditional_pick: PickValue::FirstNonNull,
        }
    }
}
