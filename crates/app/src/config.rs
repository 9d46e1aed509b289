//! Settings consumed by the command pipelines.

/// Default cap on resource operations a single command may resolve to.
pub const DEFAULT_MAX_CMD_OPS: usize = 128;

/// Command handling settings, passed explicitly at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandConfig {
    /// Maximum number of resource operations per command.
    pub max_cmd_ops: usize,
    /// Whether read and write transforms are applied.
    pub data_transform: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            max_cmd_ops: DEFAULT_MAX_CMD_OPS,
            data_transform: true,
        }
    }
}
