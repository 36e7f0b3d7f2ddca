mod instruction;
mod session;
mod tool;

pub use instruction::{build_context, build_system_instruction, navigable_paths};
pub use session::{AssistantSession, ERROR_REPLY, INITIAL_MESSAGE_KEY, SendOutcome};
pub use tool::{ToolCall, UNKNOWN_TOOL_REPLY, parse_tool_call};
