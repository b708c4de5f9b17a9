//! Tool-specific parsers
//!
//! Each supported tool has a parser module that implements
//! the [`ToolParser`](super::ToolParser) trait.
//!
//! ## Supported Tools
//!
//! | Tool | Module | Token usage |
//! |------|--------|-------------|
//! | Claude Code | [`claude`] | ✅ per message |
//! | Codex | [`codex`] | ✅ final session snapshot |
//! | OpenCode | [`opencode`] | ❌ activity and projects only |

pub mod claude;
pub mod codex;
pub mod opencode;

pub use claude::ClaudeCodeParser;
pub use codex::CodexParser;
pub use opencode::OpenCodeParser;

use super::ToolParser;
use crate::types::Tool;

/// Create all available parsers.
///
/// Returns a vector of boxed parsers for all supported tools, in
/// [`Tool::ALL`] order.
pub fn create_all_parsers() -> Vec<Box<dyn ToolParser>> {
    Tool::ALL.into_iter().map(parser_for).collect()
}

/// Get the parser for a tool.
pub fn parser_for(tool: Tool) -> Box<dyn ToolParser> {
    match tool {
        Tool::ClaudeCode => Box::new(ClaudeCodeParser::new()),
        Tool::Codex => Box::new(CodexParser::new()),
        Tool::OpenCode => Box::new(OpenCodeParser::new()),
    }
}

/// Get a parser for a tool rooted at a specific directory.
pub fn parser_with_root(tool: Tool, root: std::path::PathBuf) -> Box<dyn ToolParser> {
    match tool {
        Tool::ClaudeCode => Box::new(ClaudeCodeParser::with_root(root)),
        Tool::Codex => Box::new(CodexParser::with_root(root)),
        Tool::OpenCode => Box::new(OpenCodeParser::with_root(root)),
    }
}
