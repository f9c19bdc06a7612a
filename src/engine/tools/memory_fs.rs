// Paw Memory Journal — Agent memory tool
// memory (view | create | str_replace | insert | delete | rename)
//
// One tool, dispatched on its `command` argument. Every successful mutation
// is journaled by the orchestrator; failures go back to the model as text.

use crate::atoms::constants::{MEMORY_ROOT, MEMORY_TOOL_NAME};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::*;
use crate::engine::journal::orchestrator::MemoryJournal;
use crate::engine::store::MemoryBackend;
use log::info;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        tool_type: "function".into(),
        function: FunctionDefinition {
            name: MEMORY_TOOL_NAME.into(),
            description: format!(
                "Read and edit your persistent memory files under {root}. Memory survives across conversations; \
                 check {root} before starting a task and record progress as you go. Every change is journaled and \
                 can be reviewed or rolled back by the user.",
                root = MEMORY_ROOT
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "enum": ["view", "create", "str_replace", "insert", "delete", "rename"],
                        "description": "view: show a file with line numbers, or list a directory. create: write a file, overwriting if it exists. str_replace: replace one exact, unique occurrence of old_str. insert: insert text before line insert_line (0 = top). delete: remove a file. rename: move old_path to new_path."
                    },
                    "path": { "type": "string", "description": "File or directory path, e.g. /memories/notes.md" },
                    "view_range": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "minItems": 2,
                        "maxItems": 2,
                        "description": "view only: [start, end] 1-based inclusive line range; end -1 means last line"
                    },
                    "file_text": { "type": "string", "description": "create only: full file content" },
                    "old_str": { "type": "string", "description": "str_replace only: text that must occur exactly once" },
                    "new_str": { "type": "string", "description": "str_replace only: replacement text" },
                    "insert_line": { "type": "integer", "description": "insert only: 0-based line index, 0..=line count" },
                    "insert_text": { "type": "string", "description": "insert only: text to insert" },
                    "old_path": { "type": "string", "description": "rename only: current path" },
                    "new_path": { "type": "string", "description": "rename only: destination path; must not exist" }
                },
                "required": ["command"]
            }),
        },
    }]
}

/// `None` if `name` is not a tool this module owns.
pub async fn execute<B: MemoryBackend>(
    name: &str,
    args: &serde_json::Value,
    journal: &MemoryJournal<B>,
    project_id: &str,
) -> Option<Result<String, String>> {
    match name {
        MEMORY_TOOL_NAME => Some(execute_memory(args, journal, project_id).await.map_err(String::from)),
        _ => None,
    }
}

async fn execute_memory<B: MemoryBackend>(
    args: &serde_json::Value,
    journal: &MemoryJournal<B>,
    project_id: &str,
) -> EngineResult<String> {
    let command = parse_args(args)?;
    let outcome = journal.apply_command(project_id, command).await?;
    info!(
        "[tools] memory: project={} error={} version={}",
        project_id, outcome.is_error, outcome.version
    );
    if outcome.is_error {
        Err(EngineError::tool(MEMORY_TOOL_NAME, outcome.content))
    } else {
        Ok(outcome.content)
    }
}

/// Decode tool arguments. A `view` without a path views the memory root.
pub fn parse_args(args: &serde_json::Value) -> EngineResult<ToolCommand> {
    let mut args = args.clone();
    if args["command"] == "view" && args.get("path").is_none() {
        args["path"] = serde_json::Value::String(MEMORY_ROOT.to_string());
    }
    serde_json::from_value(args)
        .map_err(|e| EngineError::tool(MEMORY_TOOL_NAME, format!("invalid arguments: {}", e)))
}
