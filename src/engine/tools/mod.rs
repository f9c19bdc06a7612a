// Paw Memory Journal — Tool Registry & Dispatcher
// Each tool group is a self-contained module with definitions + executor.

use crate::atoms::types::*;
use crate::engine::journal::orchestrator::MemoryJournal;
use crate::engine::store::MemoryBackend;
use log::{info, warn};

pub mod memory_fs;

impl ToolDefinition {
    /// Every tool this crate can execute.
    pub fn builtins() -> Vec<Self> {
        let mut tools = Vec::new();
        tools.extend(memory_fs::definitions());
        tools
    }
}

// ── Main executor ──────────────────────────────────────────────────────────

/// Execute one tool call given its name and raw JSON arguments.
pub async fn execute_tool<B: MemoryBackend>(
    name: &str,
    args_str: &str,
    journal: &MemoryJournal<B>,
    project_id: &str,
) -> Result<String, String> {
    info!(
        "[tools] Executing tool: {} project={} args={}",
        name,
        project_id,
        args_str.chars().take(200).collect::<String>()
    );

    let args: serde_json::Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(parse_err) => {
            warn!("[tools] Malformed tool args for '{}': {}", name, parse_err);
            return Err(format!("Malformed arguments for {}: {}", name, parse_err));
        }
    };

    if let Some(result) = memory_fs::execute(name, &args, journal, project_id).await {
        return result;
    }
    Err(format!("Unknown tool: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SqliteMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn dispatches_by_name() {
        let journal = MemoryJournal::new(Arc::new(SqliteMemoryStore::open_in_memory().unwrap()));
        let created = execute_tool(
            "memory",
            r#"{"command":"create","path":"/memories/x","file_text":"1"}"#,
            &journal,
            "p",
        )
        .await;
        assert!(created.is_ok());
        assert_eq!(execute_tool("exec", "{}", &journal, "p").await, Err("Unknown tool: exec".to_string()));
        assert!(execute_tool("memory", "{not json", &journal, "p").await.is_err());
    }

    #[test]
    fn builtins_include_memory() {
        assert!(ToolDefinition::builtins().iter().any(|t| t.function.name == "memory"));
    }
}
