//! CLI route: single route table and run context.

use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, EditorConfig};
use crate::emit::Emitter;
use crate::error::ApiError;
use crate::import::{Importer, SyntaxNode};
use crate::tree::{FrameTree, TreeSnapshot};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: workspace and effective configuration.
/// Built from the workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: EditorConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::ConfigError(joined));
        }
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Emit { tree, positions } => self.handle_emit(tree, *positions),
            Commands::Import { cst, tree, out } => {
                self.handle_import(cst, tree.as_deref(), out.as_deref())
            }
            Commands::Check { tree } => self.handle_check(tree),
            Commands::Config => self.handle_config(),
        };
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    fn handle_emit(&self, tree_path: &Path, positions: bool) -> Result<String, ApiError> {
        let tree = load_tree(tree_path)?;
        let program = Emitter::with_indent(&tree, &self.config.indent).emit()?;
        if positions {
            let output = json!({
                "text": program.text,
                "positions": program.positions,
            });
            return Ok(serde_json::to_string_pretty(&output)?);
        }
        Ok(program.text)
    }

    fn handle_import(
        &self,
        cst_path: &Path,
        tree_path: Option<&Path>,
        out: Option<&Path>,
    ) -> Result<String, ApiError> {
        let root: SyntaxNode = serde_json::from_str(&std::fs::read_to_string(cst_path)?)?;
        let mut tree = match tree_path {
            Some(path) => load_tree(path)?,
            None => FrameTree::new(),
        };
        let batch = Importer::new(self.config.import.clone(), tree.next_id()).build(&root)?;
        let placed = tree.splice_imported(batch)?;
        info!(top_level = placed.len(), "Imported syntax tree");

        if let Some(out) = out {
            let snapshot = serde_json::to_string_pretty(&tree.snapshot())?;
            std::fs::write(out, snapshot)?;
        }
        Ok(Emitter::with_indent(&tree, &self.config.indent).emit()?.text)
    }

    fn handle_check(&self, tree_path: &Path) -> Result<String, ApiError> {
        let tree = load_tree(tree_path)?;
        Ok(format!(
            "{}: {} frames, next id {}, all invariants hold",
            tree_path.display(),
            tree.len(),
            tree.next_id()
        ))
    }

    fn handle_config(&self) -> Result<String, ApiError> {
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))?;
        let workspace_file = ConfigLoader::workspace_config_path(&self.workspace_root);
        Ok(format!(
            "# workspace file: {}\n{}",
            workspace_file.display(),
            rendered
        ))
    }
}

/// Read and validate a tree snapshot.
fn load_tree(path: &Path) -> Result<FrameTree, ApiError> {
    let snapshot: TreeSnapshot = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(FrameTree::from_snapshot(snapshot)?)
}
