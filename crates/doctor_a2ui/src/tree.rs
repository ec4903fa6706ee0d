use std::path::PathBuf;

use a2ui_core::{ComponentNode, Response, build_component_tree};
use a2ui_render::text::{OutlineGuides, TextBlock};
use clap::Args;

use crate::error::{DoctorError, Result};
use crate::util::{OutputOptions, read_json, to_json};

#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Response JSON file.
    pub file: PathBuf,

    /// Draw guides with ASCII characters.
    #[arg(long)]
    pub ascii: bool,
}

pub fn run_tree(args: &TreeArgs, opts: OutputOptions) -> Result<String> {
    let response: Response = serde_json::from_value(read_json(&args.file)?)?;
    let tree = build_component_tree(&response).ok_or_else(|| DoctorError::ComponentNotFound {
        id: response.root.clone(),
    })?;
    tracing::info!(nodes = tree.size(), depth = tree.depth(), "tree built");
    if opts.json {
        return to_json(&tree);
    }
    let guides = if args.ascii {
        OutlineGuides::Ascii
    } else {
        OutlineGuides::Unicode
    };
    Ok(outline(&tree, guides).render())
}

fn outline(node: &ComponentNode<'_>, guides: OutlineGuides) -> TextBlock {
    let component = node.component;
    let mut head = format!("{} ({})", component.id, component.kind);
    if let Some(expr) = &component.when {
        head.push_str(&format!(" when {expr:?}"));
    }
    let children = node
        .child_nodes
        .iter()
        .map(|child| outline(child, guides))
        .collect();
    TextBlock::branch(head, children, guides)
}
