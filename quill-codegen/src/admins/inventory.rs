//! Source-inventory generation.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use parking_lot::Mutex;

use crate::admin::Administrator;
use crate::callbacks::DeferredCallback;
use crate::context::RunContext;

/// Generates a `modules.txt` listing for every project and a tree-wide
/// `summary.txt` through the root pseudo-project's writer.
///
/// Per-project inventories are cached by the projects' own collection
/// tasks; this administrator only holds on to the run context during
/// `collect` and defers the cross-project aggregation to a callback,
/// where all collection is guaranteed to have finished.
#[derive(Default)]
pub struct InventoryAdministrator {
    state: Arc<Mutex<InventoryState>>,
}

#[derive(Default)]
struct InventoryState {
    ctx: Option<Arc<RunContext>>,
    per_project: Vec<(String, usize)>,
    tree_total: usize,
}

impl InventoryAdministrator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Administrator for InventoryAdministrator {
    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn collect(&self, ctx: Arc<RunContext>) -> Result<()> {
        // Inventories belong to the projects' own collection tasks, which
        // run concurrently with this one; counting happens in the
        // deferred callback.
        self.state.lock().ctx = Some(ctx);
        Ok(())
    }

    fn deferred_callbacks(&self) -> Vec<DeferredCallback> {
        let state = self.state.clone();
        vec![DeferredCallback::new(0, move || {
            let mut state = state.lock();
            let Some(ctx) = state.ctx.clone() else { return };
            state.per_project = ctx
                .registry()
                .projects()
                .map(|p| (p.namespace().to_string(), p.source_count()))
                .collect();
            state.tree_total = state.per_project.iter().map(|(_, count)| count).sum();
        })]
    }

    async fn generate(&self, ctx: Arc<RunContext>) -> Result<()> {
        for project in ctx.registry().projects() {
            let mut listing = format!("# Sources of {}\n", project.namespace());
            for source in project.sources() {
                let relative = source
                    .strip_prefix(project.directory())
                    .unwrap_or(&source)
                    .display()
                    .to_string();
                listing.push_str(&relative);
                listing.push('\n');
            }
            project.writer().write("modules.txt", &listing)?;
        }

        let state = self.state.lock();
        let mut summary = String::from("# Module inventory\n");
        for (namespace, count) in &state.per_project {
            summary.push_str(&format!("{namespace}: {count}\n"));
        }
        summary.push_str(&format!("total: {}\n", state.tree_total));
        ctx.registry().root().writer().write("summary.txt", &summary)?;

        Ok(())
    }
}
