//! Template instantiation into a virtual tree.

use tracing::{debug, instrument};

use crate::{
    application::tree::VirtualTree,
    domain::{DomainValidator as validator, RelativePath, TemplateContext, TemplateSet},
    error::ForgeResult,
};

/// Render `set` under `target_root` and stage the result in `tree`.
///
/// Every entry is rendered before anything is written, so an unresolved or
/// malformed token leaves the tree exactly as it was. Entries are processed
/// in sorted path order. Returns the staged paths.
///
/// # Errors
/// - `UnresolvedToken` / `MalformedTemplate` from rendering
/// - `MalformedTemplate` for duplicate entries in the set
#[instrument(skip_all, fields(set = %set.name, target = %target_root, entries = set.len()))]
pub fn instantiate(
    tree: &mut VirtualTree,
    set: &TemplateSet,
    target_root: &RelativePath,
    context: &TemplateContext,
) -> ForgeResult<Vec<RelativePath>> {
    validator::validate_template_set(set)?;

    let mut entries: Vec<_> = set.entries.iter().collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut rendered = Vec::with_capacity(entries.len());
    for entry in entries {
        let location = format!("{}/{}", set.name, entry.path);
        let relative = context.render_path(&entry.path)?;
        let content = context.render_content(&entry.content, &location)?;
        rendered.push((target_root.join_path(&relative), content));
    }

    let mut written = Vec::with_capacity(rendered.len());
    for (path, content) in rendered {
        debug!(path = %path, "template file rendered");
        tree.write(&path, content)?;
        written.push(path);
    }

    Ok(written)
}
