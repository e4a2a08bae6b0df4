//! Lifecycle mapping.
//!
//! Combines at most one mount body and one unmount body into a single effect
//! block. The effect always has an empty dependency list, so it runs once per
//! component instance, mirroring mount-once / unmount-once semantics.

use crate::template::reindent;

/// A `useEffect` block derived from lifecycle callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectBlock {
    /// Statements run when the component mounts.
    pub setup: Option<String>,
    /// Statements registered as cleanup, run when the component unmounts.
    pub cleanup: Option<String>,
}

/// Maps the (already rewritten) mount and unmount bodies onto an effect block.
///
/// Returns `None` when neither callback is present.
pub fn map_lifecycle(mount: Option<String>, unmount: Option<String>) -> Option<EffectBlock> {
    if mount.is_none() && unmount.is_none() {
        return None;
    }
    Some(EffectBlock {
        setup: mount,
        cleanup: unmount,
    })
}

impl EffectBlock {
    /// Whether the block registers a cleanup function.
    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Renders the block at function-body indentation.
    pub fn render(&self) -> String {
        let mut out = String::from("  useEffect(() => {\n");

        let setup = self
            .setup
            .as_deref()
            .map(|body| reindent(body, "    "))
            .filter(|body| !body.is_empty());
        if let Some(setup) = &setup {
            out.push_str(setup);
            out.push('\n');
        }

        if let Some(cleanup) = &self.cleanup {
            if setup.is_some() {
                out.push('\n');
            }
            out.push_str("    return () => {\n");
            let cleanup = reindent(cleanup, "      ");
            if !cleanup.is_empty() {
                out.push_str(&cleanup);
                out.push('\n');
            }
            out.push_str("    };\n");
        }

        out.push_str("  }, []);\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_neither() {
        assert_eq!(map_lifecycle(None, None), None);
    }

    #[test]
    fn test_mount_only() {
        let block = map_lifecycle(Some("\n    load();\n  ".into()), None).unwrap();
        assert!(!block.has_cleanup());
        assert_eq!(block.render(), "  useEffect(() => {\n    load();\n  }, []);\n");
    }

    #[test]
    fn test_unmount_only() {
        let block = map_lifecycle(None, Some("\n    stop();\n  ".into())).unwrap();
        assert_eq!(
            block.render(),
            "  useEffect(() => {\n    return () => {\n      stop();\n    };\n  }, []);\n"
        );
    }

    #[test]
    fn test_mount_and_unmount() {
        let block = map_lifecycle(
            Some("\n    const id = start();\n  ".into()),
            Some("\n    stop(id);\n  ".into()),
        )
        .unwrap();
        assert!(block.has_cleanup());
        assert_eq!(
            block.render(),
            "  useEffect(() => {\n    const id = start();\n\n    return () => {\n      stop(id);\n    };\n  }, []);\n"
        );
    }
}
