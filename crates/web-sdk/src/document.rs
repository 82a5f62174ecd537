//! Host page seam — the only place the SDK touches the document.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pixel_core::PixelResult;

/// An external `<script>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTag {
    pub element_id: Uuid,
    pub src: String,
    pub mime_type: String,
    pub is_async: bool,
}

impl ScriptTag {
    pub fn external(src: impl Into<String>) -> Self {
        Self {
            element_id: Uuid::new_v4(),
            src: src.into(),
            mime_type: "text/javascript".into(),
            is_async: true,
        }
    }
}

/// A page that can host script elements. Implementations without a document
/// context return [`pixel_core::PixelError::InjectionFailure`].
pub trait Document: Send + Sync {
    fn insert_script(&self, tag: &ScriptTag) -> PixelResult<()>;
}

/// Document kept in memory. Scripts are inserted ahead of existing ones.
#[derive(Default)]
pub struct InMemoryDocument {
    scripts: Mutex<Vec<ScriptTag>>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.scripts.lock().clone()
    }

    pub fn script_count(&self) -> usize {
        self.scripts.lock().len()
    }
}

impl Document for InMemoryDocument {
    fn insert_script(&self, tag: &ScriptTag) -> PixelResult<()> {
        self.scripts.lock().insert(0, tag.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_insert_first() {
        let doc = InMemoryDocument::new();
        doc.insert_script(&ScriptTag::external("https://a.example/one.js"))
            .unwrap();
        doc.insert_script(&ScriptTag::external("https://a.example/two.js"))
            .unwrap();

        let scripts = doc.scripts();
        assert_eq!(doc.script_count(), 2);
        assert_eq!(scripts[0].src, "https://a.example/two.js");
        assert!(scripts[0].is_async);
        assert_eq!(scripts[0].mime_type, "text/javascript");
        assert_ne!(scripts[0].element_id, scripts[1].element_id);
    }
}
