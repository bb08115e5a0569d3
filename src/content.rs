//! Default content for files created by `write` operations.

use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder replaced by the file's base name inside configured templates.
const NAME_VAR: &str = "${name}";

/// Maps a file's extension to its initial content.
///
/// Configured templates (keyed by `.ext`) win; `.html` and `.js` fall back to built-in
/// boilerplate; everything else starts empty.
#[derive(Debug, Clone, Default)]
pub struct ContentProvider {
    templates: BTreeMap<String, String>,
}

impl ContentProvider {
    /// Template keys may be given with or without the leading dot.
    pub fn new<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let templates = templates
            .into_iter()
            .map(|(ext, template)| (normalize_ext(ext.as_ref()), template.into()))
            .collect();
        Self { templates }
    }

    pub fn templates(&self) -> &BTreeMap<String, String> {
        &self.templates
    }

    /// Content for the file at `rel_path` (a `/`-joined path relative to the run root).
    pub fn content_for(&self, rel_path: &str) -> Vec<u8> {
        let path = Path::new(rel_path);
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        // an empty template counts as absent
        if let Some(template) = self.templates.get(&ext).filter(|t| !t.is_empty()) {
            return template.replace(NAME_VAR, &base).into_bytes();
        }

        match ext.as_str() {
            ".html" => {
                let title = base.strip_suffix(".html").unwrap_or(&base);
                format!(
                    "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n\n</body>\n</html>\n"
                )
                .into_bytes()
            }
            ".js" => format!("// {rel_path}\nconsole.log('Loaded {base}');\n").into_bytes(),
            _ => Vec::new(),
        }
    }
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
