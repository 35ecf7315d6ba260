//! Print the code highlighting stylesheet

use anyhow::Result;
use std::io::Write;

use crate::ContentStore;

/// Write the stylesheet for highlighted code blocks
pub fn run<W: Write>(out: &mut W, store: &ContentStore) -> Result<()> {
    out.write_all(store.get_highlight_stylesheet().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;

    #[test]
    fn test_css_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), &HighlightConfig::default());
        let mut out = Vec::new();
        run(&mut out, &store).unwrap();
        let css = String::from_utf8(out).unwrap();
        assert!(css.contains(".highlight .hl-"));
    }
}
