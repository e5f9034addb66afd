//! Splitting a document into multiple named outputs.
//!
//! Chunk extraction works by whitelist: clone the source, delete every
//! page outside the chunk in reverse order, prune orphaned objects, and
//! compress. Each chunk therefore keeps only the resources its own pages
//! reach.

use crate::document::{load_document, save_document, LoadOptions, SaveOptions};
use crate::error::PdfError;
use crate::ranges::parse_page_groups;
use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum SplitMode {
    /// One single-page output per page.
    EveryPage,
    /// One output per comma-separated range group, e.g. `"1-3, 5"`.
    Ranges(String),
    /// Consecutive chunks of exactly N pages; the last may be shorter.
    FixedChunks(usize),
    /// Chunks sized to approximately the given number of megabytes,
    /// assuming uniform per-page byte density. Documents with one huge
    /// page will overshoot; this is a documented estimate, not a cap.
    SizeLimit(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOptions {
    pub mode: SplitMode,
    /// Name template with `{filename}`, `{n}` and `{suffix}` placeholders.
    pub name_pattern: String,
    /// Original file name, used for the `{filename}` placeholder.
    pub source_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOutput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Partition a document into named outputs per the selected mode.
pub fn split_document(bytes: &[u8], options: &SplitOptions) -> Result<Vec<SplitOutput>, PdfError> {
    let doc = load_document(bytes, LoadOptions::default())?;
    let page_count = doc.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfError::Operation("document has no pages".into()));
    }

    let groups = page_groups(&options.mode, page_count, bytes.len());
    let stem = file_stem(&options.source_name);

    let mut outputs = Vec::with_capacity(groups.len());
    for (index, (pages, suffix)) in groups.into_iter().enumerate() {
        let chunk = extract_chunk(&doc, &pages, page_count)?;
        let name = render_name(&options.name_pattern, stem, index + 1, &suffix);
        outputs.push(SplitOutput { name, bytes: chunk });
    }

    Ok(outputs)
}

/// Resolve the mode into `(pages, suffix)` groups of 1-based page numbers.
fn page_groups(mode: &SplitMode, page_count: u32, input_len: usize) -> Vec<(Vec<u32>, String)> {
    match mode {
        SplitMode::EveryPage => (1..=page_count)
            .map(|page| (vec![page], format!("page_{}", page)))
            .collect(),

        SplitMode::Ranges(input) => parse_page_groups(input, page_count)
            .into_iter()
            .map(|group| {
                let suffix = range_suffix(&group);
                (group, suffix)
            })
            .collect(),

        SplitMode::FixedChunks(size) => chunked(page_count, (*size).max(1) as u32),

        SplitMode::SizeLimit(megabytes) => {
            let target_bytes = (megabytes * 1024.0 * 1024.0).max(1.0);
            let bytes_per_page = input_len as f64 / f64::from(page_count);
            let pages_per_chunk = ((target_bytes / bytes_per_page).floor() as u32).max(1);
            debug!(
                pages_per_chunk,
                page_count, "estimated chunk size from uniform page density"
            );
            chunked(page_count, pages_per_chunk)
        }
    }
}

fn chunked(page_count: u32, chunk_size: u32) -> Vec<(Vec<u32>, String)> {
    let mut groups = Vec::new();
    let mut start = 1;
    let mut part = 1;
    while start <= page_count {
        let end = (start + chunk_size - 1).min(page_count);
        groups.push(((start..=end).collect(), format!("part_{}", part)));
        start = end + 1;
        part += 1;
    }
    groups
}

fn range_suffix(group: &[u32]) -> String {
    match (group.first(), group.last()) {
        (Some(first), Some(last)) if first != last => format!("pages_{}-{}", first, last),
        (Some(first), _) => format!("page_{}", first),
        _ => "pages".to_string(),
    }
}

/// Build one output containing only the whitelisted pages.
fn extract_chunk(source: &Document, pages: &[u32], page_count: u32) -> Result<Vec<u8>, PdfError> {
    let mut chunk = source.clone();

    let keep: std::collections::HashSet<u32> = pages.iter().copied().collect();
    for page_number in (1..=page_count).rev() {
        if !keep.contains(&page_number) {
            chunk.delete_pages(&[page_number]);
        }
    }

    save_document(&mut chunk, &SaveOptions::default())
}

/// Substitute `{filename}`, `{n}` and `{suffix}`, forcing a `.pdf` suffix.
fn render_name(pattern: &str, stem: &str, n: usize, suffix: &str) -> String {
    let mut name = pattern
        .replace("{filename}", stem)
        .replace("{n}", &n.to_string())
        .replace("{suffix}", suffix);
    if !name.to_ascii_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }
    name
}

fn file_stem(source_name: &str) -> &str {
    source_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(source_name)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Rendered names always end in `.pdf`.
        #[test]
        fn names_end_in_pdf(
            pattern in "[a-z{}_]{0,20}",
            stem in "[a-z]{1,8}",
            n in 1usize..100,
        ) {
            let name = render_name(&pattern, &stem, n, "part_1");
            prop_assert!(name.to_ascii_lowercase().ends_with(".pdf"));
        }

        /// Fixed chunking covers every page exactly once, in order.
        #[test]
        fn chunking_is_a_partition(page_count in 1u32..60, chunk in 1u32..10) {
            let groups = chunked(page_count, chunk);
            let flat: Vec<u32> = groups.into_iter().flat_map(|(pages, _)| pages).collect();
            let expected: Vec<u32> = (1..=page_count).collect();
            prop_assert_eq!(flat, expected);
        }
    }
}
