//! Turns text files into ingestion batches.
//!
//! A document is one paragraph (blank-line separated) of a `.txt` file. A
//! directory is walked recursively and its files are read in sorted order, so
//! the same corpus always yields the same batch order.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn load_documents(path: &Path) -> Result<Vec<String>> {
    let files = if path.is_dir() { list_txt_files(path) } else { vec![path.to_path_buf()] };
    let mut documents = Vec::new();
    for file in &files {
        let content = read_file_content(file)?;
        let before = documents.len();
        documents.extend(split_paragraphs(&content));
        debug!(file = %file.display(), documents = documents.len() - before, "loaded corpus file");
    }
    Ok(documents)
}

pub fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
    }
    txt_files.sort(); txt_files
}
