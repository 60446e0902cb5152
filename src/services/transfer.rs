//! Import and export service
//!
//! Moves diary entries between the database and plain markdown files.
//! The format is deliberately simple: a `# title` line, the body, and
//! an optional trailing `tags:` line. Anything a text editor can
//! produce should round-trip.

use crate::config;
use crate::database::{CreateDiaryRequest, DiaryWithTags, Repository};
use crate::error::{AppError, Result};
use crate::services::diaries::DiariesService;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Service for importing and exporting entries as markdown files
#[derive(Clone)]
pub struct TransferService {
    repo: Repository,
    diaries: DiariesService,
}

impl TransferService {
    pub fn new(repo: Repository) -> Self {
        let diaries = DiariesService::new(repo.clone());
        Self { repo, diaries }
    }

    /// Export every diary entry as a markdown file into `target_dir`.
    /// Returns the paths written.
    pub async fn export_all(&self, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.diaries.list_diaries().await?;

        tracing::info!(
            "Exporting {} entries to {:?}",
            entries.len(),
            target_dir
        );

        fs::create_dir_all(target_dir).await?;

        let mut written = Vec::with_capacity(entries.len());
        for entry in &entries {
            let path = target_dir.join(export_file_name(entry));
            fs::write(&path, render_markdown(entry)).await?;
            written.push(path);
        }

        tracing::info!("Export finished, {} files written", written.len());

        Ok(written)
    }

    /// Import a markdown file, or every `.md` file in a directory.
    /// Files that fail to parse or validate are skipped with a warning
    /// so one bad file cannot abort a bulk import.
    pub async fn import(&self, source: &Path) -> Result<ImportReport> {
        let meta = fs::metadata(source).await.map_err(|_| {
            AppError::Import(format!("Cannot read import source: {:?}", source))
        })?;

        let files = if meta.is_dir() {
            let mut files = Vec::new();
            let mut dir = fs::read_dir(source).await?;
            while let Some(entry) = dir.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "md") {
                    files.push(path);
                }
            }
            files.sort();
            files
        } else {
            vec![source.to_path_buf()]
        };

        if files.is_empty() {
            return Err(AppError::Import(format!(
                "No markdown files found in {:?}",
                source
            )));
        }

        let mut report = ImportReport::default();

        for path in files {
            match self.import_file(&path).await {
                Ok(()) => report.imported += 1,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            "Import finished: {} imported, {} skipped",
            report.imported,
            report.skipped
        );

        Ok(report)
    }

    async fn import_file(&self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).await?;
        let parsed = parse_markdown(&text, path)?;

        let entry = self
            .diaries
            .create_diary(CreateDiaryRequest {
                title: parsed.title,
                content: parsed.body,
                ..Default::default()
            })
            .await?;

        for name in parsed.tags {
            let tag = self
                .repo
                .get_or_create_tag(&name, config::DEFAULT_TAG_COLOR)
                .await?;
            self.repo.attach_tag(&entry.diary.id, &tag.id).await?;
        }

        Ok(())
    }
}

struct ParsedEntry {
    title: String,
    body: String,
    tags: Vec<String>,
}

/// Render an entry in the interchange format
fn render_markdown(entry: &DiaryWithTags) -> String {
    let mut out = format!("# {}\n\n{}", entry.diary.title, entry.diary.content);

    if !out.ends_with('\n') {
        out.push('\n');
    }

    if !entry.tags.is_empty() {
        let names: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
        out.push('\n');
        out.push_str(&format!("tags: {}\n", names.join(", ")));
    }

    out
}

/// Parse the interchange format. The title comes from the first `# `
/// line, falling back to the file stem; a final `tags:` line is split
/// on commas.
fn parse_markdown(text: &str, path: &Path) -> Result<ParsedEntry> {
    let mut lines: Vec<&str> = text.lines().collect();

    let title = match lines.first() {
        Some(first) if first.starts_with("# ") => {
            let title = first[2..].trim().to_string();
            lines.remove(0);
            title
        }
        _ => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::Import(format!("No title in {:?}", path)))?,
    };

    if title.is_empty() {
        return Err(AppError::Import(format!("Empty title in {:?}", path)));
    }

    // Peel a trailing tags line off the body
    let mut tags = Vec::new();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if let Some(last) = lines.last() {
        if let Some(rest) = last.trim().strip_prefix("tags:") {
            tags = rest
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            lines.pop();
        }
    }

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    Ok(ParsedEntry {
        title,
        body: lines.join("\n"),
        tags,
    })
}

/// Derive an export filename: created date plus a slug of the title
fn export_file_name(entry: &DiaryWithTags) -> String {
    format!(
        "{}_{}.md",
        entry.diary.created_at.format("%Y-%m-%d"),
        slugify(&entry.diary.title)
    )
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}
