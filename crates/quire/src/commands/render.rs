//! Render command.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::ValueEnum;
use quire_render::{RenderConfig, RenderedDocument, Renderer};
use rayon::prelude::*;

use crate::templates::PageTemplate;

/// What to write for each rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Frontmatter, table of contents and HTML as one JSON object
    Json,
    /// The HTML fragment only
    Html,
    /// A standalone HTML page
    Page,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html | OutputFormat::Page => "html",
        }
    }
}

/// Renders files with one shared renderer.
struct Job {
    renderer: Renderer,
    templates: PageTemplate,
    format: OutputFormat,
}

impl Job {
    fn render_file(&self, path: &Path) -> Result<String> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = self
            .renderer
            .render(&source)
            .with_context(|| format!("Failed to render {}", path.display()))?;

        self.format_document(&doc)
    }

    fn format_document(&self, doc: &RenderedDocument) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(doc)?,
            OutputFormat::Html => doc.html.clone(),
            OutputFormat::Page => self.templates.render(doc)?,
        })
    }

    fn output_path(&self, path: &Path, out_dir: &Path) -> Result<PathBuf> {
        let stem = path
            .file_stem()
            .with_context(|| format!("No file name in {}", path.display()))?;

        Ok(out_dir.join(format!(
            "{}.{}",
            stem.to_string_lossy(),
            self.format.extension()
        )))
    }

    fn write_file(&self, path: &Path, target: &Path) -> Result<()> {
        let output = self.render_file(path)?;

        fs::write(target, output)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        Ok(())
    }
}

/// Run the render command.
pub fn run(
    config: &RenderConfig,
    files: &[PathBuf],
    format: OutputFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let job = Job {
        renderer: Renderer::new(config)?,
        templates: PageTemplate::new(),
        format,
    };

    match (files, out) {
        ([file], None) => {
            print!("{}", job.render_file(file)?);
            Ok(())
        }
        (files, out) => {
            let out_dir = out.unwrap_or_else(|| PathBuf::from("dist"));
            render_all(&job, files, &out_dir)
        }
    }
}

/// Pair each input with its output path.
///
/// Inputs that share a file stem would write the same output, so they are
/// rejected before anything is rendered.
fn plan_outputs<'a>(
    job: &Job,
    files: &'a [PathBuf],
    out_dir: &Path,
) -> Result<Vec<(&'a PathBuf, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(files.len());

    for file in files {
        let target = job.output_path(file, out_dir)?;
        if let Some(previous) = claimed.insert(target.clone(), file) {
            anyhow::bail!(
                "Both {} and {} would write {}",
                previous.display(),
                file.display(),
                target.display()
            );
        }
        plan.push((file, target));
    }

    Ok(plan)
}

fn render_all(job: &Job, files: &[PathBuf], out_dir: &Path) -> Result<()> {
    let start = Instant::now();

    let plan = plan_outputs(job, files, out_dir)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let results: Vec<Result<&PathBuf>> = plan
        .par_iter()
        .map(|(file, target)| job.write_file(file, target).map(|()| target))
        .collect();

    let mut failed = 0;
    for result in results {
        match result {
            Ok(target) => tracing::debug!("Wrote {}", target.display()),
            Err(e) => {
                tracing::warn!("{:#}", e);
                failed += 1;
            }
        }
    }

    tracing::info!(
        "Rendered {} of {} files in {}ms",
        files.len() - failed,
        files.len(),
        start.elapsed().as_millis()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} files failed to render", failed, files.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn job(format: OutputFormat) -> Job {
        Job {
            renderer: Renderer::default(),
            templates: PageTemplate::new(),
            format,
        }
    }

    #[test]
    fn writes_one_file_per_input() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.md");
        let second = dir.path().join("second.md");
        fs::write(&first, "---\ntitle: First\n---\n# One\n").unwrap();
        fs::write(&second, "# Two\n").unwrap();
        let out = dir.path().join("out");

        render_all(&job(OutputFormat::Json), &[first, second], &out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("first.json")).unwrap()).unwrap();
        assert_eq!(json["front_matter"]["title"], "First");
        assert_eq!(json["toc"][0]["id"], "one");
        assert!(out.join("second.json").exists());
    }

    #[test]
    fn html_format_writes_fragment() {
        let dir = tempdir().unwrap();
        let post = dir.path().join("post.md");
        fs::write(&post, "# Hello\n").unwrap();
        let out = dir.path().join("out");

        render_all(&job(OutputFormat::Html), &[post], &out).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("post.html")).unwrap(),
            "<h1 id=\"hello\">Hello</h1>\n"
        );
    }

    #[test]
    fn page_format_wraps_document() {
        let job = job(OutputFormat::Page);
        let doc = job.renderer.render("# Hello\n").unwrap();

        let page = job.format_document(&doc).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<h1 id=\"hello\">Hello</h1>"));
    }

    #[test]
    fn failures_are_counted_but_others_still_render() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.md");
        let broken = dir.path().join("broken.md");
        fs::write(&good, "# Fine\n").unwrap();
        fs::write(&broken, "---\ntitle: never closed\n").unwrap();
        let missing = dir.path().join("missing.md");
        let out = dir.path().join("out");

        let result = render_all(&job(OutputFormat::Html), &[good, broken, missing], &out);

        let message = result.unwrap_err().to_string();
        assert_eq!(message, "2 of 3 files failed to render");
        assert!(out.join("good.html").exists());
        assert!(!out.join("broken.html").exists());
    }

    #[test]
    fn same_stem_in_different_directories_is_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("post.md");
        let second = dir.path().join("b").join("post.md");
        fs::write(&first, "# First\n").unwrap();
        fs::write(&second, "# Second\n").unwrap();
        let out = dir.path().join("out");

        let files = [first.clone(), second.clone()];

        let result = render_all(&job(OutputFormat::Html), &files, &out);

        let message = result.unwrap_err().to_string();
        assert!(message.contains(&first.display().to_string()));
        assert!(message.contains(&second.display().to_string()));
        assert!(message.contains("post.html"));
        assert!(!out.join("post.html").exists());
    }

    #[test]
    fn same_stem_is_fine_when_outputs_differ() {
        let dir = tempdir().unwrap();
        let files = [dir.path().join("a.md"), dir.path().join("b.md")];

        let plan = plan_outputs(&job(OutputFormat::Json), &files, Path::new("dist")).unwrap();

        assert_eq!(plan[0].1, Path::new("dist").join("a.json"));
        assert_eq!(plan[1].1, Path::new("dist").join("b.json"));
    }

    #[test]
    fn extension_follows_format() {
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Html.extension(), "html");
        assert_eq!(OutputFormat::Page.extension(), "html");
    }
}
