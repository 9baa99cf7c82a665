//! Output generation for compiled Flogo applications
//!
//! This crate writes a [`Compilation`] to disk either as a JSON descriptor
//! (`flogo.json`) or as a Go program embedding that descriptor (`app.go`).
//! Both forms come with `support.go`, which holds the placeholder methods
//! the generated pipelines invoke.

mod templates;

use asyncapi_flogo_common::{Compilation, GeneratorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::debug;

/// Shape of the generated application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Go program embedding the descriptor (`app.go`)
    ApiApp,
    /// JSON descriptor (`flogo.json`)
    Descriptor,
}

impl OutputKind {
    pub fn identifier(&self) -> &'static str {
        match self {
            OutputKind::ApiApp => "flogoapiapp",
            OutputKind::Descriptor => "flogodescriptor",
        }
    }

    /// Main file written for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputKind::ApiApp => "app.go",
            OutputKind::Descriptor => "flogo.json",
        }
    }
}

/// Application generator
///
/// Renders a compiled application into:
/// - flogo.json or app.go
/// - support.go
pub struct AppGenerator {
    compilation: Compilation,
    tera: Tera,
}

impl AppGenerator {
    /// Create a new generator for a compiled application
    pub fn new(compilation: Compilation) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { compilation, tera })
    }

    /// Write the application to a directory, returning the written paths
    ///
    /// Nothing is touched on disk until every file has rendered. Files are
    /// staged next to their destination and only renamed into place once all
    /// of them were written.
    pub fn generate_to_directory(
        &self,
        output_dir: &Path,
        kind: OutputKind,
    ) -> Result<Vec<PathBuf>> {
        let main = match kind {
            OutputKind::ApiApp => self.render_app_go()?,
            OutputKind::Descriptor => self.render_descriptor()?,
        };
        let support = self.render_support_go()?;

        fs::create_dir_all(output_dir)?;
        let files = [(kind.file_name(), main), ("support.go", support)];

        let mut staged = Vec::with_capacity(files.len());
        for (name, content) in &files {
            match stage_file(output_dir, name, content) {
                Ok(path) => staged.push((path, output_dir.join(name))),
                Err(e) => {
                    discard(&staged);
                    return Err(e);
                }
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        for (index, (staging, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(staging, path) {
                discard(&staged[index..]);
                return Err(e.into());
            }
            debug!(path = %path.display(), "wrote file");
            written.push(path.clone());
        }
        Ok(written)
    }

    /// Pretty-printed JSON descriptor
    pub fn render_descriptor(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.compilation.app)?)
    }

    /// Go program embedding the descriptor
    pub fn render_app_go(&self) -> Result<String> {
        let mut context = self.create_context();
        context.insert("descriptor", &self.render_descriptor()?);
        self.tera
            .render("app.go", &context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {:?}", e)))
    }

    /// Placeholder methods registered with the method invoker
    pub fn render_support_go(&self) -> Result<String> {
        let context = self.create_context();
        self.tera
            .render("support.go", &context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {:?}", e)))
    }

    /// Create template context from the compilation
    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("app", &self.compilation.app);
        context.insert("imports", &self.compilation.app.imports);
        context.insert("methods", &self.compilation.support.methods);
        context
    }
}

fn stage_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(format!(".{}.tmp", name));
    fs::write(&path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "staged file");
    Ok(path)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (staging, _) in staged {
        let _ = fs::remove_file(staging);
    }
}

/// Generate an application (convenience function)
pub fn generate_app(
    compilation: Compilation,
    output_dir: &Path,
    kind: OutputKind,
) -> Result<Vec<PathBuf>> {
    let generator = AppGenerator::new(compilation)?;
    generator.generate_to_directory(output_dir, kind)
}
