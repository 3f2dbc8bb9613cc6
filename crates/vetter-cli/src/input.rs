//! Dependency list input.
//!
//! Accepts either a full request object
//! (`{"projectLicense": "MIT", "dependencies": [...]}`) or a bare array of
//! dependencies, from a file or stdin.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use vetter_core::{AnalysisRequest, Dependency};

#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    List(Vec<Dependency>),
    Request(AnalysisRequest),
}

/// Parse an input document.
pub fn parse_request(contents: &str) -> Result<AnalysisRequest> {
    let document: InputDocument = serde_json::from_str(contents).context(
        "Input must be a dependency array or an object with a \"dependencies\" array",
    )?;

    let request = match document {
        InputDocument::List(dependencies) => AnalysisRequest::new(dependencies),
        InputDocument::Request(request) => request,
    };

    for (index, dep) in request.dependencies.iter().enumerate() {
        if dep.name.trim().is_empty() {
            bail!("Dependency #{} has an empty name", index + 1);
        }
        if dep.version.trim().is_empty() {
            bail!("Dependency '{}' has an empty version", dep.name);
        }
    }

    Ok(request)
}

/// Read the request from `path`, or stdin when `path` is absent or `-`.
pub fn load_request(path: Option<&Path>) -> Result<AnalysisRequest> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            buffer
        }
    };

    parse_request(&contents)
}
