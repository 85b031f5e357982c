//! `gazelab-merge` -- offline annotation consolidation tool.
//!
//! Reads any number of per-annotator store documents, regroups every
//! annotation record by its image identity, and writes one canonical
//! store with fresh sequential indices.
//!
//! # Usage
//!
//! ```text
//! gazelab-merge <input-dir | files...> [-o OUTPUT] [--tag-annotator]
//! ```
//!
//! A directory argument expands to its `*.json` files. The default
//! output is `annotations_merged.json`. With `--tag-annotator`, every
//! record is stamped with its source document's file stem unless it
//! already carries a tag.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gazelab_store::{document, merge};

const USAGE: &str = "Usage: gazelab-merge <input-dir | files...> [-o OUTPUT] [--tag-annotator]";

const DEFAULT_OUTPUT: &str = "annotations_merged.json";

#[derive(Debug, PartialEq)]
struct Args {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    tag_annotator: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gazelab_merge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Merge failed");
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let inputs = expand_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("no input JSON files found");
    }

    let report = merge::merge_documents(&inputs, args.tag_annotator)?;
    document::save(&args.output, &report.entries)
        .with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(
        files = report.files_merged,
        skipped = report.files_skipped,
        images = report.entries.len(),
        output = %args.output.display(),
        "Wrote merged annotations"
    );
    Ok(())
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut inputs = Vec::new();
    let mut output = PathBuf::from(DEFAULT_OUTPUT);
    let mut tag_annotator = false;

    let mut argv = argv.into_iter();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--tag-annotator" => tag_annotator = true,
            "-o" | "--output" => {
                let Some(path) = argv.next() else {
                    bail!("{arg} requires a path argument");
                };
                output = PathBuf::from(path);
            }
            other if other.starts_with('-') => bail!("unknown option: {other}"),
            other => inputs.push(PathBuf::from(other)),
        }
    }

    if inputs.is_empty() {
        bail!("no inputs given");
    }
    Ok(Args {
        inputs,
        output,
        tag_annotator,
    })
}

/// Expand directory arguments to their `*.json` children; plain files
/// pass through. The merge engine re-sorts the full list, so expansion
/// order does not matter.
fn expand_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(json_files_in(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn json_files_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "json")
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> anyhow::Result<Args> {
        parse_args(argv.iter().map(|s| s.to_string()))
    }

    // -- parse_args ----------------------------------------------------------

    #[test]
    fn positional_inputs_and_defaults() {
        let parsed = args(&["a.json", "b.json"]).unwrap();
        assert_eq!(parsed.inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(parsed.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(!parsed.tag_annotator);
    }

    #[test]
    fn output_flag_is_honored() {
        let parsed = args(&["participants", "-o", "merged.json"]).unwrap();
        assert_eq!(parsed.output, PathBuf::from("merged.json"));
    }

    #[test]
    fn tag_annotator_flag_is_honored() {
        let parsed = args(&["participants", "--tag-annotator"]).unwrap();
        assert!(parsed.tag_annotator);
    }

    #[test]
    fn missing_output_value_is_an_error() {
        assert!(args(&["a.json", "-o"]).is_err());
    }

    #[test]
    fn unknown_option_is_an_error() {
        assert!(args(&["a.json", "--frobnicate"]).is_err());
    }

    #[test]
    fn no_inputs_is_an_error() {
        assert!(args(&["--tag-annotator"]).is_err());
    }

    // -- expand_inputs -------------------------------------------------------

    #[test]
    fn directories_expand_to_sorted_json_children() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.json"), "[]").unwrap();
        std::fs::write(dir.path().join("a.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let files = expand_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn plain_files_pass_through() {
        let files = expand_inputs(&[PathBuf::from("x.json")]).unwrap();
        assert_eq!(files, vec![PathBuf::from("x.json")]);
    }
}
