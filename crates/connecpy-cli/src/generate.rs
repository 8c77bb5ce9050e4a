//! `generate` and `inspect` commands.

use anyhow::{Context, Result};
use colored::Colorize;
use connecpy_codegen::{
    build_file_model, files_with_services, generate, CodegenError, DescriptorGraph,
    GeneratedFile, GeneratorOptions, PythonRenderer,
};
use std::fs;
use std::path::Path;

pub fn cmd_generate(
    descriptor: &Path,
    out: &Path,
    files: &[String],
    suffix: Option<&str>,
) -> Result<()> {
    println!(
        "{} {}",
        "Generating connecpy stubs".green().bold(),
        descriptor.display()
    );

    let written = generate_to_dir(descriptor, out, files, suffix)?;
    tracing::info!(files = written.len(), out = %out.display(), "wrote connecpy stubs");
    for path in &written {
        println!("  {} {}", "→".cyan(), path);
    }
    println!("  files={}", written.len());
    Ok(())
}

pub fn cmd_inspect(descriptor: &Path, files: &[String]) -> Result<()> {
    let graph = load_graph(descriptor)?;
    let targets = targets(&graph, files);

    let models = targets
        .iter()
        .map(|name| {
            let id = graph
                .file_id(name)
                .ok_or_else(|| CodegenError::UnknownFile(name.clone()))?;
            build_file_model(&graph, id)
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!("{}", serde_json::to_string_pretty(&models)?);
    Ok(())
}

/// Generate and write every target; nothing is written if any file fails.
pub(crate) fn generate_to_dir(
    descriptor: &Path,
    out: &Path,
    files: &[String],
    suffix: Option<&str>,
) -> Result<Vec<String>> {
    let graph = load_graph(descriptor)?;
    let options = match suffix {
        Some(suffix) => GeneratorOptions::with_suffix(suffix)?,
        None => GeneratorOptions::default(),
    };

    let targets = targets(&graph, files);
    let generated = generate(&graph, &targets, &options, &PythonRenderer).into_result()?;
    write_files(out, &generated)?;
    Ok(generated.into_iter().map(|f| f.name).collect())
}

fn targets(graph: &DescriptorGraph, files: &[String]) -> Vec<String> {
    if files.is_empty() {
        files_with_services(graph)
    } else {
        files.to_vec()
    }
}

fn load_graph(path: &Path) -> Result<DescriptorGraph> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let graph = if is_json {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read descriptor json: {}", path.display()))?;
        DescriptorGraph::from_descriptor_set_json(&text)
    } else {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read descriptor set: {}", path.display()))?;
        DescriptorGraph::from_descriptor_set_bytes(&bytes)
    };
    graph.with_context(|| format!("invalid descriptor set: {}", path.display()))
}

fn write_files(out: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = out.join(&file.name);
        fs::create_dir_all(path.parent().unwrap_or(out))?;
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"{
      "file": [
        { "name": "example/haberdasher.proto", "package": "i2y.connecpy.example",
          "messageType": [ { "name": "Size" }, { "name": "Hat" } ],
          "service": [ { "name": "Haberdasher", "method": [
            { "name": "MakeHat", "inputType": ".i2y.connecpy.example.Size", "outputType": ".i2y.connecpy.example.Hat" } ] } ] },
        { "name": "broken.proto", "package": "broken",
          "service": [ { "name": "B", "method": [
            { "name": "M", "inputType": ".broken.X", "outputType": ".broken.X" } ] } ] }
      ]
    }"#;

    #[test]
    fn writes_generated_modules_under_out_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let descriptor = dir.path().join("descriptor.json");
        fs::write(&descriptor, DESCRIPTOR)?;
        let out = dir.path().join("gen");

        let written = generate_to_dir(
            &descriptor,
            &out,
            &["example/haberdasher.proto".to_string()],
            None,
        )?;
        assert_eq!(written, ["example/haberdasher_connecpy.py"]);

        let text = fs::read_to_string(out.join("example/haberdasher_connecpy.py"))?;
        assert!(text.contains("class HaberdasherClient(ConnecpyClient):"));
        Ok(())
    }

    #[test]
    fn suffix_flag_is_used_verbatim() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let descriptor = dir.path().join("descriptor.json");
        fs::write(&descriptor, DESCRIPTOR)?;
        let out = dir.path().join("gen");

        let written = generate_to_dir(
            &descriptor,
            &out,
            &["example/haberdasher.proto".to_string()],
            Some("_rpc,v2.py"),
        )?;
        assert_eq!(written, ["example/haberdasher_rpc,v2.py"]);
        assert!(out.join("example/haberdasher_rpc,v2.py").exists());

        let err = generate_to_dir(
            &descriptor,
            &out,
            &["example/haberdasher.proto".to_string()],
            Some("sub/_rpc.py"),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("suffix must be a non-empty file name suffix"));
        Ok(())
    }

    #[test]
    fn any_failure_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let descriptor = dir.path().join("descriptor.json");
        fs::write(&descriptor, DESCRIPTOR)?;
        let out = dir.path().join("gen");

        // Default targets include the broken file.
        let err = generate_to_dir(&descriptor, &out, &[], None).unwrap_err();
        assert!(format!("{err:#}").contains("broken.proto"));
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn missing_descriptor_is_reported_with_path() {
        let err = load_graph(Path::new("/nonexistent/descriptor.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/descriptor.json"));
    }
}
