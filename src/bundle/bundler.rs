//! The bundle step: emit the script, its wasm assets and the copied files
//!
//! Output is staged next to the output directory and only moved into place
//! once every file has been written, so a failed run never leaves a partial
//! output directory behind.

use crate::bundle::config::{BundleConfig, Mode, WasmStrategy};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the runtime helper injected in loader mode
pub const WASM_LOADER_FN: &str = "__pallet_load_wasm";

const WASM_LOADER_PRELUDE: &str = r#"const __pallet_load_wasm = (asset) =>
  fetch(new URL(asset, document.baseURI))
    .then((response) => WebAssembly.instantiateStreaming(response, {}))
    .then(({ instance }) => instance.exports);
"#;

/// Errors raised by the bundle step
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Entry file not found: {0}")]
    EntryNotFound(PathBuf),

    #[error("Wasm module '{spec}' imported by {entry} not found")]
    WasmNotFound { spec: String, entry: PathBuf },

    #[error("Copy source matched nothing: {0}")]
    CopySourceNotFound(String),

    #[error("Named imports from '{0}' need native async WebAssembly")]
    UnsupportedImport(String),

    #[error("Import of '{0}' is not a static `import <binding> from` statement")]
    UnrecognizedImport(String),

    #[error("Output directory {0} would overwrite project sources")]
    OutputOverlapsSources(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Copy failed: {0}")]
    Copy(#[from] fs_extra::error::Error),
}

pub type BundleResult<T> = std::result::Result<T, BundleError>;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> BundleError + '_ {
    move |source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What a successful bundle run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub output_dir: PathBuf,
    pub script: PathBuf,
    /// Emitted wasm asset names, sorted
    pub assets: Vec<String>,
    /// Files copied by the copy patterns, relative to the output directory
    pub copied: Vec<PathBuf>,
}

/// A `.wasm` import found in the entry script
#[derive(Debug, Clone)]
struct WasmImport {
    spec: String,
    source: PathBuf,
    asset: String,
}

fn wasm_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let namespace = r"\*\s+as\s+[\w$]+";
        let named = r"\{[^}]*\}";
        let binding = format!(
            r"[\w$]+(?:\s*,\s*(?:{namespace}|{named}))?|{namespace}|{named}",
            namespace = namespace,
            named = named
        );
        Regex::new(&format!(
            r#"(?m)^[ \t]*import\s+(?P<binding>{})\s+from\s+["'](?P<spec>[^"']+\.wasm)["'];?"#,
            binding
        ))
        .expect("wasm import pattern is valid")
    })
}

// Any mention of a `.wasm` module as an import source, rewritable or not
fn any_wasm_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?m)(?:^[ \t]*import\b[^;\n]*?|\bfrom\s*|\bimport\s*\(\s*)"#,
            r#"["'](?P<spec>[^"'\n]+\.wasm)["']"#
        ))
        .expect("wasm reference pattern is valid")
    })
}

/// Runs the bundle step for configurations rooted at a project directory
pub struct Bundler {
    root: PathBuf,
}

impl Bundler {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the bundle step
    pub fn bundle(&self, config: &BundleConfig) -> BundleResult<BundleReport> {
        info!("Bundling {} ({})", config.name, config.mode.as_str());

        let entry = self.root.join(&config.entry);
        if !entry.is_file() {
            return Err(BundleError::EntryNotFound(entry));
        }
        let source = fs::read_to_string(&entry).map_err(io_err(&entry))?;

        let imports = self.collect_wasm_imports(&entry, &source)?;
        let copy_sources = self.collect_copy_sources(config)?;
        let script = render_script(config, &source, &imports)?;

        let output_dir = self.root.join(&config.output.path);
        let inputs = std::iter::once(entry.as_path())
            .chain(imports.iter().map(|import| import.source.as_path()))
            .chain(copy_sources.iter().map(|(src, _)| src.as_path()));
        check_output_dir(&self.root, &output_dir, inputs)?;
        let staging = staging_dir(&output_dir);
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(io_err(&staging))?;
        }

        let staged = self.write_staging(config, &staging, &script, &imports, &copy_sources);
        let copied = match staged {
            Ok(copied) => copied,
            Err(e) => {
                warn!("Bundle failed, discarding {}", staging.display());
                let _ = fs::remove_dir_all(&staging);
                return Err(e);
            }
        };

        if output_dir.exists() {
            fs::remove_dir_all(&output_dir).map_err(io_err(&output_dir))?;
        }
        fs::rename(&staging, &output_dir).map_err(io_err(&output_dir))?;

        let assets: Vec<String> = imports
            .iter()
            .map(|import| import.asset.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            "Emitted {} with {} wasm asset(s) and {} copied file(s)",
            config.output.filename,
            assets.len(),
            copied.len()
        );

        Ok(BundleReport {
            script: output_dir.join(&config.output.filename),
            output_dir,
            assets,
            copied,
        })
    }

    fn collect_wasm_imports(&self, entry: &Path, source: &str) -> BundleResult<Vec<WasmImport>> {
        let base = entry.parent().unwrap_or(&self.root);
        let mut imports = Vec::new();

        let rewritable: Vec<_> = wasm_import_regex()
            .find_iter(source)
            .map(|m| m.range())
            .collect();
        for caps in any_wasm_reference_regex().captures_iter(source) {
            let spec = &caps["spec"];
            let at = caps.name("spec").map(|m| m.start()).unwrap_or_default();
            if !rewritable.iter().any(|range| range.contains(&at)) {
                return Err(BundleError::UnrecognizedImport(spec.to_string()));
            }
        }

        for caps in wasm_import_regex().captures_iter(source) {
            let spec = caps["spec"].to_string();
            let path = base.join(&spec);
            if !path.is_file() {
                return Err(BundleError::WasmNotFound {
                    spec,
                    entry: entry.to_path_buf(),
                });
            }

            let bytes = fs::read(&path).map_err(io_err(&path))?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "module".to_string());
            let hash = format!("{:x}", md5::compute(&bytes));
            let asset = format!("{}.{}.wasm", stem, &hash[..8]);
            debug!("wasm import {} -> {}", spec, asset);

            imports.push(WasmImport {
                spec,
                source: path,
                asset,
            });
        }

        Ok(imports)
    }

    fn collect_copy_sources(
        &self,
        config: &BundleConfig,
    ) -> BundleResult<Vec<(PathBuf, PathBuf)>> {
        let mut sources = Vec::new();
        for pattern in &config.copy {
            let full = self.root.join(&pattern.from);
            let matches = glob::glob(&full.to_string_lossy())?
                .map(|entry| entry.map_err(|e| io_err(&full)(e.into_error())))
                .collect::<BundleResult<Vec<_>>>()?;
            if matches.is_empty() {
                return Err(BundleError::CopySourceNotFound(pattern.from.clone()));
            }
            for path in matches {
                sources.push((path, PathBuf::from(&pattern.to)));
            }
        }
        Ok(sources)
    }

    fn write_staging(
        &self,
        config: &BundleConfig,
        staging: &Path,
        script: &str,
        imports: &[WasmImport],
        copy_sources: &[(PathBuf, PathBuf)],
    ) -> BundleResult<Vec<PathBuf>> {
        fs::create_dir_all(staging).map_err(io_err(staging))?;

        let script_path = staging.join(&config.output.filename);
        fs::write(&script_path, script).map_err(io_err(&script_path))?;

        for import in imports {
            let dest = staging.join(&import.asset);
            fs::copy(&import.source, &dest).map_err(io_err(&dest))?;
        }

        let mut copied = Vec::new();
        for (src, to) in copy_sources {
            let dest_dir = staging.join(to);
            fs::create_dir_all(&dest_dir).map_err(io_err(&dest_dir))?;
            debug!("copy {:?} to {:?}", src, dest_dir);

            if src.is_dir() {
                let options = fs_extra::dir::CopyOptions::new()
                    .content_only(true)
                    .overwrite(true);
                fs_extra::dir::copy(src, &dest_dir, &options)?;
                copied.push(to.clone());
            } else if let Some(file_name) = src.file_name() {
                let options = fs_extra::file::CopyOptions::new().overwrite(true);
                fs_extra::file::copy(src, dest_dir.join(file_name), &options)?;
                copied.push(normalize(&to.join(file_name)));
            }
        }

        Ok(copied)
    }
}

fn staging_dir(output_dir: &Path) -> PathBuf {
    let name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dist".to_string());
    output_dir.with_file_name(format!(".{}.staging", name))
}

// Lexical cleanup: drops `.` and folds `name/..`, so `./index.html`
// reports as `index.html`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(out.components().next_back(), Some(Component::Normal(_))) =>
            {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Refuse an output directory that is the project root, contains it, or
/// contains any input of the bundle. Replacing it would delete sources.
fn check_output_dir<'a>(
    root: &Path,
    output_dir: &Path,
    inputs: impl IntoIterator<Item = &'a Path>,
) -> BundleResult<()> {
    let output = normalize(output_dir);
    let overlaps = normalize(root).starts_with(&output)
        || inputs
            .into_iter()
            .any(|input| normalize(input).starts_with(&output));
    if overlaps {
        return Err(BundleError::OutputOverlapsSources(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Produce the emitted script text for `source`
fn render_script(
    config: &BundleConfig,
    source: &str,
    imports: &[WasmImport],
) -> BundleResult<String> {
    let assets: BTreeMap<&str, &str> = imports
        .iter()
        .map(|import| (import.spec.as_str(), import.asset.as_str()))
        .collect();

    let mut unsupported = None;
    let rewritten = wasm_import_regex().replace_all(source, |caps: &Captures| {
        let spec = &caps["spec"];
        let asset = assets.get(spec).copied().unwrap_or(spec);
        let binding = caps["binding"].trim();
        match &config.wasm {
            WasmStrategy::NativeAsync => format!("import {} from \"./{}\";", binding, asset),
            WasmStrategy::Loader { .. } => {
                let name = match binding.strip_prefix('*') {
                    Some(rest) => rest.trim_start().trim_start_matches("as").trim(),
                    None => binding,
                };
                // `{ a }`, `init, { a }` and `init, * as ns` bind more than one name
                if name.contains('{') || name.contains(',') {
                    unsupported.get_or_insert_with(|| spec.to_string());
                }
                format!("const {} = {}(\"{}\");", name, WASM_LOADER_FN, asset)
            }
        }
    });
    if let Some(spec) = unsupported {
        return Err(BundleError::UnsupportedImport(spec));
    }

    let mut out = String::new();
    if config.mode == Mode::Development {
        out.push_str(&format!(
            "/* {}: entry {}, mode {} */\n",
            config.name,
            config.entry.display(),
            config.mode.as_str()
        ));
    }
    if !imports.is_empty() && !config.wasm.is_native() {
        out.push_str(WASM_LOADER_PRELUDE);
    }

    match config.mode {
        Mode::Development => out.push_str(&rewritten),
        Mode::Production => {
            for line in rewritten.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with("//") {
                    continue;
                }
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}
