use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rftemplate::adapter::{DesignAdapter, DesignExport, MarkupAdapter};
use rftemplate::ir::TemplateSchema;
use rftemplate::{AssetStore, Compiler, Config, Diagnostic, FillRequest, Import, SourceAdapter};

#[derive(Parser, Debug)]
#[command(name = "rftemplate", version, about = "Import designs as templates and compile them with data")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a design-tool export as a flat schema.
    ImportDesign(ImportDesignArgs),
    /// Import a markup document as a layout schema.
    ImportMarkup(ImportMarkupArgs),
    /// Check a persisted schema against the import invariants.
    Validate(ValidateArgs),
    /// Fill a schema with submitted data and write self-contained markup.
    Compile(CompileArgs),
}

#[derive(Parser, Debug)]
struct ImportDesignArgs {
    /// Design export JSON.
    #[arg(long)]
    input: PathBuf,

    /// Schema id.
    #[arg(long)]
    id: String,

    /// Config JSON; only the `design` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output schema JSON.
    #[arg(long)]
    out: PathBuf,

    /// Where to write the asset bundle recorded from the export.
    #[arg(long)]
    assets_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ImportMarkupArgs {
    /// Markup document.
    #[arg(long)]
    input: PathBuf,

    /// Schema id.
    #[arg(long)]
    id: String,

    /// Config JSON; only the `markup` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output schema JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Schema JSON.
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Schema JSON.
    #[arg(long)]
    schema: PathBuf,

    /// Submission JSON.
    #[arg(long)]
    data: PathBuf,

    /// Variant id to apply.
    #[arg(long)]
    variant: Option<String>,

    /// Token override as `name=value`; repeatable.
    #[arg(long = "token", value_parser = parse_token)]
    tokens: Vec<(String, String)>,

    /// Asset bundle JSON; repeatable, later bundles win.
    #[arg(long)]
    assets: Vec<PathBuf>,

    /// Config JSON; only the `compile` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output markup path.
    #[arg(long)]
    out: PathBuf,
}

fn parse_token(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::ImportDesign(args) => cmd_import_design(args),
        Command::ImportMarkup(args) => cmd_import_markup(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Compile(args) => cmd_compile(args),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))
}

fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Ok(Config::from_file(p)?),
        None => Ok(Config::default()),
    }
}

fn report(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        match &d.node_id {
            Some(node) => eprintln!("warning: {} (node {})", d, node),
            None => eprintln!("warning: {}", d),
        }
    }
}

fn finish_import(import: Import, out: &Path) -> anyhow::Result<Import> {
    report(&import.diagnostics);
    write(out, &import.schema.to_json()?)?;
    println!(
        "{}: {} nodes, {} bindings, {} variants",
        import.schema.id(),
        import.schema.node_count(),
        import.schema.bindings().len(),
        import.schema.variants().len()
    );
    Ok(import)
}

fn cmd_import_design(args: ImportDesignArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let export = DesignExport::from_json(&read(&args.input)?).with_context(|| "parse design export JSON")?;
    let import = DesignAdapter::new(config.design)
        .import(&args.id, &export)
        .with_context(|| format!("import '{}'", args.input.display()))?;
    let import = finish_import(import, &args.out)?;
    if let Some(path) = &args.assets_out {
        write(path, &serde_json::to_string_pretty(&import.assets)?)?;
    }
    Ok(())
}

fn cmd_import_markup(args: ImportMarkupArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let markup = read(&args.input)?;
    let import = MarkupAdapter::new(config.markup)
        .import(&args.id, &markup)
        .with_context(|| format!("import '{}'", args.input.display()))?;
    finish_import(import, &args.out)?;
    Ok(())
}

fn load_schema(path: &Path) -> anyhow::Result<TemplateSchema> {
    TemplateSchema::from_json(&read(path)?).with_context(|| format!("load schema '{}'", path.display()))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let schema = load_schema(&args.schema)?;
    println!(
        "{}: valid version-{} schema, canvas {}, {} nodes",
        schema.id(),
        u8::from(schema.version()),
        schema.canvas(),
        schema.node_count()
    );
    Ok(())
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = load_schema(&args.schema)?;

    let mut assets = AssetStore::new();
    for path in &args.assets {
        let bundle: AssetStore =
            serde_json::from_str(&read(path)?).with_context(|| format!("parse asset bundle '{}'", path.display()))?;
        assets.extend(bundle);
    }

    let mut request = FillRequest::from_json(&read(&args.data)?).with_context(|| "parse submission JSON")?;
    if let Some(variant) = args.variant {
        request = request.with_variant(variant);
    }
    for (name, value) in args.tokens {
        request = request.with_token(name, value);
    }

    let doc = Compiler::new(config.compile).compile(&schema, &request, &assets)?;
    report(&doc.diagnostics);
    write(&args.out, &doc.html)?;
    println!("{} {}x{} sha256:{}", args.out.display(), doc.width, doc.height, doc.digest());
    Ok(())
}
