use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use colored::Colorize;
use serde_json::json;
use tracing::debug;
use xpkg_backend::{BackendConfig, FsConfig};
use xpkg_core::{
    Context, DynamicObject, DynamicRegistry, KindRegistry, Package, PackageParser, Parser,
    TypeMeta,
};

use crate::cli::*;

/// API group/version of package descriptors.
const META_V1: &str = "meta.pkg.crossplane.io/v1";
const META_V1BETA1: &str = "meta.pkg.crossplane.io/v1beta1";
const META_V1ALPHA1: &str = "meta.pkg.crossplane.io/v1alpha1";

type DynamicPackage = Package<DynamicObject, DynamicObject>;

pub async fn run_command(cli: Cli, ctx: Context) -> anyhow::Result<()> {
    match cli.command {
        Command::Parse(args) => cmd_parse(args, cli.format, ctx).await,
        Command::Kinds => cmd_kinds(cli.format),
    }
}

/// Package descriptor kinds. Everything else is content.
pub fn metadata_registry() -> KindRegistry<DynamicObject> {
    let mut registry: KindRegistry<DynamicObject> = KindRegistry::new("metadata");
    for (api_version, kind) in [
        (META_V1, "Configuration"),
        (META_V1, "Provider"),
        (META_V1, "Function"),
        (META_V1BETA1, "Function"),
        (META_V1ALPHA1, "Configuration"),
        (META_V1ALPHA1, "Provider"),
    ] {
        registry.register_dynamic(TypeMeta::new(api_version, kind));
    }
    registry
}

fn parser() -> PackageParser<KindRegistry<DynamicObject>, DynamicRegistry> {
    PackageParser::new(Arc::new(metadata_registry()), Arc::new(DynamicRegistry))
}

/// Turn the parse arguments into a backend configuration.
///
/// `--echo` wins, then a directory, then `--config`; with none of them
/// there is nothing to read.
pub fn backend_config(args: &ParseArgs) -> anyhow::Result<BackendConfig> {
    if let Some(content) = &args.echo {
        return Ok(BackendConfig::Echo {
            content: content.clone(),
        });
    }
    if let Some(dir) = &args.dir {
        return Ok(BackendConfig::Fs(FsConfig {
            skip_empty: args.skip_empty,
            yaml_only: !args.all_files,
            skip_paths: args.skip.clone(),
            ..FsConfig::new(dir)
        }));
    }
    if let Some(path) = &args.config {
        return BackendConfig::from_file(path)
            .with_context(|| format!("loading backend config {}", path.display()));
    }
    Ok(BackendConfig::Nop)
}

async fn cmd_parse(args: ParseArgs, format: OutputFormat, ctx: Context) -> anyhow::Result<()> {
    let ctx = match args.timeout {
        Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
        None => ctx,
    };
    let config = backend_config(&args)?;
    debug!(?config, "selected backend");

    let mut backend = config.build()?;
    let stream = backend.init(&ctx, &[]).await.context("opening package")?;

    match parser().parse(&ctx, Some(stream)) {
        Ok(pkg) => {
            println!("{}", render_package(&pkg, format, None));
            Ok(())
        }
        Err(partial) => {
            let (pkg, err) = partial.into_parts();
            let message = err.to_string();
            println!("{}", render_package(&pkg, format, Some(&message)));
            Err(anyhow::Error::new(err).context("package is invalid"))
        }
    }
}

/// Render a (possibly partial) package for stdout.
///
/// JSON output carries the parse error as a field. Text output only marks
/// the package as incomplete; the error itself is reported once, on stderr,
/// when the command fails.
fn render_package(pkg: &DynamicPackage, format: OutputFormat, error: Option<&str>) -> String {
    match format {
        OutputFormat::Json => {
            let mut out = json!({
                "metadata": pkg.metadata(),
                "content": pkg.content(),
            });
            if let Some(error) = error {
                out["error"] = json!(error);
            }
            format!("{out:#}")
        }
        OutputFormat::Text => {
            let mut lines = Vec::new();
            if let Some(primary) = pkg.primary() {
                lines.push(format!(
                    "{} {} {}",
                    "Package".bold(),
                    primary.kind().cyan().bold(),
                    primary.name.as_deref().unwrap_or("<unnamed>").yellow()
                ));
            } else {
                lines.push("No package metadata.".dimmed().to_string());
            }
            for object in pkg.metadata().iter().skip(1) {
                lines.push(format!("  {} {}", "meta:".cyan(), describe(object)));
            }
            for object in pkg.content() {
                lines.push(format!("  {} {}", "object:".green(), describe(object)));
            }
            lines.push(format!(
                "{} metadata, {} content",
                pkg.metadata().len().to_string().bold(),
                pkg.content().len().to_string().bold()
            ));
            if error.is_some() {
                lines.push(format!("{} {}", "✗".red().bold(), "parse stopped early".red()));
            }
            lines.join("\n")
        }
    }
}

fn describe(object: &DynamicObject) -> String {
    let mut out = format!("{}/{}", object.type_meta.api_version, object.kind());
    if let Some(name) = &object.name {
        out.push(' ');
        if let Some(namespace) = &object.namespace {
            out.push_str(namespace);
            out.push('/');
        }
        out.push_str(name);
    }
    out
}

fn cmd_kinds(format: OutputFormat) -> anyhow::Result<()> {
    let registry = metadata_registry();
    let kinds = registry.kinds();
    match format {
        OutputFormat::Json => println!("{:#}", json!(kinds)),
        OutputFormat::Text => {
            println!("{} ({})", "Metadata kinds".bold(), registry.name());
            for kind in kinds {
                println!("  {}", kind.to_string().cyan());
            }
            println!("Any other kind is parsed as content.");
        }
    }
    Ok(())
}
