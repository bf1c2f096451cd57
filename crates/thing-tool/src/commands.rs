//! Command implementations. Each writes its report to the given writer.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use healthvault_thing::{
    EntityRecord, Fragment, SchemaDescriptor, ThingContext, ThingError, ThingTypeId,
};
use tracing::{info, warn};

/// `types`: one line per registered type.
pub fn types(context: &ThingContext, out: &mut dyn Write) -> anyhow::Result<()> {
    for descriptor in context.registry().descriptors() {
        writeln!(
            out,
            "{}  {:<32}  {}",
            descriptor.type_id(),
            descriptor.root(),
            descriptor.name()
        )?;
    }
    Ok(())
}

/// `describe`: the descriptor for a type id or root element name, as JSON.
pub fn describe(context: &ThingContext, name: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let descriptor = lookup(context, name)?;
    serde_json::to_writer_pretty(&mut *out, descriptor.as_ref())?;
    writeln!(out)?;
    Ok(())
}

/// `validate`: decodes the file and lists every error found.
pub fn validate(
    context: &ThingContext,
    type_id: Option<ThingTypeId>,
    file: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let fragment = read_fragment(file)?;
    let descriptor = select(context, type_id, &fragment)?;

    match context.deserialize(&fragment, descriptor.type_id()) {
        Ok(_) => {
            writeln!(
                out,
                "{}: valid {} ({})",
                file.display(),
                descriptor.name(),
                descriptor.type_id()
            )?;
            Ok(true)
        }
        Err(error) if !error.validation_errors().is_empty() => {
            let errors = error.validation_errors();
            warn!(file = %file.display(), count = errors.len(), "fragment is invalid");
            writeln!(
                out,
                "{}: {} error(s) in {}",
                file.display(),
                errors.len(),
                descriptor.name()
            )?;
            for error in errors {
                writeln!(out, "  {}", error)?;
            }
            Ok(false)
        }
        Err(error) => Err(error.into()),
    }
}

/// `normalize`: decodes the file and writes the record back in layout
/// order, to `output` or to `out`.
pub fn normalize(
    context: &ThingContext,
    type_id: Option<ThingTypeId>,
    file: &Path,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let Some(record) = decode_or_report(context, type_id, file, out)? else {
        return Ok(false);
    };
    let xml = context.serialize_to_string(&record)?;

    match output {
        Some(path) => {
            std::fs::write(path, &xml)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(input = %file.display(), output = %path.display(), "normalized");
        }
        None => writeln!(out, "{}", xml)?,
    }
    Ok(true)
}

/// `inspect`: the decoded record as JSON.
pub fn inspect(
    context: &ThingContext,
    type_id: Option<ThingTypeId>,
    file: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let Some(record) = decode_or_report(context, type_id, file, out)? else {
        return Ok(false);
    };
    serde_json::to_writer_pretty(&mut *out, &record)?;
    writeln!(out)?;
    Ok(true)
}

fn read_fragment(file: &Path) -> anyhow::Result<Fragment> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    Fragment::parse(&text).with_context(|| format!("parsing {}", file.display()))
}

fn lookup(context: &ThingContext, name: &str) -> anyhow::Result<Arc<SchemaDescriptor>> {
    if let Ok(type_id) = name.parse::<ThingTypeId>() {
        return Ok(context.registry().resolve(type_id)?);
    }
    match context.registry().resolve_root(name) {
        Some(descriptor) => Ok(descriptor),
        None => bail!("no thing type is registered as '{}'", name),
    }
}

/// The descriptor named by `type_id`, or else the one whose root element
/// matches the fragment.
fn select(
    context: &ThingContext,
    type_id: Option<ThingTypeId>,
    fragment: &Fragment,
) -> anyhow::Result<Arc<SchemaDescriptor>> {
    if let Some(type_id) = type_id {
        return Ok(context.registry().resolve(type_id)?);
    }
    let root = fragment.root().name();
    match context.registry().resolve_root(root) {
        Some(descriptor) => Ok(descriptor),
        None => bail!(
            "no thing type has root element <{}>; pass --type-id to choose one",
            root
        ),
    }
}

fn decode_or_report(
    context: &ThingContext,
    type_id: Option<ThingTypeId>,
    file: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<Option<EntityRecord>> {
    let fragment = read_fragment(file)?;
    let descriptor = select(context, type_id, &fragment)?;
    match context.deserialize(&fragment, descriptor.type_id()) {
        Ok(record) => Ok(Some(record)),
        Err(ThingError::Invalid(report)) => {
            writeln!(out, "{}: {}", file.display(), report)?;
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}
