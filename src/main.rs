use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};
use vmtranscode::config::TranscodeConfig;
use vmtranscode::convert;
use vmtranscode::convert::declarative::{DV_KEYS, VM_KEYS};
use vmtranscode::crd::{DataVolume, VirtualMachine};
use vmtranscode::state::ResourceData;
use vmtranscode::transport::{ClusterVirtualMachine, VmAddVolumeEntity};

/// Convert a VM or data volume document between models
#[derive(Parser, Debug)]
#[command(name = "vmtranscode", version)]
struct Args {
    /// Model of the input document
    #[arg(long, value_enum)]
    from: Model,

    /// Model to write
    #[arg(long, value_enum)]
    to: Model,

    /// Resource kind
    #[arg(long, value_enum, default_value_t = Kind::Vm)]
    kind: Kind,

    /// JSON input file; stdin when omitted
    input: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Model {
    Declarative,
    Transport,
    Platform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Vm,
    Dv,
}

/// A document in its transport form, which every model converts through
#[derive(Debug)]
enum Document {
    Vm(ClusterVirtualMachine),
    Dv(VmAddVolumeEntity),
}

fn load(model: Model, kind: Kind, input: Value, config: &TranscodeConfig) -> anyhow::Result<Document> {
    let document = match (model, kind) {
        (Model::Declarative, Kind::Vm) => {
            let state = ResourceData::from_json(input)?;
            Document::Vm(convert::declarative_vm_to_transport(&state, config)?)
        }
        (Model::Declarative, Kind::Dv) => {
            let state = ResourceData::from_json(input)?;
            Document::Dv(convert::declarative_dv_to_transport(&state, config)?)
        }
        (Model::Transport, Kind::Vm) => {
            Document::Vm(serde_json::from_value(input).context("Invalid transport VM")?)
        }
        (Model::Transport, Kind::Dv) => {
            Document::Dv(serde_json::from_value(input).context("Invalid transport data volume")?)
        }
        (Model::Platform, Kind::Vm) => {
            let vm: VirtualMachine =
                serde_json::from_value(input).context("Invalid VirtualMachine")?;
            Document::Vm(convert::platform_vm_to_transport(&vm)?)
        }
        (Model::Platform, Kind::Dv) => {
            let dv: DataVolume = serde_json::from_value(input).context("Invalid DataVolume")?;
            Document::Dv(convert::platform_dv_to_transport(&dv, None)?)
        }
    };
    Ok(document)
}

fn emit(model: Model, document: &Document, config: &TranscodeConfig) -> anyhow::Result<Value> {
    let output = match (model, document) {
        (Model::Declarative, Document::Vm(vm)) => {
            let mut state = ResourceData::new().with_schema(VM_KEYS.iter().copied());
            convert::transport_vm_to_declarative(vm, &mut state, config)?;
            state.to_json()
        }
        (Model::Declarative, Document::Dv(entity)) => {
            let mut state = ResourceData::new().with_schema(DV_KEYS.iter().copied());
            convert::transport_dv_to_declarative(entity, &mut state, config)?;
            state.to_json()
        }
        (Model::Transport, Document::Vm(vm)) => serde_json::to_value(vm)?,
        (Model::Transport, Document::Dv(entity)) => serde_json::to_value(entity)?,
        (Model::Platform, Document::Vm(vm)) => {
            serde_json::to_value(convert::transport_vm_to_platform(vm)?)?
        }
        (Model::Platform, Document::Dv(entity)) => {
            serde_json::to_value(convert::transport_dv_to_platform(entity)?)?
        }
    };
    Ok(output)
}

/// Convert one parsed document from `from` to `to`
fn transcode(
    from: Model,
    to: Model,
    kind: Kind,
    input: Value,
    config: &TranscodeConfig,
) -> anyhow::Result<Value> {
    let document = load(from, kind, input, config)
        .with_context(|| format!("Failed to read {kind:?} from the {from:?} model"))?;
    debug!(?document, "Loaded document");
    emit(to, &document, config).with_context(|| format!("Failed to write {kind:?} to the {to:?} model"))
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("Input is not valid JSON")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = TranscodeConfig::from_env();
    info!(from = ?args.from, to = ?args.to, kind = ?args.kind, "Transcoding");

    let input = read_input(args.input.as_ref())?;
    let output = transcode(args.from, args.to, args.kind, input, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
