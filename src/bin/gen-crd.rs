use kube::CustomResourceExt;
use serde_json::{json, Value};
use vmtranscode::crd::{DataVolume, VirtualMachine};

fn main() -> anyhow::Result<()> {
    // Prints a v1 List holding both CRDs.
    // Use: cargo run --bin gen-crd | python3 -c "import sys,json,yaml; print(yaml.dump(json.load(sys.stdin), default_flow_style=False))"
    // to convert to YAML
    let items: Vec<Value> = vec![
        serde_json::to_value(VirtualMachine::crd())?,
        serde_json::to_value(DataVolume::crd())?,
    ];

    let list = json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": items,
    });

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
