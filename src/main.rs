use std::{env, process};

use anyhow::bail;
use fkrig::rig::types::Severity;
use fkrig::{CharacterRig, ModelCache};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: fkrig <model.glb | --procedural>");
        process::exit(2);
    }

    let rig = if args[1] == "--procedural" {
        CharacterRig::procedural()?
    } else {
        let mut cache = ModelCache::new();
        cache.load("model", &args[1])?;
        let Some(skeleton) = cache.create_instance("model") else {
            bail!("model '{}' has no scene to instance a skeleton from", args[1]);
        };
        CharacterRig::from_skeleton(skeleton)?
    };

    let report = rig.report();
    println!("Rig type: {}", report.rig_type);
    println!("Bones: {}", report.bone_count);
    println!("Mapped bones: {}", report.mapped_bones.len());
    for (logical, actual) in &report.mapped_bones {
        println!("  {logical} -> {actual}");
    }
    if !report.missing_bones.is_empty() {
        println!("Missing bones: {}", report.missing_bones.join(", "));
    }
    println!("Symmetry corrections: {}", report.correction_count);
    println!("Mirrored: {}", report.mirrored);
    for issue in &report.issues {
        let tag = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        println!("[{tag}] {}: {}", issue.code, issue.message);
    }

    Ok(())
}
