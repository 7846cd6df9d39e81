//! Rod Solver Example - stepped bar between two walls
//!
//! Pass a structure JSON file as the first argument to analyze it instead.

use anyhow::{bail, Context};
use rod_solver::prelude::*;

fn stepped_bar() -> Structure {
    //  |=====A=2a=====o---A=a---o===A=a===|
    // wall     q=-5 kN/m   F=20 kN         wall
    Structure::new(
        vec![
            Node::fixed(0),
            Node::loaded(1, 20_000.0),
            Node::new(2),
            Node::fixed(3),
        ],
        vec![
            Rod::new(0, 1.5, 0.02, 2.1e11, 160e6).with_distributed_load(-5_000.0),
            Rod::new(1, 1.0, 0.01, 2.1e11, 160e6),
            Rod::new(2, 1.0, 0.01, 7.0e10, 100e6),
        ],
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let structure: Structure = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path))?
        }
        None => stepped_bar(),
    };

    let errors = validate(&structure);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  - {}", e);
        }
        bail!("structure has {} validation errors", errors.len());
    }

    println!("=== Rod Solver Example: {} rods ===\n", structure.num_rods());

    let result = structure.analyze(&AnalysisOptions::linear().with_statics_check(1e-9))?;

    println!("Node Displacements:");
    for (node, d) in structure.nodes.iter().zip(result.displacements.iter()) {
        println!("  N{}: U={:.6}mm", node.id, d * 1000.0);
    }

    println!("\nSupport Reactions:");
    for r in structure.reactions(&result.displacements)? {
        println!("  N{}: R={:.3}kN", r.node_id, r.force / 1000.0);
    }

    println!("\nRod Forces:");
    for e in &result.elements {
        println!(
            "  R{}: N(0)={:.3}kN, N(L)={:.3}kN, max|σ|={:.2}MPa, utilization={:.1}%",
            e.rod_id,
            e.axial_force_at(0.0) / 1000.0,
            e.axial_force_at(e.length) / 1000.0,
            e.max_stress / 1e6,
            e.utilization() * 100.0
        );
    }

    if let Some(critical) = result.critical_element() {
        println!(
            "\nCritical rod: R{} ({})",
            critical.rod_id,
            if critical.is_overstressed() {
                "overstressed"
            } else {
                "ok"
            }
        );
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}
