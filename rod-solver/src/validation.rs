//! Pre-analysis validation producing human-readable messages
//!
//! Unlike [`Structure::check_shape`], which stops at the first problem and
//! returns a typed error, [`validate`] collects every problem it can find so a
//! user can fix an input file in one pass.

use std::collections::HashSet;

use crate::model::Structure;

/// Validate a structure, returning an empty list when it is acceptable
pub fn validate(structure: &Structure) -> Vec<String> {
    let mut errors = Vec::new();
    let nodes = &structure.nodes;
    let rods = &structure.rods;

    if nodes.is_empty() {
        errors.push("The node list must not be empty.".to_string());
    }
    if rods.is_empty() {
        errors.push("The rod list must not be empty.".to_string());
    }
    if !errors.is_empty() {
        return errors;
    }

    if nodes.len() != rods.len() + 1 {
        errors.push(format!(
            "There must be exactly one more node than rods. Nodes: {}, rods: {}",
            nodes.len(),
            rods.len()
        ));
    }

    let node_ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
    let rod_ids: Vec<i64> = rods.iter().map(|r| r.id).collect();

    check_unique(&rod_ids, "rods", &mut errors);
    check_unique(&node_ids, "nodes", &mut errors);
    check_non_negative(&rod_ids, "rods", &mut errors);
    check_non_negative(&node_ids, "nodes", &mut errors);

    for rod in rods {
        let properties = [
            ("length", rod.length),
            ("cross-section area", rod.area),
            ("elastic modulus", rod.elastic_modulus),
            ("allowable stress", rod.allowable_stress),
        ];
        for (name, value) in properties {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("Rod ID={}: {} must be > 0.", rod.id, name));
            }
        }
        if !rod.distributed_load.is_finite() {
            errors.push(format!("Rod ID={}: distributed load must be finite.", rod.id));
        }
    }
    if let Some(node) = nodes.iter().find(|n| !n.external_force.is_finite()) {
        errors.push(format!("Node ID={}: external force must be finite.", node.id));
    }

    check_sequence(&node_ids, "nodes", &mut errors);
    check_sequence(&rod_ids, "rods", &mut errors);

    // Rod i joins the i-th and (i+1)-th listed node, so the listing must follow the ids
    check_order(&node_ids, "Nodes", "Node", &mut errors);
    check_order(&rod_ids, "Rods", "Rod", &mut errors);

    if !nodes.iter().any(|n| n.fixed) {
        errors.push("The structure needs at least one fixed support.".to_string());
    }

    if nodes.len() >= 3 {
        let min_id = node_ids.iter().copied().min().unwrap_or_default();
        let max_id = node_ids.iter().copied().max().unwrap_or_default();
        for node in nodes.iter().filter(|n| n.fixed) {
            if node.id != min_id && node.id != max_id {
                errors.push(format!(
                    "Node ID={} is a fixed support in the middle of the chain. Supports are only allowed at the end nodes (ID {} or {}).",
                    node.id, min_id, max_id
                ));
            }
        }
    }

    errors
}

/// True when [`validate`] reports nothing
pub fn is_valid(structure: &Structure) -> bool {
    validate(structure).is_empty()
}

/// The first validation message, if any
pub fn first_error(structure: &Structure) -> Option<String> {
    validate(structure).into_iter().next()
}

fn check_unique(ids: &[i64], kind: &str, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            errors.push(format!("Duplicate ID {} in the list of {}.", id, kind));
        }
    }
}

fn check_non_negative(ids: &[i64], kind: &str, errors: &mut Vec<String>) {
    for &id in ids.iter().filter(|&&id| id < 0) {
        errors.push(format!("IDs must not be negative. Found in {}: {}", kind, id));
    }
}

fn check_order(ids: &[i64], plural: &str, singular: &str, errors: &mut Vec<String>) {
    let Some(&first) = ids.first() else {
        return;
    };
    let out_of_order = ids.iter().enumerate().find_map(|(p, &id)| {
        let expected = i64::try_from(p).ok().and_then(|p| first.checked_add(p));
        (expected != Some(id)).then_some((p, id, expected))
    });

    if let Some((p, id, expected)) = out_of_order {
        let expected = match expected {
            Some(e) => e.to_string(),
            None => format!("an ID above {}", first),
        };
        errors.push(format!(
            "{} must be listed in id order along the chain. {} at position {} has ID={}, expected {}.",
            plural, singular, p, id, expected
        ));
    }
}

fn check_sequence(ids: &[i64], kind: &str, errors: &mut Vec<String>) {
    let (Some(min_id), Some(max_id)) = (ids.iter().min(), ids.iter().max()) else {
        return;
    };
    let distinct: HashSet<i64> = ids.iter().copied().collect();

    // Ids may span the whole i64 range, so the width is taken unsigned
    let span = max_id.abs_diff(*min_id).checked_add(1);
    if span != Some(distinct.len() as u64) {
        errors.push(format!(
            "IDs of {} must be consecutive. Found IDs from {} to {} with gaps.",
            kind, min_id, max_id
        ));
    }
    if *min_id != 0 && *min_id != 1 {
        errors.push(format!(
            "Numbering of {} must start at 0 or 1. Smallest ID found: {}",
            kind, min_id
        ));
    }
}
