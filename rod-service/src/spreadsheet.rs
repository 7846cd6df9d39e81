//! Excel import and export of rod chain projects
//!
//! A workbook has two sheets with a header row each:
//! - `Rods`: id, length, area, elastic modulus, allowable stress, distributed load
//! - `Nodes`: id, fixed, external force

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rod_solver::elements::{Node, Rod};
use rod_solver::model::Structure;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

pub const RODS_SHEET: &str = "Rods";
pub const NODES_SHEET: &str = "Nodes";

const ROD_HEADERS: [&str; 6] = ["id", "Li (m)", "Ai (m²)", "Ei (Pa)", "[σ]i (Pa)", "qi (N/m)"];
const NODE_HEADERS: [&str; 3] = ["id", "isFixed", "Fj (N)"];

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Sheet '{0}' not found")]
    MissingSheet(&'static str),
    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

/// Parse a project from the bytes of an `.xlsx` file
pub fn read_structure(bytes: &[u8]) -> Result<Structure, SpreadsheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheets = workbook.sheet_names();

    let rods_range = match sheets.iter().any(|s| s == RODS_SHEET) {
        true => workbook.worksheet_range(RODS_SHEET)?,
        false => return Err(SpreadsheetError::MissingSheet(RODS_SHEET)),
    };
    let nodes_range = match sheets.iter().any(|s| s == NODES_SHEET) {
        true => workbook.worksheet_range(NODES_SHEET)?,
        false => return Err(SpreadsheetError::MissingSheet(NODES_SHEET)),
    };

    let rods: Vec<Rod> = data_rows(rods_range.rows())
        .map(|row| Rod {
            id: cell_id(row, 0),
            length: cell_number(row, 1),
            area: cell_number(row, 2),
            elastic_modulus: cell_number(row, 3),
            allowable_stress: cell_number(row, 4),
            distributed_load: cell_number(row, 5),
        })
        .collect();

    let nodes: Vec<Node> = data_rows(nodes_range.rows())
        .map(|row| Node {
            id: cell_id(row, 0),
            fixed: cell_flag(row, 1),
            external_force: cell_number(row, 2),
        })
        .collect();

    tracing::debug!("Read {} rods and {} nodes from workbook", rods.len(), nodes.len());

    Ok(Structure::new(nodes, rods))
}

/// Serialize a project into `.xlsx` bytes
pub fn write_structure(structure: &Structure) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(RODS_SHEET)?;
        write_header(sheet, &ROD_HEADERS, &header)?;
        for (i, rod) in structure.rods.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_number(r, 0, rod.id as f64)?;
            sheet.write_number(r, 1, rod.length)?;
            sheet.write_number(r, 2, rod.area)?;
            sheet.write_number(r, 3, rod.elastic_modulus)?;
            sheet.write_number(r, 4, rod.allowable_stress)?;
            sheet.write_number(r, 5, rod.distributed_load)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(NODES_SHEET)?;
        write_header(sheet, &NODE_HEADERS, &header)?;
        for (i, node) in structure.nodes.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_number(r, 0, node.id as f64)?;
            sheet.write_boolean(r, 1, node.fixed)?;
            sheet.write_number(r, 2, node.external_force)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// A workbook with one example rod clamped at node 0 and loaded at node 1
pub fn template() -> Result<Vec<u8>, SpreadsheetError> {
    write_structure(&template_structure())
}

pub fn template_structure() -> Structure {
    Structure::new(
        vec![Node::fixed(0), Node::loaded(1, -10000.0)],
        vec![Rod::new(0, 2.0, 0.01, 2.1e11, 250e6)],
    )
}

fn write_header(
    sheet: &mut Worksheet,
    titles: &[&str],
    format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, format)?;
    }
    Ok(())
}

/// Rows after the header whose first cell holds something
fn data_rows<'a>(rows: impl Iterator<Item = &'a [Data]>) -> impl Iterator<Item = &'a [Data]> {
    rows.skip(1).filter(|row| match row.first() {
        None | Some(Data::Empty) => false,
        Some(Data::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    })
}

fn cell_number(row: &[Data], col: usize) -> f64 {
    match row.get(col) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        Some(Data::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn cell_id(row: &[Data], col: usize) -> i64 {
    cell_number(row, col).round() as i64
}

fn cell_flag(row: &[Data], col: usize) -> bool {
    match row.get(col) {
        Some(Data::Bool(b)) => *b,
        Some(Data::Float(f)) => *f != 0.0,
        Some(Data::Int(i)) => *i != 0,
        Some(Data::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "да" | "истина"
        ),
        _ => false,
    }
}
