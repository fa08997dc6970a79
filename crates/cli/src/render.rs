//! Plain-text rendering of cycle snapshots.
//!
//! Each cycle prints four tables: Instruction Status, Load/Store Buffers,
//! Reservation Stations and Register Result Status.

use std::io::{self, Write};

use tomasulo_core::common::{Cycle, Operand};
use tomasulo_core::core::{CycleSnapshot, InstructionStatus, StationStatus};
use tomasulo_core::isa::FuClass;
use tomasulo_core::sim::RunSummary;

fn cycle_cell(c: Option<Cycle>) -> String {
    c.map_or_else(String::new, |c| c.to_string())
}

fn opt_cell<T: ToString>(v: Option<T>) -> String {
    v.map_or_else(String::new, |v| v.to_string())
}

/// Splits an operand slot into its `Q` (producer name) and `V` (value) cells.
fn operand_cells(snap: &CycleSnapshot, slot: Option<Operand>) -> (String, String) {
    match slot {
        Some(Operand::Pending(tag)) => (snap.station_name(tag), String::new()),
        Some(Operand::Resolved(v)) => (String::new(), v.to_string()),
        None => (String::new(), String::new()),
    }
}

fn busy_cell(rs: &StationStatus) -> &'static str {
    if rs.busy { "Yes" } else { "No" }
}

/// Writes the full per-cycle report.
pub fn write_cycle<W: Write>(out: &mut W, snap: &CycleSnapshot) -> io::Result<()> {
    writeln!(out, "Cycle {}", snap.cycle)?;
    writeln!(out)?;
    write_instruction_status(out, &snap.instructions)?;
    write_buffers(out, snap)?;
    write_stations(out, snap)?;
    write_registers(out, snap)?;
    if let Some(t) = snap.written_back {
        writeln!(out, "CDB: {} -> {}", snap.station_name(t.station), t.value)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the Instruction Status table.
pub fn write_instruction_status<W: Write>(
    out: &mut W,
    instructions: &[InstructionStatus],
) -> io::Result<()> {
    writeln!(out, "Instruction Status:")?;
    writeln!(
        out,
        "{:<15}{:<8}{:<8}{:<8}{:<8}{:<12}{}",
        "Instruction", "j", "k", "Issue", "Exec", "Completion", "Written"
    )?;
    for inst in instructions {
        writeln!(
            out,
            "{:<15}{:<8}{:<8}{:<8}{:<8}{:<12}{}",
            format!("{} {}", inst.opcode, inst.dest),
            inst.src1.to_string(),
            opt_cell(inst.src2.as_ref()),
            cycle_cell(inst.issue),
            cycle_cell(inst.execute_start),
            cycle_cell(inst.completion),
            cycle_cell(inst.write_back)
        )?;
    }
    writeln!(out)
}

fn write_buffers<W: Write>(out: &mut W, snap: &CycleSnapshot) -> io::Result<()> {
    writeln!(out, "Load/Store Buffers:")?;
    writeln!(out, "{:<8}{:<8}{:<8}{:<8}{:<8}{}", "Time", "Name", "Busy", "Op", "Q", "V")?;
    let buffers = snap
        .stations
        .iter()
        .filter(|rs| matches!(rs.class, FuClass::Load | FuClass::Store));
    for rs in buffers {
        let (q, v) = operand_cells(snap, rs.src1);
        writeln!(
            out,
            "{:<8}{:<8}{:<8}{:<8}{:<8}{}",
            opt_cell(rs.remaining()),
            rs.name,
            busy_cell(rs),
            opt_cell(rs.opcode),
            q,
            v
        )?;
    }
    writeln!(out)
}

fn write_stations<W: Write>(out: &mut W, snap: &CycleSnapshot) -> io::Result<()> {
    writeln!(out, "Reservation Stations:")?;
    writeln!(
        out,
        "{:<8}{:<8}{:<8}{:<8}{:<8}{:<8}{:<8}{}",
        "Time", "Name", "Busy", "Op", "Qj", "Vj", "Qk", "Vk"
    )?;
    let stations = snap
        .stations
        .iter()
        .filter(|rs| matches!(rs.class, FuClass::AddSub | FuClass::MulDiv));
    for rs in stations {
        let (qj, vj) = operand_cells(snap, rs.src1);
        let (qk, vk) = operand_cells(snap, rs.src2);
        writeln!(
            out,
            "{:<8}{:<8}{:<8}{:<8}{:<8}{:<8}{:<8}{}",
            opt_cell(rs.remaining()),
            rs.name,
            busy_cell(rs),
            opt_cell(rs.opcode),
            qj,
            vj,
            qk,
            vk
        )?;
    }
    writeln!(out)
}

fn write_registers<W: Write>(out: &mut W, snap: &CycleSnapshot) -> io::Result<()> {
    writeln!(out, "Register Result Status:")?;
    write!(out, "{:<8}", "Clock")?;
    for r in &snap.registers {
        write!(out, "{:<8}", r.name)?;
    }
    writeln!(out)?;

    write!(out, "{:<8}", snap.cycle)?;
    for r in &snap.registers {
        let cell = r.pending.map_or_else(String::new, |t| snap.station_name(t));
        write!(out, "{cell:<8}")?;
    }
    writeln!(out)?;

    write!(out, "{:<8}", "")?;
    for r in &snap.registers {
        write!(out, "{:<8}", r.value)?;
    }
    writeln!(out)?;
    writeln!(out)
}

/// Writes the final timeline and register values.
pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "Finished in {} cycles", summary.cycles)?;
    writeln!(out)?;
    write_instruction_status(out, &summary.instructions)?;
    writeln!(out, "Registers:")?;
    for r in &summary.registers {
        writeln!(out, "  {:<6}{}", r.name, r.value)?;
    }
    Ok(())
}
