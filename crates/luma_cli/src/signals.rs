//! `luma signals` — print the model's signal declaration table.
//!
//! The table is the same declaration pass a tracing session runs: every
//! signal with its name, bit width, direction, and kind, plus the fixed
//! weight parameters.

use luma_sim::{LumaModel, SignalDir, SignalKind};

use crate::{GlobalArgs, ReportFormat, SignalsArgs};

/// Runs the `luma signals` command.
pub fn run(args: &SignalsArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match args.format {
        ReportFormat::Text => print!("{}", render_text()),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(LumaModel::DECLS)?),
    }
    Ok(0)
}

fn dir_str(dir: SignalDir) -> &'static str {
    match dir {
        SignalDir::Input => "input",
        SignalDir::Output => "output",
        SignalDir::Internal => "internal",
    }
}

fn kind_str(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Wire => "wire",
        SignalKind::Parameter => "parameter",
    }
}

/// Renders the declaration table as aligned text.
fn render_text() -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>5}  {:<8} {}\n",
        "NAME", "WIDTH", "DIR", "KIND"
    ));
    for decl in LumaModel::DECLS {
        out.push_str(&format!(
            "{:<10} {:>5}  {:<8} {}\n",
            decl.name,
            decl.width,
            dir_str(decl.dir),
            kind_str(decl.kind)
        ));
    }
    out
}
