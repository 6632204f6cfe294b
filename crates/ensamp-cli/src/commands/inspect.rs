use crate::cli::InspectArgs;
use crate::error::Result;
use ensamp::core::grid::Grid;
use std::io::{self, Write};
use tracing::info;

pub fn run(args: &InspectArgs) -> Result<()> {
    info!("Inspecting grid configuration '{}'", args.config.display());
    let grid = Grid::from_toml_path(&args.config)?;

    let stdout = io::stdout();
    write_summary(&grid, &mut stdout.lock())?;
    Ok(())
}

fn write_summary<W: Write>(grid: &Grid, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "grid: {} axes, {} nodes, {} extra components per node",
        grid.ndim(),
        grid.len(),
        grid.extra_len()
    )?;
    for axis in 0..grid.ndim() {
        writeln!(
            writer,
            "  axis {}: [{}, {}] {}, {} points, spacing {}",
            axis,
            grid.lower()[axis],
            grid.upper()[axis],
            if grid.periodic()[axis] {
                "periodic"
            } else {
                "bounded"
            },
            grid.num_points()[axis],
            grid.spacing()[axis]
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_axis() {
        let grid = Grid::from_toml_str(
            r#"
            kind = "uniform"
            lower = [0.0, 0.0]
            upper = [1.0, 10.0]
            periodic = [false, true]
            points = [3, 10]
            extra = 2
            "#,
        )
        .unwrap();

        let mut out = Vec::new();
        write_summary(&grid, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("2 axes, 30 nodes, 2 extra components"));
        assert!(text.contains("axis 0: [0, 1] bounded, 3 points, spacing 0.5"));
        assert!(text.contains("axis 1: [0, 10] periodic, 10 points, spacing 1"));
    }
}
