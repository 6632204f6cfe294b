use crate::cli::DumpArgs;
use crate::error::Result;
use ensamp::core::grid::Grid;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: &DumpArgs) -> Result<()> {
    let grid = Grid::from_toml_path(&args.config)?;

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            grid.write_dump(&mut writer)?;
            writer.flush()?;
            info!("Wrote {} grid nodes to '{}'", grid.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            grid.write_dump(&mut stdout.lock())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("grid.toml");
        std::fs::write(
            &path,
            r#"
            kind = "histogram"
            lower = [0.0]
            upper = [4.0]
            periodic = [false]
            points = [4]
            extra = 1
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn dump_writes_one_line_per_node_to_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nodes.dat");
        let args = DumpArgs {
            config: write_config(&dir),
            output: Some(output.clone()),
        };

        run(&args).unwrap();

        let text = std::fs::read_to_string(output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        // Fresh grid: zero value, zero extra, bin-centered location.
        assert_eq!(lines[0], "0 0 0.5");
        assert_eq!(lines[3], "0 0 3.5");
    }

    #[test]
    fn dump_surfaces_build_errors_from_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "kind = \"uniform\"\nlower = [0.0]\n").unwrap();

        let args = DumpArgs {
            config: path,
            output: None,
        };
        assert!(run(&args).is_err());
    }
}
