use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use super::model::Curriculum;

/// Reads a curriculum saved as YAML (or JSON, which is valid YAML).
pub fn read_curriculum(path: &Path) -> anyhow::Result<Curriculum> {
    let text = fs::read_to_string(path)
        .context(format!("failed to read curriculum file {}", path.display()))?;
    serde_yaml_ng::from_str(&text)
        .context(format!("{} is not a valid curriculum", path.display()))
}

/// Writes `curriculum` as YAML, refusing to overwrite an existing file.
pub fn write_curriculum(path: &Path, curriculum: &Curriculum) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .context(format!("failed to open file for {}", path.display()))?;

    let content = serde_yaml_ng::to_string(curriculum).context("failed to serialize curriculum")?;
    write!(file, "{}", content).context("failed to write curriculum")?;
    Ok(())
}
