use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// A destination for translated text, addressed by a location key (e.g. "roundtrip").
pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file in a directory, named by substituting the key into
/// `file_template` (e.g. `"house__{}.idf"`).
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    pub fn path_for_location_key(&self, location_key: &str) -> anyhow::Result<PathBuf> {
        let file_name = formatx!(&self.file_template, location_key).map_err(|e| {
            anyhow!(
                "Output file template '{}' could not be filled: {e:?}",
                self.file_template
            )
        })?;
        Ok(self.directory_path.join(file_name))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.path_for_location_key(location_key)?,
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;

    #[rstest]
    fn should_name_files_from_template() {
        let output = FileOutput::new(PathBuf::from("out"), "house__{}.idf".to_string());
        assert_eq!(
            output.path_for_location_key("roundtrip").unwrap(),
            PathBuf::from("out/house__roundtrip.idf")
        );
    }

    #[rstest]
    fn should_write_to_file_for_location_key() {
        let directory = std::env::temp_dir().join(format!("idfkit-output-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&directory).unwrap();
        let output = FileOutput::new(directory.clone(), "{}.idf".to_string());

        {
            let mut writer = (&output).writer_for_location_key("model").unwrap();
            writer.write_all(b"ScheduleTypeLimits, Any;").unwrap();
        }

        assert_eq!(
            fs::read_to_string(directory.join("model.idf")).unwrap(),
            "ScheduleTypeLimits, Any;"
        );
        fs::remove_dir_all(directory).unwrap();
    }

    #[rstest]
    fn should_treat_sink_as_noop() {
        assert!(SinkOutput.is_noop());
        assert!(!FileOutput::new(PathBuf::new(), "{}".into()).is_noop());
    }
}
