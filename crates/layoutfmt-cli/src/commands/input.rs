use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use layoutfmt_core::TypeNode;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("format is required: use a positional argument or -f/--format")]
    Missing,
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid reflection JSON in '{origin}': {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Format text plus the name it is reported under.
#[derive(Debug)]
pub struct FormatSource {
    pub text: String,
    pub origin: String,
}

pub fn load_format(path: Option<&Path>, text: Option<&str>) -> Result<FormatSource, InputError> {
    if let Some(text) = text {
        return Ok(FormatSource {
            text: text.to_string(),
            origin: "<inline>".to_string(),
        });
    }

    let path = path.ok_or(InputError::Missing)?;
    Ok(FormatSource {
        text: read(path)?,
        origin: origin(path),
    })
}

/// Reads a JSON array of reflected members.
pub fn load_reflection(path: &Path) -> Result<Vec<TypeNode>, InputError> {
    parse_reflection(&read(path)?, &origin(path))
}

pub fn parse_reflection(text: &str, origin: &str) -> Result<Vec<TypeNode>, InputError> {
    serde_json::from_str(text).map_err(|source| InputError::Json {
        origin: origin.to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, InputError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(InputError::Stdin)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn origin(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
