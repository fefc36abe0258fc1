use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::circuit::{Circuit, ElementId};
use crate::error::{Result, SeoError};

/// Per-step voltage trace of a set of elements.
///
/// Each call to [`Trace::write_line`] appends `"<t> <Vn1> <Vn2> ..."`.
/// Handles that do not resolve to an element are written as `nan`.
pub struct Trace {
    writer: Box<dyn Write>,
    elements: Vec<ElementId>,
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

impl Trace {
    pub fn new(writer: impl Write + 'static, elements: Vec<ElementId>) -> Self {
        Self {
            writer: Box::new(writer),
            elements,
        }
    }

    /// Create (or truncate) a trace file.
    pub fn create(path: impl AsRef<Path>, elements: Vec<ElementId>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| SeoError::io(format!("trace file {}", path.display()), e))?;
        Ok(Self::new(BufWriter::new(file), elements))
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    pub fn write_line(&mut self, t: f64, circuit: &Circuit) -> Result<()> {
        let mut line = t.to_string();
        for &id in &self.elements {
            match circuit.vn(id) {
                Ok(vn) => line.push_str(&format!(" {vn}")),
                Err(_) => line.push_str(" nan"),
            }
        }
        writeln!(self.writer, "{line}").map_err(|e| SeoError::io("trace line", e))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| SeoError::io("trace", e))
    }
}
