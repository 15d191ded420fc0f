use crate::data_handling::{check_anchor, SequenceSource, SequenceWindow};
use crate::error::{DesignError, Result};

/// A sequence passed directly by the caller.
pub struct InlineSequence {
    pub sequence: String,
    pub chromosome: String,
    pub start_position: u64,
    pub gene_name: Option<String>,
}

impl SequenceSource for InlineSequence {
    fn load(&self) -> Result<SequenceWindow> {
        check_anchor(&self.chromosome, self.start_position)?;
        let window = SequenceWindow::new(
            &self.sequence,
            self.start_position,
            self.chromosome.clone(),
            self.gene_name.clone(),
        );
        if window.is_empty() {
            return Err(DesignError::EmptySequence(format!(
                "no bases supplied for {}",
                self.chromosome
            )));
        }
        Ok(window)
    }
}
