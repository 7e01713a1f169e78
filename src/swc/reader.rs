//! Line-oriented SWC reader producing raw [Sample]s.

use crate::error::{RawDataError, RawDataErrorKind};
use crate::model::{Sample, SectionType, SomaType};
use crate::parser::{ByteParser, ByteSource};
use crate::swc::defs::{COMMENT_MARKER, NUM_COLUMNS};

// =#========================================================================#=
// SWC READER
// =#========================================================================$=
/// Reads the sample records of an SWC file.
///
/// Each non-empty, non-comment line holds seven whitespace separated columns
/// `id type x y z radius parent`; a trailing `#` comment is allowed. The
/// reader does not check connectivity, that is left to the builder.
pub struct SwcReader<S: ByteSource> {
    parser: ByteParser<S>,
}

impl<S: ByteSource> SwcReader<S> {
    pub fn new(parser: ByteParser<S>) -> Self {
        Self { parser }
    }

    /// Reads all samples in file order.
    ///
    /// # Errors
    /// * [LineNonParsable](RawDataErrorKind::LineNonParsable) for lines with
    ///   missing, extra or malformed columns
    /// * [UnsupportedSectionType](RawDataErrorKind::UnsupportedSectionType)
    ///   for type codes outside `0..=19`
    pub fn read_samples(mut self) -> Result<Vec<Sample>, RawDataError> {
        let mut samples = Vec::new();
        loop {
            self.parser.skip_inline_whitespace();
            match self.parser.peek() {
                None => break,
                Some(b'\n') => {
                    self.parser.next();
                }
                Some(COMMENT_MARKER) => self.parser.skip_line(),
                Some(_) => samples.push(self.parse_sample()?),
            }
        }

        tracing::trace!(samples = samples.len(), "read SWC samples");
        Ok(samples)
    }

    fn parse_sample(&mut self) -> Result<Sample, RawDataError> {
        let line = self.parser.line();
        let mut columns: [String; NUM_COLUMNS] = Default::default();
        for column in columns.iter_mut() {
            self.parser.skip_inline_whitespace();
            *column = self.parser.parse_token(&[COMMENT_MARKER]);
            if column.is_empty() {
                return Err(non_parsable(line));
            }
        }

        // Only a comment may follow the columns
        self.parser.skip_inline_whitespace();
        match self.parser.peek() {
            None => {}
            Some(b'\n') | Some(COMMENT_MARKER) => self.parser.skip_line(),
            Some(_) => return Err(non_parsable(line)),
        }

        let [id, code, x, y, z, radius, parent] = &columns;
        let id: u32 = parse_column(id, line)?;
        let code: i32 = parse_column(code, line)?;
        let section_type = SectionType::from_code(code).ok_or_else(|| {
            RawDataError::at_line(RawDataErrorKind::UnsupportedSectionType(code), line)
        })?;
        let point = [
            parse_column(x, line)?,
            parse_column(y, line)?,
            parse_column(z, line)?,
        ];
        let radius: f32 = parse_column(radius, line)?;
        let parent_id: i32 = parse_column(parent, line)?;

        Ok(Sample::new(id, section_type, point, 2.0 * radius, parent_id).with_line(line))
    }
}

fn parse_column<T: std::str::FromStr>(column: &str, line: usize) -> Result<T, RawDataError> {
    column.parse().map_err(|_| non_parsable(line))
}

fn non_parsable(line: usize) -> RawDataError {
    RawDataError::at_line(RawDataErrorKind::LineNonParsable, line)
}

/// Soma policy for SWC input: a single soma sample is a point, anything
/// else a stack of cylinders.
pub fn soma_policy(samples: &[Sample]) -> SomaType {
    match samples.iter().filter(|s| s.is_soma()).count() {
        1 => SomaType::SinglePoint,
        _ => SomaType::Cylinders,
    }
}
