//! Neurolucida ASC reader producing raw [Sample]s.
//!
//! Reading happens in three steps:
//! 1. tokenizing (`(`, `)`, `|`, strings, atoms; `;` comments dropped)
//! 2. building a tree of nested lists with their line numbers
//! 3. interpreting the top-level blocks: the soma block, neurite blocks,
//!    everything else (markers, image data, spines) is skipped

use crate::asc::defs::{
    CELL_BODY, COMMENT_MARKER, POINT_VALUES, SEPARATORS, TOKEN_DELIMITERS, neurite_type,
};
use crate::error::{RawDataError, RawDataErrorKind};
use crate::model::{NO_PARENT, Point, Sample, SectionType};
use crate::parser::{ByteParser, ByteSource};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Bar,
    Str(String),
    Atom(String),
}

/// Node of the nested list structure of an ASC file.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    List { items: Vec<Node>, line: usize },
    Atom(String),
    Str(String),
    Bar,
}

impl Node {
    fn as_number(&self) -> Option<f32> {
        match self {
            Node::Atom(text) => text.parse().ok(),
            _ => None,
        }
    }

    fn is_marker(&self, name: &str) -> bool {
        match self {
            Node::List { items, .. } => {
                matches!(items.as_slice(), [Node::Atom(text)] if text.eq_ignore_ascii_case(name))
            }
            _ => false,
        }
    }
}

/// Tree section as written in the file, before it becomes samples.
#[derive(Debug, Default)]
struct Branch {
    points: Vec<Point>,
    diameters: Vec<f32>,
    lines: Vec<usize>,
    children: Vec<Branch>,
}

// =#========================================================================#=
// ASC READER
// =#========================================================================$=
/// Reads the soma and neurite blocks of an ASC file.
///
/// Soma points are chained into soma samples; neurite roots get the first
/// soma sample as parent (or none without soma). Samples are numbered from
/// 1 in the order they are produced.
pub struct AscReader<S: ByteSource> {
    parser: ByteParser<S>,
}

impl<S: ByteSource> AscReader<S> {
    pub fn new(parser: ByteParser<S>) -> Self {
        Self { parser }
    }

    /// Reads all samples.
    ///
    /// # Errors
    /// * [UnexpectedEof](RawDataErrorKind::UnexpectedEof) for unbalanced
    ///   parentheses or unclosed strings
    /// * [UnexpectedToken](RawDataErrorKind::UnexpectedToken) for stray `)`,
    ///   `|` or atoms outside of any block
    /// * [ParsingPoint](RawDataErrorKind::ParsingPoint) for point lists with
    ///   fewer than four values
    /// * [SomaAlreadyDefined](RawDataErrorKind::SomaAlreadyDefined) for a
    ///   second soma block
    pub fn read_samples(mut self) -> Result<Vec<Sample>, RawDataError> {
        let blocks = self.read_blocks()?;

        let mut soma: Option<Branch> = None;
        let mut neurites: Vec<(SectionType, Branch)> = Vec::new();
        for (items, line) in &blocks {
            if is_soma_block(items) {
                if soma.is_some() {
                    return Err(RawDataError::at_line(RawDataErrorKind::SomaAlreadyDefined, *line));
                }
                soma = Some(read_branch(items)?);
            } else if let Some(section_type) = block_type(items) {
                neurites.push((section_type, read_branch(items)?));
            } else {
                tracing::trace!(line, "skipping ASC block");
            }
        }

        Ok(into_samples(soma, neurites))
    }

    /// Tokenizes the input into top-level blocks.
    fn read_blocks(&mut self) -> Result<Vec<(Vec<Node>, usize)>, RawDataError> {
        let mut blocks = Vec::new();
        let mut stack: Vec<(Vec<Node>, usize)> = Vec::new();

        while let Some((token, line)) = self.next_token()? {
            let node = match token {
                Token::Open => {
                    stack.push((Vec::new(), line));
                    continue;
                }
                Token::Close => {
                    let (items, start) = stack.pop().ok_or_else(|| unexpected("(", ")", line))?;
                    if stack.is_empty() {
                        blocks.push((items, start));
                        continue;
                    }
                    Node::List { items, line: start }
                }
                Token::Bar => Node::Bar,
                Token::Str(text) => Node::Str(text),
                Token::Atom(text) => Node::Atom(text),
            };
            match stack.last_mut() {
                Some((items, _)) => items.push(node),
                None => {
                    let found = match node {
                        Node::Atom(text) | Node::Str(text) => text,
                        _ => "|".to_string(),
                    };
                    return Err(unexpected("(", &found, line));
                }
            }
        }

        if !stack.is_empty() {
            return Err(RawDataError::from_parser(RawDataErrorKind::UnexpectedEof, &self.parser));
        }
        Ok(blocks)
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>, RawDataError> {
        loop {
            self.parser.skip_whitespace_and_comments(COMMENT_MARKER);
            let line = self.parser.line();
            let token = match self.parser.peek() {
                None => return Ok(None),
                Some(b) if SEPARATORS.contains(&b) => {
                    self.parser.next();
                    continue;
                }
                Some(b'(') => {
                    self.parser.next();
                    Token::Open
                }
                Some(b')') => {
                    self.parser.next();
                    Token::Close
                }
                Some(b'|') => {
                    self.parser.next();
                    Token::Bar
                }
                Some(b'"') => {
                    let text = self.parser.parse_quoted_string().ok_or_else(|| {
                        RawDataError::from_parser(RawDataErrorKind::UnexpectedEof, &self.parser)
                    })?;
                    Token::Str(text)
                }
                Some(_) => Token::Atom(self.parser.parse_token(TOKEN_DELIMITERS)),
            };
            return Ok(Some((token, line)));
        }
    }
}

fn unexpected(expected: &str, found: &str, line: usize) -> RawDataError {
    RawDataError::at_line(
        RawDataErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
        },
        line,
    )
}

/// `("CellBody" ...)` or a block containing the `(CellBody)` marker.
fn is_soma_block(items: &[Node]) -> bool {
    matches!(items.first(), Some(Node::Str(name)) if name.eq_ignore_ascii_case(CELL_BODY))
        || items.iter().any(|item| item.is_marker(CELL_BODY))
}

/// Type of a neurite block, from its `(Axon)`-style marker.
fn block_type(items: &[Node]) -> Option<SectionType> {
    items.iter().find_map(|item| match item {
        Node::List { items: inner, .. } => match inner.as_slice() {
            [Node::Atom(marker)] => neurite_type(marker),
            _ => None,
        },
        _ => None,
    })
}

/// Reads the points and child branches of a branch body.
///
/// Lists starting with a number are points, lists starting with another list
/// or a `|` are branch groups, all other lists and atoms are properties or
/// markers and ignored.
fn read_branch(items: &[Node]) -> Result<Branch, RawDataError> {
    let mut branch = Branch::default();
    for item in items {
        let Node::List { items: inner, line } = item else {
            continue;
        };
        match inner.first() {
            Some(first) if first.as_number().is_some() => {
                let (point, diameter) = read_point(inner, *line)?;
                branch.points.push(point);
                branch.diameters.push(diameter);
                branch.lines.push(*line);
            }
            Some(Node::List { .. } | Node::Bar) => {
                for part in inner.split(|node| matches!(node, Node::Bar)) {
                    branch.children.push(read_branch(part)?);
                }
            }
            _ => {}
        }
    }
    Ok(branch)
}

/// Reads `(x y z d ...)`; values after the diameter are ignored.
fn read_point(items: &[Node], line: usize) -> Result<(Point, f32), RawDataError> {
    let values: Vec<f32> = items.iter().map_while(Node::as_number).collect();
    if values.len() < POINT_VALUES {
        let text = items
            .iter()
            .map(|node| match node {
                Node::Atom(text) | Node::Str(text) => text.as_str(),
                Node::Bar => "|",
                Node::List { .. } => "(..)",
            })
            .collect::<Vec<_>>()
            .join(" ");
        return Err(RawDataError::at_line(RawDataErrorKind::ParsingPoint(text), line));
    }
    Ok(([values[0], values[1], values[2]], values[3]))
}

/// Numbers the soma and neurite points as samples.
fn into_samples(soma: Option<Branch>, neurites: Vec<(SectionType, Branch)>) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut next_id: u32 = 1;

    let mut soma_root = NO_PARENT;
    if let Some(soma) = soma {
        let mut parent = NO_PARENT;
        for ((point, diameter), line) in soma.points.iter().zip(&soma.diameters).zip(&soma.lines) {
            samples.push(Sample::new(next_id, SectionType::Soma, *point, *diameter, parent).with_line(*line));
            parent = next_id as i32;
            next_id += 1;
        }
        if !soma.points.is_empty() {
            soma_root = 1;
        }
    }

    for (section_type, root) in &neurites {
        let mut stack: Vec<(&Branch, i32)> = vec![(root, soma_root)];
        while let Some((branch, mut parent)) = stack.pop() {
            for ((point, diameter), line) in branch.points.iter().zip(&branch.diameters).zip(&branch.lines) {
                samples.push(Sample::new(next_id, *section_type, *point, *diameter, parent).with_line(*line));
                parent = next_id as i32;
                next_id += 1;
            }
            stack.extend(branch.children.iter().rev().map(|child| (child, parent)));
        }
    }
    samples
}
