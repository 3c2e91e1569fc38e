//! Program file format.
//!
//! A `.prog` file is read line by line. Each line is trimmed, then matched
//! against the directives below by prefix. Anything else is ignored.
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `shaders <file> <file> ...` | attach compiled shaders by file name |
//! | `checkgroup begin [or]` | open a nested condition group (AND unless `or`) |
//! | `checkgroup end` | close the innermost group |
//! | `check [not] <expr>` | add a condition to the innermost group |
//! | `texcoords <unit> <id>` | feed texture unit `<unit>` from `tangents` or a texture slot |
//!
//! # Example
//!
//! ```text
//! shaders parallax.vert parallax.frag
//!
//! checkgroup begin or
//!     check NiTexturingProperty/Apply Mode == 2
//!     check not NiTexturingProperty/Base Texture/Has Texture == 0
//! checkgroup end
//!
//! texcoords 0 base
//! texcoords 1 tangents
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::condition::{ConditionGroup, ConditionSingle};
use crate::error::FormatError;
use crate::texture::TextureSlot;

/// Tag selecting per-vertex tangents as a coordinate source.
pub const TANGENTS_TAG: &str = "tangents";

/// Where a texture unit takes its coordinates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexCoordSource {
    /// Mesh tangents, three components per vertex.
    Tangents,
    /// Coordinate set used by a texture slot, two components per vertex.
    Slot(TextureSlot),
}

impl TexCoordSource {
    /// Parse a `texcoords` id, ignoring case.
    pub fn from_id(id: &str) -> Option<Self> {
        if id.eq_ignore_ascii_case(TANGENTS_TAG) {
            Some(TexCoordSource::Tangents)
        } else {
            TextureSlot::from_name(id).map(TexCoordSource::Slot)
        }
    }
}

impl fmt::Display for TexCoordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TexCoordSource::Tangents => f.write_str(TANGENTS_TAG),
            TexCoordSource::Slot(slot) => slot.fmt(f),
        }
    }
}

/// One recognized line of a program file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Shaders(Vec<String>),
    BeginGroup { or: bool },
    EndGroup,
    Check(ConditionSingle),
    TexCoords { unit: u32, source: TexCoordSource },
}

/// Parse a single line. `Ok(None)` for blank or unrecognized lines.
pub fn parse_directive(line: &str) -> Result<Option<Directive>, FormatError> {
    let line = line.trim();

    if line.starts_with("shaders") {
        // the first word is the keyword, whatever is glued to it
        let names = line.split_whitespace().skip(1).map(str::to_string).collect();
        return Ok(Some(Directive::Shaders(names)));
    }

    // `checkgroup` must be tried before its prefix `check`
    if let Some(rest) = line.strip_prefix("checkgroup") {
        let mut words = rest.split_whitespace();
        return match words.next() {
            Some("begin") => Ok(Some(Directive::BeginGroup {
                or: words.next() == Some("or"),
            })),
            Some("end") => Ok(Some(Directive::EndGroup)),
            _ => Err(FormatError::ExpectedBeginOrEnd),
        };
    }

    if let Some(rest) = line.strip_prefix("check") {
        let rest = rest.trim();
        let (expr, invert) = match rest.strip_prefix("not ") {
            Some(expr) => (expr.trim(), true),
            None => (rest, false),
        };
        return Ok(Some(Directive::Check(ConditionSingle::parse(expr, invert))));
    }

    if let Some(rest) = line.strip_prefix("texcoords") {
        let mut words = rest.split_whitespace();
        let unit = words.next().and_then(|w| w.parse::<u32>().ok());
        let id = words.next().map(str::to_ascii_lowercase);
        let (unit, id) = match (unit, id) {
            (Some(unit), Some(id)) => (unit, id),
            _ => return Err(FormatError::MalformedTexcoords(rest.trim().to_string())),
        };
        let source = TexCoordSource::from_id(&id).ok_or(FormatError::UnknownTextureId(id))?;
        return Ok(Some(Directive::TexCoords { unit, source }));
    }

    Ok(None)
}

/// Builds the condition tree and texture coordinate table of a program.
///
/// Groups are kept on a stack whose bottom entry is the root group. A
/// group is appended to its parent when it is closed; nothing else can be
/// added to the parent while the group is open, so the order in the file
/// is kept.
#[derive(Debug)]
pub struct ProgramBuilder {
    groups: Vec<ConditionGroup>,
    texcoords: BTreeMap<u32, TexCoordSource>,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            groups: vec![ConditionGroup::new(false)],
            texcoords: BTreeMap::new(),
        }
    }

    pub fn begin_group(&mut self, or: bool) {
        self.groups.push(ConditionGroup::new(or));
    }

    pub fn end_group(&mut self) -> Result<(), FormatError> {
        if self.groups.len() <= 1 {
            return Err(FormatError::MismatchedCheckgroupEnd);
        }
        if let Some(group) = self.groups.pop() {
            self.top().push(group);
        }
        Ok(())
    }

    pub fn check(&mut self, condition: ConditionSingle) {
        self.top().push(condition);
    }

    /// Assign a coordinate source to `unit`. Each unit can be assigned once.
    pub fn texcoords(&mut self, unit: u32, source: TexCoordSource) -> Result<(), FormatError> {
        if self.texcoords.contains_key(&unit) {
            return Err(FormatError::DuplicateTextureUnit(unit));
        }
        self.texcoords.insert(unit, source);
        Ok(())
    }

    /// Apply any directive except `shaders`, which needs the registry.
    pub fn apply(&mut self, directive: Directive) -> Result<(), FormatError> {
        match directive {
            Directive::Shaders(_) => Ok(()),
            Directive::BeginGroup { or } => {
                self.begin_group(or);
                Ok(())
            }
            Directive::EndGroup => self.end_group(),
            Directive::Check(condition) => {
                self.check(condition);
                Ok(())
            }
            Directive::TexCoords { unit, source } => self.texcoords(unit, source),
        }
    }

    /// Finish parsing. Fails if a group is still open.
    pub fn finish(mut self) -> Result<(ConditionGroup, BTreeMap<u32, TexCoordSource>), FormatError> {
        if self.groups.len() > 1 {
            return Err(FormatError::UnclosedCheckgroup(self.groups.len() - 1));
        }
        let root = self.groups.pop().unwrap_or_default();
        Ok((root, self.texcoords))
    }

    fn top(&mut self) -> &mut ConditionGroup {
        // The root group is never popped.
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }
}
